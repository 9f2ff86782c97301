//! vtile - render drawing primitives into a compressed vector tile.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use tile::{GraphicsContext, TileConfig};
use tiler::{read_into, Viewport};

/// vtile - render drawing primitives into a compressed vector tile
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image width in pixels
    #[arg(long, default_value = "256")]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "256")]
    height: u32,

    /// Clip viewport width (defaults to the image width)
    #[arg(long)]
    viewport_width: Option<f64>,

    /// Clip viewport height (defaults to the image height)
    #[arg(long)]
    viewport_height: Option<f64>,

    /// Tile configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Primitive input file (defaults to stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<TileConfig> {
    let Some(path) = path else {
        return Ok(TileConfig::default());
    };
    let file = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
    let config: TileConfig = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the tile.
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    debug!("vtile v{}", tiler::VERSION);

    let config = load_config(args.config.as_ref())?;
    let viewport = Viewport {
        width: args.viewport_width.unwrap_or(args.width as f64),
        height: args.viewport_height.unwrap_or(args.height as f64),
    };

    let mut context = GraphicsContext::with_config(args.width, args.height, config)?;

    let count = match &args.input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("opening input {}", path.display()))?;
            read_into(BufReader::new(file), &mut context, viewport)?
        }
        None => read_into(io::stdin().lock(), &mut context, viewport)?,
    };
    info!(
        "read {} primitives: {} segments, {} points",
        count,
        context.lines().len(),
        context.density().len()
    );

    let bytes = context.finalize()?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(&bytes)?;
    stdout.flush()?;

    info!("wrote {} byte tile", bytes.len());
    Ok(())
}
