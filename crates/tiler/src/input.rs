//! Line-oriented primitive input.
//!
//! Each non-blank line is one primitive:
//!
//! ```text
//! line x0 y0 x1 y1
//! point x y
//! brush x y
//! ```
//!
//! Text after `#` is a comment.

use std::io::BufRead;
use std::str::FromStr;
use thiserror::Error;
use tile::clip::LineClipper;
use tile::GraphicsContext;

/// Input errors.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A drawing primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Primitive {
    Line { x0: f64, y0: f64, x1: f64, y1: f64 },
    Point { x: f64, y: f64 },
    Brush { x: f64, y: f64 },
}

impl FromStr for Primitive {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split_whitespace();
        let kind = fields.next().ok_or_else(|| "empty primitive".to_string())?;
        let values = fields
            .map(|field| {
                field
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number '{}'", field))
            })
            .collect::<Result<Vec<f64>, String>>()?;

        let expect = |count: usize| {
            if values.len() == count {
                Ok(())
            } else {
                Err(format!("'{}' takes {} numbers, got {}", kind, count, values.len()))
            }
        };

        match kind {
            "line" => {
                expect(4)?;
                Ok(Primitive::Line {
                    x0: values[0],
                    y0: values[1],
                    x1: values[2],
                    y1: values[3],
                })
            }
            "point" => {
                expect(2)?;
                Ok(Primitive::Point { x: values[0], y: values[1] })
            }
            "brush" => {
                expect(2)?;
                Ok(Primitive::Brush { x: values[0], y: values[1] })
            }
            other => Err(format!("unknown primitive '{}'", other)),
        }
    }
}

/// Parse one input line. Blank and comment-only lines yield `None`.
pub fn parse_line(text: &str, line: usize) -> Result<Option<Primitive>, InputError> {
    let content = text.split('#').next().unwrap_or("").trim();
    if content.is_empty() {
        return Ok(None);
    }
    content
        .parse()
        .map(Some)
        .map_err(|message| InputError::Syntax { line, message })
}

/// Viewport the line primitives are clipped against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Feed one primitive into the context.
pub fn apply<C: LineClipper>(
    context: &mut GraphicsContext<C>,
    primitive: Primitive,
    viewport: Viewport,
) {
    match primitive {
        Primitive::Line { x0, y0, x1, y1 } => {
            context.record_clipped_line(x0, y0, x1, y1, viewport.width, viewport.height)
        }
        Primitive::Point { x, y } => context.record_point(x, y),
        Primitive::Brush { x, y } => context.record_brush(x, y),
    }
}

/// Read every primitive from `reader` into the context.
///
/// Returns the number of primitives applied.
pub fn read_into<R: BufRead, C: LineClipper>(
    reader: R,
    context: &mut GraphicsContext<C>,
    viewport: Viewport,
) -> Result<usize, InputError> {
    let mut count = 0;
    for (index, text) in reader.lines().enumerate() {
        if let Some(primitive) = parse_line(&text?, index + 1)? {
            apply(context, primitive, viewport);
            count += 1;
        }
    }
    Ok(count)
}
