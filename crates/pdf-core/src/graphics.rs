//! Vector drawing operators

use crate::document::Color;

/// Stroke settings for a straight rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    /// Stroke width in points
    pub width: f64,
    pub color: Color,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            width: 0.75,
            color: Color::black(),
        }
    }
}

/// Generate operators stroking a line from `from` to `to` (PDF user space)
pub fn generate_line_operators(from: (f64, f64), to: (f64, f64), style: &LineStyle) -> Vec<u8> {
    let Color { r, g, b } = style.color;
    format!(
        "q\n{r} {g} {b} RG\n{} w\n0 J\n{} {} m\n{} {} l\nS\nQ\n",
        style.width, from.0, from.1, to.0, to.1
    )
    .into_bytes()
}
