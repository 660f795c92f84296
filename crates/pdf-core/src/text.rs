//! Text rendering utilities

use crate::document::Color;

/// Context for rendering a text run
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f64,
    /// Fill color
    pub color: Color,
}

/// Generate PDF operators for one text run
///
/// `x`/`y` are the baseline start in PDF user space; alignment has already
/// been resolved by the caller.
///
/// # Arguments
/// * `text_hex` - Hex-encoded text (e.g., "<48656C6C6F>")
/// * `x` - X coordinate in points, from the left edge
/// * `y` - Y coordinate in points, from the bottom edge
/// * `ctx` - Text rendering context
pub fn generate_text_operators(text_hex: &str, x: f64, y: f64, ctx: &TextRenderContext) -> Vec<u8> {
    let Color { r, g, b } = ctx.color;
    format!(
        "BT\n{r} {g} {b} rg\n/{} {} Tf\n{x} {y} Td\n{text_hex} Tj\nET\n",
        ctx.font_name, ctx.font_size
    )
    .into_bytes()
}
