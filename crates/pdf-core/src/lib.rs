//! PDF Core - Low-level PDF manipulation for form filling
//!
//! This crate provides functionality for:
//! - Opening a template PDF and serializing the filled result
//! - Embedding TrueType fonts or using the standard Helvetica pair
//! - Inserting text, images (JPEG, PNG) and rules at page coordinates
//! - Appending blank pages when a form overflows its template
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, CoordinateOrigin, FontFamilyBuilder, PdfDocument};
//!
//! let mut doc = PdfDocument::open_from_bytes(&template)?;
//! doc.set_origin(CoordinateOrigin::BottomLeft);
//! doc.register_font_family("form", FontFamilyBuilder::new().helvetica())?;
//! doc.set_font("form", 10.0)?;
//! doc.insert_text("Jane Perera", 1, 50.0, 700.0, Align::Left)?;
//! let bytes = doc.to_bytes()?;
//! ```

mod document;
mod font;
mod graphics;
mod image;
mod text;

pub use document::{Color, CoordinateOrigin, PdfDocument};
pub use font::{FontData, FontFamily, FontFamilyBuilder, FontKind, FontWeight, StandardFont};
pub use graphics::{generate_line_operators, LineStyle};
pub use image::ImageScaleMode;
pub use text::{generate_text_operators, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Font already exists: {0}")]
    FontAlreadyExists(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment relative to the anchor x coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    /// Horizontal shift applied to the anchor for a run of the given width
    pub fn offset(self, text_width: f64) -> f64 {
        match self {
            Align::Left => 0.0,
            Align::Center => -text_width / 2.0,
            Align::Right => -text_width,
        }
    }
}
