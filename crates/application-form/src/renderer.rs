//! Rendering draw instructions onto the template PDF

use crate::instruction::{DrawOp, FormLayout, ImageAsset, TextRole};
use crate::layout::TextMeasure;
use crate::store::ResolvedTemplate;
use crate::{FormError, Result};
use pdf_core::{Align, Color, CoordinateOrigin, FontFamily, FontFamilyBuilder, ImageScaleMode, LineStyle, PdfDocument};
use std::path::Path;

/// Family name the form fonts are registered under
const FONT_FAMILY: &str = "form";

const TITLE_COLOR: (u8, u8, u8) = (0, 32, 96);

/// Regular and bold faces used for a form
///
/// Also the [`TextMeasure`] of the layout, so wrapping measures exactly what gets drawn.
#[derive(Debug, Clone)]
pub struct FormFonts {
    family: FontFamily,
}

impl FormFonts {
    /// Standard Helvetica and Helvetica-Bold, nothing embedded
    pub fn helvetica() -> Result<Self> {
        let family = FontFamilyBuilder::new().helvetica().build(FONT_FAMILY)?;
        Ok(Self { family })
    }

    /// Embedded TrueType faces; without a bold face headings use the regular one
    pub fn from_ttf(regular: Vec<u8>, bold: Option<Vec<u8>>) -> Result<Self> {
        let mut builder = FontFamilyBuilder::new().regular(regular);
        if let Some(bold) = bold {
            builder = builder.bold(bold);
        }
        Ok(Self {
            family: builder.build(FONT_FAMILY)?,
        })
    }

    /// Load TrueType faces from disk
    pub fn from_files(regular: &Path, bold: Option<&Path>) -> Result<Self> {
        let read = |path: &Path| {
            std::fs::read(path).map_err(|e| {
                FormError::Configuration(format!("Failed to read font {}: {}", path.display(), e))
            })
        };
        let regular = read(regular)?;
        let bold = bold.map(read).transpose()?;
        Self::from_ttf(regular, bold)
    }
}

impl TextMeasure for FormFonts {
    fn text_width(&self, text: &str, font_size: f64, role: TextRole) -> f64 {
        self.family.text_width(text, font_size, role.weight())
    }
}

/// Applies a [`FormLayout`] to a fresh copy of the template
pub struct FormRenderer<'a> {
    template: &'a ResolvedTemplate,
    fonts: &'a FormFonts,
}

impl<'a> FormRenderer<'a> {
    pub fn new(template: &'a ResolvedTemplate, fonts: &'a FormFonts) -> Self {
        Self { template, fonts }
    }

    /// Render the layout and serialize the document
    pub fn render(&self, layout: &FormLayout) -> Result<Vec<u8>> {
        let mut doc = PdfDocument::open_from_bytes(&self.template.pdf)?;
        doc.set_origin(CoordinateOrigin::BottomLeft);
        doc.add_font_family(FONT_FAMILY, self.fonts.family.clone())?;
        doc.set_font(FONT_FAMILY, 10.0)?;

        let template_pages = doc.page_count();
        while doc.page_count() < layout.page_count {
            doc.add_blank_page()?;
        }
        if doc.page_count() > template_pages {
            tracing::debug!(
                template_pages,
                pages = doc.page_count(),
                "added continuation pages"
            );
        }

        for op in &layout.ops {
            self.apply(&mut doc, op)?;
        }

        let bytes = doc.to_bytes()?;
        tracing::debug!(images = doc.image_count(), bytes = bytes.len(), "serialized form");
        Ok(bytes)
    }

    fn apply(&self, doc: &mut PdfDocument, op: &DrawOp) -> Result<()> {
        match op {
            DrawOp::Text {
                page,
                x,
                y,
                font_size,
                role,
                align,
                text,
            } => {
                set_style(doc, *font_size, *role)?;
                doc.insert_text(text, *page, *x, *y, Align::from(*align))?;
            }
            DrawOp::WrappedText {
                page,
                x,
                y,
                font_size,
                line_height,
                role,
                lines,
            } => {
                set_style(doc, *font_size, *role)?;
                for (i, line) in lines.iter().enumerate() {
                    doc.insert_text(line, *page, *x, y - i as f64 * line_height, Align::Left)?;
                }
            }
            DrawOp::TableRow {
                page,
                y,
                font_size,
                cells,
            } => {
                set_style(doc, *font_size, TextRole::Value)?;
                for cell in cells {
                    doc.insert_text(&cell.text, *page, cell.x, *y, Align::Left)?;
                }
            }
            DrawOp::Rule {
                page,
                from,
                to,
                thickness,
            } => {
                let style = LineStyle {
                    width: *thickness,
                    color: Color::black(),
                };
                doc.draw_line(*page, *from, *to, &style)?;
            }
            DrawOp::Image {
                page,
                x,
                y,
                width,
                height,
                asset,
            } => {
                let data = self.asset(*asset)?;
                doc.insert_image(data, *page, *x, *y, *width, *height, ImageScaleMode::Fit)?;
            }
        }
        Ok(())
    }

    fn asset(&self, asset: ImageAsset) -> Result<&'a [u8]> {
        match asset {
            ImageAsset::Logo => self
                .template
                .logo
                .as_deref()
                .ok_or_else(|| FormError::Configuration("layout places a logo but no logo image was found".to_string())),
        }
    }
}

fn set_style(doc: &mut PdfDocument, font_size: f64, role: TextRole) -> Result<()> {
    doc.set_font_size(font_size)?;
    doc.set_font_weight(role.weight())?;
    let color = match role {
        TextRole::Title => {
            let (r, g, b) = TITLE_COLOR;
            Color::from_rgb(r, g, b)
        }
        TextRole::Heading | TextRole::Label | TextRole::Value => Color::black(),
    };
    doc.set_text_color(color);
    Ok(())
}
