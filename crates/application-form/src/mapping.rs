//! Coordinate mapping document
//!
//! A mapping places every printable part of a form on its template. All
//! coordinates are PDF points measured from the bottom-left page corner.
//! Every key is optional; sections without an entry are not printed.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Text alignment relative to the anchor x coordinate
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl From<TextAlign> for pdf_core::Align {
    fn from(align: TextAlign) -> Self {
        match align {
            TextAlign::Left => pdf_core::Align::Left,
            TextAlign::Center => pdf_core::Align::Center,
            TextAlign::Right => pdf_core::Align::Right,
        }
    }
}

/// Root mapping document for one application type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormMapping {
    #[serde(default)]
    pub logo: Option<ImageSlot>,
    #[serde(default)]
    pub university_title: Option<TextSlot>,
    #[serde(default)]
    pub form_title: Option<TextSlot>,
    /// Field name -> placement
    #[serde(default)]
    pub fields: BTreeMap<String, FieldSlot>,
    /// Table name -> descriptor
    #[serde(default)]
    pub tables: BTreeMap<String, TableSlot>,
    #[serde(default)]
    pub declaration: Option<ParagraphSlot>,
    #[serde(default)]
    pub signature: Option<SignatureSlot>,
    #[serde(default)]
    pub experience: Option<ParagraphSlot>,
    #[serde(default)]
    pub special_qualifications: Option<ParagraphSlot>,
    #[serde(default)]
    pub layout: LayoutSettings,
}

impl FormMapping {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSlot> {
        self.fields.get(name)
    }

    pub fn table(&self, name: &str) -> Option<&TableSlot> {
        self.tables.get(name)
    }
}

/// Placement of the logo image, `y` is the bottom edge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageSlot {
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_logo_size")]
    pub width: f64,
    #[serde(default = "default_logo_size")]
    pub height: f64,
    #[serde(default = "default_page", deserialize_with = "page_number")]
    pub page: usize,
}

/// Fixed text such as the university name or the form title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextSlot {
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_page", deserialize_with = "page_number")]
    pub page: usize,
    /// Text to print; the form title falls back to the application type's title
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub align: TextAlign,
}

/// Placement of one labelled field value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldSlot {
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_page", deserialize_with = "page_number")]
    pub page: usize,
    /// Left edge of the label; without it the label ends just before `x`
    #[serde(default)]
    pub label_x: Option<f64>,
    /// Label text replacing the one derived from the field name
    #[serde(default)]
    pub label: Option<String>,
    /// Wrap the value into lines no wider than this
    #[serde(default)]
    pub max_width: Option<f64>,
    #[serde(default)]
    pub line_height: Option<f64>,
}

impl FieldSlot {
    /// A plain slot with default font size on page 1
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            font_size: default_font_size(),
            page: default_page(),
            label_x: None,
            label: None,
            max_width: None,
            line_height: None,
        }
    }

    pub fn line_height(&self) -> f64 {
        self.line_height.unwrap_or(self.font_size * LINE_HEIGHT_FACTOR)
    }
}

/// Descriptor of a repeatable table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableSlot {
    pub start_x: f64,
    /// Baseline of the first row
    pub start_y: f64,
    #[serde(default = "default_row_height")]
    pub row_height: f64,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_page", deserialize_with = "page_number")]
    pub page: usize,
    /// Heading text replacing the table's default heading
    #[serde(default)]
    pub title: Option<String>,
    /// Column name -> x offset from `start_x`
    #[serde(default)]
    pub columns: BTreeMap<String, f64>,
}

/// A block of wrapped text (experience, declaration, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphSlot {
    pub x: f64,
    /// Baseline of the first line
    pub y: f64,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_page", deserialize_with = "page_number")]
    pub page: usize,
    #[serde(default = "default_paragraph_width")]
    pub max_width: f64,
    #[serde(default)]
    pub line_height: Option<f64>,
    #[serde(default)]
    pub title: Option<String>,
    /// Fixed text, used by the declaration
    #[serde(default)]
    pub text: Option<String>,
}

impl ParagraphSlot {
    pub fn line_height(&self) -> f64 {
        self.line_height.unwrap_or(self.font_size * LINE_HEIGHT_FACTOR)
    }
}

/// Signature line with its caption
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignatureSlot {
    pub x: f64,
    /// Height of the signature line
    pub y: f64,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_page", deserialize_with = "page_number")]
    pub page: usize,
    #[serde(default = "default_signature_width")]
    pub width: f64,
    #[serde(default)]
    pub label: Option<String>,
    /// Where the application date is printed next to the signature
    #[serde(default)]
    pub date_x: Option<f64>,
}

/// Page flow settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutSettings {
    /// Lowest baseline allowed before content continues on the next page
    pub bottom_margin: f64,
    /// First baseline on a continuation page
    pub continuation_y: f64,
    /// Space kept between a flowing section and the next one
    pub section_gap: f64,
    /// Space between a right-aligned label and its value
    pub label_gap: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            bottom_margin: 50.0,
            continuation_y: 790.0,
            section_gap: 20.0,
            label_gap: 6.0,
        }
    }
}

const LINE_HEIGHT_FACTOR: f64 = 1.4;

fn default_font_size() -> f64 {
    10.0
}

fn default_page() -> usize {
    1
}

/// 1-based page index; page 0 does not exist in any template
fn page_number<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let page = usize::deserialize(deserializer)?;
    if page == 0 {
        return Err(serde::de::Error::custom("page numbers start at 1"));
    }
    Ok(page)
}

fn default_row_height() -> f64 {
    14.0
}

fn default_paragraph_width() -> f64 {
    500.0
}

fn default_logo_size() -> f64 {
    60.0
}

fn default_signature_width() -> f64 {
    150.0
}
