//! Backend-independent draw instructions produced by the layout engine

use crate::mapping::TextAlign;
use crate::record::ApplicationType;
use pdf_core::FontWeight;

/// What a piece of text is, which decides its weight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Title,
    Heading,
    Label,
    Value,
}

impl TextRole {
    pub fn weight(self) -> FontWeight {
        match self {
            TextRole::Title | TextRole::Heading => FontWeight::Bold,
            TextRole::Label | TextRole::Value => FontWeight::Regular,
        }
    }
}

/// Image supplied alongside the template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAsset {
    Logo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub x: f64,
    pub text: String,
}

/// One drawing step. Pages are 1-based, coordinates are bottom-left PDF points.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        page: usize,
        x: f64,
        y: f64,
        font_size: f64,
        role: TextRole,
        align: TextAlign,
        text: String,
    },
    /// Line `i` sits at `y - i * line_height`
    WrappedText {
        page: usize,
        x: f64,
        y: f64,
        font_size: f64,
        line_height: f64,
        role: TextRole,
        lines: Vec<String>,
    },
    TableRow {
        page: usize,
        y: f64,
        font_size: f64,
        cells: Vec<TableCell>,
    },
    Rule {
        page: usize,
        from: (f64, f64),
        to: (f64, f64),
        thickness: f64,
    },
    /// `y` is the bottom edge of the image box
    Image {
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        asset: ImageAsset,
    },
}

impl DrawOp {
    pub fn page(&self) -> usize {
        match self {
            DrawOp::Text { page, .. }
            | DrawOp::WrappedText { page, .. }
            | DrawOp::TableRow { page, .. }
            | DrawOp::Rule { page, .. }
            | DrawOp::Image { page, .. } => *page,
        }
    }
}

/// The complete, ordered drawing of one form
#[derive(Debug, Clone, PartialEq)]
pub struct FormLayout {
    pub application_type: ApplicationType,
    /// Highest page any instruction addresses
    pub page_count: usize,
    pub ops: Vec<DrawOp>,
}

impl FormLayout {
    /// Instructions addressed to one page
    pub fn ops_on_page(&self, page: usize) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(move |op| op.page() == page)
    }

    /// Every placed text run in drawing order, table cells and wrapped lines included
    pub fn texts(&self) -> Vec<&str> {
        let mut texts = Vec::new();
        for op in &self.ops {
            match op {
                DrawOp::Text { text, .. } => texts.push(text.as_str()),
                DrawOp::WrappedText { lines, .. } => texts.extend(lines.iter().map(String::as_str)),
                DrawOp::TableRow { cells, .. } => texts.extend(cells.iter().map(|cell| cell.text.as_str())),
                DrawOp::Rule { .. } | DrawOp::Image { .. } => {}
            }
        }
        texts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_role_weight() {
        assert_eq!(TextRole::Title.weight(), FontWeight::Bold);
        assert_eq!(TextRole::Heading.weight(), FontWeight::Bold);
        assert_eq!(TextRole::Label.weight(), FontWeight::Regular);
        assert_eq!(TextRole::Value.weight(), FontWeight::Regular);
    }

    #[test]
    fn test_texts_and_pages() {
        let layout = FormLayout {
            application_type: ApplicationType::NonAcademic,
            page_count: 2,
            ops: vec![
                DrawOp::Text {
                    page: 1,
                    x: 10.0,
                    y: 10.0,
                    font_size: 10.0,
                    role: TextRole::Value,
                    align: TextAlign::Left,
                    text: "a".to_string(),
                },
                DrawOp::TableRow {
                    page: 2,
                    y: 100.0,
                    font_size: 9.0,
                    cells: vec![TableCell {
                        x: 40.0,
                        text: "b".to_string(),
                    }],
                },
                DrawOp::Rule {
                    page: 2,
                    from: (0.0, 0.0),
                    to: (1.0, 0.0),
                    thickness: 0.75,
                },
            ],
        };

        assert_eq!(layout.texts(), vec!["a", "b"]);
        assert_eq!(layout.ops_on_page(2).count(), 2);
    }
}
