//! Font handling for PDF documents

use crate::{PdfError, Result};
use lopdf::{Dictionary, Object, Stream};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// One of the standard PDF fonts that every viewer ships with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

/// Helvetica advance widths for codes 32..=126, in 1/1000 em (Adobe AFM)
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// Helvetica-Bold advance widths for codes 32..=126, in 1/1000 em (Adobe AFM)
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0..?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P.._
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // `..o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p..~
];

impl StandardFont {
    /// PostScript name written as /BaseFont
    pub fn base_font(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Map a character to its WinAnsiEncoding code, `?` when unencodable
    pub fn encode_char(c: char) -> u8 {
        match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        }
    }

    /// Advance width of a WinAnsi code in 1/1000 em
    pub fn code_width(self, code: u8) -> u16 {
        let table = match self {
            StandardFont::Helvetica => &HELVETICA_WIDTHS,
            StandardFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        match code {
            0x20..=0x7E => table[(code - 0x20) as usize],
            0x91 | 0x92 => match self {
                StandardFont::Helvetica => 222,
                StandardFont::HelveticaBold => 278,
            },
            0x93 | 0x94 => match self {
                StandardFont::Helvetica => 333,
                StandardFont::HelveticaBold => 500,
            },
            0x95 => 350,
            0x97 => 1000,
            0xA0 => 278,
            // Latin-1 letters are close enough to the digit width for layout
            _ => 556,
        }
    }
}

/// Metrics cached when a TrueType font is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceMetrics {
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
}

/// How a font is written into the document
#[derive(Debug, Clone)]
pub enum FontKind {
    /// Embedded TrueType program, drawn through an Identity-H Type0 font
    TrueType {
        data: Arc<[u8]>,
        metrics: FaceMetrics,
    },
    /// Non-embedded standard font with WinAnsiEncoding
    Standard(StandardFont),
}

/// Font data structure for one font variant
#[derive(Debug, Clone)]
pub struct FontData {
    /// Font name/identifier
    pub name: String,
    /// Font program or standard font reference
    pub kind: FontKind,
    /// Characters drawn so far (drives /W and ToUnicode)
    pub used_chars: BTreeSet<char>,
}

/// PDF objects generated for font embedding
pub enum FontObjects {
    /// Type0 font with its descendant CIDFont and embedded program
    Composite {
        type0_font: Dictionary,
        cid_font: Dictionary,
        font_descriptor: Dictionary,
        font_file_stream: Stream,
        tounicode_stream: Stream,
    },
    /// Self-contained simple font dictionary
    Simple(Dictionary),
}

/// Font family with a regular and an optional bold variant
#[derive(Debug, Clone)]
pub struct FontFamily {
    pub regular: FontData,
    pub bold: Option<FontData>,
}

impl FontFamily {
    /// Get the font data for the specified weight, falling back to regular
    pub fn get_variant(&self, weight: FontWeight) -> &FontData {
        match weight {
            FontWeight::Bold => self.bold.as_ref().unwrap_or(&self.regular),
            FontWeight::Regular => &self.regular,
        }
    }

    /// Mutable counterpart of [`FontFamily::get_variant`]
    pub fn get_variant_mut(&mut self, weight: FontWeight) -> &mut FontData {
        match (weight, self.bold.as_mut()) {
            (FontWeight::Bold, Some(bold)) => bold,
            _ => &mut self.regular,
        }
    }

    /// Iterate over the variants present in the family
    pub fn variants(&self) -> impl Iterator<Item = &FontData> {
        std::iter::once(&self.regular).chain(self.bold.as_ref())
    }

    /// Text width in points for the given weight
    pub fn text_width(&self, text: &str, font_size: f64, weight: FontWeight) -> f64 {
        self.get_variant(weight).text_width_points(text, font_size)
    }
}

enum VariantSource {
    TrueType(Vec<u8>),
    Standard(StandardFont),
}

/// Builder for registering font families
#[derive(Default)]
pub struct FontFamilyBuilder {
    regular: Option<VariantSource>,
    bold: Option<VariantSource>,
}

impl FontFamilyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regular(mut self, ttf_data: Vec<u8>) -> Self {
        self.regular = Some(VariantSource::TrueType(ttf_data));
        self
    }

    pub fn bold(mut self, ttf_data: Vec<u8>) -> Self {
        self.bold = Some(VariantSource::TrueType(ttf_data));
        self
    }

    /// Use Helvetica and Helvetica-Bold, nothing gets embedded
    pub fn helvetica(mut self) -> Self {
        self.regular = Some(VariantSource::Standard(StandardFont::Helvetica));
        self.bold = Some(VariantSource::Standard(StandardFont::HelveticaBold));
        self
    }

    /// Build the FontFamily from the provided sources
    pub fn build(self, family_name: &str) -> Result<FontFamily> {
        let load = |name: String, source: VariantSource| match source {
            VariantSource::TrueType(data) => FontData::from_ttf(&name, data),
            VariantSource::Standard(font) => Ok(FontData::standard(&name, font)),
        };

        let regular = match self.regular {
            Some(source) => load(format!("{family_name}-regular"), source)?,
            None => {
                return Err(PdfError::FontParseError(
                    "FontFamily must have at least a regular variant".to_string(),
                ))
            }
        };

        let bold = self
            .bold
            .map(|source| load(format!("{family_name}-bold"), source))
            .transpose()?;

        Ok(FontFamily { regular, bold })
    }
}

impl FontData {
    /// Create font data from TTF bytes
    ///
    /// The face is validated here and re-parsed on demand, so the bytes are
    /// the only thing kept alive.
    pub fn from_ttf(name: &str, ttf_data: Vec<u8>) -> Result<Self> {
        let metrics = {
            let face = ttf_parser::Face::parse(&ttf_data, 0)
                .map_err(|e| PdfError::FontParseError(format!("{name}: {e}")))?;
            FaceMetrics {
                units_per_em: face.units_per_em(),
                ascender: face.ascender(),
                descender: face.descender(),
            }
        };

        Ok(Self {
            name: name.to_string(),
            kind: FontKind::TrueType {
                data: Arc::from(ttf_data),
                metrics,
            },
            used_chars: BTreeSet::new(),
        })
    }

    /// Create font data for a standard font
    pub fn standard(name: &str, font: StandardFont) -> Self {
        Self {
            name: name.to_string(),
            kind: FontKind::Standard(font),
            used_chars: BTreeSet::new(),
        }
    }

    /// Add characters to the used set
    pub fn add_chars(&mut self, text: &str) {
        self.used_chars.extend(text.chars());
    }

    fn with_face<T>(&self, f: impl FnOnce(&ttf_parser::Face<'_>) -> T) -> Option<T> {
        match &self.kind {
            FontKind::TrueType { data, .. } => ttf_parser::Face::parse(data, 0).ok().map(|face| f(&face)),
            FontKind::Standard(_) => None,
        }
    }

    /// Get glyph ID for a character (TrueType only)
    pub fn glyph_id(&self, c: char) -> Option<u16> {
        self.with_face(|face| face.glyph_index(c).map(|id| id.0))
            .flatten()
    }

    /// Check if font can draw the given character
    pub fn has_glyph(&self, c: char) -> bool {
        match self.kind {
            FontKind::TrueType { .. } => self.glyph_id(c).is_some_and(|id| id != 0),
            FontKind::Standard(_) => StandardFont::encode_char(c) != b'?' || c == '?',
        }
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f64) -> f64 {
        match &self.kind {
            FontKind::TrueType { metrics, .. } => {
                let units: u32 = self
                    .with_face(|face| {
                        text.chars()
                            .filter_map(|c| {
                                let gid = face.glyph_index(c)?;
                                face.glyph_hor_advance(gid)
                            })
                            .map(u32::from)
                            .sum()
                    })
                    .unwrap_or(0);
                units as f64 / metrics.units_per_em as f64 * font_size
            }
            FontKind::Standard(font) => {
                let units: u32 = text
                    .chars()
                    .map(|c| u32::from(font.code_width(StandardFont::encode_char(c))))
                    .sum();
                units as f64 / 1000.0 * font_size
            }
        }
    }

    /// Encode text as a hex string for the Tj operator
    pub fn encode_text_hex(&self, text: &str) -> String {
        let body: String = match &self.kind {
            FontKind::TrueType { .. } => self
                .with_face(|face| {
                    text.chars()
                        .map(|c| {
                            let gid = face.glyph_index(c).map(|id| id.0).unwrap_or(0);
                            format!("{gid:04X}")
                        })
                        .collect()
                })
                .unwrap_or_default(),
            FontKind::Standard(_) => text
                .chars()
                .map(|c| format!("{:02X}", StandardFont::encode_char(c)))
                .collect(),
        };
        format!("<{body}>")
    }

    /// Generate all PDF objects needed to embed this font
    pub fn to_pdf_objects(&self) -> Result<FontObjects> {
        let (data, metrics) = match &self.kind {
            FontKind::Standard(font) => {
                return Ok(FontObjects::Simple(Dictionary::from_iter(vec![
                    ("Type", "Font".into()),
                    ("Subtype", "Type1".into()),
                    ("BaseFont", Object::Name(font.base_font().into())),
                    ("Encoding", "WinAnsiEncoding".into()),
                ])))
            }
            FontKind::TrueType { data, metrics } => (data, metrics),
        };

        let font_name = Object::Name(self.name.clone().into());

        let tounicode_content = self.generate_tounicode_cmap();
        let tounicode_stream = Stream::new(
            Dictionary::from_iter(vec![("Type", "CMap".into())]),
            tounicode_content.into_bytes(),
        );

        let font_file_stream = Stream::new(
            Dictionary::from_iter(vec![("Length1", (data.len() as i64).into())]),
            data.to_vec(),
        );

        let font_bbox = vec![
            0.into(),
            metrics.descender.into(),
            i64::from(metrics.units_per_em).into(),
            metrics.ascender.into(),
        ];

        let font_descriptor = Dictionary::from_iter(vec![
            ("Type", "FontDescriptor".into()),
            ("FontName", font_name.clone()),
            ("Flags", 4.into()),
            ("FontBBox", font_bbox.into()),
            ("ItalicAngle", 0.into()),
            ("Ascent", metrics.ascender.into()),
            ("Descent", metrics.descender.into()),
            ("CapHeight", metrics.ascender.into()),
            ("StemV", 80.into()),
        ]);

        let cid_system_info = Dictionary::from_iter(vec![
            ("Registry", Object::string_literal("Adobe")),
            ("Ordering", Object::string_literal("Identity")),
            ("Supplement", 0.into()),
        ]);

        let cid_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "CIDFontType2".into()),
            ("BaseFont", font_name.clone()),
            ("CIDSystemInfo", cid_system_info.into()),
            ("CIDToGIDMap", "Identity".into()),
            ("W", self.generate_widths_array().into()),
            ("DW", 1000.into()),
        ]);

        let type0_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type0".into()),
            ("BaseFont", font_name),
            ("Encoding", "Identity-H".into()),
        ]);

        Ok(FontObjects::Composite {
            type0_font,
            cid_font,
            font_descriptor,
            font_file_stream,
            tounicode_stream,
        })
    }

    /// Generate the /W array in PDF glyph space (1/1000 em)
    fn generate_widths_array(&self) -> Vec<Object> {
        let FontKind::TrueType { metrics, .. } = &self.kind else {
            return Vec::new();
        };
        let scale = 1000.0 / metrics.units_per_em as f64;

        self.with_face(|face| {
            let gids: BTreeSet<u16> = self
                .used_chars
                .iter()
                .filter_map(|&c| face.glyph_index(c).map(|id| id.0))
                .collect();

            let mut widths = Vec::with_capacity(gids.len() * 2);
            for gid in gids {
                let advance = face
                    .glyph_hor_advance(ttf_parser::GlyphId(gid))
                    .map(|w| (w as f64 * scale).round() as i64)
                    .unwrap_or(1000);
                widths.push(i64::from(gid).into());
                widths.push(vec![advance.into()].into());
            }
            widths
        })
        .unwrap_or_default()
    }

    /// Generate ToUnicode CMap stream content mapping glyph IDs back to text
    fn generate_tounicode_cmap(&self) -> String {
        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n\
             <0000> <FFFF>\n\
             endcodespacerange\n",
        );

        let pairs: Vec<(u16, char)> = self
            .used_chars
            .iter()
            .filter_map(|&c| self.glyph_id(c).map(|gid| (gid, c)))
            .collect();

        for chunk in pairs.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for (gid, c) in chunk {
                let mut utf16 = [0u16; 2];
                let units: String = c
                    .encode_utf16(&mut utf16)
                    .iter()
                    .map(|u| format!("{u:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{units}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
        cmap
    }
}
