//! PDF Document wrapper

use crate::font::FontObjects;
use crate::graphics::{generate_line_operators, LineStyle};
use crate::image::{generate_image_operators, ImageScaleMode, ImageXObject};
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{Align, FontFamily, FontFamilyBuilder, FontWeight, PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

/// A4 in points, used when a page declares no MediaBox
const A4: (f64, f64) = (595.28, 841.89);

/// Upper bound on Parent hops when resolving inherited page attributes
const MAX_TREE_DEPTH: usize = 16;

/// A buffered text operation, encoded at save time once glyph usage is known
#[derive(Debug, Clone)]
struct BufferedTextOp {
    text: String,
    family: String,
    weight: FontWeight,
    font_resource_name: String,
    page: usize,
    /// Baseline start in PDF user space, alignment already applied
    x: f64,
    y: f64,
    font_size: f64,
    color: Color,
}

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Which corner y coordinates are measured from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoordinateOrigin {
    /// y grows downward from the top edge; image y is the top edge
    #[default]
    TopLeft,
    /// Native PDF space; image y is the bottom edge
    BottomLeft,
}

/// PDF Document wrapper providing high-level drawing on top of a template
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Registered font families
    font_families: HashMap<String, FontFamily>,
    current_family: Option<String>,
    current_weight: FontWeight,
    current_font_size: f64,
    current_text_color: Color,
    origin: CoordinateOrigin,
    /// Embedded fonts (variant name -> PDF object ID)
    embedded_fonts: HashMap<String, ObjectId>,
    /// Page font resources (page -> variant name -> resource name)
    page_font_resources: BTreeMap<usize, BTreeMap<String, String>>,
    next_font_resource: u32,
    /// Embedded images (data hash -> object ID and pixel size)
    embedded_images: HashMap<u64, (ObjectId, u32, u32)>,
    /// Page image resources (page -> object ID -> resource name)
    page_image_resources: HashMap<usize, HashMap<ObjectId, String>>,
    next_image_resource: u32,
    /// Buffered content operators per page
    page_content_buffer: BTreeMap<usize, Vec<u8>>,
    buffered_text_ops: Vec<BufferedTextOp>,
}

impl PdfDocument {
    /// Open a PDF document from bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;

        Ok(Self {
            inner,
            font_families: HashMap::new(),
            current_family: None,
            current_weight: FontWeight::default(),
            current_font_size: 12.0,
            current_text_color: Color::default(),
            origin: CoordinateOrigin::default(),
            embedded_fonts: HashMap::new(),
            page_font_resources: BTreeMap::new(),
            next_font_resource: 1,
            embedded_images: HashMap::new(),
            page_image_resources: HashMap::new(),
            next_image_resource: 1,
            page_content_buffer: BTreeMap::new(),
            buffered_text_ops: Vec::new(),
        })
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Choose how y coordinates passed to the drawing calls are interpreted
    pub fn set_origin(&mut self, origin: CoordinateOrigin) {
        self.origin = origin;
    }

    /// Register a font family with its variants
    ///
    /// # Example
    /// ```ignore
    /// doc.register_font_family("form", FontFamilyBuilder::new().helvetica())?;
    /// doc.register_font_family("noto",
    ///     FontFamilyBuilder::new()
    ///         .regular(std::fs::read("NotoSans-Regular.ttf")?)
    ///         .bold(std::fs::read("NotoSans-Bold.ttf")?)
    /// )?;
    /// ```
    pub fn register_font_family(&mut self, name: &str, builder: FontFamilyBuilder) -> Result<()> {
        let family = builder.build(name)?;
        self.add_font_family(name, family)
    }

    /// Register an already built family (e.g. one shared with a layout pass)
    pub fn add_font_family(&mut self, name: &str, family: FontFamily) -> Result<()> {
        if self.font_families.contains_key(name) {
            return Err(PdfError::FontAlreadyExists(name.to_string()));
        }
        self.font_families.insert(name.to_string(), family);
        Ok(())
    }

    /// Set the current font family and size
    pub fn set_font(&mut self, family: &str, size: f64) -> Result<()> {
        if !self.font_families.contains_key(family) {
            return Err(PdfError::FontNotFound(family.to_string()));
        }

        self.current_family = Some(family.to_string());
        self.current_font_size = size;
        Ok(())
    }

    /// Set only the font size (keeps current family/weight)
    pub fn set_font_size(&mut self, size: f64) -> Result<()> {
        self.current_family()?;
        self.current_font_size = size;
        Ok(())
    }

    /// Set the font weight (keeps current family/size)
    pub fn set_font_weight(&mut self, weight: FontWeight) -> Result<()> {
        self.current_family()?;
        self.current_weight = weight;
        Ok(())
    }

    /// Set the text fill color
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    fn current_family(&self) -> Result<&FontFamily> {
        let name = self
            .current_family
            .as_ref()
            .ok_or_else(|| PdfError::FontNotFound("No font family set".to_string()))?;
        self.font_families
            .get(name)
            .ok_or_else(|| PdfError::FontNotFound(name.clone()))
    }

    /// Width in points of `text` in the current font, weight and size
    pub fn text_width(&self, text: &str) -> Result<f64> {
        Ok(self
            .current_family()?
            .text_width(text, self.current_font_size, self.current_weight))
    }

    /// Insert text at a specific position
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Baseline y in points, measured from the configured origin
    /// * `align` - Alignment relative to `x`
    pub fn insert_text(&mut self, text: &str, page: usize, x: f64, y: f64, align: Align) -> Result<()> {
        self.check_page(page)?;

        if text.is_empty() {
            return Ok(());
        }

        let family = self
            .current_family
            .clone()
            .ok_or_else(|| PdfError::FontNotFound("No font family set".to_string()))?;
        let weight = self.current_weight;
        let font_size = self.current_font_size;

        let variant_name = {
            let variant = self
                .font_families
                .get_mut(&family)
                .ok_or_else(|| PdfError::FontNotFound(family.clone()))?
                .get_variant_mut(weight);
            variant.add_chars(text);
            variant.name.clone()
        };

        let width = self.text_width(text)?;
        let pdf_y = self.to_pdf_y(page, y, 0.0)?;
        let font_resource_name = self.get_or_create_font_ref(&variant_name, page);

        self.buffered_text_ops.push(BufferedTextOp {
            text: text.to_string(),
            family,
            weight,
            font_resource_name,
            page,
            x: x + align.offset(width),
            y: pdf_y,
            font_size,
            color: self.current_text_color,
        });

        Ok(())
    }

    /// Insert an image into a box
    ///
    /// `y` is the top edge of the box with a top-left origin and the bottom
    /// edge with a bottom-left origin. Identical image bytes are embedded
    /// once per document.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        mode: ImageScaleMode,
    ) -> Result<()> {
        self.check_page(page)?;

        let (resource_name, px_width, px_height) = self.get_or_create_image_ref(data, page)?;
        let (draw_width, draw_height) = mode.apply((px_width, px_height), (width, height));

        let pdf_y = match self.origin {
            CoordinateOrigin::TopLeft => self.to_pdf_y(page, y, draw_height)?,
            CoordinateOrigin::BottomLeft => y,
        };

        let operators = generate_image_operators(&resource_name, x, pdf_y, draw_width, draw_height);
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Stroke a straight line between two points
    pub fn draw_line(&mut self, page: usize, from: (f64, f64), to: (f64, f64), style: &LineStyle) -> Result<()> {
        self.check_page(page)?;

        let from = (from.0, self.to_pdf_y(page, from.1, 0.0)?);
        let to = (to.0, self.to_pdf_y(page, to.1, 0.0)?);
        let operators = generate_line_operators(from, to, style);
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Number of distinct image XObjects embedded so far
    pub fn image_count(&self) -> usize {
        self.embedded_images.len()
    }

    /// Serialize the document, writing all buffered content and fonts
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.encode_buffered_text()?;
        self.flush_content_buffers()?;
        self.embed_fonts()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(buffer)
    }

    /// Add a blank page sized like the first page (A4 if unknown)
    ///
    /// # Returns
    /// New page number (1-indexed)
    pub fn add_blank_page(&mut self) -> Result<usize> {
        let (width, height) = if self.page_count() > 0 {
            self.page_size(1)?
        } else {
            A4
        };

        let pages_id = self.pages_root()?;
        let contents_id = self
            .inner
            .add_object(Object::Stream(Stream::new(Dictionary::new(), vec![])));

        let page_dict = Dictionary::from_iter(vec![
            ("Type", Object::from("Page")),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(width as _),
                    Object::Real(height as _),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(contents_id)),
        ]);
        let new_page_id = self.inner.add_object(Object::Dictionary(page_dict));

        let pages = self.inner.get_object_mut(pages_id)?.as_dict_mut()?;
        let mut kids = pages
            .get(b"Kids")
            .and_then(Object::as_array)
            .map_err(|_| PdfError::ParseError("Pages object missing Kids array".to_string()))?
            .clone();
        kids.push(Object::Reference(new_page_id));
        let count = pages
            .get(b"Count")
            .and_then(Object::as_i64)
            .map_err(|_| PdfError::ParseError("Pages object missing Count".to_string()))?;
        pages.set("Kids", Object::Array(kids));
        pages.set("Count", Object::Integer(count + 1));

        Ok(self.page_count())
    }

    /// Page size (width, height) in points, following MediaBox inheritance
    pub fn page_size(&self, page: usize) -> Result<(f64, f64)> {
        let page_id = self.page_id(page)?;
        let media_box = match self
            .inherited_attribute(page_id, b"MediaBox")
            .or_else(|| self.inherited_attribute(page_id, b"CropBox"))
        {
            Some(obj) => self.resolve(&obj).as_array().ok().cloned(),
            None => None,
        };

        let Some(media_box) = media_box else {
            return Ok(A4);
        };

        let coords: Vec<f64> = media_box.iter().filter_map(number).collect();
        match coords.as_slice() {
            [x1, y1, x2, y2] => Ok(((x2 - x1).abs(), (y2 - y1).abs())),
            _ => Err(PdfError::ParseError("Invalid MediaBox format".to_string())),
        }
    }

    fn check_page(&self, page: usize) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }
        Ok(())
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    fn pages_root(&self) -> Result<ObjectId> {
        let catalog_id = self
            .inner
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .map_err(|_| PdfError::ParseError("Document trailer missing Root entry".to_string()))?;
        self.inner
            .get_object(catalog_id)
            .and_then(Object::as_dict)
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(Object::as_reference)
            .map_err(|_| PdfError::ParseError("Catalog missing Pages entry".to_string()))
    }

    /// Convert a caller y (baseline or top edge) to PDF user space
    fn to_pdf_y(&self, page: usize, y: f64, height: f64) -> Result<f64> {
        match self.origin {
            CoordinateOrigin::BottomLeft => Ok(y),
            CoordinateOrigin::TopLeft => {
                let (_, page_height) = self.page_size(page)?;
                Ok(page_height - y - height)
            }
        }
    }

    /// Look up a page attribute, walking up the Parent chain
    fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Option<Object> {
        let mut current = page_id;
        for _ in 0..MAX_TREE_DEPTH {
            let dict = self.inner.get_object(current).ok()?.as_dict().ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(value.clone());
            }
            current = dict.get(b"Parent").ok()?.as_reference().ok()?;
        }
        None
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.inner.get_object(*id).unwrap_or(obj),
            _ => obj,
        }
    }

    fn resolve_dict(&self, obj: &Object) -> Dictionary {
        self.resolve(obj).as_dict().cloned().unwrap_or_else(|_| Dictionary::new())
    }

    /// Merge named references into a page's Resources sub-dictionary
    ///
    /// Indirect or inherited resources are copied onto the page first, so the
    /// template's own fonts and images stay reachable.
    fn merge_page_resources(&mut self, page: usize, category: &[u8], entries: &[(String, ObjectId)]) -> Result<()> {
        let page_id = self.page_id(page)?;

        let mut resources = self
            .inherited_attribute(page_id, b"Resources")
            .map(|obj| self.resolve_dict(&obj))
            .unwrap_or_else(Dictionary::new);
        let mut sub = resources
            .get(category)
            .map(|obj| self.resolve_dict(obj))
            .unwrap_or_else(|_| Dictionary::new());

        for (name, id) in entries {
            sub.set(name.as_bytes(), Object::Reference(*id));
        }
        resources.set(category, Object::Dictionary(sub));

        self.inner
            .get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Resources", Object::Dictionary(resources));
        Ok(())
    }

    /// Get or create a font resource name for a page, e.g. "FmF1"
    ///
    /// The font object itself is embedded at save time when all characters
    /// are known.
    fn get_or_create_font_ref(&mut self, variant_name: &str, page: usize) -> String {
        let page_resources = self.page_font_resources.entry(page).or_default();
        if let Some(resource_name) = page_resources.get(variant_name) {
            return resource_name.clone();
        }

        let resource_name = format!("FmF{}", self.next_font_resource);
        self.next_font_resource += 1;
        page_resources.insert(variant_name.to_string(), resource_name.clone());
        resource_name
    }

    /// Get or create an image resource for a page
    ///
    /// Returns the resource name and the pixel size.
    fn get_or_create_image_ref(&mut self, data: &[u8], page: usize) -> Result<(String, u32, u32)> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        let (object_id, width, height) = match self.embedded_images.get(&data_hash) {
            Some(entry) => *entry,
            None => {
                let xobject = ImageXObject::decode(data)?;
                let object_id = self.inner.add_object(xobject.to_pdf_stream());
                let entry = (object_id, xobject.width, xobject.height);
                self.embedded_images.insert(data_hash, entry);
                entry
            }
        };

        if let Some(name) = self
            .page_image_resources
            .get(&page)
            .and_then(|names| names.get(&object_id))
        {
            return Ok((name.clone(), width, height));
        }

        let resource_name = format!("FmIm{}", self.next_image_resource);
        self.next_image_resource += 1;
        self.page_image_resources
            .entry(page)
            .or_default()
            .insert(object_id, resource_name.clone());
        self.merge_page_resources(page, b"XObject", &[(resource_name.clone(), object_id)])?;

        Ok((resource_name, width, height))
    }

    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Turn buffered text into content operators
    fn encode_buffered_text(&mut self) -> Result<()> {
        let text_ops = std::mem::take(&mut self.buffered_text_ops);

        for op in text_ops {
            let text_hex = self
                .font_families
                .get(&op.family)
                .ok_or_else(|| PdfError::FontNotFound(op.family.clone()))?
                .get_variant(op.weight)
                .encode_text_hex(&op.text);

            let ctx = TextRenderContext {
                font_name: op.font_resource_name,
                font_size: op.font_size,
                color: op.color,
            };
            let operators = generate_text_operators(&text_hex, op.x, op.y, &ctx);
            self.buffer_content(op.page, &operators);
        }

        Ok(())
    }

    /// Append buffered operators to each page's content stream
    fn flush_content_buffers(&mut self) -> Result<()> {
        let buffers = std::mem::take(&mut self.page_content_buffer);
        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }
        Ok(())
    }

    fn stream_bytes(&self, obj: &Object) -> Vec<u8> {
        match self.resolve(obj) {
            Object::Stream(stream) => stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone()),
            Object::Array(parts) => parts.iter().flat_map(|part| self.stream_bytes(part)).collect(),
            _ => Vec::new(),
        }
    }

    /// Replace the page content with `q <existing> Q <new>`
    ///
    /// The save/restore pair keeps any transform the template leaves
    /// behind from shifting the added content.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let page_id = self.page_id(page)?;

        let existing = {
            let page_dict = self.inner.get_object(page_id)?.as_dict()?;
            match page_dict.get(b"Contents") {
                Ok(contents) => self.stream_bytes(contents),
                Err(_) => Vec::new(),
            }
        };

        let mut new_content = Vec::with_capacity(existing.len() + content.len() + 8);
        if !existing.is_empty() {
            new_content.extend_from_slice(b"q\n");
            new_content.extend_from_slice(&existing);
            new_content.extend_from_slice(b"\nQ\n");
        }
        new_content.extend_from_slice(content);

        let stream_id = self.inner.add_object(Stream::new(Dictionary::new(), new_content));
        self.inner
            .get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Contents", Object::Reference(stream_id));
        Ok(())
    }

    /// Embed every font variant that drew at least one character
    fn embed_fonts(&mut self) -> Result<()> {
        let mut pending = Vec::new();
        for family in self.font_families.values() {
            for variant in family.variants() {
                if !variant.used_chars.is_empty() && !self.embedded_fonts.contains_key(&variant.name) {
                    pending.push((variant.name.clone(), variant.to_pdf_objects()?));
                }
            }
        }

        for (name, objects) in pending {
            let font_id = self.add_font_objects(objects);
            self.embedded_fonts.insert(name, font_id);
        }

        let page_resources = std::mem::take(&mut self.page_font_resources);
        for (page, fonts) in &page_resources {
            let entries = fonts
                .iter()
                .map(|(variant, resource)| {
                    self.embedded_fonts
                        .get(variant)
                        .map(|id| (resource.clone(), *id))
                        .ok_or_else(|| PdfError::FontNotFound(variant.clone()))
                })
                .collect::<Result<Vec<_>>>()?;
            self.merge_page_resources(*page, b"Font", &entries)?;
        }
        self.page_font_resources = page_resources;

        Ok(())
    }

    fn add_font_objects(&mut self, objects: FontObjects) -> ObjectId {
        match objects {
            FontObjects::Simple(dict) => self.inner.add_object(dict),
            FontObjects::Composite {
                mut type0_font,
                mut cid_font,
                mut font_descriptor,
                font_file_stream,
                tounicode_stream,
            } => {
                let font_file_id = self.inner.add_object(font_file_stream);
                font_descriptor.set("FontFile2", Object::Reference(font_file_id));
                let descriptor_id = self.inner.add_object(font_descriptor);

                cid_font.set("FontDescriptor", Object::Reference(descriptor_id));
                let cid_font_id = self.inner.add_object(cid_font);

                let tounicode_id = self.inner.add_object(tounicode_stream);
                type0_font.set("DescendantFonts", Object::Array(vec![Object::Reference(cid_font_id)]));
                type0_font.set("ToUnicode", Object::Reference(tounicode_id));
                self.inner.add_object(type0_font)
            }
        }
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}
