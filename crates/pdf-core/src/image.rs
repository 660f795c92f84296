//! Image XObjects for logos and photos placed on a form

use crate::{PdfError, Result};
use image::{DynamicImage, ImageReader};
use lopdf::{Dictionary, Object, Stream};
use std::io::{Cursor, Write};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// Image container formats accepted for embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Detect the format from magic bytes
    pub fn sniff(data: &[u8]) -> Result<Self> {
        const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Ok(ImageFormat::Jpeg)
        } else if data.starts_with(&PNG_MAGIC) {
            Ok(ImageFormat::Png)
        } else {
            Err(PdfError::ImageError("Unknown image format".to_string()))
        }
    }
}

/// How an image is sized into its target box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageScaleMode {
    /// Fill the box exactly, ignoring aspect ratio
    Stretch,
    /// Largest size inside the box that keeps the aspect ratio
    #[default]
    Fit,
}

impl ImageScaleMode {
    /// Display size in points for an image of `pixels` placed in `target`
    pub fn apply(self, pixels: (u32, u32), target: (f64, f64)) -> (f64, f64) {
        let (px_w, px_h) = (pixels.0.max(1) as f64, pixels.1.max(1) as f64);
        match self {
            ImageScaleMode::Stretch => target,
            ImageScaleMode::Fit => {
                let scale = (target.0 / px_w).min(target.1 / px_h);
                (px_w * scale, px_h * scale)
            }
        }
    }
}

/// Image ready to be written as an XObject stream
#[derive(Debug, Clone)]
pub struct ImageXObject {
    pub width: u32,
    pub height: u32,
    pub color_space: &'static str,
    /// "DCTDecode" for JPEG pass-through, "FlateDecode" for decoded pixels
    pub filter: &'static str,
    pub data: Vec<u8>,
}

impl ImageXObject {
    /// Build an XObject from JPEG or PNG bytes
    pub fn decode(data: &[u8]) -> Result<Self> {
        match ImageFormat::sniff(data)? {
            ImageFormat::Jpeg => Self::from_jpeg(data),
            ImageFormat::Png => Self::from_png(data),
        }
    }

    /// JPEG data is embedded as-is; only the frame header is read
    pub fn from_jpeg(data: &[u8]) -> Result<Self> {
        let frame = read_jpeg_frame(data)?;
        let color_space = match frame.components {
            1 => "DeviceGray",
            4 => "DeviceCMYK",
            _ => "DeviceRGB",
        };

        Ok(Self {
            width: frame.width,
            height: frame.height,
            color_space,
            filter: "DCTDecode",
            data: data.to_vec(),
        })
    }

    /// PNG data is decoded, flattened onto white and deflated
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let image = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .decode()?;
        let (width, height) = (image.width(), image.height());

        let (pixels, color_space) = flatten_on_white(&image);

        let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&pixels)?;
        let data = encoder.finish()?;

        Ok(Self {
            width,
            height,
            color_space,
            filter: "FlateDecode",
            data,
        })
    }

    /// Convert to lopdf Stream object
    pub fn to_pdf_stream(&self) -> Stream {
        let dict = Dictionary::from_iter(vec![
            ("Type", Object::from("XObject")),
            ("Subtype", Object::from("Image")),
            ("Width", Object::Integer(i64::from(self.width))),
            ("Height", Object::Integer(i64::from(self.height))),
            ("ColorSpace", Object::from(self.color_space)),
            ("BitsPerComponent", Object::Integer(8)),
            ("Filter", Object::from(self.filter)),
        ]);

        Stream::new(dict, self.data.clone())
    }
}

fn blend(channel: u8, alpha: u8) -> u8 {
    let alpha = alpha as f32 / 255.0;
    (channel as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8
}

/// Drop any alpha channel by compositing onto a white page
fn flatten_on_white(image: &DynamicImage) -> (Vec<u8>, &'static str) {
    let color = image.color();
    match (color.has_color(), color.has_alpha()) {
        (false, false) => (image.to_luma8().into_raw(), "DeviceGray"),
        (false, true) => {
            let gray: Vec<u8> = image
                .to_luma_alpha8()
                .pixels()
                .map(|p| blend(p[0], p[1]))
                .collect();
            (gray, "DeviceGray")
        }
        (true, false) => (image.to_rgb8().into_raw(), "DeviceRGB"),
        (true, true) => {
            let rgba = image.to_rgba8();
            let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
            for p in rgba.pixels() {
                rgb.extend([blend(p[0], p[3]), blend(p[1], p[3]), blend(p[2], p[3])]);
            }
            (rgb, "DeviceRGB")
        }
    }
}

struct JpegFrame {
    width: u32,
    height: u32,
    components: u8,
}

/// Walk the JPEG marker segments up to the first start-of-frame
fn read_jpeg_frame(data: &[u8]) -> Result<JpegFrame> {
    let mut i = 2;
    while i + 9 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];
        let is_sof = (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            return Ok(JpegFrame {
                height: u32::from(u16::from_be_bytes([data[i + 5], data[i + 6]])),
                width: u32::from(u16::from_be_bytes([data[i + 7], data[i + 8]])),
                components: data[i + 9],
            });
        }

        let length = usize::from(u16::from_be_bytes([data[i + 2], data[i + 3]]));
        if length < 2 {
            break;
        }
        i += 2 + length;
    }

    Err(PdfError::ImageError("Could not parse JPEG frame header".to_string()))
}

/// Generate operators to draw an image with its lower-left corner at (x, y)
pub fn generate_image_operators(image_name: &str, x: f64, y: f64, width: f64, height: f64) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{image_name} Do\nQ\n").into_bytes()
}
