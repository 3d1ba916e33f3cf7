//! Format sniffing and decoding to RGBA
//!
//! The format is taken from the magic bytes, never from a file name.

use std::io::Cursor;

use image::{GenericImageView, ImageFormat as ImgFormat};

use crate::{RenderError, Result};

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        if data.len() < 8 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        // GIF: GIF87a or GIF89a
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Self::Gif;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }

    fn to_image_format(self) -> Option<ImgFormat> {
        match self {
            Self::Png => Some(ImgFormat::Png),
            Self::Jpeg => Some(ImgFormat::Jpeg),
            Self::Gif => Some(ImgFormat::Gif),
            Self::WebP => Some(ImgFormat::WebP),
            Self::Unknown => None,
        }
    }
}

/// Decode to `(width, height, unpremultiplied RGBA)`
pub(crate) fn decode(data: &[u8]) -> Result<(u32, u32, Vec<u8>)> {
    let format = ImageFormat::from_bytes(data);
    let img_format = format
        .to_image_format()
        .ok_or_else(|| RenderError::ImageDecode("unrecognized image data".into()))?;

    let img = image::load(Cursor::new(data), img_format)
        .map_err(|e| RenderError::ImageDecode(e.to_string()))?;

    let (width, height) = img.dimensions();
    Ok((width, height, img.into_rgba8().into_raw()))
}
