//! Image encoding for `saveImage`

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::Image;
use crate::{RenderError, Result};

/// Output formats, numbered by their C ABI codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodedFormat {
    /// Lossy; quality 0..=100
    Jpeg = 4,
    Png = 5,
    /// Lossless; quality is ignored
    WebP = 7,
}

impl EncodedFormat {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            4 => Some(Self::Jpeg),
            5 => Some(Self::Png),
            7 => Some(Self::WebP),
            _ => None,
        }
    }
}

/// Outcome of saving an image, as reported over the C ABI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SaveStatus {
    Ok = 0,
    UnsupportedFormat = 1,
    EncodeFailed = 2,
    IoFailed = 3,
}

impl SaveStatus {
    pub fn from_result(result: &Result<()>) -> Self {
        match result {
            Ok(()) => Self::Ok,
            Err(RenderError::UnsupportedFormat(_)) => Self::UnsupportedFormat,
            Err(RenderError::Io(_)) => Self::IoFailed,
            Err(_) => Self::EncodeFailed,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

pub(crate) fn encode(image: &Image, format: EncodedFormat, quality: i32) -> Result<Vec<u8>> {
    let (width, height) = image.bounds();
    let rgba = image.to_rgba8();
    let mut bytes = Vec::new();

    let encoded = match format {
        EncodedFormat::Png => PngEncoder::new(&mut bytes).write_image(&rgba, width, height, ExtendedColorType::Rgba8),
        EncodedFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb: Vec<u8> = rgba
                .chunks_exact(4)
                .flat_map(|p| [p[0], p[1], p[2]])
                .collect();
            let quality = quality.clamp(1, 100) as u8;
            JpegEncoder::new_with_quality(&mut bytes, quality).write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        }
        EncodedFormat::WebP => {
            WebPEncoder::new_lossless(&mut bytes).write_image(&rgba, width, height, ExtendedColorType::Rgba8)
        }
    };

    encoded.map_err(|e| RenderError::ImageEncode(e.to_string()))?;
    Ok(bytes)
}
