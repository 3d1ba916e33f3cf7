//! Image handling module
//!
//! Decoding from files and memory, drawing onto resources, and encoding
//! back to PNG, JPEG or WebP.

mod decoder;
mod encoder;
mod renderer;

use std::path::Path;
use std::sync::Arc;

use tiny_skia::{ColorU8, IntSize, Pixmap};

use crate::{Color, RenderError, Result};

pub use decoder::ImageFormat;
pub use encoder::{EncodedFormat, SaveStatus};

/// Immutable decoded image.
///
/// Pixels are stored premultiplied, ready to be drawn. Cloning shares the
/// pixel data.
#[derive(Clone)]
pub struct Image {
    pixmap: Arc<Pixmap>,
}

impl Image {
    /// Wrap a rendered pixmap
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixmap: Arc::new(pixmap) }
    }

    /// Create from unpremultiplied RGBA bytes
    pub fn from_rgba8(width: u32, height: u32, rgba: &[u8]) -> Result<Self> {
        let size = IntSize::from_wh(width, height).ok_or(RenderError::InvalidDimension {
            width: width as i32,
            height: height as i32,
        })?;
        if rgba.len() != size.width() as usize * size.height() as usize * 4 {
            return Err(RenderError::ImageDecode(format!(
                "expected {} bytes for {}x{} RGBA, got {}",
                width as usize * height as usize * 4,
                width,
                height,
                rgba.len()
            )));
        }

        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::InvalidDimension {
            width: width as i32,
            height: height as i32,
        })?;
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.chunks_exact(4)) {
            *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }
        Ok(Self::from_pixmap(pixmap))
    }

    /// Load and decode an image file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| RenderError::ImageDecode(format!("{}: {}", path.display(), e)))?;
        let image = Self::from_memory(&data)?;
        tracing::debug!("Loaded {}x{} image from {}", image.width(), image.height(), path.display());
        Ok(image)
    }

    /// Decode an encoded image held in memory
    pub fn from_memory(data: &[u8]) -> Result<Self> {
        let (width, height, rgba) = decoder::decode(data)?;
        Self::from_rgba8(width, height, &rgba)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// `(width, height)` in pixels
    pub fn bounds(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Premultiplied pixel storage
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Unpremultiplied color at `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.pixmap.pixel(x, y).map(Color::from)
    }

    /// Unpremultiplied RGBA bytes, row by row
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }

    /// Encode and write to `path`
    pub fn save(&self, path: impl AsRef<Path>, format: EncodedFormat, quality: i32) -> Result<()> {
        let bytes = encoder::encode(self, format, quality)?;
        std::fs::write(path.as_ref(), bytes)?;
        tracing::debug!("Saved {:?} image to {}", format, path.as_ref().display());
        Ok(())
    }

    /// Encode with a raw format code, reporting the outcome as a status
    pub fn save_with_code(&self, path: impl AsRef<Path>, format: i32, quality: i32) -> SaveStatus {
        let result = EncodedFormat::from_code(format)
            .ok_or(RenderError::UnsupportedFormat(format))
            .and_then(|format| self.save(path, format, quality));
        if let Err(e) = &result {
            tracing::warn!("Saving image failed: {}", e);
        }
        SaveStatus::from_result(&result)
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}
