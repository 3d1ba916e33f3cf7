//! Pigment Render - Immediate-Mode 2D Rendering
//!
//! CPU rendering on top of tiny-skia:
//! - Surfaces (software, offscreen and window-backed) and their lifecycle
//! - Transform/clip and paint state stacks
//! - Paths, polygons and rounded rectangles
//! - Text drawing, carets and selections
//! - Image decoding, drawing and encoding

mod config;
mod handle;
mod presenter;
mod raster;
mod state;
mod surface;
mod text;
pub mod image;

pub use config::RenderConfig;
pub use handle::{Handle, HandleTable};
pub use crate::image::{EncodedFormat, Image, ImageFormat, SaveStatus};
pub use presenter::{Presenter, WindowPresenter};
pub use raster::VectorPath;
pub use state::{GraphicsStack, GraphicsState, PaintStack, PaintState, StrokeCap, StrokeJoin, Style};
pub use surface::{PixelFormat, Resource, SurfaceKind, catalog_for, font_from_memory, resolve_font};

pub use pigment_text::{Font, FontCatalog, FontMetrics, FontStyle, TextBounds, TextError};
pub use tiny_skia;

/// Color (RGBA, unpremultiplied)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            3 => Some(Self::rgb(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Whether two colors differ by at most `tolerance` per channel
    pub fn approx_eq(&self, other: &Color, tolerance: u8) -> bool {
        self.r.abs_diff(other.r) <= tolerance
            && self.g.abs_diff(other.g) <= tolerance
            && self.b.abs_diff(other.b) <= tolerance
            && self.a.abs_diff(other.a) <= tolerance
    }
}

impl From<Color> for tiny_skia::Color {
    fn from(c: Color) -> Self {
        tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a)
    }
}

impl From<tiny_skia::PremultipliedColorU8> for Color {
    fn from(p: tiny_skia::PremultipliedColorU8) -> Self {
        let c = p.demultiply();
        Color::rgba(c.red(), c.green(), c.blue(), c.alpha())
    }
}

/// Rendering error types
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Backend initialization failed: {0}")]
    BackendInit(String),

    #[error("Invalid surface dimensions {width}x{height}")]
    InvalidDimension { width: i32, height: i32 },

    #[error("Resource used after cleanup")]
    UseAfterFree,

    #[error("Restore without matching save")]
    StackUnderflow,

    #[error(transparent)]
    Font(#[from] TextError),

    #[error("Invalid range {start}..{end} for text of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    #[error("Failed to encode image: {0}")]
    ImageEncode(String),

    #[error("Unsupported image format code {0}")]
    UnsupportedFormat(i32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
