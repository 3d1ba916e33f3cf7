//! Pigment Text - Fonts, Shaping and Metrics
//!
//! This crate provides the text half of the Pigment renderer:
//! - Font catalog and style matching (fontdb)
//! - Text shaping (rustybuzz - HarfBuzz port)
//! - Line metrics, caret geometry and ink bounds
//! - Glyph outlines as tiny-skia paths
//!
//! Fonts are immutable and cheap to clone, so they can be shared between
//! threads and rendering resources.

pub mod font;
pub mod shaping;
pub mod metrics;
pub mod outline;

pub use font::{
    FaceData, Font, FontCatalog, FontId, FontQuery, FontStyle, FontWeight, FontWidth, Slant,
};
pub use shaping::{PositionedGlyph, ShapedGlyph, ShapedRun, TextShaper};
pub use metrics::{FontMetrics, TextBounds};
pub use outline::outline_run;

/// Text error types
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Failed to parse font: {0}")]
    FontParsing(String),

    #[error("Shaping failed: {0}")]
    ShapingFailed(String),

    #[error("Invalid range {start}..{end} for text of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, TextError>;
