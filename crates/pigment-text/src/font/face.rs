//! Loaded font with parsed metrics

use std::fmt;
use std::sync::Arc;

use ttf_parser::Face;

use super::{FontId, FontStyle};
use crate::{Result, TextError};

/// Size used when a caller asks for a non-positive or non-finite size
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Raw bytes of a font file plus the index of the face inside it
pub struct FaceData {
    bytes: Vec<u8>,
    index: u32,
}

impl FaceData {
    pub fn new(bytes: Vec<u8>, index: u32) -> Self {
        Self { bytes, index }
    }

    /// Font file bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Face index inside a collection (0 for plain font files)
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Parse the face
    pub fn parse(&self) -> Option<Face<'_>> {
        Face::parse(&self.bytes, self.index).ok()
    }
}

impl fmt::Debug for FaceData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaceData")
            .field("len", &self.bytes.len())
            .field("index", &self.index)
            .finish()
    }
}

/// Vertical metrics in font units, read once at load time
#[derive(Debug, Clone, Copy)]
struct VerticalMetrics {
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    line_gap: i16,
}

/// A face at a given size.
///
/// Immutable once created. Cloning shares the face bytes, so fonts can be
/// handed to any number of resources and threads.
#[derive(Clone)]
pub struct Font {
    data: Arc<FaceData>,
    id: Option<FontId>,
    family: Arc<str>,
    size: f32,
    style: FontStyle,
    vertical: VerticalMetrics,
}

impl Font {
    /// Create a font from face data, validating that it parses
    pub fn new(data: Arc<FaceData>, size: f32, style: FontStyle) -> Result<Self> {
        let face = data
            .parse()
            .ok_or_else(|| TextError::FontParsing("face data did not parse".into()))?;

        let units_per_em = face.units_per_em();
        if units_per_em == 0 {
            return Err(TextError::FontParsing("units per em is zero".into()));
        }

        let vertical = VerticalMetrics {
            units_per_em,
            ascender: face.ascender(),
            descender: face.descender(),
            line_gap: face.line_gap(),
        };
        let family: Arc<str> = family_name(&face).unwrap_or_else(|| "Unknown".into()).into();
        drop(face);

        Ok(Self {
            data,
            id: None,
            family,
            size: sanitize_size(size),
            style,
            vertical,
        })
    }

    pub(crate) fn with_id(mut self, id: FontId) -> Self {
        self.id = Some(id);
        self
    }

    /// Catalog id, if the font came from the catalog
    pub fn id(&self) -> Option<FontId> {
        self.id
    }

    /// Family name as recorded in the font's name table
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Size in pixels per em
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Style that was requested when the font was loaded
    pub fn style(&self) -> FontStyle {
        self.style
    }

    /// Underlying face data
    pub fn data(&self) -> &FaceData {
        &self.data
    }

    /// Same face at another size
    pub fn with_size(&self, size: f32) -> Font {
        Font {
            size: sanitize_size(size),
            ..self.clone()
        }
    }

    /// Scale factor from font units to pixels
    pub fn scale(&self) -> f32 {
        self.size / self.vertical.units_per_em as f32
    }

    pub fn units_per_em(&self) -> u16 {
        self.vertical.units_per_em
    }

    /// Distance from baseline to the top of the line box (positive)
    pub fn ascent(&self) -> f32 {
        self.vertical.ascender as f32 * self.scale()
    }

    /// Distance from baseline to the bottom of the line box (positive)
    pub fn descent(&self) -> f32 {
        -(self.vertical.descender as f32) * self.scale()
    }

    /// Extra spacing between lines
    pub fn leading(&self) -> f32 {
        self.vertical.line_gap as f32 * self.scale()
    }

    /// Recommended distance between consecutive baselines
    pub fn line_height(&self) -> f32 {
        self.ascent() + self.descent() + self.leading()
    }

    /// Run a closure against the parsed face
    pub fn with_face<R>(&self, f: impl FnOnce(&Face<'_>) -> R) -> Option<R> {
        self.data.parse().map(|face| f(&face))
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("family", &self.family)
            .field("size", &self.size)
            .field("style", &self.style)
            .finish()
    }
}

fn sanitize_size(size: f32) -> f32 {
    if size.is_finite() && size > 0.0 {
        size
    } else {
        DEFAULT_FONT_SIZE
    }
}

fn family_name(face: &Face<'_>) -> Option<String> {
    let names = face.names();
    [ttf_parser::name_id::TYPOGRAPHIC_FAMILY, ttf_parser::name_id::FAMILY]
        .into_iter()
        .find_map(|id| {
            names
                .into_iter()
                .filter(|name| name.name_id == id)
                .find_map(|name| name.to_string())
        })
}
