//! Text shaper using rustybuzz

use rustybuzz::{Face, UnicodeBuffer, shape};

use super::{ShapedGlyph, ShapedRun};
use crate::font::Font;
use crate::{Result, TextError};

/// Text shaper using HarfBuzz (via rustybuzz).
///
/// Direction, script and language are guessed from the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextShaper;

impl TextShaper {
    /// Create a new text shaper
    pub fn new() -> Self {
        Self
    }

    /// Shape text with a loaded font
    pub fn shape(&self, font: &Font, text: &str) -> Result<ShapedRun> {
        let data = font.data();
        self.shape_with_data(data.bytes(), data.index(), text, font.size())
    }

    /// Shape text with raw font data
    pub fn shape_with_data(
        &self,
        font_data: &[u8],
        face_index: u32,
        text: &str,
        font_size: f32,
    ) -> Result<ShapedRun> {
        let face = Face::from_slice(font_data, face_index)
            .ok_or_else(|| TextError::FontParsing("Failed to parse font".into()))?;
        let units_per_em = u16::try_from(face.units_per_em())
            .map_err(|_| TextError::ShapingFailed("units per em out of range".into()))?;

        if text.is_empty() {
            return Ok(ShapedRun::empty(font_size, units_per_em));
        }

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.guess_segment_properties();

        let output = shape(&face, &[], buffer);

        let glyphs: Vec<ShapedGlyph> = output
            .glyph_infos()
            .iter()
            .zip(output.glyph_positions())
            .map(|(info, pos)| ShapedGlyph {
                glyph_id: info.glyph_id as u16,
                x_offset: pos.x_offset,
                y_offset: pos.y_offset,
                x_advance: pos.x_advance,
                y_advance: pos.y_advance,
                cluster: info.cluster,
            })
            .collect();

        Ok(ShapedRun::new(glyphs, font_size, units_per_em))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_font_data() {
        let err = TextShaper::new()
            .shape_with_data(b"not a font", 0, "abc", 12.0)
            .unwrap_err();
        assert!(matches!(err, TextError::FontParsing(_)));
    }
}
