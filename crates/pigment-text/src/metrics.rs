//! Line metrics, caret geometry and ink bounds

use std::collections::BTreeMap;

use ttf_parser::{GlyphId, Tag};

use crate::font::Font;
use crate::shaping::{ShapedRun, TextShaper};

const OS2_TAG: Tag = Tag::from_bytes(b"OS/2");

/// `xAvgCharWidth` of a raw `OS/2` table, in font units
fn average_char_width(os2: &[u8]) -> Option<i16> {
    let bytes = os2.get(2..4)?;
    Some(i16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Scaled face metrics in pixels.
///
/// `ascent` and `descent` are distances from the baseline and both positive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub leading: f32,
    pub line_height: f32,
    pub x_height: f32,
    pub cap_height: f32,
    pub underline_position: f32,
    pub underline_thickness: f32,
    pub strikeout_position: f32,
    pub strikeout_thickness: f32,
    pub x_min: f32,
    pub x_max: f32,
    pub avg_char_width: f32,
    pub max_char_width: f32,
}

/// Rectangle covered by a block of text, relative to the first baseline's
/// line box (top-left of the first line is the origin)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Font {
    /// Shape a run with this font.
    ///
    /// Shaping only fails for face data that does not parse, which
    /// [`Font::new`] already rules out, so failures yield an empty run.
    pub fn shape(&self, text: &str) -> ShapedRun {
        TextShaper::new().shape(self, text).unwrap_or_else(|e| {
            tracing::warn!("Shaping {:?} with {} failed: {}", text, self.family(), e);
            ShapedRun::empty(self.size(), self.units_per_em())
        })
    }

    /// Shaped advance of a run in pixels
    pub fn advance_x(&self, text: &str) -> f32 {
        self.shape(text).width()
    }

    /// Advance of a single character in pixels
    pub fn char_advance(&self, c: char) -> f32 {
        let mut buf = [0u8; 4];
        self.advance_x(c.encode_utf8(&mut buf))
    }

    /// Per-character advances in logical order.
    ///
    /// Glyph clusters are mapped back to characters; a cluster covering
    /// several characters (a ligature) splits its advance evenly.
    pub fn char_advances(&self, text: &str) -> Vec<f32> {
        let char_starts: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        let mut advances = vec![0.0; char_starts.len()];
        if char_starts.is_empty() {
            return advances;
        }

        let run = self.shape(text);
        let scale = run.scale();
        let mut clusters: BTreeMap<usize, f32> = BTreeMap::new();
        for glyph in &run.glyphs {
            *clusters.entry(glyph.cluster as usize).or_default() += glyph.x_advance as f32 * scale;
        }

        let clusters: Vec<(usize, f32)> = clusters.into_iter().collect();
        for (n, &(start, advance)) in clusters.iter().enumerate() {
            let end = clusters.get(n + 1).map_or(text.len(), |&(next, _)| next);
            let first = char_starts.partition_point(|&b| b < start);
            let last = char_starts.partition_point(|&b| b < end);
            if last <= first {
                continue;
            }
            let share = advance / (last - first) as f32;
            for a in &mut advances[first..last] {
                *a = share;
            }
        }
        advances
    }

    /// Caret x positions for every character boundary.
    ///
    /// Returns `chars + 1` non-decreasing values starting at 0.
    pub fn caret_positions(&self, text: &str) -> Vec<f32> {
        let advances = self.char_advances(text);
        let mut positions = Vec::with_capacity(advances.len() + 1);
        let mut x = 0.0f32;
        positions.push(x);
        for advance in advances {
            x = x.max(x + advance);
            positions.push(x);
        }
        positions
    }

    /// Character offset of the caret boundary nearest to `x`.
    ///
    /// Ties go to the earlier offset. Positions left of the text map to 0
    /// and positions right of it to the character count.
    pub fn index_for_position(&self, text: &str, x: f32) -> usize {
        let positions = self.caret_positions(text);
        let last = positions.len() - 1;
        if x.is_nan() || x <= 0.0 {
            return 0;
        }
        if x > positions[last] {
            return last;
        }

        let mut best = 0;
        for (i, &p) in positions.iter().enumerate() {
            if (p - x).abs() < (positions[best] - x).abs() {
                best = i;
            }
        }
        best
    }

    /// Bounds of possibly multi-line text.
    ///
    /// Lines are split on `'\n'` (a trailing newline does not start a new
    /// line). Horizontal extent is the union of glyph ink boxes and the
    /// origin; vertical extent is one line height per line.
    pub fn text_bounds(&self, text: &str) -> TextBounds {
        let mut lines: Vec<&str> = text.split('\n').collect();
        if lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        if lines.is_empty() {
            return TextBounds::default();
        }

        let (left, right) = self
            .with_face(|face| {
                let mut left = 0.0f32;
                let mut right = 0.0f32;
                for line in &lines {
                    let run = self.shape(line);
                    let scale = run.scale();
                    for glyph in run.positioned_glyphs() {
                        if let Some(bbox) = face.glyph_bounding_box(GlyphId(glyph.glyph_id)) {
                            left = left.min(glyph.x + bbox.x_min as f32 * scale);
                            right = right.max(glyph.x + bbox.x_max as f32 * scale);
                        }
                    }
                }
                (left, right)
            })
            .unwrap_or((0.0, 0.0));

        TextBounds {
            x: left,
            y: 0.0,
            width: right - left,
            height: lines.len() as f32 * self.line_height(),
        }
    }

    /// Scaled metrics of the face
    pub fn metrics(&self) -> FontMetrics {
        let scale = self.scale();
        let px = |v: i16| v as f32 * scale;
        let mut metrics = FontMetrics {
            ascent: self.ascent(),
            descent: self.descent(),
            leading: self.leading(),
            line_height: self.line_height(),
            ..FontMetrics::default()
        };

        self.with_face(|face| {
            metrics.x_height = face.x_height().map(px).unwrap_or(0.0);
            metrics.cap_height = face.capital_height().map(px).unwrap_or(0.0);
            if let Some(underline) = face.underline_metrics() {
                // Stored relative to the baseline with up positive
                metrics.underline_position = -px(underline.position);
                metrics.underline_thickness = px(underline.thickness);
            }
            if let Some(strikeout) = face.strikeout_metrics() {
                metrics.strikeout_position = -px(strikeout.position);
                metrics.strikeout_thickness = px(strikeout.thickness);
            }
            let bbox = face.global_bounding_box();
            metrics.x_min = px(bbox.x_min);
            metrics.x_max = px(bbox.x_max);
            metrics.max_char_width = px(bbox.width());
            metrics.avg_char_width = face
                .raw_face()
                .table(OS2_TAG)
                .and_then(average_char_width)
                .map(px)
                .unwrap_or(0.0);
        });

        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontCatalog;
    use crate::FontStyle;

    #[test]
    fn test_average_char_width_field() {
        // version, then xAvgCharWidth = 0x01F4
        assert_eq!(average_char_width(&[0x00, 0x04, 0x01, 0xF4, 0x01, 0x90]), Some(500));
        assert_eq!(average_char_width(&[0x00, 0x04, 0xFF, 0xFE]), Some(-2));
        assert_eq!(average_char_width(&[0x00, 0x04, 0x01]), None);
    }

    #[test]
    fn test_metrics_of_system_font() {
        let catalog = FontCatalog::shared();
        let Ok(font) = catalog.load_font(None, 16.0, FontStyle::default()) else {
            return;
        };
        let has_os2 = font
            .with_face(|face| face.raw_face().table(OS2_TAG).is_some())
            .unwrap_or(false);
        let metrics = font.metrics();
        assert!(metrics.ascent > 0.0);
        assert!(metrics.line_height > 0.0);
        if has_os2 {
            assert!(metrics.avg_char_width > 0.0);
        }
    }
}
