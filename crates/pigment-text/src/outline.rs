//! Glyph outlines as tiny-skia paths

use ttf_parser::{GlyphId, OutlineBuilder};

use crate::font::Font;

/// Outline of a shaped run as a single path.
///
/// The pen starts at the origin on the baseline and y grows downwards, so
/// the path can be filled directly in device space. Returns `None` when no
/// glyph has an outline (empty text, whitespace).
pub fn outline_run(font: &Font, text: &str) -> Option<tiny_skia::Path> {
    let run = font.shape(text);
    if run.is_empty() {
        return None;
    }
    let scale = run.scale();

    font.with_face(|face| {
        let mut builder = PathBuilder::new(scale);
        for glyph in run.positioned_glyphs() {
            builder.set_origin(glyph.x, glyph.y);
            // Glyphs without outlines (spaces) contribute nothing
            let _ = face.outline_glyph(GlyphId(glyph.glyph_id), &mut builder);
        }
        builder.finish()
    })
    .flatten()
}

/// Path builder that converts ttf-parser outlines to tiny-skia paths
struct PathBuilder {
    builder: tiny_skia::PathBuilder,
    scale: f32,
    origin_x: f32,
    origin_y: f32,
}

impl PathBuilder {
    fn new(scale: f32) -> Self {
        Self {
            builder: tiny_skia::PathBuilder::new(),
            scale,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }

    fn set_origin(&mut self, x: f32, y: f32) {
        self.origin_x = x;
        self.origin_y = y;
    }

    fn transform_x(&self, x: f32) -> f32 {
        self.origin_x + x * self.scale
    }

    fn transform_y(&self, y: f32) -> f32 {
        self.origin_y - y * self.scale // Flip Y axis
    }

    fn finish(self) -> Option<tiny_skia::Path> {
        self.builder.finish()
    }
}

impl OutlineBuilder for PathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(self.transform_x(x), self.transform_y(y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(self.transform_x(x), self.transform_y(y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(
            self.transform_x(x1), self.transform_y(y1),
            self.transform_x(x), self.transform_y(y),
        );
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            self.transform_x(x1), self.transform_y(y1),
            self.transform_x(x2), self.transform_y(y2),
            self.transform_x(x), self.transform_y(y),
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
