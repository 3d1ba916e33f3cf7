//! Text drawing on resources
//!
//! Lines are stacked with a per-resource text cursor: `next_line` moves it
//! down by one line height and `clear` resets it. Caret and selection
//! boxes span one line height starting at the cursor.

use tiny_skia::Transform;

use crate::surface::Resource;
use crate::{RenderError, Result};
use pigment_text::{Font, outline_run};

impl Resource {
    /// Draw one line of text with its baseline at `(x, y + cursor)`.
    ///
    /// No wrapping; newlines are drawn like any other character.
    pub fn render_line(&mut self, font: &Font, text: &str, x: f32, y: f32) {
        let Some(path) = outline_run(font, text) else {
            return;
        };
        let origin = Transform::from_translate(x, y + self.text_cursor());
        self.paint_path(&path, origin);
    }

    /// Move the text cursor down by the font's line height
    pub fn next_line(&mut self, font: &Font) {
        self.advance_text_cursor(font.line_height());
    }

    /// Draw a caret block at character offset `index` (clamped to the
    /// text length).
    ///
    /// The block is as wide as the character under the caret, or as wide
    /// as `'8'` at the end of the text.
    pub fn render_cursor(&mut self, font: &Font, text: &str, index: usize) {
        let positions = font.caret_positions(text);
        let index = index.min(positions.len() - 1);
        let width = match text.chars().nth(index) {
            Some(c) => font.char_advance(c),
            None => font.char_advance('8'),
        };
        let top = self.text_cursor();
        self.draw_rect(positions[index], top, width, font.line_height());
    }

    /// Highlight the characters in `start..end`.
    ///
    /// Fails with `InvalidRange` unless `start <= end <= len`. An empty
    /// range draws nothing.
    pub fn render_selection(&mut self, font: &Font, text: &str, start: usize, end: usize) -> Result<()> {
        if self.is_released() {
            return Err(RenderError::UseAfterFree);
        }
        let positions = font.caret_positions(text);
        let len = positions.len() - 1;
        if start > end || end > len {
            return Err(RenderError::InvalidRange { start, end, len });
        }
        if start == end {
            return Ok(());
        }
        let left = positions[start];
        let top = self.text_cursor();
        self.draw_rect(left, top, positions[end] - left, font.line_height());
        Ok(())
    }
}
