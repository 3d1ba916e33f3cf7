//! Text shaping module

mod run;
mod shaper;

pub use run::{PositionedGlyph, ShapedGlyph, ShapedRun};
pub use shaper::TextShaper;
