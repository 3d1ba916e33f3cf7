//! Renderer Configuration

use crate::Color;

/// Renderer configuration options
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Color used by `clear` on root surfaces
    pub background: Color,

    /// Anti-aliasing for new paint stacks
    pub anti_alias: bool,

    /// Font size used when a request has no valid size
    pub default_font_size: f32,

    /// Families tried when a requested family is missing
    pub fallback_families: Vec<String>,

    /// Largest accepted surface width or height
    pub max_dimension: u32,

    /// Load system fonts into the catalog on first use
    pub load_system_fonts: bool,
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_anti_alias(mut self, anti_alias: bool) -> Self {
        self.anti_alias = anti_alias;
        self
    }

    pub fn with_default_font_size(mut self, size: f32) -> Self {
        self.default_font_size = size;
        self
    }

    pub fn with_fallback_families<S: AsRef<str>>(mut self, families: &[S]) -> Self {
        self.fallback_families = families.iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    pub fn with_system_fonts(mut self, load: bool) -> Self {
        self.load_system_fonts = load;
        self
    }

    /// Check a requested surface size against the limits
    pub fn accepts_dimensions(&self, width: i32, height: i32) -> bool {
        width > 0 && height > 0 && width as u32 <= self.max_dimension && height as u32 <= self.max_dimension
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            anti_alias: true,
            default_font_size: pigment_text::font::DEFAULT_FONT_SIZE,
            fallback_families: vec!["sans-serif".to_string()],
            max_dimension: 16384,
            load_system_fonts: true,
        }
    }
}
