//! Font loading and matching module

mod catalog;
mod face;
mod matching;

pub use catalog::FontCatalog;
pub use face::{DEFAULT_FONT_SIZE, FaceData, Font};
pub use matching::{FontQuery, resolve_generic_family};

/// Unique identifier for a face in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub fontdb::ID);

/// Font weight (1-1000, 400 is normal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const THIN: FontWeight = FontWeight(100);
    pub const LIGHT: FontWeight = FontWeight(300);
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const MEDIUM: FontWeight = FontWeight(500);
    pub const BOLD: FontWeight = FontWeight(700);
    pub const BLACK: FontWeight = FontWeight(900);

    /// Weight from a raw request value; negative means "unspecified"
    pub fn from_request(value: i32) -> Self {
        if value < 0 {
            Self::NORMAL
        } else {
            FontWeight(value.clamp(1, 1000) as u16)
        }
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl From<FontWeight> for fontdb::Weight {
    fn from(weight: FontWeight) -> Self {
        fontdb::Weight(weight.0)
    }
}

/// Font width on the 1 (ultra condensed) to 9 (ultra expanded) scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontWidth(pub u8);

impl FontWidth {
    pub const CONDENSED: FontWidth = FontWidth(3);
    pub const NORMAL: FontWidth = FontWidth(5);
    pub const EXPANDED: FontWidth = FontWidth(7);

    /// Width from a raw request value; negative means "unspecified"
    pub fn from_request(value: i32) -> Self {
        if value < 0 {
            Self::NORMAL
        } else {
            FontWidth(value.clamp(1, 9) as u8)
        }
    }
}

impl Default for FontWidth {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl From<FontWidth> for fontdb::Stretch {
    fn from(width: FontWidth) -> Self {
        match width.0 {
            0 | 1 => fontdb::Stretch::UltraCondensed,
            2 => fontdb::Stretch::ExtraCondensed,
            3 => fontdb::Stretch::Condensed,
            4 => fontdb::Stretch::SemiCondensed,
            5 => fontdb::Stretch::Normal,
            6 => fontdb::Stretch::SemiExpanded,
            7 => fontdb::Stretch::Expanded,
            8 => fontdb::Stretch::ExtraExpanded,
            _ => fontdb::Stretch::UltraExpanded,
        }
    }
}

/// Font slant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Slant {
    #[default]
    Upright,
    Italic,
    Oblique,
}

impl Slant {
    /// Slant from a raw request code: 2 italic, 3 oblique, anything else upright
    pub fn from_request(code: i32) -> Self {
        match code {
            2 => Slant::Italic,
            3 => Slant::Oblique,
            _ => Slant::Upright,
        }
    }
}

impl From<fontdb::Style> for Slant {
    fn from(style: fontdb::Style) -> Self {
        match style {
            fontdb::Style::Normal => Slant::Upright,
            fontdb::Style::Italic => Slant::Italic,
            fontdb::Style::Oblique => Slant::Oblique,
        }
    }
}

impl From<Slant> for fontdb::Style {
    fn from(slant: Slant) -> Self {
        match slant {
            Slant::Upright => fontdb::Style::Normal,
            Slant::Italic => fontdb::Style::Italic,
            Slant::Oblique => fontdb::Style::Oblique,
        }
    }
}

/// Requested weight, width and slant of a font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontStyle {
    pub weight: FontWeight,
    pub width: FontWidth,
    pub slant: Slant,
}

impl FontStyle {
    pub fn new(weight: FontWeight, width: FontWidth, slant: Slant) -> Self {
        Self { weight, width, slant }
    }

    /// Style from raw request values (`-1` means default for each field)
    pub fn from_request(weight: i32, width: i32, slant: i32) -> Self {
        Self {
            weight: FontWeight::from_request(weight),
            width: FontWidth::from_request(width),
            slant: Slant::from_request(slant),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let style = FontStyle::from_request(-1, -1, -1);
        assert_eq!(style.weight, FontWeight::NORMAL);
        assert_eq!(style.width, FontWidth::NORMAL);
        assert_eq!(style.slant, Slant::Upright);
    }

    #[test]
    fn test_request_clamping() {
        assert_eq!(FontWeight::from_request(5000), FontWeight(1000));
        assert_eq!(FontWidth::from_request(42), FontWidth(9));
        assert_eq!(Slant::from_request(2), Slant::Italic);
        assert_eq!(Slant::from_request(3), Slant::Oblique);
        assert_eq!(Slant::from_request(0), Slant::Upright);
    }

    #[test]
    fn test_width_to_stretch() {
        assert_eq!(fontdb::Stretch::from(FontWidth::NORMAL), fontdb::Stretch::Normal);
        assert_eq!(fontdb::Stretch::from(FontWidth(1)), fontdb::Stretch::UltraCondensed);
        assert_eq!(fontdb::Stretch::from(FontWidth(9)), fontdb::Stretch::UltraExpanded);
    }
}
