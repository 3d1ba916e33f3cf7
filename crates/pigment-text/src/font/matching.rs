//! Font matching and query

use super::FontStyle;

/// Font query for matching
#[derive(Debug, Clone)]
pub struct FontQuery {
    /// Font families to try (in order)
    pub families: Vec<String>,
    /// Desired weight, width and slant
    pub style: FontStyle,
}

impl FontQuery {
    /// Create a new font query
    pub fn new(families: &[&str]) -> Self {
        Self {
            families: families.iter().map(|s| s.to_string()).collect(),
            style: FontStyle::default(),
        }
    }

    /// Set font style
    pub fn style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    /// Append fallback families, expanding generic names
    pub fn with_fallbacks<S: AsRef<str>>(mut self, fallbacks: &[S]) -> Self {
        for family in fallbacks {
            let family = family.as_ref();
            let expanded = resolve_generic_family(family);
            if expanded.is_empty() {
                self.push_family(family);
            } else {
                for name in expanded {
                    self.push_family(name);
                }
            }
        }
        self
    }

    fn push_family(&mut self, family: &str) {
        if !self.families.iter().any(|f| f.eq_ignore_ascii_case(family)) {
            self.families.push(family.to_string());
        }
    }
}

impl Default for FontQuery {
    fn default() -> Self {
        Self::new(&[]).with_fallbacks(&["sans-serif"])
    }
}

/// Resolve generic font family to concrete system families
pub fn resolve_generic_family(family: &str) -> &'static [&'static str] {
    match family.to_lowercase().as_str() {
        "serif" => &["Times New Roman", "Times", "DejaVu Serif", "Noto Serif", "Liberation Serif"],
        "sans-serif" => &["Arial", "Helvetica", "DejaVu Sans", "Noto Sans", "Liberation Sans"],
        "monospace" => &["Courier New", "Consolas", "DejaVu Sans Mono", "Noto Sans Mono"],
        "system-ui" => &["Segoe UI", "San Francisco", "Ubuntu", "Cantarell"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_expansion() {
        let query = FontQuery::new(&["Arial"]).with_fallbacks(&["sans-serif", "Custom"]);
        assert_eq!(query.families[0], "Arial");
        // Arial is not duplicated by the generic expansion
        assert_eq!(query.families.iter().filter(|f| *f == "Arial").count(), 1);
        assert!(query.families.contains(&"DejaVu Sans".to_string()));
        assert_eq!(query.families.last().map(String::as_str), Some("Custom"));
    }

    #[test]
    fn test_unknown_generic() {
        assert!(resolve_generic_family("fantasy-unknown").is_empty());
    }
}
