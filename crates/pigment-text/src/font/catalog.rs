//! Font catalog for loading and matching fonts

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use fontdb::{Database, FaceInfo};

use super::{FaceData, Font, FontId, FontQuery, FontStyle};
use crate::{Result, TextError};

/// Font catalog: a fontdb database plus a cache of loaded face bytes.
///
/// Matching never hard-fails for a missing family or style: a substitute
/// from the fallback families (or any face at all) is returned instead.
pub struct FontCatalog {
    db: Database,
    fallbacks: Vec<String>,
    faces: Mutex<HashMap<fontdb::ID, Arc<FaceData>>>,
}

impl FontCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            db: Database::new(),
            fallbacks: vec!["sans-serif".to_string()],
            faces: Mutex::new(HashMap::new()),
        }
    }

    /// Create a catalog with system fonts loaded
    pub fn with_system_fonts() -> Self {
        let mut catalog = Self::new();
        catalog.load_system_fonts();
        catalog
    }

    /// Process-wide catalog of system fonts, loaded on first use
    pub fn shared() -> Arc<FontCatalog> {
        static SHARED: OnceLock<Arc<FontCatalog>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(FontCatalog::with_system_fonts()))
            .clone()
    }

    /// Load system fonts into the catalog
    pub fn load_system_fonts(&mut self) {
        self.db.load_system_fonts();
        tracing::debug!("Loaded {} system font faces", self.db.len());
    }

    /// Find a face matching the query
    pub fn query(&self, query: &FontQuery) -> Option<FontId> {
        let families: Vec<fontdb::Family> = query
            .families
            .iter()
            .map(|f| fontdb::Family::Name(f.as_str()))
            .collect();

        self.db
            .query(&fontdb::Query {
                families: &families,
                weight: query.style.weight.into(),
                stretch: query.style.width.into(),
                style: query.style.slant.into(),
            })
            .map(FontId)
    }

    /// Resolve a font.
    ///
    /// `name` may be a path to a font file or a family name. `None` selects
    /// the default family. Fails only when the catalog has no faces at all.
    pub fn load_font(&self, name: Option<&str>, size: f32, style: FontStyle) -> Result<Font> {
        self.load_font_with_fallbacks(name, size, style, &self.fallbacks)
    }

    /// Resolve a font, trying `fallbacks` instead of the catalog's own
    /// fallback families
    pub fn load_font_with_fallbacks<S: AsRef<str>>(
        &self,
        name: Option<&str>,
        size: f32,
        style: FontStyle,
        fallbacks: &[S],
    ) -> Result<Font> {
        if let Some(name) = name {
            let path = Path::new(name);
            if path.is_file() {
                match Self::font_from_file(path, size, style) {
                    Ok(font) => return Ok(font),
                    Err(e) => tracing::warn!("Falling back to family match for {}: {}", name, e),
                }
            }
        }

        let requested: Vec<&str> = name.into_iter().collect();
        let query = FontQuery::new(&requested)
            .style(style)
            .with_fallbacks(fallbacks);

        let id = self
            .query(&query)
            .or_else(|| self.db.faces().next().map(|face| FontId(face.id)))
            .ok_or_else(|| TextError::FontNotFound(name.unwrap_or("<default>").to_string()))?;

        if let (Some(name), Some(info)) = (name, self.face_info(id)) {
            let matched = info.families.iter().any(|(family, _)| family.eq_ignore_ascii_case(name));
            if !matched {
                tracing::debug!(
                    "Font family {:?} not available, substituting {:?}",
                    name,
                    info.families.first().map(|(family, _)| family.as_str())
                );
            }
        }

        let data = self
            .face_data(id)
            .ok_or_else(|| TextError::FontNotFound(format!("face data for {:?}", id)))?;
        Ok(Font::new(data, size, style)?.with_id(id))
    }

    fn font_from_file(path: &Path, size: f32, style: FontStyle) -> Result<Font> {
        let bytes = std::fs::read(path)
            .map_err(|e| TextError::FontParsing(format!("{}: {}", path.display(), e)))?;
        Self::font_from_data(bytes, size, style)
    }

    /// Font from the bytes of a TrueType/OpenType file (first face of a
    /// collection), bypassing the catalog
    pub fn font_from_data(bytes: Vec<u8>, size: f32, style: FontStyle) -> Result<Font> {
        Font::new(Arc::new(FaceData::new(bytes, 0)), size, style)
    }

    /// Shared face bytes for a catalog entry
    pub fn face_data(&self, id: FontId) -> Option<Arc<FaceData>> {
        let mut faces = match self.faces.lock() {
            Ok(faces) => faces,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(data) = faces.get(&id.0) {
            return Some(data.clone());
        }

        let data = self
            .db
            .with_face_data(id.0, |bytes, index| Arc::new(FaceData::new(bytes.to_vec(), index)))?;
        faces.insert(id.0, data.clone());
        Some(data)
    }

    /// Get face info by ID
    pub fn face_info(&self, id: FontId) -> Option<&FaceInfo> {
        self.db.face(id.0)
    }

    /// Sorted, de-duplicated list of family names
    pub fn families(&self) -> Vec<&str> {
        let mut families: Vec<&str> = self
            .db
            .faces()
            .filter_map(|f| f.families.first().map(|(name, _)| name.as_str()))
            .collect();
        families.sort_unstable();
        families.dedup();
        families
    }

    /// Number of distinct families
    pub fn family_count(&self) -> usize {
        self.families().len()
    }

    /// Family name at `index` in the sorted family list
    pub fn family_name(&self, index: usize) -> Option<&str> {
        self.families().get(index).copied()
    }

    /// Number of loaded faces
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Check if catalog is empty
    pub fn is_empty(&self) -> bool {
        self.db.len() == 0
    }
}

impl Default for FontCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_catalog_fails_loudly() {
        let catalog = FontCatalog::new();
        let err = catalog
            .load_font(Some("Arial"), 16.0, FontStyle::default())
            .unwrap_err();
        assert!(matches!(err, TextError::FontNotFound(_)));
    }

    #[test]
    fn test_missing_family_falls_back() {
        let catalog = FontCatalog::with_system_fonts();
        if catalog.is_empty() {
            // Skip on systems without fonts
            return;
        }
        let font = catalog
            .load_font(Some("No Such Family 12345"), 16.0, FontStyle::default())
            .unwrap();
        assert_eq!(font.size(), 16.0);
        assert!(font.id().is_some());
    }

    #[test]
    fn test_custom_fallbacks() {
        let catalog = FontCatalog::with_system_fonts();
        if catalog.is_empty() {
            return;
        }
        let font = catalog
            .load_font_with_fallbacks(None, 10.0, FontStyle::default(), &["monospace"])
            .unwrap();
        assert_eq!(font.size(), 10.0);
    }

    #[test]
    fn test_family_listing() {
        let catalog = FontCatalog::with_system_fonts();
        if catalog.is_empty() {
            return;
        }
        let count = catalog.family_count();
        assert!(count > 0);
        assert!(catalog.family_name(0).is_some());
        assert!(catalog.family_name(count).is_none());
    }

    #[test]
    fn test_face_data_is_cached() {
        let catalog = FontCatalog::with_system_fonts();
        let Some(id) = catalog.query(&FontQuery::default()) else {
            return;
        };
        let first = catalog.face_data(id).unwrap();
        let second = catalog.face_data(id).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_font_from_data() {
        let err = FontCatalog::font_from_data(b"definitely not a font".to_vec(), 12.0, FontStyle::default())
            .unwrap_err();
        assert!(matches!(err, TextError::FontParsing(_)));

        let catalog = FontCatalog::with_system_fonts();
        let Some(data) = catalog
            .query(&FontQuery::default())
            .and_then(|id| catalog.face_data(id))
            .filter(|data| data.index() == 0)
        else {
            return;
        };
        let font = FontCatalog::font_from_data(data.bytes().to_vec(), 14.0, FontStyle::default()).unwrap();
        assert_eq!(font.size(), 14.0);
        assert!(font.id().is_none());
        assert!(font.line_height() > 0.0);
    }
}
