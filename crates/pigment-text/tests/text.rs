//! Integration tests for font loading, shaping and metrics
//!
//! Tests that need real fonts return early on systems without any.

use pigment_text::*;

fn system_font(size: f32) -> Option<Font> {
    let catalog = FontCatalog::shared();
    if catalog.is_empty() {
        return None;
    }
    catalog.load_font(None, size, FontStyle::default()).ok()
}

// ============================================================================
// FONT LOADING TESTS
// ============================================================================

#[test]
fn test_font_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    fn assert_clone<T: Clone>() {}
    assert_send_sync::<Font>();
    assert_clone::<Font>();
    assert_send_sync::<FontCatalog>();
}

#[test]
fn test_load_by_request_values() {
    let catalog = FontCatalog::shared();
    if catalog.is_empty() {
        return;
    }
    let style = FontStyle::from_request(400, 5, 0);
    let font = catalog.load_font(Some("Arial"), 16.0, style).unwrap();
    assert_eq!(font.size(), 16.0);
    assert_eq!(font.style(), style);
    assert!(!font.family().is_empty());
}

#[test]
fn test_invalid_size_uses_default() {
    let Some(font) = system_font(0.0) else { return };
    assert_eq!(font.size(), font::DEFAULT_FONT_SIZE);

    let font = font.with_size(f32::NAN);
    assert_eq!(font.size(), font::DEFAULT_FONT_SIZE);
}

#[test]
fn test_load_from_file_path() {
    let catalog = FontCatalog::shared();
    let Some(path) = catalog
        .query(&FontQuery::default())
        .and_then(|id| catalog.face_info(id))
        .and_then(|info| match &info.source {
            fontdb::Source::File(path) | fontdb::Source::SharedFile(path, _) if info.index == 0 => {
                Some(path.clone())
            }
            _ => None,
        })
    else {
        return;
    };

    let font = catalog
        .load_font(path.to_str(), 20.0, FontStyle::default())
        .unwrap();
    assert_eq!(font.size(), 20.0);
    assert!(font.id().is_none());
}

// ============================================================================
// METRICS TESTS
// ============================================================================

#[test]
fn test_line_height() {
    let Some(font) = system_font(16.0) else { return };
    let metrics = font.metrics();
    assert!(metrics.ascent > 0.0);
    assert!(metrics.descent >= 0.0);
    assert!((font.line_height() - (metrics.ascent + metrics.descent + metrics.leading)).abs() < 1e-4);
    assert_eq!(metrics.line_height, font.line_height());
}

#[test]
fn test_line_height_scales_with_size() {
    let Some(small) = system_font(10.0) else { return };
    let large = small.with_size(20.0);
    assert!((large.line_height() - 2.0 * small.line_height()).abs() < 1e-3);
}

#[test]
fn test_advance_is_monotonic() {
    let Some(font) = system_font(16.0) else { return };
    let text = "Hello, world";
    let mut previous = 0.0;
    for (k, _) in text.char_indices().skip(1).chain([(text.len(), ' ')]) {
        let advance = font.advance_x(&text[..k]);
        assert!(advance >= previous, "advance shrank at byte {}", k);
        previous = advance;
    }
    assert!(previous > 0.0);
}

#[test]
fn test_empty_text() {
    let Some(font) = system_font(16.0) else { return };
    assert_eq!(font.advance_x(""), 0.0);
    assert_eq!(font.caret_positions(""), vec![0.0]);
    assert_eq!(font.index_for_position("", 50.0), 0);
    assert_eq!(font.text_bounds(""), TextBounds::default());
}

// ============================================================================
// CARET TESTS
// ============================================================================

#[test]
fn test_caret_positions() {
    let Some(font) = system_font(16.0) else { return };
    let text = "héllo";
    let positions = font.caret_positions(text);
    assert_eq!(positions.len(), 6);
    assert_eq!(positions[0], 0.0);
    assert!(positions.windows(2).all(|w| w[0] <= w[1]));
    assert!((positions[5] - font.advance_x(text)).abs() < 1e-3);
}

#[test]
fn test_ligature_cluster_is_split() {
    let Some(font) = system_font(16.0) else { return };
    let text = "office";
    let positions = font.caret_positions(text);
    assert_eq!(positions.len(), text.chars().count() + 1);
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_index_for_prefix_advance() {
    let Some(font) = system_font(16.0) else { return };
    let text = "hello";
    for k in 0..=text.len() {
        let x = font.advance_x(&text[..k]);
        assert_eq!(font.index_for_position(text, x), k);
    }
}

#[test]
fn test_index_out_of_range() {
    let Some(font) = system_font(16.0) else { return };
    assert_eq!(font.index_for_position("abc", -10.0), 0);
    assert_eq!(font.index_for_position("abc", 10_000.0), 3);
    assert_eq!(font.index_for_position("abc", f32::NAN), 0);
}

#[test]
fn test_index_ties_go_earlier() {
    let Some(font) = system_font(16.0) else { return };
    let positions = font.caret_positions("ab");
    let midpoint = (positions[0] + positions[1]) / 2.0;
    assert_eq!(font.index_for_position("ab", midpoint), 0);
}

// ============================================================================
// BOUNDS TESTS
// ============================================================================

#[test]
fn test_single_line_bounds() {
    let Some(font) = system_font(16.0) else { return };
    let bounds = font.text_bounds("Hi");
    assert!(bounds.width > 0.0);
    assert!(bounds.x <= 0.0);
    assert_eq!(bounds.y, 0.0);
    assert!((bounds.height - font.line_height()).abs() < 1e-4);
}

#[test]
fn test_multi_line_bounds() {
    let Some(font) = system_font(16.0) else { return };
    let two = font.text_bounds("Hi\nthere");
    assert!((two.height - 2.0 * font.line_height()).abs() < 1e-3);
    assert!(two.width >= font.text_bounds("Hi").width);

    // A trailing newline does not add a line
    let one = font.text_bounds("Hi\n");
    assert!((one.height - font.line_height()).abs() < 1e-4);
}

#[test]
fn test_whitespace_bounds_have_no_ink() {
    let Some(font) = system_font(16.0) else { return };
    let bounds = font.text_bounds("   ");
    assert_eq!(bounds.width, 0.0);
    assert!(bounds.height > 0.0);
}

// ============================================================================
// OUTLINE TESTS
// ============================================================================

#[test]
fn test_outline_sits_on_baseline() {
    let Some(font) = system_font(32.0) else { return };
    let path = outline_run(&font, "Hx").unwrap();
    let bounds = path.bounds();
    // Cap height lies above the baseline
    assert!(bounds.top() < 0.0);
    assert!(bounds.bottom() <= 1.0);
    assert!(bounds.right() <= font.advance_x("Hx") + 1.0);
}

#[test]
fn test_outline_of_blank_text() {
    let Some(font) = system_font(16.0) else { return };
    assert!(outline_run(&font, "").is_none());
    assert!(outline_run(&font, "  ").is_none());
}
