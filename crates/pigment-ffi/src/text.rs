//! Font and text entry points
//!
//! Character offsets count Unicode scalar values of the decoded text.

use pigment_render::{FontMetrics, FontStyle, font_from_memory, resolve_font};

use crate::args;
use crate::context;
use crate::registry::{FONTS, font, with_resource};

/// Font metrics in pixels at the font's size
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PigmentFontMetrics {
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

impl From<FontMetrics> for PigmentFontMetrics {
    fn from(m: FontMetrics) -> Self {
        Self {
            ascent: m.ascent,
            descent: m.descent,
            leading: m.leading,
            line_height: m.line_height,
            x_height: m.x_height,
            cap_height: m.cap_height,
            underline_position: m.underline_position,
            underline_thickness: m.underline_thickness,
            strikeout_position: m.strikeout_position,
            strikeout_thickness: m.strikeout_thickness,
            x_min: m.x_min,
            x_max: m.x_max,
            avg_char_width: m.avg_char_width,
            max_char_width: m.max_char_width,
        }
    }
}

/// Load a font by file path or family name with fallback; 0 only when no
/// font is available at all.
///
/// `weight` -1 means 400, `width` -1 means normal (5), `slant` 2 is italic
/// and 3 oblique. A null `name` picks the default family.
///
/// # Safety
/// `name` must be null or valid for reads of `name_len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_load_font(
    name: *const u8,
    name_len: usize,
    size: f32,
    weight: i32,
    width: i32,
    slant: i32,
) -> u64 {
    // SAFETY: guaranteed by the caller
    let name = unsafe { args::optional_text(name, name_len) };
    let style = FontStyle::from_request(weight, width, slant);
    let context = context();
    match resolve_font(&context.config, &context.fonts, name.as_deref(), size, style) {
        Ok(font) => FONTS.insert(font),
        Err(e) => {
            tracing::warn!("load_font: {}", e);
            0
        }
    }
}

/// Load a font from the bytes of a TrueType/OpenType file; 0 when the
/// data does not parse. Style arguments are as for `pigment_load_font`
/// and only describe the font, no matching takes place.
///
/// # Safety
/// `data` must be null or valid for reads of `len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_load_font_from_memory(
    data: *const u8,
    len: usize,
    size: f32,
    weight: i32,
    width: i32,
    slant: i32,
) -> u64 {
    // SAFETY: guaranteed by the caller
    let bytes = unsafe { args::bytes(data, len) };
    let style = FontStyle::from_request(weight, width, slant);
    match font_from_memory(&context().config, bytes, size, style) {
        Ok(font) => FONTS.insert(font),
        Err(e) => {
            tracing::warn!("load_font_from_memory: {}", e);
            0
        }
    }
}

/// Release a font; `false` for unknown handles
#[unsafe(no_mangle)]
pub extern "C" fn pigment_free_font(handle: u64) -> bool {
    FONTS.remove(handle).is_some()
}

/// Line height in pixels, or 0 for unknown fonts
#[unsafe(no_mangle)]
pub extern "C" fn pigment_line_height(handle: u64) -> f32 {
    font(handle, "line_height").map_or(0.0, |f| f.line_height())
}

/// Font size in pixels, or 0 for unknown fonts
#[unsafe(no_mangle)]
pub extern "C" fn pigment_font_size(handle: u64) -> f32 {
    font(handle, "font_size").map_or(0.0, |f| f.size())
}

/// Copy the family name into `buf`; returns its full length in bytes
///
/// # Safety
/// `buf` must be null or valid for writes of `capacity` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_font_family_name(handle: u64, buf: *mut u8, capacity: usize) -> usize {
    let Some(f) = font(handle, "font_family_name") else {
        return 0;
    };
    // SAFETY: guaranteed by the caller
    unsafe { args::copy_str(f.family(), buf, capacity) }
}

/// # Safety
/// `out` must be null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_font_metrics(handle: u64, out: *mut PigmentFontMetrics) -> bool {
    let Some(f) = font(handle, "font_metrics") else {
        return false;
    };
    // SAFETY: guaranteed by the caller
    unsafe { args::write(out, f.metrics().into()) };
    true
}

/// Number of font families in the catalog
#[unsafe(no_mangle)]
pub extern "C" fn pigment_family_count() -> usize {
    context().fonts.family_count()
}

/// Copy the family name at `index` (sorted order) into `buf`; returns its
/// full length in bytes, 0 past the end
///
/// # Safety
/// `buf` must be null or valid for writes of `capacity` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_family_name(index: usize, buf: *mut u8, capacity: usize) -> usize {
    let Some(name) = context().fonts.family_name(index) else {
        return 0;
    };
    // SAFETY: guaranteed by the caller
    unsafe { args::copy_str(name, buf, capacity) }
}

/// Shaped advance width of the text
///
/// # Safety
/// `text` must be null or valid for reads of `len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_advance_x(handle: u64, text: *const u8, len: usize) -> f32 {
    let Some(f) = font(handle, "advance_x") else {
        return 0.0;
    };
    // SAFETY: guaranteed by the caller
    let text = unsafe { args::text(text, len) };
    f.advance_x(&text)
}

/// Character offset of the caret boundary nearest to `x`
///
/// # Safety
/// `text` must be null or valid for reads of `len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_index_for_position(handle: u64, text: *const u8, len: usize, x: f32) -> usize {
    let Some(f) = font(handle, "index_for_position") else {
        return 0;
    };
    // SAFETY: guaranteed by the caller
    let text = unsafe { args::text(text, len) };
    f.index_for_position(&text, x)
}

/// Bounding box of the text as `(x, y, width, height)`
///
/// # Safety
/// `text` must be null or valid for reads of `len` bytes; out-pointers
/// must be null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_text_bounds(
    handle: u64,
    text: *const u8,
    len: usize,
    out_x: *mut f32,
    out_y: *mut f32,
    out_width: *mut f32,
    out_height: *mut f32,
) -> bool {
    let Some(f) = font(handle, "text_bounds") else {
        return false;
    };
    // SAFETY: guaranteed by the caller
    let bounds = f.text_bounds(&unsafe { args::text(text, len) });
    // SAFETY: guaranteed by the caller
    unsafe {
        args::write(out_x, bounds.x);
        args::write(out_y, bounds.y);
        args::write(out_width, bounds.width);
        args::write(out_height, bounds.height);
    }
    true
}

/// Draw one line with its baseline at `(x, y)` below the text cursor
///
/// # Safety
/// `text` must be null or valid for reads of `len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_render_line(
    handle: u64,
    font_handle: u64,
    text: *const u8,
    len: usize,
    x: f32,
    y: f32,
) {
    let Some(f) = font(font_handle, "render_line") else {
        return;
    };
    // SAFETY: guaranteed by the caller
    let text = unsafe { args::text(text, len) };
    with_resource(handle, "render_line", |r| r.render_line(&f, &text, x, y));
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_next_line(handle: u64, font_handle: u64) {
    let Some(f) = font(font_handle, "next_line") else {
        return;
    };
    with_resource(handle, "next_line", |r| r.next_line(&f));
}

/// Draw a caret block at character offset `index`
///
/// # Safety
/// `text` must be null or valid for reads of `len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_render_cursor(
    handle: u64,
    font_handle: u64,
    text: *const u8,
    len: usize,
    index: usize,
) {
    let Some(f) = font(font_handle, "render_cursor") else {
        return;
    };
    // SAFETY: guaranteed by the caller
    let text = unsafe { args::text(text, len) };
    with_resource(handle, "render_cursor", |r| r.render_cursor(&f, &text, index));
}

/// Highlight characters `start..end`; `false` for an invalid range
///
/// # Safety
/// `text` must be null or valid for reads of `len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_render_selection(
    handle: u64,
    font_handle: u64,
    text: *const u8,
    len: usize,
    start: usize,
    end: usize,
) -> bool {
    let Some(f) = font(font_handle, "render_selection") else {
        return false;
    };
    // SAFETY: guaranteed by the caller
    let text = unsafe { args::text(text, len) };
    match with_resource(handle, "render_selection", |r| r.render_selection(&f, &text, start, end)) {
        Some(Ok(())) => true,
        Some(Err(e)) => {
            tracing::warn!("render_selection: {}", e);
            false
        }
        None => false,
    }
}
