//! Transform, clip and paint stack entry points
//!
//! Calls on unknown handles are ignored with a warning.

use pigment_render::{StrokeCap, StrokeJoin, Style};

use crate::args;
use crate::registry::with_resource;

#[unsafe(no_mangle)]
pub extern "C" fn pigment_save(handle: u64) {
    with_resource(handle, "save", |r| r.save());
}

/// Pop the transform and clip; `false` without a matching save
#[unsafe(no_mangle)]
pub extern "C" fn pigment_restore(handle: u64) -> bool {
    match with_resource(handle, "restore", |r| r.restore()) {
        Some(Ok(())) => true,
        Some(Err(e)) => {
            tracing::warn!("restore: {}", e);
            false
        }
        None => false,
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_translate(handle: u64, tx: f32, ty: f32) {
    with_resource(handle, "translate", |r| r.translate(tx, ty));
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_rotate(handle: u64, degrees: f32) {
    with_resource(handle, "rotate", |r| r.rotate(degrees));
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_scale(handle: u64, sx: f32, sy: f32) {
    with_resource(handle, "scale", |r| r.scale(sx, sy));
}

/// Post-multiply by the row-major 2×3 matrix
/// `[scale_x skew_x trans_x; skew_y scale_y trans_y]`
#[unsafe(no_mangle)]
pub extern "C" fn pigment_transform(
    handle: u64,
    scale_x: f32,
    skew_x: f32,
    trans_x: f32,
    skew_y: f32,
    scale_y: f32,
    trans_y: f32,
) {
    with_resource(handle, "transform", |r| {
        r.transform(scale_x, skew_x, trans_x, skew_y, scale_y, trans_y)
    });
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_reset_transform(handle: u64) {
    with_resource(handle, "reset_transform", |r| r.reset_transform());
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_set_scale(handle: u64, sx: f32, sy: f32) {
    with_resource(handle, "set_scale", |r| r.set_scale(sx, sy));
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_clip_rect(handle: u64, ox: f32, oy: f32, width: f32, height: f32) {
    with_resource(handle, "clip_rect", |r| r.clip_rect(ox, oy, width, height));
}

/// Device-space rectangle still visible through the clip, written as
/// `x, y, width, height`. `false` (with zeros written) when everything is
/// clipped away or the handle is unknown.
///
/// # Safety
/// `out_rect` must be null or valid for writes of 4 floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_clip_bounds(handle: u64, out_rect: *mut f32) -> bool {
    let bounds = with_resource(handle, "clip_bounds", |r| r.clip_bounds()).flatten();
    let rect = bounds.map_or([0.0; 4], |b| [b.x(), b.y(), b.width(), b.height()]);
    // SAFETY: guaranteed by the caller
    unsafe { args::write(out_rect.cast::<[f32; 4]>(), rect) };
    bounds.is_some()
}

/// Number of saves without a matching restore; -1 for unknown handles
#[unsafe(no_mangle)]
pub extern "C" fn pigment_save_depth(handle: u64) -> i32 {
    with_resource(handle, "save_depth", |r| r.save_depth())
        .map_or(-1, |depth| i32::try_from(depth).unwrap_or(i32::MAX))
}

/// Number of paint pushes without a matching pop; -1 for unknown handles
#[unsafe(no_mangle)]
pub extern "C" fn pigment_paint_depth(handle: u64) -> i32 {
    with_resource(handle, "paint_depth", |r| r.paint_depth())
        .map_or(-1, |depth| i32::try_from(depth).unwrap_or(i32::MAX))
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_push_paint(handle: u64) {
    with_resource(handle, "push_paint", |r| r.push_paint());
}

/// Pop the paint; `false` on the base level
#[unsafe(no_mangle)]
pub extern "C" fn pigment_pop_paint(handle: u64) -> bool {
    match with_resource(handle, "pop_paint", |r| r.pop_paint()) {
        Some(Ok(())) => true,
        Some(Err(e)) => {
            tracing::warn!("pop_paint: {}", e);
            false
        }
        None => false,
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_set_color(handle: u64, r: f32, g: f32, b: f32, a: f32) {
    with_resource(handle, "set_color", |res| res.set_color(r, g, b, a));
}

/// 0 = fill, 1 = stroke
#[unsafe(no_mangle)]
pub extern "C" fn pigment_set_style(handle: u64, style: u8) {
    let Some(style) = Style::from_code(style) else {
        tracing::warn!("set_style: unknown style {}", style);
        return;
    };
    with_resource(handle, "set_style", |r| r.set_style(style));
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_set_stroke_width(handle: u64, width: f32) {
    with_resource(handle, "set_stroke_width", |r| r.set_stroke_width(width));
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_set_alpha(handle: u64, alpha: u8) {
    with_resource(handle, "set_alpha", |r| r.set_alpha(alpha));
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_set_anti_alias(handle: u64, anti_alias: bool) {
    with_resource(handle, "set_anti_alias", |r| r.set_anti_alias(anti_alias));
}

/// 0 = butt, 1 = round, 2 = square
#[unsafe(no_mangle)]
pub extern "C" fn pigment_set_stroke_cap(handle: u64, cap: u8) {
    let Some(cap) = StrokeCap::from_code(cap) else {
        tracing::warn!("set_stroke_cap: unknown cap {}", cap);
        return;
    };
    with_resource(handle, "set_stroke_cap", |r| r.set_stroke_cap(cap));
}

/// 0 = miter, 1 = round, 2 = bevel
#[unsafe(no_mangle)]
pub extern "C" fn pigment_set_stroke_join(handle: u64, join: u8) {
    let Some(join) = StrokeJoin::from_code(join) else {
        tracing::warn!("set_stroke_join: unknown join {}", join);
        return;
    };
    with_resource(handle, "set_stroke_join", |r| r.set_stroke_join(join));
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_set_stroke_miter(handle: u64, limit: f32) {
    with_resource(handle, "set_stroke_miter", |r| r.set_stroke_miter(limit));
}
