//! Shape and image drawing entry points
//!
//! Points are a flat `[x0, y0, x1, y1, ...]` float array of `count`
//! values; a trailing odd value is ignored.

use crate::args;
use crate::registry::{image, with_path, with_resource};

/// Open polyline through the points
///
/// # Safety
/// `points` must be null or valid for reads of `count` floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_draw_path(handle: u64, points: *const f32, count: usize) {
    // SAFETY: guaranteed by the caller
    let points = unsafe { args::floats(points, count) };
    with_resource(handle, "draw_path", |r| r.draw_path(points));
}

/// Closed polygon through the points
///
/// # Safety
/// `points` must be null or valid for reads of `count` floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_draw_polygon(handle: u64, points: *const f32, count: usize) {
    // SAFETY: guaranteed by the caller
    let points = unsafe { args::floats(points, count) };
    with_resource(handle, "draw_polygon", |r| r.draw_polygon(points));
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_draw_rounded_rect(handle: u64, width: f32, height: f32, radius: f32) {
    with_resource(handle, "draw_rounded_rect", |r| r.draw_rounded_rect(width, height, radius));
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_draw_rect(handle: u64, x: f32, y: f32, width: f32, height: f32) {
    with_resource(handle, "draw_rect", |r| r.draw_rect(x, y, width, height));
}

/// Draw a path built with the `pigment_path_*` calls
#[unsafe(no_mangle)]
pub extern "C" fn pigment_draw_vector_path(handle: u64, path: u64) {
    let Some(path) = with_path(path, "draw_vector_path", |p| p.clone()) else {
        return;
    };
    with_resource(handle, "draw_vector_path", |r| r.draw_vector_path(&path));
}

/// Draw an image at native resolution at the transform origin
#[unsafe(no_mangle)]
pub extern "C" fn pigment_draw_image(handle: u64, image_handle: u64) {
    let Some(img) = image(image_handle, "draw_image") else {
        return;
    };
    with_resource(handle, "draw_image", |r| r.draw_image(&img));
}

/// Draw an image scaled to `width`×`height`
#[unsafe(no_mangle)]
pub extern "C" fn pigment_draw_image_rect(handle: u64, image_handle: u64, width: f32, height: f32) {
    let Some(img) = image(image_handle, "draw_image_rect") else {
        return;
    };
    with_resource(handle, "draw_image_rect", |r| r.draw_image_rect(&img, width, height));
}
