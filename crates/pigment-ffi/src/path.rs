//! Path builder entry points
//!
//! A path is built once with the segment calls and can then be drawn any
//! number of times with `pigment_draw_vector_path`. Segment calls on
//! unknown handles are ignored with a warning.

use std::sync::{Arc, Mutex};

use pigment_render::VectorPath;

use crate::registry::{PATHS, with_path};

/// New empty path
#[unsafe(no_mangle)]
pub extern "C" fn pigment_path_new() -> u64 {
    PATHS.insert(Arc::new(Mutex::new(VectorPath::new())))
}

/// Release a path; `false` for unknown handles
#[unsafe(no_mangle)]
pub extern "C" fn pigment_path_free(path: u64) -> bool {
    PATHS.remove(path).is_some()
}

/// Remove all segments, keeping the handle
#[unsafe(no_mangle)]
pub extern "C" fn pigment_path_reset(path: u64) {
    with_path(path, "path_reset", |p| p.reset());
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_path_move_to(path: u64, x: f32, y: f32) {
    with_path(path, "path_move_to", |p| p.move_to(x, y));
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_path_line_to(path: u64, x: f32, y: f32) {
    with_path(path, "path_line_to", |p| p.line_to(x, y));
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_path_quad_to(path: u64, x1: f32, y1: f32, x: f32, y: f32) {
    with_path(path, "path_quad_to", |p| p.quad_to(x1, y1, x, y));
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_path_cubic_to(path: u64, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
    with_path(path, "path_cubic_to", |p| p.cubic_to(x1, y1, x2, y2, x, y));
}

/// Weighted quadratic segment, stored as quads
#[unsafe(no_mangle)]
pub extern "C" fn pigment_path_conic_to(path: u64, x1: f32, y1: f32, x: f32, y: f32, weight: f32) {
    with_path(path, "path_conic_to", |p| p.conic_to(x1, y1, x, y, weight));
}

/// Arc of `radius` tangent to the corner at `(x1, y1)` turning towards
/// `(x2, y2)`
#[unsafe(no_mangle)]
pub extern "C" fn pigment_path_arc_to(path: u64, x1: f32, y1: f32, x2: f32, y2: f32, radius: f32) {
    with_path(path, "path_arc_to", |p| p.arc_to(x1, y1, x2, y2, radius));
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_path_close(path: u64) {
    with_path(path, "path_close", |p| p.close());
}
