//! Surface lifecycle entry points

use std::ffi::c_void;
use std::sync::{Arc, Mutex};

use pigment_render::tiny_skia::Pixmap;
use pigment_render::{PixelFormat, Presenter, Resource, SurfaceKind};

use crate::args;
use crate::context;
use crate::registry::{IMAGES, RESOURCES, lock, with_resource};

/// Host callback receiving each flushed frame as premultiplied RGBA rows
pub type PresentCallback = unsafe extern "C" fn(
    user_data: *mut c_void,
    pixels: *const u8,
    width: u32,
    height: u32,
    row_bytes: usize,
);

/// Presents frames by handing the pixels to the host
struct CallbackPresenter {
    callback: PresentCallback,
    user_data: *mut c_void,
}

// SAFETY: the host guarantees the callback and its user data may be used
// from whichever thread flushes the surface
unsafe impl Send for CallbackPresenter {}

impl Presenter for CallbackPresenter {
    fn resize(&mut self, width: u32, height: u32) -> pigment_render::Result<()> {
        tracing::debug!("Host surface resized to {}x{}", width, height);
        Ok(())
    }

    fn present(&mut self, pixmap: &Pixmap) -> pigment_render::Result<()> {
        let row_bytes = pixmap.width() as usize * 4;
        // SAFETY: the pixel data outlives the call
        unsafe {
            (self.callback)(
                self.user_data,
                pixmap.data().as_ptr(),
                pixmap.width(),
                pixmap.height(),
                row_bytes,
            )
        };
        Ok(())
    }
}

fn register(resource: Resource) -> u64 {
    RESOURCES.insert(Arc::new(Mutex::new(resource)))
}

/// Window-backed surface whose frames are passed to `callback` on flush.
/// The pixel buffer is allocated by the first `pigment_reshape`.
///
/// # Safety
/// `callback` must be safe to call with `user_data` until the surface is
/// cleaned up, from the thread that flushes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_create_hardware_surface(
    callback: Option<PresentCallback>,
    user_data: *mut c_void,
) -> u64 {
    let Some(callback) = callback else {
        tracing::warn!("create_hardware_surface: null present callback");
        return 0;
    };
    let context = context();
    let presenter = Box::new(CallbackPresenter { callback, user_data });
    register(Resource::hardware_with(
        context.config.clone(),
        context.fonts.clone(),
        presenter,
    ))
}

/// CPU surface of `width`×`height`, or 0 on invalid dimensions
#[unsafe(no_mangle)]
pub extern "C" fn pigment_create_software_surface(width: i32, height: i32) -> u64 {
    let context = context();
    match Resource::software_with(context.config.clone(), context.fonts.clone(), width, height) {
        Ok(resource) => register(resource),
        Err(e) => {
            tracing::warn!("create_software_surface: {}", e);
            0
        }
    }
}

/// Fixed-size buffer inheriting the parent's paint, or 0 on failure
#[unsafe(no_mangle)]
pub extern "C" fn pigment_create_offscreen_buffer(handle: u64, width: i32, height: i32) -> u64 {
    let created = with_resource(handle, "create_offscreen_buffer", |r| r.create_offscreen(width, height));
    match created {
        Some(Ok(offscreen)) => register(offscreen),
        Some(Err(e)) => {
            tracing::warn!("create_offscreen_buffer: {}", e);
            0
        }
        None => 0,
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_reshape(handle: u64, width: i32, height: i32, xscale: f32, yscale: f32) -> bool {
    let result = with_resource(handle, "reshape", |r| r.reshape(width, height, xscale, yscale));
    match result {
        Some(Ok(())) => true,
        Some(Err(e)) => {
            tracing::warn!("reshape: {}", e);
            false
        }
        None => false,
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_clear(handle: u64) {
    with_resource(handle, "clear", Resource::clear);
}

#[unsafe(no_mangle)]
pub extern "C" fn pigment_flush(handle: u64) {
    with_resource(handle, "flush", Resource::flush);
}

/// Release a surface. The handle is invalid afterwards; a second call
/// returns `false`.
#[unsafe(no_mangle)]
pub extern "C" fn pigment_cleanup(handle: u64) -> bool {
    let Some(resource) = RESOURCES.remove(handle) else {
        tracing::warn!("cleanup: unknown resource handle {:#x}", handle);
        return false;
    };
    let result = lock(&resource).cleanup();
    result.is_ok()
}

/// Consume an offscreen buffer and return its content as an image handle.
///
/// Root surfaces are rejected with 0 and stay valid; use
/// `pigment_snapshot` to copy their content.
#[unsafe(no_mangle)]
pub extern "C" fn pigment_offscreen_image(handle: u64) -> u64 {
    let Some(kind) = with_resource(handle, "offscreen_image", |r| r.kind()) else {
        return 0;
    };
    if kind != SurfaceKind::Offscreen {
        tracing::warn!("offscreen_image: {:?} surface is not an offscreen buffer", kind);
        return 0;
    }
    let Some(resource) = RESOURCES.remove(handle) else {
        tracing::warn!("offscreen_image: unknown resource handle {:#x}", handle);
        return 0;
    };
    let mut guard = lock(&resource);
    let image = guard.snapshot();
    let _ = guard.cleanup();
    match image {
        Ok(image) => IMAGES.insert(image),
        Err(e) => {
            tracing::warn!("offscreen_image: {}", e);
            0
        }
    }
}

/// Copy of the surface content as an image handle
#[unsafe(no_mangle)]
pub extern "C" fn pigment_snapshot(handle: u64) -> u64 {
    match with_resource(handle, "snapshot", |r| r.snapshot()) {
        Some(Ok(image)) => IMAGES.insert(image),
        Some(Err(e)) => {
            tracing::warn!("snapshot: {}", e);
            0
        }
        None => 0,
    }
}

/// Composite `source`'s current pixels onto `dest` at its transform origin.
///
/// The source is copied first, so `dest == source` is allowed.
#[unsafe(no_mangle)]
pub extern "C" fn pigment_draw_surface(dest: u64, source: u64) {
    let Some(Ok(image)) = with_resource(source, "draw_surface", |r| r.snapshot()) else {
        return;
    };
    with_resource(dest, "draw_surface", |r| r.draw_image(&image));
}

/// Copy an unpremultiplied pixel buffer into the surface.
///
/// `format` is 0 for BGRA8888 and 1 for RGBA8888. `row_bytes` 0 means
/// tightly packed. `rects` holds `rect_count` `(x, y, width, height)`
/// quadruples; with none the whole buffer is copied.
///
/// # Safety
/// `buffer` must be valid for `row_bytes * (height - 1) + width * 4`
/// bytes and `rects` for `rect_count * 4` ints.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_write_pixels(
    handle: u64,
    buffer: *const u8,
    width: i32,
    height: i32,
    row_bytes: usize,
    format: u8,
    rects: *const i32,
    rect_count: usize,
) -> bool {
    let format = match format {
        0 => PixelFormat::Bgra8888,
        1 => PixelFormat::Rgba8888,
        other => {
            tracing::warn!("write_pixels: unknown pixel format {}", other);
            return false;
        }
    };
    if width <= 0 || height <= 0 {
        tracing::warn!("write_pixels: invalid size {}x{}", width, height);
        return false;
    }
    let packed = width as usize * 4;
    let stride = if row_bytes == 0 { packed } else { row_bytes };
    let Some(len) = stride
        .checked_mul(height as usize - 1)
        .and_then(|n| n.checked_add(packed))
    else {
        return false;
    };

    // SAFETY: guaranteed by the caller
    let data = unsafe { args::bytes(buffer, len) };
    if data.len() < len {
        tracing::warn!("write_pixels: null buffer");
        return false;
    }
    let dirty: Vec<(i32, i32, i32, i32)> = if rects.is_null() || rect_count == 0 {
        Vec::new()
    } else {
        let Some(ints) = rect_count.checked_mul(4).filter(|&n| n <= isize::MAX as usize / 4) else {
            tracing::warn!("write_pixels: rect count {} out of range", rect_count);
            return false;
        };
        // SAFETY: guaranteed by the caller
        let flat = unsafe { std::slice::from_raw_parts(rects, ints) };
        flat.chunks_exact(4).map(|r| (r[0], r[1], r[2], r[3])).collect()
    };

    let result = with_resource(handle, "write_pixels", |r| {
        r.write_pixels(data, width, height, stride, format, &dirty)
    });
    match result {
        Some(Ok(())) => true,
        Some(Err(e)) => {
            tracing::warn!("write_pixels: {}", e);
            false
        }
        None => false,
    }
}

/// Current pixel size of the surface
///
/// # Safety
/// Out-pointers must be null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_surface_size(handle: u64, out_width: *mut u32, out_height: *mut u32) -> bool {
    let Some((width, height)) = with_resource(handle, "surface_size", |r| (r.width(), r.height())) else {
        return false;
    };
    // SAFETY: guaranteed by the caller
    unsafe {
        args::write(out_width, width);
        args::write(out_height, height);
    }
    true
}

/// Read one unpremultiplied RGBA pixel into `out_rgba[0..4]`
///
/// # Safety
/// `out_rgba` must be null or valid for writes of 4 bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_read_pixel(handle: u64, x: u32, y: u32, out_rgba: *mut u8) -> bool {
    let Some(Some(color)) = with_resource(handle, "read_pixel", |r| r.pixel(x, y)) else {
        return false;
    };
    // SAFETY: guaranteed by the caller
    unsafe { args::write(out_rgba.cast::<[u8; 4]>(), [color.r, color.g, color.b, color.a]) };
    true
}
