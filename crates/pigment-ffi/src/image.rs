//! Image loading and encoding entry points

use std::path::PathBuf;

use pigment_render::Image;

use crate::args;
use crate::registry::{IMAGES, image};

/// Status returned by [`pigment_save_image`] for an unknown image handle
pub const SAVE_INVALID_HANDLE: i32 = -1;

fn register(op: &str, image: pigment_render::Result<Image>) -> u64 {
    match image {
        Ok(image) => IMAGES.insert(image),
        Err(e) => {
            tracing::warn!("{}: {}", op, e);
            0
        }
    }
}

/// Decode an image file; 0 on failure
///
/// # Safety
/// `path` must be null or valid for reads of `path_len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_load_image(path: *const u8, path_len: usize) -> u64 {
    // SAFETY: guaranteed by the caller
    let path = PathBuf::from(unsafe { args::text(path, path_len) }.into_owned());
    register("load_image", Image::load(&path))
}

/// Decode encoded image bytes; 0 on failure
///
/// # Safety
/// `data` must be null or valid for reads of `len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_load_image_from_memory(data: *const u8, len: usize) -> u64 {
    // SAFETY: guaranteed by the caller
    let data = unsafe { args::bytes(data, len) };
    register("load_image_from_memory", Image::from_memory(data))
}

/// Release an image; `false` for unknown handles
#[unsafe(no_mangle)]
pub extern "C" fn pigment_free_image(handle: u64) -> bool {
    IMAGES.remove(handle).is_some()
}

/// Pixel size of an image
///
/// # Safety
/// Out-pointers must be null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_image_bounds(handle: u64, out_width: *mut u32, out_height: *mut u32) -> bool {
    let Some(img) = image(handle, "image_bounds") else {
        return false;
    };
    let (width, height) = img.bounds();
    // SAFETY: guaranteed by the caller
    unsafe {
        args::write(out_width, width);
        args::write(out_height, height);
    }
    true
}

/// Encode an image to `path`.
///
/// `format`: 4 = JPEG (`quality` 0..100), 5 = PNG, 7 = WebP (lossless).
/// Returns 0 on success, 1 for an unsupported format, 2 when encoding
/// fails, 3 on I/O errors and [`SAVE_INVALID_HANDLE`] for unknown images.
///
/// # Safety
/// `path` must be null or valid for reads of `path_len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_save_image(
    handle: u64,
    format: i32,
    quality: i32,
    path: *const u8,
    path_len: usize,
) -> i32 {
    let Some(img) = image(handle, "save_image") else {
        return SAVE_INVALID_HANDLE;
    };
    // SAFETY: guaranteed by the caller
    let path = PathBuf::from(unsafe { args::text(path, path_len) }.into_owned());
    img.save_with_code(&path, format, quality).code()
}
