//! Decoding of C arguments

use std::borrow::Cow;
use std::slice;

/// Borrow `len` bytes at `ptr`; null or empty gives an empty slice.
///
/// # Safety
/// `ptr` must be null or valid for reads of `len` bytes for `'a`.
pub(crate) unsafe fn bytes<'a>(ptr: *const u8, len: usize) -> &'a [u8] {
    if ptr.is_null() || len == 0 {
        return &[];
    }
    // SAFETY: guaranteed by the caller
    unsafe { slice::from_raw_parts(ptr, len) }
}

/// UTF-8 text with invalid sequences replaced
///
/// # Safety
/// Same contract as [`bytes`].
pub(crate) unsafe fn text<'a>(ptr: *const u8, len: usize) -> Cow<'a, str> {
    // SAFETY: guaranteed by the caller
    String::from_utf8_lossy(unsafe { bytes(ptr, len) })
}

/// Text argument where null means "not given"
///
/// # Safety
/// Same contract as [`bytes`].
pub(crate) unsafe fn optional_text<'a>(ptr: *const u8, len: usize) -> Option<Cow<'a, str>> {
    if ptr.is_null() || len == 0 {
        return None;
    }
    // SAFETY: guaranteed by the caller
    Some(unsafe { text(ptr, len) })
}

/// Borrow `count` floats at `ptr`
///
/// # Safety
/// `ptr` must be null or valid for reads of `count` floats for `'a`.
pub(crate) unsafe fn floats<'a>(ptr: *const f32, count: usize) -> &'a [f32] {
    if ptr.is_null() || count == 0 {
        return &[];
    }
    // SAFETY: guaranteed by the caller
    unsafe { slice::from_raw_parts(ptr, count) }
}

/// Store through an out-parameter; null pointers are skipped
///
/// # Safety
/// `ptr` must be null or valid for a write of `T`.
pub(crate) unsafe fn write<T>(ptr: *mut T, value: T) {
    if !ptr.is_null() {
        // SAFETY: guaranteed by the caller
        unsafe { ptr.write(value) };
    }
}

/// Copy `s` into a caller buffer of `capacity` bytes, truncated and NUL
/// terminated. Returns the full length of `s` in bytes.
///
/// # Safety
/// `buf` must be null or valid for writes of `capacity` bytes.
pub(crate) unsafe fn copy_str(s: &str, buf: *mut u8, capacity: usize) -> usize {
    if !buf.is_null() && capacity > 0 {
        let n = s.len().min(capacity - 1);
        // SAFETY: n + 1 <= capacity
        unsafe {
            std::ptr::copy_nonoverlapping(s.as_ptr(), buf, n);
            buf.add(n).write(0);
        }
    }
    s.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_lossy() {
        let raw = b"ok\xffok";
        let decoded = unsafe { text(raw.as_ptr(), raw.len()) };
        assert_eq!(decoded, "ok\u{fffd}ok");
        assert_eq!(unsafe { text(std::ptr::null(), 5) }, "");
        assert!(unsafe { optional_text(std::ptr::null(), 0) }.is_none());
    }

    #[test]
    fn test_copy_str_truncates() {
        let mut buf = [0xaau8; 4];
        let len = unsafe { copy_str("Helvetica", buf.as_mut_ptr(), buf.len()) };
        assert_eq!(len, 9);
        assert_eq!(&buf, b"Hel\0");
        assert_eq!(unsafe { copy_str("abc", std::ptr::null_mut(), 0) }, 3);
    }

    #[test]
    fn test_write_skips_null() {
        let mut out = 0.0f32;
        unsafe {
            write(&mut out, 2.5);
            write(std::ptr::null_mut::<f32>(), 1.0);
        }
        assert_eq!(out, 2.5);
    }
}
