//! Presentation of finished frames to a window

use std::num::NonZeroU32;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::{RenderError, Result};

/// Destination for the pixels of a hardware-backed resource.
///
/// `resize` is called by `reshape` before the new pixmap is used and
/// `present` by `flush`.
pub trait Presenter: Send {
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;

    fn present(&mut self, pixmap: &tiny_skia::Pixmap) -> Result<()>;
}

/// Presenter writing into a window through softbuffer
pub struct WindowPresenter<D, W> {
    surface: softbuffer::Surface<D, W>,
    width: u32,
    height: u32,
}

impl<D: HasDisplayHandle, W: HasWindowHandle> WindowPresenter<D, W> {
    /// Bind to a window. `display` is usually the window itself (or a
    /// clone of an `Arc` around it).
    pub fn new(display: D, window: W) -> Result<Self> {
        let context = softbuffer::Context::new(display)
            .map_err(|e| RenderError::BackendInit(e.to_string()))?;
        let surface = softbuffer::Surface::new(&context, window)
            .map_err(|e| RenderError::BackendInit(e.to_string()))?;
        tracing::debug!("Created window presenter");
        Ok(Self { surface, width: 0, height: 0 })
    }
}

impl<D, W> Presenter for WindowPresenter<D, W>
where
    D: HasDisplayHandle + Send,
    W: HasWindowHandle + Send,
    softbuffer::Surface<D, W>: Send,
{
    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            return Err(RenderError::InvalidDimension {
                width: width as i32,
                height: height as i32,
            });
        };
        self.surface
            .resize(w, h)
            .map_err(|e| RenderError::BackendInit(e.to_string()))?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn present(&mut self, pixmap: &tiny_skia::Pixmap) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }
        let mut buffer = self
            .surface
            .buffer_mut()
            .map_err(|e| RenderError::BackendInit(e.to_string()))?;

        // softbuffer expects 0x00RRGGBB; premultiplied channels are the
        // frame composited over black
        let src_width = pixmap.width() as usize;
        let dst_width = self.width as usize;
        let columns = src_width.min(dst_width);
        let rows = (pixmap.height() as usize).min(self.height as usize);
        let pixels = pixmap.pixels();
        for y in 0..rows {
            let src = &pixels[y * src_width..y * src_width + columns];
            let dst = &mut buffer[y * dst_width..y * dst_width + columns];
            for (out, p) in dst.iter_mut().zip(src) {
                *out = ((p.red() as u32) << 16) | ((p.green() as u32) << 8) | p.blue() as u32;
            }
        }

        buffer
            .present()
            .map_err(|e| RenderError::BackendInit(e.to_string()))
    }
}
