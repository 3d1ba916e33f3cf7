//! Rendering resources and their lifecycle
//!
//! A [`Resource`] owns a pixel buffer plus the transform/clip and paint
//! stacks that every draw call consults. Lifecycle:
//! created → reshape* → (clear → draws* → flush)* → cleanup.

use std::fmt;
use std::sync::Arc;

use tiny_skia::{
    BlendMode, ColorU8, FillRule, FilterQuality, Path, Pixmap, PixmapPaint, PixmapRef, Rect,
    Transform,
};

use crate::config::RenderConfig;
use crate::image::Image;
use crate::presenter::Presenter;
use crate::state::{GraphicsStack, PaintStack, PaintState, StrokeCap, StrokeJoin, Style};
use crate::{Color, RenderError, Result};
use pigment_text::{Font, FontCatalog, FontStyle};

/// What a resource draws into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Window-backed; frames are handed to a [`Presenter`] on flush
    Hardware,
    /// CPU pixel buffer
    Software,
    /// Fixed-size CPU buffer created from another resource
    Offscreen,
}

/// Layout of external pixel buffers passed to [`Resource::write_pixels`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Unpremultiplied B, G, R, A bytes
    Bgra8888,
    /// Unpremultiplied R, G, B, A bytes
    Rgba8888,
}

/// A rendering context bound to a surface
pub struct Resource {
    kind: SurfaceKind,
    pixmap: Option<Pixmap>,
    presenter: Option<Box<dyn Presenter>>,
    graphics: GraphicsStack,
    paints: PaintStack,
    /// Device pixel ratio recorded by reshape
    device_ratio: (f32, f32),
    /// Factor set by set_scale, independent of save/restore
    user_scale: (f32, f32),
    /// Vertical offset of the current text line
    cursor_y: f32,
    config: Arc<RenderConfig>,
    fonts: Arc<FontCatalog>,
    released: bool,
}

impl Resource {
    fn with_parts(
        kind: SurfaceKind,
        pixmap: Option<Pixmap>,
        presenter: Option<Box<dyn Presenter>>,
        paint: PaintState,
        config: Arc<RenderConfig>,
        fonts: Arc<FontCatalog>,
    ) -> Self {
        Self {
            kind,
            pixmap,
            presenter,
            graphics: GraphicsStack::new(),
            paints: PaintStack::new(paint),
            device_ratio: (1.0, 1.0),
            user_scale: (1.0, 1.0),
            cursor_y: 0.0,
            config,
            fonts,
            released: false,
        }
    }

    /// Window-backed resource with the default configuration.
    ///
    /// The pixel buffer is allocated by the first [`Resource::reshape`].
    pub fn hardware(presenter: Box<dyn Presenter>) -> Self {
        let config = Arc::new(RenderConfig::default());
        let fonts = catalog_for(&config);
        Self::hardware_with(config, fonts, presenter)
    }

    pub fn hardware_with(
        config: Arc<RenderConfig>,
        fonts: Arc<FontCatalog>,
        presenter: Box<dyn Presenter>,
    ) -> Self {
        tracing::debug!("Created hardware resource");
        let paint = PaintState::new(config.anti_alias);
        Self::with_parts(SurfaceKind::Hardware, None, Some(presenter), paint, config, fonts)
    }

    /// CPU-backed resource with the default configuration
    pub fn software(width: i32, height: i32) -> Result<Self> {
        let config = Arc::new(RenderConfig::default());
        let fonts = catalog_for(&config);
        Self::software_with(config, fonts, width, height)
    }

    pub fn software_with(
        config: Arc<RenderConfig>,
        fonts: Arc<FontCatalog>,
        width: i32,
        height: i32,
    ) -> Result<Self> {
        let pixmap = allocate(&config, width, height)?;
        tracing::debug!("Created {}x{} software resource", width, height);
        let paint = PaintState::new(config.anti_alias);
        Ok(Self::with_parts(SurfaceKind::Software, Some(pixmap), None, paint, config, fonts))
    }

    /// Fixed-size CPU buffer sharing this resource's configuration, fonts
    /// and current paint
    pub fn create_offscreen(&self, width: i32, height: i32) -> Result<Resource> {
        self.check_live()?;
        let pixmap = allocate(&self.config, width, height)?;
        tracing::debug!("Created {}x{} offscreen buffer", width, height);
        Ok(Self::with_parts(
            SurfaceKind::Offscreen,
            Some(pixmap),
            None,
            *self.paints.current(),
            self.config.clone(),
            self.fonts.clone(),
        ))
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Font catalog used by this resource
    pub fn fonts(&self) -> &Arc<FontCatalog> {
        &self.fonts
    }

    /// Whether `cleanup` has been called
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Width of the pixel buffer (0 before the first reshape)
    pub fn width(&self) -> u32 {
        self.pixmap.as_ref().map_or(0, |p| p.width())
    }

    /// Height of the pixel buffer (0 before the first reshape)
    pub fn height(&self) -> u32 {
        self.pixmap.as_ref().map_or(0, |p| p.height())
    }

    fn check_live(&self) -> Result<()> {
        if self.released {
            return Err(RenderError::UseAfterFree);
        }
        Ok(())
    }

    /// Resolve a font through this resource's catalog and fallbacks
    pub fn load_font(&self, name: Option<&str>, size: f32, style: FontStyle) -> Result<Font> {
        resolve_font(&self.config, &self.fonts, name, size, style)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Resize the root surface and record the device pixel ratio.
    ///
    /// Pixels are kept when the size does not change.
    pub fn reshape(&mut self, width: i32, height: i32, xscale: f32, yscale: f32) -> Result<()> {
        self.check_live()?;
        if self.kind == SurfaceKind::Offscreen {
            return Err(RenderError::InvalidDimension { width, height });
        }
        if !self.config.accepts_dimensions(width, height) {
            return Err(RenderError::InvalidDimension { width, height });
        }

        let ratio = |s: f32| {
            if s.is_finite() && s > 0.0 {
                s
            } else {
                tracing::warn!("Ignoring invalid device pixel ratio {}", s);
                1.0
            }
        };
        let previous_ratio = self.device_ratio;
        self.device_ratio = (ratio(xscale), ratio(yscale));

        let (w, h) = (width as u32, height as u32);
        if self.width() == w && self.height() == h {
            if self.device_ratio != previous_ratio {
                self.graphics.rebuild_clips(self.device_scale(), (w, h));
            }
            return Ok(());
        }

        if let Some(presenter) = self.presenter.as_mut() {
            presenter.resize(w, h)?;
        }
        self.pixmap = Some(allocate(&self.config, width, height)?);
        // Clips keep applying at every level, now in the new buffer
        self.graphics.rebuild_clips(self.device_scale(), (w, h));
        tracing::debug!("Reshaped resource to {}x{} at {:?}", w, h, self.device_ratio);
        Ok(())
    }

    /// Fill with the background color and reset the text cursor
    pub fn clear(&mut self) {
        if self.released {
            tracing::warn!("clear on a released resource");
            return;
        }
        let background = match self.kind {
            SurfaceKind::Offscreen => Color::TRANSPARENT,
            _ => self.config.background,
        };
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(background.into());
        }
        self.cursor_y = 0.0;
    }

    /// End the frame; hardware resources present their pixels
    pub fn flush(&mut self) {
        if self.released {
            tracing::warn!("flush on a released resource");
            return;
        }
        if self.graphics.depth() != 0 || self.paints.depth() != 0 {
            tracing::warn!(
                "Unbalanced stacks at flush: {} saves, {} paint pushes",
                self.graphics.depth(),
                self.paints.depth()
            );
        }
        if let (Some(presenter), Some(pixmap)) = (self.presenter.as_mut(), self.pixmap.as_ref()) {
            if let Err(e) = presenter.present(pixmap) {
                tracing::warn!("Presenting frame failed: {}", e);
            }
        }
        tracing::trace!("Flushed {:?} resource", self.kind);
    }

    /// Release the pixel buffer and presenter
    pub fn cleanup(&mut self) -> Result<()> {
        self.check_live()?;
        self.pixmap = None;
        self.presenter = None;
        self.released = true;
        tracing::debug!("Released {:?} resource", self.kind);
        Ok(())
    }

    /// Consume the resource, keeping its content as an image
    pub fn into_image(mut self) -> Result<Image> {
        self.check_live()?;
        let pixmap = self
            .pixmap
            .take()
            .ok_or(RenderError::InvalidDimension { width: 0, height: 0 })?;
        Ok(Image::from_pixmap(pixmap))
    }

    /// Copy of the current content
    pub fn snapshot(&self) -> Result<Image> {
        self.check_live()?;
        let pixmap = self
            .pixmap
            .clone()
            .ok_or(RenderError::InvalidDimension { width: 0, height: 0 })?;
        Ok(Image::from_pixmap(pixmap))
    }

    /// Unpremultiplied color of one pixel
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.pixmap.as_ref()?.pixel(x, y).map(Color::from)
    }

    /// Premultiplied pixel buffer
    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    // ------------------------------------------------------------------
    // Transform and clip
    // ------------------------------------------------------------------

    pub fn save(&mut self) {
        self.graphics.save();
    }

    pub fn restore(&mut self) -> Result<()> {
        self.check_live()?;
        self.graphics.restore()
    }

    /// Number of saves without a matching restore
    pub fn save_depth(&self) -> usize {
        self.graphics.depth()
    }

    pub fn translate(&mut self, tx: f32, ty: f32) {
        self.graphics.translate(tx, ty);
    }

    pub fn rotate(&mut self, degrees: f32) {
        self.graphics.rotate(degrees);
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.graphics.scale(sx, sy);
    }

    /// Post-multiply by a row-major 2×3 affine matrix:
    /// `x' = scale_x·x + skew_x·y + trans_x`, `y' = skew_y·x + scale_y·y + trans_y`
    pub fn transform(
        &mut self,
        scale_x: f32,
        skew_x: f32,
        trans_x: f32,
        skew_y: f32,
        scale_y: f32,
        trans_y: f32,
    ) {
        self.graphics
            .concat(Transform::from_row(scale_x, skew_y, skew_x, scale_y, trans_x, trans_y));
    }

    pub fn reset_transform(&mut self) {
        self.graphics.reset_transform();
    }

    /// Current transformation matrix (without device scaling)
    pub fn current_transform(&self) -> Transform {
        self.graphics.transform()
    }

    /// Set the device scale factor applied on top of the transform stack.
    ///
    /// Replaces the previous factor and is not affected by save/restore.
    pub fn set_scale(&mut self, sx: f32, sy: f32) {
        if !(sx.is_finite() && sy.is_finite()) {
            tracing::warn!("Ignoring non-finite scale {}x{}", sx, sy);
            return;
        }
        self.user_scale = (sx, sy);
    }

    /// User space to device pixels:
    /// `scale(device ratio) · scale(set_scale) · current transform`
    pub fn device_transform(&self) -> Transform {
        self.device_scale().pre_concat(self.logical_transform())
    }

    fn device_scale(&self) -> Transform {
        Transform::from_scale(self.device_ratio.0, self.device_ratio.1)
    }

    /// `scale(set_scale) · current transform`
    fn logical_transform(&self) -> Transform {
        Transform::from_scale(self.user_scale.0, self.user_scale.1).pre_concat(self.graphics.transform())
    }

    /// Intersect the clip with a rectangle in the current user space.
    ///
    /// On a hardware resource before its first reshape the rectangle is
    /// recorded and takes effect once the surface has pixels. Reshape
    /// rebuilds every saved clip for the new size and pixel ratio.
    pub fn clip_rect(&mut self, ox: f32, oy: f32, width: f32, height: f32) {
        let surface = self.pixmap.as_ref().map(|p| (p.width(), p.height()));
        let transform = self.logical_transform();
        let device_scale = self.device_scale();
        let anti_alias = self.paints.current().anti_alias;
        self.graphics
            .clip_rect((ox, oy, width, height), transform, device_scale, surface, anti_alias);
    }

    /// Device-space area still visible through the clip
    pub fn clip_bounds(&self) -> Option<Rect> {
        let surface = Rect::from_xywh(0.0, 0.0, self.width() as f32, self.height() as f32);
        match self.graphics.clip_bounds() {
            None => surface,
            Some(bounds) => bounds,
        }
    }

    // ------------------------------------------------------------------
    // Paint
    // ------------------------------------------------------------------

    pub fn push_paint(&mut self) {
        self.paints.push();
    }

    pub fn pop_paint(&mut self) -> Result<()> {
        self.check_live()?;
        self.paints.pop()
    }

    /// Current paint
    pub fn paint(&self) -> &PaintState {
        self.paints.current()
    }

    /// Number of paint pushes without a matching pop
    pub fn paint_depth(&self) -> usize {
        self.paints.depth()
    }

    pub fn set_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.paints.current_mut().set_color(r, g, b, a);
    }

    pub fn set_style(&mut self, style: Style) {
        self.paints.current_mut().style = style;
    }

    pub fn set_stroke_width(&mut self, width: f32) {
        self.paints.current_mut().set_stroke_width(width);
    }

    pub fn set_alpha(&mut self, alpha: u8) {
        self.paints.current_mut().alpha = alpha;
    }

    pub fn set_anti_alias(&mut self, anti_alias: bool) {
        self.paints.current_mut().anti_alias = anti_alias;
    }

    pub fn set_stroke_cap(&mut self, cap: StrokeCap) {
        self.paints.current_mut().cap = cap;
    }

    pub fn set_stroke_join(&mut self, join: StrokeJoin) {
        self.paints.current_mut().join = join;
    }

    pub fn set_stroke_miter(&mut self, limit: f32) {
        self.paints.current_mut().set_miter_limit(limit);
    }

    // ------------------------------------------------------------------
    // Text cursor
    // ------------------------------------------------------------------

    /// Vertical offset of the current text line
    pub fn text_cursor(&self) -> f32 {
        self.cursor_y
    }

    pub(crate) fn advance_text_cursor(&mut self, dy: f32) {
        self.cursor_y += dy;
    }

    // ------------------------------------------------------------------
    // Drawing primitives shared by paths, text and images
    // ------------------------------------------------------------------

    /// Whether draw calls can reach pixels; logs when they cannot
    fn can_draw(&self) -> bool {
        if self.released {
            tracing::warn!("Draw call on a released resource ignored");
            return false;
        }
        self.pixmap.is_some()
    }

    /// Fill or stroke `path` (given in user space, then mapped by `local`)
    /// with the current paint
    pub(crate) fn paint_path(&mut self, path: &Path, local: Transform) {
        if !self.can_draw() {
            return;
        }
        let transform = self.device_transform().pre_concat(local);
        let state = *self.paints.current();
        let paint = state.to_paint();
        let mask = self.graphics.clip_mask();
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };

        match state.style {
            Style::Fill => {
                pixmap.fill_path(path, &paint, FillRule::Winding, transform, mask);
            }
            Style::Stroke => {
                pixmap.stroke_path(path, &paint, &state.to_stroke(), transform, mask);
            }
        }
    }

    /// Composite a premultiplied pixmap at the user-space origin
    pub(crate) fn paint_pixmap(&mut self, src: PixmapRef<'_>, local: Transform, quality: FilterQuality) {
        if !self.can_draw() {
            return;
        }
        let transform = self.device_transform().pre_concat(local);
        let paint = PixmapPaint {
            opacity: self.paints.current().effective_alpha(),
            blend_mode: BlendMode::SourceOver,
            quality,
        };
        let mask = self.graphics.clip_mask();
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.draw_pixmap(0, 0, src, &paint, transform, mask);
        }
    }

    /// Composite another resource's current pixels at the origin
    pub fn draw_surface(&mut self, source: &Resource) {
        if source.released {
            tracing::warn!("draw_surface from a released resource ignored");
            return;
        }
        let Some(src) = source.pixmap.as_ref() else {
            return;
        };
        self.paint_pixmap(src.as_ref(), Transform::identity(), FilterQuality::Nearest);
    }

    /// Copy an external unpremultiplied buffer into the surface.
    ///
    /// Pixels are replaced, not blended, and the transform and clip are
    /// not applied. With `dirty_rects` (x, y, width, height) only those
    /// areas are copied; an empty slice copies the whole buffer.
    pub fn write_pixels(
        &mut self,
        buffer: &[u8],
        width: i32,
        height: i32,
        row_bytes: usize,
        format: PixelFormat,
        dirty_rects: &[(i32, i32, i32, i32)],
    ) -> Result<()> {
        self.check_live()?;
        if width <= 0 || height <= 0 {
            return Err(RenderError::InvalidDimension { width, height });
        }
        let (w, h) = (width as usize, height as usize);
        let row_bytes = if row_bytes == 0 { w * 4 } else { row_bytes };
        let required = row_bytes
            .checked_mul(h - 1)
            .and_then(|n| n.checked_add(w * 4));
        match required {
            Some(required) if row_bytes >= w * 4 && buffer.len() >= required => {}
            _ => return Err(RenderError::InvalidDimension { width, height }),
        }
        let Some(pixmap) = self.pixmap.as_mut() else {
            return Ok(());
        };

        let full = [(0, 0, width, height)];
        let rects = if dirty_rects.is_empty() { &full[..] } else { dirty_rects };
        let surface_width = pixmap.width() as i32;
        let surface_height = pixmap.height() as i32;
        let stride = pixmap.width() as usize;
        let pixels = pixmap.pixels_mut();

        for &(x, y, rw, rh) in rects {
            let x0 = x.max(0);
            let y0 = y.max(0);
            let x1 = x.saturating_add(rw).min(width).min(surface_width);
            let y1 = y.saturating_add(rh).min(height).min(surface_height);
            for row in y0..y1 {
                let src_row = &buffer[row as usize * row_bytes..];
                for col in x0..x1 {
                    let i = col as usize * 4;
                    let px = &src_row[i..i + 4];
                    let color = match format {
                        PixelFormat::Bgra8888 => ColorU8::from_rgba(px[2], px[1], px[0], px[3]),
                        PixelFormat::Rgba8888 => ColorU8::from_rgba(px[0], px[1], px[2], px[3]),
                    };
                    pixels[row as usize * stride + col as usize] = color.premultiply();
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("kind", &self.kind)
            .field("width", &self.width())
            .field("height", &self.height())
            .field("save_depth", &self.graphics.depth())
            .field("paint_depth", &self.paints.depth())
            .field("released", &self.released)
            .finish()
    }
}

fn allocate(config: &RenderConfig, width: i32, height: i32) -> Result<Pixmap> {
    if !config.accepts_dimensions(width, height) {
        return Err(RenderError::InvalidDimension { width, height });
    }
    Pixmap::new(width as u32, height as u32).ok_or(RenderError::InvalidDimension { width, height })
}

/// Font catalog matching a configuration
pub fn catalog_for(config: &RenderConfig) -> Arc<FontCatalog> {
    if config.load_system_fonts {
        FontCatalog::shared()
    } else {
        Arc::new(FontCatalog::new())
    }
}

/// Resolve a font with the configuration's default size and fallback
/// families. Sizes that are not positive fall back to the default.
pub fn resolve_font(
    config: &RenderConfig,
    fonts: &FontCatalog,
    name: Option<&str>,
    size: f32,
    style: FontStyle,
) -> Result<Font> {
    let size = font_size_or_default(config, size);
    let font = fonts.load_font_with_fallbacks(name, size, style, &config.fallback_families)?;
    tracing::debug!("Resolved font {:?} to {}", name, font.family());
    Ok(font)
}

/// Font from in-memory TrueType/OpenType bytes, with the same size
/// defaulting as [`resolve_font`]
pub fn font_from_memory(config: &RenderConfig, bytes: &[u8], size: f32, style: FontStyle) -> Result<Font> {
    let size = font_size_or_default(config, size);
    let font = FontCatalog::font_from_data(bytes.to_vec(), size, style)?;
    tracing::debug!("Loaded font {} from {} bytes", font.family(), bytes.len());
    Ok(font)
}

fn font_size_or_default(config: &RenderConfig, size: f32) -> f32 {
    if size.is_finite() && size > 0.0 {
        size
    } else {
        config.default_font_size
    }
}
