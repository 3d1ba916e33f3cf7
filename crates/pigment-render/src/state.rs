//! Transform/clip and paint state stacks
//!
//! A resource keeps two independent stacks: [`GraphicsStack`] for the
//! current transform and clip (`save`/`restore`) and [`PaintStack`] for
//! color and stroke settings (`push_paint`/`pop_paint`). Both always hold
//! at least the base level.

use std::sync::Arc;

use tiny_skia::{FillRule, Mask, PathBuilder, Rect, Transform};

use crate::{Color, RenderError, Result};

/// Paint style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Fill,
    Stroke,
}

impl Style {
    /// Style from its C ABI code (0 fill, 1 stroke)
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Style::Fill),
            1 => Some(Style::Stroke),
            _ => None,
        }
    }
}

/// Stroke end cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl StrokeCap {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(StrokeCap::Butt),
            1 => Some(StrokeCap::Round),
            2 => Some(StrokeCap::Square),
            _ => None,
        }
    }
}

impl From<StrokeCap> for tiny_skia::LineCap {
    fn from(cap: StrokeCap) -> Self {
        match cap {
            StrokeCap::Butt => tiny_skia::LineCap::Butt,
            StrokeCap::Round => tiny_skia::LineCap::Round,
            StrokeCap::Square => tiny_skia::LineCap::Square,
        }
    }
}

/// Stroke corner join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl StrokeJoin {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(StrokeJoin::Miter),
            1 => Some(StrokeJoin::Round),
            2 => Some(StrokeJoin::Bevel),
            _ => None,
        }
    }
}

impl From<StrokeJoin> for tiny_skia::LineJoin {
    fn from(join: StrokeJoin) -> Self {
        match join {
            StrokeJoin::Miter => tiny_skia::LineJoin::Miter,
            StrokeJoin::Round => tiny_skia::LineJoin::Round,
            StrokeJoin::Bevel => tiny_skia::LineJoin::Bevel,
        }
    }
}

/// Paint settings used by every draw call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintState {
    /// RGBA components in [0, 1]
    pub color: [f32; 4],
    pub style: Style,
    /// Stroke width in user units; 0 is a hairline
    pub stroke_width: f32,
    /// Global alpha layered on top of `color[3]`
    pub alpha: u8,
    pub anti_alias: bool,
    pub cap: StrokeCap,
    pub join: StrokeJoin,
    pub miter_limit: f32,
}

impl PaintState {
    pub fn new(anti_alias: bool) -> Self {
        Self {
            color: [0.0, 0.0, 0.0, 1.0],
            style: Style::Fill,
            stroke_width: 1.0,
            alpha: 255,
            anti_alias,
            cap: StrokeCap::Butt,
            join: StrokeJoin::Miter,
            miter_limit: 4.0,
        }
    }

    /// Set the color; components are clamped to [0, 1] and NaN becomes 0
    pub fn set_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        let clamp = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        self.color = [clamp(r), clamp(g), clamp(b), clamp(a)];
    }

    /// Set the stroke width, ignoring negative and NaN values
    pub fn set_stroke_width(&mut self, width: f32) {
        if width.is_nan() || width < 0.0 {
            tracing::warn!("Ignoring invalid stroke width {}", width);
            return;
        }
        self.stroke_width = width;
    }

    /// Set the miter limit, ignoring values below 1
    pub fn set_miter_limit(&mut self, limit: f32) {
        if limit.is_nan() || limit < 1.0 {
            tracing::warn!("Ignoring invalid miter limit {}", limit);
            return;
        }
        self.miter_limit = limit;
    }

    /// Alpha after applying the global alpha byte, in [0, 1]
    pub fn effective_alpha(&self) -> f32 {
        self.color[3] * self.alpha as f32 / 255.0
    }

    /// Current color as 8-bit RGBA with the global alpha applied
    pub fn color(&self) -> Color {
        let byte = |v: f32| (v * 255.0 + 0.5) as u8;
        Color::rgba(
            byte(self.color[0]),
            byte(self.color[1]),
            byte(self.color[2]),
            byte(self.effective_alpha()),
        )
    }

    /// tiny-skia paint for solid fills and strokes
    pub fn to_paint(&self) -> tiny_skia::Paint<'static> {
        let mut paint = tiny_skia::Paint::default();
        let [r, g, b, _] = self.color;
        let color = tiny_skia::Color::from_rgba(r, g, b, self.effective_alpha())
            .unwrap_or(tiny_skia::Color::BLACK);
        paint.set_color(color);
        paint.anti_alias = self.anti_alias;
        paint
    }

    /// tiny-skia stroke settings
    pub fn to_stroke(&self) -> tiny_skia::Stroke {
        tiny_skia::Stroke {
            width: self.stroke_width,
            miter_limit: self.miter_limit,
            line_cap: self.cap.into(),
            line_join: self.join.into(),
            ..tiny_skia::Stroke::default()
        }
    }
}

impl Default for PaintState {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Stack of paint states
#[derive(Debug, Clone)]
pub struct PaintStack {
    states: Vec<PaintState>,
}

impl PaintStack {
    pub fn new(base: PaintState) -> Self {
        Self { states: vec![base] }
    }

    /// Push a copy of the current paint
    pub fn push(&mut self) {
        let top = *self.current();
        self.states.push(top);
    }

    /// Pop the current paint; the base level cannot be popped
    pub fn pop(&mut self) -> Result<()> {
        if self.states.len() <= 1 {
            return Err(RenderError::StackUnderflow);
        }
        self.states.pop();
        Ok(())
    }

    pub fn current(&self) -> &PaintState {
        // The base level is never popped
        &self.states[self.states.len() - 1]
    }

    pub fn current_mut(&mut self) -> &mut PaintState {
        let top = self.states.len() - 1;
        &mut self.states[top]
    }

    /// Number of pushes without a matching pop
    pub fn depth(&self) -> usize {
        self.states.len() - 1
    }
}

impl Default for PaintStack {
    fn default() -> Self {
        Self::new(PaintState::default())
    }
}

/// One `clip_rect` call, kept so the mask can be rebuilt for a new
/// surface size or pixel ratio
#[derive(Debug, Clone, Copy)]
struct ClipStep {
    /// `None` clips everything away
    rect: Option<Rect>,
    /// User space to logical space (everything but the device ratio)
    transform: Transform,
    anti_alias: bool,
}

/// Clip coverage in device pixels
#[derive(Clone)]
struct DeviceClip {
    mask: Arc<Mask>,
    /// `None` when nothing is visible
    bounds: Option<Rect>,
}

impl DeviceClip {
    /// Everything visible
    fn new(surface: (u32, u32)) -> Option<Self> {
        let mut mask = Mask::new(surface.0, surface.1)?;
        mask.data_mut().fill(255);
        Some(Self {
            mask: Arc::new(mask),
            bounds: Rect::from_xywh(0.0, 0.0, surface.0 as f32, surface.1 as f32),
        })
    }

    fn intersect(&mut self, step: &ClipStep, device_scale: Transform) {
        let Some(path) = step.rect.map(PathBuilder::from_rect) else {
            Arc::make_mut(&mut self.mask).clear();
            self.bounds = None;
            return;
        };
        let device = device_scale.pre_concat(step.transform);
        Arc::make_mut(&mut self.mask).intersect_path(&path, FillRule::Winding, step.anti_alias, device);
        let rect_bounds = path.transform(device).map(|p| p.bounds());
        self.bounds = match (self.bounds, rect_bounds) {
            (Some(old), Some(new)) => old.intersect(&new),
            _ => None,
        };
    }
}

/// Clip of one stack level
#[derive(Clone)]
struct Clip {
    steps: Vec<ClipStep>,
    /// `None` while the surface has no pixels
    device: Option<DeviceClip>,
}

impl Clip {
    fn rebuild(&mut self, device_scale: Transform, surface: (u32, u32)) {
        self.device = DeviceClip::new(surface).map(|mut device| {
            for step in &self.steps {
                device.intersect(step, device_scale);
            }
            device
        });
    }
}

impl std::fmt::Debug for Clip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let device = self.device.as_ref().map(|d| ((d.mask.width(), d.mask.height()), d.bounds));
        f.debug_struct("Clip")
            .field("steps", &self.steps)
            .field("device", &device)
            .finish()
    }
}

/// Transform and clip saved by `save`
#[derive(Debug, Clone)]
pub struct GraphicsState {
    pub transform: Transform,
    clip: Option<Clip>,
}

impl GraphicsState {
    /// Clip coverage mask, if a clip is active and the surface has pixels
    pub fn clip_mask(&self) -> Option<&Mask> {
        self.clip.as_ref()?.device.as_ref().map(|d| d.mask.as_ref())
    }
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            clip: None,
        }
    }
}

/// Stack of transform/clip states
#[derive(Debug, Clone)]
pub struct GraphicsStack {
    states: Vec<GraphicsState>,
}

impl GraphicsStack {
    pub fn new() -> Self {
        Self { states: vec![GraphicsState::default()] }
    }

    /// Push a copy of the current state
    pub fn save(&mut self) {
        let top = self.current().clone();
        self.states.push(top);
    }

    /// Pop to the previous state; the base level cannot be popped
    pub fn restore(&mut self) -> Result<()> {
        if self.states.len() <= 1 {
            return Err(RenderError::StackUnderflow);
        }
        self.states.pop();
        Ok(())
    }

    pub fn current(&self) -> &GraphicsState {
        &self.states[self.states.len() - 1]
    }

    fn current_mut(&mut self) -> &mut GraphicsState {
        let top = self.states.len() - 1;
        &mut self.states[top]
    }

    /// Number of saves without a matching restore
    pub fn depth(&self) -> usize {
        self.states.len() - 1
    }

    /// Current transformation matrix
    pub fn transform(&self) -> Transform {
        self.current().transform
    }

    pub fn translate(&mut self, tx: f32, ty: f32) {
        self.concat(Transform::from_translate(tx, ty));
    }

    /// Rotate by `degrees` (clockwise on screen)
    pub fn rotate(&mut self, degrees: f32) {
        self.concat(Transform::from_rotate(degrees));
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.concat(Transform::from_scale(sx, sy));
    }

    /// Post-multiply the current transform: `m` applies before the
    /// existing transform
    pub fn concat(&mut self, m: Transform) {
        let state = self.current_mut();
        state.transform = state.transform.pre_concat(m);
    }

    pub fn reset_transform(&mut self) {
        self.current_mut().transform = Transform::identity();
    }

    /// Intersect the clip with a rectangle in user space.
    ///
    /// `transform` maps user space to logical space and `device_scale`
    /// logical space to pixels of a `surface`-sized buffer. Without a
    /// surface the rectangle is recorded and applied by
    /// [`GraphicsStack::rebuild_clips`]. Non-positive rectangle sizes clip
    /// everything away.
    pub fn clip_rect(
        &mut self,
        rect: (f32, f32, f32, f32),
        transform: Transform,
        device_scale: Transform,
        surface: Option<(u32, u32)>,
        anti_alias: bool,
    ) {
        let (x, y, w, h) = rect;
        let rect = if w > 0.0 && h > 0.0 { Rect::from_xywh(x, y, w, h) } else { None };
        let step = ClipStep { rect, transform, anti_alias };

        let state = self.current_mut();
        let clip = state.clip.get_or_insert_with(|| Clip { steps: Vec::new(), device: None });
        clip.steps.push(step);
        let Some(size) = surface else {
            clip.device = None;
            return;
        };
        if let Some(device) = clip.device.as_mut() {
            device.intersect(&step, device_scale);
        } else {
            clip.rebuild(device_scale, size);
        }
    }

    /// Device-space bounds of the clip.
    ///
    /// `None` means no clip is active; `Some(None)` means everything is
    /// clipped away (or the surface has no pixels yet).
    pub fn clip_bounds(&self) -> Option<Option<Rect>> {
        self.current()
            .clip
            .as_ref()
            .map(|c| c.device.as_ref().and_then(|d| d.bounds))
    }

    pub fn clip_mask(&self) -> Option<&Mask> {
        self.current().clip_mask()
    }

    /// Recompute the clip masks of every level for a new surface size or
    /// device scale
    pub fn rebuild_clips(&mut self, device_scale: Transform, surface: (u32, u32)) {
        for clip in self.states.iter_mut().filter_map(|s| s.clip.as_mut()) {
            clip.rebuild(device_scale, surface);
        }
    }
}

impl Default for GraphicsStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_is_clamped() {
        let mut paint = PaintState::default();
        paint.set_color(2.0, -1.0, f32::NAN, 0.5);
        assert_eq!(paint.color, [1.0, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_effective_alpha() {
        let mut paint = PaintState::default();
        paint.set_color(1.0, 0.0, 0.0, 0.5);
        paint.alpha = 128;
        assert!((paint.effective_alpha() - 0.5 * 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(paint.color().a, 64);
    }

    #[test]
    fn test_stroke_width_validation() {
        let mut paint = PaintState::default();
        paint.set_stroke_width(3.0);
        paint.set_stroke_width(-1.0);
        paint.set_stroke_width(f32::NAN);
        assert_eq!(paint.stroke_width, 3.0);
        paint.set_stroke_width(0.0);
        assert_eq!(paint.stroke_width, 0.0);
    }

    #[test]
    fn test_paint_stack() {
        let mut stack = PaintStack::default();
        stack.push();
        stack.current_mut().style = Style::Stroke;
        assert_eq!(stack.depth(), 1);
        stack.pop().unwrap();
        assert_eq!(stack.current().style, Style::Fill);
        assert!(matches!(stack.pop(), Err(RenderError::StackUnderflow)));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_save_restore_transform() {
        let mut stack = GraphicsStack::new();
        stack.translate(10.0, 20.0);
        let before = stack.transform();
        stack.save();
        stack.rotate(45.0);
        stack.scale(2.0, 3.0);
        assert_ne!(stack.transform(), before);
        stack.restore().unwrap();
        assert_eq!(stack.transform(), before);
    }

    #[test]
    fn test_restore_underflow_keeps_state() {
        let mut stack = GraphicsStack::new();
        stack.translate(5.0, 5.0);
        assert!(matches!(stack.restore(), Err(RenderError::StackUnderflow)));
        assert_eq!(stack.transform(), Transform::from_translate(5.0, 5.0));
    }

    #[test]
    fn test_concat_is_post_multiply() {
        let mut stack = GraphicsStack::new();
        stack.translate(10.0, 0.0);
        stack.scale(2.0, 2.0);
        let mut p = [tiny_skia::Point::from_xy(1.0, 1.0)];
        stack.transform().map_points(&mut p);
        // Scale applies first, then the translation
        assert_eq!(p[0], tiny_skia::Point::from_xy(12.0, 2.0));
    }

    #[test]
    fn test_clip_bounds() {
        let mut stack = GraphicsStack::new();
        assert!(stack.clip_bounds().is_none());

        stack.translate(10.0, 10.0);
        let id = Transform::identity();
        stack.clip_rect((0.0, 0.0, 20.0, 20.0), stack.transform(), id, Some((100, 100)), true);
        let bounds = stack.clip_bounds().unwrap().unwrap();
        assert_eq!((bounds.left(), bounds.top(), bounds.right(), bounds.bottom()), (10.0, 10.0, 30.0, 30.0));

        stack.save();
        stack.clip_rect((10.0, 10.0, 50.0, 50.0), stack.transform(), id, Some((100, 100)), true);
        let bounds = stack.clip_bounds().unwrap().unwrap();
        assert_eq!((bounds.left(), bounds.top(), bounds.right(), bounds.bottom()), (20.0, 20.0, 30.0, 30.0));

        stack.restore().unwrap();
        let bounds = stack.clip_bounds().unwrap().unwrap();
        assert_eq!(bounds.right(), 30.0);
    }

    #[test]
    fn test_negative_clip_hides_everything() {
        let mut stack = GraphicsStack::new();
        let id = Transform::identity();
        stack.clip_rect((0.0, 0.0, -5.0, 10.0), id, id, Some((10, 10)), true);
        assert_eq!(stack.clip_bounds(), Some(None));
        assert!(stack.clip_mask().unwrap().data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_clip_recorded_without_surface() {
        let mut stack = GraphicsStack::new();
        let id = Transform::identity();
        stack.clip_rect((0.0, 0.0, 5.0, 5.0), id, id, None, false);
        assert!(stack.clip_mask().is_none());
        assert_eq!(stack.clip_bounds(), Some(None));

        stack.rebuild_clips(id, (20, 20));
        let bounds = stack.clip_bounds().unwrap().unwrap();
        assert_eq!((bounds.right(), bounds.bottom()), (5.0, 5.0));
        let mask = stack.clip_mask().unwrap();
        assert_eq!(mask.data()[0], 255);
        assert_eq!(mask.data()[10 * 20 + 10], 0);
    }

    #[test]
    fn test_rebuild_clips_every_level() {
        let mut stack = GraphicsStack::new();
        let id = Transform::identity();
        stack.clip_rect((0.0, 0.0, 10.0, 10.0), id, id, Some((20, 20)), false);
        stack.save();
        stack.clip_rect((5.0, 5.0, 10.0, 10.0), id, id, Some((20, 20)), false);

        // Twice the pixel ratio on a larger buffer
        stack.rebuild_clips(Transform::from_scale(2.0, 2.0), (40, 40));
        let bounds = stack.clip_bounds().unwrap().unwrap();
        assert_eq!((bounds.left(), bounds.right()), (10.0, 20.0));
        assert_eq!(stack.clip_mask().unwrap().width(), 40);

        stack.restore().unwrap();
        let bounds = stack.clip_bounds().unwrap().unwrap();
        assert_eq!((bounds.left(), bounds.right()), (0.0, 20.0));
        assert_eq!(stack.clip_mask().unwrap().height(), 40);
    }
}
