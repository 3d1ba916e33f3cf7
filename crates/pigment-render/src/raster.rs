//! Path and shape rasterization
//!
//! Draw calls never fail. Degenerate input (too few points, non-positive
//! sizes, non-finite coordinates) draws nothing.

use tiny_skia::{Path, PathBuilder, Point, Rect, Transform};

use crate::surface::Resource;

/// Cubic Bézier control distance approximating a quarter circle
const KAPPA: f32 = 0.552_284_8;

/// Reusable path builder
#[derive(Debug, Clone, Default)]
pub struct VectorPath {
    builder: PathBuilder,
}

impl VectorPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x, y);
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x, y);
    }

    pub fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(x1, y1, x, y);
    }

    pub fn cubic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    /// Rational quadratic to `(x, y)` with control `(x1, y1)`, flattened
    /// into quads. Weight 1 is a plain quad; a non-positive weight
    /// degrades to a line and an infinite one to the control polygon.
    pub fn conic_to(&mut self, x1: f32, y1: f32, x: f32, y: f32, weight: f32) {
        if !(weight > 0.0) {
            self.builder.line_to(x, y);
            return;
        }
        if !weight.is_finite() {
            self.builder.line_to(x1, y1);
            self.builder.line_to(x, y);
            return;
        }
        if weight == 1.0 {
            self.builder.quad_to(x1, y1, x, y);
            return;
        }

        let start = self.current_point();
        let conic = Conic {
            p0: start,
            p1: Point::from_xy(x1, y1),
            p2: Point::from_xy(x, y),
            weight,
        };
        let pow2 = conic.quad_pow2(CONIC_TOLERANCE);
        conic.emit_quads(pow2, &mut self.builder);
    }

    /// Arc of `radius` tangent to the lines from the current point to
    /// `(x1, y1)` and from there to `(x2, y2)`, preceded by a line to the
    /// first tangent point. Collinear points or a zero radius give a line
    /// to `(x1, y1)`.
    pub fn arc_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, radius: f32) {
        let start = self.current_point();
        let corner = Point::from_xy(x1, y1);
        if !(radius > 0.0) || !radius.is_finite() {
            self.builder.line_to(x1, y1);
            return;
        }

        let (Some(before), Some(after)) = (
            normalized(corner.x - start.x, corner.y - start.y),
            normalized(x2 - x1, y2 - y1),
        ) else {
            self.builder.line_to(x1, y1);
            return;
        };

        let cos = before.x * after.x + before.y * after.y;
        let sin = before.x * after.y - before.y * after.x;
        if sin.abs() <= f32::EPSILON {
            self.builder.line_to(x1, y1);
            return;
        }

        let dist = (radius * (1.0 - cos) / sin).abs();
        self.builder.line_to(x1 - dist * before.x, y1 - dist * before.y);
        let weight = (0.5 + cos * 0.5).sqrt();
        self.conic_to(x1, y1, x1 + dist * after.x, y1 + dist * after.y, weight);
    }

    pub fn close(&mut self) {
        self.builder.close();
    }

    /// End point of the last segment; the origin for an empty path
    fn current_point(&mut self) -> Point {
        if self.builder.is_empty() {
            self.builder.move_to(0.0, 0.0);
        }
        self.builder.last_point().unwrap_or_else(Point::zero)
    }

    /// Remove all segments
    pub fn reset(&mut self) {
        self.builder.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.builder.is_empty()
    }

    /// Finished path, or `None` if it has no drawable segments
    pub fn to_path(&self) -> Option<Path> {
        self.builder.clone().finish()
    }
}

/// Largest distance between a conic and its quad approximation, in user
/// units
const CONIC_TOLERANCE: f32 = 0.25;

/// Quads per conic are capped at `2^MAX_CONIC_POW2`
const MAX_CONIC_POW2: u32 = 4;

fn normalized(x: f32, y: f32) -> Option<Point> {
    let len = (x * x + y * y).sqrt();
    if !(len > 0.0) || !len.is_finite() {
        return None;
    }
    Some(Point::from_xy(x / len, y / len))
}

#[derive(Debug, Clone, Copy)]
struct Conic {
    p0: Point,
    p1: Point,
    p2: Point,
    weight: f32,
}

impl Conic {
    /// Number of halvings needed so that each half is within `tolerance`
    /// of a quad with the same control points
    fn quad_pow2(&self, tolerance: f32) -> u32 {
        let a = self.weight - 1.0;
        let k = a / (4.0 * (2.0 + a));
        let x = k * (self.p0.x - 2.0 * self.p1.x + self.p2.x);
        let y = k * (self.p0.y - 2.0 * self.p1.y + self.p2.y);
        let mut error = (x * x + y * y).sqrt();
        let mut pow2 = 0;
        while error > tolerance && pow2 < MAX_CONIC_POW2 {
            error *= 0.25;
            pow2 += 1;
        }
        pow2
    }

    /// Split at t = 0.5
    fn halves(&self) -> (Conic, Conic) {
        let w = self.weight;
        let scale = 1.0 / (1.0 + w);
        let mid = Point::from_xy(
            (self.p0.x + 2.0 * w * self.p1.x + self.p2.x) * scale * 0.5,
            (self.p0.y + 2.0 * w * self.p1.y + self.p2.y) * scale * 0.5,
        );
        let weight = (0.5 + w * 0.5).sqrt();
        let first = Conic {
            p0: self.p0,
            p1: Point::from_xy((self.p0.x + w * self.p1.x) * scale, (self.p0.y + w * self.p1.y) * scale),
            p2: mid,
            weight,
        };
        let second = Conic {
            p0: mid,
            p1: Point::from_xy((w * self.p1.x + self.p2.x) * scale, (w * self.p1.y + self.p2.y) * scale),
            p2: self.p2,
            weight,
        };
        (first, second)
    }

    fn emit_quads(&self, pow2: u32, builder: &mut PathBuilder) {
        if pow2 == 0 {
            builder.quad_to(self.p1.x, self.p1.y, self.p2.x, self.p2.y);
            return;
        }
        let (first, second) = self.halves();
        first.emit_quads(pow2 - 1, builder);
        second.emit_quads(pow2 - 1, builder);
    }
}

/// Path through a flat `[x0, y0, x1, y1, ...]` list; a trailing odd value
/// is ignored
pub fn polyline(points: &[f32], close: bool) -> Option<Path> {
    let mut pairs = points.chunks_exact(2);
    let first = pairs.next()?;
    if pairs.len() == 0 {
        return None;
    }

    let mut builder = PathBuilder::new();
    builder.move_to(first[0], first[1]);
    for p in pairs {
        builder.line_to(p[0], p[1]);
    }
    if close {
        builder.close();
    }
    builder.finish()
}

/// Rounded rectangle at the origin built from four cubic corner arcs.
///
/// The radius is clamped to `[0, min(width, height) / 2]`.
pub fn rounded_rect(width: f32, height: f32, radius: f32) -> Option<Path> {
    if !(width > 0.0 && height > 0.0) {
        return None;
    }
    let r = if radius.is_nan() { 0.0 } else { radius.clamp(0.0, width.min(height) / 2.0) };
    if r == 0.0 {
        return Rect::from_xywh(0.0, 0.0, width, height).map(PathBuilder::from_rect);
    }

    let k = r * KAPPA;
    let (w, h) = (width, height);
    let mut pb = PathBuilder::new();
    pb.move_to(r, 0.0);
    pb.line_to(w - r, 0.0);
    pb.cubic_to(w - r + k, 0.0, w, r - k, w, r);
    pb.line_to(w, h - r);
    pb.cubic_to(w, h - r + k, w - r + k, h, w - r, h);
    pb.line_to(r, h);
    pb.cubic_to(r - k, h, 0.0, h - r + k, 0.0, h - r);
    pb.line_to(0.0, r);
    pb.cubic_to(0.0, r - k, r - k, 0.0, r, 0.0);
    pb.close();
    pb.finish()
}

impl Resource {
    /// Open polyline through `points`
    pub fn draw_path(&mut self, points: &[f32]) {
        if let Some(path) = polyline(points, false) {
            self.paint_path(&path, Transform::identity());
        }
    }

    /// Closed polygon through `points`
    pub fn draw_polygon(&mut self, points: &[f32]) {
        if let Some(path) = polyline(points, true) {
            self.paint_path(&path, Transform::identity());
        }
    }

    /// Rounded rectangle at the origin of the current transform
    pub fn draw_rounded_rect(&mut self, width: f32, height: f32, radius: f32) {
        if let Some(path) = rounded_rect(width, height, radius) {
            self.paint_path(&path, Transform::identity());
        }
    }

    pub fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0) {
            return;
        }
        if let Some(rect) = Rect::from_xywh(x, y, width, height) {
            self.paint_path(&PathBuilder::from_rect(rect), Transform::identity());
        }
    }

    pub fn draw_vector_path(&mut self, path: &VectorPath) {
        if let Some(path) = path.to_path() {
            self.paint_path(&path, Transform::identity());
        }
    }
}
