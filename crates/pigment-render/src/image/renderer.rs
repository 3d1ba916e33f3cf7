//! Image drawing onto resources

use tiny_skia::{FilterQuality, Transform};

use super::Image;
use crate::surface::Resource;

/// Transform mapping an image of `image_size` onto a `width`×`height` box
/// at the origin, or `None` when nothing would be visible
fn fit_transform(image_size: (u32, u32), width: f32, height: f32) -> Option<Transform> {
    if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
        return None;
    }
    let (iw, ih) = image_size;
    Some(Transform::from_scale(width / iw as f32, height / ih as f32))
}

impl Resource {
    /// Draw at native resolution at the origin of the current transform
    pub fn draw_image(&mut self, image: &Image) {
        self.paint_pixmap(image.pixmap().as_ref(), Transform::identity(), FilterQuality::Nearest);
    }

    /// Draw scaled to exactly `width`×`height`
    pub fn draw_image_rect(&mut self, image: &Image, width: f32, height: f32) {
        let Some(scale) = fit_transform(image.bounds(), width, height) else {
            return;
        };
        self.paint_pixmap(image.pixmap().as_ref(), scale, FilterQuality::Bilinear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_transform() {
        let ts = fit_transform((10, 20), 30.0, 10.0).unwrap();
        assert_eq!(ts, Transform::from_scale(3.0, 0.5));
        assert!(fit_transform((10, 10), 0.0, 10.0).is_none());
        assert!(fit_transform((10, 10), 10.0, -2.0).is_none());
        assert!(fit_transform((10, 10), f32::INFINITY, 2.0).is_none());
    }
}
