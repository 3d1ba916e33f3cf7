//! Integration tests - drawing through resources and reading pixels back
//!
//! Font-dependent tests return early on systems without fonts.

use std::sync::{Arc, Mutex};

use pigment_render::*;

fn software(width: i32, height: i32) -> Resource {
    let config = Arc::new(RenderConfig::new().with_system_fonts(false));
    let fonts = catalog_for(&config);
    Resource::software_with(config, fonts, width, height).unwrap()
}

fn pixel(resource: &Resource, x: u32, y: u32) -> Color {
    resource.pixel(x, y).unwrap()
}

fn text_resource(width: i32, height: i32) -> Option<(Resource, Font)> {
    let resource = Resource::software(width, height).unwrap();
    if resource.fonts().is_empty() {
        return None;
    }
    let font = resource
        .load_font(Some("Arial"), 16.0, FontStyle::from_request(400, 5, 0))
        .unwrap();
    Some((resource, font))
}

// ============================================================================
// SHAPE TESTS
// ============================================================================

#[test]
fn test_rounded_rect_fill() {
    let mut resource = software(200, 100);
    resource.clear();
    resource.set_color(1.0, 0.0, 0.0, 1.0);
    resource.set_style(Style::Fill);
    resource.draw_rounded_rect(50.0, 30.0, 10.0);
    resource.flush();

    assert_eq!(pixel(&resource, 25, 15), Color::RED);
    assert_eq!(pixel(&resource, 10, 2), Color::RED);
    // Outside the rectangle and outside the rounded corner
    assert_eq!(pixel(&resource, 100, 50), Color::WHITE);
    assert_eq!(pixel(&resource, 0, 0), Color::WHITE);
    assert_eq!(pixel(&resource, 49, 29), Color::WHITE);
}

#[test]
fn test_polygon_fill() {
    let mut resource = software(50, 50);
    resource.clear();
    resource.set_color(0.0, 0.0, 1.0, 1.0);
    resource.draw_polygon(&[0.0, 0.0, 40.0, 0.0, 0.0, 40.0]);

    assert_eq!(pixel(&resource, 5, 5), Color::BLUE);
    assert_eq!(pixel(&resource, 35, 35), Color::WHITE);
}

#[test]
fn test_open_path_fill_is_implicitly_closed() {
    let mut resource = software(50, 50);
    resource.clear();
    resource.draw_path(&[0.0, 0.0, 40.0, 0.0, 0.0, 40.0]);
    assert_eq!(pixel(&resource, 5, 5), Color::BLACK);
}

#[test]
fn test_stroked_path() {
    let mut resource = software(50, 50);
    resource.clear();
    resource.set_style(Style::Stroke);
    resource.set_stroke_width(4.0);
    resource.draw_path(&[5.0, 20.0, 45.0, 20.0]);

    assert_eq!(pixel(&resource, 25, 20), Color::BLACK);
    assert_eq!(pixel(&resource, 25, 30), Color::WHITE);
    // Butt caps end at the first point
    assert_eq!(pixel(&resource, 2, 20), Color::WHITE);
}

#[test]
fn test_degenerate_shapes_draw_nothing() {
    let mut resource = software(20, 20);
    resource.clear();
    resource.draw_path(&[5.0, 5.0]);
    resource.draw_polygon(&[1.0, 2.0, 3.0]);
    resource.draw_rounded_rect(0.0, 10.0, 2.0);
    resource.draw_rounded_rect(10.0, -10.0, 2.0);
    resource.draw_rect(0.0, 0.0, -5.0, 5.0);

    let data = resource.pixmap().unwrap().data();
    assert!(data.iter().all(|&b| b == 255));
}

#[test]
fn test_vector_path() {
    let mut resource = software(40, 40);
    resource.clear();
    let mut path = VectorPath::new();
    path.move_to(0.0, 0.0);
    path.line_to(30.0, 0.0);
    path.cubic_to(30.0, 10.0, 30.0, 20.0, 30.0, 30.0);
    path.line_to(0.0, 30.0);
    path.close();
    resource.draw_vector_path(&path);

    assert_eq!(pixel(&resource, 15, 15), Color::BLACK);
    assert_eq!(pixel(&resource, 35, 35), Color::WHITE);
}

// ============================================================================
// PAINT TESTS
// ============================================================================

#[test]
fn test_alpha_blends_over_background() {
    let mut resource = software(10, 10);
    resource.clear();
    resource.set_color(1.0, 0.0, 0.0, 1.0);
    resource.set_alpha(128);
    resource.draw_rect(0.0, 0.0, 10.0, 10.0);

    assert!(pixel(&resource, 5, 5).approx_eq(&Color::rgb(255, 127, 127), 2));
}

#[test]
fn test_push_pop_paint() {
    let mut resource = software(10, 10);
    resource.set_color(1.0, 0.0, 0.0, 1.0);
    resource.push_paint();
    resource.set_color(0.0, 1.0, 0.0, 1.0);
    resource.set_style(Style::Stroke);
    resource.pop_paint().unwrap();

    assert_eq!(resource.paint().color, [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(resource.paint().style, Style::Fill);
    assert!(matches!(resource.pop_paint(), Err(RenderError::StackUnderflow)));
}

#[test]
fn test_out_of_range_color_is_clamped() {
    let mut resource = software(4, 4);
    resource.set_color(1.5, -0.5, 0.25, 7.0);
    assert_eq!(resource.paint().color, [1.0, 0.0, 0.25, 1.0]);
}

// ============================================================================
// TRANSFORM & CLIP TESTS
// ============================================================================

#[test]
fn test_translate_moves_drawing() {
    let mut resource = software(40, 40);
    resource.clear();
    resource.translate(20.0, 20.0);
    resource.draw_rect(0.0, 0.0, 10.0, 10.0);

    assert_eq!(pixel(&resource, 5, 5), Color::WHITE);
    assert_eq!(pixel(&resource, 25, 25), Color::BLACK);
}

#[test]
fn test_save_restore_transform() {
    let mut resource = software(40, 40);
    let before = resource.current_transform();
    resource.save();
    resource.translate(5.0, 5.0);
    resource.rotate(30.0);
    resource.transform(2.0, 0.0, 1.0, 0.0, 2.0, 1.0);
    resource.restore().unwrap();
    assert_eq!(resource.current_transform(), before);
    assert!(matches!(resource.restore(), Err(RenderError::StackUnderflow)));
}

#[test]
fn test_set_scale_and_device_ratio() {
    let mut resource = software(40, 40);
    resource.reshape(40, 40, 2.0, 2.0).unwrap();
    resource.clear();
    resource.set_scale(2.0, 2.0);
    // 4x total: a 5x5 rect covers 20x20 device pixels
    resource.draw_rect(0.0, 0.0, 5.0, 5.0);

    assert_eq!(pixel(&resource, 19, 19), Color::BLACK);
    assert_eq!(pixel(&resource, 21, 21), Color::WHITE);
}

#[test]
fn test_clip_rect() {
    let mut resource = software(40, 40);
    resource.clear();
    resource.save();
    resource.clip_rect(0.0, 0.0, 10.0, 10.0);
    resource.draw_rect(0.0, 0.0, 30.0, 30.0);
    resource.restore().unwrap();

    assert_eq!(pixel(&resource, 5, 5), Color::BLACK);
    assert_eq!(pixel(&resource, 15, 15), Color::WHITE);

    // The clip was restored with the transform
    resource.draw_rect(20.0, 20.0, 10.0, 10.0);
    assert_eq!(pixel(&resource, 25, 25), Color::BLACK);
}

#[test]
fn test_clip_follows_transform() {
    let mut resource = software(40, 40);
    resource.clear();
    resource.translate(20.0, 20.0);
    resource.clip_rect(0.0, 0.0, 10.0, 10.0);
    resource.reset_transform();
    resource.draw_rect(0.0, 0.0, 40.0, 40.0);

    assert_eq!(pixel(&resource, 10, 10), Color::WHITE);
    assert_eq!(pixel(&resource, 25, 25), Color::BLACK);
    assert_eq!(pixel(&resource, 35, 35), Color::WHITE);

    let bounds = resource.clip_bounds().unwrap();
    assert_eq!((bounds.left(), bounds.top(), bounds.right(), bounds.bottom()), (20.0, 20.0, 30.0, 30.0));
}

#[test]
fn test_negative_clip_hides_everything() {
    let mut resource = software(20, 20);
    resource.clear();
    resource.clip_rect(0.0, 0.0, -10.0, 10.0);
    resource.draw_rect(0.0, 0.0, 20.0, 20.0);
    assert_eq!(pixel(&resource, 5, 5), Color::WHITE);
}

// ============================================================================
// IMAGE TESTS
// ============================================================================

fn solid_image(width: u32, height: u32, color: Color) -> Image {
    let rgba: Vec<u8> = (0..width * height)
        .flat_map(|_| [color.r, color.g, color.b, color.a])
        .collect();
    Image::from_rgba8(width, height, &rgba).unwrap()
}

#[test]
fn test_draw_image_at_origin() {
    let mut resource = software(20, 20);
    resource.clear();
    resource.translate(10.0, 10.0);
    resource.draw_image(&solid_image(4, 4, Color::RED));

    assert_eq!(pixel(&resource, 9, 9), Color::WHITE);
    assert_eq!(pixel(&resource, 10, 10), Color::RED);
    assert_eq!(pixel(&resource, 13, 13), Color::RED);
    assert_eq!(pixel(&resource, 14, 14), Color::WHITE);
}

#[test]
fn test_draw_image_rect_scales() {
    let mut resource = software(40, 40);
    resource.clear();
    resource.draw_image_rect(&solid_image(2, 2, Color::BLUE), 20.0, 20.0);

    assert_eq!(pixel(&resource, 10, 10), Color::BLUE);
    assert_eq!(pixel(&resource, 30, 30), Color::WHITE);

    // Non-positive sizes draw nothing
    resource.draw_image_rect(&solid_image(2, 2, Color::RED), 0.0, 20.0);
    assert_eq!(pixel(&resource, 10, 10), Color::BLUE);
}

#[test]
fn test_image_from_memory() {
    let mut encoded = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut encoded, 3, 1);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[255, 0, 0, 0, 255, 0, 0, 0, 255]).unwrap();
    }

    let image = Image::from_memory(&encoded).unwrap();
    assert_eq!(image.bounds(), (3, 1));
    assert_eq!(image.pixel(0, 0), Some(Color::RED));
    assert_eq!(image.pixel(2, 0), Some(Color::BLUE));
    assert!(matches!(Image::from_memory(b"garbage"), Err(RenderError::ImageDecode(_))));
}

#[test]
fn test_save_png_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.png");

    let mut resource = software(8, 6);
    resource.clear();
    resource.set_color(0.0, 1.0, 0.0, 1.0);
    resource.draw_rect(0.0, 0.0, 4.0, 6.0);
    let image = resource.snapshot().unwrap();

    assert_eq!(image.save_with_code(&path, 5, 100), SaveStatus::Ok);

    let decoder = png::Decoder::new(std::fs::File::open(&path).unwrap());
    let mut reader = decoder.read_info().unwrap();
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).unwrap();
    assert_eq!((info.width, info.height), (8, 6));
    assert_eq!(info.color_type, png::ColorType::Rgba);
    assert_eq!(&buf[0..4], &[0, 255, 0, 255]);
    let last = (8 * 6 - 1) * 4;
    assert_eq!(&buf[last..last + 4], &[255, 255, 255, 255]);

    let reloaded = Image::load(&path).unwrap();
    assert_eq!(reloaded.to_rgba8(), image.to_rgba8());
}

#[test]
fn test_save_status_codes() {
    let dir = tempfile::tempdir().unwrap();
    let image = solid_image(2, 2, Color::RED);

    assert_eq!(image.save_with_code(dir.path().join("a.bmp"), 3, 0).code(), 1);
    assert_eq!(image.save_with_code(dir.path().join("missing/a.png"), 5, 0).code(), 3);
    assert_eq!(image.save_with_code(dir.path().join("a.jpg"), 4, 250).code(), 0);
    assert_eq!(image.save_with_code(dir.path().join("a.webp"), 7, 0).code(), 0);
}

// ============================================================================
// SURFACE TESTS
// ============================================================================

#[test]
fn test_offscreen_round_trip() {
    let mut root = software(100, 100);
    root.clear();

    let mut offscreen = root.create_offscreen(64, 64).unwrap();
    offscreen.clear();
    offscreen.set_color(0.0, 0.0, 1.0, 1.0);
    offscreen.draw_rect(8.0, 8.0, 48.0, 48.0);
    let image = offscreen.into_image().unwrap();
    assert_eq!(image.pixel(0, 0), Some(Color::TRANSPARENT));

    root.draw_image(&image);
    for y in 0..64 {
        for x in 0..64 {
            let expected = match image.pixel(x, y).unwrap() {
                c if c.a == 0 => Color::WHITE,
                c => c,
            };
            assert_eq!(pixel(&root, x, y), expected, "pixel {},{}", x, y);
        }
    }
    assert_eq!(pixel(&root, 70, 70), Color::WHITE);
}

#[test]
fn test_draw_surface() {
    let mut source = software(10, 10);
    source.clear();
    source.set_color(1.0, 0.0, 0.0, 1.0);
    source.draw_rect(0.0, 0.0, 5.0, 5.0);

    let mut dest = software(20, 20);
    dest.clear();
    dest.translate(10.0, 10.0);
    dest.draw_surface(&source);

    assert_eq!(pixel(&dest, 12, 12), Color::RED);
    assert_eq!(pixel(&dest, 17, 17), Color::WHITE);
    assert_eq!(pixel(&dest, 5, 5), Color::WHITE);
}

#[test]
fn test_use_after_cleanup() {
    let mut resource = software(10, 10);
    resource.cleanup().unwrap();
    assert!(matches!(resource.cleanup(), Err(RenderError::UseAfterFree)));
    assert!(matches!(resource.reshape(5, 5, 1.0, 1.0), Err(RenderError::UseAfterFree)));
    assert!(matches!(resource.restore(), Err(RenderError::UseAfterFree)));
    assert!(resource.pixmap().is_none());

    // Draw calls are ignored
    resource.draw_rect(0.0, 0.0, 5.0, 5.0);
    resource.flush();
}

#[derive(Clone, Default)]
struct RecordingPresenter {
    events: Arc<Mutex<Vec<String>>>,
}

impl Presenter for RecordingPresenter {
    fn resize(&mut self, width: u32, height: u32) -> pigment_render::Result<()> {
        self.events.lock().unwrap().push(format!("resize {}x{}", width, height));
        Ok(())
    }

    fn present(&mut self, pixmap: &pigment_render::tiny_skia::Pixmap) -> pigment_render::Result<()> {
        let top_left = Color::from(pixmap.pixel(0, 0).unwrap());
        self.events
            .lock()
            .unwrap()
            .push(format!("present {}x{} {:?}", pixmap.width(), pixmap.height(), top_left == Color::WHITE));
        Ok(())
    }
}

#[test]
fn test_hardware_lifecycle() {
    let presenter = RecordingPresenter::default();
    let events = presenter.events.clone();
    let mut resource = Resource::hardware(Box::new(presenter));
    assert_eq!(resource.kind(), SurfaceKind::Hardware);

    // No pixels before the first reshape
    resource.draw_rect(0.0, 0.0, 5.0, 5.0);
    resource.flush();
    assert!(events.lock().unwrap().is_empty());

    resource.reshape(30, 20, 1.0, 1.0).unwrap();
    resource.clear();
    resource.flush();
    // Same size: no resize
    resource.reshape(30, 20, 2.0, 2.0).unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec!["resize 30x20".to_string(), "present 30x20 true".to_string()]
    );
    resource.cleanup().unwrap();
}

#[test]
fn test_clip_before_first_reshape() {
    let mut resource = Resource::hardware(Box::new(RecordingPresenter::default()));
    resource.clip_rect(0.0, 0.0, 5.0, 5.0);
    resource.reshape(20, 20, 1.0, 1.0).unwrap();
    resource.clear();
    resource.set_color(1.0, 0.0, 0.0, 1.0);
    resource.draw_rect(0.0, 0.0, 20.0, 20.0);

    assert_eq!(resource.pixel(2, 2), Some(Color::RED));
    assert_eq!(resource.pixel(10, 10), Some(Color::WHITE));
    resource.cleanup().unwrap();
}

#[test]
fn test_clip_survives_reshape() {
    let mut resource = Resource::hardware(Box::new(RecordingPresenter::default()));
    resource.reshape(10, 10, 1.0, 1.0).unwrap();
    resource.save();
    resource.clip_rect(0.0, 0.0, 5.0, 5.0);

    // Larger buffer at twice the pixel ratio
    resource.reshape(20, 20, 2.0, 2.0).unwrap();
    resource.clear();
    resource.set_color(1.0, 0.0, 0.0, 1.0);
    resource.draw_rect(0.0, 0.0, 10.0, 10.0);
    assert_eq!(resource.pixel(8, 8), Some(Color::RED));
    assert_eq!(resource.pixel(12, 12), Some(Color::WHITE));

    // Restoring drops the clip
    resource.restore().unwrap();
    resource.draw_rect(0.0, 0.0, 10.0, 10.0);
    assert_eq!(resource.pixel(12, 12), Some(Color::RED));
    resource.cleanup().unwrap();
}

// ============================================================================
// TEXT TESTS
// ============================================================================

#[test]
fn test_render_line_draws_ink() {
    let Some((mut resource, font)) = text_resource(200, 100) else { return };
    resource.clear();
    resource.render_line(&font, "Hi", 10.0, 40.0);
    resource.flush();

    let inked = (10..60).any(|x| (20..40).any(|y| pixel(&resource, x, y) != Color::WHITE));
    assert!(inked);

    let bounds = font.text_bounds("Hi");
    assert!(bounds.width > 0.0);
    assert!((bounds.height - font.line_height()).abs() < 1e-3);
}

#[test]
fn test_next_line_and_clear() {
    let Some((mut resource, font)) = text_resource(50, 50) else { return };
    resource.next_line(&font);
    resource.next_line(&font);
    assert!((resource.text_cursor() - 2.0 * font.line_height()).abs() < 1e-3);
    resource.clear();
    assert_eq!(resource.text_cursor(), 0.0);
}

#[test]
fn test_render_selection() {
    let Some((mut resource, font)) = text_resource(200, 40) else { return };
    resource.clear();
    let before = resource.pixmap().unwrap().data().to_vec();

    resource.render_selection(&font, "hello", 2, 2).unwrap();
    assert_eq!(resource.pixmap().unwrap().data(), &before[..]);

    assert!(matches!(
        resource.render_selection(&font, "hello", 3, 1),
        Err(RenderError::InvalidRange { .. })
    ));
    assert!(matches!(
        resource.render_selection(&font, "hello", 0, 6),
        Err(RenderError::InvalidRange { .. })
    ));

    resource.render_selection(&font, "hello", 1, 3).unwrap();
    let positions = font.caret_positions("hello");
    let mid = ((positions[1] + positions[3]) / 2.0) as u32;
    let y = (font.line_height() / 2.0) as u32;
    assert_eq!(pixel(&resource, mid, y), Color::BLACK);
}

#[test]
fn test_render_cursor_at_end() {
    let Some((mut resource, font)) = text_resource(200, 40) else { return };
    resource.clear();
    resource.render_cursor(&font, "hi", 99);

    let start = font.caret_positions("hi")[2];
    let x = (start + font.char_advance('8') / 2.0) as u32;
    let y = (font.line_height() / 2.0) as u32;
    assert_eq!(pixel(&resource, x, y), Color::BLACK);
    assert_eq!(pixel(&resource, 1, y), Color::WHITE);
}

#[test]
fn test_index_for_advance() {
    let Some((_, font)) = text_resource(10, 10) else { return };
    let text = "pigment";
    for k in 0..=text.len() {
        assert_eq!(font.index_for_position(text, font.advance_x(&text[..k])), k);
    }
}
