use image::{DynamicImage, Rgb, RgbImage, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::models::RawDetection;

/// Edge of the square area the shell displays the image in.
pub const DISPLAY_SIZE: u32 = 450;

/// Draw detection boxes onto a copy of the image.
///
/// Each box is a hollow rectangle two pixels thick in its class color.
/// Text stays in the report panel, not on the image.
pub fn annotate(image: &DynamicImage, detections: &[RawDetection]) -> RgbImage {
    let mut canvas = image.to_rgb8();

    for detection in detections {
        let color = Rgb(class_color(detection.class_id));
        let bbox = &detection.bbox;

        let x = bbox.x1.max(0.0) as i32;
        let y = bbox.y1.max(0.0) as i32;
        let width = bbox.width().min(canvas.width() as f32 - bbox.x1) as u32;
        let height = bbox.height().min(canvas.height() as f32 - bbox.y1) as u32;

        if width == 0 || height == 0 {
            continue;
        }

        let rect = Rect::at(x, y).of_size(width, height);
        draw_hollow_rect_mut(&mut canvas, rect, color);

        // Second rectangle just inside the first for visibility.
        if width > 2 && height > 2 {
            let inner = Rect::at(x + 1, y + 1).of_size(width - 2, height - 2);
            draw_hollow_rect_mut(&mut canvas, inner, color);
        }
    }

    canvas
}

/// Stretch the annotated image into the square display area. Aspect is
/// not preserved; the panel is a fixed square.
pub fn to_display(image: &RgbImage) -> RgbaImage {
    let resized = image::imageops::resize(
        image,
        DISPLAY_SIZE,
        DISPLAY_SIZE,
        image::imageops::FilterType::Triangle,
    );
    DynamicImage::ImageRgb8(resized).to_rgba8()
}

/// Deterministic per-class color. Golden-angle hue stepping spreads
/// neighboring ids across the wheel.
pub fn class_color(class_id: u32) -> [u8; 3] {
    let hue = (class_id * 137) % 360;
    hsv_to_rgb(hue as f32, 0.7, 0.9)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [u8; 3] {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    [
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    ]
}
