//! Integration tests for detection support pieces.
//!
//! Tests cover:
//! - The built-in COCO table and class-file overrides
//! - Per-class annotation colors and box drawing
//! - The fixed display resize
//! - Model loading failure surfacing

mod common;

use std::path::Path;

use image::{DynamicImage, RgbImage};
use yoloscope::YoloDetector;
use yoloscope::detection::DetectionError;
use yoloscope::detection::annotate::{DISPLAY_SIZE, annotate, class_color, to_display};
use yoloscope::detection::classes::{COCO_CLASSES, coco_table, load_class_file};

use common::*;

#[test]
fn test_coco_table_has_80_entries() -> anyhow::Result<()> {
    let table = coco_table();

    assert_eq!(table.len(), COCO_CLASSES.len());
    assert_eq!(table.get(0), Some("person"));
    assert_eq!(table.get(9), Some("traffic light"));
    assert_eq!(table.get(79), Some("toothbrush"));
    assert_eq!(table.get(80), None);

    Ok(())
}

#[test]
fn test_class_file_overrides_table() -> anyhow::Result<()> {
    let file = write_class_file("alpha\nbeta\n\n  gamma  \n");
    let table = load_class_file(file.path())?;

    assert_eq!(table.len(), 3);
    assert_eq!(table.get(0), Some("alpha"));
    assert_eq!(table.get(2), Some("gamma"));

    Ok(())
}

#[test]
fn test_missing_class_file_errors() -> anyhow::Result<()> {
    let result = load_class_file(Path::new("/does/not/exist/names.txt"));
    assert!(matches!(result, Err(DetectionError::ClassFile { .. })));

    Ok(())
}

#[test]
fn test_empty_class_file_errors() -> anyhow::Result<()> {
    let file = write_class_file("\n   \n");
    let result = load_class_file(file.path());
    assert!(matches!(result, Err(DetectionError::EmptyClassFile { .. })));

    Ok(())
}

#[test]
fn test_class_colors_are_stable_and_distinct() -> anyhow::Result<()> {
    assert_eq!(class_color(3), class_color(3));
    assert_ne!(class_color(0), class_color(1));
    assert_ne!(class_color(1), class_color(2));

    Ok(())
}

#[test]
fn test_annotate_draws_box_in_class_color() -> anyhow::Result<()> {
    let image = DynamicImage::ImageRgb8(RgbImage::new(50, 50));
    let detection = RawDetection {
        class_id: 0,
        confidence: 0.9,
        bbox: BoundingBox {
            x1: 10.0,
            y1: 10.0,
            x2: 30.0,
            y2: 30.0,
        },
    };

    let annotated = annotate(&image, &[detection]);
    let expected = class_color(0);

    assert_eq!(annotated.get_pixel(10, 10).0, expected);
    // Second rectangle sits one pixel inside the first.
    assert_eq!(annotated.get_pixel(11, 11).0, expected);
    assert_eq!(annotated.get_pixel(5, 5).0, [0, 0, 0]);

    Ok(())
}

#[test]
fn test_display_image_is_fixed_square() -> anyhow::Result<()> {
    let display = to_display(&RgbImage::new(100, 60));
    assert_eq!(
        (display.width(), display.height()),
        (DISPLAY_SIZE, DISPLAY_SIZE)
    );

    Ok(())
}

#[test]
fn test_missing_model_file_errors() -> anyhow::Result<()> {
    let result = YoloDetector::from_file(Path::new("nonexistent.onnx"));
    assert!(matches!(result, Err(DetectionError::ModelLoad { .. })));

    Ok(())
}
