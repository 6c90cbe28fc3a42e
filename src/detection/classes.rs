use std::fs;
use std::path::Path;

use crate::detection::DetectionError;
use crate::models::ClassNameTable;

/// COCO class names (80 classes), the set YOLOv8 detection weights ship
/// with. Index = class id.
pub const COCO_CLASSES: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// The default class table for COCO-trained weights.
pub fn coco_table() -> ClassNameTable {
    ClassNameTable::from_names(COCO_CLASSES)
}

/// Load a class table from a newline-separated names file, one name per
/// line in class-id order. Blank lines and surrounding whitespace are
/// ignored.
pub fn load_class_file(path: &Path) -> Result<ClassNameTable, DetectionError> {
    let contents = fs::read_to_string(path).map_err(|source| DetectionError::ClassFile {
        path: path.to_path_buf(),
        source,
    })?;

    let names: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    if names.is_empty() {
        return Err(DetectionError::EmptyClassFile {
            path: path.to_path_buf(),
        });
    }

    Ok(ClassNameTable::from_names(names))
}
