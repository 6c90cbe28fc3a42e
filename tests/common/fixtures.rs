use tempfile::NamedTempFile;
use yoloscope::{
    BoundingBox, ClassNameTable, DetectionReport, RawDetection, TimingBreakdown, aggregate,
};

/// Class table used across the report tests, ids 0..=3.
pub fn small_table() -> ClassNameTable {
    ClassNameTable::from_names(["dog", "cat", "bird", "traffic light"])
}

/// One detection of the given class. Box and confidence are plausible
/// but arbitrary; the report only reads the class id.
pub fn make_detection(class_id: u32) -> RawDetection {
    RawDetection {
        class_id,
        confidence: 0.9,
        bbox: BoundingBox {
            x1: 10.0,
            y1: 20.0,
            x2: 110.0,
            y2: 220.0,
        },
    }
}

/// Detections for a list of class ids, in order.
pub fn make_detections(class_ids: &[u32]) -> Vec<RawDetection> {
    class_ids.iter().map(|&id| make_detection(id)).collect()
}

pub fn timing(preprocess_ms: f64, inference_ms: f64, postprocess_ms: f64) -> TimingBreakdown {
    TimingBreakdown {
        preprocess_ms,
        inference_ms,
        postprocess_ms,
    }
}

/// 640x480 report over `small_table` labels with fixed timings.
pub fn sample_report(class_ids: &[u32]) -> DetectionReport {
    aggregate(
        &make_detections(class_ids),
        &small_table(),
        640,
        480,
        timing(1.2, 12.3, 2.4),
    )
    .expect("sample report should aggregate")
}

/// Writes a class-names file and returns the temp handle. Keep it alive
/// while the path is in use.
pub fn write_class_file(contents: &str) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".txt")
        .tempfile()
        .expect("Failed to create temp class file");
    std::fs::write(file.path(), contents).expect("Failed to write class file");
    file
}
