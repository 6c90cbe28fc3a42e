mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from yoloscope for tests
pub use yoloscope::{
    BoundingBox, ClassCount, ClassNameTable, DetectionReport, DisplayRow, InferenceShape,
    RawDetection, ReportError, RowColor, RowColumn, TimingBreakdown, aggregate, render,
};
