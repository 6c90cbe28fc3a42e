pub mod detection;
pub mod models;
pub mod report;

pub use detection::{DetectionError, YoloDetector};
pub use models::{
    BoundingBox, ClassCount, ClassNameTable, DetectionReport, DetectorOutput, DisplayRow,
    InferenceShape, RawDetection, RowColor, RowColumn, TimingBreakdown,
};
pub use report::{ReportError, aggregate, render};

#[cfg(feature = "gui")]
pub mod gui;
