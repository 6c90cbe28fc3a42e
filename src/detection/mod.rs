pub mod annotate;
pub mod classes;
pub mod yolo;

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub use yolo::YoloDetector;

/// Upper bound on one detection run. The shell abandons the run and
/// reports a failure when it expires; the model keeps the thread until
/// the blocking call returns, but its result is discarded.
pub const INFERENCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from model loading and the detection pipeline.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("failed to load model from {}: {source}", .path.display())]
    ModelLoad {
        path: PathBuf,
        source: ort::Error,
    },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("inference failed: {0}")]
    Inference(#[from] ort::Error),

    #[error("unexpected model output shape {shape:?}")]
    OutputShape { shape: Vec<usize> },

    #[error("model output {name:?} missing from session results")]
    MissingOutput { name: String },

    #[error("failed to read class file {}: {source}", .path.display())]
    ClassFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("class file {} contains no names", .path.display())]
    EmptyClassFile { path: PathBuf },
}
