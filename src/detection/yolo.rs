use std::path::Path;
use std::time::Instant;

use image::DynamicImage;
use log::debug;
use ndarray::{Array2, Array3, Array4, Axis};
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::TensorRef;

use crate::detection::{DetectionError, classes};
use crate::models::{BoundingBox, ClassNameTable, DetectorOutput, RawDetection, TimingBreakdown};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.25;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;

/// Square model input edge, the YOLOv8 export default.
const INPUT_SIZE: u32 = 640;
/// Letterbox padding fill, the YOLO gray.
const PAD_FILL: f32 = 114.0 / 255.0;
/// Box coordinates preceding the class scores in each output row.
const BOX_FEATURES: usize = 4;

/// YOLOv8 detector wrapping an ONNX Runtime session.
///
/// `detect` runs the full preprocess / inference / postprocess pipeline
/// and times each stage for the report.
pub struct YoloDetector {
    session: Session,
    input_name: String,
    output_name: String,
    names: ClassNameTable,
    confidence_threshold: f32,
    iou_threshold: f32,
}

/// Maps letterboxed tensor coordinates back to original pixels.
#[derive(Debug, Clone, Copy)]
struct LetterboxParams {
    scale: f32,
    pad_x: f32,
    pad_y: f32,
}

impl YoloDetector {
    /// Load a detector from an ONNX file with COCO names and default
    /// thresholds.
    pub fn from_file(model_path: &Path) -> Result<Self, DetectionError> {
        let session = build_session(model_path).map_err(|source| DetectionError::ModelLoad {
            path: model_path.to_path_buf(),
            source,
        })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .unwrap_or_else(|| "output0".to_string());

        Ok(Self {
            session,
            input_name,
            output_name,
            names: classes::coco_table(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
        })
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_iou_threshold(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    /// Replace the class table, e.g. for weights trained on a custom set.
    pub fn with_class_table(mut self, names: ClassNameTable) -> Self {
        self.names = names;
        self
    }

    pub fn names(&self) -> &ClassNameTable {
        &self.names
    }

    /// Run detection on a decoded image.
    pub fn detect(&mut self, image: &DynamicImage) -> Result<DetectorOutput, DetectionError> {
        let preprocess_start = Instant::now();
        let (input, params) = letterbox(image, INPUT_SIZE);
        let preprocess_ms = preprocess_start.elapsed().as_secs_f64() * 1000.0;

        let inference_start = Instant::now();
        let (shape, data) = self.run_model(&input)?;
        let inference_ms = inference_start.elapsed().as_secs_f64() * 1000.0;

        let postprocess_start = Instant::now();
        let output = normalize_output(shape, data)?;
        let detections = self.decode_output(&output, params, image.width(), image.height());
        let postprocess_ms = postprocess_start.elapsed().as_secs_f64() * 1000.0;

        debug!(
            "{} detections in {:.1} ms (pre {:.1}, inf {:.1}, post {:.1})",
            detections.len(),
            preprocess_ms + inference_ms + postprocess_ms,
            preprocess_ms,
            inference_ms,
            postprocess_ms
        );

        Ok(DetectorOutput {
            detections,
            timing: TimingBreakdown {
                preprocess_ms,
                inference_ms,
                postprocess_ms,
            },
        })
    }

    /// Feed the tensor through the session and pull the raw output.
    fn run_model(&mut self, input: &Array4<f32>) -> Result<(Vec<usize>, Vec<f32>), DetectionError> {
        let input_contiguous = input.as_standard_layout();
        let input_tensor = TensorRef::from_array_view(&input_contiguous)?;

        let inputs = ort::inputs![&self.input_name => input_tensor];
        let outputs = self.session.run(inputs)?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| DetectionError::MissingOutput {
                name: self.output_name.clone(),
            })?;

        let (shape, data) = output.try_extract_tensor::<f32>()?;
        let shape: Vec<usize> = shape.iter().map(|&dim| dim as usize).collect();

        Ok((shape, data.to_vec()))
    }

    /// Turn normalized model output into image-space detections.
    fn decode_output(
        &self,
        output: &Array2<f32>,
        params: LetterboxParams,
        image_width: u32,
        image_height: u32,
    ) -> Vec<RawDetection> {
        let mut candidates = Vec::new();

        for row in output.rows() {
            // Best class score for this anchor.
            let (best_class, best_score) = row.iter().skip(BOX_FEATURES).enumerate().fold(
                (0usize, f32::NEG_INFINITY),
                |(best_idx, best), (idx, &score)| {
                    if score > best { (idx, score) } else { (best_idx, best) }
                },
            );

            if !best_score.is_finite() || best_score < self.confidence_threshold {
                continue;
            }

            let cx = row[0];
            let cy = row[1];
            let w = row[2];
            let h = row[3];
            if w <= 0.0 || h <= 0.0 || !cx.is_finite() || !cy.is_finite() {
                continue;
            }

            // Center/size to corners, then undo the letterbox.
            let bbox = BoundingBox {
                x1: ((cx - w / 2.0) - params.pad_x) / params.scale,
                y1: ((cy - h / 2.0) - params.pad_y) / params.scale,
                x2: ((cx + w / 2.0) - params.pad_x) / params.scale,
                y2: ((cy + h / 2.0) - params.pad_y) / params.scale,
            }
            .clamped(image_width as f32, image_height as f32);

            if bbox.width() < 1.0 || bbox.height() < 1.0 {
                continue;
            }

            candidates.push(RawDetection {
                class_id: best_class as u32,
                confidence: best_score,
                bbox,
            });
        }

        candidates.sort_unstable_by(|a, b| b.confidence.total_cmp(&a.confidence));
        non_max_suppression(candidates, self.iou_threshold)
    }
}

fn build_session(model_path: &Path) -> Result<Session, ort::Error> {
    Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(4)?
        .commit_from_file(model_path)
}

/// Letterbox the image into the square model input: aspect-preserving
/// resize, centered on a gray canvas, channels-first, values in 0..1.
fn letterbox(image: &DynamicImage, input_size: u32) -> (Array4<f32>, LetterboxParams) {
    let orig_w = image.width().max(1);
    let orig_h = image.height().max(1);

    let scale = (input_size as f32 / orig_w as f32).min(input_size as f32 / orig_h as f32);
    let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, input_size);
    let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, input_size);

    let resized = image
        .resize_exact(new_w, new_h, image::imageops::FilterType::Triangle)
        .to_rgb8();

    let pad_x = (input_size - new_w) as f32 / 2.0;
    let pad_y = (input_size - new_h) as f32 / 2.0;
    let offset_x = pad_x.floor() as usize;
    let offset_y = pad_y.floor() as usize;

    let mut canvas =
        Array3::<f32>::from_elem((3, input_size as usize, input_size as usize), PAD_FILL);

    for (x, y, pixel) in resized.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        canvas[[0, offset_y + y as usize, offset_x + x as usize]] = r as f32 / 255.0;
        canvas[[1, offset_y + y as usize, offset_x + x as usize]] = g as f32 / 255.0;
        canvas[[2, offset_y + y as usize, offset_x + x as usize]] = b as f32 / 255.0;
    }

    (
        canvas.insert_axis(Axis(0)),
        LetterboxParams {
            scale,
            pad_x,
            pad_y,
        },
    )
}

/// Bring the raw output into [anchors, features] orientation.
///
/// YOLOv8 exports ship [1, 84, 8400]; pre-transposed [1, 8400, 84]
/// variants are accepted too. The smaller axis is the feature axis.
fn normalize_output(shape: Vec<usize>, data: Vec<f32>) -> Result<Array2<f32>, DetectionError> {
    if shape.len() != 3 || shape[0] != 1 {
        return Err(DetectionError::OutputShape { shape });
    }

    let (features, anchors, transposed) = if shape[1] < shape[2] {
        (shape[1], shape[2], true)
    } else {
        (shape[2], shape[1], false)
    };

    if features <= BOX_FEATURES {
        return Err(DetectionError::OutputShape { shape });
    }

    let output = if transposed {
        Array2::from_shape_vec((features, anchors), data)
            .map_err(|_| DetectionError::OutputShape {
                shape: shape.clone(),
            })?
            .t()
            .to_owned()
    } else {
        Array2::from_shape_vec((anchors, features), data).map_err(|_| {
            DetectionError::OutputShape {
                shape: shape.clone(),
            }
        })?
    };

    Ok(output)
}

/// Greedy non-maximum suppression over confidence-sorted candidates.
/// A box only suppresses others of the same class.
fn non_max_suppression(candidates: Vec<RawDetection>, iou_threshold: f32) -> Vec<RawDetection> {
    let mut kept: Vec<RawDetection> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let overlaps = kept.iter().any(|existing| {
            existing.class_id == candidate.class_id
                && existing.bbox.iou(&candidate.bbox) > iou_threshold
        });
        if !overlaps {
            kept.push(candidate);
        }
    }

    kept
}
