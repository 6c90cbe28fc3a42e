use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Axis-aligned box in original-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection-over-union with another box, 0.0 when disjoint.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let iw = (ix2 - ix1).max(0.0);
        let ih = (iy2 - iy1).max(0.0);
        let intersection = iw * ih;

        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            return 0.0;
        }
        intersection / union
    }

    pub fn clamped(&self, image_width: f32, image_height: f32) -> BoundingBox {
        BoundingBox {
            x1: self.x1.clamp(0.0, image_width),
            y1: self.y1.clamp(0.0, image_height),
            x2: self.x2.clamp(0.0, image_width),
            y2: self.y2.clamp(0.0, image_height),
        }
    }
}

/// One object instance found by the detector.
///
/// The report only consumes `class_id`; confidence and box are used when
/// drawing the annotated image.
#[derive(Debug, Clone)]
pub struct RawDetection {
    pub class_id: u32,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// Everything the detector hands back for one image.
#[derive(Debug, Clone)]
pub struct DetectorOutput {
    pub detections: Vec<RawDetection>,
    pub timing: TimingBreakdown,
}

/// Class id to display name mapping, owned by the detector.
#[derive(Debug, Clone, Default)]
pub struct ClassNameTable {
    names: HashMap<u32, String>,
}

impl ClassNameTable {
    /// Build a table from names in id order (index = class id).
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names
            .into_iter()
            .enumerate()
            .map(|(id, name)| (id as u32, name.into()))
            .collect();
        Self { names }
    }

    pub fn get(&self, class_id: u32) -> Option<&str> {
        self.names.get(&class_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Aggregated (label, count) pair, ordered by first occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassCount {
    pub label: String,
    pub count: usize,
}

/// Per-stage durations in milliseconds for one detection run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingBreakdown {
    pub preprocess_ms: f64,
    pub inference_ms: f64,
    pub postprocess_ms: f64,
}

impl TimingBreakdown {
    pub fn total_ms(&self) -> f64 {
        self.preprocess_ms + self.inference_ms + self.postprocess_ms
    }
}

/// Reported model input shape, always (1, 3, height, width) of the
/// original image rather than the letterboxed tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InferenceShape {
    pub batch: u32,
    pub channels: u32,
    pub height: u32,
    pub width: u32,
}

impl InferenceShape {
    pub fn of_image(height: u32, width: u32) -> Self {
        Self {
            batch: 1,
            channels: 3,
            height,
            width,
        }
    }
}

impl fmt::Display for InferenceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.batch, self.channels, self.height, self.width
        )
    }
}

/// The full structured result of one detection run. Built once by the
/// aggregator and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    pub image_height: u32,
    pub image_width: u32,
    pub counts: Vec<ClassCount>,
    pub timing: TimingBreakdown,
    pub input_shape: InferenceShape,
    pub summary: String,
}

/// Grid position of a display row.
///
/// `Label` and `Value` cells come in pairs sharing one row index; `Full`
/// rows span the panel on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowColumn {
    Full = 0,
    Label = 1,
    Value = 2,
}

/// Background tags for report rows. The renderer deals in tags only; the
/// shell maps them to actual widget colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowColor {
    /// Neutral dark background for plain content rows.
    Slate,
    /// Image Size header.
    Cyan,
    /// Detected Objects header.
    Green,
    /// Detection Time header.
    Amber,
    /// Inference Shape header.
    Indigo,
    /// YOLO Summary header.
    Purple,
    /// Object-count label cells.
    MintPastel,
    /// Timing label cells.
    CreamPastel,
    /// Value cells of both pairs.
    PeachPastel,
}

impl RowColor {
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            RowColor::Slate => (0x21, 0x22, 0x2c),
            RowColor::Cyan => (0x00, 0xbc, 0xd4),
            RowColor::Green => (0x4c, 0xaf, 0x50),
            RowColor::Amber => (0xff, 0xc1, 0x07),
            RowColor::Indigo => (0x3f, 0x51, 0xb5),
            RowColor::Purple => (0x9c, 0x27, 0xb0),
            RowColor::MintPastel => (0xe8, 0xf5, 0xe9),
            RowColor::CreamPastel => (0xff, 0xf8, 0xe1),
            RowColor::PeachPastel => (0xff, 0xf3, 0xe0),
        }
    }

    /// Light backgrounds take dark text, everything else takes white.
    pub fn is_light(&self) -> bool {
        matches!(
            self,
            RowColor::MintPastel | RowColor::CreamPastel | RowColor::PeachPastel
        )
    }
}

/// One renderable line or cell of the report panel.
///
/// A fresh sequence is produced for every report; the previous sequence is
/// dropped wholesale, never patched.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub row: usize,
    pub column: RowColumn,
    pub text: String,
    pub color: RowColor,
    pub bold: bool,
}
