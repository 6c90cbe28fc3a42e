use std::collections::HashMap;

use thiserror::Error;

use crate::models::{
    ClassCount, ClassNameTable, DetectionReport, DisplayRow, InferenceShape, RawDetection,
    RowColor, RowColumn, TimingBreakdown,
};

/// Errors produced while turning raw detector output into a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A detection carried a class id the name table has no entry for.
    #[error("class id {class_id} has no entry in the class name table")]
    UnknownClassId { class_id: u32 },
}

/// Build the immutable [`DetectionReport`] for one detection run.
///
/// Pure and deterministic: the same detections, table, dimensions and
/// timing always produce the same report.
pub fn aggregate(
    detections: &[RawDetection],
    names: &ClassNameTable,
    image_height: u32,
    image_width: u32,
    timing: TimingBreakdown,
) -> Result<DetectionReport, ReportError> {
    let counts = count_by_first_occurrence(detections, names)?;
    let summary = build_summary(image_height, image_width, &counts, timing.inference_ms);

    Ok(DetectionReport {
        image_height,
        image_width,
        counts,
        timing,
        input_shape: InferenceShape::of_image(image_height, image_width),
        summary,
    })
}

/// Fold detections into (label, count) pairs ordered by the first
/// occurrence of each label.
///
/// The order is held by the `Vec` itself; the side map only provides the
/// label -> slot lookup, so no container iteration order is relied on.
fn count_by_first_occurrence(
    detections: &[RawDetection],
    names: &ClassNameTable,
) -> Result<Vec<ClassCount>, ReportError> {
    let mut counts: Vec<ClassCount> = Vec::new();
    let mut slot_by_label: HashMap<String, usize> = HashMap::new();

    for detection in detections {
        let label = names.get(detection.class_id).ok_or(ReportError::UnknownClassId {
            class_id: detection.class_id,
        })?;

        match slot_by_label.get(label) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                slot_by_label.insert(label.to_string(), counts.len());
                counts.push(ClassCount {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }

    Ok(counts)
}

/// One-line recap in the detector's console style, e.g.
/// `0: 480x640 2 dog, 1 cat, 12.3ms`.
///
/// With no detections the object list and its separator disappear
/// entirely: `0: 480x640, 12.3ms`.
fn build_summary(
    image_height: u32,
    image_width: u32,
    counts: &[ClassCount],
    inference_ms: f64,
) -> String {
    let objects = counts
        .iter()
        .map(|entry| format!("{} {}", entry.count, entry.label))
        .collect::<Vec<_>>()
        .join(", ");

    if objects.is_empty() {
        format!("0: {}x{}, {:.1}ms", image_height, image_width, inference_ms)
    } else {
        format!(
            "0: {}x{} {}, {:.1}ms",
            image_height, image_width, objects, inference_ms
        )
    }
}

/// Render a report into the flat row list the shell displays.
///
/// The sequence is rebuilt from scratch on every call; callers replace
/// their previous rows with it rather than patching in place.
pub fn render(report: &DetectionReport) -> Vec<DisplayRow> {
    let mut rows = RowList::new();

    rows.header("Image Size", RowColor::Cyan);
    rows.line(format!(
        "{} height x {} width",
        report.image_height, report.image_width
    ));

    rows.header("Detected Objects", RowColor::Green);
    if report.counts.is_empty() {
        rows.line("No objects detected");
    } else {
        for entry in &report.counts {
            rows.pair(
                format!("{}:", capitalize(&entry.label)),
                entry.count.to_string(),
                RowColor::MintPastel,
            );
        }
    }

    rows.header("Detection Time", RowColor::Amber);
    rows.pair(
        "Preprocess:".to_string(),
        format_ms(report.timing.preprocess_ms),
        RowColor::CreamPastel,
    );
    rows.pair(
        "Inference:".to_string(),
        format_ms(report.timing.inference_ms),
        RowColor::CreamPastel,
    );
    rows.pair(
        "Postprocess:".to_string(),
        format_ms(report.timing.postprocess_ms),
        RowColor::CreamPastel,
    );

    rows.header("Inference Shape", RowColor::Indigo);
    rows.line(report.input_shape.to_string());

    rows.header("YOLO Summary", RowColor::Purple);
    rows.line(report.summary.clone());

    rows.into_rows()
}

/// Builder keeping the row index in one place, so paired cells share an
/// index and full-width rows advance it by one.
struct RowList {
    rows: Vec<DisplayRow>,
    next_row: usize,
}

impl RowList {
    fn new() -> Self {
        Self {
            rows: Vec::new(),
            next_row: 0,
        }
    }

    /// Bold full-width row with a section accent background.
    fn header(&mut self, text: &str, color: RowColor) {
        self.push_full(text.to_string(), color, true);
    }

    /// Plain full-width content row on the neutral background.
    fn line(&mut self, text: impl Into<String>) {
        self.push_full(text.into(), RowColor::Slate, false);
    }

    fn push_full(&mut self, text: String, color: RowColor, bold: bool) {
        self.rows.push(DisplayRow {
            row: self.next_row,
            column: RowColumn::Full,
            text,
            color,
            bold,
        });
        self.next_row += 1;
    }

    /// Label/value pair occupying one visual row.
    fn pair(&mut self, label: String, value: String, label_color: RowColor) {
        self.rows.push(DisplayRow {
            row: self.next_row,
            column: RowColumn::Label,
            text: label,
            color: label_color,
            bold: false,
        });
        self.rows.push(DisplayRow {
            row: self.next_row,
            column: RowColumn::Value,
            text: value,
            color: RowColor::PeachPastel,
            bold: false,
        });
        self.next_row += 1;
    }

    fn into_rows(self) -> Vec<DisplayRow> {
        self.rows
    }
}

/// Table cells show a space before the unit, unlike the summary line.
fn format_ms(value: f64) -> String {
    format!("{:.1} ms", value)
}

/// First character uppercased, the rest lowercased, matching how the
/// labels appear in the report ("traffic light" -> "Traffic light").
fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
