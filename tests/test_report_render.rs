//! Integration tests for report rendering.
//!
//! Tests cover:
//! - Section order, header styling, and the palette contract
//! - Contiguous row indices with label/value pairs sharing one index
//! - The "No objects detected" fallback row
//! - One-decimal timing values and label capitalization
//! - Determinism of re-rendering

mod common;

use common::*;

/// Rows of one section: everything after its header up to the next
/// header. Headers are the only bold rows.
fn section<'a>(rows: &'a [DisplayRow], header: &str) -> &'a [DisplayRow] {
    let start = rows
        .iter()
        .position(|row| row.text == header)
        .expect("section header present")
        + 1;
    let end = rows[start..]
        .iter()
        .position(|row| row.bold)
        .map(|offset| start + offset)
        .unwrap_or(rows.len());
    &rows[start..end]
}

#[test]
fn test_sections_appear_in_fixed_order() -> anyhow::Result<()> {
    let rows = render(&sample_report(&[0, 1]));

    let headers: Vec<&str> = rows
        .iter()
        .filter(|row| row.bold)
        .map(|row| row.text.as_str())
        .collect();
    assert_eq!(
        headers,
        [
            "Image Size",
            "Detected Objects",
            "Detection Time",
            "Inference Shape",
            "YOLO Summary",
        ]
    );

    let header_colors: Vec<RowColor> = rows
        .iter()
        .filter(|row| row.bold)
        .map(|row| row.color)
        .collect();
    assert_eq!(
        header_colors,
        [
            RowColor::Cyan,
            RowColor::Green,
            RowColor::Amber,
            RowColor::Indigo,
            RowColor::Purple,
        ]
    );

    Ok(())
}

#[test]
fn test_row_indices_contiguous_and_pairs_share_index() -> anyhow::Result<()> {
    let rows = render(&sample_report(&[0, 1, 0]));

    let mut expected = 0;
    let mut i = 0;
    while i < rows.len() {
        match rows[i].column {
            RowColumn::Full => {
                assert_eq!(rows[i].row, expected);
                i += 1;
            }
            RowColumn::Label => {
                assert_eq!(rows[i].row, expected);
                let value = &rows[i + 1];
                assert_eq!(value.column, RowColumn::Value);
                assert_eq!(value.row, expected, "label and value share the row index");
                i += 2;
            }
            RowColumn::Value => panic!("value cell without a preceding label"),
        }
        expected += 1;
    }

    Ok(())
}

#[test]
fn test_empty_counts_render_single_fallback_row() -> anyhow::Result<()> {
    let rows = render(&sample_report(&[]));

    let objects = section(&rows, "Detected Objects");
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].text, "No objects detected");
    assert_eq!(objects[0].column, RowColumn::Full);
    assert_eq!(objects[0].color, RowColor::Slate);

    Ok(())
}

#[test]
fn test_timing_values_use_one_decimal() -> anyhow::Result<()> {
    let report = aggregate(&[], &small_table(), 640, 480, timing(5.0, 5.449, 0.05))?;
    let rows = render(&report);

    let values: Vec<&str> = section(&rows, "Detection Time")
        .iter()
        .filter(|row| row.column == RowColumn::Value)
        .map(|row| row.text.as_str())
        .collect();
    assert_eq!(values, ["5.0 ms", "5.4 ms", "0.1 ms"]);

    let labels: Vec<&str> = section(&rows, "Detection Time")
        .iter()
        .filter(|row| row.column == RowColumn::Label)
        .map(|row| row.text.as_str())
        .collect();
    assert_eq!(labels, ["Preprocess:", "Inference:", "Postprocess:"]);

    Ok(())
}

#[test]
fn test_labels_capitalize_first_letter_only() -> anyhow::Result<()> {
    let table = ClassNameTable::from_names(["traffic light", "TV remote"]);
    let report = aggregate(
        &make_detections(&[0, 1]),
        &table,
        640,
        480,
        timing(1.0, 2.0, 3.0),
    )?;
    let rows = render(&report);

    let labels: Vec<&str> = section(&rows, "Detected Objects")
        .iter()
        .filter(|row| row.column == RowColumn::Label)
        .map(|row| row.text.as_str())
        .collect();
    assert_eq!(labels, ["Traffic light:", "Tv remote:"]);

    Ok(())
}

#[test]
fn test_cell_backgrounds_follow_the_palette() -> anyhow::Result<()> {
    let rows = render(&sample_report(&[0]));

    let objects = section(&rows, "Detected Objects");
    assert_eq!(objects[0].color, RowColor::MintPastel);
    assert_eq!(objects[1].color, RowColor::PeachPastel);

    let times = section(&rows, "Detection Time");
    for pair in times.chunks(2) {
        assert_eq!(pair[0].color, RowColor::CreamPastel);
        assert_eq!(pair[1].color, RowColor::PeachPastel);
    }

    // Light backgrounds are exactly the three pastels.
    for row in &rows {
        let pastel = matches!(
            row.color,
            RowColor::MintPastel | RowColor::CreamPastel | RowColor::PeachPastel
        );
        assert_eq!(row.color.is_light(), pastel);
    }

    Ok(())
}

#[test]
fn test_rendering_is_deterministic() -> anyhow::Result<()> {
    let report = sample_report(&[0, 2, 0]);
    assert_eq!(render(&report), render(&report));

    Ok(())
}

#[test]
fn test_image_size_shape_and_summary_rows() -> anyhow::Result<()> {
    let report = sample_report(&[0]);
    let rows = render(&report);

    assert_eq!(section(&rows, "Image Size")[0].text, "640 height x 480 width");
    assert_eq!(section(&rows, "Inference Shape")[0].text, "(1, 3, 640, 480)");
    assert_eq!(
        rows.last().map(|row| row.text.as_str()),
        Some(report.summary.as_str())
    );

    Ok(())
}
