use std::path::{Path, PathBuf};

use clap::Parser;
use image::ImageReader;
use log::info;

use yoloscope::detection::classes;
use yoloscope::detection::yolo::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_IOU_THRESHOLD};
use yoloscope::{RowColumn, YoloDetector, report};

#[derive(Parser)]
#[command(name = "yoloscope")]
#[command(about = "Detect objects in images with a YOLOv8 ONNX model")]
struct Cli {
    /// Image to analyze without opening a window; starts the viewer when omitted
    #[arg(value_name = "IMAGE")]
    image_path: Option<PathBuf>,

    /// Path to the ONNX model weights
    #[arg(long, value_name = "PATH", default_value = "yolov8n.onnx")]
    model: PathBuf,

    /// Newline-separated class names replacing the built-in COCO list
    #[arg(long, value_name = "PATH")]
    classes: Option<PathBuf>,

    /// Minimum confidence for a detection to count
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    confidence: f32,

    /// IoU threshold for non-maximum suppression
    #[arg(long, default_value_t = DEFAULT_IOU_THRESHOLD)]
    iou: f32,

    /// Print the report as JSON instead of text (headless mode)
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut detector = YoloDetector::from_file(&args.model)?
        .with_confidence_threshold(args.confidence)
        .with_iou_threshold(args.iou);

    if let Some(class_file) = &args.classes {
        detector = detector.with_class_table(classes::load_class_file(class_file)?);
    }

    match args.image_path {
        Some(image_path) => run_headless(detector, &image_path, args.json),
        None => run_viewer(detector),
    }
}

/// Run the full pipeline on one image and print the report to stdout.
fn run_headless(mut detector: YoloDetector, image_path: &Path, json: bool) -> anyhow::Result<()> {
    let image = ImageReader::open(image_path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;

    info!("image loaded: {}x{}", image.width(), image.height());

    let output = detector.detect(&image)?;
    let detection_report = report::aggregate(
        &output.detections,
        detector.names(),
        image.height(),
        image.width(),
        output.timing,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detection_report)?);
        return Ok(());
    }

    // Same rows the viewer shows, flattened to text.
    for entry in report::render(&detection_report) {
        match entry.column {
            RowColumn::Full => println!("{}", entry.text),
            RowColumn::Label => print!("{:<16}", entry.text),
            RowColumn::Value => println!("{}", entry.text),
        }
    }

    Ok(())
}

#[cfg(feature = "gui")]
fn run_viewer(detector: YoloDetector) -> anyhow::Result<()> {
    info!("starting viewer");
    yoloscope::gui::run(detector).map_err(|e| anyhow::anyhow!("Viewer failed: {}", e))
}

#[cfg(not(feature = "gui"))]
fn run_viewer(_detector: YoloDetector) -> anyhow::Result<()> {
    anyhow::bail!("this build has no GUI; pass an image path to run headless")
}
