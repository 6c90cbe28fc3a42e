use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use iced::Alignment::Center;
use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, scrollable, text};
use iced::{Element, Size, Task};
use image::ImageReader;
use log::{info, warn};
use rfd::AsyncFileDialog;

use crate::detection::annotate::{self, DISPLAY_SIZE};
use crate::detection::{INFERENCE_TIMEOUT, YoloDetector};
use crate::gui::theme;
use crate::models::{DisplayRow, RowColumn};
use crate::report;

/// Launch the viewer window with a ready detector.
pub fn run(detector: YoloDetector) -> iced::Result {
    let detector = Arc::new(Mutex::new(detector));

    iced::application(
        move || ViewerApp::new(detector.clone()),
        ViewerApp::update,
        ViewerApp::view,
    )
    .title("YOLOv8 Object Detection Viewer")
    .window_size(Size::new(theme::WINDOW_WIDTH, theme::WINDOW_HEIGHT))
    .style(|_app, _theme| iced::theme::Style {
        background_color: theme::WINDOW_BACKGROUND,
        text_color: iced::Color::WHITE,
    })
    .run()
}

#[derive(Debug, Clone)]
pub enum Message {
    UploadPressed,
    ImagePicked(Option<PathBuf>),
    DetectionFinished(Result<DetectionView, String>),
}

/// What one completed detection run hands back to the shell.
#[derive(Debug, Clone)]
pub struct DetectionView {
    rows: Vec<DisplayRow>,
    image: Handle,
}

/// Admission state for detection runs: at most one dialog or one run
/// exists at any time.
///
/// The gate closes when the picker opens and reopens when the dialog is
/// cancelled or the run finishes. Upload presses while closed are
/// dropped, so a second dialog can never open behind the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunPhase {
    Idle,
    Picking,
    Detecting,
}

impl RunPhase {
    /// Close the gate for a new pick. Returns false while a pick or a
    /// run is already underway.
    fn try_start_picking(&mut self) -> bool {
        if *self != RunPhase::Idle {
            return false;
        }
        *self = RunPhase::Picking;
        true
    }

    fn cancel_picking(&mut self) {
        *self = RunPhase::Idle;
    }

    fn start_detecting(&mut self) {
        *self = RunPhase::Detecting;
    }

    fn finish(&mut self) {
        *self = RunPhase::Idle;
    }

    fn is_idle(&self) -> bool {
        *self == RunPhase::Idle
    }

    fn is_detecting(&self) -> bool {
        *self == RunPhase::Detecting
    }
}

/// Single-screen shell: upload button on top, annotated image beside the
/// scrollable report panel.
///
/// The row list is the only source of truth for the panel and is
/// replaced wholesale after every successful run. On failure it is left
/// exactly as it was.
pub struct ViewerApp {
    detector: Arc<Mutex<YoloDetector>>,
    rows: Vec<DisplayRow>,
    image: Option<Handle>,
    phase: RunPhase,
    error: Option<String>,
}

impl ViewerApp {
    fn new(detector: Arc<Mutex<YoloDetector>>) -> Self {
        Self {
            detector,
            rows: Vec::new(),
            image: None,
            phase: RunPhase::Idle,
            error: None,
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::UploadPressed => {
                // Presses while a pick or run is underway are dropped.
                if !self.phase.try_start_picking() {
                    return Task::none();
                }
                Task::perform(
                    AsyncFileDialog::new()
                        .add_filter("Image files", &["jpg", "jpeg", "png", "bmp"])
                        .pick_file(),
                    |handle| Message::ImagePicked(handle.map(|file| file.path().to_path_buf())),
                )
            }
            // Dialog cancelled: reopen the gate, nothing else changes.
            Message::ImagePicked(None) => {
                self.phase.cancel_picking();
                Task::none()
            }
            Message::ImagePicked(Some(path)) => {
                info!("running detection on {}", path.display());
                self.phase.start_detecting();
                self.error = None;
                let detector = self.detector.clone();
                Task::perform(run_detection(detector, path), Message::DetectionFinished)
            }
            Message::DetectionFinished(Ok(view)) => {
                self.phase.finish();
                self.rows = view.rows;
                self.image = Some(view.image);
                Task::none()
            }
            Message::DetectionFinished(Err(message)) => {
                warn!("detection failed: {}", message);
                self.phase.finish();
                self.error = Some(message);
                Task::none()
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let upload = button(
            text(if self.phase.is_detecting() {
                "Detecting..."
            } else {
                "Upload Image"
            })
            .font(theme::TEXT),
        )
        .on_press_maybe(self.phase.is_idle().then_some(Message::UploadPressed))
        .padding(10);

        let image_panel: Element<'_, Message> = match &self.image {
            Some(handle) => container(iced::widget::image(handle.clone()))
                .width(DISPLAY_SIZE as f32)
                .height(DISPLAY_SIZE as f32)
                .into(),
            None => container(text("No image loaded").font(theme::TEXT))
                .width(DISPLAY_SIZE as f32)
                .height(DISPLAY_SIZE as f32)
                .align_x(Center)
                .align_y(Center)
                .into(),
        };

        // Failures surface at the top of the report panel; the rows of
        // the previous run stay below, untouched.
        let mut report_panel = column![].spacing(6);
        if let Some(error) = &self.error {
            report_panel = report_panel.push(
                text(error.as_str())
                    .font(theme::TEXT)
                    .size(theme::TEXT_SIZE)
                    .color(theme::ERROR),
            );
        }
        let report_panel = report_panel
            .push(
                scrollable(self.report_rows())
                    .width(iced::Length::Fill)
                    .height(iced::Length::Fill),
            )
            .width(iced::Length::Fill);

        let content = column![upload, row![image_panel, report_panel].spacing(20)]
            .spacing(12)
            .padding(16)
            .align_x(Center);

        container(content)
            .center_x(iced::Length::Fill)
            .center_y(iced::Length::Fill)
            .into()
    }

    /// Materialize the flat row list. Label/value cells share a row
    /// index and sit side by side; everything else spans the panel.
    fn report_rows(&self) -> Element<'_, Message> {
        let mut lines = column![].spacing(2);

        let mut index = 0;
        while index < self.rows.len() {
            let entry = &self.rows[index];
            if entry.column == RowColumn::Full {
                lines = lines.push(cell(entry, iced::Length::Fill));
                index += 1;
            } else if let Some(value) = self.rows.get(index + 1) {
                lines = lines.push(
                    row![
                        cell(entry, iced::Length::FillPortion(1)),
                        cell(value, iced::Length::FillPortion(1)),
                    ]
                    .spacing(2),
                );
                index += 2;
            } else {
                index += 1;
            }
        }

        lines.into()
    }
}

/// One report cell: its text on its tagged background.
fn cell(entry: &DisplayRow, width: iced::Length) -> Element<'_, Message> {
    let background = theme::background(entry.color);
    let foreground = theme::text_on(entry.color);

    let label = text(entry.text.as_str())
        .font(if entry.bold {
            theme::TEXT_BOLD
        } else {
            theme::TEXT
        })
        .size(theme::TEXT_SIZE)
        .color(foreground);

    container(label)
        .style(move |_theme| iced::widget::container::Style::default().background(background))
        .width(width)
        .padding(5)
        .into()
}

/// Decode, detect, aggregate and render off the UI thread, bounded by
/// the inference timeout. The String error is what the shell shows.
async fn run_detection(
    detector: Arc<Mutex<YoloDetector>>,
    path: PathBuf,
) -> Result<DetectionView, String> {
    let work = tokio::task::spawn_blocking(move || detect_and_render(&detector, &path));

    match tokio::time::timeout(INFERENCE_TIMEOUT, work).await {
        Ok(Ok(result)) => result.map_err(|error| format!("{:#}", error)),
        Ok(Err(join_error)) => Err(format!("Detection task failed: {}", join_error)),
        Err(_) => Err(format!(
            "Detection timed out after {} seconds",
            INFERENCE_TIMEOUT.as_secs()
        )),
    }
}

fn detect_and_render(
    detector: &Mutex<YoloDetector>,
    path: &Path,
) -> anyhow::Result<DetectionView> {
    let image = ImageReader::open(path)
        .map_err(|e| anyhow::anyhow!("Failed to open image {}: {}", path.display(), e))?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image {}: {}", path.display(), e))?;

    let mut detector = detector
        .lock()
        .map_err(|_| anyhow::anyhow!("Detector lock poisoned"))?;
    let output = detector.detect(&image)?;

    let detection_report = report::aggregate(
        &output.detections,
        detector.names(),
        image.height(),
        image.width(),
        output.timing,
    )?;
    let rows = report::render(&detection_report);

    let annotated = annotate::annotate(&image, &output.detections);
    let display = annotate::to_display(&annotated);
    let width = display.width();
    let height = display.height();
    let handle = Handle::from_rgba(width, height, display.into_raw());

    Ok(DetectionView {
        rows,
        image: handle,
    })
}

#[cfg(test)]
mod tests {
    use super::RunPhase;

    #[test]
    fn press_while_picking_is_rejected() {
        let mut phase = RunPhase::Idle;
        assert!(phase.try_start_picking());
        assert!(!phase.try_start_picking());
    }

    #[test]
    fn press_while_detecting_is_rejected() {
        let mut phase = RunPhase::Idle;
        assert!(phase.try_start_picking());
        phase.start_detecting();
        assert!(phase.is_detecting());
        assert!(!phase.try_start_picking());
    }

    #[test]
    fn cancelled_dialog_reopens_the_gate() {
        let mut phase = RunPhase::Idle;
        assert!(phase.try_start_picking());
        phase.cancel_picking();
        assert!(phase.is_idle());
        assert!(phase.try_start_picking());
    }

    #[test]
    fn finished_run_reopens_the_gate() {
        let mut phase = RunPhase::Idle;
        assert!(phase.try_start_picking());
        phase.start_detecting();
        phase.finish();
        assert!(phase.is_idle());
        assert!(phase.try_start_picking());
    }
}
