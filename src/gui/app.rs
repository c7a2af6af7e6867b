use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use iced::widget::image::Handle;
use iced::widget::{button, column, container, image, row, scrollable, text};
use iced::{Element, Length, Subscription, Task, Theme};
use log::warn;
use rfd::AsyncFileDialog;
use time::OffsetDateTime;

use super::message::{Message, ProcessedImage};
use crate::annotate::annotate;
use crate::detection::{ClassLabels, Detector};
use crate::models::Detection;
use crate::session::{ClickSession, LOG_DISPLAY_LIMIT};

/// How often the auto-click condition is polled while running.
const TICK_INTERVAL: Duration = Duration::from_millis(250);

pub struct App {
    detector: Option<Arc<Mutex<Detector>>>,
    session: ClickSession,
    original: Option<Handle>,
    annotated: Option<Handle>,
    status: Option<String>,
    processing: bool,
}

impl App {
    pub fn boot(model: PathBuf, labels: ClassLabels) -> (Self, Task<Message>) {
        let (detector, status) = match Detector::load(&model, labels) {
            Ok(detector) => (Some(Arc::new(Mutex::new(detector))), None),
            Err(e) => {
                warn!("Detector unavailable: {e:#}");
                (None, Some(format!("Failed to load model: {e:#}")))
            }
        };

        (
            Self {
                detector,
                session: ClickSession::new(),
                original: None,
                annotated: None,
                status,
                processing: false,
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Play => {
                self.session.play();
                Task::none()
            }
            Message::Pause => {
                self.session.pause();
                Task::none()
            }
            Message::PickImage => {
                if self.processing {
                    return Task::none();
                }
                Task::perform(
                    AsyncFileDialog::new()
                        .add_filter("Images", &["jpg", "jpeg", "png"])
                        .pick_file(),
                    |handle| Message::ImagePicked(handle.map(|f| f.path().to_path_buf())),
                )
            }
            Message::ImagePicked(None) => Task::none(),
            Message::ImagePicked(Some(path)) => {
                let Some(detector) = self.detector.clone() else {
                    self.status = Some("No detection model loaded".to_string());
                    return Task::none();
                };
                self.processing = true;
                self.status = Some(format!("Detecting objects in {:?}...", path));
                Task::perform(process_image(detector, path), Message::ImageProcessed)
            }
            Message::ImageProcessed(Ok(processed)) => {
                self.processing = false;
                self.status = Some(format!("{} objects detected", processed.detections.len()));
                self.original = Some(processed.original);
                self.annotated = Some(processed.annotated);
                self.session.set_detections(processed.detections);
                Task::none()
            }
            Message::ImageProcessed(Err(e)) => {
                self.processing = false;
                self.status = Some(e);
                Task::none()
            }
            Message::ManualClick(index) => {
                self.session.manual_click(index, wall_now());
                Task::none()
            }
            Message::Tick(now) => {
                self.session.poll_auto_click(now, wall_now());
                Task::none()
            }
        }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        // The auto-click loop is an explicit timer, not a rerun-on-interaction
        // side effect: it only exists while the session is running.
        if self.session.is_running() {
            iced::time::every(TICK_INTERVAL).map(Message::Tick)
        } else {
            Subscription::none()
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let controls = row![
            button("Play").on_press(Message::Play),
            button("Pause").on_press(Message::Pause),
            button("Upload Image").on_press(Message::PickImage),
            text(if self.session.is_running() {
                "Running"
            } else {
                "Paused"
            }),
        ]
        .spacing(10);

        let mut content = column![text("YOLO AutoClicker Simulator").size(32), controls]
            .spacing(15)
            .padding(20);

        if let Some(status) = &self.status {
            content = content.push(text(status));
        }

        if let (Some(original), Some(annotated)) = (&self.original, &self.annotated) {
            content = content.push(
                row![
                    column![text("Uploaded Image"), image(original.clone())].spacing(5),
                    column![text("Detections"), image(annotated.clone())].spacing(5),
                ]
                .spacing(10),
            );
        }

        if !self.session.detections().is_empty() {
            content = content.push(text("Click Detected Items").size(20));
            content = content.push(self.detection_buttons());
        }

        content = content.push(text("Click Log").size(20));
        content = content.push(self.log_panel());

        container(scrollable(content))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn detection_buttons(&self) -> Element<'_, Message> {
        let mut buttons = column![].spacing(5);
        for (index, detection) in self.session.detections().iter().enumerate() {
            buttons = buttons.push(
                button(text(format!("Click: {}", detection.caption())))
                    .on_press(Message::ManualClick(index)),
            );
        }
        buttons.into()
    }

    fn log_panel(&self) -> Element<'_, Message> {
        if self.session.log().is_empty() {
            return text("No clicks recorded yet.").into();
        }
        let mut entries = column![].spacing(2);
        for entry in self.session.recent_entries(LOG_DISPLAY_LIMIT) {
            entries = entries.push(text(entry.to_string()));
        }
        entries.into()
    }
}

fn wall_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Decode, detect, and annotate off the UI thread.
async fn process_image(
    detector: Arc<Mutex<Detector>>,
    path: PathBuf,
) -> Result<ProcessedImage, String> {
    let result = tokio::task::spawn_blocking(move || -> anyhow::Result<ProcessedImage> {
        let img = ::image::ImageReader::open(&path)?
            .decode()
            .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;

        let detections: Vec<Detection> = {
            let mut detector = detector.lock().unwrap();
            detector.detect(&img)?
        };

        let annotated = annotate(&img, &detections);
        let original = img.to_rgba8();

        Ok(ProcessedImage {
            original: Handle::from_rgba(original.width(), original.height(), original.into_raw()),
            annotated: Handle::from_rgba(
                annotated.width(),
                annotated.height(),
                annotated.into_raw(),
            ),
            detections,
        })
    })
    .await;

    match result {
        Ok(Ok(processed)) => Ok(processed),
        Ok(Err(e)) => Err(format!("{e:#}")),
        Err(e) => Err(format!("Detection task failed: {e}")),
    }
}
