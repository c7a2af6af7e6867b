use std::path::PathBuf;

use iced::widget::image::Handle;

use crate::models::Detection;

/// Result of loading, detecting on, and annotating one uploaded image.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub original: Handle,
    pub annotated: Handle,
    pub detections: Vec<Detection>,
}

#[derive(Debug, Clone)]
pub enum Message {
    Play,
    Pause,
    PickImage,
    ImagePicked(Option<PathBuf>),
    ImageProcessed(Result<ProcessedImage, String>),
    ManualClick(usize),
    Tick(iced::time::Instant),
}
