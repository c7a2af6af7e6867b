pub mod annotate;
pub mod detection;
pub mod models;
pub mod session;

pub use annotate::annotate;
pub use detection::{ClassLabels, Detector};
pub use models::{Actor, BoundingBox, Detection, LogEntry};
pub use session::{AUTO_CLICK_INTERVAL, ClickSession, LOG_DISPLAY_LIMIT};

#[cfg(feature = "gui")]
pub mod gui;
