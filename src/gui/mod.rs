mod app;
mod message;

pub use app::App;
pub use message::Message;

use std::path::PathBuf;

use crate::detection::ClassLabels;

/// Launch the GUI. The detector is loaded once at startup from `model`.
pub fn run(model: PathBuf, labels: ClassLabels) -> iced::Result {
    iced::application(
        move || App::boot(model.clone(), labels.clone()),
        App::update,
        App::view,
    )
    .title("YOLO AutoClicker Simulator")
    .subscription(App::subscription)
    .theme(App::theme)
    .run()
}
