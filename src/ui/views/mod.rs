mod mail_assistant;
mod main_window;
mod notifications;
mod task_assistant;
mod update_feed;

pub use mail_assistant::{MailAssistantView, MailField};
pub use main_window::{ActiveOverlay, MainWindow};
pub use notifications::NotificationsView;
pub use task_assistant::{TaskAssistantView, TaskWidgetEvent};
pub use update_feed::UpdateFeedView;
