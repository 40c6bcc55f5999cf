//! Core domain types.
//!
//! Plain data shared by the assistants, the services and the views:
//! drafts, AI-suggested tasks, conversation turns and feed items.

mod conversation;
mod draft;
mod notification;
mod task;

pub use conversation::{ConversationTurn, TurnKind};
pub use draft::{Draft, DraftId, DraftStatus, Tone};
pub use notification::{FeedItem, Notification, NotificationId, NotificationKind};
pub use task::{
    CreatedTask, NewTaskRequest, ProjectId, Sprint, SprintId, SuggestedTask, TaskPriority,
    TaskRole, UserId,
};
