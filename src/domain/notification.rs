use serde::{Deserialize, Serialize};

/// Identifier of a notification.
pub type NotificationId = u64;

/// Category a notification belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Assigned,
    Mentioned,
    Bookmark,
    General,
}

/// A single notification row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    /// Who triggered the notification.
    pub actor: String,
    /// What they did, e.g. `has assigned you to item "Login page"`.
    pub action: String,
    /// Time shown on the right of the row.
    pub time_label: String,
    /// Heading the row is grouped under.
    pub date_label: String,
    pub avatar_url: Option<String>,
    pub kind: NotificationKind,
    #[serde(default)]
    pub read: bool,
}

impl Notification {
    pub fn new(
        id: NotificationId,
        actor: impl Into<String>,
        action: impl Into<String>,
        date_label: impl Into<String>,
    ) -> Self {
        Self {
            id,
            actor: actor.into(),
            action: action.into(),
            time_label: String::new(),
            date_label: date_label.into(),
            avatar_url: None,
            kind: NotificationKind::General,
            read: false,
        }
    }

    pub fn with_kind(mut self, kind: NotificationKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_time(mut self, time_label: impl Into<String>) -> Self {
        self.time_label = time_label.into();
        self
    }

    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    /// First letter of the actor, for the avatar bubble.
    pub fn initial(&self) -> String {
        self.actor
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_else(|| "?".to_string())
    }
}

/// An entry in a grouped panel: a notification or a blank spacer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedItem {
    Entry(Notification),
    Spacer { id: NotificationId, date_label: String },
}

impl FeedItem {
    pub fn spacer(id: NotificationId, date_label: impl Into<String>) -> Self {
        FeedItem::Spacer {
            id,
            date_label: date_label.into(),
        }
    }

    pub fn id(&self) -> NotificationId {
        match self {
            FeedItem::Entry(n) => n.id,
            FeedItem::Spacer { id, .. } => *id,
        }
    }

    pub fn date_label(&self) -> &str {
        match self {
            FeedItem::Entry(n) => &n.date_label,
            FeedItem::Spacer { date_label, .. } => date_label,
        }
    }

    pub fn notification(&self) -> Option<&Notification> {
        match self {
            FeedItem::Entry(n) => Some(n),
            FeedItem::Spacer { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_falls_back_for_empty_actor() {
        assert_eq!(Notification::new(1, "riya", "x", "Today").initial(), "R");
        assert_eq!(Notification::new(2, "", "x", "Today").initial(), "?");
    }

    #[test]
    fn spacer_has_no_notification() {
        let item = FeedItem::spacer(4, "Yesterday");
        assert_eq!(item.date_label(), "Yesterday");
        assert_eq!(item.id(), 4);
        assert!(item.notification().is_none());
    }
}
