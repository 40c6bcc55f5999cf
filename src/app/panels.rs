//! Notification and update-feed panels.
//!
//! Both panels are local view state over static items: no network traffic.

use crate::domain::{FeedItem, Notification, NotificationKind};

/// Title and text shown when a tab has nothing to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyState {
    pub title: &'static str,
    pub message: &'static str,
}

/// Groups items by date label, keeping the order in which labels first
/// appear.
pub fn group_by_date<'a, I>(items: I) -> Vec<(String, Vec<&'a FeedItem>)>
where
    I: IntoIterator<Item = &'a FeedItem>,
{
    let mut groups: Vec<(String, Vec<&'a FeedItem>)> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|(label, _)| label.as_str() == item.date_label()) {
            Some((_, entries)) => entries.push(item),
            None => groups.push((item.date_label().to_string(), vec![item])),
        }
    }
    groups
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NotificationTab {
    #[default]
    All,
    Assigned,
    Bookmark,
}

impl NotificationTab {
    pub fn all() -> &'static [NotificationTab] {
        &[
            NotificationTab::All,
            NotificationTab::Assigned,
            NotificationTab::Bookmark,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            NotificationTab::All => "All",
            NotificationTab::Assigned => "Assigned to me",
            NotificationTab::Bookmark => "Bookmark",
        }
    }

    pub fn empty_state(&self) -> EmptyState {
        match self {
            NotificationTab::All => EmptyState {
                title: "All Updates",
                message: "A comprehensive view of all your recent updates",
            },
            NotificationTab::Assigned => EmptyState {
                title: "Assigned to Me",
                message: "Tasks and items that have been assigned to you",
            },
            NotificationTab::Bookmark => EmptyState {
                title: "Bookmark Important Updates",
                message: "Save key updates to quickly access them later. Your bookmarks help you stay organized and informed.",
            },
        }
    }

    fn accepts(&self, notification: &Notification) -> bool {
        match self {
            NotificationTab::All => true,
            NotificationTab::Assigned => notification.kind == NotificationKind::Assigned,
            NotificationTab::Bookmark => notification.kind == NotificationKind::Bookmark,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotificationPanel {
    items: Vec<FeedItem>,
    tab: NotificationTab,
    search: String,
}

impl NotificationPanel {
    pub fn new(items: Vec<FeedItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// Panel populated with the built-in sample notifications.
    pub fn with_samples() -> Self {
        Self::new(sample_notifications())
    }

    pub fn tab(&self) -> NotificationTab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: NotificationTab) {
        self.tab = tab;
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn unread_count(&self) -> usize {
        self.items
            .iter()
            .filter_map(FeedItem::notification)
            .filter(|n| !n.read)
            .count()
    }

    pub fn mark_all_read(&mut self) {
        for item in &mut self.items {
            if let FeedItem::Entry(notification) = item {
                notification.read = true;
            }
        }
    }

    /// Items passing the tab and search filters. Spacers only show on the
    /// unfiltered view.
    pub fn visible(&self) -> Vec<&FeedItem> {
        let needle = self.search.trim().to_lowercase();
        let unfiltered = self.tab == NotificationTab::All && needle.is_empty();
        self.items
            .iter()
            .filter(|item| match item {
                FeedItem::Spacer { .. } => unfiltered,
                FeedItem::Entry(n) => {
                    self.tab.accepts(n)
                        && (needle.is_empty()
                            || n.actor.to_lowercase().contains(&needle)
                            || n.action.to_lowercase().contains(&needle))
                }
            })
            .collect()
    }

    pub fn grouped(&self) -> Vec<(String, Vec<&FeedItem>)> {
        group_by_date(self.visible())
    }
}

fn sample_notifications() -> Vec<FeedItem> {
    vec![
        FeedItem::Entry(
            Notification::new(
                1,
                "Riya Shete",
                "has assigned you to item \"desktop UI/UX\"",
                "Yesterday",
            )
                .with_time("yesterday 5:30 pm")
                .with_kind(NotificationKind::Assigned),
        ),
        FeedItem::Entry(
            Notification::new(2, "Team Project", "submitted a new design for review", "Yesterday")
                .with_time("yesterday 3:45 pm"),
        ),
        FeedItem::Entry(
            Notification::new(
                3,
                "Sarah Johnson",
                "bookmarked your post \"React Best Practices\"",
                "Today",
            )
                .with_time("today 2:15 pm")
                .with_kind(NotificationKind::Bookmark),
        ),
    ]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FeedTab {
    All,
    Mentioned,
    #[default]
    Bookmarks,
    Account,
}

impl FeedTab {
    pub fn all() -> &'static [FeedTab] {
        &[FeedTab::All, FeedTab::Mentioned, FeedTab::Bookmarks, FeedTab::Account]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FeedTab::All => "All updates",
            FeedTab::Mentioned => "@ I was mentioned",
            FeedTab::Bookmarks => "Bookmarks",
            FeedTab::Account => "All account updates",
        }
    }

    pub fn empty_state(&self) -> EmptyState {
        match self {
            FeedTab::All => EmptyState {
                title: "",
                message: "All updates will appear here",
            },
            FeedTab::Mentioned => EmptyState {
                title: "",
                message: "Updates where you were mentioned will appear here",
            },
            FeedTab::Bookmarks => EmptyState {
                title: "Bookmark important updates",
                message: "That way, you can quickly and easily find them again",
            },
            FeedTab::Account => EmptyState {
                title: "",
                message: "All account updates will appear here",
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateFeed {
    tab: FeedTab,
}

impl UpdateFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab(&self) -> FeedTab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: FeedTab) {
        self.tab = tab;
    }
}
