//! Bounded, client-side list of generated drafts.
//!
//! Entries are kept newest first and unique by id. Filtering by status and
//! search text happens locally; selecting an entry needs no extra fetch.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::domain::{Draft, DraftId, DraftStatus};

/// Maximum number of drafts to keep.
pub const MAX_HISTORY_SIZE: usize = 200;

/// Status filter of the history list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    #[default]
    All,
    Draft,
    Sent,
}

impl StatusFilter {
    pub fn all() -> &'static [StatusFilter] {
        &[StatusFilter::All, StatusFilter::Draft, StatusFilter::Sent]
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Draft => "Drafts",
            StatusFilter::Sent => "Sent",
        }
    }

    fn accepts(&self, status: DraftStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Draft => status == DraftStatus::Draft,
            StatusFilter::Sent => status == DraftStatus::Sent,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DraftHistory {
    entries: VecDeque<Draft>,
    filter: StatusFilter,
    search: String,
}

impl DraftHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a draft and moves it to the front.
    pub fn upsert_front(&mut self, draft: Draft) {
        self.entries.retain(|d| d.id != draft.id);
        self.entries.push_front(draft);
        self.entries.truncate(MAX_HISTORY_SIZE);
    }

    /// Replaces the whole list, keeping the first occurrence of each id.
    pub fn replace_all(&mut self, drafts: Vec<Draft>) {
        self.entries.clear();
        for draft in drafts {
            if self.entries.len() == MAX_HISTORY_SIZE {
                break;
            }
            if !self.entries.iter().any(|d| d.id == draft.id) {
                self.entries.push_back(draft);
            }
        }
    }

    /// Updates the status of the entry with `id`. Returns false if absent.
    pub fn mark_status(
        &mut self,
        id: DraftId,
        status: DraftStatus,
        sent_at: Option<DateTime<Utc>>,
    ) -> bool {
        match self.entries.iter_mut().find(|d| d.id == id) {
            Some(draft) => {
                draft.status = status;
                if sent_at.is_some() {
                    draft.sent_at = sent_at;
                }
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: DraftId) -> Option<&Draft> {
        self.entries.iter().find(|d| d.id == id)
    }

    pub fn first(&self) -> Option<&Draft> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Entries passing the status filter and the search text.
    pub fn visible(&self) -> Vec<&Draft> {
        let needle = self.search.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|d| self.filter.accepts(d.status))
            .filter(|d| needle.is_empty() || d.matches(&needle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::domain::Tone;

    fn draft(id: i64, subject: &str, recipient: &str, status: DraftStatus) -> Draft {
        Draft {
            id: DraftId(id),
            subject: subject.to_string(),
            recipient: recipient.to_string(),
            tone: Tone::Professional,
            status,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            body: "Hello".to_string(),
            sent_at: None,
        }
    }

    fn ids(drafts: Vec<&Draft>) -> Vec<i64> {
        drafts.into_iter().map(|d| d.id.0).collect()
    }

    #[test]
    fn sent_and_search_filters_combine() {
        let mut history = DraftHistory::new();
        history.replace_all(vec![
            draft(1, "Invoice for March", "a@example.com", DraftStatus::Sent),
            draft(2, "Invoice reminder", "b@example.com", DraftStatus::Draft),
            draft(3, "Kickoff", "billing-INVOICE@example.com", DraftStatus::Sent),
            draft(4, "Kickoff", "c@example.com", DraftStatus::Sent),
        ]);

        history.set_filter(StatusFilter::Sent);
        history.set_search("invoice");

        assert_eq!(ids(history.visible()), vec![1, 3]);
    }

    #[test]
    fn draft_filter_excludes_failed() {
        let mut history = DraftHistory::new();
        history.replace_all(vec![
            draft(1, "A", "", DraftStatus::Failed),
            draft(2, "B", "", DraftStatus::Draft),
        ]);
        history.set_filter(StatusFilter::Draft);
        assert_eq!(ids(history.visible()), vec![2]);

        history.set_filter(StatusFilter::All);
        assert_eq!(ids(history.visible()), vec![1, 2]);
    }

    #[test]
    fn upsert_deduplicates_by_id() {
        let mut history = DraftHistory::new();
        history.upsert_front(draft(1, "First", "", DraftStatus::Draft));
        history.upsert_front(draft(2, "Second", "", DraftStatus::Draft));
        history.upsert_front(draft(1, "First again", "", DraftStatus::Draft));

        assert_eq!(history.len(), 2);
        assert_eq!(history.first().unwrap().subject, "First again");
    }

    #[test]
    fn replace_all_keeps_first_occurrence() {
        let mut history = DraftHistory::new();
        history.replace_all(vec![
            draft(5, "new", "", DraftStatus::Draft),
            draft(5, "old", "", DraftStatus::Draft),
        ]);
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(DraftId(5)).unwrap().subject, "new");
    }

    #[test]
    fn history_is_bounded() {
        let mut history = DraftHistory::new();
        for id in 0..(MAX_HISTORY_SIZE as i64 + 10) {
            history.upsert_front(draft(id, "s", "", DraftStatus::Draft));
        }
        assert_eq!(history.len(), MAX_HISTORY_SIZE);
        assert_eq!(history.first().unwrap().id, DraftId(MAX_HISTORY_SIZE as i64 + 9));
    }

    #[test]
    fn mark_status_updates_matching_entry() {
        let mut history = DraftHistory::new();
        history.upsert_front(draft(1, "A", "", DraftStatus::Draft));
        let at = Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap();

        assert!(history.mark_status(DraftId(1), DraftStatus::Sent, Some(at)));
        assert!(!history.mark_status(DraftId(9), DraftStatus::Sent, None));

        let entry = history.get(DraftId(1)).unwrap();
        assert_eq!(entry.status, DraftStatus::Sent);
        assert_eq!(entry.sent_at, Some(at));
    }
}
