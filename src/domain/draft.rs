use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned identifier of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftId(pub i64);

impl From<i64> for DraftId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Writing tone requested from the generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Friendly,
    Formal,
    Urgent,
}

impl Tone {
    /// Returns all tones in display order.
    pub fn all() -> &'static [Tone] {
        &[Tone::Professional, Tone::Friendly, Tone::Formal, Tone::Urgent]
    }

    /// Parses a wire value; anything unrecognized is professional.
    pub fn parse_lossy(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("friendly") => Tone::Friendly,
            Some("formal") => Tone::Formal,
            Some("urgent") => Tone::Urgent,
            Some("professional") => Tone::Professional,
            _ => Tone::Professional,
        }
    }

    /// Wire value for requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Friendly => "friendly",
            Tone::Formal => "formal",
            Tone::Urgent => "urgent",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tone::Professional => "Professional",
            Tone::Friendly => "Friendly",
            Tone::Formal => "Formal",
            Tone::Urgent => "Urgent",
        }
    }
}

/// Lifecycle state of a draft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    #[default]
    Draft,
    Sent,
    Failed,
}

impl DraftStatus {
    /// Parses a wire value; unknown statuses are treated as drafts.
    pub fn parse_lossy(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("sent") => DraftStatus::Sent,
            Some("failed") => DraftStatus::Failed,
            _ => DraftStatus::Draft,
        }
    }

    /// Badge text shown above the editor.
    pub fn badge(&self) -> &'static str {
        match self {
            DraftStatus::Draft => "Draft",
            DraftStatus::Sent => "Sent",
            DraftStatus::Failed => "Failed",
        }
    }
}

/// A generated email, as kept in the history list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub id: DraftId,
    pub subject: String,
    pub recipient: String,
    pub tone: Tone,
    pub status: DraftStatus,
    pub created_at: DateTime<Utc>,
    pub body: String,
    pub sent_at: Option<DateTime<Utc>>,
}

impl Draft {
    /// Subject line for list rows.
    pub fn display_subject(&self) -> &str {
        if self.subject.trim().is_empty() {
            "Untitled Email"
        } else {
            &self.subject
        }
    }

    /// Recipient for list rows.
    pub fn display_recipient(&self) -> &str {
        if self.recipient.trim().is_empty() {
            "No recipient"
        } else {
            &self.recipient
        }
    }

    /// Case-insensitive match on subject or recipient.
    ///
    /// `needle_lower` must already be lowercased.
    pub fn matches(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty()
            || self.subject.to_lowercase().contains(needle_lower)
            || self.recipient.to_lowercase().contains(needle_lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_parsing_defaults_to_professional() {
        assert_eq!(Tone::parse_lossy(Some("Friendly")), Tone::Friendly);
        assert_eq!(Tone::parse_lossy(Some("sarcastic")), Tone::Professional);
        assert_eq!(Tone::parse_lossy(None), Tone::Professional);
    }

    #[test]
    fn tone_serializes_lowercase() {
        let json = serde_json::to_string(&Tone::Urgent).unwrap();
        assert_eq!(json, "\"urgent\"");
    }

    #[test]
    fn status_parsing() {
        assert_eq!(DraftStatus::parse_lossy(Some("sent")), DraftStatus::Sent);
        assert_eq!(DraftStatus::parse_lossy(Some("FAILED")), DraftStatus::Failed);
        assert_eq!(DraftStatus::parse_lossy(Some("queued")), DraftStatus::Draft);
    }

    #[test]
    fn draft_matching_is_case_insensitive() {
        let draft = Draft {
            id: DraftId(1),
            subject: "Invoice for March".into(),
            recipient: "billing@acme.io".into(),
            tone: Tone::Formal,
            status: DraftStatus::Draft,
            created_at: Utc::now(),
            body: String::new(),
            sent_at: None,
        };

        assert!(draft.matches("invoice"));
        assert!(draft.matches("acme"));
        assert!(draft.matches(""));
        assert!(!draft.matches("payroll"));
    }
}
