//! Email drafting endpoints.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Draft, DraftId, DraftStatus, Tone};
use crate::error::ApiError;
use crate::services::Credential;

/// Request for a new AI draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateDraftRequest {
    pub prompt: String,
    pub recipient_email: String,
    pub tone: Tone,
}

/// Request to rewrite an existing draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefineDraftRequest {
    #[serde(rename = "email_log_id")]
    pub draft_id: DraftId,
    pub instructions: String,
}

/// Request to send a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendDraftRequest {
    #[serde(rename = "email_log_id")]
    pub draft_id: DraftId,
    #[serde(rename = "use_pms_email")]
    pub use_managed_sender: bool,
    pub additional_recipients: Vec<String>,
}

impl SendDraftRequest {
    /// Sends through the backend's own mail account.
    pub fn managed(draft_id: DraftId) -> Self {
        Self {
            draft_id,
            use_managed_sender: true,
            additional_recipients: Vec::new(),
        }
    }
}

/// Subject and body produced by the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDraft {
    pub id: DraftId,
    pub subject: String,
    pub body: String,
}

/// Backend for drafting and sending email.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailApi: Send + Sync {
    /// Generates a new draft from a prompt.
    async fn generate_draft(
        &self,
        credential: &Credential,
        request: &GenerateDraftRequest,
    ) -> Result<GeneratedDraft, ApiError>;

    /// Rewrites an existing draft following instructions.
    async fn refine_draft(
        &self,
        credential: &Credential,
        request: &RefineDraftRequest,
    ) -> Result<GeneratedDraft, ApiError>;

    /// Sends a draft.
    async fn send_draft(
        &self,
        credential: &Credential,
        request: &SendDraftRequest,
    ) -> Result<(), ApiError>;

    /// Lists the user's drafts, newest first.
    async fn list_drafts(&self, credential: &Credential) -> Result<Vec<Draft>, ApiError>;
}

/// Response envelope of the generate and customize endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct DraftEnvelope {
    #[serde(default)]
    success: bool,
    subject: Option<String>,
    body: Option<String>,
    email_log_id: Option<DraftId>,
    error: Option<String>,
}

impl DraftEnvelope {
    pub(crate) fn into_result(self, fallback: &str) -> Result<GeneratedDraft, ApiError> {
        if !self.success {
            return Err(ApiError::remote(None, self.error, fallback));
        }
        let id = self
            .email_log_id
            .ok_or_else(|| ApiError::Decode("missing email_log_id".into()))?;
        Ok(GeneratedDraft {
            id,
            subject: self.subject.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
        })
    }
}

/// Response envelope of the send endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct SendEnvelope {
    #[serde(default)]
    success: bool,
    error: Option<String>,
}

impl SendEnvelope {
    pub(crate) fn into_result(self, fallback: &str) -> Result<(), ApiError> {
        if self.success {
            Ok(())
        } else {
            Err(ApiError::remote(None, self.error, fallback))
        }
    }
}

#[derive(Debug, Deserialize)]
struct DraftRecord {
    id: DraftId,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    recipient_email: Option<String>,
    #[serde(default)]
    tone: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    body: Option<String>,
}

impl From<DraftRecord> for Draft {
    fn from(record: DraftRecord) -> Self {
        Draft {
            id: record.id,
            subject: record.subject.unwrap_or_default(),
            recipient: record.recipient_email.unwrap_or_default(),
            tone: Tone::parse_lossy(record.tone.as_deref()),
            status: DraftStatus::parse_lossy(record.status.as_deref()),
            created_at: record.created_at.unwrap_or_else(Utc::now),
            body: record.body.unwrap_or_default(),
            sent_at: None,
        }
    }
}

/// Response envelope of the draft listing endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct DraftListEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    drafts: Vec<DraftRecord>,
    error: Option<String>,
}

impl DraftListEnvelope {
    pub(crate) fn into_result(self, fallback: &str) -> Result<Vec<Draft>, ApiError> {
        if !self.success {
            return Err(ApiError::remote(None, self.error, fallback));
        }
        Ok(self.drafts.into_iter().map(Draft::from).collect())
    }
}
