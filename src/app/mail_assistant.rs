//! Prompt-to-draft composer state.
//!
//! Every network action is split in two: `begin_*` validates and returns a
//! pending request stamped with a ticket, `finish_*` applies the response if
//! the ticket is still current. Views run the request in between on the
//! tokio runtime. The async wrappers at the bottom chain both halves for
//! callers that own the assistant across an await.

use std::time::Duration;

use chrono::Utc;

use crate::app::draft_history::DraftHistory;
use crate::app::guard::{Outcome, RequestGuard, Ticket};
use crate::domain::{Draft, DraftId, DraftStatus, Tone};
use crate::error::{ApiError, Error, ValidationError};
use crate::services::{
    Credential, EmailApi, GenerateDraftRequest, GeneratedDraft, RefineDraftRequest,
    SendDraftRequest,
};

/// Shown instead of the transport error when the AI endpoint is down.
pub const UNAVAILABLE_MESSAGE: &str = "AI service unavailable. Please try again in a moment.";

const GENERATED_NOTICE: &str = "Email generated successfully";
const REFINED_NOTICE: &str = "Email updated";
const SENT_NOTICE: &str = "Email sent successfully!";

/// A generation request waiting for its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGeneration {
    pub ticket: Ticket,
    pub request: GenerateDraftRequest,
    /// Prompt as typed, used by the offline placeholder.
    raw_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRefine {
    pub ticket: Ticket,
    pub request: RefineDraftRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub ticket: Ticket,
    pub request: SendDraftRequest,
}

/// Placeholder draft shown when the generator could not be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub ticket: Ticket,
    prompt: String,
    recipient: String,
}

impl Fallback {
    pub fn subject(&self) -> String {
        let head: String = self.prompt.chars().take(50).collect();
        format!("Regarding: {}...", head)
    }

    pub fn body(&self) -> String {
        let recipient = if self.recipient.trim().is_empty() {
            "Recipient"
        } else {
            self.recipient.as_str()
        };
        format!(
            "Dear {},\n\nI hope this email finds you well. {}\n\nBest regards,\n[Your Name]",
            recipient, self.prompt
        )
    }
}

/// Result of applying a generation response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    Applied,
    Stale,
    Failed(ApiError),
    /// The endpoint was unreachable; show the placeholder after the delay.
    Unavailable(Fallback),
}

pub struct MailAssistant {
    prompt: String,
    tone: Tone,
    recipient: String,
    subject: String,
    body: String,
    draft_id: Option<DraftId>,
    status: Option<DraftStatus>,
    generating: bool,
    refining: bool,
    sending: bool,
    error: Option<String>,
    notice: Option<String>,
    history: DraftHistory,
    generate_guard: RequestGuard,
    refine_guard: RequestGuard,
    send_guard: RequestGuard,
    list_guard: RequestGuard,
    fallback_delay: Duration,
}

impl MailAssistant {
    pub fn new(fallback_delay: Duration) -> Self {
        Self {
            prompt: String::new(),
            tone: Tone::default(),
            recipient: String::new(),
            subject: String::new(),
            body: String::new(),
            draft_id: None,
            status: None,
            generating: false,
            refining: false,
            sending: false,
            error: None,
            notice: None,
            history: DraftHistory::new(),
            generate_guard: RequestGuard::new(),
            refine_guard: RequestGuard::new(),
            send_guard: RequestGuard::new(),
            list_guard: RequestGuard::new(),
            fallback_delay,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn draft_id(&self) -> Option<DraftId> {
        self.draft_id
    }

    pub fn status(&self) -> Option<DraftStatus> {
        self.status
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn is_refining(&self) -> bool {
        self.refining
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn history(&self) -> &DraftHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut DraftHistory {
        &mut self.history
    }

    pub fn fallback_delay(&self) -> Duration {
        self.fallback_delay
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn set_tone(&mut self, tone: Tone) {
        self.tone = tone;
    }

    pub fn set_recipient(&mut self, recipient: impl Into<String>) {
        self.recipient = recipient.into();
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = subject.into();
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Footer label summarizing the draft.
    pub fn status_label(&self) -> &'static str {
        match self.status {
            Some(DraftStatus::Sent) => "Sent",
            Some(DraftStatus::Failed) => "Failed",
            _ if !self.body.is_empty() => "Ready",
            _ => "Input needed",
        }
    }

    /// Text placed on the clipboard. Empty when there is no body.
    pub fn clipboard_text(&self) -> String {
        if self.body.is_empty() {
            return String::new();
        }
        format!("Subject: {}\n\n{}", self.subject, self.body)
    }

    pub fn can_send(&self) -> bool {
        self.draft_id.is_some()
            && !self.body.trim().is_empty()
            && !self.sending
            && self.status != Some(DraftStatus::Sent)
    }

    fn reject(&mut self, err: ValidationError) -> ValidationError {
        if err.is_user_visible() {
            tracing::warn!("Composer rejected action: {}", err);
            self.error = Some(err.to_string());
        }
        err
    }

    fn fail(&mut self, err: &ApiError) {
        tracing::error!("Composer request failed: {}", err);
        self.error = Some(err.to_string());
    }

    /// Validates and stamps a generation request.
    ///
    /// The current body is cleared while the request runs.
    pub fn begin_generate(
        &mut self,
        credential: Option<&Credential>,
    ) -> Result<PendingGeneration, ValidationError> {
        if self.prompt.trim().is_empty() {
            return Err(self.reject(ValidationError::EmptyPrompt));
        }
        if self.generating {
            return Err(self.reject(ValidationError::Busy));
        }
        self.error = None;
        if credential.is_none() {
            return Err(self.reject(ValidationError::MissingCredential));
        }

        let ticket = self.generate_guard.issue();
        self.generating = true;
        self.body.clear();

        let request = GenerateDraftRequest {
            prompt: self.prompt.trim().to_string(),
            recipient_email: self.recipient.clone(),
            tone: self.tone,
        };
        tracing::info!("Generating draft (ticket {}, tone {})", ticket, self.tone.as_str());
        Ok(PendingGeneration {
            ticket,
            request,
            raw_prompt: self.prompt.clone(),
        })
    }

    pub fn finish_generate(
        &mut self,
        pending: PendingGeneration,
        result: Result<GeneratedDraft, ApiError>,
    ) -> GenerateOutcome {
        if !self.generate_guard.is_current(pending.ticket) {
            tracing::debug!("Discarding stale generation {}", pending.ticket);
            return GenerateOutcome::Stale;
        }
        self.generating = false;

        match result {
            Ok(generated) => {
                tracing::info!("Generated draft {}", generated.id);
                self.subject = generated.subject.clone();
                self.body = generated.body.clone();
                self.draft_id = Some(generated.id);
                self.status = Some(DraftStatus::Draft);
                self.history.upsert_front(Draft {
                    id: generated.id,
                    subject: generated.subject,
                    recipient: pending.request.recipient_email,
                    tone: pending.request.tone,
                    status: DraftStatus::Draft,
                    created_at: Utc::now(),
                    body: generated.body,
                    sent_at: None,
                });
                self.prompt.clear();
                self.notice = Some(GENERATED_NOTICE.to_string());
                GenerateOutcome::Applied
            }
            Err(err) if err.is_unreachable() => {
                tracing::error!("Generator unreachable: {}", err);
                self.error = Some(UNAVAILABLE_MESSAGE.to_string());
                GenerateOutcome::Unavailable(Fallback {
                    ticket: pending.ticket,
                    prompt: pending.raw_prompt,
                    recipient: pending.request.recipient_email,
                })
            }
            Err(err) => {
                self.fail(&err);
                GenerateOutcome::Failed(err)
            }
        }
    }

    /// Shows the offline placeholder unless a newer action superseded it.
    ///
    /// The placeholder has no server id, so it cannot be sent.
    pub fn apply_fallback(&mut self, fallback: Fallback) -> Outcome {
        if !self.generate_guard.is_current(fallback.ticket) {
            tracing::debug!("Discarding stale placeholder {}", fallback.ticket);
            return Outcome::Stale;
        }
        self.subject = fallback.subject();
        self.body = fallback.body();
        self.draft_id = None;
        self.status = Some(DraftStatus::Draft);
        Outcome::Applied
    }

    pub fn begin_refine(
        &mut self,
        instructions: &str,
        credential: Option<&Credential>,
    ) -> Result<PendingRefine, ValidationError> {
        let Some(draft_id) = self.draft_id else {
            return Err(self.reject(ValidationError::MissingDraft));
        };
        if instructions.trim().is_empty() {
            return Err(self.reject(ValidationError::EmptyInstructions));
        }
        if self.refining {
            return Err(self.reject(ValidationError::Busy));
        }
        self.error = None;
        if credential.is_none() {
            return Err(self.reject(ValidationError::MissingCredential));
        }

        let ticket = self.refine_guard.issue();
        self.refining = true;
        tracing::info!("Refining draft {} (ticket {})", draft_id, ticket);
        Ok(PendingRefine {
            ticket,
            request: RefineDraftRequest {
                draft_id,
                instructions: instructions.trim().to_string(),
            },
        })
    }

    pub fn finish_refine(
        &mut self,
        pending: PendingRefine,
        result: Result<GeneratedDraft, ApiError>,
    ) -> Outcome {
        if !self.refine_guard.is_current(pending.ticket) {
            tracing::debug!("Discarding stale refinement {}", pending.ticket);
            return Outcome::Stale;
        }
        self.refining = false;

        match result {
            Ok(refined) => {
                self.subject = refined.subject.clone();
                self.body = refined.body.clone();
                self.draft_id = Some(refined.id);
                self.status = Some(DraftStatus::Draft);
                self.history.upsert_front(Draft {
                    id: refined.id,
                    subject: refined.subject,
                    recipient: self.recipient.clone(),
                    tone: self.tone,
                    status: DraftStatus::Draft,
                    created_at: Utc::now(),
                    body: refined.body,
                    sent_at: None,
                });
                self.notice = Some(REFINED_NOTICE.to_string());
                Outcome::Applied
            }
            Err(err) => {
                self.fail(&err);
                Outcome::Failed(err)
            }
        }
    }

    pub fn begin_send(
        &mut self,
        credential: Option<&Credential>,
    ) -> Result<PendingSend, ValidationError> {
        let Some(draft_id) = self.draft_id else {
            return Err(self.reject(ValidationError::MissingDraft));
        };
        if self.body.trim().is_empty() {
            return Err(self.reject(ValidationError::MissingDraft));
        }
        if self.sending {
            return Err(self.reject(ValidationError::Busy));
        }
        if self.status == Some(DraftStatus::Sent) {
            return Err(self.reject(ValidationError::AlreadySent));
        }
        self.error = None;
        if credential.is_none() {
            return Err(self.reject(ValidationError::MissingCredential));
        }
        if self.recipient.trim().is_empty() {
            return Err(self.reject(ValidationError::MissingRecipient));
        }

        let ticket = self.send_guard.issue();
        self.sending = true;
        tracing::info!("Sending draft {} (ticket {})", draft_id, ticket);
        Ok(PendingSend {
            ticket,
            request: SendDraftRequest::managed(draft_id),
        })
    }

    pub fn finish_send(&mut self, pending: PendingSend, result: Result<(), ApiError>) -> Outcome {
        if !self.send_guard.is_current(pending.ticket) {
            tracing::debug!("Discarding stale send {}", pending.ticket);
            return Outcome::Stale;
        }
        self.sending = false;
        let id = pending.request.draft_id;

        match result {
            Ok(()) => {
                tracing::info!("Sent draft {}", id);
                let now = Utc::now();
                self.status = Some(DraftStatus::Sent);
                self.history.mark_status(id, DraftStatus::Sent, Some(now));
                self.notice = Some(SENT_NOTICE.to_string());
                Outcome::Applied
            }
            Err(err) => {
                self.status = Some(DraftStatus::Failed);
                self.history.mark_status(id, DraftStatus::Failed, None);
                self.fail(&err);
                Outcome::Failed(err)
            }
        }
    }

    /// Stamps a listing request. Without a credential the listing is skipped.
    pub fn begin_load_drafts(&mut self, credential: Option<&Credential>) -> Option<Ticket> {
        credential.map(|_| self.list_guard.issue())
    }

    /// Replaces history with the listing and loads its first entry, unless
    /// a generate, refine or send is still running.
    ///
    /// Failures are logged only.
    pub fn finish_load_drafts(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Draft>, ApiError>,
    ) -> Outcome {
        if !self.list_guard.is_current(ticket) {
            tracing::debug!("Discarding stale draft listing {}", ticket);
            return Outcome::Stale;
        }
        match result {
            Ok(drafts) => {
                tracing::info!("Loaded {} drafts", drafts.len());
                self.history.replace_all(drafts);
                if self.request_in_flight() {
                    tracing::debug!("Keeping the composer while a request is running");
                } else if let Some(first) = self.history.first().map(|d| d.id) {
                    self.load_from_history(first);
                }
                Outcome::Applied
            }
            Err(err) => {
                tracing::error!("Failed to load drafts: {}", err);
                Outcome::Failed(err)
            }
        }
    }

    fn request_in_flight(&self) -> bool {
        self.generating || self.refining || self.sending
    }

    /// Loads a history entry into the editor. Outstanding requests are
    /// discarded when they complete.
    pub fn load_from_history(&mut self, id: DraftId) -> bool {
        let Some(draft) = self.history.get(id).cloned() else {
            return false;
        };
        self.generate_guard.invalidate();
        self.refine_guard.invalidate();
        self.send_guard.invalidate();
        self.generating = false;
        self.refining = false;
        self.sending = false;

        self.subject = draft.subject;
        self.recipient = draft.recipient;
        self.tone = draft.tone;
        self.body = draft.body;
        self.draft_id = Some(draft.id);
        self.status = Some(draft.status);
        self.error = None;
        true
    }

    /// Generates a draft, showing the placeholder after the fallback delay
    /// when the generator is unreachable.
    pub async fn generate(
        &mut self,
        api: &dyn EmailApi,
        credential: Option<&Credential>,
    ) -> Result<(), Error> {
        let pending = self.begin_generate(credential)?;
        let Some(credential) = credential else {
            return Err(ValidationError::MissingCredential.into());
        };
        let result = api.generate_draft(credential, &pending.request).await;

        match self.finish_generate(pending, result) {
            GenerateOutcome::Applied | GenerateOutcome::Stale => Ok(()),
            GenerateOutcome::Failed(err) => Err(err.into()),
            GenerateOutcome::Unavailable(fallback) => {
                let reason = ApiError::Unreachable(UNAVAILABLE_MESSAGE.to_string());
                tokio::time::sleep(self.fallback_delay).await;
                self.apply_fallback(fallback);
                Err(reason.into())
            }
        }
    }

    /// Re-runs generation with the current prompt.
    pub async fn regenerate(
        &mut self,
        api: &dyn EmailApi,
        credential: Option<&Credential>,
    ) -> Result<(), Error> {
        if self.prompt.trim().is_empty() {
            return Ok(());
        }
        self.generate(api, credential).await
    }

    pub async fn refine(
        &mut self,
        instructions: &str,
        api: &dyn EmailApi,
        credential: Option<&Credential>,
    ) -> Result<(), Error> {
        let pending = self.begin_refine(instructions, credential)?;
        let Some(credential) = credential else {
            return Err(ValidationError::MissingCredential.into());
        };
        let result = api.refine_draft(credential, &pending.request).await;
        into_result(self.finish_refine(pending, result))
    }

    pub async fn send(
        &mut self,
        api: &dyn EmailApi,
        credential: Option<&Credential>,
    ) -> Result<(), Error> {
        let pending = self.begin_send(credential)?;
        let Some(credential) = credential else {
            return Err(ValidationError::MissingCredential.into());
        };
        let result = api.send_draft(credential, &pending.request).await;
        into_result(self.finish_send(pending, result))
    }

    pub async fn load_drafts(
        &mut self,
        api: &dyn EmailApi,
        credential: Option<&Credential>,
    ) -> Result<(), Error> {
        let (Some(ticket), Some(credential)) = (self.begin_load_drafts(credential), credential)
        else {
            return Ok(());
        };
        let result = api.list_drafts(credential).await;
        into_result(self.finish_load_drafts(ticket, result))
    }
}

fn into_result(outcome: Outcome) -> Result<(), Error> {
    match outcome {
        Outcome::Applied | Outcome::Stale => Ok(()),
        Outcome::Failed(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use mockall::predicate::always;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::services::MockEmailApi;

    fn credential() -> Credential {
        Credential::new("secret").unwrap()
    }

    fn assistant() -> MailAssistant {
        MailAssistant::new(Duration::ZERO)
    }

    fn generated(id: i64) -> GeneratedDraft {
        GeneratedDraft {
            id: DraftId(id),
            subject: "Q3 report".into(),
            body: "Hi team,\n\nPlease send the Q3 report.".into(),
        }
    }

    fn stored(id: i64, subject: &str, status: DraftStatus) -> Draft {
        Draft {
            id: DraftId(id),
            subject: subject.into(),
            recipient: format!("user{}@example.com", id),
            tone: Tone::Formal,
            status,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            body: format!("Body of {}", id),
            sent_at: None,
        }
    }

    #[tokio::test]
    async fn successful_generation_replaces_draft_and_clears_prompt() {
        let mut api = MockEmailApi::new();
        api.expect_generate_draft()
            .withf(|_, request| {
                request.prompt == "Ask for the Q3 report"
                    && request.tone == Tone::Friendly
                    && request.recipient_email == "ops@example.com"
            })
            .times(1)
            .returning(|_, _| Ok(generated(41)));

        let mut mail = assistant();
        mail.set_prompt("  Ask for the Q3 report ");
        mail.set_tone(Tone::Friendly);
        mail.set_recipient("ops@example.com");
        mail.generate(&api, Some(&credential())).await.unwrap();

        assert_eq!(mail.subject(), "Q3 report");
        assert_eq!(mail.body(), "Hi team,\n\nPlease send the Q3 report.");
        assert_eq!(mail.draft_id(), Some(DraftId(41)));
        assert_eq!(mail.status(), Some(DraftStatus::Draft));
        assert_eq!(mail.prompt(), "");
        assert!(!mail.is_generating());
        assert_eq!(mail.notice(), Some("Email generated successfully"));

        let entry = mail.history().first().unwrap();
        assert_eq!(entry.id, DraftId(41));
        assert_eq!(entry.recipient, "ops@example.com");
        assert_eq!(entry.tone, Tone::Friendly);
    }

    #[tokio::test]
    async fn empty_prompt_issues_no_request() {
        let mut api = MockEmailApi::new();
        api.expect_generate_draft().times(0);

        let mut mail = assistant();
        mail.set_subject("Existing");
        mail.set_body("Existing body");
        mail.set_prompt("   ");

        let err = mail.generate(&api, Some(&credential())).await.unwrap_err();
        assert_eq!(err, Error::Validation(ValidationError::EmptyPrompt));
        assert_eq!(mail.subject(), "Existing");
        assert_eq!(mail.body(), "Existing body");
        assert_eq!(mail.error(), None);
    }

    #[tokio::test]
    async fn missing_credential_is_reported() {
        let mut api = MockEmailApi::new();
        api.expect_generate_draft().times(0);

        let mut mail = assistant();
        mail.set_prompt("hello");
        let err = mail.generate(&api, None).await.unwrap_err();

        assert_eq!(err, Error::Validation(ValidationError::MissingCredential));
        assert_eq!(mail.error(), Some("Authentication required."));
        assert!(!mail.is_generating());
    }

    #[test]
    fn second_generation_while_in_flight_is_rejected() {
        let mut mail = assistant();
        mail.set_prompt("hello");
        let cred = credential();

        mail.begin_generate(Some(&cred)).unwrap();
        assert_eq!(
            mail.begin_generate(Some(&cred)),
            Err(ValidationError::Busy)
        );
    }

    #[tokio::test]
    async fn unreachable_generator_shows_placeholder() {
        let mut api = MockEmailApi::new();
        api.expect_generate_draft()
            .times(1)
            .returning(|_, _| Err(ApiError::Unreachable("connection refused".into())));

        let mut mail = assistant();
        mail.set_prompt("Remind Sam about the invoice");
        let err = mail.generate(&api, Some(&credential())).await.unwrap_err();

        assert!(matches!(err, Error::Api(ApiError::Unreachable(_))));
        assert_eq!(mail.error(), Some(UNAVAILABLE_MESSAGE));
        assert_eq!(mail.subject(), "Regarding: Remind Sam about the invoice...");
        assert_eq!(
            mail.body(),
            "Dear Recipient,\n\nI hope this email finds you well. Remind Sam about the invoice\n\nBest regards,\n[Your Name]"
        );
        assert_eq!(mail.draft_id(), None);
        assert_eq!(mail.prompt(), "Remind Sam about the invoice");
        assert!(mail.history().is_empty());
    }

    #[test]
    fn placeholder_subject_truncates_to_fifty_chars() {
        let fallback = Fallback {
            ticket: 1,
            prompt: "x".repeat(80),
            recipient: "Dana".into(),
        };
        assert_eq!(fallback.subject(), format!("Regarding: {}...", "x".repeat(50)));
        assert!(fallback.body().starts_with("Dear Dana,"));
    }

    #[test]
    fn placeholder_is_dropped_after_newer_generation() {
        let mut mail = assistant();
        let cred = credential();
        mail.set_prompt("first");
        let pending = mail.begin_generate(Some(&cred)).unwrap();
        let GenerateOutcome::Unavailable(fallback) =
            mail.finish_generate(pending, Err(ApiError::Unreachable("404".into())))
        else {
            panic!("expected placeholder");
        };

        mail.begin_generate(Some(&cred)).unwrap();
        assert_eq!(mail.apply_fallback(fallback), Outcome::Stale);
        assert_eq!(mail.subject(), "");
    }

    #[tokio::test]
    async fn remote_failure_keeps_prompt_and_surfaces_message() {
        let mut api = MockEmailApi::new();
        api.expect_generate_draft().times(1).returning(|_, _| {
            Err(ApiError::remote(Some(500), Some("Model overloaded".into()), "Generation failed"))
        });

        let mut mail = assistant();
        mail.set_prompt("hello");
        mail.generate(&api, Some(&credential())).await.unwrap_err();

        assert_eq!(mail.error(), Some("Model overloaded"));
        assert_eq!(mail.prompt(), "hello");
        assert_eq!(mail.status(), None);
    }

    #[tokio::test]
    async fn send_marks_draft_and_history_sent() {
        let mut api = MockEmailApi::new();
        api.expect_generate_draft()
            .returning(|_, _| Ok(generated(7)));
        api.expect_send_draft()
            .withf(|_, request| {
                request.draft_id == DraftId(7)
                    && request.use_managed_sender
                    && request.additional_recipients.is_empty()
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let cred = credential();
        let mut mail = assistant();
        mail.set_prompt("hello");
        mail.set_recipient("sam@example.com");
        mail.generate(&api, Some(&cred)).await.unwrap();
        mail.send(&api, Some(&cred)).await.unwrap();

        assert_eq!(mail.status(), Some(DraftStatus::Sent));
        assert_eq!(mail.status_label(), "Sent");
        let entry = mail.history().get(DraftId(7)).unwrap();
        assert_eq!(entry.status, DraftStatus::Sent);
        assert!(entry.sent_at.is_some());

        let err = mail.send(&api, Some(&cred)).await.unwrap_err();
        assert_eq!(err, Error::Validation(ValidationError::AlreadySent));
    }

    #[tokio::test]
    async fn send_failure_allows_retry() {
        let mut api = MockEmailApi::new();
        api.expect_send_draft()
            .times(1)
            .returning(|_, _| Err(ApiError::remote(Some(502), None, "Sending failed")));
        api.expect_send_draft().times(1).returning(|_, _| Ok(()));

        let cred = credential();
        let mut mail = assistant();
        mail.history_mut().upsert_front(stored(3, "Kickoff", DraftStatus::Draft));
        mail.load_from_history(DraftId(3));

        mail.send(&api, Some(&cred)).await.unwrap_err();
        assert_eq!(mail.status(), Some(DraftStatus::Failed));
        assert_eq!(mail.error(), Some("Sending failed"));
        assert_eq!(
            mail.history().get(DraftId(3)).unwrap().status,
            DraftStatus::Failed
        );

        mail.send(&api, Some(&cred)).await.unwrap();
        assert_eq!(mail.status(), Some(DraftStatus::Sent));
    }

    #[tokio::test]
    async fn send_requires_recipient() {
        let mut api = MockEmailApi::new();
        api.expect_send_draft().times(0);

        let mut mail = assistant();
        let mut draft = stored(3, "Kickoff", DraftStatus::Draft);
        draft.recipient.clear();
        mail.history_mut().upsert_front(draft);
        mail.load_from_history(DraftId(3));

        let err = mail.send(&api, Some(&credential())).await.unwrap_err();
        assert_eq!(err, Error::Validation(ValidationError::MissingRecipient));
        assert_eq!(mail.error(), Some("Please add a recipient"));
        assert_eq!(mail.status(), Some(DraftStatus::Draft));
    }

    #[test]
    fn send_without_draft_is_silent() {
        let mut mail = assistant();
        mail.set_body("typed by hand");
        assert_eq!(
            mail.begin_send(Some(&credential())),
            Err(ValidationError::MissingDraft)
        );
        assert_eq!(mail.error(), None);
        assert!(!mail.can_send());
    }

    #[test]
    fn reload_from_history_copies_entry_exactly() {
        let mut mail = assistant();
        mail.history_mut().replace_all(vec![
            stored(1, "First", DraftStatus::Draft),
            stored(2, "Second", DraftStatus::Sent),
        ]);

        assert!(mail.load_from_history(DraftId(2)));
        assert_eq!(mail.subject(), "Second");
        assert_eq!(mail.recipient(), "user2@example.com");
        assert_eq!(mail.tone(), Tone::Formal);
        assert_eq!(mail.body(), "Body of 2");
        assert_eq!(mail.draft_id(), Some(DraftId(2)));
        assert_eq!(mail.status(), Some(DraftStatus::Sent));

        assert!(!mail.load_from_history(DraftId(99)));
    }

    #[test]
    fn stale_generation_leaves_state_unchanged() {
        let mut mail = assistant();
        mail.history_mut().upsert_front(stored(1, "Saved", DraftStatus::Draft));
        mail.set_prompt("new prompt");
        let pending = mail.begin_generate(Some(&credential())).unwrap();

        mail.load_from_history(DraftId(1));
        let outcome = mail.finish_generate(pending, Ok(generated(50)));

        assert_eq!(outcome, GenerateOutcome::Stale);
        assert_eq!(mail.subject(), "Saved");
        assert_eq!(mail.draft_id(), Some(DraftId(1)));
        assert_eq!(mail.history().len(), 1);
        assert_eq!(mail.prompt(), "new prompt");
    }

    #[tokio::test]
    async fn listing_replaces_history_and_loads_first() {
        let mut api = MockEmailApi::new();
        api.expect_list_drafts().with(always()).times(1).returning(|_| {
            Ok(vec![
                stored(9, "Latest", DraftStatus::Draft),
                stored(9, "Duplicate", DraftStatus::Draft),
                stored(4, "Older", DraftStatus::Sent),
            ])
        });

        let mut mail = assistant();
        mail.load_drafts(&api, Some(&credential())).await.unwrap();

        assert_eq!(mail.history().len(), 2);
        assert_eq!(mail.subject(), "Latest");
        assert_eq!(mail.draft_id(), Some(DraftId(9)));
    }

    #[test]
    fn listing_during_generation_keeps_the_new_draft() {
        let mut mail = assistant();
        let list_ticket = mail.begin_load_drafts(Some(&credential())).unwrap();
        mail.set_prompt("Ask for the Q3 report");
        let pending = mail.begin_generate(Some(&credential())).unwrap();

        let listed = mail.finish_load_drafts(
            list_ticket,
            Ok(vec![stored(4, "Older", DraftStatus::Sent)]),
        );
        let outcome = mail.finish_generate(pending, Ok(generated(99)));

        assert_eq!(listed, Outcome::Applied);
        assert_eq!(outcome, GenerateOutcome::Applied);
        assert_eq!(mail.draft_id(), Some(DraftId(99)));
        assert_eq!(mail.subject(), "Q3 report");
        assert!(mail.history().get(DraftId(99)).is_some());
        assert!(mail.history().get(DraftId(4)).is_some());
    }

    #[tokio::test]
    async fn listing_failure_leaves_state() {
        let mut api = MockEmailApi::new();
        api.expect_list_drafts()
            .returning(|_| Err(ApiError::Timeout));

        let mut mail = assistant();
        mail.set_subject("Keep me");
        assert!(mail.load_drafts(&api, Some(&credential())).await.is_err());
        assert_eq!(mail.subject(), "Keep me");
        assert_eq!(mail.error(), None);
    }

    #[tokio::test]
    async fn listing_without_credential_is_skipped() {
        let mut api = MockEmailApi::new();
        api.expect_list_drafts().times(0);

        let mut mail = assistant();
        mail.load_drafts(&api, None).await.unwrap();
    }

    #[tokio::test]
    async fn refine_replaces_subject_and_body() {
        let mut api = MockEmailApi::new();
        api.expect_refine_draft()
            .withf(|_, request| request.draft_id == DraftId(1) && request.instructions == "shorter")
            .times(1)
            .returning(|_, _| {
                Ok(GeneratedDraft {
                    id: DraftId(1),
                    subject: "Short".into(),
                    body: "Brief.".into(),
                })
            });

        let mut mail = assistant();
        mail.history_mut().upsert_front(stored(1, "Long", DraftStatus::Draft));
        mail.load_from_history(DraftId(1));
        mail.refine(" shorter ", &api, Some(&credential())).await.unwrap();

        assert_eq!(mail.subject(), "Short");
        assert_eq!(mail.body(), "Brief.");
        assert_eq!(mail.history().get(DraftId(1)).unwrap().subject, "Short");
    }

    #[test]
    fn clipboard_text_and_labels() {
        let mut mail = assistant();
        assert_eq!(mail.clipboard_text(), "");
        assert_eq!(mail.status_label(), "Input needed");

        mail.set_subject("Hello");
        mail.set_body("World");
        assert_eq!(mail.clipboard_text(), "Subject: Hello\n\nWorld");
        assert_eq!(mail.status_label(), "Ready");
    }
}
