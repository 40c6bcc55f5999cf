//! Conversational task generator state.
//!
//! The user describes work in free text; the analyzer proposes tasks; the
//! user confirms and the tasks are materialized into the selected sprint.
//! The transcript is append-only until cleared.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::app::events::{AppEvent, EventBus};
use crate::app::guard::{Outcome, RequestGuard, Ticket};
use crate::domain::{
    ConversationTurn, CreatedTask, NewTaskRequest, ProjectId, Sprint, SprintId, SuggestedTask,
    UserId,
};
use crate::error::{ApiError, Error, ValidationError};
use crate::services::materializer::{self, TaskContext};
use crate::services::{AnalysisRequest, Credential, ProjectAnalysis, ProjectAnalysisApi, TaskApi};

/// Maximum number of transcript entries to keep.
pub const MAX_TRANSCRIPT_SIZE: usize = 200;

const ANALYZING_MESSAGE: &str =
    "AI is analyzing your request. This may take 1-2 minutes for complex requests...";
const UNKNOWN_SPRINT: &str = "Unknown Sprint";

#[derive(Debug, Clone, PartialEq)]
pub struct PendingAnalysis {
    pub ticket: Ticket,
    pub request: AnalysisRequest,
    sprint_id: SprintId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingConfirm {
    pub ticket: Ticket,
    pub requests: Vec<NewTaskRequest>,
    sprint_id: SprintId,
}

pub struct TaskAssistant {
    project_id: Option<ProjectId>,
    user_id: Option<UserId>,
    sprints: Vec<Sprint>,
    selected_sprint: Option<SprintId>,
    prompt: String,
    transcript: VecDeque<ConversationTurn>,
    error: Option<String>,
    analyzing: bool,
    adding: bool,
    open: bool,
    analyze_guard: RequestGuard,
    confirm_guard: RequestGuard,
}

impl TaskAssistant {
    pub fn new(project_id: Option<ProjectId>, user_id: Option<UserId>) -> Self {
        Self {
            project_id,
            user_id,
            sprints: Vec::new(),
            selected_sprint: None,
            prompt: String::new(),
            transcript: VecDeque::new(),
            error: None,
            analyzing: false,
            adding: false,
            open: false,
            analyze_guard: RequestGuard::new(),
            confirm_guard: RequestGuard::new(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn transcript(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.transcript.iter()
    }

    pub fn turn(&self, index: usize) -> Option<&ConversationTurn> {
        self.transcript.get(index)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.analyzing || self.adding
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn is_adding(&self) -> bool {
        self.adding
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn sprints(&self) -> &[Sprint] {
        &self.sprints
    }

    pub fn selected_sprint(&self) -> Option<SprintId> {
        self.selected_sprint
    }

    /// Replaces the sprint list and selects the first active sprint, or the
    /// first sprint when none is active.
    pub fn set_sprints(&mut self, sprints: Vec<Sprint>) {
        self.selected_sprint = sprints
            .iter()
            .find(|s| s.active)
            .or_else(|| sprints.first())
            .map(|s| s.id);
        self.sprints = sprints;
    }

    pub fn select_sprint(&mut self, id: SprintId) {
        self.selected_sprint = Some(id);
    }

    pub fn sprint_name(&self, id: SprintId) -> &str {
        self.sprints
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.name.as_str())
            .unwrap_or(UNKNOWN_SPRINT)
    }

    /// Clears the transcript and error. Outstanding requests are discarded.
    pub fn clear_conversation(&mut self) {
        self.transcript.clear();
        self.error = None;
        self.analyze_guard.invalidate();
        self.confirm_guard.invalidate();
        self.analyzing = false;
        self.adding = false;
    }

    fn push(&mut self, turn: ConversationTurn) {
        self.transcript.push_back(turn);
        while self.transcript.len() > MAX_TRANSCRIPT_SIZE {
            self.transcript.pop_front();
        }
    }

    fn reject(&mut self, err: ValidationError) -> ValidationError {
        if err.is_user_visible() {
            tracing::warn!("Task assistant rejected action: {}", err);
            self.error = Some(err.to_string());
        }
        err
    }

    /// Validates the prompt, records the user turn and a loading turn, and
    /// stamps an analysis request.
    pub fn begin_analyze(&mut self) -> Result<PendingAnalysis, ValidationError> {
        if self.prompt.trim().is_empty() {
            return Err(self.reject(ValidationError::EmptyDescription));
        }
        let Some(sprint_id) = self.selected_sprint else {
            return Err(self.reject(ValidationError::MissingSprint));
        };
        if self.analyzing {
            return Err(self.reject(ValidationError::Busy));
        }

        self.error = None;
        self.analyzing = true;
        let ticket = self.analyze_guard.issue();
        let sprint_name = self.sprint_name(sprint_id).to_string();

        self.push(ConversationTurn::user(self.prompt.clone()).with_sprint(None, sprint_name));
        self.push(ConversationTurn::loading(ANALYZING_MESSAGE, ticket));

        tracing::info!("Analyzing project description (ticket {})", ticket);
        Ok(PendingAnalysis {
            ticket,
            request: AnalysisRequest::new(self.prompt.clone()),
            sprint_id,
        })
    }

    pub fn finish_analyze(
        &mut self,
        pending: PendingAnalysis,
        result: Result<ProjectAnalysis, ApiError>,
    ) -> Outcome {
        if !self.analyze_guard.is_current(pending.ticket) {
            tracing::debug!("Discarding stale analysis {}", pending.ticket);
            return Outcome::Stale;
        }
        self.analyzing = false;
        self.transcript
            .retain(|turn| turn.loading != Some(pending.ticket));

        match result {
            Ok(analysis) => {
                let sprint_id = pending.sprint_id;
                let sprint_name = self.sprint_name(sprint_id).to_string();
                let count = analysis.tasks.len();
                tracing::info!("Analysis returned {} tasks", count);

                self.push(
                    ConversationTurn::ai(analysis.summary())
                        .with_tasks(analysis.tasks.clone())
                        .with_sprint(Some(sprint_id), sprint_name.clone()),
                );
                if count > 0 {
                    self.push(
                        ConversationTurn::system(format!(
                            "Would you like to add {} tasks to \"{}\"?",
                            count, sprint_name
                        ))
                        .with_tasks(analysis.tasks)
                        .with_sprint(Some(sprint_id), sprint_name),
                    );
                }
                self.prompt.clear();
                Outcome::Applied
            }
            Err(err) => {
                tracing::error!("Project analysis failed: {}", err);
                self.error = Some(err.to_string());
                self.push(ConversationTurn::error(format!("Error: {}", err)));
                Outcome::Failed(err)
            }
        }
    }

    /// Validates the context and plans one creation request per task.
    pub fn begin_confirm(
        &mut self,
        tasks: &[SuggestedTask],
        sprint_id: Option<SprintId>,
        credential: Option<&Credential>,
        now: DateTime<Utc>,
    ) -> Result<PendingConfirm, ValidationError> {
        let (Some(project_id), Some(sprint_id)) = (self.project_id, sprint_id) else {
            return Err(self.reject(ValidationError::MissingContext));
        };
        if self.adding {
            return Err(self.reject(ValidationError::Busy));
        }
        if credential.is_none() {
            return Err(self.reject(ValidationError::MissingCredential));
        }

        self.error = None;
        self.adding = true;
        let ticket = self.confirm_guard.issue();
        let context = TaskContext {
            project_id,
            sprint_id,
            assigned_by: self.user_id,
        };
        Ok(PendingConfirm {
            ticket,
            requests: materializer::plan(tasks, &context, now),
            sprint_id,
        })
    }

    /// Applies a materialization result. Created tasks are always published
    /// to `events`, even when the transcript has moved on, since they exist
    /// in the backend either way.
    pub fn finish_confirm(
        &mut self,
        pending: PendingConfirm,
        result: Result<Vec<CreatedTask>, ApiError>,
        events: &EventBus,
    ) -> Outcome {
        if let Ok(created) = &result {
            events.publish(AppEvent::TasksCreated {
                tasks: created.clone(),
            });
        }
        if !self.confirm_guard.is_current(pending.ticket) {
            tracing::debug!("Discarding stale task creation {}", pending.ticket);
            return Outcome::Stale;
        }
        self.adding = false;

        match result {
            Ok(created) => {
                let sprint_name = self.sprint_name(pending.sprint_id).to_string();
                tracing::info!("Added {} tasks to {}", created.len(), sprint_name);
                self.push(ConversationTurn::system(format!(
                    "Successfully added {} tasks to \"{}\"!",
                    created.len(),
                    sprint_name
                )));
                Outcome::Applied
            }
            Err(err) => {
                tracing::error!("Adding tasks failed: {}", err);
                self.error = Some(format!("Failed to add tasks to project: {}", err));
                self.push(ConversationTurn::error(format!(
                    "Error: Failed to add tasks to project - {}",
                    err
                )));
                Outcome::Failed(err)
            }
        }
    }

    /// Runs an analysis of the current prompt.
    pub async fn submit_prompt(&mut self, api: &dyn ProjectAnalysisApi) -> Result<(), Error> {
        let pending = self.begin_analyze()?;
        let result = api.analyze_project(&pending.request).await;
        match self.finish_analyze(pending, result) {
            Outcome::Failed(err) => Err(err.into()),
            Outcome::Applied | Outcome::Stale => Ok(()),
        }
    }

    /// Creates `tasks` in `sprint_id` and returns the created records.
    pub async fn confirm_add_tasks(
        &mut self,
        tasks: &[SuggestedTask],
        sprint_id: Option<SprintId>,
        api: &dyn TaskApi,
        credential: Option<&Credential>,
        events: &EventBus,
    ) -> Result<Vec<CreatedTask>, Error> {
        let pending = self.begin_confirm(tasks, sprint_id, credential, Utc::now())?;
        let Some(credential) = credential else {
            return Err(ValidationError::MissingCredential.into());
        };
        let result = materializer::materialize(api, credential, &pending.requests).await;
        let created = result.clone().unwrap_or_default();
        match self.finish_confirm(pending, result, events) {
            Outcome::Failed(err) => Err(err.into()),
            Outcome::Applied | Outcome::Stale => Ok(created),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::domain::TurnKind;
    use crate::services::{MockProjectAnalysisApi, MockTaskApi};

    fn assistant() -> TaskAssistant {
        let mut tasks = TaskAssistant::new(Some(ProjectId(3)), Some(UserId(7)));
        tasks.set_sprints(vec![
            Sprint::new(SprintId(10), "Sprint 1"),
            Sprint::new(SprintId(11), "Sprint 2").active(),
        ]);
        tasks
    }

    fn analysis(names: &[&str]) -> ProjectAnalysis {
        ProjectAnalysis {
            tasks: names.iter().map(|n| SuggestedTask::new(*n).with_hours(4.0)).collect(),
            timeline_weeks: Some(serde_json::json!(3)),
            tech_stack: vec!["Rust".into()],
            project_title: Some("Shop".into()),
            error: None,
        }
    }

    fn kinds(tasks: &TaskAssistant) -> Vec<TurnKind> {
        tasks.transcript().map(|t| t.kind).collect()
    }

    fn created(request: &NewTaskRequest) -> CreatedTask {
        CreatedTask {
            id: Some(1),
            name: request.name.clone(),
            external_id: Some(request.external_id.clone()),
            due_date: Some(request.due_date),
            extra: Default::default(),
        }
    }

    #[test]
    fn default_sprint_prefers_active() {
        let tasks = assistant();
        assert_eq!(tasks.selected_sprint(), Some(SprintId(11)));

        let mut tasks = TaskAssistant::new(None, None);
        tasks.set_sprints(vec![Sprint::new(SprintId(4), "A"), Sprint::new(SprintId(5), "B")]);
        assert_eq!(tasks.selected_sprint(), Some(SprintId(4)));

        tasks.set_sprints(Vec::new());
        assert_eq!(tasks.selected_sprint(), None);
        assert_eq!(tasks.sprint_name(SprintId(4)), "Unknown Sprint");
    }

    #[tokio::test]
    async fn empty_description_is_rejected() {
        let mut api = MockProjectAnalysisApi::new();
        api.expect_analyze_project().times(0);

        let mut tasks = assistant();
        tasks.set_prompt("  ");
        assert!(tasks.submit_prompt(&api).await.is_err());
        assert_eq!(
            tasks.error(),
            Some("Please describe what tasks you want to create")
        );
        assert_eq!(tasks.transcript().count(), 0);
    }

    #[tokio::test]
    async fn missing_sprint_is_rejected() {
        let mut api = MockProjectAnalysisApi::new();
        api.expect_analyze_project().times(0);

        let mut tasks = TaskAssistant::new(Some(ProjectId(3)), None);
        tasks.set_prompt("Build a shop");
        let err = tasks.submit_prompt(&api).await.unwrap_err();
        assert_eq!(err, Error::Validation(ValidationError::MissingSprint));
        assert_eq!(tasks.error(), Some("Please select a sprint first"));
    }

    #[tokio::test]
    async fn successful_analysis_offers_confirmation() {
        let mut api = MockProjectAnalysisApi::new();
        api.expect_analyze_project()
            .withf(|request| {
                request.description == "Build a shop" && request.project_type == "general"
            })
            .times(1)
            .returning(|_| Ok(analysis(&["Cart", "Checkout"])));

        let mut tasks = assistant();
        tasks.set_prompt("Build a shop");
        tasks.submit_prompt(&api).await.unwrap();

        assert_eq!(kinds(&tasks), vec![TurnKind::User, TurnKind::Ai, TurnKind::System]);
        assert_eq!(tasks.turn(0).unwrap().sprint_name.as_deref(), Some("Sprint 2"));
        assert_eq!(
            tasks.turn(1).unwrap().content,
            "I've analyzed \"Shop\" and generated 2 tasks. Estimated timeline: 3 weeks. Technology stack: Rust"
        );

        let confirmation = tasks.turn(2).unwrap();
        assert!(confirmation.is_confirmation());
        assert_eq!(confirmation.content, "Would you like to add 2 tasks to \"Sprint 2\"?");
        assert_eq!(confirmation.sprint_id, Some(SprintId(11)));
        assert_eq!(tasks.prompt(), "");
        assert!(!tasks.is_busy());
    }

    #[tokio::test]
    async fn no_tasks_means_no_confirmation() {
        let mut api = MockProjectAnalysisApi::new();
        api.expect_analyze_project()
            .returning(|_| Ok(analysis(&[])));

        let mut tasks = assistant();
        tasks.set_prompt("Something vague");
        tasks.submit_prompt(&api).await.unwrap();

        assert_eq!(kinds(&tasks), vec![TurnKind::User, TurnKind::Ai]);
    }

    #[tokio::test]
    async fn analysis_failure_appends_error_turn() {
        let mut api = MockProjectAnalysisApi::new();
        api.expect_analyze_project()
            .returning(|_| {
                Err(ApiError::remote(
                    None,
                    Some("model overloaded".into()),
                    "Analysis failed",
                ))
            });

        let mut tasks = assistant();
        tasks.set_prompt("Build a shop");
        tasks.submit_prompt(&api).await.unwrap_err();

        assert_eq!(kinds(&tasks), vec![TurnKind::User, TurnKind::Error]);
        assert_eq!(tasks.turn(1).unwrap().content, "Error: model overloaded");
        assert_eq!(tasks.error(), Some("model overloaded"));
        assert_eq!(tasks.prompt(), "Build a shop");
    }

    #[test]
    fn loading_turn_shown_while_analyzing() {
        let mut tasks = assistant();
        tasks.set_prompt("Build a shop");
        let pending = tasks.begin_analyze().unwrap();

        assert!(tasks.turn(1).unwrap().is_loading());
        assert_eq!(tasks.begin_analyze(), Err(ValidationError::Busy));

        tasks.finish_analyze(pending, Ok(analysis(&["Cart"])));
        assert!(tasks.transcript().all(|t| !t.is_loading()));
    }

    #[test]
    fn cleared_conversation_drops_late_analysis() {
        let mut tasks = assistant();
        tasks.set_prompt("Build a shop");
        let pending = tasks.begin_analyze().unwrap();

        tasks.clear_conversation();
        let outcome = tasks.finish_analyze(pending, Ok(analysis(&["Cart"])));

        assert_eq!(outcome, Outcome::Stale);
        assert_eq!(tasks.transcript().count(), 0);
        assert_eq!(tasks.error(), None);
    }

    #[tokio::test]
    async fn confirm_creates_every_task() {
        let mut api = MockTaskApi::new();
        api.expect_create_task()
            .withf(|_, request| {
                request.project_id == ProjectId(3)
                    && request.sprint_id == SprintId(11)
                    && request.assigned_by == Some(UserId(7))
                    && request.status == "ready"
            })
            .times(2)
            .returning(|_, request| Ok(created(request)));

        let mut tasks = assistant();
        let credential = Credential::new("tok").unwrap();
        let created = tasks
            .confirm_add_tasks(
                &[SuggestedTask::new("Cart"), SuggestedTask::new("Checkout")],
                Some(SprintId(11)),
                &api,
                Some(&credential),
                &EventBus::new(),
            )
            .await
            .unwrap();

        assert_eq!(created.len(), 2);
        let last = tasks.transcript().last().unwrap();
        assert_eq!(last.kind, TurnKind::System);
        assert_eq!(last.content, "Successfully added 2 tasks to \"Sprint 2\"!");
    }

    #[tokio::test]
    async fn partial_failure_reports_and_appends_error() {
        let mut api = MockTaskApi::new();
        api.expect_create_task().times(3).returning(|_, request| {
            if request.name == "Two" {
                Err(ApiError::remote(
                    Some(400),
                    Some("Invalid sprint".into()),
                    "Failed to create task",
                ))
            } else {
                Ok(created(request))
            }
        });

        let mut tasks = assistant();
        let credential = Credential::new("tok").unwrap();
        let err = tasks
            .confirm_add_tasks(
                &[
                    SuggestedTask::new("One"),
                    SuggestedTask::new("Two"),
                    SuggestedTask::new("Three"),
                ],
                Some(SprintId(11)),
                &api,
                Some(&credential),
                &EventBus::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Api(ApiError::Batch { failed: 1, total: 3, .. })));
        assert_eq!(
            tasks.error(),
            Some("Failed to add tasks to project: Invalid sprint")
        );
        let last = tasks.transcript().last().unwrap();
        assert_eq!(last.kind, TurnKind::Error);
        assert_eq!(last.content, "Error: Failed to add tasks to project - Invalid sprint");
    }

    #[tokio::test]
    async fn confirm_without_project_is_rejected() {
        let mut api = MockTaskApi::new();
        api.expect_create_task().times(0);

        let mut tasks = TaskAssistant::new(None, None);
        let credential = Credential::new("tok").unwrap();
        let err = tasks
            .confirm_add_tasks(
                &[SuggestedTask::new("One")],
                Some(SprintId(1)),
                &api,
                Some(&credential),
                &EventBus::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(err, Error::Validation(ValidationError::MissingContext));
        assert_eq!(tasks.error(), Some("No project or sprint selected"));
    }

    #[tokio::test]
    async fn confirm_without_credential_is_rejected() {
        let mut api = MockTaskApi::new();
        api.expect_create_task().times(0);

        let mut tasks = assistant();
        let err = tasks
            .confirm_add_tasks(
                &[SuggestedTask::new("One")],
                Some(SprintId(11)),
                &api,
                None,
                &EventBus::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(err, Error::Validation(ValidationError::MissingCredential));
        assert!(!tasks.is_adding());
    }

    #[tokio::test]
    async fn cleared_conversation_still_reports_created_tasks() {
        let mut tasks = assistant();
        let credential = Credential::new("tok").unwrap();
        let events = EventBus::new();
        let mut rx = events.subscribe();
        let pending = tasks
            .begin_confirm(
                &[SuggestedTask::new("Cart")],
                Some(SprintId(11)),
                Some(&credential),
                Utc::now(),
            )
            .unwrap();
        let records: Vec<CreatedTask> = pending.requests.iter().map(created).collect();

        tasks.clear_conversation();
        let outcome = tasks.finish_confirm(pending, Ok(records.clone()), &events);

        assert_eq!(outcome, Outcome::Stale);
        assert_eq!(tasks.transcript().count(), 0);
        assert_eq!(
            rx.recv().await.unwrap(),
            AppEvent::TasksCreated { tasks: records }
        );
    }

    #[tokio::test]
    async fn failed_confirm_publishes_nothing() {
        let mut tasks = assistant();
        let credential = Credential::new("tok").unwrap();
        let events = EventBus::new();
        let mut rx = events.subscribe();
        let pending = tasks
            .begin_confirm(
                &[SuggestedTask::new("Cart")],
                Some(SprintId(11)),
                Some(&credential),
                Utc::now(),
            )
            .unwrap();

        let outcome = tasks.finish_confirm(pending, Err(ApiError::Timeout), &events);

        assert!(matches!(outcome, Outcome::Failed(ApiError::Timeout)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn transcript_is_bounded() {
        let mut tasks = assistant();
        for i in 0..(MAX_TRANSCRIPT_SIZE + 5) {
            tasks.push(ConversationTurn::system(format!("turn {}", i)));
        }
        assert_eq!(tasks.transcript().count(), MAX_TRANSCRIPT_SIZE);
        assert_eq!(tasks.turn(0).unwrap().content, "turn 5");
    }
}
