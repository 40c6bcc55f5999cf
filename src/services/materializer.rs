//! Turns suggested tasks into backend task records.
//!
//! Planning is pure: every suggestion becomes a [`NewTaskRequest`] with a
//! normalized priority, a role derived from its type, and a due date about
//! one working day per eight estimated hours from today. The requests are
//! then issued concurrently. All of them run to completion even when some
//! fail, and tasks that were created are never rolled back.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use futures::future::join_all;

use crate::domain::{
    CreatedTask, NewTaskRequest, ProjectId, SprintId, SuggestedTask, TaskPriority, TaskRole,
    UserId,
};
use crate::error::ApiError;
use crate::services::{Credential, TaskApi};

/// Status given to freshly created tasks.
pub const INITIAL_STATUS: &str = "ready";

const HOURS_PER_DAY: f64 = 8.0;

/// Where generated tasks are filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskContext {
    pub project_id: ProjectId,
    pub sprint_id: SprintId,
    /// Recorded as the assigner.
    pub assigned_by: Option<UserId>,
}

/// Working days needed for an estimate. Missing or non-positive estimates
/// take no time.
pub fn working_days(hours: Option<f64>) -> i64 {
    match hours {
        Some(h) if h.is_finite() && h > 0.0 => (h / HOURS_PER_DAY).ceil() as i64,
        _ => 0,
    }
}

pub fn due_date_for(hours: Option<f64>, today: NaiveDate) -> NaiveDate {
    today + Duration::days(working_days(hours))
}

/// External item id: `T`, the last eight digits of the millisecond clock,
/// and three random digits.
pub fn external_id(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().rem_euclid(100_000_000);
    let suffix = uuid::Uuid::new_v4().as_u128() % 1000;
    format!("T{:08}{:03}", millis, suffix)
}

/// Builds one creation request per suggestion, in order.
pub fn plan(
    tasks: &[SuggestedTask],
    context: &TaskContext,
    now: DateTime<Utc>,
) -> Vec<NewTaskRequest> {
    let today = now.date_naive();
    tasks
        .iter()
        .map(|task| NewTaskRequest {
            name: task.name.clone(),
            description: task.description.clone(),
            project_id: context.project_id,
            sprint_id: context.sprint_id,
            status: INITIAL_STATUS.to_string(),
            priority: TaskPriority::normalize(task.priority.as_deref()),
            role: TaskRole::from_task_type(task.task_type.as_deref()),
            estimated_hours: task.estimated_hours,
            due_date: due_date_for(task.estimated_hours, today),
            created_at: today,
            external_id: external_id(now),
            assigned_to: None,
            assigned_by: context.assigned_by,
        })
        .collect()
}

/// Issues every request concurrently and waits for all of them.
///
/// Returns the created tasks in request order, or a [`ApiError::Batch`]
/// naming the first failure once every request has settled.
pub async fn materialize(
    api: &dyn TaskApi,
    credential: &Credential,
    requests: &[NewTaskRequest],
) -> Result<Vec<CreatedTask>, ApiError> {
    let total = requests.len();
    tracing::info!("Creating {} tasks", total);

    let results = join_all(
        requests
            .iter()
            .map(|request| api.create_task(credential, request)),
    )
    .await;

    let mut created = Vec::with_capacity(total);
    let mut first_error = None;
    let mut failed = 0;
    for (request, result) in requests.iter().zip(results) {
        match result {
            Ok(task) => created.push(task),
            Err(e) => {
                tracing::warn!("Failed to create task {:?}: {}", request.name, e);
                failed += 1;
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        None => Ok(created),
        Some(e) => Err(ApiError::Batch {
            message: e.to_string(),
            failed,
            total,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::services::MockTaskApi;

    fn context() -> TaskContext {
        TaskContext {
            project_id: ProjectId(3),
            sprint_id: SprintId(11),
            assigned_by: Some(UserId(7)),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
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
    fn working_days_rounds_up() {
        assert_eq!(working_days(Some(9.0)), 2);
        assert_eq!(working_days(Some(8.0)), 1);
        assert_eq!(working_days(Some(0.5)), 1);
        assert_eq!(working_days(Some(0.0)), 0);
        assert_eq!(working_days(Some(-4.0)), 0);
        assert_eq!(working_days(None), 0);
    }

    #[test]
    fn nine_hours_is_due_in_two_days() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            due_date_for(Some(9.0), today),
            NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()
        );
        assert_eq!(due_date_for(None, today), today);
    }

    #[test]
    fn external_id_shape() {
        let id = external_id(now());
        assert_eq!(id.len(), 12);
        assert!(id.starts_with('T'));
        assert!(id[1..].chars().all(|c| c.is_ascii_digit()));

        let millis = now().timestamp_millis() % 100_000_000;
        assert_eq!(&id[1..9], format!("{:08}", millis));
    }

    #[test]
    fn plan_normalizes_each_task() {
        let tasks = vec![
            SuggestedTask::new("Schema")
                .with_description("Design tables")
                .with_hours(9.0)
                .with_priority("HIGH")
                .with_type("database"),
            SuggestedTask::new("Mockups")
                .with_priority("urgent")
                .with_type("UI/UX"),
            SuggestedTask::new("E2E suite").with_type("testing").with_hours(16.0),
        ];

        let requests = plan(&tasks, &context(), now());
        assert_eq!(requests.len(), 3);

        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(requests[0].priority, TaskPriority::High);
        assert_eq!(requests[0].role, TaskRole::Dev);
        assert_eq!(requests[0].due_date, NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
        assert_eq!(requests[0].created_at, today);
        assert_eq!(requests[0].status, "ready");
        assert_eq!(requests[0].assigned_by, Some(UserId(7)));
        assert_eq!(requests[0].assigned_to, None);

        assert_eq!(requests[1].priority, TaskPriority::Medium);
        assert_eq!(requests[1].role, TaskRole::Design);
        assert_eq!(requests[1].due_date, today);

        assert_eq!(requests[2].role, TaskRole::Test);
        assert_eq!(requests[2].sprint_id, SprintId(11));
    }

    #[tokio::test]
    async fn all_tasks_created() {
        let mut api = MockTaskApi::new();
        api.expect_create_task()
            .times(2)
            .returning(|_, request| Ok(created(request)));

        let requests = plan(
            &[SuggestedTask::new("A"), SuggestedTask::new("B")],
            &context(),
            now(),
        );
        let credential = Credential::new("tok").unwrap();
        let tasks = materialize(&api, &credential, &requests).await.unwrap();

        let names: Vec<_> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn one_failure_still_issues_every_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut api = MockTaskApi::new();
        api.expect_create_task().times(3).returning(move |_, request| {
            counter.fetch_add(1, Ordering::SeqCst);
            if request.name == "B" {
                Err(ApiError::remote(Some(400), Some("sprint closed".into()), "x"))
            } else {
                Ok(created(request))
            }
        });

        let requests = plan(
            &[
                SuggestedTask::new("A"),
                SuggestedTask::new("B"),
                SuggestedTask::new("C"),
            ],
            &context(),
            now(),
        );
        let credential = Credential::new("tok").unwrap();
        let err = tokio_test::block_on(materialize(&api, &credential, &requests)).unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            err,
            ApiError::Batch {
                message: "sprint closed".into(),
                failed: 1,
                total: 3,
            }
        );
    }

    #[tokio::test]
    async fn empty_plan_issues_nothing() {
        let mut api = MockTaskApi::new();
        api.expect_create_task().times(0);

        let credential = Credential::new("tok").unwrap();
        let tasks = materialize(&api, &credential, &[]).await.unwrap();
        assert!(tasks.is_empty());
    }
}
