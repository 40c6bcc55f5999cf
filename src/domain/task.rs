use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Backend project identifier.
    ProjectId
);
numeric_id!(
    /// Backend sprint identifier.
    SprintId
);
numeric_id!(
    /// Backend user identifier.
    UserId
);

/// A sprint tasks can be scheduled into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: SprintId,
    pub name: String,
    #[serde(default)]
    pub active: bool,
}

impl Sprint {
    pub fn new(id: impl Into<SprintId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            active: false,
        }
    }

    pub fn active(mut self) -> Self {
        self.active = true;
        self
    }
}

/// A task proposed by the project analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedTask {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default, alias = "role")]
    #[serde(rename = "type")]
    pub task_type: Option<String>,
}

impl SuggestedTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            estimated_hours: None,
            priority: None,
            task_type: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = Some(task_type.into());
        self
    }
}

/// Priority accepted by the task backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl TaskPriority {
    /// Normalizes an AI-provided priority. Unknown or missing values are medium.
    pub fn normalize(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return TaskPriority::default();
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => TaskPriority::High,
            "medium" => TaskPriority::Medium,
            "low" => TaskPriority::Low,
            _ => TaskPriority::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::High => "high",
            TaskPriority::Medium => "medium",
            TaskPriority::Low => "low",
        }
    }
}

/// Role column of a backend task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskRole {
    #[default]
    Dev,
    Design,
    Test,
}

impl TaskRole {
    /// Maps an AI task type onto a role. Unknown or missing types are dev.
    pub fn from_task_type(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return TaskRole::default();
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "design" | "ui-ux" | "ui/ux" => TaskRole::Design,
            "testing" => TaskRole::Test,
            "development" | "documentation" | "deployment" | "backend" | "frontend"
            | "database" | "api" | "mobile" => TaskRole::Dev,
            _ => TaskRole::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskRole::Dev => "dev",
            TaskRole::Design => "design",
            TaskRole::Test => "test",
        }
    }
}

/// Payload for one task creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTaskRequest {
    pub name: String,
    pub description: String,
    #[serde(rename = "project")]
    pub project_id: ProjectId,
    #[serde(rename = "sprint")]
    pub sprint_id: SprintId,
    pub status: String,
    pub priority: TaskPriority,
    pub role: TaskRole,
    pub estimated_hours: Option<f64>,
    pub due_date: NaiveDate,
    pub created_at: NaiveDate,
    #[serde(rename = "item_id")]
    pub external_id: String,
    pub assigned_to: Option<UserId>,
    pub assigned_by: Option<UserId>,
}

/// A task record as returned by the backend after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedTask {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default, rename = "item_id")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Fields the client does not model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
