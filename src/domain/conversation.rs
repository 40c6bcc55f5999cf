use serde::{Deserialize, Serialize};

use super::{SprintId, SuggestedTask};

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnKind {
    User,
    Ai,
    System,
    Error,
}

/// One entry in the task generator transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub kind: TurnKind,
    pub content: String,
    /// Tasks attached to an AI summary or a confirmation prompt.
    #[serde(default)]
    pub tasks: Vec<SuggestedTask>,
    pub sprint_id: Option<SprintId>,
    pub sprint_name: Option<String>,
    /// Ticket of the analysis this placeholder waits for.
    #[serde(skip)]
    pub loading: Option<u64>,
}

impl ConversationTurn {
    fn new(kind: TurnKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            tasks: Vec::new(),
            sprint_id: None,
            sprint_name: None,
            loading: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnKind::User, content)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(TurnKind::Ai, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(TurnKind::System, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(TurnKind::Error, content)
    }

    /// A placeholder shown while the analysis with `ticket` runs.
    pub fn loading(content: impl Into<String>, ticket: u64) -> Self {
        Self {
            loading: Some(ticket),
            ..Self::new(TurnKind::System, content)
        }
    }

    pub fn with_tasks(mut self, tasks: Vec<SuggestedTask>) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn with_sprint(mut self, id: Option<SprintId>, name: impl Into<String>) -> Self {
        self.sprint_id = id;
        self.sprint_name = Some(name.into());
        self
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    /// A system turn offering to add its tasks.
    pub fn is_confirmation(&self) -> bool {
        self.kind == TurnKind::System && !self.tasks.is_empty() && self.sprint_id.is_some()
    }
}
