//! Project analysis endpoint of the AI bridge.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::SuggestedTask;
use crate::error::ApiError;

/// Request to break a project description into tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub description: String,
    pub project_type: String,
}

impl AnalysisRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            project_type: "general".to_string(),
        }
    }
}

/// Result of a project analysis.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProjectAnalysis {
    #[serde(default)]
    pub tasks: Vec<SuggestedTask>,
    /// Either a number or free text, depending on the model.
    #[serde(default)]
    pub timeline_weeks: Option<serde_json::Value>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub project_title: Option<String>,
    /// Set when the analyzer reported a failure in a 200 response.
    #[serde(default)]
    pub error: Option<String>,
}

impl ProjectAnalysis {
    /// Title for the summary line.
    pub fn title(&self) -> &str {
        self.project_title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("Your Project")
    }

    /// Timeline for the summary line.
    pub fn timeline_label(&self) -> String {
        match &self.timeline_weeks {
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s.clone(),
            _ => "unknown".to_string(),
        }
    }

    /// One-line summary shown as the AI turn.
    pub fn summary(&self) -> String {
        format!(
            "I've analyzed \"{}\" and generated {} tasks. Estimated timeline: {} weeks. Technology stack: {}",
            self.title(),
            self.tasks.len(),
            self.timeline_label(),
            self.tech_stack.join(", ")
        )
    }

    /// Converts an in-band error into a failure.
    pub fn into_result(self) -> Result<Self, ApiError> {
        match self.error.clone() {
            Some(message) => Err(ApiError::remote(None, Some(message), "Analysis failed")),
            None => Ok(self),
        }
    }
}

/// AI service that turns a description into suggested tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectAnalysisApi: Send + Sync {
    async fn analyze_project(&self, request: &AnalysisRequest)
        -> Result<ProjectAnalysis, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_formats_numeric_timeline() {
        let json = r#"{
            "project_title": "Shop",
            "timeline_weeks": 6,
            "tech_stack": ["React", "Django"],
            "tasks": [{"name": "Cart"}, {"name": "Checkout"}]
        }"#;
        let analysis: ProjectAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(
            analysis.summary(),
            "I've analyzed \"Shop\" and generated 2 tasks. Estimated timeline: 6 weeks. Technology stack: React, Django"
        );
    }

    #[test]
    fn summary_defaults() {
        let analysis = ProjectAnalysis::default();
        assert_eq!(analysis.title(), "Your Project");
        assert_eq!(analysis.timeline_label(), "unknown");
    }

    #[test]
    fn in_band_error_becomes_failure() {
        let analysis: ProjectAnalysis =
            serde_json::from_str(r#"{"error":"model overloaded"}"#).unwrap();
        let err = analysis.into_result().unwrap_err();
        assert_eq!(err.to_string(), "model overloaded");
    }
}
