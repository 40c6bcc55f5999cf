//! Remote collaborators and the logic that talks to them.
//!
//! This module contains:
//! - Service traits for the email, project-analysis and task endpoints
//! - The reqwest-backed [`HttpBackend`] implementing all of them
//! - Credential lookup ([`CredentialStore`])
//! - The task materializer that fans out creation requests

mod credentials;
mod email_service;
mod http;
pub mod materializer;
mod project_service;
mod task_service;

use std::sync::Arc;

pub use credentials::{Credential, CredentialStore};
pub use email_service::{
    EmailApi, GenerateDraftRequest, GeneratedDraft, RefineDraftRequest, SendDraftRequest,
};
pub use http::HttpBackend;
pub use materializer::TaskContext;
pub use project_service::{AnalysisRequest, ProjectAnalysis, ProjectAnalysisApi};
pub use task_service::TaskApi;

#[cfg(test)]
pub use email_service::MockEmailApi;
#[cfg(test)]
pub use project_service::MockProjectAnalysisApi;
#[cfg(test)]
pub use task_service::MockTaskApi;

/// Handles to every remote collaborator, shared by the views.
#[derive(Clone)]
pub struct Services {
    pub email: Arc<dyn EmailApi>,
    pub projects: Arc<dyn ProjectAnalysisApi>,
    pub tasks: Arc<dyn TaskApi>,
}

impl Services {
    /// Uses one HTTP backend for all collaborators.
    pub fn from_backend(backend: Arc<HttpBackend>) -> Self {
        Self {
            email: backend.clone(),
            projects: backend.clone(),
            tasks: backend,
        }
    }
}
