//! reqwest implementation of the service traits.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{Config, Timeouts};
use crate::domain::{CreatedTask, Draft, NewTaskRequest};
use crate::error::ApiError;
use crate::services::email_service::{DraftEnvelope, DraftListEnvelope, SendEnvelope};
use crate::services::{
    AnalysisRequest, Credential, EmailApi, GenerateDraftRequest, GeneratedDraft, ProjectAnalysis,
    ProjectAnalysisApi, RefineDraftRequest, SendDraftRequest, TaskApi,
};

/// Error payload shapes used by the backend and the AI bridge.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    detail: Option<String>,
}

impl ErrorBody {
    fn message(self) -> Option<String> {
        self.error.or(self.detail).filter(|m| !m.trim().is_empty())
    }
}

/// Client for the project-management backend and the AI bridge.
pub struct HttpBackend {
    client: Client,
    api_base: Url,
    ai_base: Url,
    timeouts: Timeouts,
}

impl HttpBackend {
    /// Creates a backend from the configured base URLs.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("sprintdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            api_base: parse_base(&config.api_base_url)?,
            ai_base: parse_base(&config.ai_base_url)?,
            timeouts: config.timeouts.clone(),
        })
    }

    fn api_url(&self, path: &str) -> Result<Url, ApiError> {
        self.api_base
            .join(path)
            .map_err(|e| ApiError::Transport(format!("invalid URL {}: {}", path, e)))
    }

    fn ai_url(&self, path: &str) -> Result<Url, ApiError> {
        self.ai_base
            .join(path)
            .map_err(|e| ApiError::Transport(format!("invalid URL {}: {}", path, e)))
    }

    fn authorized(builder: RequestBuilder, credential: &Credential) -> RequestBuilder {
        builder.header(AUTHORIZATION, credential.header_value())
    }

    async fn post<B, R>(
        &self,
        url: Url,
        credential: Option<&Credential>,
        body: &B,
        timeout: Duration,
        fallback: &str,
    ) -> Result<R, ApiError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        tracing::debug!("POST {}", url);
        let mut builder = self.client.post(url).timeout(timeout).json(body);
        if let Some(credential) = credential {
            builder = Self::authorized(builder, credential);
        }
        execute(builder, fallback).await
    }
}

fn parse_base(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized).with_context(|| format!("invalid base URL {}", raw))
}

fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else if err.is_connect() {
        ApiError::Unreachable(err.to_string())
    } else if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else {
        ApiError::Transport(err.to_string())
    }
}

/// Maps a non-success status and its body to an error.
///
/// A 404 without a JSON message means the route itself is missing.
fn status_error(status: StatusCode, body: &[u8], fallback: &str) -> ApiError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::message);

    match (status, message) {
        (StatusCode::NOT_FOUND, None) => {
            ApiError::Unreachable(format!("endpoint not found ({})", status))
        }
        (status, message) => ApiError::remote(Some(status.as_u16()), message, fallback),
    }
}

/// Decodes the body of a successful response; error statuses are mapped
/// through [`status_error`].
fn decode_envelope<R: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
    fallback: &str,
) -> Result<R, ApiError> {
    if status.is_success() {
        return serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()));
    }
    Err(status_error(status, body, fallback))
}

async fn execute<R: DeserializeOwned>(
    builder: RequestBuilder,
    fallback: &str,
) -> Result<R, ApiError> {
    let response = builder.send().await.map_err(transport_error)?;
    let status = response.status();
    let body = response.bytes().await.map_err(transport_error)?;
    decode_envelope(status, &body, fallback)
}

#[async_trait]
impl EmailApi for HttpBackend {
    async fn generate_draft(
        &self,
        credential: &Credential,
        request: &GenerateDraftRequest,
    ) -> Result<GeneratedDraft, ApiError> {
        let url = self.api_url("ai-email/generate/")?;
        let envelope: DraftEnvelope = self
            .post(
                url,
                Some(credential),
                request,
                self.timeouts.generate(),
                "Generation failed",
            )
            .await?;
        envelope.into_result("Generation failed")
    }

    async fn refine_draft(
        &self,
        credential: &Credential,
        request: &RefineDraftRequest,
    ) -> Result<GeneratedDraft, ApiError> {
        let url = self.api_url("ai-email/customize/")?;
        let envelope: DraftEnvelope = self
            .post(
                url,
                Some(credential),
                request,
                self.timeouts.generate(),
                "Customization failed",
            )
            .await?;
        envelope.into_result("Customization failed")
    }

    async fn send_draft(
        &self,
        credential: &Credential,
        request: &SendDraftRequest,
    ) -> Result<(), ApiError> {
        let url = self.api_url("ai-email/send/")?;
        let envelope: SendEnvelope = self
            .post(
                url,
                Some(credential),
                request,
                self.timeouts.send(),
                "Sending failed",
            )
            .await?;
        envelope.into_result("Sending failed")
    }

    async fn list_drafts(&self, credential: &Credential) -> Result<Vec<Draft>, ApiError> {
        let url = self.api_url("ai-email/drafts/")?;
        tracing::debug!("GET {}", url);
        let builder = self
            .client
            .get(url)
            .timeout(self.timeouts.default_request());
        let envelope: DraftListEnvelope =
            execute(Self::authorized(builder, credential), "Failed to load drafts").await?;
        envelope.into_result("Failed to load drafts")
    }
}

#[async_trait]
impl ProjectAnalysisApi for HttpBackend {
    async fn analyze_project(
        &self,
        request: &AnalysisRequest,
    ) -> Result<ProjectAnalysis, ApiError> {
        let url = self.ai_url("api/ai/analyze-project")?;
        let analysis: ProjectAnalysis = self
            .post(url, None, request, self.timeouts.analyze(), "Analysis failed")
            .await?;
        analysis.into_result()
    }
}

#[async_trait]
impl TaskApi for HttpBackend {
    async fn create_task(
        &self,
        credential: &Credential,
        request: &NewTaskRequest,
    ) -> Result<CreatedTask, ApiError> {
        let url = self.api_url("api/tasks/")?;
        self.post(
            url,
            Some(credential),
            request,
            self.timeouts.default_request(),
            "Failed to create task",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_urls_gain_trailing_slash() {
        let mut config = Config::default();
        config.api_base_url = "https://pms.example.com/backend".into();
        let backend = HttpBackend::new(&config).unwrap();

        assert_eq!(
            backend.api_url("ai-email/generate/").unwrap().as_str(),
            "https://pms.example.com/backend/ai-email/generate/"
        );
        assert_eq!(
            backend.ai_url("api/ai/analyze-project").unwrap().as_str(),
            "http://localhost:8001/api/ai/analyze-project"
        );
    }

    #[test]
    fn invalid_base_url_fails() {
        let mut config = Config::default();
        config.ai_base_url = "not a url".into();
        assert!(HttpBackend::new(&config).is_err());
    }

    #[test]
    fn bare_404_is_unreachable() {
        let err = status_error(StatusCode::NOT_FOUND, b"<html>Not Found</html>", "x");
        assert!(err.is_unreachable());
    }

    #[test]
    fn json_404_is_a_remote_error() {
        let err = status_error(StatusCode::NOT_FOUND, br#"{"error":"Email not found"}"#, "x");
        assert_eq!(
            err,
            ApiError::Remote {
                status: Some(404),
                message: "Email not found".into()
            }
        );
    }

    #[test]
    fn detail_field_is_used() {
        let err = status_error(
            StatusCode::BAD_REQUEST,
            br#"{"detail":"Invalid sprint"}"#,
            "Failed to create task",
        );
        assert_eq!(err.to_string(), "Invalid sprint");
    }

    #[test]
    fn missing_message_uses_fallback() {
        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, b"", "Sending failed");
        assert_eq!(err.to_string(), "Sending failed");
    }

    #[test]
    fn success_body_is_decoded() {
        let task: CreatedTask = decode_envelope(
            StatusCode::CREATED,
            br#"{"id": 5, "name": "Cart", "item_id": "T1", "status": "ready"}"#,
            "Failed to create task",
        )
        .unwrap();
        assert_eq!(task.id, Some(5));
        assert_eq!(task.extra["status"], "ready");
    }

    #[test]
    fn malformed_success_body_is_decode_error() {
        let result: Result<CreatedTask, _> =
            decode_envelope(StatusCode::OK, b"not json", "Failed to create task");
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }
}
