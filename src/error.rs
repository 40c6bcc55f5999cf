//! Error types shared by the assistants and the HTTP services.
//!
//! Validation failures never leave the client; [`ApiError`] covers
//! everything that went wrong after a request was issued.

use thiserror::Error;

/// A local precondition failed, so no request was issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The prompt or description was blank.
    #[error("Please enter a prompt")]
    EmptyPrompt,
    /// The same action is already running.
    #[error("A request is already in progress")]
    Busy,
    /// No bearer token is available.
    #[error("Authentication required.")]
    MissingCredential,
    /// The draft has no recipient.
    #[error("Please add a recipient")]
    MissingRecipient,
    /// There is no generated draft to act on.
    #[error("Generate a draft first")]
    MissingDraft,
    /// The draft was already sent.
    #[error("This email has already been sent")]
    AlreadySent,
    /// No sprint is selected for task generation.
    #[error("Please select a sprint first")]
    MissingSprint,
    /// Task description was blank.
    #[error("Please describe what tasks you want to create")]
    EmptyDescription,
    /// Project or sprint id is unknown when adding tasks.
    #[error("No project or sprint selected")]
    MissingContext,
    /// Refinement instructions were blank.
    #[error("Please describe how to change the email")]
    EmptyInstructions,
}

impl ValidationError {
    /// Whether the rejection should be shown to the user.
    ///
    /// Busy and empty-input rejections mirror a disabled button and stay silent.
    pub fn is_user_visible(&self) -> bool {
        !matches!(
            self,
            ValidationError::EmptyPrompt | ValidationError::Busy | ValidationError::MissingDraft
        )
    }
}

/// A request was issued and did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The endpoint could not be reached (connection refused or 404).
    #[error("{0}")]
    Unreachable(String),
    /// The server answered with an error payload.
    #[error("{message}")]
    Remote {
        /// HTTP status when the failure came with one.
        status: Option<u16>,
        /// Message reported by the server, or a generic fallback.
        message: String,
    },
    /// The request timed out.
    #[error("Request timed out")]
    Timeout,
    /// Any other transport failure.
    #[error("{0}")]
    Transport(String),
    /// The response body did not match the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
    /// At least one request of a fan-out failed.
    #[error("{message}")]
    Batch {
        /// Message of the first failed request.
        message: String,
        /// Number of failed requests.
        failed: usize,
        /// Number of requests issued.
        total: usize,
    },
}

impl ApiError {
    /// Builds a remote error, substituting `fallback` for a missing message.
    pub fn remote(status: Option<u16>, message: Option<String>, fallback: &str) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        ApiError::Remote { status, message }
    }

    /// Whether the endpoint itself was unavailable.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ApiError::Unreachable(_))
    }
}

/// Either kind of failure, as returned by the async assistant operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
