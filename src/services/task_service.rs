//! Task creation endpoint.

use async_trait::async_trait;

use crate::domain::{CreatedTask, NewTaskRequest};
use crate::error::ApiError;
use crate::services::Credential;

/// Backend that persists tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Creates one task.
    async fn create_task(
        &self,
        credential: &Credential,
        request: &NewTaskRequest,
    ) -> Result<CreatedTask, ApiError>;
}
