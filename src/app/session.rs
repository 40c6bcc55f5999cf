//! Everything the views share: collaborators, credential, event bus.
//!
//! gpui drives its own executor, so network futures are handed to a tokio
//! runtime through [`Session::spawn`] and awaited from `cx.spawn`.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::app::events::EventBus;
use crate::config::Config;
use crate::error::ApiError;
use crate::services::{Credential, Services};

pub struct Session {
    runtime: Handle,
    services: Services,
    credential: Option<Credential>,
    events: EventBus,
    config: Arc<Config>,
}

impl Session {
    pub fn new(
        runtime: Handle,
        services: Services,
        credential: Option<Credential>,
        config: Config,
    ) -> Self {
        if credential.is_none() {
            tracing::warn!("No API token found; network actions will be rejected");
        }
        Self {
            runtime,
            services,
            credential,
            events: EventBus::new(),
            config: Arc::new(config),
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Starts `fut` on the tokio runtime. The returned future resolves on
    /// whichever executor awaits it; a panicked task becomes a transport
    /// error.
    pub fn spawn<F, T>(&self, fut: F) -> impl Future<Output = Result<T, ApiError>> + 'static
    where
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
        T: Send + 'static,
    {
        let task = self.runtime.spawn(fut);
        async move {
            match task.await {
                Ok(result) => result,
                Err(err) => {
                    tracing::error!("Background request aborted: {}", err);
                    Err(ApiError::Transport(err.to_string()))
                }
            }
        }
    }
}
