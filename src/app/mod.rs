//! Application state and lifecycle management.
//!
//! This module contains:
//! - The composer, task assistant and panel state the views render
//! - Request tickets for discarding stale responses (guard.rs)
//! - Action definitions (inline via gpui::actions!)
//! - Event bus for cross-component communication (events.rs)
//! - Keybinding registration

pub mod draft_history;
pub mod events;
pub mod guard;
pub mod mail_assistant;
pub mod panels;
pub mod session;
pub mod task_assistant;

pub use draft_history::{DraftHistory, StatusFilter};
pub use events::{AppEvent, EventBus};
pub use guard::{Outcome, RequestGuard, Ticket};
pub use mail_assistant::{GenerateOutcome, MailAssistant};
pub use panels::{FeedTab, NotificationPanel, NotificationTab, UpdateFeed};
pub use session::Session;
pub use task_assistant::TaskAssistant;

use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use gpui::{actions, AppContext, Application, KeyBinding, WindowOptions};

use crate::config::Config;
use crate::services::{CredentialStore, HttpBackend, Services};
use crate::ui::MainWindow;

actions!(
    sprintdesk,
    [
        Quit,
        Dismiss,
        ToggleNotifications,
        ToggleUpdateFeed,
        ToggleTaskAssistant,
    ]
);

/// Main application entry point
pub struct App;

impl App {
    /// Starts the network runtime and runs the UI until the window closes.
    pub fn run(config: Config) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("sprintdesk-net")
            .build()
            .context("starting network runtime")?;

        let backend = Arc::new(HttpBackend::new(&config)?);
        let credential = CredentialStore::new(config.keychain_account.clone()).load();
        tracing::info!(
            "Using API {} and AI bridge {}",
            config.api_base_url,
            config.ai_base_url
        );
        let session = Rc::new(Session::new(
            runtime.handle().clone(),
            Services::from_backend(backend),
            credential,
            config,
        ));

        Application::new().run(move |cx: &mut gpui::App| {
            Self::register_keybindings(cx);
            cx.on_action(|_: &Quit, cx| cx.quit());

            let opened = cx.open_window(WindowOptions::default(), |window, cx| {
                cx.new(|cx| MainWindow::new(session, window, cx))
            });
            if let Err(err) = opened {
                tracing::error!("Failed to open window: {}", err);
                cx.quit();
            }
        });

        runtime.shutdown_background();
        Ok(())
    }

    /// Register global keybindings
    fn register_keybindings(cx: &mut gpui::App) {
        cx.bind_keys([
            KeyBinding::new("cmd-q", Quit, None),
            KeyBinding::new("escape", Dismiss, None),
            KeyBinding::new("cmd-shift-n", ToggleNotifications, None),
            KeyBinding::new("cmd-shift-u", ToggleUpdateFeed, None),
            KeyBinding::new("cmd-shift-t", ToggleTaskAssistant, None),
        ]);
    }
}
