//! SprintDesk: AI-assisted email drafting and sprint task generation.

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod ui;

pub use app::App;
pub use config::Config;
