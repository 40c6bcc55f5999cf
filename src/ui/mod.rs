//! UI components and views
//!
//! This module contains the gpui-based user interface for SprintDesk.
//! The UI is organized into:
//! - `theme`: Color scheme
//! - `components`: Reusable UI primitives
//! - `views`: The window shell and the panels it hosts

pub mod components;
pub mod theme;
pub mod views;

pub use theme::{Theme, ThemeColors};
pub use views::MainWindow;
