//! Reusable UI components.
//!
//! Components are stateless: views own the state (text buffers, open
//! flags) and pass it in when rendering. Styling comes from the theme.

pub mod button;
pub mod dialog;
pub mod input;
pub mod text_buffer;

pub use button::{Button, ButtonVariant};
pub use dialog::{Card, Dialog, DialogContent, DialogFooter, DialogHeader, DialogTitle};
pub use input::{InputSize, SearchInput, TextArea, TextInput};
pub use text_buffer::{EditModifiers, KeyInputResult, TextBuffer};
