//! Input fields.
//!
//! Fields only draw a [`TextBuffer`]; key handling stays with the view that
//! owns the buffer.

use gpui::{
    div, px, ElementId, InteractiveElement, IntoElement, ParentElement, RenderOnce, SharedString,
    Styled,
};

use crate::ui::components::TextBuffer;
use crate::ui::theme::ThemeColors;

/// Input size options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputSize {
    /// 28px high.
    Small,
    /// 32px high.
    #[default]
    Medium,
    /// 40px high.
    Large,
}

impl InputSize {
    fn height(&self) -> f32 {
        match self {
            InputSize::Small => 28.0,
            InputSize::Medium => 32.0,
            InputSize::Large => 40.0,
        }
    }
}

/// Text to draw for a buffer: the caret when focused, else the placeholder
/// for an empty buffer.
fn shown_text(
    buffer: &TextBuffer,
    focused: bool,
    placeholder: &SharedString,
) -> (SharedString, bool) {
    if focused {
        (buffer.display_with_caret().into(), false)
    } else if buffer.is_empty() {
        (placeholder.clone(), true)
    } else {
        (buffer.text().to_string().into(), false)
    }
}

/// A single-line text field.
#[derive(IntoElement)]
pub struct TextInput {
    id: ElementId,
    value: SharedString,
    muted: bool,
    placeholder: SharedString,
    size: InputSize,
    focused: bool,
    disabled: bool,
    error: bool,
}

impl TextInput {
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            value: SharedString::default(),
            muted: true,
            placeholder: SharedString::default(),
            size: InputSize::Medium,
            focused: false,
            disabled: false,
            error: false,
        }
    }

    /// Draws `buffer`, with a caret when `focused`.
    pub fn buffer(mut self, buffer: &TextBuffer, focused: bool) -> Self {
        let (value, muted) = shown_text(buffer, focused, &self.placeholder);
        self.value = value;
        self.muted = muted;
        self.focused = focused;
        self
    }

    /// Must be set before [`TextInput::buffer`].
    pub fn placeholder(mut self, placeholder: impl Into<SharedString>) -> Self {
        self.placeholder = placeholder.into();
        if self.value.is_empty() {
            self.value = self.placeholder.clone();
        }
        self
    }

    pub fn size(mut self, size: InputSize) -> Self {
        self.size = size;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn error(mut self, error: bool) -> Self {
        self.error = error;
        self
    }
}

impl RenderOnce for TextInput {
    fn render(self, _window: &mut gpui::Window, _cx: &mut gpui::App) -> impl IntoElement {
        let colors = ThemeColors::dark();

        let border_color = if self.error {
            colors.error
        } else if self.focused {
            colors.accent
        } else {
            colors.border
        };
        let text_color = if self.muted {
            colors.text_muted
        } else {
            colors.text_primary
        };

        div()
            .id(self.id)
            .h(px(self.size.height()))
            .w_full()
            .px(px(12.0))
            .flex()
            .items_center()
            .bg(colors.surface)
            .border_1()
            .border_color(border_color)
            .rounded(px(6.0))
            .text_sm()
            .text_color(text_color)
            .opacity(if self.disabled { 0.5 } else { 1.0 })
            .cursor_text()
            .overflow_hidden()
            .child(self.value)
    }
}

/// A search field with a leading glyph.
#[derive(IntoElement)]
pub struct SearchInput {
    id: ElementId,
    value: SharedString,
    muted: bool,
    focused: bool,
}

impl SearchInput {
    pub fn new(id: impl Into<ElementId>, buffer: &TextBuffer, focused: bool) -> Self {
        let (value, muted) = shown_text(buffer, focused, &SharedString::from("Search..."));
        Self {
            id: id.into(),
            value,
            muted,
            focused,
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<SharedString>) -> Self {
        if self.muted {
            self.value = placeholder.into();
        }
        self
    }
}

impl RenderOnce for SearchInput {
    fn render(self, _window: &mut gpui::Window, _cx: &mut gpui::App) -> impl IntoElement {
        let colors = ThemeColors::dark();
        let text_color = if self.muted {
            colors.text_muted
        } else {
            colors.text_primary
        };

        div()
            .id(self.id)
            .h(px(InputSize::Medium.height()))
            .w_full()
            .px(px(12.0))
            .flex()
            .items_center()
            .gap(px(8.0))
            .bg(colors.surface)
            .border_1()
            .border_color(if self.focused {
                colors.accent
            } else {
                colors.border
            })
            .rounded(px(6.0))
            .cursor_text()
            .child(
                div()
                    .text_color(colors.text_muted)
                    .child(SharedString::from("/")),
            )
            .child(
                div()
                    .flex_1()
                    .text_sm()
                    .text_color(text_color)
                    .child(self.value),
            )
    }
}

/// A multiline field.
#[derive(IntoElement)]
pub struct TextArea {
    id: ElementId,
    value: SharedString,
    muted: bool,
    placeholder: SharedString,
    rows: u32,
    focused: bool,
    disabled: bool,
}

impl TextArea {
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            value: SharedString::default(),
            muted: true,
            placeholder: SharedString::default(),
            rows: 4,
            focused: false,
            disabled: false,
        }
    }

    /// Must be set before [`TextArea::buffer`].
    pub fn placeholder(mut self, placeholder: impl Into<SharedString>) -> Self {
        self.placeholder = placeholder.into();
        if self.value.is_empty() {
            self.value = self.placeholder.clone();
        }
        self
    }

    pub fn buffer(mut self, buffer: &TextBuffer, focused: bool) -> Self {
        let (value, muted) = shown_text(buffer, focused, &self.placeholder);
        self.value = value;
        self.muted = muted;
        self.focused = focused;
        self
    }

    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = rows;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    fn min_height(&self) -> f32 {
        self.rows as f32 * 20.0 + 16.0
    }
}

impl RenderOnce for TextArea {
    fn render(self, _window: &mut gpui::Window, _cx: &mut gpui::App) -> impl IntoElement {
        let colors = ThemeColors::dark();
        let text_color = if self.muted {
            colors.text_muted
        } else {
            colors.text_primary
        };

        div()
            .id(self.id.clone())
            .min_h(px(self.min_height()))
            .w_full()
            .p(px(12.0))
            .bg(colors.surface)
            .border_1()
            .border_color(if self.focused {
                colors.accent
            } else {
                colors.border
            })
            .rounded(px(6.0))
            .text_sm()
            .text_color(text_color)
            .opacity(if self.disabled { 0.5 } else { 1.0 })
            .cursor_text()
            .flex()
            .flex_col()
            .children(
                self.value
                    .split('\n')
                    .map(|line| div().min_h(px(20.0)).child(SharedString::from(line.to_string())))
                    .collect::<Vec<_>>(),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_unfocused_buffer_shows_placeholder() {
        let input = TextInput::new("recipient")
            .placeholder("recipient@example.com")
            .buffer(&TextBuffer::new(), false);
        assert_eq!(input.value.as_ref(), "recipient@example.com");
        assert!(input.muted);
    }

    #[test]
    fn focused_buffer_shows_caret() {
        let input = TextInput::new("subject")
            .placeholder("Subject")
            .buffer(&TextBuffer::with_text("Hi"), true);
        assert_eq!(input.value.as_ref(), "Hi|");
        assert!(!input.muted);
        assert!(input.focused);
    }

    #[test]
    fn input_sizes() {
        assert_eq!(InputSize::Small.height(), 28.0);
        assert_eq!(InputSize::Medium.height(), 32.0);
        assert_eq!(InputSize::Large.height(), 40.0);
    }

    #[test]
    fn search_placeholder_only_when_empty() {
        let empty =
            SearchInput::new("s", &TextBuffer::new(), false).placeholder("Search notifications");
        assert_eq!(empty.value.as_ref(), "Search notifications");

        let typed = SearchInput::new("s", &TextBuffer::with_text("riya"), false)
            .placeholder("Search notifications");
        assert_eq!(typed.value.as_ref(), "riya");
    }

    #[test]
    fn text_area_height_follows_rows() {
        let area = TextArea::new("body").rows(6);
        assert_eq!(area.min_height(), 136.0);
    }
}
