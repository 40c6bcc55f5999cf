//! Clickable buttons.

use gpui::{
    div, prelude::FluentBuilder, px, App, ClickEvent, ElementId, FontWeight, InteractiveElement,
    IntoElement, ParentElement, RenderOnce, SharedString, StatefulInteractiveElement, Styled,
    Window,
};

use crate::ui::theme::ThemeColors;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonVariant {
    /// Filled accent background.
    #[default]
    Primary,
    /// Bordered surface.
    Secondary,
    /// Text only.
    Ghost,
}

type ClickHandler = Box<dyn Fn(&ClickEvent, &mut Window, &mut App) + 'static>;

#[derive(IntoElement)]
pub struct Button {
    id: ElementId,
    label: SharedString,
    variant: ButtonVariant,
    disabled: bool,
    selected: bool,
    on_click: Option<ClickHandler>,
}

impl Button {
    pub fn new(id: impl Into<ElementId>, label: impl Into<SharedString>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            variant: ButtonVariant::Primary,
            disabled: false,
            selected: false,
            on_click: None,
        }
    }

    pub fn variant(mut self, variant: ButtonVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Disabled buttons ignore clicks.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Highlights a ghost or secondary button, e.g. the active tab.
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn on_click(
        mut self,
        handler: impl Fn(&ClickEvent, &mut Window, &mut App) + 'static,
    ) -> Self {
        self.on_click = Some(Box::new(handler));
        self
    }
}

impl RenderOnce for Button {
    fn render(self, _window: &mut Window, _cx: &mut App) -> impl IntoElement {
        let colors = ThemeColors::dark();

        let (bg, hover_bg, text, border) = match self.variant {
            ButtonVariant::Primary => (
                colors.accent,
                colors.accent_hover,
                colors.text_primary,
                colors.accent,
            ),
            ButtonVariant::Secondary => (
                if self.selected {
                    colors.surface_elevated
                } else {
                    colors.surface
                },
                colors.surface_elevated,
                colors.text_primary,
                if self.selected {
                    colors.accent
                } else {
                    colors.border
                },
            ),
            ButtonVariant::Ghost => (
                if self.selected {
                    colors.surface_elevated
                } else {
                    gpui::Hsla::transparent_black()
                },
                colors.surface_elevated,
                if self.selected {
                    colors.text_primary
                } else {
                    colors.text_secondary
                },
                gpui::Hsla::transparent_black(),
            ),
        };

        let handler = if self.disabled { None } else { self.on_click };

        div()
            .id(self.id)
            .h(px(30.0))
            .px(px(12.0))
            .flex()
            .items_center()
            .justify_center()
            .rounded(px(6.0))
            .border_1()
            .border_color(border)
            .bg(bg)
            .text_sm()
            .font_weight(FontWeight::MEDIUM)
            .text_color(text)
            .opacity(if self.disabled { 0.5 } else { 1.0 })
            .when(!self.disabled, |this| {
                this.cursor_pointer().hover(move |style| style.bg(hover_bg))
            })
            .when_some(handler, |this, handler| {
                this.on_click(move |event, window, cx| handler(event, window, cx))
            })
            .child(self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_enabled_primary() {
        let button = Button::new("send", "Send");
        assert_eq!(button.variant, ButtonVariant::Primary);
        assert!(!button.disabled);
        assert!(button.on_click.is_none());
    }

    #[test]
    fn builder_keeps_handler_and_flags() {
        let button = Button::new("tab", "All")
            .variant(ButtonVariant::Ghost)
            .selected(true)
            .disabled(true)
            .on_click(|_, _, _| {});
        assert!(button.selected);
        assert!(button.disabled);
        assert!(button.on_click.is_some());
    }
}
