//! Modal dialog and card surfaces.
//!
//! A [`Dialog`] dims the window and centers its content. Clicking the
//! backdrop calls the close handler; clicks inside the content do not.

use gpui::{
    div, prelude::FluentBuilder, px, AnyElement, App, ClickEvent, ElementId, FontWeight,
    InteractiveElement, IntoElement, MouseButton, ParentElement, RenderOnce, SharedString,
    StatefulInteractiveElement, Styled, Window,
};

use crate::ui::theme::ThemeColors;

type CloseHandler = Box<dyn Fn(&ClickEvent, &mut Window, &mut App) + 'static>;

/// A modal dialog. Renders nothing while closed.
#[derive(IntoElement)]
pub struct Dialog {
    id: ElementId,
    open: bool,
    width: f32,
    on_close: Option<CloseHandler>,
    children: Vec<AnyElement>,
}

impl Dialog {
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            open: true,
            width: 520.0,
            on_close: None,
            children: Vec::new(),
        }
    }

    pub fn open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Called when the backdrop is clicked.
    pub fn on_close(
        mut self,
        handler: impl Fn(&ClickEvent, &mut Window, &mut App) + 'static,
    ) -> Self {
        self.on_close = Some(Box::new(handler));
        self
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl ParentElement for Dialog {
    fn extend(&mut self, elements: impl IntoIterator<Item = AnyElement>) {
        self.children.extend(elements);
    }
}

impl RenderOnce for Dialog {
    fn render(self, _window: &mut Window, _cx: &mut App) -> impl IntoElement {
        let colors = ThemeColors::dark();

        if !self.open {
            return div().id(self.id);
        }

        let on_close = self.on_close;
        div()
            .id(self.id)
            .absolute()
            .inset_0()
            .flex()
            .items_center()
            .justify_center()
            .bg(colors.overlay)
            .when_some(on_close, |this, handler| {
                this.on_click(move |event, window, cx| handler(event, window, cx))
            })
            // Keep pointer events away from the views underneath
            .on_mouse_move(|_, _, cx| cx.stop_propagation())
            .on_mouse_down(MouseButton::Left, |_, _, cx| cx.stop_propagation())
            .child(
                div()
                    .id("dialog-content")
                    .w(px(self.width))
                    .max_h_full()
                    .flex()
                    .flex_col()
                    .bg(colors.surface)
                    .border_1()
                    .border_color(colors.border)
                    .rounded(px(8.0))
                    .shadow_lg()
                    .overflow_hidden()
                    .on_click(|_, _, cx| cx.stop_propagation())
                    .children(self.children),
            )
    }
}

/// Top section of a dialog, usually holding a [`DialogTitle`].
#[derive(IntoElement, Default)]
pub struct DialogHeader {
    children: Vec<AnyElement>,
}

impl DialogHeader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ParentElement for DialogHeader {
    fn extend(&mut self, elements: impl IntoIterator<Item = AnyElement>) {
        self.children.extend(elements);
    }
}

impl RenderOnce for DialogHeader {
    fn render(self, _window: &mut Window, _cx: &mut App) -> impl IntoElement {
        let colors = ThemeColors::dark();
        div()
            .flex()
            .items_center()
            .justify_between()
            .px(px(20.0))
            .py(px(14.0))
            .border_b_1()
            .border_color(colors.border)
            .children(self.children)
    }
}

#[derive(IntoElement)]
pub struct DialogTitle {
    text: SharedString,
}

impl DialogTitle {
    pub fn new(text: impl Into<SharedString>) -> Self {
        Self { text: text.into() }
    }
}

impl RenderOnce for DialogTitle {
    fn render(self, _window: &mut Window, _cx: &mut App) -> impl IntoElement {
        let colors = ThemeColors::dark();
        div()
            .text_base()
            .font_weight(FontWeight::SEMIBOLD)
            .text_color(colors.text_primary)
            .child(self.text)
    }
}

#[derive(IntoElement, Default)]
pub struct DialogContent {
    children: Vec<AnyElement>,
}

impl DialogContent {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ParentElement for DialogContent {
    fn extend(&mut self, elements: impl IntoIterator<Item = AnyElement>) {
        self.children.extend(elements);
    }
}

impl RenderOnce for DialogContent {
    fn render(self, _window: &mut Window, _cx: &mut App) -> impl IntoElement {
        div()
            .flex_1()
            .flex()
            .flex_col()
            .gap(px(12.0))
            .px(px(20.0))
            .py(px(16.0))
            .children(self.children)
    }
}

/// Bottom row of a dialog; children are right-aligned.
#[derive(IntoElement, Default)]
pub struct DialogFooter {
    children: Vec<AnyElement>,
}

impl DialogFooter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ParentElement for DialogFooter {
    fn extend(&mut self, elements: impl IntoIterator<Item = AnyElement>) {
        self.children.extend(elements);
    }
}

impl RenderOnce for DialogFooter {
    fn render(self, _window: &mut Window, _cx: &mut App) -> impl IntoElement {
        let colors = ThemeColors::dark();
        div()
            .flex()
            .items_center()
            .justify_end()
            .gap(px(8.0))
            .px(px(20.0))
            .py(px(12.0))
            .border_t_1()
            .border_color(colors.border)
            .children(self.children)
    }
}

/// A padded rounded surface.
#[derive(IntoElement, Default)]
pub struct Card {
    title: Option<SharedString>,
    children: Vec<AnyElement>,
}

impl Card {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<SharedString>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn has_content(&self) -> bool {
        !self.children.is_empty()
    }
}

impl ParentElement for Card {
    fn extend(&mut self, elements: impl IntoIterator<Item = AnyElement>) {
        self.children.extend(elements);
    }
}

impl RenderOnce for Card {
    fn render(self, _window: &mut Window, _cx: &mut App) -> impl IntoElement {
        let colors = ThemeColors::dark();
        let has_content = self.has_content();
        div()
            .flex()
            .flex_col()
            .gap(px(8.0))
            .p(px(16.0))
            .bg(colors.surface_elevated)
            .border_1()
            .border_color(colors.border)
            .rounded(px(8.0))
            .when_some(self.title, |this, title| {
                this.child(
                    div()
                        .text_sm()
                        .font_weight(FontWeight::MEDIUM)
                        .text_color(colors.text_primary)
                        .child(title),
                )
            })
            .when(has_content, |this| {
                this.child(
                    div()
                        .text_sm()
                        .text_color(colors.text_secondary)
                        .children(self.children),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialog_defaults_open_without_handler() {
        let dialog = Dialog::new("d");
        assert!(dialog.is_open());
        assert!(dialog.on_close.is_none());
        assert!(!dialog.open(false).is_open());
    }

    #[test]
    fn dialog_collects_children() {
        let dialog = Dialog::new("d")
            .on_close(|_, _, _| {})
            .child(DialogHeader::new().child(DialogTitle::new("Add tasks")))
            .child(DialogFooter::new());
        assert_eq!(dialog.children.len(), 2);
        assert!(dialog.on_close.is_some());
    }

    #[test]
    fn card_without_children_has_no_content_block() {
        assert!(!Card::new().title("Empty").has_content());
        assert!(Card::new().child("body").has_content());
    }
}
