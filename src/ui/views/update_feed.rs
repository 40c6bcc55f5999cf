//! Update feed panel.

use gpui::{
    div, px, ClickEvent, Context, DismissEvent, EventEmitter, IntoElement, ParentElement, Render,
    SharedString, Styled, Window,
};

use crate::app::{FeedTab, UpdateFeed};
use crate::ui::components::{
    Button, ButtonVariant, Card, Dialog, DialogContent, DialogHeader, DialogTitle,
};

pub struct UpdateFeedView {
    feed: UpdateFeed,
}

impl EventEmitter<DismissEvent> for UpdateFeedView {}

impl UpdateFeedView {
    pub fn new() -> Self {
        Self {
            feed: UpdateFeed::new(),
        }
    }
}

impl Default for UpdateFeedView {
    fn default() -> Self {
        Self::new()
    }
}

impl Render for UpdateFeedView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let active_tab = self.feed.tab();
        let tabs = FeedTab::all()
            .iter()
            .map(|tab| {
                let tab = *tab;
                Button::new(SharedString::from(format!("feed-tab-{}", tab.label())), tab.label())
                    .variant(ButtonVariant::Ghost)
                    .selected(tab == active_tab)
                    .on_click(cx.listener(move |this, _: &ClickEvent, _, cx| {
                        this.feed.set_tab(tab);
                        cx.notify();
                    }))
            })
            .collect::<Vec<_>>();

        let empty = active_tab.empty_state();
        let mut card = Card::new().child(SharedString::from(empty.message));
        if !empty.title.is_empty() {
            card = card.title(empty.title);
        }

        Dialog::new("update-feed")
            .width(560.0)
            .on_close(cx.listener(|_, _: &ClickEvent, _, cx| cx.emit(DismissEvent)))
            .child(DialogHeader::new().child(DialogTitle::new("Updates")))
            .child(
                DialogContent::new()
                    .child(div().flex().gap(px(4.0)).children(tabs))
                    .child(div().py(px(24.0)).child(card)),
            )
    }
}
