//! Notifications panel.

use gpui::{
    div, prelude::FluentBuilder, px, AnyElement, ClickEvent, Context, DismissEvent, EventEmitter,
    FontWeight, IntoElement, KeyDownEvent, ParentElement, Render, SharedString, Styled, Window,
};

use crate::app::{NotificationPanel, NotificationTab};
use crate::domain::{FeedItem, Notification};
use crate::ui::components::{
    Button, ButtonVariant, Card, Dialog, DialogContent, DialogHeader, DialogTitle,
    KeyInputResult, SearchInput, TextBuffer,
};
use crate::ui::theme::Theme;

pub struct NotificationsView {
    theme: Theme,
    panel: NotificationPanel,
    search: TextBuffer,
}

impl EventEmitter<DismissEvent> for NotificationsView {}

impl NotificationsView {
    pub fn new(panel: NotificationPanel) -> Self {
        Self {
            theme: Theme::dark(),
            panel,
            search: TextBuffer::new(),
        }
    }

    pub fn unread_count(&self) -> usize {
        self.panel.unread_count()
    }

    /// Keys go to the search box.
    pub fn handle_key(&mut self, event: &KeyDownEvent, cx: &mut Context<Self>) -> bool {
        match self.search.handle_key_event(event) {
            KeyInputResult::TextChanged => {
                self.panel.set_search(self.search.text());
                cx.notify();
                true
            }
            KeyInputResult::Consumed | KeyInputResult::Submit => {
                cx.notify();
                true
            }
            KeyInputResult::Cancel | KeyInputResult::Ignored => false,
        }
    }

    fn render_entry(&self, notification: &Notification) -> impl IntoElement {
        let colors = &self.theme.colors;
        div()
            .flex()
            .items_start()
            .gap(px(10.0))
            .px(px(8.0))
            .py(px(8.0))
            .rounded(px(6.0))
            .when(!notification.read, |this| this.bg(colors.surface_elevated))
            .child(
                div()
                    .size(px(32.0))
                    .flex_none()
                    .flex()
                    .items_center()
                    .justify_center()
                    .rounded_full()
                    .bg(colors.accent)
                    .text_sm()
                    .font_weight(FontWeight::SEMIBOLD)
                    .text_color(colors.text_primary)
                    .child(SharedString::from(notification.initial())),
            )
            .child(
                div()
                    .flex_1()
                    .flex()
                    .flex_col()
                    .gap(px(2.0))
                    .child(
                        div()
                            .text_sm()
                            .text_color(colors.text_secondary)
                            .child(
                                div()
                                    .font_weight(FontWeight::SEMIBOLD)
                                    .text_color(colors.text_primary)
                                    .child(SharedString::from(notification.actor.clone())),
                            )
                            .child(SharedString::from(notification.action.clone())),
                    )
                    .child(
                        div()
                            .text_xs()
                            .text_color(colors.text_muted)
                            .child(SharedString::from(notification.time_label.clone())),
                    ),
            )
            .when(!notification.read, |this| {
                this.child(
                    div()
                        .size(px(8.0))
                        .mt(px(6.0))
                        .rounded_full()
                        .bg(colors.accent),
                )
            })
    }

    fn render_groups(&self) -> Vec<AnyElement> {
        let colors = &self.theme.colors;
        self.panel
            .grouped()
            .into_iter()
            .map(|(label, items)| {
                div()
                    .flex()
                    .flex_col()
                    .gap(px(4.0))
                    .child(
                        div()
                            .text_xs()
                            .font_weight(FontWeight::MEDIUM)
                            .text_color(colors.text_muted)
                            .child(SharedString::from(label)),
                    )
                    .children(items.into_iter().map(|item| match item {
                        FeedItem::Entry(notification) => {
                            self.render_entry(notification).into_any_element()
                        }
                        FeedItem::Spacer { .. } => div().h(px(48.0)).into_any_element(),
                    }))
                    .into_any_element()
            })
            .collect()
    }
}

impl Render for NotificationsView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let colors = self.theme.colors;
        let active_tab = self.panel.tab();
        let unread = self.panel.unread_count();

        let tabs = NotificationTab::all()
            .iter()
            .map(|tab| {
                let tab = *tab;
                Button::new(
                    SharedString::from(format!("notification-tab-{}", tab.label())),
                    tab.label(),
                )
                .variant(ButtonVariant::Ghost)
                .selected(tab == active_tab)
                .on_click(cx.listener(move |this, _: &ClickEvent, _, cx| {
                    this.panel.set_tab(tab);
                    cx.notify();
                }))
            })
            .collect::<Vec<_>>();

        let groups = self.render_groups();
        let empty = active_tab.empty_state();

        Dialog::new("notifications")
            .width(460.0)
            .on_close(cx.listener(|_, _: &ClickEvent, _, cx| cx.emit(DismissEvent)))
            .child(
                DialogHeader::new()
                    .child(DialogTitle::new(if unread > 0 {
                        format!("Notifications ({})", unread)
                    } else {
                        "Notifications".to_string()
                    }))
                    .child(
                        Button::new("mark-all-read", "Mark all read")
                            .variant(ButtonVariant::Ghost)
                            .disabled(unread == 0)
                            .on_click(cx.listener(|this, _: &ClickEvent, _, cx| {
                                this.panel.mark_all_read();
                                cx.notify();
                            })),
                    ),
            )
            .child(
                DialogContent::new()
                    .child(div().flex().gap(px(4.0)).children(tabs))
                    .child(
                        SearchInput::new("notification-search", &self.search, true)
                            .placeholder("Search notifications"),
                    )
                    .child(
                        div()
                            .flex()
                            .flex_col()
                            .gap(px(12.0))
                            .max_h(px(420.0))
                            .overflow_hidden()
                            .when(groups.is_empty(), |this| {
                                this.child(
                                    Card::new()
                                        .title(empty.title)
                                        .child(SharedString::from(empty.message)),
                                )
                            })
                            .when(!groups.is_empty(), |this| {
                                this.child(div().text_xs().text_color(colors.text_muted).child(
                                    SharedString::from(format!("{} unread", unread)),
                                ))
                            })
                            .children(groups),
                    ),
            )
    }
}
