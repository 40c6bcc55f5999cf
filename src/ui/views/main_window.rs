//! Main application window.
//!
//! The window owns the only focus handle and routes key input to whichever
//! child is the key target: the open panel, the task widget, or the email
//! assistant underneath.

use std::rc::Rc;
use std::time::Duration;

use gpui::{
    div, prelude::FluentBuilder, px, AppContext, ClickEvent, Context, DismissEvent, Entity,
    FocusHandle, Focusable, FontWeight, InteractiveElement, IntoElement, KeyDownEvent,
    MouseButton, MouseDownEvent, ParentElement, Render, SharedString,
    StatefulInteractiveElement, Styled, Window,
};
use tokio::sync::broadcast::error::RecvError;

use crate::app::{
    AppEvent, Dismiss, NotificationPanel, Session, ToggleNotifications, ToggleTaskAssistant,
    ToggleUpdateFeed,
};
use crate::ui::theme::Theme;
use crate::ui::views::{
    MailAssistantView, NotificationsView, TaskAssistantView, TaskWidgetEvent, UpdateFeedView,
};

const TOAST_DURATION: Duration = Duration::from_secs(4);

/// Panel shown above the email assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveOverlay {
    None,
    Notifications,
    UpdateFeed,
}

/// Child receiving key input when no panel is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyTarget {
    Mail,
    Tasks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Toast {
    message: String,
    generation: u64,
}

/// Toast text for an event, when the event deserves one.
fn toast_message(event: &AppEvent) -> Option<String> {
    match event {
        AppEvent::TasksCreated { tasks } => Some(match tasks.len() {
            1 => "1 task added to the sprint".to_string(),
            n => format!("{} tasks added to the sprint", n),
        }),
        AppEvent::DraftSent { id } => Some(format!("Draft {} sent", id)),
        AppEvent::DraftGenerated { .. } => None,
    }
}

pub struct MainWindow {
    theme: Theme,
    focus_handle: FocusHandle,
    active_overlay: ActiveOverlay,
    key_target: KeyTarget,
    mail: Entity<MailAssistantView>,
    tasks: Entity<TaskAssistantView>,
    notifications: Entity<NotificationsView>,
    update_feed: Entity<UpdateFeedView>,
    toast: Option<Toast>,
    toast_generation: u64,
}

impl MainWindow {
    pub fn new(session: Rc<Session>, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let focus_handle = cx.focus_handle();
        window.focus(&focus_handle);

        let mail = cx.new(|cx| MailAssistantView::new(session.clone(), cx));
        let tasks = cx.new(|cx| TaskAssistantView::new(session.clone(), cx));
        let notifications = cx.new(|_| NotificationsView::new(NotificationPanel::with_samples()));
        let update_feed = cx.new(|_| UpdateFeedView::new());

        cx.subscribe(&notifications, |this, _, _: &DismissEvent, cx| {
            this.dismiss_overlay(cx);
        })
        .detach();
        cx.subscribe(&update_feed, |this, _, _: &DismissEvent, cx| {
            this.dismiss_overlay(cx);
        })
        .detach();
        cx.subscribe(&tasks, |this, _, event: &TaskWidgetEvent, cx| {
            let target = match event {
                TaskWidgetEvent::Opened | TaskWidgetEvent::Focused => KeyTarget::Tasks,
                TaskWidgetEvent::Closed => KeyTarget::Mail,
            };
            if this.key_target != target {
                this.set_key_target(target, cx);
            }
        })
        .detach();

        let mut events = session.events().subscribe();
        cx.spawn(async move |this, cx| loop {
            match events.recv().await {
                Ok(event) => {
                    if this.update(cx, |window, cx| window.on_app_event(&event, cx)).is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Dropped {} app events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        })
        .detach();

        mail.update(cx, |view, cx| view.load_drafts(cx));

        Self {
            theme: Theme::dark(),
            focus_handle,
            active_overlay: ActiveOverlay::None,
            key_target: KeyTarget::Mail,
            mail,
            tasks,
            notifications,
            update_feed,
            toast: None,
            toast_generation: 0,
        }
    }

    fn on_app_event(&mut self, event: &AppEvent, cx: &mut Context<Self>) {
        tracing::debug!("App event: {:?}", event);
        if let Some(message) = toast_message(event) {
            self.show_toast(message, cx);
        }
    }

    fn show_toast(&mut self, message: String, cx: &mut Context<Self>) {
        self.toast_generation += 1;
        let generation = self.toast_generation;
        self.toast = Some(Toast {
            message,
            generation,
        });
        cx.notify();

        cx.spawn(async move |this, cx| {
            cx.background_executor().timer(TOAST_DURATION).await;
            let _ = this.update(cx, |window, cx| {
                if window.toast.as_ref().map(|t| t.generation) == Some(generation) {
                    window.toast = None;
                    cx.notify();
                }
            });
        })
        .detach();
    }

    fn dismiss_toast(&mut self, cx: &mut Context<Self>) {
        self.toast = None;
        cx.notify();
    }

    fn toggle_overlay(&mut self, overlay: ActiveOverlay, cx: &mut Context<Self>) {
        self.active_overlay = if self.active_overlay == overlay {
            ActiveOverlay::None
        } else {
            overlay
        };
        self.update_key_targets(cx);
    }

    fn dismiss_overlay(&mut self, cx: &mut Context<Self>) {
        self.active_overlay = ActiveOverlay::None;
        self.update_key_targets(cx);
    }

    fn set_key_target(&mut self, target: KeyTarget, cx: &mut Context<Self>) {
        self.key_target = target;
        self.update_key_targets(cx);
    }

    fn toggle_task_assistant(&mut self, cx: &mut Context<Self>) {
        self.tasks.update(cx, |view, cx| view.toggle(cx));
    }

    /// Tells each child whether it currently receives keys, so it can draw
    /// its caret.
    fn update_key_targets(&mut self, cx: &mut Context<Self>) {
        let no_overlay = self.active_overlay == ActiveOverlay::None;
        let tasks_open = self.tasks.read(cx).is_open();
        if !tasks_open && self.key_target == KeyTarget::Tasks {
            self.key_target = KeyTarget::Mail;
        }
        let target = self.key_target;
        self.mail
            .update(cx, |view, cx| view.set_active(no_overlay && target == KeyTarget::Mail, cx));
        self.tasks
            .update(cx, |view, cx| view.set_active(no_overlay && target == KeyTarget::Tasks, cx));
        cx.notify();
    }

    fn handle_key(&mut self, event: &KeyDownEvent, cx: &mut Context<Self>) -> bool {
        match self.active_overlay {
            ActiveOverlay::Notifications => self
                .notifications
                .update(cx, |view, cx| view.handle_key(event, cx)),
            ActiveOverlay::UpdateFeed => false,
            ActiveOverlay::None => match self.key_target {
                KeyTarget::Tasks => self.tasks.update(cx, |view, cx| view.handle_key(event, cx)),
                KeyTarget::Mail => self.mail.update(cx, |view, cx| view.handle_key(event, cx)),
            },
        }
    }

    /// Escape closes the innermost thing that is open.
    fn dismiss(&mut self, cx: &mut Context<Self>) {
        if self.active_overlay != ActiveOverlay::None {
            self.dismiss_overlay(cx);
        } else if self.tasks.read(cx).is_open() {
            self.tasks.update(cx, |view, cx| view.close(cx));
        } else if self.toast.is_some() {
            self.dismiss_toast(cx);
        }
    }

    fn render_header(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let colors = &self.theme.colors;
        let unread = self.notifications.read(cx).unread_count();
        let overlay = self.active_overlay;

        let nav_item = |id: &'static str, label: String, selected: bool| {
            let hover_bg = colors.surface_elevated;
            div()
                .id(id)
                .px(px(10.0))
                .py(px(6.0))
                .rounded(px(6.0))
                .cursor_pointer()
                .text_sm()
                .text_color(if selected {
                    colors.text_primary
                } else {
                    colors.text_secondary
                })
                .when(selected, |this| this.bg(colors.surface_elevated))
                .hover(move |style| style.bg(hover_bg))
                .child(SharedString::from(label))
        };

        div()
            .h(px(48.0))
            .flex_none()
            .flex()
            .items_center()
            .justify_between()
            .px(px(16.0))
            .bg(colors.surface)
            .border_b_1()
            .border_color(colors.border)
            .child(
                div()
                    .font_weight(FontWeight::SEMIBOLD)
                    .text_color(colors.text_primary)
                    .child(SharedString::from("SprintDesk")),
            )
            .child(
                div()
                    .flex()
                    .gap(px(4.0))
                    .child(
                        nav_item(
                            "nav-updates",
                            "Updates".to_string(),
                            overlay == ActiveOverlay::UpdateFeed,
                        )
                        .on_click(cx.listener(|this, _: &ClickEvent, _, cx| {
                            this.toggle_overlay(ActiveOverlay::UpdateFeed, cx);
                        })),
                    )
                    .child(
                        nav_item(
                            "nav-notifications",
                            if unread > 0 {
                                format!("Notifications ({})", unread)
                            } else {
                                "Notifications".to_string()
                            },
                            overlay == ActiveOverlay::Notifications,
                        )
                        .on_click(cx.listener(|this, _: &ClickEvent, _, cx| {
                            this.toggle_overlay(ActiveOverlay::Notifications, cx);
                        })),
                    ),
            )
    }

    fn render_toast(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let colors = &self.theme.colors;

        let Some(toast) = &self.toast else {
            return div().id("toast-empty");
        };

        div()
            .id("toast-container")
            .absolute()
            .bottom(px(40.0))
            .left_0()
            .right_0()
            .flex()
            .justify_center()
            .child(
                div()
                    .id("toast")
                    .flex()
                    .items_center()
                    .gap(px(12.0))
                    .px(px(16.0))
                    .py(px(10.0))
                    .bg(colors.surface_elevated)
                    .border_1()
                    .border_color(colors.border)
                    .rounded(px(8.0))
                    .shadow_lg()
                    .child(
                        div()
                            .text_sm()
                            .text_color(colors.text_primary)
                            .child(SharedString::from(toast.message.clone())),
                    )
                    .child(
                        div()
                            .id("toast-dismiss")
                            .text_xs()
                            .text_color(colors.text_muted)
                            .cursor_pointer()
                            .on_click(cx.listener(|this, _: &ClickEvent, _, cx| {
                                this.dismiss_toast(cx);
                            }))
                            .child(SharedString::from("[x]")),
                    ),
            )
    }
}

impl Focusable for MainWindow {
    fn focus_handle(&self, _cx: &gpui::App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

impl Render for MainWindow {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let colors = self.theme.colors;
        let overlay = self.active_overlay;

        div()
            .id("main-window")
            .key_context("MainWindow")
            .track_focus(&self.focus_handle)
            .size_full()
            .relative()
            .flex()
            .flex_col()
            .bg(colors.background)
            .text_color(colors.text_primary)
            .on_key_down(cx.listener(|this, event: &KeyDownEvent, _window, cx| {
                if this.handle_key(event, cx) {
                    cx.stop_propagation();
                }
            }))
            .on_action(cx.listener(|this, _: &Dismiss, _, cx| this.dismiss(cx)))
            .on_action(cx.listener(|this, _: &ToggleNotifications, _, cx| {
                this.toggle_overlay(ActiveOverlay::Notifications, cx);
            }))
            .on_action(cx.listener(|this, _: &ToggleUpdateFeed, _, cx| {
                this.toggle_overlay(ActiveOverlay::UpdateFeed, cx);
            }))
            .on_action(cx.listener(|this, _: &ToggleTaskAssistant, _, cx| {
                this.toggle_task_assistant(cx);
            }))
            .child(self.render_header(cx))
            .child(
                div()
                    .id("mail-area")
                    .flex_1()
                    .overflow_hidden()
                    .on_mouse_down(
                        MouseButton::Left,
                        cx.listener(|this, _: &MouseDownEvent, _, cx| {
                            if this.key_target != KeyTarget::Mail {
                                this.set_key_target(KeyTarget::Mail, cx);
                            }
                        }),
                    )
                    .child(self.mail.clone()),
            )
            .child(self.tasks.clone())
            .child(self.render_toast(cx))
            .when(overlay == ActiveOverlay::Notifications, |this| {
                this.child(self.notifications.clone())
            })
            .when(overlay == ActiveOverlay::UpdateFeed, |this| {
                this.child(self.update_feed.clone())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CreatedTask, DraftId};

    fn created(name: &str) -> CreatedTask {
        CreatedTask {
            id: Some(1),
            name: name.to_string(),
            external_id: None,
            due_date: None,
            extra: Default::default(),
        }
    }

    #[test]
    fn toast_messages_for_events() {
        assert_eq!(
            toast_message(&AppEvent::TasksCreated {
                tasks: vec![created("a"), created("b")]
            }),
            Some("2 tasks added to the sprint".to_string())
        );
        assert_eq!(
            toast_message(&AppEvent::TasksCreated {
                tasks: vec![created("a")]
            }),
            Some("1 task added to the sprint".to_string())
        );
        assert_eq!(
            toast_message(&AppEvent::DraftSent { id: DraftId(9) }),
            Some("Draft 9 sent".to_string())
        );
        assert_eq!(toast_message(&AppEvent::DraftGenerated { id: DraftId(9) }), None);
    }
}
