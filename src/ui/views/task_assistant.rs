//! Floating task generator widget.
//!
//! Collapsed it is a single button in the bottom-right corner; expanded it
//! shows the sprint picker, the transcript and the prompt box.

use std::rc::Rc;

use chrono::Utc;
use gpui::{
    div, prelude::FluentBuilder, px, AnyElement, ClickEvent, Context, EventEmitter, FontWeight,
    Hsla, InteractiveElement, IntoElement, KeyDownEvent, MouseButton, MouseDownEvent,
    ParentElement, Render, SharedString, StatefulInteractiveElement, Styled, Window,
};

use crate::app::{Session, TaskAssistant};
use crate::domain::{ConversationTurn, SprintId, SuggestedTask, TurnKind};
use crate::services::materializer;
use crate::ui::components::{Button, ButtonVariant, KeyInputResult, TextArea, TextBuffer};
use crate::ui::theme::{Theme, ThemeColors};

fn turn_color(kind: TurnKind, colors: &ThemeColors) -> Hsla {
    match kind {
        TurnKind::User => colors.accent,
        TurnKind::Ai => colors.surface_elevated,
        TurnKind::System => colors.surface,
        TurnKind::Error => colors.error,
    }
}

fn hours_label(task: &SuggestedTask) -> String {
    match task.estimated_hours {
        Some(hours) if hours > 0.0 => format!("{}h", hours),
        _ => "-".to_string(),
    }
}

/// Tells the window where key input should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskWidgetEvent {
    Opened,
    Closed,
    /// The open panel was clicked.
    Focused,
}

pub struct TaskAssistantView {
    session: Rc<Session>,
    theme: Theme,
    state: TaskAssistant,
    prompt: TextBuffer,
    active: bool,
}

impl EventEmitter<TaskWidgetEvent> for TaskAssistantView {}

impl TaskAssistantView {
    pub fn new(session: Rc<Session>, _cx: &mut Context<Self>) -> Self {
        let config = session.config();
        let mut state = TaskAssistant::new(config.project_id, config.user_id);
        state.set_sprints(config.sprints.clone());
        Self {
            session,
            theme: Theme::dark(),
            state,
            prompt: TextBuffer::multiline(),
            active: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn set_active(&mut self, active: bool, cx: &mut Context<Self>) {
        if self.active != active {
            self.active = active;
            cx.notify();
        }
    }

    pub fn toggle(&mut self, cx: &mut Context<Self>) {
        self.state.toggle();
        cx.emit(if self.state.is_open() {
            TaskWidgetEvent::Opened
        } else {
            TaskWidgetEvent::Closed
        });
        cx.notify();
    }

    pub fn close(&mut self, cx: &mut Context<Self>) {
        self.state.close();
        cx.emit(TaskWidgetEvent::Closed);
        cx.notify();
    }

    pub fn handle_key(&mut self, event: &KeyDownEvent, cx: &mut Context<Self>) -> bool {
        if !self.state.is_open() {
            return false;
        }
        match self.prompt.handle_key_event(event) {
            KeyInputResult::TextChanged => {
                self.state.set_prompt(self.prompt.text());
                cx.notify();
                true
            }
            KeyInputResult::Consumed => {
                cx.notify();
                true
            }
            KeyInputResult::Submit => {
                self.submit_prompt(cx);
                true
            }
            KeyInputResult::Cancel | KeyInputResult::Ignored => false,
        }
    }

    fn sync_prompt(&mut self) {
        if self.prompt.text() != self.state.prompt() {
            self.prompt.set_text(self.state.prompt());
        }
    }

    pub fn submit_prompt(&mut self, cx: &mut Context<Self>) {
        let pending = match self.state.begin_analyze() {
            Ok(pending) => pending,
            Err(_) => {
                cx.notify();
                return;
            }
        };
        let api = self.session.services().projects.clone();
        let request = pending.request.clone();
        let response = self
            .session
            .spawn(async move { api.analyze_project(&request).await });
        cx.notify();

        cx.spawn(async move |this, cx| {
            let result = response.await;
            let _ = this.update(cx, |view, cx| {
                view.state.finish_analyze(pending, result);
                view.sync_prompt();
                cx.notify();
            });
        })
        .detach();
    }

    fn confirm(
        &mut self,
        tasks: Vec<SuggestedTask>,
        sprint_id: Option<SprintId>,
        cx: &mut Context<Self>,
    ) {
        let pending = match self.state.begin_confirm(
            &tasks,
            sprint_id,
            self.session.credential(),
            Utc::now(),
        ) {
            Ok(pending) => pending,
            Err(_) => {
                cx.notify();
                return;
            }
        };
        let Some(credential) = self.session.credential().cloned() else {
            return;
        };
        let api = self.session.services().tasks.clone();
        let requests = pending.requests.clone();
        let response = self.session.spawn(async move {
            materializer::materialize(api.as_ref(), &credential, &requests).await
        });
        cx.notify();

        cx.spawn(async move |this, cx| {
            let result = response.await;
            let _ = this.update(cx, |view, cx| {
                view.state
                    .finish_confirm(pending, result, view.session.events());
                cx.notify();
            });
        })
        .detach();
    }

    fn clear(&mut self, cx: &mut Context<Self>) {
        self.state.clear_conversation();
        cx.notify();
    }

    fn render_launcher(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let colors = &self.theme.colors;
        let hover_bg = colors.accent_hover;
        div()
            .id("task-assistant-launcher")
            .absolute()
            .bottom(px(24.0))
            .right(px(24.0))
            .px(px(18.0))
            .py(px(12.0))
            .rounded(px(24.0))
            .bg(colors.accent)
            .shadow_lg()
            .cursor_pointer()
            .hover(move |style| style.bg(hover_bg))
            .occlude()
            .text_sm()
            .font_weight(FontWeight::SEMIBOLD)
            .text_color(colors.text_primary)
            .on_click(cx.listener(|this, _: &ClickEvent, _, cx| this.toggle(cx)))
            .child(SharedString::from("AI Tasks"))
    }

    fn render_sprints(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let colors = &self.theme.colors;
        let selected = self.state.selected_sprint();
        let chips = self
            .state
            .sprints()
            .iter()
            .map(|sprint| {
                let id = sprint.id;
                let label = if sprint.active {
                    format!("{} (active)", sprint.name)
                } else {
                    sprint.name.clone()
                };
                Button::new(SharedString::from(format!("sprint-{}", id)), label)
                    .variant(ButtonVariant::Secondary)
                    .selected(selected == Some(id))
                    .on_click(cx.listener(move |this, _: &ClickEvent, _, cx| {
                        this.state.select_sprint(id);
                        cx.notify();
                    }))
            })
            .collect::<Vec<_>>();

        div()
            .flex()
            .flex_wrap()
            .gap(px(6.0))
            .px(px(12.0))
            .py(px(8.0))
            .border_b_1()
            .border_color(colors.border)
            .when(chips.is_empty(), |this| {
                this.child(
                    div()
                        .text_xs()
                        .text_color(colors.text_muted)
                        .child(SharedString::from("No sprints configured")),
                )
            })
            .children(chips)
    }

    fn render_task_list(&self, tasks: &[SuggestedTask]) -> impl IntoElement {
        let colors = &self.theme.colors;
        div()
            .flex()
            .flex_col()
            .gap(px(4.0))
            .mt(px(6.0))
            .children(tasks.iter().map(|task| {
                div()
                    .flex()
                    .justify_between()
                    .gap(px(8.0))
                    .px(px(8.0))
                    .py(px(4.0))
                    .rounded(px(4.0))
                    .bg(colors.background)
                    .text_xs()
                    .child(
                        div()
                            .flex_1()
                            .text_color(colors.text_primary)
                            .child(SharedString::from(task.name.clone())),
                    )
                    .child(
                        div()
                            .text_color(colors.text_muted)
                            .child(SharedString::from(format!(
                                "{} · {}",
                                hours_label(task),
                                task.priority.as_deref().unwrap_or("medium")
                            ))),
                    )
            }))
    }

    fn render_turn(
        &self,
        ix: usize,
        turn: &ConversationTurn,
        cx: &mut Context<Self>,
    ) -> AnyElement {
        let colors = &self.theme.colors;
        let is_user = turn.kind == TurnKind::User;
        let adding = self.state.is_adding();

        let confirm = turn.is_confirmation().then(|| {
            let tasks = turn.tasks.clone();
            let sprint_id = turn.sprint_id;
            let count = tasks.len();
            Button::new(("confirm-tasks", ix), if adding {
                "Adding...".to_string()
            } else {
                format!("Add {} tasks", count)
            })
            .disabled(adding)
            .on_click(cx.listener(move |this, _: &ClickEvent, _, cx| {
                this.confirm(tasks.clone(), sprint_id, cx);
            }))
        });

        div()
            .id(("turn", ix))
            .flex()
            .when(is_user, |this| this.justify_end())
            .child(
                div()
                    .max_w(px(300.0))
                    .px(px(10.0))
                    .py(px(8.0))
                    .rounded(px(8.0))
                    .bg(turn_color(turn.kind, colors))
                    .text_sm()
                    .text_color(colors.text_primary)
                    .when(turn.is_loading(), |this| this.text_color(colors.text_muted))
                    .when(is_user, |this| {
                        this.when_some(turn.sprint_name.clone(), |this, name| {
                            this.child(
                                div()
                                    .text_xs()
                                    .text_color(colors.text_secondary)
                                    .child(SharedString::from(format!("Sprint: {}", name))),
                            )
                        })
                    })
                    .child(SharedString::from(turn.content.clone()))
                    .when(turn.kind == TurnKind::Ai && !turn.tasks.is_empty(), |this| {
                        this.child(self.render_task_list(&turn.tasks))
                    })
                    .when_some(confirm, |this, button| {
                        this.child(div().mt(px(8.0)).child(button))
                    }),
            )
            .into_any_element()
    }

    fn render_panel(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let colors = &self.theme.colors;
        let analyzing = self.state.is_analyzing();
        let prompt_empty = self.state.prompt().trim().is_empty();

        let turns: Vec<AnyElement> = self
            .state
            .transcript()
            .enumerate()
            .map(|(ix, turn)| self.render_turn(ix, turn, cx))
            .collect();
        let empty = turns.is_empty();

        div()
            .id("task-assistant")
            .absolute()
            .bottom(px(24.0))
            .right(px(24.0))
            .w(px(380.0))
            .h(px(540.0))
            .flex()
            .flex_col()
            .bg(colors.surface)
            .border_1()
            .border_color(if self.active {
                colors.accent
            } else {
                colors.border
            })
            .rounded(px(12.0))
            .shadow_lg()
            .overflow_hidden()
            .occlude()
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|_, _: &MouseDownEvent, _, cx| cx.emit(TaskWidgetEvent::Focused)),
            )
            .child(
                div()
                    .flex()
                    .items_center()
                    .justify_between()
                    .px(px(12.0))
                    .py(px(10.0))
                    .border_b_1()
                    .border_color(colors.border)
                    .child(
                        div()
                            .font_weight(FontWeight::SEMIBOLD)
                            .text_color(colors.text_primary)
                            .child(SharedString::from("AI Task Generator")),
                    )
                    .child(
                        div()
                            .flex()
                            .gap(px(4.0))
                            .child(
                                Button::new("clear-conversation", "Clear")
                                    .variant(ButtonVariant::Ghost)
                                    .disabled(empty)
                                    .on_click(cx.listener(|this, _: &ClickEvent, _, cx| {
                                        this.clear(cx);
                                    })),
                            )
                            .child(
                                Button::new("close-task-assistant", "Close")
                                    .variant(ButtonVariant::Ghost)
                                    .on_click(cx.listener(|this, _: &ClickEvent, _, cx| {
                                        this.close(cx);
                                    })),
                            ),
                    ),
            )
            .child(self.render_sprints(cx))
            .child(
                div()
                    .id("transcript")
                    .flex_1()
                    .overflow_y_scroll()
                    .p(px(12.0))
                    .flex()
                    .flex_col()
                    .gap(px(8.0))
                    .when(empty, |this| {
                        this.child(
                            div()
                                .text_sm()
                                .text_color(colors.text_muted)
                                .child(SharedString::from(
                                    "Describe the work you have in mind and I'll break it into tasks.",
                                )),
                        )
                    })
                    .children(turns),
            )
            .when_some(self.state.error().map(str::to_string), |this, error| {
                this.child(
                    div()
                        .px(px(12.0))
                        .py(px(6.0))
                        .text_xs()
                        .text_color(colors.error)
                        .child(SharedString::from(error)),
                )
            })
            .child(
                div()
                    .flex()
                    .flex_col()
                    .gap(px(8.0))
                    .p(px(12.0))
                    .border_t_1()
                    .border_color(colors.border)
                    .child(
                        TextArea::new("task-prompt")
                            .placeholder("e.g. Build a checkout flow with Stripe payments")
                            .rows(2)
                            .disabled(analyzing)
                            .buffer(&self.prompt, self.active),
                    )
                    .child(
                        div().flex().justify_end().child(
                            Button::new(
                                "analyze",
                                if analyzing {
                                    "Analyzing..."
                                } else {
                                    "Generate tasks"
                                },
                            )
                            .disabled(analyzing || prompt_empty)
                            .on_click(cx.listener(|this, _: &ClickEvent, _, cx| {
                                this.submit_prompt(cx);
                            })),
                        ),
                    ),
            )
    }
}

impl Render for TaskAssistantView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        if self.state.is_open() {
            self.render_panel(cx).into_any_element()
        } else {
            self.render_launcher(cx).into_any_element()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_label_hides_missing_estimates() {
        assert_eq!(hours_label(&SuggestedTask::new("a").with_hours(6.0)), "6h");
        assert_eq!(hours_label(&SuggestedTask::new("a").with_hours(1.5)), "1.5h");
        assert_eq!(hours_label(&SuggestedTask::new("a").with_hours(0.0)), "-");
        assert_eq!(hours_label(&SuggestedTask::new("a")), "-");
    }

    #[test]
    fn user_turns_use_accent() {
        let colors = ThemeColors::dark();
        assert_eq!(turn_color(TurnKind::User, &colors), colors.accent);
        assert_eq!(turn_color(TurnKind::Error, &colors), colors.error);
    }
}
