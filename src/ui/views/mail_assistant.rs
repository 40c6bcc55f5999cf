//! AI email drafting view.
//!
//! Left column lists past drafts; the right column holds the prompt, tone,
//! recipient and the editable draft. Requests run on the session runtime
//! and their results are applied back through [`MailAssistant`].

use std::rc::Rc;
use std::time::Duration;

use gpui::{
    div, prelude::FluentBuilder, px, ClickEvent, ClipboardItem, Context, FontWeight, Hsla,
    InteractiveElement, IntoElement, KeyDownEvent, ParentElement, Render, SharedString,
    StatefulInteractiveElement, Styled, Window,
};

use crate::app::mail_assistant::{GenerateOutcome, MailAssistant};
use crate::app::{AppEvent, Outcome, Session, StatusFilter};
use crate::domain::{Draft, DraftId, DraftStatus, Tone};
use crate::ui::components::{
    Button, ButtonVariant, KeyInputResult, SearchInput, TextArea, TextBuffer, TextInput,
};
use crate::ui::theme::{Theme, ThemeColors};

const NOTICE_DURATION: Duration = Duration::from_secs(3);

/// Field receiving key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailField {
    Prompt,
    Recipient,
    Subject,
    Body,
    Instructions,
    HistorySearch,
}

impl MailField {
    fn next(self) -> Self {
        match self {
            MailField::Prompt => MailField::Recipient,
            MailField::Recipient => MailField::Subject,
            MailField::Subject => MailField::Body,
            MailField::Body => MailField::Instructions,
            MailField::Instructions => MailField::HistorySearch,
            MailField::HistorySearch => MailField::Prompt,
        }
    }

    fn previous(self) -> Self {
        match self {
            MailField::Prompt => MailField::HistorySearch,
            MailField::Recipient => MailField::Prompt,
            MailField::Subject => MailField::Recipient,
            MailField::Body => MailField::Subject,
            MailField::Instructions => MailField::Body,
            MailField::HistorySearch => MailField::Instructions,
        }
    }
}

fn status_color(status: DraftStatus, colors: &ThemeColors) -> Hsla {
    match status {
        DraftStatus::Draft => colors.warning,
        DraftStatus::Sent => colors.success,
        DraftStatus::Failed => colors.error,
    }
}

pub struct MailAssistantView {
    session: Rc<Session>,
    theme: Theme,
    state: MailAssistant,
    prompt: TextBuffer,
    recipient: TextBuffer,
    subject: TextBuffer,
    body: TextBuffer,
    instructions: TextBuffer,
    history_search: TextBuffer,
    field: MailField,
    /// Whether the window routes key input here.
    active: bool,
    notice_generation: u64,
}

impl MailAssistantView {
    pub fn new(session: Rc<Session>, _cx: &mut Context<Self>) -> Self {
        let state = MailAssistant::new(session.config().fallback_delay());
        Self {
            session,
            theme: Theme::dark(),
            state,
            prompt: TextBuffer::multiline(),
            recipient: TextBuffer::new(),
            subject: TextBuffer::new(),
            body: TextBuffer::multiline(),
            instructions: TextBuffer::new(),
            history_search: TextBuffer::new(),
            field: MailField::Prompt,
            active: true,
            notice_generation: 0,
        }
    }

    pub fn set_active(&mut self, active: bool, cx: &mut Context<Self>) {
        if self.active != active {
            self.active = active;
            cx.notify();
        }
    }

    fn is_focused(&self, field: MailField) -> bool {
        self.active && self.field == field
    }

    fn focus_field(&mut self, field: MailField, cx: &mut Context<Self>) {
        self.field = field;
        cx.notify();
    }

    fn buffer_mut(&mut self, field: MailField) -> &mut TextBuffer {
        match field {
            MailField::Prompt => &mut self.prompt,
            MailField::Recipient => &mut self.recipient,
            MailField::Subject => &mut self.subject,
            MailField::Body => &mut self.body,
            MailField::Instructions => &mut self.instructions,
            MailField::HistorySearch => &mut self.history_search,
        }
    }

    /// Copies edited text into the composer state.
    fn push_field(&mut self, field: MailField) {
        match field {
            MailField::Prompt => self.state.set_prompt(self.prompt.text()),
            MailField::Recipient => self.state.set_recipient(self.recipient.text()),
            MailField::Subject => self.state.set_subject(self.subject.text()),
            MailField::Body => self.state.set_body(self.body.text()),
            MailField::HistorySearch => {
                let search = self.history_search.text().to_string();
                self.state.history_mut().set_search(search);
            }
            MailField::Instructions => {}
        }
    }

    /// Refreshes the buffers after the state changed underneath them.
    fn sync_from_state(&mut self) {
        fn sync(buffer: &mut TextBuffer, value: &str) {
            if buffer.text() != value {
                buffer.set_text(value);
            }
        }
        sync(&mut self.prompt, self.state.prompt());
        sync(&mut self.recipient, self.state.recipient());
        sync(&mut self.subject, self.state.subject());
        sync(&mut self.body, self.state.body());
    }

    /// Handles a key event while this view is the key target.
    pub fn handle_key(&mut self, event: &KeyDownEvent, cx: &mut Context<Self>) -> bool {
        if event.keystroke.key == "tab" {
            self.field = if event.keystroke.modifiers.shift {
                self.field.previous()
            } else {
                self.field.next()
            };
            cx.notify();
            return true;
        }

        let field = self.field;
        match self.buffer_mut(field).handle_key_event(event) {
            KeyInputResult::TextChanged => {
                self.push_field(field);
                cx.notify();
                true
            }
            KeyInputResult::Consumed => {
                cx.notify();
                true
            }
            KeyInputResult::Submit => {
                self.submit(field, cx);
                true
            }
            KeyInputResult::Cancel | KeyInputResult::Ignored => false,
        }
    }

    fn submit(&mut self, field: MailField, cx: &mut Context<Self>) {
        match field {
            MailField::Prompt => self.generate(cx),
            MailField::Recipient | MailField::Subject => self.focus_field(field.next(), cx),
            MailField::Body => self.send(cx),
            MailField::Instructions => self.refine(cx),
            MailField::HistorySearch => {}
        }
    }

    fn show_notice(&mut self, cx: &mut Context<Self>) {
        self.notice_generation += 1;
        let generation = self.notice_generation;
        cx.spawn(async move |this, cx| {
            cx.background_executor().timer(NOTICE_DURATION).await;
            let _ = this.update(cx, |view, cx| {
                if view.notice_generation == generation {
                    view.state.dismiss_notice();
                    cx.notify();
                }
            });
        })
        .detach();
    }

    pub fn generate(&mut self, cx: &mut Context<Self>) {
        let pending = match self.state.begin_generate(self.session.credential()) {
            Ok(pending) => pending,
            Err(_) => {
                cx.notify();
                return;
            }
        };
        let Some(credential) = self.session.credential().cloned() else {
            return;
        };
        let api = self.session.services().email.clone();
        let request = pending.request.clone();
        let response = self
            .session
            .spawn(async move { api.generate_draft(&credential, &request).await });
        let delay = self.state.fallback_delay();
        self.sync_from_state();
        cx.notify();

        cx.spawn(async move |this, cx| {
            let result = response.await;
            let fallback = this
                .update(cx, |view, cx| {
                    let outcome = view.state.finish_generate(pending, result);
                    view.sync_from_state();
                    let fallback = match outcome {
                        GenerateOutcome::Applied => {
                            if let Some(id) = view.state.draft_id() {
                                view.session.events().publish(AppEvent::DraftGenerated { id });
                            }
                            view.show_notice(cx);
                            None
                        }
                        GenerateOutcome::Unavailable(fallback) => Some(fallback),
                        GenerateOutcome::Stale | GenerateOutcome::Failed(_) => None,
                    };
                    cx.notify();
                    fallback
                })
                .ok()
                .flatten();

            if let Some(fallback) = fallback {
                cx.background_executor().timer(delay).await;
                let _ = this.update(cx, |view, cx| {
                    if view.state.apply_fallback(fallback) == Outcome::Applied {
                        view.sync_from_state();
                    }
                    cx.notify();
                });
            }
        })
        .detach();
    }

    fn regenerate(&mut self, cx: &mut Context<Self>) {
        if !self.state.prompt().trim().is_empty() {
            self.generate(cx);
        }
    }

    fn refine(&mut self, cx: &mut Context<Self>) {
        let instructions = self.instructions.text().to_string();
        let pending = match self
            .state
            .begin_refine(&instructions, self.session.credential())
        {
            Ok(pending) => pending,
            Err(_) => {
                cx.notify();
                return;
            }
        };
        let Some(credential) = self.session.credential().cloned() else {
            return;
        };
        let api = self.session.services().email.clone();
        let request = pending.request.clone();
        let response = self
            .session
            .spawn(async move { api.refine_draft(&credential, &request).await });
        cx.notify();

        cx.spawn(async move |this, cx| {
            let result = response.await;
            let _ = this.update(cx, |view, cx| {
                if view.state.finish_refine(pending, result) == Outcome::Applied {
                    view.instructions.clear();
                    view.sync_from_state();
                    view.show_notice(cx);
                }
                cx.notify();
            });
        })
        .detach();
    }

    pub fn send(&mut self, cx: &mut Context<Self>) {
        let pending = match self.state.begin_send(self.session.credential()) {
            Ok(pending) => pending,
            Err(_) => {
                cx.notify();
                return;
            }
        };
        let Some(credential) = self.session.credential().cloned() else {
            return;
        };
        let api = self.session.services().email.clone();
        let request = pending.request.clone();
        let id = request.draft_id;
        let response = self
            .session
            .spawn(async move { api.send_draft(&credential, &request).await });
        cx.notify();

        cx.spawn(async move |this, cx| {
            let result = response.await;
            let _ = this.update(cx, |view, cx| {
                if view.state.finish_send(pending, result) == Outcome::Applied {
                    view.session.events().publish(AppEvent::DraftSent { id });
                    view.show_notice(cx);
                }
                cx.notify();
            });
        })
        .detach();
    }

    /// Fetches the draft listing. Skipped without a credential.
    pub fn load_drafts(&mut self, cx: &mut Context<Self>) {
        let Some(ticket) = self.state.begin_load_drafts(self.session.credential()) else {
            tracing::debug!("Skipping draft listing without a credential");
            return;
        };
        let Some(credential) = self.session.credential().cloned() else {
            return;
        };
        let api = self.session.services().email.clone();
        let response = self
            .session
            .spawn(async move { api.list_drafts(&credential).await });

        cx.spawn(async move |this, cx| {
            let result = response.await;
            let _ = this.update(cx, |view, cx| {
                if view.state.finish_load_drafts(ticket, result) == Outcome::Applied {
                    view.sync_from_state();
                }
                cx.notify();
            });
        })
        .detach();
    }

    fn load_entry(&mut self, id: DraftId, cx: &mut Context<Self>) {
        if self.state.load_from_history(id) {
            self.instructions.clear();
            self.sync_from_state();
            cx.notify();
        }
    }

    fn copy_to_clipboard(&mut self, cx: &mut Context<Self>) {
        let text = self.state.clipboard_text();
        if !text.is_empty() {
            cx.write_to_clipboard(ClipboardItem::new_string(text));
            tracing::debug!("Copied draft to clipboard");
        }
    }

    fn focusable(
        &self,
        id: &'static str,
        field: MailField,
        child: impl IntoElement,
        cx: &mut Context<Self>,
    ) -> impl IntoElement {
        div()
            .id(id)
            .w_full()
            .on_click(cx.listener(move |this, _: &ClickEvent, _, cx| {
                this.focus_field(field, cx);
            }))
            .child(child)
    }

    fn render_label(&self, text: &'static str) -> impl IntoElement {
        div()
            .text_xs()
            .font_weight(FontWeight::MEDIUM)
            .text_color(self.theme.colors.text_secondary)
            .child(SharedString::from(text))
    }

    fn render_history_row(
        &self,
        ix: usize,
        draft: &Draft,
        cx: &mut Context<Self>,
    ) -> impl IntoElement {
        let colors = &self.theme.colors;
        let id = draft.id;
        let selected = self.state.draft_id() == Some(id);
        let hover_bg = colors.surface_elevated;

        div()
            .id(("draft-row", ix))
            .px(px(12.0))
            .py(px(8.0))
            .flex()
            .flex_col()
            .gap(px(2.0))
            .rounded(px(6.0))
            .cursor_pointer()
            .when(selected, |this| this.bg(colors.surface_elevated))
            .hover(move |style| style.bg(hover_bg))
            .on_click(cx.listener(move |this, _: &ClickEvent, _, cx| {
                this.load_entry(id, cx);
            }))
            .child(
                div()
                    .flex()
                    .items_center()
                    .justify_between()
                    .gap(px(8.0))
                    .child(
                        div()
                            .flex_1()
                            .overflow_hidden()
                            .text_sm()
                            .text_color(colors.text_primary)
                            .child(SharedString::from(draft.display_subject().to_string())),
                    )
                    .child(
                        div()
                            .text_xs()
                            .text_color(status_color(draft.status, colors))
                            .child(SharedString::from(draft.status.badge())),
                    ),
            )
            .child(
                div()
                    .flex()
                    .justify_between()
                    .text_xs()
                    .text_color(colors.text_muted)
                    .child(SharedString::from(draft.display_recipient().to_string()))
                    .child(SharedString::from(
                        draft.created_at.format("%b %d, %H:%M").to_string(),
                    )),
            )
    }

    fn render_history(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let colors = &self.theme.colors;
        let history = self.state.history();
        let visible = history.visible();
        let active_filter = history.filter();

        let filters = StatusFilter::all().iter().map(|filter| {
            let filter = *filter;
            Button::new(SharedString::from(format!("filter-{}", filter.label())), filter.label())
                .variant(ButtonVariant::Ghost)
                .selected(filter == active_filter)
                .on_click(cx.listener(move |this, _: &ClickEvent, _, cx| {
                    this.state.history_mut().set_filter(filter);
                    cx.notify();
                }))
        })
        .collect::<Vec<_>>();

        let rows: Vec<_> = visible
            .iter()
            .enumerate()
            .map(|(ix, draft)| self.render_history_row(ix, draft, cx).into_any_element())
            .collect();
        let empty_text = if history.is_empty() {
            "No drafts yet"
        } else {
            "No drafts match"
        };

        div()
            .w(px(280.0))
            .h_full()
            .flex()
            .flex_col()
            .gap(px(8.0))
            .p(px(12.0))
            .border_r_1()
            .border_color(colors.border)
            .bg(colors.background)
            .child(
                div()
                    .flex()
                    .justify_between()
                    .items_center()
                    .child(
                        div()
                            .font_weight(FontWeight::SEMIBOLD)
                            .text_color(colors.text_primary)
                            .child(SharedString::from("History")),
                    )
                    .child(
                        div()
                            .text_xs()
                            .text_color(colors.text_muted)
                            .child(SharedString::from(history.len().to_string())),
                    ),
            )
            .child(div().flex().gap(px(4.0)).children(filters))
            .child(self.focusable(
                "history-search-field",
                MailField::HistorySearch,
                SearchInput::new(
                    "history-search",
                    &self.history_search,
                    self.is_focused(MailField::HistorySearch),
                )
                .placeholder("Search subject or recipient"),
                cx,
            ))
            .child(
                div()
                    .id("history-list")
                    .flex_1()
                    .overflow_y_scroll()
                    .flex()
                    .flex_col()
                    .gap(px(2.0))
                    .when(rows.is_empty(), |this| {
                        this.child(
                            div()
                                .py(px(24.0))
                                .text_sm()
                                .text_center()
                                .text_color(colors.text_muted)
                                .child(SharedString::from(empty_text)),
                        )
                    })
                    .children(rows),
            )
    }

    fn render_banner(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let colors = &self.theme.colors;
        let error = self.state.error().map(str::to_string);
        let notice = self.state.notice().map(str::to_string);

        div()
            .flex()
            .flex_col()
            .gap(px(6.0))
            .when_some(error, |this, error| {
                this.child(
                    div()
                        .id("mail-error")
                        .flex()
                        .justify_between()
                        .px(px(12.0))
                        .py(px(8.0))
                        .rounded(px(6.0))
                        .border_1()
                        .border_color(colors.error)
                        .text_sm()
                        .text_color(colors.error)
                        .child(SharedString::from(error))
                        .child(
                            div()
                                .id("mail-error-dismiss")
                                .cursor_pointer()
                                .text_color(colors.text_muted)
                                .on_click(cx.listener(|this, _: &ClickEvent, _, cx| {
                                    this.state.dismiss_error();
                                    cx.notify();
                                }))
                                .child(SharedString::from("[x]")),
                        ),
                )
            })
            .when_some(notice, |this, notice| {
                this.child(
                    div()
                        .px(px(12.0))
                        .py(px(8.0))
                        .rounded(px(6.0))
                        .border_1()
                        .border_color(colors.success)
                        .text_sm()
                        .text_color(colors.success)
                        .child(SharedString::from(notice)),
                )
            })
    }

    fn render_prompt_section(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let current_tone = self.state.tone();
        let generating = self.state.is_generating();
        let prompt_empty = self.state.prompt().trim().is_empty();

        let tones = Tone::all().iter().map(|tone| {
            let tone = *tone;
            Button::new(SharedString::from(format!("tone-{}", tone.as_str())), tone.label())
                .variant(ButtonVariant::Secondary)
                .selected(tone == current_tone)
                .on_click(cx.listener(move |this, _: &ClickEvent, _, cx| {
                    this.state.set_tone(tone);
                    cx.notify();
                }))
        })
        .collect::<Vec<_>>();

        div()
            .flex()
            .flex_col()
            .gap(px(8.0))
            .child(self.render_label("What should the email say?"))
            .child(self.focusable(
                "prompt-field",
                MailField::Prompt,
                TextArea::new("prompt")
                    .placeholder("e.g. Remind the client that invoice #42 is due on Friday")
                    .rows(3)
                    .buffer(&self.prompt, self.is_focused(MailField::Prompt)),
                cx,
            ))
            .child(self.render_label("Tone"))
            .child(div().flex().gap(px(6.0)).children(tones))
            .child(self.render_label("Recipient"))
            .child(self.focusable(
                "recipient-field",
                MailField::Recipient,
                TextInput::new("recipient")
                    .placeholder("recipient@example.com")
                    .buffer(&self.recipient, self.is_focused(MailField::Recipient)),
                cx,
            ))
            .child(
                div()
                    .flex()
                    .gap(px(8.0))
                    .child(
                        Button::new(
                            "generate",
                            if generating {
                                "Generating..."
                            } else {
                                "Generate"
                            },
                        )
                        .disabled(generating || prompt_empty)
                        .on_click(cx.listener(|this, _: &ClickEvent, _, cx| {
                            this.generate(cx);
                        })),
                    )
                    .child(
                        Button::new("regenerate", "Regenerate")
                            .variant(ButtonVariant::Ghost)
                            .disabled(generating || prompt_empty)
                            .on_click(cx.listener(|this, _: &ClickEvent, _, cx| {
                                this.regenerate(cx);
                            })),
                    ),
            )
    }

    fn render_draft_section(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let colors = &self.theme.colors;
        let refining = self.state.is_refining();
        let has_draft = self.state.draft_id().is_some();

        div()
            .flex()
            .flex_col()
            .gap(px(8.0))
            .pt(px(12.0))
            .border_t_1()
            .border_color(colors.border)
            .child(
                div()
                    .flex()
                    .justify_between()
                    .items_center()
                    .child(self.render_label("Subject"))
                    .when_some(self.state.status(), |this, status| {
                        this.child(
                            div()
                                .text_xs()
                                .text_color(status_color(status, colors))
                                .child(SharedString::from(status.badge())),
                        )
                    }),
            )
            .child(self.focusable(
                "subject-field",
                MailField::Subject,
                TextInput::new("subject")
                    .placeholder("Subject")
                    .buffer(&self.subject, self.is_focused(MailField::Subject)),
                cx,
            ))
            .child(self.render_label("Body"))
            .child(self.focusable(
                "body-field",
                MailField::Body,
                TextArea::new("body")
                    .placeholder(if self.state.is_generating() {
                        "Writing your email..."
                    } else {
                        "Your generated email will appear here"
                    })
                    .rows(10)
                    .buffer(&self.body, self.is_focused(MailField::Body)),
                cx,
            ))
            .child(
                div()
                    .flex()
                    .gap(px(8.0))
                    .items_center()
                    .child(
                        div().flex_1().child(self.focusable(
                            "instructions-field",
                            MailField::Instructions,
                            TextInput::new("instructions")
                                .placeholder("Ask for changes, e.g. make it shorter")
                                .disabled(!has_draft)
                                .buffer(
                                    &self.instructions,
                                    self.is_focused(MailField::Instructions),
                                ),
                            cx,
                        )),
                    )
                    .child(
                        Button::new("refine", if refining { "Updating..." } else { "Refine" })
                            .variant(ButtonVariant::Secondary)
                            .disabled(!has_draft || refining)
                            .on_click(cx.listener(|this, _: &ClickEvent, _, cx| {
                                this.refine(cx);
                            })),
                    ),
            )
    }

    fn render_footer(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let colors = &self.theme.colors;
        let send_label = if self.state.is_sending() {
            "Sending..."
        } else if self.state.status() == Some(DraftStatus::Sent) {
            "Sent"
        } else {
            "Send"
        };

        div()
            .flex()
            .items_center()
            .justify_between()
            .pt(px(12.0))
            .border_t_1()
            .border_color(colors.border)
            .child(
                div()
                    .text_sm()
                    .text_color(colors.text_muted)
                    .child(SharedString::from(self.state.status_label())),
            )
            .child(
                div()
                    .flex()
                    .gap(px(8.0))
                    .child(
                        Button::new("copy", "Copy")
                            .variant(ButtonVariant::Ghost)
                            .disabled(self.state.body().is_empty())
                            .on_click(cx.listener(|this, _: &ClickEvent, _, cx| {
                                this.copy_to_clipboard(cx);
                            })),
                    )
                    .child(
                        Button::new("send", send_label)
                            .disabled(!self.state.can_send())
                            .on_click(cx.listener(|this, _: &ClickEvent, _, cx| {
                                this.send(cx);
                            })),
                    ),
            )
    }
}

impl Render for MailAssistantView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let colors = self.theme.colors;

        div()
            .id("mail-assistant")
            .size_full()
            .flex()
            .bg(colors.background)
            .child(self.render_history(cx))
            .child(
                div()
                    .id("composer")
                    .flex_1()
                    .h_full()
                    .overflow_y_scroll()
                    .p(px(20.0))
                    .flex()
                    .flex_col()
                    .gap(px(12.0))
                    .child(
                        div()
                            .text_lg()
                            .font_weight(FontWeight::SEMIBOLD)
                            .text_color(colors.text_primary)
                            .child(SharedString::from("AI Email Assistant")),
                    )
                    .child(self.render_banner(cx))
                    .child(self.render_prompt_section(cx))
                    .child(self.render_draft_section(cx))
                    .child(self.render_footer(cx)),
            )
    }
}
