//! Editable text with a cursor.
//!
//! Views own one buffer per field and feed it key events from their
//! `on_key_down` handler. Multiline buffers insert a newline on enter and
//! submit on cmd-enter.

/// Modifier state relevant to text editing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub cmd: bool,
}

impl From<&gpui::Modifiers> for EditModifiers {
    fn from(modifiers: &gpui::Modifiers) -> Self {
        Self {
            shift: modifiers.shift,
            ctrl: modifiers.control,
            cmd: modifiers.platform,
        }
    }
}

/// How a key event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInputResult {
    TextChanged,
    /// Cursor moved, text unchanged.
    Consumed,
    Submit,
    Cancel,
    /// Left for the parent, e.g. tab to move between fields.
    Ignored,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    /// Byte offset, always on a char boundary.
    cursor: usize,
    multiline: bool,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn multiline() -> Self {
        Self {
            multiline: true,
            ..Self::default()
        }
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        let mut buffer = Self::new();
        buffer.set_text(text);
        buffer
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    /// Replaces the text and moves the cursor to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert_str(&mut self, s: &str) {
        let s = if self.multiline {
            s.to_string()
        } else {
            s.replace(['\n', '\r'], " ")
        };
        self.text.insert_str(self.cursor, &s);
        self.cursor += s.len();
    }

    fn backspace(&mut self) -> bool {
        match self.prev_boundary() {
            Some(prev) => {
                self.text.replace_range(prev..self.cursor, "");
                self.cursor = prev;
                true
            }
            None => false,
        }
    }

    fn delete(&mut self) -> bool {
        match self.next_boundary() {
            Some(next) => {
                self.text.replace_range(self.cursor..next, "");
                true
            }
            None => false,
        }
    }

    fn delete_word_backward(&mut self) -> bool {
        let head = &self.text[..self.cursor];
        let trimmed = head.trim_end();
        let start = trimmed
            .rfind(char::is_whitespace)
            .map(|i| i + trimmed[i..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(0);
        if start == self.cursor {
            return false;
        }
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
        true
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor].char_indices().last().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }

    fn line_start(&self) -> usize {
        self.text[..self.cursor].rfind('\n').map_or(0, |i| i + 1)
    }

    fn line_end(&self) -> usize {
        self.text[self.cursor..]
            .find('\n')
            .map_or(self.text.len(), |i| self.cursor + i)
    }

    /// Text with a caret at the cursor, for rendering a focused field.
    pub fn display_with_caret(&self) -> String {
        let mut shown = String::with_capacity(self.text.len() + 1);
        shown.push_str(&self.text[..self.cursor]);
        shown.push('|');
        shown.push_str(&self.text[self.cursor..]);
        shown
    }

    pub fn handle_key_event(&mut self, event: &gpui::KeyDownEvent) -> KeyInputResult {
        let keystroke = &event.keystroke;
        self.process_key(
            &keystroke.key,
            keystroke.key_char.as_deref(),
            EditModifiers::from(&keystroke.modifiers),
        )
    }

    /// Applies one key event.
    ///
    /// `key_char` is the character the keystroke produces, when it produces
    /// one; it already accounts for shift and keyboard layout.
    pub fn process_key(
        &mut self,
        key: &str,
        key_char: Option<&str>,
        modifiers: EditModifiers,
    ) -> KeyInputResult {
        match key {
            "backspace" => {
                let changed = if modifiers.ctrl || modifiers.cmd {
                    self.delete_word_backward()
                } else {
                    self.backspace()
                };
                changed_or_consumed(changed)
            }
            "delete" => changed_or_consumed(self.delete()),
            "left" => {
                if let Some(prev) = self.prev_boundary() {
                    self.cursor = prev;
                }
                KeyInputResult::Consumed
            }
            "right" => {
                if let Some(next) = self.next_boundary() {
                    self.cursor = next;
                }
                KeyInputResult::Consumed
            }
            "home" => {
                self.cursor = self.line_start();
                KeyInputResult::Consumed
            }
            "end" => {
                self.cursor = self.line_end();
                KeyInputResult::Consumed
            }
            "enter" if self.multiline && !modifiers.cmd => {
                self.insert_str("\n");
                KeyInputResult::TextChanged
            }
            "enter" => KeyInputResult::Submit,
            "escape" => KeyInputResult::Cancel,
            "tab" => KeyInputResult::Ignored,
            "space" => {
                self.insert_str(" ");
                KeyInputResult::TextChanged
            }
            _ if modifiers.cmd || modifiers.ctrl => KeyInputResult::Ignored,
            _ => {
                let typed = key_char
                    .filter(|c| !c.is_empty() && !c.chars().any(char::is_control))
                    .map(str::to_string)
                    .or_else(|| printable_key(key, modifiers.shift));
                match typed {
                    Some(typed) => {
                        self.insert_str(&typed);
                        KeyInputResult::TextChanged
                    }
                    None => KeyInputResult::Ignored,
                }
            }
        }
    }
}

fn changed_or_consumed(changed: bool) -> KeyInputResult {
    if changed {
        KeyInputResult::TextChanged
    } else {
        KeyInputResult::Consumed
    }
}

fn printable_key(key: &str, shift: bool) -> Option<String> {
    let mut chars = key.chars();
    let c = chars.next()?;
    if chars.next().is_some() || !c.is_ascii_graphic() {
        return None;
    }
    Some(if shift { c.to_ascii_uppercase() } else { c }.to_string())
}
