//! Auto-growing text input.

/// A key press delivered to the input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    /// The key.
    pub key: Key,
    /// Whether Shift was held.
    pub shift: bool,
}

impl KeyPress {
    /// Plain key press without modifiers.
    #[must_use]
    pub fn plain(key: Key) -> Self {
        Self { key, shift: false }
    }

    /// Key press with Shift held.
    #[must_use]
    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

/// Keys the input field reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Submits, or inserts a newline when Shift is held.
    Enter,
    /// Deletes the last character.
    Backspace,
    /// Inserts a character.
    Char(char),
}

/// Result of feeding a key press to the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The caller should submit the current text.
    Submit,
    /// The value changed and the height was recalculated.
    Edited,
    /// Nothing happened.
    Ignored,
}

/// Multi-line text field whose height tracks its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    value: String,
    rows: usize,
}

impl Default for InputField {
    fn default() -> Self {
        Self::new()
    }
}

impl InputField {
    /// Create an empty single-row field.
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: String::new(),
            rows: 1,
        }
    }

    /// Current text.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Current height in rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Replace the whole value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.resize();
    }

    /// Insert text at the end of the value.
    pub fn insert_str(&mut self, text: &str) {
        self.value.push_str(text);
        self.resize();
    }

    /// Handle a key press.
    ///
    /// Enter without Shift submits and never inserts a newline; Shift+Enter
    /// inserts one.
    pub fn handle_key(&mut self, press: KeyPress) -> KeyOutcome {
        match press.key {
            Key::Enter if !press.shift => KeyOutcome::Submit,
            Key::Enter => {
                self.insert_str("\n");
                KeyOutcome::Edited
            }
            Key::Char(c) => {
                self.value.push(c);
                self.resize();
                KeyOutcome::Edited
            }
            Key::Backspace => {
                if self.value.pop().is_some() {
                    self.resize();
                    KeyOutcome::Edited
                } else {
                    KeyOutcome::Ignored
                }
            }
        }
    }

    /// Take the trimmed text for submission.
    ///
    /// Returns `None` and leaves the field untouched when the trimmed text is
    /// empty. Otherwise the field is cleared and shrunk back to one row.
    pub fn take_submission(&mut self) -> Option<String> {
        let text = self.value.trim();
        if text.is_empty() {
            return None;
        }
        let text = text.to_string();
        self.clear();
        Some(text)
    }

    /// Clear the value and reset the height.
    pub fn clear(&mut self) {
        self.value.clear();
        self.rows = 1;
    }

    fn resize(&mut self) {
        // A trailing newline opens a new, empty row.
        let trailing = usize::from(self.value.ends_with('\n'));
        self.rows = (self.value.lines().count() + trailing).max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_submits_without_newline() {
        let mut field = InputField::new();
        field.set_value("hello");

        assert_eq!(field.handle_key(KeyPress::plain(Key::Enter)), KeyOutcome::Submit);
        assert_eq!(field.value(), "hello");
    }

    #[test]
    fn test_shift_enter_grows_field() {
        let mut field = InputField::new();
        field.set_value("line one");
        assert_eq!(field.rows(), 1);

        assert_eq!(field.handle_key(KeyPress::shifted(Key::Enter)), KeyOutcome::Edited);
        assert_eq!(field.value(), "line one\n");
        assert_eq!(field.rows(), 2);

        field.handle_key(KeyPress::plain(Key::Char('x')));
        assert_eq!(field.rows(), 2);

        field.handle_key(KeyPress::plain(Key::Backspace));
        field.handle_key(KeyPress::plain(Key::Backspace));
        assert_eq!(field.rows(), 1);
    }

    #[test]
    fn test_backspace_on_empty_is_ignored() {
        let mut field = InputField::new();
        assert_eq!(field.handle_key(KeyPress::plain(Key::Backspace)), KeyOutcome::Ignored);
    }

    #[test]
    fn test_take_submission_trims_and_clears() {
        let mut field = InputField::new();
        field.set_value("  hi\nthere \n\n");
        assert_eq!(field.rows(), 4);

        assert_eq!(field.take_submission().as_deref(), Some("hi\nthere"));
        assert_eq!(field.value(), "");
        assert_eq!(field.rows(), 1);
    }

    #[test]
    fn test_whitespace_submission_is_noop() {
        let mut field = InputField::new();
        field.set_value(" \n\t ");

        assert_eq!(field.take_submission(), None);
        assert_eq!(field.value(), " \n\t ");
    }
}
