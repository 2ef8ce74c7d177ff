//! Text inputs and the Enter/Shift+Enter contract.
//!
//! Enter without Shift submits the input as if its action button had been
//! pressed. Shift+Enter inserts a literal newline; it never submits.

/// Which of the two inputs a buffer backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Newline-separated URLs for the ingest flow.
    Urls,
    /// A question for the ask flow.
    Question,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter { shift: bool },
    Backspace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// The buffer was submitted; carries its exact contents.
    Submit { kind: InputKind, text: String },
    Edited,
}

#[derive(Debug, Clone)]
pub struct TextInput {
    kind: InputKind,
    buffer: String,
}

impl TextInput {
    pub fn new(kind: InputKind) -> Self {
        Self {
            kind,
            buffer: String::new(),
        }
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Submission hands over the buffer and leaves the input empty.
    pub fn handle(&mut self, key: Key) -> InputEvent {
        match key {
            Key::Enter { shift: false } => InputEvent::Submit {
                kind: self.kind,
                text: std::mem::take(&mut self.buffer),
            },
            Key::Enter { shift: true } => {
                self.buffer.push('\n');
                InputEvent::Edited
            }
            Key::Backspace => {
                self.buffer.pop();
                InputEvent::Edited
            }
            Key::Char(c) => {
                self.buffer.push(c);
                InputEvent::Edited
            }
        }
    }

    /// Feeds one terminal line.
    ///
    /// A trailing backslash stands for Shift+Enter: the backslash is dropped
    /// and a newline is kept in the buffer. A trailing `\\` submits with one
    /// literal backslash. Any other line end is Enter.
    pub fn feed_line(&mut self, line: &str) -> Option<String> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        let (content, shift) = if line.ends_with("\\\\") {
            // Doubled: one literal backslash, then Enter.
            (&line[..line.len() - 1], false)
        } else if let Some(rest) = line.strip_suffix('\\') {
            (rest, true)
        } else {
            (line, false)
        };
        for c in content.chars() {
            self.handle(Key::Char(c));
        }
        match self.handle(Key::Enter { shift }) {
            InputEvent::Submit { text, .. } => Some(text),
            InputEvent::Edited => None,
        }
    }
}
