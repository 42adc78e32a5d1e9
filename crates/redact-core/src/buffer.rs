//! The mutable text under review

/// Borrowed access to the text under review.
///
/// The core reads the whole text, computes the new one and writes it back.
/// Hosts that render the text refresh on `set_text`.
pub trait TextBuffer {
    fn text(&self) -> String;
    fn set_text(&mut self, text: String);
}

/// In-memory buffer that counts writes
#[derive(Debug, Clone, Default)]
pub struct StringBuffer {
    text: String,
    revision: u64,
}

impl StringBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            revision: 0,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Incremented on every write
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl TextBuffer for StringBuffer {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
        self.revision += 1;
    }
}

impl TextBuffer for String {
    fn text(&self) -> String {
        self.clone()
    }

    fn set_text(&mut self, text: String) {
        *self = text;
    }
}
