//! Append-only text buffer used to assemble reports.
//!
//! The harness never manipulates report text directly. It sets and appends formatted text, and
//! nests one buffer inside another through [`ReportBuffer::cat_indented`], which prefixes every
//! line of the appended text with a fixed number of spaces.

use std::fmt;

/// Growable text buffer with formatted and indentation-aware appends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportBuffer {
    text: String,
}

impl ReportBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with formatted text.
    ///
    /// ## Examples
    /// ```rust
    /// use nestcheck_core::ReportBuffer;
    /// let mut buf = ReportBuffer::new();
    /// buf.set_fmt(format_args!("{}, and '{}'", 120, "FOO"));
    /// assert_eq!(buf.as_str(), "120, and 'FOO'");
    /// ```
    pub fn set_fmt(&mut self, args: fmt::Arguments<'_>) {
        self.text.clear();
        self.cat_fmt(args);
    }

    /// Append formatted text.
    pub fn cat_fmt(&mut self, args: fmt::Arguments<'_>) {
        // Formatting into a `String` only fails if a `Display` impl reports an error.
        let _ = fmt::Write::write_fmt(&mut self.text, args);
    }

    /// Replace the contents with `s`.
    pub fn set(&mut self, s: &str) {
        self.text.clear();
        self.text.push_str(s);
    }

    /// Append raw text.
    pub fn cat(&mut self, s: &str) {
        self.text.push_str(s);
    }

    /// Append a single character.
    pub fn push(&mut self, ch: char) {
        self.text.push(ch);
    }

    /// Append another buffer's contents unchanged.
    pub fn cat_buffer(&mut self, other: &ReportBuffer) {
        self.text.push_str(&other.text);
    }

    /// Append another buffer's contents with every line indented by `spaces` columns.
    pub fn cat_indented(&mut self, other: &ReportBuffer, spaces: usize) {
        self.cat_indented_str(&other.text, spaces);
    }

    /// Append `s` with every line, blank ones included, prefixed by `spaces` spaces.
    ///
    /// ## Notes
    /// - Line terminators are preserved as-is; no newline is added after a final unterminated line.
    /// - Appending an empty string is a no-op.
    pub fn cat_indented_str(&mut self, s: &str, spaces: usize) {
        for line in s.split_inclusive('\n') {
            self.text.extend(std::iter::repeat_n(' ', spaces));
            self.text.push_str(line);
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Length in Unicode scalars; used for column alignment.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Write for ReportBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.text.push_str(s);
        Ok(())
    }
}

impl fmt::Display for ReportBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for ReportBuffer {
    fn from(s: &str) -> Self {
        Self { text: s.to_string() }
    }
}

impl From<String> for ReportBuffer {
    fn from(text: String) -> Self {
        Self { text }
    }
}
