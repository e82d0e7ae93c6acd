//! Scrubbing of free text before it is written to a trace.
//!
//! Anything a caller typed can end up in trace metadata, span summaries,
//! event attributes or error details, and every one of those leaves the
//! process through the exporter.

use regex::Regex;

/// Masks contact details and long digit runs, then truncates.
#[derive(Debug, Clone)]
pub struct Redactor {
    email: Regex,
    long_number: Regex,
    max_chars: usize,
}

impl Redactor {
    /// Creates a redactor keeping at most `max_chars` characters.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] if a masking pattern fails to compile.
    pub fn new(max_chars: usize) -> Result<Self, regex::Error> {
        Ok(Self {
            email: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")?,
            long_number: Regex::new(r"\d{9,}")?,
            max_chars,
        })
    }

    /// Returns `text` with emails and runs of nine or more digits masked.
    #[must_use]
    pub fn mask(&self, text: &str) -> String {
        let without_emails = self.email.replace_all(text, "[email]");
        self.long_number
            .replace_all(&without_emails, "[number]")
            .into_owned()
    }

    /// Returns the masked form of `text`, truncated to the configured
    /// length.
    #[must_use]
    pub fn redact(&self, text: &str) -> String {
        truncate(&self.mask(text), self.max_chars)
    }
}

/// Cuts `text` to `max_chars` characters, marking the cut with an ellipsis.
#[must_use]
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push('…');
    cut
}
