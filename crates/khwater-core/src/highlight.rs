//! Search-term highlighting for display.
//!
//! Wraps every case-insensitive occurrence of the query terms in
//! `<mark>…</mark>`. Terms are matched literally; regex metacharacters in a
//! query are escaped. When two terms could match at the same position the
//! longer one wins.

use regex::{Regex, RegexBuilder};
use std::borrow::Cow;

const MARK_OPEN: &str = "<mark>";
const MARK_CLOSE: &str = "</mark>";

/// A compiled set of terms to highlight.
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    /// Compile `terms`. Empty terms are ignored; no terms yields a no-op
    /// highlighter.
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Result<Self, regex::Error> {
        let mut terms: Vec<&str> = terms
            .iter()
            .map(|t| t.as_ref())
            .filter(|t| !t.is_empty())
            .collect();
        if terms.is_empty() {
            return Ok(Self { pattern: None });
        }
        terms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        terms.dedup();

        let alternation = terms
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Highlight `text`, borrowing it unchanged when nothing matches.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match &self.pattern {
            Some(pattern) => pattern.replace_all(text, |caps: &regex::Captures<'_>| {
                format!("{}{}{}", MARK_OPEN, &caps[0], MARK_CLOSE)
            }),
            None => Cow::Borrowed(text),
        }
    }
}

/// One-shot convenience over [`Highlighter`].
pub fn highlight<S: AsRef<str>>(text: &str, terms: &[S]) -> Result<String, regex::Error> {
    Ok(Highlighter::new(terms)?.apply(text).into_owned())
}
