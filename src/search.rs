//! Search and replace terms.
//!
//! Terms are literal strings. The find algorithm itself lives on
//! [`crate::text_store::TextStore::find`]; the wraparound-once selection policy
//! and the replace loops live on [`crate::buffer::Buffer`], where they can
//! integrate with history.

use serde::{Deserialize, Serialize};

/// Current search and replace terms. An empty string or a bare newline is
/// "no term" (the prompt layer hands those through when the user just hits
/// enter) and normalizes to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchState {
    term: Option<String>,
    replace: Option<String>,
}

impl SearchState {
    pub fn set_term(&mut self, term: &str) {
        self.term = normalize_term(term);
    }

    pub fn set_replace(&mut self, term: &str) {
        self.replace = normalize_term(term);
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    pub fn replace(&self) -> Option<&str> {
        self.replace.as_deref()
    }
}

fn normalize_term(s: &str) -> Option<String> {
    if s.is_empty() || s == "\n" {
        None
    } else {
        Some(s.to_string())
    }
}
