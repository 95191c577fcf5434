//! Derived per-line length index.
//!
//! Each entry is the character length of one line *including* its trailing
//! newline, so `sum(lengths) == store.len()` whenever the store is
//! newline-terminated. The index is rebuilt by a full chunk scan after bulk
//! edits and patched in place for single-character edits.

use crate::text_store::TextStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    lengths: Vec<usize>,
}

impl LineIndex {
    /// Build the index by scanning `store` for newlines
    pub fn from_store(store: &TextStore) -> Self {
        let mut lengths = Vec::new();
        let mut run = 0usize;
        for chunk in store.chunks() {
            for ch in chunk.chars() {
                run += 1;
                if ch == '\n' {
                    lengths.push(run);
                    run = 0;
                }
            }
        }
        // A store owned by a buffer is always newline-terminated; tolerate a
        // raw store anyway so the scan is total.
        if run > 0 {
            lengths.push(run);
        }
        LineIndex { lengths }
    }

    /// Number of lines
    pub fn line_count(&self) -> usize {
        self.lengths.len()
    }

    /// Index of the last line. Panics on an empty index, which a buffer never
    /// holds.
    pub fn last_line(&self) -> usize {
        self.lengths.len() - 1
    }

    /// Length of `line`, including its newline
    pub fn line_len(&self, line: usize) -> usize {
        self.lengths[line]
    }

    /// Length of `line`, if it exists
    pub fn get(&self, line: usize) -> Option<usize> {
        self.lengths.get(line).copied()
    }

    /// Offset of the first character of `line`. Accepts `line == line_count()`
    /// to mean one past the end (the total length).
    pub fn line_start(&self, line: usize) -> usize {
        self.lengths[..line.min(self.lengths.len())].iter().sum()
    }

    /// Total character count covered by the index
    pub fn total(&self) -> usize {
        self.lengths.iter().sum()
    }

    /// Patch for a single character inserted at `(line, column)`. A newline
    /// splits the line's length in two; anything else grows it by one.
    pub fn note_insert_char(&mut self, line: usize, column: usize, is_newline: bool) {
        if is_newline {
            let old = self.lengths[line];
            self.lengths[line] = column + 1;
            self.lengths.insert(line + 1, old - column);
        } else {
            self.lengths[line] += 1;
        }
    }

    /// Patch for deleting the character immediately left of `(line, column)`.
    /// At column 0 the deleted character is the previous line's newline, so
    /// the two lines merge.
    pub fn note_delete_char(&mut self, line: usize, column: usize) {
        if column > 0 {
            self.lengths[line] -= 1;
        } else {
            let merged = self.lengths.remove(line);
            self.lengths[line - 1] += merged - 1;
        }
    }
}
