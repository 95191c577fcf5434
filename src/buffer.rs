//! The buffer aggregate: one open file's text, cursor, viewport, selection,
//! search terms, coloring and edit history.
//!
//! Every mutating operation follows the same sequence: record a history
//! snapshot (evicting the oldest past the cap, clearing redo), mutate the
//! store, re-apply the trailing-newline rule, rebuild or patch the line
//! index, then recompute the cursor and selection against the new index and
//! mark the buffer modified. Read-only operations (motion, scrolling,
//! selecting, searching) never touch history.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cursor::{self, Location};
use crate::history::{History, Snapshot};
use crate::line_index::LineIndex;
use crate::search::SearchState;
use crate::selection::Selection;
use crate::text_store::{normalize_range, TextStore};
use crate::viewport::Viewport;

/// Opaque syntax-color breakpoints: `(start offset, color id)` pairs computed
/// by an external colorer. The core stores and returns them verbatim;
/// `Arc`-shared so history snapshots don't copy the mapping.
pub type Coloring = Arc<Vec<(usize, u32)>>;

/// Window of text scanned around the cursor for word-boundary motions
const WORD_SCAN_WINDOW: usize = 256;

/// A single open text buffer
#[derive(Debug)]
pub struct Buffer {
    name: String,
    store: TextStore,
    lines: LineIndex,
    cursor: Location,
    viewport: Viewport,
    selection: Selection,
    search: SearchState,
    coloring: Coloring,
    was_saved: bool,
    history: History,
}

fn ensure_trailing_newline(store: TextStore) -> TextStore {
    if store.last_char() == Some('\n') {
        store
    } else {
        store.insert(store.len(), "\n")
    }
}

impl Buffer {
    /// Create a buffer from in-memory content. A trailing newline is
    /// synthesized if the content lacks one.
    pub fn from_str(name: &str, content: &str) -> Self {
        let store = ensure_trailing_newline(TextStore::from_str(content));
        let lines = LineIndex::from_store(&store);
        Buffer {
            name: name.to_string(),
            store,
            lines,
            cursor: Location::default(),
            viewport: Viewport::default(),
            selection: Selection::default(),
            search: SearchState::default(),
            coloring: Arc::new(Vec::new()),
            was_saved: true,
            history: History::default(),
        }
    }

    /// Read a buffer from `path`. The cursor starts at offset 0 with empty
    /// history and a clean saved flag.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let buffer = Buffer::from_str(&name, &raw);
        tracing::debug!(
            name = %buffer.name,
            chars = buffer.store.len(),
            lines = buffer.lines.line_count(),
            "opened buffer"
        );
        Ok(buffer)
    }

    /// Write the buffer's content to `path` and clear the modified flag.
    /// History is untouched.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.store.to_string())
            .with_context(|| format!("failed to write {}", path.display()))?;
        self.was_saved = true;
        tracing::debug!(name = %self.name, path = %path.display(), "saved buffer");
        Ok(())
    }

    // ---- accessors ----

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total character count, including the trailing newline
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// A buffer is never empty: content always ends with a newline
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    pub fn cursor(&self) -> Location {
        self.cursor
    }

    pub fn top_line(&self) -> usize {
        self.viewport.top_line()
    }

    pub fn is_modified(&self) -> bool {
        !self.was_saved
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search.term()
    }

    pub fn replace_term(&self) -> Option<&str> {
        self.search.replace()
    }

    /// The whole content as an owned string
    pub fn content(&self) -> String {
        self.store.to_string()
    }

    // ---- internal plumbing ----

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            store: self.store.clone(),
            lines: self.lines.clone(),
            cursor: self.cursor,
            selection: self.selection,
            search: self.search.clone(),
            coloring: self.coloring.clone(),
        }
    }

    fn restore(&mut self, snap: Snapshot) {
        self.store = snap.store;
        self.lines = snap.lines;
        self.cursor = snap.cursor;
        self.selection = snap.selection;
        self.search = snap.search;
        self.coloring = snap.coloring;
        self.was_saved = false;
        self.viewport.clamp(self.lines.line_count());
    }

    /// Step 1 and 2 of every mutation: snapshot onto undo, clear redo, mark
    /// the buffer modified.
    fn begin_edit(&mut self) {
        self.history.record(self.snapshot());
        self.was_saved = false;
    }

    /// Swap in a new store, re-applying the trailing-newline rule and
    /// rebuilding the line index.
    fn commit_store(&mut self, store: TextStore) {
        self.store = ensure_trailing_newline(store);
        self.lines = LineIndex::from_store(&self.store);
        self.viewport.clamp(self.lines.line_count());
    }

    /// A location guaranteed valid against the current line index, derived
    /// from the cursor's line/column clamped into range. Used as the walk
    /// start after a rebuild may have invalidated the cursor.
    fn clamped_known(&self) -> Location {
        let line = self.cursor.line.min(self.lines.last_line());
        let column = self.cursor.column.min(self.lines.line_len(line) - 1);
        Location {
            offset: self.lines.line_start(line) + column,
            line,
            column,
        }
    }

    /// Resolve `target` (clamped to the last valid offset) by walking from
    /// `known`. `known` is always valid here, so the walk cannot fail.
    fn relocate_from(&self, known: Location, target: usize) -> Location {
        let target = target.min(self.store.len() - 1);
        cursor::locate(&self.lines, known, target)
            .expect("walk start out of sync with line index")
    }

    // ---- cursor motion ----

    /// Move the cursor to `offset`, clamped into `[0, len - 1]`
    pub fn move_cursor(&mut self, offset: usize) {
        self.cursor = self.relocate_from(self.cursor, offset);
    }

    pub fn cursor_left(&mut self) {
        self.cursor = cursor::step_left(&self.lines, self.cursor);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = cursor::step_right(&self.lines, self.cursor);
    }

    pub fn cursor_up(&mut self) {
        self.cursor = cursor::step_up(&self.lines, self.cursor);
    }

    pub fn cursor_down(&mut self) {
        self.cursor = cursor::step_down(&self.lines, self.cursor);
    }

    fn prev_word_boundary(&self, pos: usize) -> usize {
        if pos == 0 {
            return 0;
        }
        let start = pos.saturating_sub(WORD_SCAN_WINDOW);
        let text = self.store.substring(start, pos);
        let chars: Vec<char> = text.chars().collect();
        let mut found_word = false;
        for i in (0..chars.len()).rev() {
            let is_word = chars[i].is_alphanumeric() || chars[i] == '_';
            if found_word && !is_word {
                return start + i + 1;
            }
            if is_word {
                found_word = true;
            }
        }
        start
    }

    fn next_word_boundary(&self, pos: usize) -> usize {
        let len = self.store.len();
        if pos >= len {
            return len;
        }
        let end = (pos + WORD_SCAN_WINDOW).min(len);
        let text = self.store.substring(pos, end);
        let mut found_word = false;
        for (i, ch) in text.chars().enumerate() {
            let is_word = ch.is_alphanumeric() || ch == '_';
            if found_word && !is_word {
                return pos + i;
            }
            if is_word {
                found_word = true;
            }
        }
        end
    }

    /// Move to the start of the previous word
    pub fn cursor_word_left(&mut self) {
        let target = self.prev_word_boundary(self.cursor.offset);
        self.move_cursor(target);
    }

    /// Move past the end of the current word
    pub fn cursor_word_right(&mut self) {
        let target = self.next_word_boundary(self.cursor.offset);
        self.move_cursor(target);
    }

    // ---- scrolling ----

    /// Scroll so `line` becomes the top visible line
    pub fn scroll_to(&mut self, line: usize) {
        self.viewport.scroll_to(line, self.lines.line_count());
    }

    /// Keep the cursor inside a window of `height` lines
    pub fn scroll(&mut self, height: usize) {
        self.viewport.follow_cursor(self.cursor.line, height);
    }

    pub fn move_cursor_scroll(&mut self, offset: usize, height: usize) {
        self.move_cursor(offset);
        self.scroll(height);
    }

    pub fn cursor_left_scroll(&mut self, height: usize) {
        self.cursor_left();
        self.scroll(height);
    }

    pub fn cursor_right_scroll(&mut self, height: usize) {
        self.cursor_right();
        self.scroll(height);
    }

    pub fn cursor_up_scroll(&mut self, height: usize) {
        self.cursor_up();
        self.scroll(height);
    }

    pub fn cursor_down_scroll(&mut self, height: usize) {
        self.cursor_down();
        self.scroll(height);
    }

    pub fn cursor_word_left_scroll(&mut self, height: usize) {
        self.cursor_word_left();
        self.scroll(height);
    }

    pub fn cursor_word_right_scroll(&mut self, height: usize) {
        self.cursor_word_right();
        self.scroll(height);
    }

    pub fn insert_char_scroll(&mut self, c: char, height: usize) {
        self.insert_char(c);
        self.scroll(height);
    }

    pub fn delete_char_scroll(&mut self, height: usize) {
        self.delete_char();
        self.scroll(height);
    }

    // ---- editing ----

    /// Insert `text` before the character at `at` (clamped to `[0, len]`),
    /// leaving the cursor at the end of the insertion.
    pub fn insert_text(&mut self, text: &str, at: usize) {
        if text.is_empty() {
            return;
        }
        let at = at.min(self.store.len());
        self.begin_edit();
        self.commit_store(self.store.insert(at, text));
        let end = at + text.chars().count();
        self.cursor = self.relocate_from(self.clamped_known(), end);
        self.selection.clear();
    }

    /// Insert one character at the cursor and step right over it. The line
    /// index is patched in place rather than rebuilt.
    pub fn insert_char(&mut self, c: char) {
        self.begin_edit();
        let Location { offset, line, column } = self.cursor;
        // The cursor sits at most on the final newline, so the insertion can
        // never displace the terminator: no trailing-newline re-check needed.
        self.store = self.store.insert(offset, c.encode_utf8(&mut [0u8; 4]));
        self.lines.note_insert_char(line, column, c == '\n');
        self.cursor = cursor::step_right(&self.lines, self.cursor);
        self.selection.clear();
    }

    /// Remove `[lo, hi)` (normalized) and park the cursor at `lo`
    pub fn delete_text(&mut self, a: usize, b: usize) {
        let (lo, hi) = normalize_range(a, b, self.store.len());
        if lo == hi {
            return;
        }
        self.begin_edit();
        self.commit_store(self.store.delete(lo, hi));
        self.cursor = self.relocate_from(self.clamped_known(), lo);
        self.selection.clear();
    }

    /// Delete the character left of the cursor; no-op at offset 0. Deleting
    /// a newline merges the cursor's line into the previous one.
    pub fn delete_char(&mut self) {
        let Location { offset, line, column } = self.cursor;
        if offset == 0 {
            return;
        }
        self.begin_edit();
        self.store = self.store.delete(offset - 1, offset);
        let new_cursor = if column > 0 {
            Location { offset: offset - 1, line, column: column - 1 }
        } else {
            Location {
                offset: offset - 1,
                line: line - 1,
                column: self.lines.line_len(line - 1) - 1,
            }
        };
        self.lines.note_delete_char(line, column);
        self.cursor = new_cursor;
        self.selection.clear();
        self.viewport.clamp(self.lines.line_count());
    }

    // ---- selection ----

    /// Drop the selection anchor at the cursor
    pub fn start_selecting(&mut self) {
        self.selection.start_at(self.cursor);
    }

    pub fn unselect(&mut self) {
        self.selection.clear();
    }

    /// Select `[lo, hi)` after normalizing; the cursor lands on the last
    /// selected character. A degenerate (empty) range clears the selection.
    pub fn select_text(&mut self, a: usize, b: usize) {
        let (lo, hi) = normalize_range(a, b, self.store.len());
        if lo == hi {
            self.selection.clear();
            return;
        }
        self.cursor = self.relocate_from(self.cursor, hi - 1);
        let anchor = self.relocate_from(self.cursor, lo);
        self.selection.set_anchor(anchor);
    }

    /// Select the cursor's whole line, newline included
    pub fn select_line(&mut self) {
        let start = self.lines.line_start(self.cursor.line);
        self.select_text(start, start + self.lines.line_len(self.cursor.line));
    }

    /// The selected span as half-open offsets, if anything is selected
    pub fn selected_range(&self) -> Option<(usize, usize)> {
        self.selection.range(self.cursor)
    }

    // ---- search and replace ----

    /// Set the search term; `""` and `"\n"` mean "no term"
    pub fn set_search_term(&mut self, term: &str) {
        self.search.set_term(term);
    }

    /// Set the replace term; `""` and `"\n"` mean "no term"
    pub fn set_replace_term(&mut self, term: &str) {
        self.search.set_replace(term);
    }

    /// Select the next occurrence of the search term, wrapping around to the
    /// buffer start at most once. With no prior selection the search starts
    /// at offset 0 and a miss leaves the buffer unchanged; with a prior
    /// selection it starts just past the selection start, and a miss clears
    /// the selection and retries once from the top.
    pub fn select_search_term(&mut self) {
        let Some(term) = self.search.term().map(str::to_owned) else {
            return;
        };
        let term_len = term.chars().count();
        let had_selection = self.selection.is_active();
        let from = match self.selected_range() {
            Some((lo, _)) => lo + 1,
            None => 0,
        };
        match self.store.find(&term, from) {
            Some(found) => self.select_text(found, found + term_len),
            None if had_selection => {
                self.selection.clear();
                if let Some(found) = self.store.find(&term, 0) {
                    self.select_text(found, found + term_len);
                }
            }
            None => {}
        }
    }

    /// Replace the matched range with `replacement` (no history bookkeeping;
    /// callers own the snapshot), select the inserted text, and return the
    /// offset just past it, the resume point that guarantees forward
    /// progress even when the replacement contains the search term.
    fn apply_replace(&mut self, lo: usize, hi: usize, replacement: &str) -> usize {
        self.commit_store(self.store.delete(lo, hi).insert(lo, replacement));
        let end = lo + replacement.chars().count();
        self.cursor = self.relocate_from(self.clamped_known(), end.saturating_sub(1));
        self.select_text(lo, end);
        end
    }

    /// Replace the next occurrence of the search term. Without both a search
    /// and a replace term this only clears the selection; without a match the
    /// buffer is unchanged.
    pub fn replace_next(&mut self) {
        let (Some(_), Some(replacement)) = (
            self.search.term(),
            self.search.replace().map(str::to_owned),
        ) else {
            self.selection.clear();
            return;
        };
        self.select_search_term();
        let Some((lo, hi)) = self.selected_range() else {
            return;
        };
        self.begin_edit();
        self.apply_replace(lo, hi, &replacement);
    }

    /// Replace every occurrence of the search term under a single history
    /// snapshot, so one undo reverts the whole pass. Each iteration resumes
    /// strictly after the inserted replacement text.
    pub fn replace_all(&mut self) {
        let (Some(term), Some(replacement)) = (
            self.search.term().map(str::to_owned),
            self.search.replace().map(str::to_owned),
        ) else {
            self.selection.clear();
            return;
        };
        let Some(mut found) = self.store.find(&term, 0) else {
            return;
        };
        let term_len = term.chars().count();
        self.begin_edit();
        let mut replaced = 0usize;
        loop {
            let resume = self.apply_replace(found, found + term_len, &replacement);
            replaced += 1;
            match self.store.find(&term, resume) {
                Some(next) => found = next,
                None => break,
            }
        }
        tracing::debug!(term = %term, replaced, "replace_all finished");
    }

    // ---- undo/redo ----

    /// Restore the most recent undo snapshot; no-op when the stack is empty
    pub fn undo(&mut self) {
        if !self.history.can_undo() {
            return;
        }
        let current = self.snapshot();
        if let Some(snap) = self.history.undo(current) {
            self.restore(snap);
        }
    }

    /// Restore the most recent redo snapshot; no-op when the stack is empty
    pub fn redo(&mut self) {
        if !self.history.can_redo() {
            return;
        }
        let current = self.snapshot();
        if let Some(snap) = self.history.redo(current) {
            self.restore(snap);
        }
    }

    // ---- coloring ----

    /// Store an externally computed color mapping verbatim
    pub fn set_coloring(&mut self, mapping: Vec<(usize, u32)>) {
        self.coloring = Arc::new(mapping);
    }

    pub fn coloring(&self) -> &[(usize, u32)] {
        &self.coloring
    }

    // ---- view support ----

    /// Text of `num_lines` lines starting at the viewport's top line
    pub fn get_visible_text(&self, num_lines: usize) -> String {
        let top = self.viewport.top_line();
        let end_line = (top + num_lines).min(self.lines.line_count());
        self.store
            .substring(self.lines.line_start(top), self.lines.line_start(end_line))
    }

    /// Raw text of `line` (clamped), newline included
    pub fn get_line_text(&self, line: usize) -> String {
        let line = line.min(self.lines.last_line());
        let start = self.lines.line_start(line);
        self.store.substring(start, start + self.lines.line_len(line))
    }

    /// Display slice of `line`: at most `width` characters, without the
    /// newline, scrolled horizontally so the cursor stays visible when it
    /// sits on that line.
    pub fn get_scrolled_line_text(&self, line: usize, width: usize) -> String {
        if width == 0 {
            return String::new();
        }
        let text = self.get_line_text(line);
        let text = text.strip_suffix('\n').unwrap_or(&text);
        let skip = if self.cursor.line == line.min(self.lines.last_line())
            && self.cursor.column >= width
        {
            self.cursor.column + 1 - width
        } else {
            0
        };
        text.chars().skip(skip).take(width).collect()
    }

    /// Offset of the first character of `line` (clamped)
    pub fn first_index_of_line(&self, line: usize) -> usize {
        self.lines.line_start(line.min(self.lines.last_line()))
    }

    /// Offset of the last character of `line` (clamped), which is its newline
    pub fn last_index_of_line(&self, line: usize) -> usize {
        let line = line.min(self.lines.last_line());
        self.lines.line_start(line) + self.lines.line_len(line) - 1
    }

    /// Text of `[lo, hi)` after normalizing. This is the read half of the
    /// clipboard primitives; the session layer owns clipboard storage.
    pub fn get_text(&self, a: usize, b: usize) -> String {
        let (lo, hi) = normalize_range(a, b, self.store.len());
        self.store.substring(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Buffer {
        Buffer::from_str("test", "hello\nworld\n\n!!!\n")
    }

    fn check_invariants(buf: &Buffer) {
        assert_eq!(
            buf.lines.total(),
            buf.store.len(),
            "line lengths must cover the content"
        );
        assert_eq!(buf.store.last_char(), Some('\n'), "content must end with a newline");
        let loc = buf.cursor();
        assert_eq!(
            loc.offset,
            buf.lines.line_start(loc.line) + loc.column,
            "cursor offset must agree with line/column"
        );
    }

    #[test]
    fn test_from_str_synthesizes_trailing_newline() {
        let buf = Buffer::from_str("t", "abc");
        assert_eq!(buf.content(), "abc\n");
        let empty = Buffer::from_str("t", "");
        assert_eq!(empty.content(), "\n");
        assert_eq!(empty.line_count(), 1);
    }

    #[test]
    fn test_move_cursor_scenarios() {
        let mut buf = sample();
        buf.move_cursor(6);
        assert_eq!(buf.cursor(), Location { offset: 6, line: 1, column: 0 });
        buf.move_cursor(17);
        assert_eq!(
            buf.cursor(),
            Location { offset: 16, line: 3, column: 3 },
            "one past the last valid offset clamps to it"
        );
        check_invariants(&buf);
    }

    #[test]
    fn test_insert_char_at_start() {
        let mut buf = sample();
        buf.insert_char('a');
        assert_eq!(buf.content(), "ahello\nworld\n\n!!!\n");
        assert_eq!(buf.cursor().offset, 1);
        assert!(buf.is_modified());
        check_invariants(&buf);
    }

    #[test]
    fn test_insert_char_newline_splits_line() {
        let mut buf = sample();
        buf.move_cursor(2);
        buf.insert_char('\n');
        assert_eq!(buf.content(), "he\nllo\nworld\n\n!!!\n");
        assert_eq!(buf.cursor(), Location { offset: 3, line: 1, column: 0 });
        check_invariants(&buf);
    }

    #[test]
    fn test_delete_char_merges_lines() {
        let mut buf = sample();
        buf.move_cursor(6);
        buf.delete_char();
        assert_eq!(buf.content(), "helloworld\n\n!!!\n");
        assert_eq!(buf.cursor().offset, 5);
        check_invariants(&buf);
    }

    #[test]
    fn test_delete_char_at_start_is_noop() {
        let mut buf = sample();
        buf.delete_char();
        assert_eq!(buf.content(), "hello\nworld\n\n!!!\n");
        assert!(!buf.can_undo(), "a no-op must not record history");
    }

    #[test]
    fn test_insert_text_places_cursor_after() {
        let mut buf = sample();
        buf.insert_text("XY", 5);
        assert_eq!(buf.content(), "helloXY\nworld\n\n!!!\n");
        assert_eq!(buf.cursor().offset, 7);
        check_invariants(&buf);
    }

    #[test]
    fn test_delete_text_reversed_range() {
        let mut buf = sample();
        buf.delete_text(11, 6);
        assert_eq!(buf.content(), "hello\n\n!!!\n");
        assert_eq!(buf.cursor().offset, 6);
        check_invariants(&buf);
    }

    #[test]
    fn test_delete_text_everything_leaves_newline() {
        let mut buf = sample();
        buf.delete_text(0, buf.len());
        assert_eq!(buf.content(), "\n");
        assert_eq!(buf.cursor(), Location::default());
        check_invariants(&buf);
    }

    #[test]
    fn test_cursor_motion_boundaries() {
        let mut buf = sample();
        buf.cursor_left();
        assert_eq!(buf.cursor().offset, 0, "left at start is a no-op");
        buf.move_cursor(16);
        buf.cursor_right();
        assert_eq!(buf.cursor().offset, 16, "right at end is a no-op");
        buf.cursor_down();
        assert_eq!(buf.cursor().offset, 16, "down on the last line stays on its last column");
        buf.move_cursor(3);
        buf.cursor_up();
        assert_eq!(buf.cursor().offset, 0, "up on line 0 goes to the start");
    }

    #[test]
    fn test_word_motions() {
        let mut buf = Buffer::from_str("t", "foo bar_baz  qux\n");
        buf.cursor_word_right();
        assert_eq!(buf.cursor().offset, 3, "past the end of 'foo'");
        buf.cursor_word_right();
        assert_eq!(buf.cursor().offset, 11, "past the end of 'bar_baz'");
        buf.move_cursor(16);
        buf.cursor_word_left();
        assert_eq!(buf.cursor().offset, 13, "back to the start of 'qux'");
    }

    #[test]
    fn test_selection_lifecycle() {
        let mut buf = sample();
        assert_eq!(buf.selected_range(), None);
        buf.move_cursor(6);
        buf.start_selecting();
        buf.move_cursor(10);
        assert_eq!(buf.selected_range(), Some((6, 11)));
        buf.unselect();
        assert_eq!(buf.selected_range(), None);
    }

    #[test]
    fn test_select_text_and_line() {
        let mut buf = sample();
        buf.select_text(8, 6);
        assert_eq!(buf.selected_range(), Some((6, 8)));
        assert_eq!(buf.cursor().offset, 7, "cursor lands on the last selected char");
        buf.select_line();
        assert_eq!(buf.selected_range(), Some((6, 12)));
    }

    #[test]
    fn test_select_search_term_walks_forward() {
        let mut buf = sample();
        buf.set_search_term("l");
        buf.select_search_term();
        assert_eq!(buf.selected_range(), Some((2, 3)));
        buf.select_search_term();
        assert_eq!(buf.selected_range(), Some((3, 4)));
        buf.select_search_term();
        assert_eq!(buf.selected_range(), Some((9, 10)));
    }

    #[test]
    fn test_select_search_term_wraps_once() {
        let mut buf = sample();
        buf.set_search_term("hello");
        buf.select_text(9, 12);
        buf.select_search_term();
        assert_eq!(
            buf.selected_range(),
            Some((0, 5)),
            "a term only before the selection is found via wraparound"
        );
    }

    #[test]
    fn test_select_search_term_missing_term_never_loops() {
        let mut buf = sample();
        buf.set_search_term("absent");
        buf.select_search_term();
        assert_eq!(buf.selected_range(), None);
        buf.select_text(0, 3);
        buf.select_search_term();
        assert_eq!(buf.selected_range(), None, "miss after wraparound clears the selection");
    }

    #[test]
    fn test_replace_next_requires_both_terms() {
        let mut buf = sample();
        buf.set_search_term("l");
        buf.start_selecting();
        buf.replace_next();
        assert_eq!(buf.content(), "hello\nworld\n\n!!!\n");
        assert_eq!(buf.selected_range(), None);
        assert!(!buf.can_undo());
    }

    #[test]
    fn test_replace_next_selects_replacement() {
        let mut buf = sample();
        buf.set_search_term("world");
        buf.set_replace_term("there");
        buf.replace_next();
        assert_eq!(buf.content(), "hello\nthere\n\n!!!\n");
        assert_eq!(buf.selected_range(), Some((6, 11)));
        check_invariants(&buf);
    }

    #[test]
    fn test_replace_all_scenario() {
        let mut buf = sample();
        buf.set_search_term("l");
        buf.set_replace_term("L");
        buf.replace_all();
        assert_eq!(buf.content(), "heLLo\nworLd\n\n!!!\n");
        check_invariants(&buf);
    }

    #[test]
    fn test_replace_all_is_one_undo_step() {
        let mut buf = sample();
        buf.set_search_term("l");
        buf.set_replace_term("L");
        buf.replace_all();
        assert_eq!(buf.undo_depth(), 1);
        buf.undo();
        assert_eq!(buf.content(), "hello\nworld\n\n!!!\n");
    }

    #[test]
    fn test_replace_all_term_inside_replacement_terminates() {
        let mut buf = Buffer::from_str("t", "aba\n");
        buf.set_search_term("a");
        buf.set_replace_term("aa");
        buf.replace_all();
        assert_eq!(buf.content(), "aabaa\n");
        check_invariants(&buf);
    }

    #[test]
    fn test_replace_all_without_match_records_nothing() {
        let mut buf = sample();
        buf.set_search_term("absent");
        buf.set_replace_term("x");
        buf.replace_all();
        assert_eq!(buf.content(), "hello\nworld\n\n!!!\n");
        assert!(!buf.can_undo());
    }

    #[test]
    fn test_undo_restores_content_and_cursor() {
        let mut buf = sample();
        buf.move_cursor(6);
        let before = buf.cursor();
        buf.insert_text("XXX", 6);
        buf.undo();
        assert_eq!(buf.content(), "hello\nworld\n\n!!!\n");
        assert_eq!(buf.cursor(), before);
        assert!(buf.can_redo());
    }

    #[test]
    fn test_redo_replays_edit() {
        let mut buf = sample();
        buf.insert_char('a');
        let edited = buf.content();
        let cursor = buf.cursor();
        buf.undo();
        buf.redo();
        assert_eq!(buf.content(), edited);
        assert_eq!(buf.cursor(), cursor);
        check_invariants(&buf);
    }

    #[test]
    fn test_undo_redo_empty_stacks_are_noops() {
        let mut buf = sample();
        buf.undo();
        buf.redo();
        assert_eq!(buf.content(), "hello\nworld\n\n!!!\n");
    }

    #[test]
    fn test_history_cap_drops_first_edit() {
        let mut buf = Buffer::from_str("t", "\n");
        for _ in 0..51 {
            buf.insert_char('x');
        }
        assert_eq!(buf.undo_depth(), 50);
        for _ in 0..60 {
            buf.undo();
        }
        assert_eq!(
            buf.content(),
            "x\n",
            "the pre-first-edit state is unrecoverable past the cap"
        );
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut buf = sample();
        buf.insert_char('a');
        buf.undo();
        assert!(buf.can_redo());
        buf.insert_char('b');
        assert!(!buf.can_redo());
    }

    #[test]
    fn test_undo_restores_selection_and_coloring() {
        let mut buf = sample();
        buf.set_coloring(vec![(0, 1), (6, 2)]);
        buf.select_text(0, 5);
        buf.insert_text("x", 0);
        buf.set_coloring(vec![(0, 9)]);
        buf.undo();
        assert_eq!(buf.selected_range(), Some((0, 5)));
        assert_eq!(buf.coloring(), &[(0, 1), (6, 2)]);
    }

    #[test]
    fn test_scroll_follows_cursor() {
        let content = (0..100).map(|i| format!("line {i}\n")).collect::<String>();
        let mut buf = Buffer::from_str("t", &content);
        buf.move_cursor_scroll(buf.first_index_of_line(50), 20);
        assert_eq!(buf.top_line(), 30);
        buf.move_cursor_scroll(0, 20);
        assert_eq!(buf.top_line(), 0);
    }

    #[test]
    fn test_scroll_to_clamps() {
        let mut buf = sample();
        buf.scroll_to(99);
        assert_eq!(buf.top_line(), 3);
    }

    #[test]
    fn test_viewport_reclamped_after_delete() {
        let content = (0..10).map(|i| format!("{i}\n")).collect::<String>();
        let mut buf = Buffer::from_str("t", &content);
        buf.scroll_to(9);
        buf.delete_text(4, buf.len());
        assert!(buf.top_line() < buf.line_count());
    }

    #[test]
    fn test_visible_and_line_text() {
        let mut buf = sample();
        buf.scroll_to(1);
        assert_eq!(buf.get_visible_text(2), "world\n\n");
        assert_eq!(buf.get_line_text(3), "!!!\n");
        assert_eq!(buf.get_line_text(99), "!!!\n", "line is clamped");
        assert_eq!(buf.first_index_of_line(1), 6);
        assert_eq!(buf.last_index_of_line(1), 11);
        assert_eq!(buf.get_text(6, 11), "world");
        assert_eq!(buf.get_text(11, 6), "world", "ranges normalize");
    }

    #[test]
    fn test_scrolled_line_text_keeps_cursor_visible() {
        let mut buf = Buffer::from_str("t", "0123456789\n");
        assert_eq!(buf.get_scrolled_line_text(0, 4), "0123");
        buf.move_cursor(7);
        assert_eq!(buf.get_scrolled_line_text(0, 4), "4567");
        assert_eq!(buf.get_scrolled_line_text(0, 0), "");
    }

    #[test]
    fn test_open_and_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "alpha\nbeta").unwrap();

        let mut buf = Buffer::open(&path).unwrap();
        assert_eq!(buf.name(), "note.txt");
        assert_eq!(buf.content(), "alpha\nbeta\n", "load synthesizes the trailing newline");
        assert!(!buf.is_modified());

        buf.insert_char('x');
        assert!(buf.is_modified());
        buf.save(&path).unwrap();
        assert!(!buf.is_modified());
        assert!(buf.can_undo(), "save must not touch history");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "xalpha\nbeta\n");
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Buffer::open(dir.path().join("missing.txt")).unwrap_err();
        let io = err.downcast_ref::<std::io::Error>().expect("io error is preserved");
        assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
    }
}
