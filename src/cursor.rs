//! Cursor location model.
//!
//! A [`Location`] carries an absolute character offset together with its
//! derived `(line, column)` pair; [`locate`] keeps the three fields consistent
//! by walking line-by-line from a previously valid location. Editing is
//! overwhelmingly local (typing, arrow keys), so the walk is O(distance in
//! lines) and usually O(1). A jump-to-line feature would want a binary search
//! over a prefix sum instead; nothing in this core needs one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::line_index::LineIndex;

/// An absolute character offset plus its derived line and column.
///
/// Invariant: `offset == line_start(line) + column` and
/// `column < line_len(line)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

/// The starting location handed to [`locate`] was internally inconsistent
/// (line or column out of range for the index). All public buffer operations
/// clamp offsets first, so hitting this means a caller bug, not user input.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid cursor location: line {}, column {} (buffer has {line_count} lines)", .start.line, .start.column)]
pub struct InvalidLocation {
    pub start: Location,
    pub line_count: usize,
}

/// Resolve `target` to a full [`Location`] by stepping line-by-line from
/// `known`. `target` must already be clamped into `[0, index.total())`.
pub fn locate(
    index: &LineIndex,
    known: Location,
    target: usize,
) -> Result<Location, InvalidLocation> {
    let valid = index
        .get(known.line)
        .is_some_and(|len| known.column < len);
    if !valid {
        return Err(InvalidLocation {
            start: known,
            line_count: index.line_count(),
        });
    }

    let mut line = known.line;
    let mut start = known.offset - known.column;
    loop {
        let len = index.line_len(line);
        if (start..start + len).contains(&target) {
            return Ok(Location {
                offset: target,
                line,
                column: target - start,
            });
        }
        if target < start {
            line -= 1;
            start -= index.line_len(line);
        } else {
            start += len;
            line += 1;
        }
    }
}

/// One character left; no-op at offset 0. Crossing a line start lands on the
/// previous line's newline.
pub fn step_left(index: &LineIndex, loc: Location) -> Location {
    if loc.offset == 0 {
        return loc;
    }
    if loc.column == 0 {
        let line = loc.line - 1;
        Location {
            offset: loc.offset - 1,
            line,
            column: index.line_len(line) - 1,
        }
    } else {
        Location {
            offset: loc.offset - 1,
            line: loc.line,
            column: loc.column - 1,
        }
    }
}

/// One character right; no-op at the last offset (the final newline).
pub fn step_right(index: &LineIndex, loc: Location) -> Location {
    if loc.offset + 1 >= index.total() {
        return loc;
    }
    if loc.column + 1 == index.line_len(loc.line) {
        Location {
            offset: loc.offset + 1,
            line: loc.line + 1,
            column: 0,
        }
    } else {
        Location {
            offset: loc.offset + 1,
            line: loc.line,
            column: loc.column + 1,
        }
    }
}

/// One line up, clamping the column to the target line; on line 0 this moves
/// to the start of the buffer.
pub fn step_up(index: &LineIndex, loc: Location) -> Location {
    if loc.line == 0 {
        return Location {
            offset: 0,
            line: 0,
            column: 0,
        };
    }
    let line = loc.line - 1;
    let len = index.line_len(line);
    let column = loc.column.min(len - 1);
    let start = loc.offset - loc.column - len;
    Location {
        offset: start + column,
        line,
        column,
    }
}

/// One line down, clamping the column to the target line; on the last line
/// this moves to the line's last column.
pub fn step_down(index: &LineIndex, loc: Location) -> Location {
    let cur_len = index.line_len(loc.line);
    let start = loc.offset - loc.column;
    if loc.line + 1 == index.line_count() {
        let column = cur_len - 1;
        return Location {
            offset: start + column,
            line: loc.line,
            column,
        };
    }
    let line = loc.line + 1;
    let column = loc.column.min(index.line_len(line) - 1);
    Location {
        offset: start + cur_len + column,
        line,
        column,
    }
}
