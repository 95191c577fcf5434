//! Selection model: a fixed anchor plus the live buffer cursor.

use serde::{Deserialize, Serialize};

use crate::cursor::Location;

/// The anchored end of a selection. The live cursor is the other end; no
/// anchor means nothing is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    anchor: Option<Location>,
}

impl Selection {
    /// Drop the anchor at `cursor`, starting a selection
    pub fn start_at(&mut self, cursor: Location) {
        self.anchor = Some(cursor);
    }

    /// Clear the selection
    pub fn clear(&mut self) {
        self.anchor = None;
    }

    pub fn is_active(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn anchor(&self) -> Option<Location> {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Location) {
        self.anchor = Some(anchor);
    }

    /// The selected range as a half-open `[lo, hi + 1)` span over the anchor
    /// and `cursor` offsets. The selection is inclusive of both endpoints, so
    /// a selection with anchor == cursor covers one character.
    pub fn range(&self, cursor: Location) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        let (lo, hi) = if anchor.offset <= cursor.offset {
            (anchor.offset, cursor.offset)
        } else {
            (cursor.offset, anchor.offset)
        };
        Some((lo, hi + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(offset: usize) -> Location {
        Location { offset, line: 0, column: offset }
    }

    #[test]
    fn test_no_anchor_no_range() {
        let sel = Selection::default();
        assert_eq!(sel.range(loc(3)), None);
    }

    #[test]
    fn test_range_is_normalized_and_inclusive() {
        let mut sel = Selection::default();
        sel.start_at(loc(5));
        assert_eq!(sel.range(loc(2)), Some((2, 6)), "reversed ends are swapped");
        assert_eq!(sel.range(loc(5)), Some((5, 6)), "point selection covers one char");
    }

    #[test]
    fn test_clear() {
        let mut sel = Selection::default();
        sel.start_at(loc(0));
        sel.clear();
        assert!(!sel.is_active());
    }
}
