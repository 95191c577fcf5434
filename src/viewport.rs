//! The viewport: which line sits at the top of the visible window.

use serde::{Deserialize, Serialize};

/// Top visible line of the scrolled window, always within content bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    top_line: usize,
}

impl Viewport {
    pub fn top_line(&self) -> usize {
        self.top_line
    }

    /// Scroll so `line` is the top visible line, clamped to the content
    pub fn scroll_to(&mut self, line: usize, line_count: usize) {
        self.top_line = line.min(line_count.saturating_sub(1));
    }

    /// Keep the cursor's line inside a window of `height` lines below the top
    pub fn follow_cursor(&mut self, cursor_line: usize, height: usize) {
        if cursor_line < self.top_line {
            self.top_line = cursor_line;
        } else if cursor_line > self.top_line + height {
            self.top_line = cursor_line - height;
        }
    }

    /// Re-clamp after the content shrank
    pub fn clamp(&mut self, line_count: usize) {
        self.top_line = self.top_line.min(line_count.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_to_clamps() {
        let mut vp = Viewport::default();
        vp.scroll_to(10, 4);
        assert_eq!(vp.top_line(), 3);
        vp.scroll_to(2, 4);
        assert_eq!(vp.top_line(), 2);
    }

    #[test]
    fn test_follow_cursor_above() {
        let mut vp = Viewport::default();
        vp.scroll_to(10, 100);
        vp.follow_cursor(4, 20);
        assert_eq!(vp.top_line(), 4);
    }

    #[test]
    fn test_follow_cursor_below() {
        let mut vp = Viewport::default();
        vp.follow_cursor(30, 20);
        assert_eq!(vp.top_line(), 10);
    }

    #[test]
    fn test_follow_cursor_inside_window() {
        let mut vp = Viewport::default();
        vp.scroll_to(5, 100);
        vp.follow_cursor(15, 20);
        assert_eq!(vp.top_line(), 5, "cursor inside the window leaves the top alone");
    }
}
