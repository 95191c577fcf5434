//! skiff-core: the single-buffer editing core of the skiff terminal editor.
//!
//! Everything a front end needs to edit one file lives behind
//! [`buffer::Buffer`]: a persistent character store, a derived line-length
//! index, a cursor tracked as both an absolute offset and a (line, column)
//! pair, selection, search/replace, a bounded snapshot history, and the
//! read accessors a renderer consumes. Session management, rendering, key
//! dispatch and syntax coloring are thin consumers that forward into this
//! crate; the core never owns a terminal or a clipboard.

pub mod buffer;
pub mod cursor;
pub mod history;
pub mod line_index;
pub mod search;
pub mod selection;
pub mod text_store;
pub mod viewport;

pub use buffer::{Buffer, Coloring};
pub use cursor::{locate, InvalidLocation, Location};
pub use history::HISTORY_CAP;
pub use line_index::LineIndex;
pub use search::SearchState;
pub use selection::Selection;
pub use text_store::{normalize_range, TextStore};
pub use viewport::Viewport;
