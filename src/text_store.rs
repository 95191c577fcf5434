//! Persistent character store backing a text buffer.
//!
//! The store is an immutable rope: `Arc`-shared nodes where every edit builds a
//! new tree that shares all untouched subtrees with its predecessor. Cloning a
//! `TextStore` is O(1), which is what keeps 50 retained undo snapshots cheap
//! relative to the buffer size.
//!
//! All offsets are *character* offsets, not byte offsets.

use std::fmt;
use std::sync::Arc;

/// Adjacent pieces smaller than this are merged into a single leaf on concat,
/// which keeps tree depth bounded under arrow-key-scale editing.
const MERGE_LEAF_MAX: usize = 64;

#[derive(Debug)]
enum Node {
    Leaf {
        text: Arc<str>,
        /// Cached character count of `text`
        len: usize,
    },
    Branch {
        left: Arc<Node>,
        right: Arc<Node>,
        len: usize,
    },
}

impl Node {
    fn len(&self) -> usize {
        match self {
            Node::Leaf { len, .. } => *len,
            Node::Branch { len, .. } => *len,
        }
    }
}

/// Byte index of the `char_idx`-th character of `text`.
fn byte_of(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

fn leaf(text: &str) -> Arc<Node> {
    Arc::new(Node::Leaf {
        len: text.chars().count(),
        text: Arc::from(text),
    })
}

/// An immutable, structurally shared character sequence.
#[derive(Clone)]
pub struct TextStore {
    root: Arc<Node>,
}

impl TextStore {
    /// Create an empty store
    pub fn new() -> Self {
        TextStore { root: leaf("") }
    }

    /// Create a store holding `content`
    pub fn from_str(content: &str) -> Self {
        TextStore { root: leaf(content) }
    }

    /// Number of characters in the store
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// True if the store holds no characters
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The character at `offset`, if in range
    pub fn char_at(&self, offset: usize) -> Option<char> {
        if offset >= self.len() {
            return None;
        }
        let mut node = &self.root;
        let mut offset = offset;
        loop {
            match &**node {
                Node::Leaf { text, .. } => {
                    return text[byte_of(text, offset)..].chars().next();
                }
                Node::Branch { left, right, .. } => {
                    if offset < left.len() {
                        node = left;
                    } else {
                        offset -= left.len();
                        node = right;
                    }
                }
            }
        }
    }

    /// The last character in the store, if any
    pub fn last_char(&self) -> Option<char> {
        let mut node = &self.root;
        loop {
            match &**node {
                Node::Leaf { text, .. } => return text.chars().next_back(),
                Node::Branch { left, right, .. } => {
                    node = if right.len() > 0 { right } else { left };
                }
            }
        }
    }

    /// Concatenate two stores. Subtrees are shared; small adjacent pieces are
    /// merged into one leaf to bound depth.
    pub fn concat(a: &TextStore, b: &TextStore) -> TextStore {
        TextStore {
            root: join(&a.root, &b.root),
        }
    }

    /// The substore covering `[lo, hi)`. Callers must pass a normalized range
    /// (see [`normalize_range`]); a full-range slice returns a shared root.
    pub fn slice(&self, lo: usize, hi: usize) -> TextStore {
        debug_assert!(lo <= hi && hi <= self.len());
        TextStore {
            root: slice_node(&self.root, lo, hi),
        }
    }

    /// A new store with `text` inserted before the character at `at`
    pub fn insert(&self, at: usize, text: &str) -> TextStore {
        if text.is_empty() {
            return self.clone();
        }
        let at = at.min(self.len());
        let left = self.slice(0, at);
        let right = self.slice(at, self.len());
        TextStore::concat(&TextStore::concat(&left, &TextStore::from_str(text)), &right)
    }

    /// A new store with `[lo, hi)` removed. Callers must pass a normalized range.
    pub fn delete(&self, lo: usize, hi: usize) -> TextStore {
        TextStore::concat(&self.slice(0, lo), &self.slice(hi, self.len()))
    }

    /// Iterate over the store's string chunks in document order
    pub fn chunks(&self) -> Chunks<'_> {
        Chunks {
            stack: vec![&self.root],
        }
    }

    /// Materialize `[lo, hi)` as an owned string. Callers must pass a
    /// normalized range.
    pub fn substring(&self, lo: usize, hi: usize) -> String {
        let mut out = String::with_capacity(hi.saturating_sub(lo));
        for chunk in self.slice(lo, hi).chunks() {
            out.push_str(chunk);
        }
        out
    }

    /// Find the first occurrence of `needle` at or after character offset
    /// `from`. Returns the match's character offset.
    pub fn find(&self, needle: &str, from: usize) -> Option<usize> {
        if needle.is_empty() || from >= self.len() {
            return None;
        }
        let tail = self.substring(from, self.len());
        tail.find(needle)
            .map(|byte| from + tail[..byte].chars().count())
    }
}

impl Default for TextStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TextStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl fmt::Debug for TextStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextStore({:?})", self.to_string())
    }
}

impl PartialEq for TextStore {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.to_string() == other.to_string()
    }
}

impl Eq for TextStore {}

fn join(a: &Arc<Node>, b: &Arc<Node>) -> Arc<Node> {
    if a.len() == 0 {
        return b.clone();
    }
    if b.len() == 0 {
        return a.clone();
    }
    if a.len() + b.len() <= MERGE_LEAF_MAX {
        let mut merged = String::new();
        collect(a, &mut merged);
        collect(b, &mut merged);
        return leaf(&merged);
    }
    Arc::new(Node::Branch {
        len: a.len() + b.len(),
        left: a.clone(),
        right: b.clone(),
    })
}

fn collect(node: &Arc<Node>, out: &mut String) {
    match &**node {
        Node::Leaf { text, .. } => out.push_str(text),
        Node::Branch { left, right, .. } => {
            collect(left, out);
            collect(right, out);
        }
    }
}

fn slice_node(node: &Arc<Node>, lo: usize, hi: usize) -> Arc<Node> {
    if lo == 0 && hi == node.len() {
        return node.clone();
    }
    match &**node {
        Node::Leaf { text, .. } => {
            let start = byte_of(text, lo);
            let end = byte_of(text, hi);
            leaf(&text[start..end])
        }
        Node::Branch { left, right, .. } => {
            let mid = left.len();
            if hi <= mid {
                slice_node(left, lo, hi)
            } else if lo >= mid {
                slice_node(right, lo - mid, hi - mid)
            } else {
                join(
                    &slice_node(left, lo, mid),
                    &slice_node(right, 0, hi - mid),
                )
            }
        }
    }
}

/// Iterator over a store's leaf chunks
pub struct Chunks<'a> {
    stack: Vec<&'a Arc<Node>>,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while let Some(node) = self.stack.pop() {
            match &**node {
                Node::Leaf { text, len } => {
                    if *len > 0 {
                        return Some(text);
                    }
                }
                Node::Branch { left, right, .. } => {
                    self.stack.push(right);
                    self.stack.push(left);
                }
            }
        }
        None
    }
}

/// Clamp a caller-supplied `(a, b)` pair into `[0, len]`, swapping the ends if
/// they arrive reversed. Every operation that accepts a range goes through
/// this before touching the store.
pub fn normalize_range(a: usize, b: usize, len: usize) -> (usize, usize) {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    (lo.min(len), hi.min(len))
}
