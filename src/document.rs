//! Document.
//!
//! A document owns the bytes being edited along with a _line index_, which is the
//! ordered sequence of byte offsets at which each line starts. Every line lookup in
//! the editor goes through the index, so it must be kept consistent with the bytes
//! after every mutation.
//!
//! Mutating functions such as [`insert_range`](Document::insert_range) and
//! [`delete_range`](Document::delete_range) deliberately leave the index alone. An
//! edit involving many cursors performs several splices, and the index is refreshed
//! once afterwards, starting from the lowest offset touched, via
//! [`refresh_line_index`](Document::refresh_line_index).

use crate::etc;
use std::borrow::Cow;
use std::cmp;

pub struct Document {
    /// Contents of this document.
    data: Vec<u8>,

    /// Byte offsets of the first character of each line, where the first entry is
    /// always `0` and entries are strictly increasing.
    line_starts: Vec<usize>,

    /// Indicates that the contents were modified since the last load or save.
    dirty: bool,

    /// Indicates a single-line document used for command input, in which `\n` has
    /// no line semantics and the cursor may rest after the last character.
    cli: bool,
}

impl Document {
    pub fn new() -> Document {
        Document {
            data: Vec::new(),
            line_starts: vec![0],
            dirty: false,
            cli: false,
        }
    }

    /// Creates an empty document for command input.
    pub fn cli() -> Document {
        Document {
            cli: true,
            ..Document::new()
        }
    }

    pub fn with_bytes(bytes: &[u8]) -> Document {
        let mut doc = Document::new();
        doc.load(bytes.to_vec());
        doc
    }

    /// Replaces the entire contents with `bytes` and rebuilds the line index.
    pub fn load(&mut self, bytes: Vec<u8>) {
        self.data = bytes;
        self.line_starts.truncate(1);
        self.refresh_line_index(0);
        self.dirty = false;
    }

    /// Removes all content, which is how command input is reset.
    pub fn clear(&mut self) {
        self.load(Vec::new());
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn is_cli(&self) -> bool {
        self.cli
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Returns the contents as text, replacing malformed UTF-8 sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    #[cfg(test)]
    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    /// Inserts `bytes` at `offset`, which is clamped to the end of the document,
    /// returning the offset at which the insertion happened.
    pub fn insert_range(&mut self, offset: usize, bytes: &[u8]) -> usize {
        let offset = cmp::min(offset, self.len());
        if bytes.len() > 0 {
            self.data.splice(offset..offset, bytes.iter().copied());
            self.dirty = true;
        }
        offset
    }

    /// Deletes the bytes in the range [`start`, `end`), returning `start`.
    ///
    /// Both bounds are clamped to the end of the document, and an empty or inverted
    /// range is ignored.
    pub fn delete_range(&mut self, start: usize, end: usize) -> usize {
        let end = cmp::min(end, self.len());
        let start = cmp::min(start, end);
        if start < end {
            self.data.drain(start..end);
            self.dirty = true;
        }
        start
    }

    /// Brings the line index up to date after an edit whose lowest touched offset is
    /// `edit_offset`.
    ///
    /// Every line starting at or before `edit_offset` is unaffected by the edit, so
    /// the index is truncated after the last such entry and only the remaining
    /// suffix of the document is rescanned for newlines.
    pub fn refresh_line_index(&mut self, edit_offset: usize) {
        let line = self.line_starts.partition_point(|&start| start <= edit_offset) - 1;
        self.line_starts.truncate(line + 1);
        if !self.cli {
            let from = self.line_starts[line];
            let starts = self.data[from..]
                .iter()
                .enumerate()
                .filter(|&(_, &b)| b == b'\n')
                .map(|(i, _)| from + i + 1);
            self.line_starts.extend(starts);
        }
        self.check_line_index();
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Returns the `0`-based line containing `pos`, which is clamped to the end of
    /// the document.
    pub fn line_of(&self, pos: usize) -> usize {
        let pos = cmp::min(pos, self.len());
        self.line_starts.partition_point(|&start| start <= pos) - 1
    }

    /// Returns the starting position of `line`, or the end of the document if `line`
    /// does not exist.
    pub fn line_start(&self, line: usize) -> usize {
        self.line_starts.get(line).copied().unwrap_or(self.len())
    }

    /// Returns the position just past the last character of `line`, which is either
    /// the position of its `\n` or the end of the document.
    pub fn line_end(&self, line: usize) -> usize {
        match self.line_starts.get(line + 1) {
            Some(&next) => next - 1,
            None => self.len(),
        }
    }

    /// Returns the position at which the line following `line` starts, or the end of
    /// the document if `line` is the last line.
    pub fn next_line_start(&self, line: usize) -> usize {
        self.line_starts.get(line + 1).copied().unwrap_or(self.len())
    }

    /// Returns the number of bytes in `line`, excluding its `\n`.
    pub fn line_length(&self, line: usize) -> usize {
        self.line_end(line) - self.line_start(line)
    }

    /// Returns the text of `line`, excluding its `\n`.
    pub fn line_text(&self, line: usize) -> &[u8] {
        &self.data[self.line_start(line)..self.line_end(line)]
    }

    /// Returns `true` if `line` contains nothing other than spaces and tabs.
    pub fn is_blank_line(&self, line: usize) -> bool {
        self.line_text(line).iter().all(|&b| etc::is_indent(b))
    }

    /// Returns `true` if `line` is the last line.
    pub fn is_last_line(&self, line: usize) -> bool {
        line + 1 >= self.line_count()
    }

    /// Returns the start of the line containing `pos` by scanning bytes rather than
    /// consulting the line index.
    ///
    /// This is the only safe way to find line boundaries in the middle of a
    /// multi-cursor edit, when the index is stale.
    pub fn scan_line_start(&self, pos: usize) -> usize {
        if self.cli {
            return 0;
        }
        let pos = cmp::min(pos, self.len());
        self.data[..pos]
            .iter()
            .rposition(|&b| b == b'\n')
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// Returns the end of the line containing `pos`, i.e. the position of the next
    /// `\n` or the end of the document, by scanning bytes.
    pub fn scan_line_end(&self, pos: usize) -> usize {
        if self.cli {
            return self.len();
        }
        let pos = cmp::min(pos, self.len());
        self.data[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| pos + i)
            .unwrap_or(self.len())
    }

    #[inline]
    fn check_line_index(&self) {
        debug_assert_eq!(self.line_starts.first(), Some(&0));
        debug_assert!(
            self.line_starts.windows(2).all(|w| w[0] < w[1]),
            "line index not strictly increasing"
        );
        debug_assert!(self.line_starts.last().is_some_and(|&s| s <= self.len()));
    }
}

impl Default for Document {
    fn default() -> Document {
        Document::new()
    }
}
