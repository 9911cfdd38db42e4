//! Cursors and the coordination of many cursors around a single edit.
//!
//! An edit applied at every cursor must be performed in descending order of cursor
//! position. Mutating the document at a higher offset never invalidates a lower
//! offset, so each cursor still to be processed remains correct, and only those
//! cursors positioned after the edit need to be shifted by [`adjust_cursors`].

use crate::document::Document;
use std::cmp;
use std::ops::Range;

/// Shape of a cursor as drawn by the renderer.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum CursorStyle {
    #[default]
    Block,
    Bar,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cursor {
    /// Byte offset of the cursor, which is the authoritative position.
    pub pos: usize,

    /// Byte offset of the selection anchor, equal to `pos` when nothing is selected.
    pub sel: usize,

    /// Line containing `pos`, derived from the line index.
    pub line: usize,

    /// Byte column of `pos` relative to the start of `line`, derived from the line
    /// index.
    pub col: usize,

    /// Column that vertical motions try to reach, which only changes on horizontal
    /// movement so that short lines do not erode the intended column.
    pub preferred_col: usize,

    pub style: CursorStyle,
    pub blink: bool,
}

/// A cursor paired with the slot it occupies in a [`CursorSet`], where slot `0` is the
/// primary cursor and slot `n` is secondary cursor `n - 1`.
pub type Slot = (usize, Cursor);

impl Cursor {
    pub fn new(pos: usize) -> Cursor {
        Cursor {
            pos,
            sel: pos,
            line: 0,
            col: 0,
            preferred_col: 0,
            style: CursorStyle::Block,
            blink: true,
        }
    }

    /// Creates a cursor at `pos` with line and column derived from `doc`.
    pub fn at(doc: &Document, pos: usize) -> Cursor {
        let mut cursor = Cursor::new(cmp::min(pos, doc.len()));
        cursor.sync(doc);
        cursor.preferred_col = cursor.col;
        cursor
    }

    /// Recomputes `line` and `col` from the line index of `doc`.
    pub fn sync(&mut self, doc: &Document) {
        debug_assert!(self.pos <= doc.len(), "cursor beyond end of document");
        self.pos = cmp::min(self.pos, doc.len());
        self.sel = cmp::min(self.sel, doc.len());
        self.line = doc.line_of(self.pos);
        self.col = self.pos - doc.line_start(self.line);
    }

    /// Moves to `pos` as the result of a horizontal motion, which resets the
    /// preferred column.
    pub fn move_to(&mut self, doc: &Document, pos: usize) {
        self.pos = pos;
        self.sync(doc);
        self.preferred_col = self.col;
    }

    /// Moves to `pos` as the result of a vertical motion, leaving the preferred
    /// column untouched.
    pub fn move_vertical(&mut self, doc: &Document, pos: usize) {
        self.pos = pos;
        self.sync(doc);
    }

    #[inline]
    pub fn has_selection(&self) -> bool {
        self.sel != self.pos
    }

    #[inline]
    pub fn collapse(&mut self) {
        self.sel = self.pos;
    }

    /// Returns the ordered pair of `sel` and `pos`.
    #[inline]
    pub fn bounds(&self) -> (usize, usize) {
        (cmp::min(self.sel, self.pos), cmp::max(self.sel, self.pos))
    }

    /// Returns the character-wise selection, which includes the rune under the upper
    /// bound.
    pub fn char_range(&self, doc: &Document) -> Range<usize> {
        let (lo, hi) = self.bounds();
        lo..hi + crate::etc::next_rune_len(doc.data(), hi)
    }

    /// Returns the line-wise selection, from the start of the first selected line up
    /// to the start of the line following the last selected line.
    pub fn line_range(&self, doc: &Document) -> Range<usize> {
        let (lo, hi) = self.bounds();
        doc.line_start(doc.line_of(lo))..doc.next_line_start(doc.line_of(hi))
    }
}

/// The primary cursor together with any number of secondary cursors.
#[derive(Clone, Debug)]
pub struct CursorSet {
    primary: Cursor,
    secondary: Vec<Cursor>,
}

impl CursorSet {
    pub fn new() -> CursorSet {
        CursorSet {
            primary: Cursor::new(0),
            secondary: Vec::new(),
        }
    }

    pub fn primary(&self) -> &Cursor {
        &self.primary
    }

    pub fn primary_mut(&mut self) -> &mut Cursor {
        &mut self.primary
    }

    pub fn secondary(&self) -> &[Cursor] {
        &self.secondary
    }

    /// Returns the total number of cursors, including the primary.
    pub fn len(&self) -> usize {
        1 + self.secondary.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cursor> {
        std::iter::once(&self.primary).chain(self.secondary.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cursor> {
        std::iter::once(&mut self.primary).chain(self.secondary.iter_mut())
    }

    /// Returns every cursor tagged with its slot, sorted by position in descending
    /// order.
    pub fn get_sorted_cursors(&self) -> Vec<Slot> {
        let mut cursors = self.iter().cloned().enumerate().collect::<Vec<_>>();
        cursors.sort_by(|(_, a), (_, b)| b.pos.cmp(&a.pos));
        cursors
    }

    /// Copies each cursor in `batch` back into its slot.
    pub fn store(&mut self, batch: Vec<Slot>) {
        for (slot, cursor) in batch {
            if slot == 0 {
                self.primary = cursor;
            } else if let Some(c) = self.secondary.get_mut(slot - 1) {
                *c = cursor;
            }
        }
    }

    /// Adds a secondary cursor at `pos` unless a cursor already occupies that
    /// position, returning `true` if the cursor was added.
    pub fn add_cursor_at(&mut self, doc: &Document, pos: usize) -> bool {
        if self.iter().any(|c| c.pos == pos) {
            false
        } else {
            let mut cursor = Cursor::at(doc, pos);
            cursor.style = self.primary.style;
            self.secondary.push(cursor);
            true
        }
    }

    /// Adds a secondary cursor as-is, subject to the same duplicate rule as
    /// [`add_cursor_at`](Self::add_cursor_at).
    pub fn add_cursor(&mut self, cursor: Cursor) -> bool {
        if self.iter().any(|c| c.pos == cursor.pos) {
            false
        } else {
            self.secondary.push(cursor);
            true
        }
    }

    /// Removes secondary cursors that share a position with an earlier cursor, which
    /// can happen when an edit collapses several cursors into the same place.
    pub fn dedup(&mut self) {
        let mut seen = vec![self.primary.pos];
        self.secondary.retain(|c| {
            if seen.contains(&c.pos) {
                false
            } else {
                seen.push(c.pos);
                true
            }
        });
    }

    pub fn clear_secondary(&mut self) {
        self.secondary.clear();
    }

    pub fn collapse_selections(&mut self) {
        self.iter_mut().for_each(Cursor::collapse);
    }

    /// Replaces every cursor with a single primary cursor at `pos`.
    pub fn reset(&mut self, doc: &Document, pos: usize) {
        self.secondary.clear();
        let style = self.primary.style;
        self.primary = Cursor::at(doc, pos);
        self.primary.style = style;
    }

    pub fn set_style(&mut self, style: CursorStyle) {
        self.iter_mut().for_each(|c| c.style = style);
    }

    /// Recomputes line and column of every cursor.
    pub fn sync(&mut self, doc: &Document) {
        self.iter_mut().for_each(|c| c.sync(doc));
    }
}

impl Default for CursorSet {
    fn default() -> CursorSet {
        CursorSet::new()
    }
}

/// Shifts every cursor in `batch` other than the one at index `acting` to account for
/// an edit at `edit_offset` that inserted (`grew`) or removed `delta` bytes.
///
/// Only cursors positioned after `edit_offset` move. A cursor inside a removed span
/// collapses to `edit_offset`. Selection anchors follow the same rule.
pub fn adjust_cursors(
    batch: &mut [Slot],
    acting: Option<usize>,
    edit_offset: usize,
    grew: bool,
    delta: usize,
) {
    let shift = |p: usize| {
        if p > edit_offset {
            if grew {
                p + delta
            } else {
                cmp::max(p.saturating_sub(delta), edit_offset)
            }
        } else {
            p
        }
    };

    for (i, (_, cursor)) in batch.iter_mut().enumerate() {
        if Some(i) != acting {
            cursor.pos = shift(cursor.pos);
            cursor.sel = shift(cursor.sel);
        }
    }
}

/// Returns the byte range of every line of the rectangular block whose corners are
/// `anchor`, given as line and column, and the position of `head`.
///
/// Columns are byte columns. Lines shorter than the left edge of the block yield an
/// empty range at their end, and both edges are kept on rune boundaries.
pub fn block_ranges(doc: &Document, anchor: (usize, usize), head: &Cursor) -> Vec<Range<usize>> {
    let (a_line, a_col) = anchor;
    let (top, bottom) = (cmp::min(a_line, head.line), cmp::max(a_line, head.line));
    let (left, right) = (cmp::min(a_col, head.col), cmp::max(a_col, head.col));
    let data = doc.data();
    (top..=cmp::min(bottom, doc.line_count() - 1))
        .map(|line| {
            let (ls, le) = (doc.line_start(line), doc.line_end(line));
            let start = crate::etc::snap_rune_start(data, cmp::min(ls + left, le));
            let end = if ls + right >= le {
                le
            } else {
                let hi = crate::etc::snap_rune_start(data, ls + right);
                hi + crate::etc::next_rune_len(data, hi)
            };
            start..cmp::max(start, end)
        })
        .collect()
}

/// Recomputes line and column of every cursor in `batch` from the refreshed line
/// index of `doc`.
pub fn update_cursor_lines_and_cols(doc: &Document, batch: &mut [Slot]) {
    for (_, cursor) in batch.iter_mut() {
        cursor.sync(doc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_descending_with_slots() {
        let doc = Document::with_bytes(b"0123456789");
        let mut cursors = CursorSet::new();
        cursors.primary_mut().move_to(&doc, 4);
        assert!(cursors.add_cursor_at(&doc, 9));
        assert!(cursors.add_cursor_at(&doc, 1));

        let sorted = cursors.get_sorted_cursors();
        let order = sorted.iter().map(|(s, c)| (*s, c.pos)).collect::<Vec<_>>();
        assert_eq!(order, vec![(1, 9), (0, 4), (2, 1)]);
    }

    #[test]
    fn duplicate_cursor_rejected() {
        let doc = Document::with_bytes(b"abc");
        let mut cursors = CursorSet::new();
        assert!(!cursors.add_cursor_at(&doc, 0));
        assert!(cursors.add_cursor_at(&doc, 2));
        assert!(!cursors.add_cursor_at(&doc, 2));
        assert_eq!(cursors.len(), 2);
    }

    #[test]
    fn added_cursor_has_line_and_col() {
        let doc = Document::with_bytes(b"ab\ncde");
        let mut cursors = CursorSet::new();
        cursors.add_cursor_at(&doc, 5);
        let c = &cursors.secondary()[0];
        assert_eq!((c.line, c.col, c.preferred_col), (1, 2, 2));
    }

    #[test]
    fn adjust_skips_acting_and_earlier_cursors() {
        let mut batch = vec![(0, Cursor::new(8)), (1, Cursor::new(5)), (2, Cursor::new(2))];
        adjust_cursors(&mut batch, Some(1), 5, true, 3);
        let pos = batch.iter().map(|(_, c)| c.pos).collect::<Vec<_>>();
        assert_eq!(pos, vec![11, 5, 2]);
    }

    #[test]
    fn adjust_collapses_into_deleted_span() {
        let mut batch = vec![(0, Cursor::new(9)), (1, Cursor::new(4)), (2, Cursor::new(1))];
        adjust_cursors(&mut batch, None, 2, false, 4);
        let pos = batch.iter().map(|(_, c)| c.pos).collect::<Vec<_>>();
        assert_eq!(pos, vec![5, 2, 1]);
    }

    #[test]
    fn store_writes_back_by_slot() {
        let doc = Document::with_bytes(b"abcdef");
        let mut cursors = CursorSet::new();
        cursors.add_cursor_at(&doc, 3);
        let mut batch = cursors.get_sorted_cursors();
        for (_, c) in batch.iter_mut() {
            c.pos += 1;
        }
        update_cursor_lines_and_cols(&doc, &mut batch);
        cursors.store(batch);
        assert_eq!(cursors.primary().pos, 1);
        assert_eq!(cursors.secondary()[0].pos, 4);
        assert_eq!(cursors.secondary()[0].col, 4);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let doc = Document::with_bytes(b"abcdef");
        let mut cursors = CursorSet::new();
        cursors.add_cursor_at(&doc, 3);
        cursors.add_cursor_at(&doc, 5);
        for c in cursors.iter_mut() {
            c.pos = if c.pos == 5 { 5 } else { 0 };
        }
        cursors.dedup();
        let pos = cursors.iter().map(|c| c.pos).collect::<Vec<_>>();
        assert_eq!(pos, vec![0, 5]);
    }

    #[test]
    fn block_spans_per_line() {
        let doc = Document::with_bytes(b"abcdef\nab\nabcdef");
        let head = Cursor::at(&doc, 14);
        let ranges = block_ranges(&doc, (0, 2), &head);
        assert_eq!(ranges, vec![2..5, 9..9, 12..15]);
    }

    #[test]
    fn selection_ranges() {
        let doc = Document::with_bytes("ab\ncé\nf".as_bytes());
        let mut cursor = Cursor::at(&doc, 1);
        cursor.pos = 4;
        assert_eq!(cursor.char_range(&doc), 1..6);
        assert_eq!(cursor.line_range(&doc), 0..7);
    }
}
