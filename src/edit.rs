//! Edit operations.
//!
//! Every operation in this module applies to all cursors in a [`CursorSet`] and
//! follows the same discipline:
//!
//! * collect the cursors sorted by position in descending order
//! * for each cursor, compute the bytes to change and mutate the [`Document`]
//! * shift every other cursor affected by the mutation via [`adjust_cursors`]
//! * refresh the line index once, starting from the lowest offset touched
//! * recompute the line and column of every cursor
//!
//! While a batch is in progress the line index is stale for everything past the
//! lowest offset touched so far, so only raw byte scans such as
//! [`scan_line_start`](Document::scan_line_start) may be used to find line
//! boundaries.

use crate::config::Settings;
use crate::cursor::{self, Cursor, CursorSet, Slot};
use crate::delim;
use crate::document::Document;
use crate::etc::{self, Class};
use crate::nav;
use std::cmp;
use std::ops::Range;

/// Tracks the lowest offset touched by a batch of edits.
struct Low(usize);

impl Low {
    fn new() -> Low {
        Low(usize::MAX)
    }

    fn touch(&mut self, offset: usize) {
        self.0 = cmp::min(self.0, offset);
    }
}

/// Completes a batch by refreshing the line index and storing the cursors.
fn finish(doc: &mut Document, cursors: &mut CursorSet, mut batch: Vec<Slot>, low: Low) {
    if low.0 != usize::MAX {
        doc.refresh_line_index(low.0);
    }
    cursor::update_cursor_lines_and_cols(doc, &mut batch);
    for (_, c) in batch.iter_mut() {
        c.preferred_col = c.col;
    }
    cursors.store(batch);
    cursors.dedup();
}

/// Replaces the bytes in [`start`, `end`) with `bytes`, shifting every cursor in
/// `batch` other than `acting`.
fn splice(
    doc: &mut Document,
    batch: &mut [Slot],
    acting: Option<usize>,
    start: usize,
    end: usize,
    bytes: &[u8],
) {
    let end = cmp::min(end, doc.len());
    let start = cmp::min(start, end);
    let removed = end - start;
    if removed > 0 {
        doc.delete_range(start, end);
        cursor::adjust_cursors(batch, acting, start, false, removed);
    }
    if bytes.len() > 0 {
        doc.insert_range(start, bytes);
        cursor::adjust_cursors(batch, acting, start, true, bytes.len());
    }
}

/// Returns one level of indentation.
pub fn indent_unit(settings: &Settings) -> Vec<u8> {
    if settings.tab_hard {
        vec![b'\t']
    } else {
        vec![b' '; settings.tab_size]
    }
}

/// Returns the indentation for a line starting at `line_start`, derived from the
/// line preceding it.
///
/// The leading whitespace of the preceding line is copied, and one level of
/// indentation is added when that line ends with an opening delimiter. The first
/// line of the document is never indented.
fn auto_indent(doc: &Document, line_start: usize, settings: &Settings) -> Vec<u8> {
    if line_start == 0 || doc.is_cli() {
        return Vec::new();
    }
    let prev_end = line_start - 1;
    let prev = &doc.data()[doc.scan_line_start(prev_end)..prev_end];
    let mut indent = prev[..etc::indent_len(prev)].to_vec();
    if prev.last().is_some_and(|&b| delim::is_block_opener(b)) {
        indent.extend(indent_unit(settings));
    }
    indent
}

/// Returns the length of the leading whitespace of the line starting at
/// `line_start`.
fn leading_indent(doc: &Document, line_start: usize) -> usize {
    etc::indent_len(&doc.data()[line_start..doc.scan_line_end(line_start)])
}

/// Inserts bytes produced by `f` at every cursor, moving each cursor past the bytes
/// inserted on its behalf.
fn insert_with<F>(doc: &mut Document, cursors: &mut CursorSet, f: F)
where
    F: Fn(&Document, usize) -> Vec<u8>,
{
    let mut batch = cursors.get_sorted_cursors();
    let mut low = Low::new();
    for i in 0..batch.len() {
        let bytes = f(doc, batch[i].1.pos);
        if bytes.len() > 0 {
            let offset = doc.insert_range(batch[i].1.pos, &bytes);
            let c = &mut batch[i].1;
            c.pos = offset + bytes.len();
            c.sel = c.pos;
            cursor::adjust_cursors(&mut batch, Some(i), offset, true, bytes.len());
            low.touch(offset);
        }
    }
    finish(doc, cursors, batch, low);
}

/// Inserts `bytes` at every cursor.
pub fn insert_text(doc: &mut Document, cursors: &mut CursorSet, bytes: &[u8]) {
    if bytes.len() > 0 {
        insert_with(doc, cursors, |_, _| bytes.to_vec());
    }
}

pub fn insert_char(doc: &mut Document, cursors: &mut CursorSet, c: char) {
    let mut buf = [0; 4];
    insert_text(doc, cursors, c.encode_utf8(&mut buf).as_bytes());
}

/// Inserts either a hard tab or the configured number of spaces at every cursor.
pub fn insert_tab(doc: &mut Document, cursors: &mut CursorSet, settings: &Settings) {
    insert_text(doc, cursors, &indent_unit(settings));
}

/// Inserts a line break at every cursor, followed by automatic indentation of the
/// new line when enabled.
///
/// Any whitespace that followed the cursor is replaced by the computed indentation.
pub fn insert_newline(doc: &mut Document, cursors: &mut CursorSet, settings: &Settings) {
    if doc.is_cli() {
        return;
    }
    let mut batch = cursors.get_sorted_cursors();
    let mut low = Low::new();
    for i in 0..batch.len() {
        let offset = doc.insert_range(batch[i].1.pos, b"\n");
        cursor::adjust_cursors(&mut batch, Some(i), offset, true, 1);
        low.touch(offset);

        let line_start = offset + 1;
        let mut pos = line_start;
        if settings.auto_indent {
            let indent = auto_indent(doc, line_start, settings);
            let existing = leading_indent(doc, line_start);
            splice(
                doc,
                &mut batch,
                Some(i),
                line_start,
                line_start + existing,
                &indent,
            );
            pos += indent.len();
        }
        let c = &mut batch[i].1;
        c.pos = pos;
        c.sel = pos;
    }
    finish(doc, cursors, batch, low);
}

/// Inserts the closing delimiter `close` at every cursor, and when a matching
/// opening delimiter exists and only indentation precedes the closer, re-indents the
/// line to match the indentation of the line containing the opener.
pub fn insert_closing_delimiter(
    doc: &mut Document,
    cursors: &mut CursorSet,
    settings: &Settings,
    close: u8,
) {
    let open = match delim::pair_of(close) {
        Some((open, c)) if c == close && open != close => open,
        _ => {
            insert_text(doc, cursors, &[close]);
            return;
        }
    };

    let mut batch = cursors.get_sorted_cursors();
    let mut low = Low::new();
    for i in 0..batch.len() {
        let at = doc.insert_range(batch[i].1.pos, &[close]);
        let c = &mut batch[i].1;
        c.pos = at + 1;
        c.sel = c.pos;
        cursor::adjust_cursors(&mut batch, Some(i), at, true, 1);
        low.touch(at);

        if !settings.auto_indent || doc.is_cli() {
            continue;
        }
        if let Some(open_pos) = delim::find_enclosing_open(doc.data(), at, open, close) {
            let open_start = doc.scan_line_start(open_pos);
            let indent = doc.data()[open_start..open_start + leading_indent(doc, open_start)]
                .to_vec();
            let line_start = doc.scan_line_start(at);
            let existing = leading_indent(doc, line_start);
            if line_start != open_start && line_start + existing == at {
                splice(
                    doc,
                    &mut batch,
                    None,
                    line_start,
                    line_start + existing,
                    &indent,
                );
                low.touch(line_start);
            }
        }
    }
    finish(doc, cursors, batch, low);
}

/// Deletes backward from every cursor.
///
/// At the start of a line other than the first, the preceding line break is
/// deleted. If only indentation precedes the cursor on its line and the byte before
/// the cursor is a space, up to one tab width of contiguous spaces is deleted.
/// Otherwise, a single rune is deleted. Nothing happens at the start of the
/// document.
pub fn delete_char(doc: &mut Document, cursors: &mut CursorSet, settings: &Settings) {
    let mut batch = cursors.get_sorted_cursors();
    let mut low = Low::new();
    for i in 0..batch.len() {
        let pos = batch[i].1.pos;
        if pos == 0 {
            continue;
        }
        let data = doc.data();
        let line_start = doc.scan_line_start(pos);
        let start = if pos == line_start {
            pos - 1
        } else if data[line_start..pos].iter().all(|&b| etc::is_indent(b))
            && data[pos - 1] == b' '
        {
            let n = data[line_start..pos]
                .iter()
                .rev()
                .take(cmp::max(settings.tab_size, 1))
                .take_while(|&&b| b == b' ')
                .count();
            pos - n
        } else {
            etc::prev_rune_start(data, pos)
        };
        doc.delete_range(start, pos);
        let c = &mut batch[i].1;
        c.pos = start;
        c.sel = start;
        cursor::adjust_cursors(&mut batch, Some(i), start, false, pos - start);
        low.touch(start);
    }
    finish(doc, cursors, batch, low);
}

/// Deletes the rune following every cursor, including a line break.
pub fn delete_forward_char(doc: &mut Document, cursors: &mut CursorSet) {
    let ranges = cursors
        .iter()
        .map(|c| c.pos..c.pos + etc::next_rune_len(doc.data(), c.pos))
        .collect();
    delete_ranges(doc, cursors, ranges);
}

/// Deletes the rune under every cursor, unless the cursor is at the end of its line.
pub fn delete_under_cursor(doc: &mut Document, cursors: &mut CursorSet) {
    let ranges = cursors
        .iter()
        .filter(|c| doc.data().get(c.pos).is_some_and(|&b| b != b'\n'))
        .map(|c| c.pos..c.pos + etc::next_rune_len(doc.data(), c.pos))
        .collect();
    delete_ranges(doc, cursors, ranges);
}

/// Deletes backward from every cursor over any whitespace, then over one run of
/// characters sharing the same class.
pub fn delete_word(doc: &mut Document, cursors: &mut CursorSet) {
    let data = doc.data();
    let ranges = cursors
        .iter()
        .map(|c| {
            let mut start = c.pos;
            while start > 0 {
                let prev = etc::prev_rune_start(data, start);
                if etc::class_at(data, prev, false) == Class::Whitespace {
                    start = prev;
                } else {
                    break;
                }
            }
            if start > 0 {
                let class = etc::class_at(data, etc::prev_rune_start(data, start), false);
                while start > 0 {
                    let prev = etc::prev_rune_start(data, start);
                    if etc::class_at(data, prev, false) == class {
                        start = prev;
                    } else {
                        break;
                    }
                }
            }
            start..c.pos
        })
        .collect();
    delete_ranges(doc, cursors, ranges);
}

/// Returns the range of `line` including its line break.
///
/// For the last line, which has no line break, the line break preceding it is
/// included instead so that no empty line is left behind.
fn whole_line_range(doc: &Document, first: usize, last: usize) -> Range<usize> {
    let start = doc.line_start(first);
    let end = doc.next_line_start(last);
    if doc.is_last_line(last) && first > 0 && end == doc.len() && doc.line_end(last) == end {
        start - 1..end
    } else {
        start..end
    }
}

/// Moves every cursor to the first non-blank character of its line and removes
/// cursors that end up sharing a position.
fn settle_on_first_non_blank(doc: &Document, cursors: &mut CursorSet) {
    for c in cursors.iter_mut() {
        let pos = nav::first_non_blank(doc, doc.line_of(c.pos));
        c.move_to(doc, pos);
        c.collapse();
    }
    cursors.dedup();
}

/// Deletes every line containing a cursor, including its line break.
pub fn delete_line(doc: &mut Document, cursors: &mut CursorSet) {
    let spans = cursors
        .iter()
        .map(|c| (doc.line_of(c.pos), doc.line_of(c.pos)))
        .collect();
    delete_lines(doc, cursors, spans);
}

/// Deletes the lines from first to last, inclusive, of every span in `spans`.
pub fn delete_lines(doc: &mut Document, cursors: &mut CursorSet, spans: Vec<(usize, usize)>) {
    let ranges = spans
        .into_iter()
        .map(|(first, last)| whole_line_range(doc, first, last))
        .collect();
    delete_ranges(doc, cursors, ranges);
    settle_on_first_non_blank(doc, cursors);
}

/// Removes the content of every line containing a cursor, keeping the line itself,
/// and indents the emptied line as if it had just been opened.
pub fn change_line(doc: &mut Document, cursors: &mut CursorSet, settings: &Settings) {
    let spans = cursors
        .iter()
        .map(|c| (doc.line_of(c.pos), doc.line_of(c.pos)))
        .collect();
    change_lines(doc, cursors, settings, spans);
}

/// Replaces the lines of every span in `spans` with a single indented empty line.
pub fn change_lines(
    doc: &mut Document,
    cursors: &mut CursorSet,
    settings: &Settings,
    spans: Vec<(usize, usize)>,
) {
    let ranges = spans
        .into_iter()
        .map(|(first, last)| doc.line_start(first)..doc.line_end(last))
        .collect();
    change_ranges(doc, cursors, settings, ranges);
}

/// Deletes `ranges` of whole-line content, then applies automatic indentation at
/// every cursor.
fn change_ranges(
    doc: &mut Document,
    cursors: &mut CursorSet,
    settings: &Settings,
    ranges: Vec<Range<usize>>,
) {
    delete_ranges(doc, cursors, ranges);
    cursors.collapse_selections();
    if settings.auto_indent {
        insert_with(doc, cursors, |doc, pos| {
            if pos == doc.scan_line_start(pos) {
                auto_indent(doc, pos, settings)
            } else {
                Vec::new()
            }
        });
    }
}

/// Deletes from every cursor to the end of its line, excluding the line break.
pub fn delete_to_line_end(doc: &mut Document, cursors: &mut CursorSet) {
    let ranges = cursors
        .iter()
        .map(|c| {
            let end = doc.scan_line_end(c.pos);
            cmp::min(c.pos, end)..end
        })
        .collect();
    delete_ranges(doc, cursors, ranges);
}

/// Deletes the character-wise selection of every cursor.
pub fn delete_selection(doc: &mut Document, cursors: &mut CursorSet) {
    let ranges = cursors.iter().map(|c| c.char_range(doc)).collect();
    delete_ranges(doc, cursors, ranges);
    cursors.collapse_selections();
}

/// Deletes the line-wise selection of every cursor.
pub fn delete_visual_line_selection(doc: &mut Document, cursors: &mut CursorSet) {
    let spans = selected_lines(doc, cursors);
    delete_lines(doc, cursors, spans);
}

/// Removes the content of the line-wise selection of every cursor, keeping a single
/// empty line in its place that is indented as if it had just been opened.
pub fn change_visual_line_selection(
    doc: &mut Document,
    cursors: &mut CursorSet,
    settings: &Settings,
) {
    let spans = selected_lines(doc, cursors);
    change_lines(doc, cursors, settings, spans);
}

fn selected_lines(doc: &Document, cursors: &CursorSet) -> Vec<(usize, usize)> {
    cursors
        .iter()
        .map(|c| {
            let (lo, hi) = c.bounds();
            (doc.line_of(lo), doc.line_of(hi))
        })
        .collect()
}

/// Deletes the rectangular block spanned by `anchor`, given as line and column, and
/// the primary cursor, leaving a single cursor at the top-left corner of the block.
pub fn delete_block_selection(doc: &mut Document, cursors: &mut CursorSet, anchor: (usize, usize)) {
    let ranges = cursor::block_ranges(doc, anchor, cursors.primary());
    let top = ranges.first().map(|r| r.start);
    delete_ranges(doc, cursors, ranges);
    if let Some(pos) = top {
        cursors.reset(doc, pos);
    }
}

/// Deletes the rectangular block like [`delete_block_selection`], then places a
/// cursor at the left edge of the block on every line it spanned.
pub fn change_block_selection(doc: &mut Document, cursors: &mut CursorSet, anchor: (usize, usize)) {
    let ranges = cursor::block_ranges(doc, anchor, cursors.primary());
    let mut removed = 0;
    let positions = ranges
        .iter()
        .map(|r| {
            let pos = r.start - removed;
            removed += r.len();
            pos
        })
        .collect::<Vec<_>>();
    delete_ranges(doc, cursors, ranges);
    if let Some((&first, rest)) = positions.split_first() {
        cursors.reset(doc, first);
        for &pos in rest {
            cursors.add_cursor_at(doc, pos);
        }
    }
}

/// Deletes the bytes in [`start`, `end`), adjusting every cursor.
pub fn delete_range(doc: &mut Document, cursors: &mut CursorSet, start: usize, end: usize) {
    delete_ranges(doc, cursors, vec![start..end]);
}

/// Deletes an arbitrary collection of ranges, which are merged where they overlap
/// or touch and then deleted in descending order.
///
/// A cursor inside a deleted range collapses to the start of that range.
pub fn delete_ranges(doc: &mut Document, cursors: &mut CursorSet, ranges: Vec<Range<usize>>) {
    let mut batch = cursors.get_sorted_cursors();
    let mut low = Low::new();
    for range in merge_ranges(ranges).into_iter().rev() {
        let start = doc.delete_range(range.start, range.end);
        cursor::adjust_cursors(&mut batch, None, start, false, range.end - start);
        low.touch(start);
    }
    finish(doc, cursors, batch, low);
}

/// Returns `ranges` sorted and with overlapping or adjacent ranges merged, and
/// with empty ranges removed.
pub fn merge_ranges(mut ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    ranges.retain(|r| r.start < r.end);
    ranges.sort_by_key(|r| r.start);
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for r in ranges {
        match merged.last_mut() {
            Some(last) if r.start <= last.end => last.end = cmp::max(last.end, r.end),
            _ => merged.push(r),
        }
    }
    merged
}

/// Replaces the bytes in [`start`, `end`) with `bytes`, adjusting every cursor.
pub fn replace_range(
    doc: &mut Document,
    cursors: &mut CursorSet,
    start: usize,
    end: usize,
    bytes: &[u8],
) {
    let mut batch = cursors.get_sorted_cursors();
    splice(doc, &mut batch, None, start, end, bytes);
    let mut low = Low::new();
    low.touch(cmp::min(start, doc.len()));
    finish(doc, cursors, batch, low);
}

/// Joins the line containing every cursor with the line that follows.
///
/// The line break and any indentation of the following line are replaced by a
/// single space, and the cursor is placed on that space.
pub fn join_lines(doc: &mut Document, cursors: &mut CursorSet) {
    let mut batch = cursors.get_sorted_cursors();
    let lines = batch
        .iter()
        .map(|(_, c)| doc.line_of(c.pos))
        .collect::<Vec<_>>();
    let mut low = Low::new();
    let mut prev_line = None;
    for i in 0..batch.len() {
        let line = lines[i];
        if prev_line == Some(line) || doc.is_last_line(line) {
            continue;
        }
        prev_line = Some(line);

        // Lines are visited in descending order, so the index is still valid here.
        let nl = doc.line_end(line);
        let ws = leading_indent(doc, nl + 1);
        splice(doc, &mut batch, Some(i), nl, nl + 1 + ws, b" ");
        let c = &mut batch[i].1;
        c.pos = nl;
        c.sel = nl;
        low.touch(nl);
    }
    finish(doc, cursors, batch, low);
}

/// Opens a new line below the line containing every cursor and moves the cursor
/// onto it.
pub fn open_line_below(doc: &mut Document, cursors: &mut CursorSet, settings: &Settings) {
    let mut batch = cursors.get_sorted_cursors();
    let mut low = Low::new();
    for i in 0..batch.len() {
        let end = doc.scan_line_end(batch[i].1.pos);
        doc.insert_range(end, b"\n");
        cursor::adjust_cursors(&mut batch, Some(i), end, true, 1);
        let indent = if settings.auto_indent {
            auto_indent(doc, end + 1, settings)
        } else {
            Vec::new()
        };
        splice(doc, &mut batch, Some(i), end + 1, end + 1, &indent);
        let c = &mut batch[i].1;
        c.pos = end + 1 + indent.len();
        c.sel = c.pos;
        low.touch(end);
    }
    finish(doc, cursors, batch, low);
}

/// Opens a new line above the line containing every cursor and moves the cursor
/// onto it, indented like the line it was opened from.
pub fn open_line_above(doc: &mut Document, cursors: &mut CursorSet, settings: &Settings) {
    let mut batch = cursors.get_sorted_cursors();
    let mut low = Low::new();
    for i in 0..batch.len() {
        let start = doc.scan_line_start(batch[i].1.pos);
        let mut bytes = if settings.auto_indent {
            doc.data()[start..start + leading_indent(doc, start)].to_vec()
        } else {
            Vec::new()
        };
        let indent = bytes.len();
        bytes.push(b'\n');
        doc.insert_range(start, &bytes);
        cursor::adjust_cursors(&mut batch, Some(i), start, true, bytes.len());
        let c = &mut batch[i].1;
        c.pos = start + indent;
        c.sel = c.pos;
        low.touch(start);
    }
    finish(doc, cursors, batch, low);
}

/// Inserts a secondary cursor at the start of every line spanned by `anchor` and
/// the primary cursor, positioned at the left or right edge of the block, which is
/// how block insertion and appending are prepared.
pub fn block_cursors(doc: &Document, cursors: &mut CursorSet, anchor: (usize, usize), append: bool) {
    let ranges = cursor::block_ranges(doc, anchor, cursors.primary());
    let (a_col, p_col) = (anchor.1, cursors.primary().col);
    let left = cmp::min(a_col, p_col);
    let positions = ranges
        .iter()
        .map(|r| {
            if append {
                r.end
            } else {
                let line = doc.line_of(r.start);
                let start = doc.line_start(line);
                cmp::min(start + left, doc.line_end(line))
            }
        })
        .collect::<Vec<_>>();
    if let Some((&first, rest)) = positions.split_first() {
        cursors.reset(doc, first);
        for &pos in rest {
            cursors.add_cursor_at(doc, pos);
        }
    }
}

/// Returns a cursor for every non-overlapping range in `ranges`, selecting the range
/// character-wise.
pub fn selection_cursors(doc: &Document, ranges: &[Range<usize>]) -> Vec<Cursor> {
    ranges
        .iter()
        .filter(|r| r.start < r.end)
        .map(|r| {
            let mut c = Cursor::at(doc, etc::prev_rune_start(doc.data(), r.end));
            c.sel = r.start;
            c
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::default()
    }

    fn setup(text: &str, positions: &[usize]) -> (Document, CursorSet) {
        let doc = Document::with_bytes(text.as_bytes());
        let mut cursors = CursorSet::new();
        if let Some((&first, rest)) = positions.split_first() {
            cursors.reset(&doc, first);
            for &pos in rest {
                cursors.add_cursor_at(&doc, pos);
            }
        }
        (doc, cursors)
    }

    fn positions(cursors: &CursorSet) -> Vec<usize> {
        cursors.iter().map(|c| c.pos).collect()
    }

    fn text(doc: &Document) -> String {
        doc.text().to_string()
    }

    #[test]
    fn multi_cursor_insert() {
        let (mut doc, mut cursors) = setup("ab", &[0, 2]);
        insert_text(&mut doc, &mut cursors, b"X");
        assert_eq!(text(&doc), "XabX");
        assert_eq!(positions(&cursors), vec![1, 4]);
    }

    #[test]
    fn insert_then_delete_restores_bytes() {
        let (mut doc, mut cursors) = setup("héllo\nwörld", &[7]);
        insert_text(&mut doc, &mut cursors, "ünï\ncode".as_bytes());
        delete_range(&mut doc, &mut cursors, 7, 7 + "ünï\ncode".len());
        assert_eq!(text(&doc), "héllo\nwörld");
        assert_eq!(doc.line_starts(), &[0, 7]);
        assert_eq!(cursors.primary().pos, 7);
    }

    #[test]
    fn cursor_fields_consistent_after_edit() {
        let (mut doc, mut cursors) = setup("ab\ncd\nef", &[1, 4, 7]);
        insert_text(&mut doc, &mut cursors, b"\n\n");
        for c in cursors.iter() {
            assert!(c.pos <= doc.len());
            assert_eq!(c.col, c.pos - doc.line_starts()[c.line]);
        }
    }

    #[test]
    fn tab_soft_and_hard() {
        let (mut doc, mut cursors) = setup("x", &[0]);
        insert_tab(&mut doc, &mut cursors, &settings());
        assert_eq!(text(&doc), "    x");
        let hard = Settings {
            tab_hard: true,
            ..settings()
        };
        insert_tab(&mut doc, &mut cursors, &hard);
        assert_eq!(text(&doc), "    \tx");
        assert_eq!(cursors.primary().pos, 5);
    }

    #[test]
    fn newline_copies_indentation() {
        let (mut doc, mut cursors) = setup("  ab", &[4]);
        insert_newline(&mut doc, &mut cursors, &settings());
        assert_eq!(text(&doc), "  ab\n  ");
        assert_eq!(cursors.primary().pos, 7);
        assert_eq!(cursors.primary().line, 1);
    }

    #[test]
    fn newline_after_opener_adds_indentation() {
        let (mut doc, mut cursors) = setup("  f {}", &[5]);
        insert_newline(&mut doc, &mut cursors, &settings());
        assert_eq!(text(&doc), "  f {\n      }");
        assert_eq!(cursors.primary().pos, 12);
    }

    #[test]
    fn newline_replaces_trailing_whitespace() {
        let (mut doc, mut cursors) = setup("ab   cd", &[2]);
        insert_newline(&mut doc, &mut cursors, &settings());
        assert_eq!(text(&doc), "ab\ncd");
        assert_eq!(cursors.primary().pos, 3);
    }

    #[test]
    fn newline_without_auto_indent() {
        let no_indent = Settings {
            auto_indent: false,
            ..settings()
        };
        let (mut doc, mut cursors) = setup("  ab", &[4]);
        insert_newline(&mut doc, &mut cursors, &no_indent);
        assert_eq!(text(&doc), "  ab\n");
        assert_eq!(cursors.primary().pos, 5);
    }

    #[test]
    fn newline_at_many_cursors() {
        let (mut doc, mut cursors) = setup(" a b", &[2, 4]);
        insert_newline(&mut doc, &mut cursors, &settings());
        assert_eq!(text(&doc), " a\n b\n ");
        assert_eq!(positions(&cursors), vec![4, 7]);
    }

    #[test]
    fn closing_delimiter_reindents_line() {
        let (mut doc, mut cursors) = setup("  if {\n      ", &[13]);
        insert_closing_delimiter(&mut doc, &mut cursors, &settings(), b'}');
        assert_eq!(text(&doc), "  if {\n  }");
        assert_eq!(cursors.primary().pos, 10);
    }

    #[test]
    fn closing_delimiter_after_text_keeps_indentation() {
        let (mut doc, mut cursors) = setup("foo(\n  bar", &[10]);
        insert_closing_delimiter(&mut doc, &mut cursors, &settings(), b')');
        assert_eq!(text(&doc), "foo(\n  bar)");
        assert_eq!(cursors.primary().pos, 11);
    }

    #[test]
    fn closing_delimiter_without_opener() {
        let (mut doc, mut cursors) = setup("    ", &[4]);
        insert_closing_delimiter(&mut doc, &mut cursors, &settings(), b')');
        assert_eq!(text(&doc), "    )");
        assert_eq!(cursors.primary().pos, 5);
    }

    #[test]
    fn backspace_joins_lines() {
        let (mut doc, mut cursors) = setup("ab\ncd", &[3]);
        delete_char(&mut doc, &mut cursors, &settings());
        assert_eq!(text(&doc), "abcd");
        assert_eq!(cursors.primary().pos, 2);
        assert_eq!(doc.line_count(), 1);
    }

    #[test]
    fn backspace_removes_indentation_width() {
        let (mut doc, mut cursors) = setup("      x", &[6]);
        delete_char(&mut doc, &mut cursors, &settings());
        assert_eq!(text(&doc), "  x");
        delete_char(&mut doc, &mut cursors, &settings());
        assert_eq!(text(&doc), "x");
    }

    #[test]
    fn backspace_single_rune() {
        let (mut doc, mut cursors) = setup("a  é", &[5]);
        delete_char(&mut doc, &mut cursors, &settings());
        assert_eq!(text(&doc), "a  ");
        delete_char(&mut doc, &mut cursors, &settings());
        assert_eq!(text(&doc), "a ");
    }

    #[test]
    fn backspace_merges_adjacent_cursors() {
        let (mut doc, mut cursors) = setup("abcd", &[3, 4]);
        delete_char(&mut doc, &mut cursors, &settings());
        assert_eq!(text(&doc), "ab");
        assert_eq!(positions(&cursors), vec![2]);
        insert_text(&mut doc, &mut cursors, b"X");
        assert_eq!(text(&doc), "abX");
    }

    #[test]
    fn backspace_at_start_is_noop() {
        let (mut doc, mut cursors) = setup("ab", &[0]);
        delete_char(&mut doc, &mut cursors, &settings());
        assert_eq!(text(&doc), "ab");
        assert!(!doc.is_dirty());
    }

    #[test]
    fn forward_delete() {
        let (mut doc, mut cursors) = setup("aé\nb", &[1]);
        delete_forward_char(&mut doc, &mut cursors);
        assert_eq!(text(&doc), "a\nb");
        delete_forward_char(&mut doc, &mut cursors);
        assert_eq!(text(&doc), "ab");
        delete_under_cursor(&mut doc, &mut cursors);
        assert_eq!(text(&doc), "a");
        delete_under_cursor(&mut doc, &mut cursors);
        assert_eq!(text(&doc), "a");
    }

    #[test]
    fn word_backward() {
        let (mut doc, mut cursors) = setup("foo bar  ", &[9]);
        delete_word(&mut doc, &mut cursors);
        assert_eq!(text(&doc), "foo ");
        assert_eq!(cursors.primary().pos, 4);
    }

    #[test]
    fn word_backward_merges_cursors() {
        let (mut doc, mut cursors) = setup("ab cd", &[5, 4]);
        delete_word(&mut doc, &mut cursors);
        assert_eq!(text(&doc), "ab ");
        assert_eq!(positions(&cursors), vec![3]);
    }

    #[test]
    fn delete_first_of_two_lines() {
        let (mut doc, mut cursors) = setup("hello\nworld", &[0]);
        delete_line(&mut doc, &mut cursors);
        assert_eq!(text(&doc), "world");
        assert_eq!(cursors.primary().pos, 0);
        assert_eq!(cursors.primary().line, 0);
    }

    #[test]
    fn delete_last_line_takes_preceding_break() {
        let (mut doc, mut cursors) = setup("one\n  two\nthree", &[12]);
        delete_line(&mut doc, &mut cursors);
        assert_eq!(text(&doc), "one\n  two");
        assert_eq!(cursors.primary().pos, 6);
    }

    #[test]
    fn delete_lines_of_many_cursors() {
        let (mut doc, mut cursors) = setup("a\nb\nc\nd", &[0, 2, 5]);
        delete_line(&mut doc, &mut cursors);
        assert_eq!(text(&doc), "d");
        assert_eq!(cursors.len(), 1);
    }

    #[test]
    fn change_line_keeps_line() {
        let (mut doc, mut cursors) = setup("if {\n    x\n}", &[8]);
        change_line(&mut doc, &mut cursors, &settings());
        assert_eq!(text(&doc), "if {\n    \n}");
        assert_eq!(cursors.primary().pos, 9);
    }

    #[test]
    fn to_line_end() {
        let (mut doc, mut cursors) = setup("abcd\nefgh", &[1, 7]);
        delete_to_line_end(&mut doc, &mut cursors);
        assert_eq!(text(&doc), "a\nef");
        assert_eq!(positions(&cursors), vec![1, 4]);
    }

    #[test]
    fn selections_merge() {
        let (mut doc, mut cursors) = setup("abcdefgh", &[1]);
        cursors.primary_mut().pos = 3;
        let mut c = Cursor::at(&doc, 4);
        c.sel = 2;
        cursors.add_cursor(c);
        delete_selection(&mut doc, &mut cursors);
        assert_eq!(text(&doc), "afgh");
        assert_eq!(positions(&cursors), vec![1]);
        assert!(!cursors.primary().has_selection());
    }

    #[test]
    fn visual_line_selection() {
        let (mut doc, mut cursors) = setup("a\nb\nc\nd", &[2]);
        cursors.primary_mut().pos = 4;
        delete_visual_line_selection(&mut doc, &mut cursors);
        assert_eq!(text(&doc), "a\nd");
        assert_eq!(cursors.primary().pos, 2);
    }

    #[test]
    fn change_visual_lines() {
        let (mut doc, mut cursors) = setup("x\n  a\n  b\ny", &[2]);
        cursors.primary_mut().pos = 7;
        change_visual_line_selection(&mut doc, &mut cursors, &settings());
        assert_eq!(text(&doc), "x\n\ny");
        assert_eq!(cursors.primary().pos, 2);
    }

    #[test]
    fn block_selection() {
        let (mut doc, mut cursors) = setup("abcd\nef\nghij", &[10]);
        delete_block_selection(&mut doc, &mut cursors, (0, 1));
        assert_eq!(text(&doc), "ad\ne\ngj");
        assert_eq!(positions(&cursors), vec![1]);
    }

    #[test]
    fn block_change_leaves_cursor_per_line() {
        let (mut doc, mut cursors) = setup("abcd\nef\nghij", &[10]);
        change_block_selection(&mut doc, &mut cursors, (0, 1));
        assert_eq!(text(&doc), "ad\ne\ngj");
        assert_eq!(positions(&cursors), vec![1, 4, 6]);
    }

    #[test]
    fn line_spans() {
        let (mut doc, mut cursors) = setup("a\nb\nc\nd", &[2]);
        delete_lines(&mut doc, &mut cursors, vec![(1, 2)]);
        assert_eq!(text(&doc), "a\nd");
        assert_eq!(cursors.primary().pos, 2);
    }

    #[test]
    fn merged_ranges() {
        let ranges = merge_ranges(vec![5..7, 0..2, 1..3, 3..4, 9..9]);
        assert_eq!(ranges, vec![0..4, 5..7]);
    }

    #[test]
    fn replace_shifts_later_cursors() {
        let (mut doc, mut cursors) = setup("foo bar", &[0, 6]);
        replace_range(&mut doc, &mut cursors, 0, 3, b"quux");
        assert_eq!(text(&doc), "quux bar");
        assert_eq!(positions(&cursors), vec![0, 7]);
    }

    #[test]
    fn join_collapses_indentation() {
        let (mut doc, mut cursors) = setup("ab\n    cd\nef", &[1]);
        join_lines(&mut doc, &mut cursors);
        assert_eq!(text(&doc), "ab cd\nef");
        assert_eq!(cursors.primary().pos, 2);
        join_lines(&mut doc, &mut cursors);
        assert_eq!(text(&doc), "ab cd ef");
        join_lines(&mut doc, &mut cursors);
        assert_eq!(text(&doc), "ab cd ef");
    }

    #[test]
    fn open_lines() {
        let (mut doc, mut cursors) = setup("  a {\nb", &[2]);
        open_line_below(&mut doc, &mut cursors, &settings());
        assert_eq!(text(&doc), "  a {\n      \nb");
        assert_eq!(cursors.primary().pos, 12);

        let (mut doc, mut cursors) = setup("x\n  y", &[4]);
        open_line_above(&mut doc, &mut cursors, &settings());
        assert_eq!(text(&doc), "x\n  \n  y");
        assert_eq!(cursors.primary().pos, 4);
    }

    #[test]
    fn cursors_for_block_insert_and_append() {
        let (doc, mut cursors) = setup("abcd\nef\nghij", &[10]);
        block_cursors(&doc, &mut cursors, (0, 1), false);
        assert_eq!(positions(&cursors), vec![1, 6, 9]);

        let (doc, mut cursors) = setup("abcd\nef\nghij", &[10]);
        block_cursors(&doc, &mut cursors, (0, 1), true);
        assert_eq!(positions(&cursors), vec![3, 7, 11]);
    }
}
