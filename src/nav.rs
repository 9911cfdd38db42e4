//! A collection of types and functions for navigating [`Document`]s.
//!
//! Every function in this module is read-only with respect to the document. Motions
//! return the position a cursor should move to, and text objects return the range of
//! bytes they span, leaving it to callers to decide what to do with the result.

use crate::cursor::Cursor;
use crate::delim;
use crate::document::Document;
use crate::etc::{self, Class};
use std::cmp;
use std::fmt::{self, Display, Formatter};
use std::ops::Range;

/// The set of cursor movements.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    /// Start of the next word, where `true` selects _big_ word granularity.
    WordStartForward(bool),
    /// Start of the previous word.
    WordStartBackward(bool),
    /// End of the current or next word.
    WordEndForward(bool),
    LineStart,
    FirstNonBlank,
    LineEnd,
    ParagraphForward,
    ParagraphBackward,
    Top,
    Bottom,
    MatchPair,
}

impl Display for Motion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let big = |b: &bool| if *b { "-big" } else { "" };
        match self {
            Motion::Left => write!(f, "move-left"),
            Motion::Right => write!(f, "move-right"),
            Motion::Up => write!(f, "move-up"),
            Motion::Down => write!(f, "move-down"),
            Motion::WordStartForward(b) => write!(f, "move{}-word-forward", big(b)),
            Motion::WordStartBackward(b) => write!(f, "move{}-word-backward", big(b)),
            Motion::WordEndForward(b) => write!(f, "move{}-word-end", big(b)),
            Motion::LineStart => write!(f, "move-line-start"),
            Motion::FirstNonBlank => write!(f, "move-first-non-blank"),
            Motion::LineEnd => write!(f, "move-line-end"),
            Motion::ParagraphForward => write!(f, "move-paragraph-forward"),
            Motion::ParagraphBackward => write!(f, "move-paragraph-backward"),
            Motion::Top => write!(f, "move-top"),
            Motion::Bottom => write!(f, "move-bottom"),
            Motion::MatchPair => write!(f, "move-match-pair"),
        }
    }
}

/// Describes how a motion delimits the text affected by an operator.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum MotionKind {
    /// The character at the target position is excluded.
    Exclusive,

    /// The character at the target position is included.
    Inclusive,

    /// Every line between the cursor and the target is affected in its entirety.
    Linewise,
}

impl Motion {
    pub fn kind(&self) -> MotionKind {
        match self {
            Motion::Up | Motion::Down | Motion::Top | Motion::Bottom => MotionKind::Linewise,
            Motion::WordEndForward(_) | Motion::LineEnd | Motion::MatchPair => {
                MotionKind::Inclusive
            }
            _ => MotionKind::Exclusive,
        }
    }

    /// Returns `true` if the motion moves between lines while honoring the preferred
    /// column.
    pub fn is_vertical(&self) -> bool {
        matches!(self, Motion::Up | Motion::Down)
    }
}

/// Returns the position `cursor` would move to under `motion`.
///
/// When `past_end` is `true`, the cursor may rest on the position immediately after
/// the last character of a line. Otherwise it is held on the last character, which is
/// the normal rule outside of command input and insertion.
pub fn resolve(doc: &Document, cursor: &Cursor, motion: Motion, past_end: bool) -> usize {
    let pos = cursor.pos;
    match motion {
        Motion::Left => move_left(doc, pos),
        Motion::Right => move_right(doc, pos, past_end),
        Motion::Up => move_vertical(doc, cursor, false, past_end),
        Motion::Down => move_vertical(doc, cursor, true, past_end),
        Motion::WordStartForward(big) => word_start_forward(doc, pos, big),
        Motion::WordStartBackward(big) => word_start_backward(doc, pos, big),
        Motion::WordEndForward(big) => word_end_forward(doc, pos, big),
        Motion::LineStart => doc.line_start(doc.line_of(pos)),
        Motion::FirstNonBlank => first_non_blank(doc, doc.line_of(pos)),
        Motion::LineEnd => line_end(doc, pos, past_end),
        Motion::ParagraphForward => paragraph_forward(doc, pos),
        Motion::ParagraphBackward => paragraph_backward(doc, pos),
        Motion::Top => 0,
        Motion::Bottom => first_non_blank(doc, doc.line_count() - 1),
        Motion::MatchPair => delim::match_pair(doc.data(), pos).unwrap_or(pos),
    }
}

/// Moves one rune to the left without leaving the current line.
pub fn move_left(doc: &Document, pos: usize) -> usize {
    let start = doc.line_start(doc.line_of(pos));
    if pos <= start {
        pos
    } else {
        cmp::max(etc::prev_rune_start(doc.data(), pos), start)
    }
}

/// Moves one rune to the right without leaving the current line.
///
/// Unless `past_end` is `true` or the document is command input, the move is refused
/// if it would land on the position after the last character.
pub fn move_right(doc: &Document, pos: usize, past_end: bool) -> usize {
    let end = doc.line_end(doc.line_of(pos));
    if pos >= end {
        return pos;
    }
    let next = pos + etc::next_rune_len(doc.data(), pos);
    if next >= end && !(past_end || doc.is_cli()) {
        pos
    } else {
        cmp::min(next, end)
    }
}

/// Moves one line up or down, aiming for the preferred column of `cursor`.
///
/// The column is clamped to the length of the target line and snapped to the start
/// of a rune. Unless `past_end` is `true` or the document is command input, landing
/// after the last character of a non-empty line backs up one rune.
pub fn move_vertical(doc: &Document, cursor: &Cursor, down: bool, past_end: bool) -> usize {
    let line = doc.line_of(cursor.pos);
    let target = if down {
        if doc.is_last_line(line) {
            return cursor.pos;
        }
        line + 1
    } else {
        if line == 0 {
            return cursor.pos;
        }
        line - 1
    };

    let start = doc.line_start(target);
    let len = doc.line_length(target);
    let col = cmp::min(cursor.preferred_col, len);
    if col == len && len > 0 && !(past_end || doc.is_cli()) {
        etc::prev_rune_start(doc.data(), start + len)
    } else {
        etc::snap_rune_start(doc.data(), start + col)
    }
}

/// Returns the position of the first non-indentation character of `line`.
pub fn first_non_blank(doc: &Document, line: usize) -> usize {
    doc.line_start(line) + etc::indent_len(doc.line_text(line))
}

/// Returns the position of the last character of the line containing `pos`, or the
/// position after it when `past_end` is `true`.
pub fn line_end(doc: &Document, pos: usize, past_end: bool) -> usize {
    let line = doc.line_of(pos);
    let (start, end) = (doc.line_start(line), doc.line_end(line));
    if past_end || doc.is_cli() || end == start {
        end
    } else {
        etc::prev_rune_start(doc.data(), end)
    }
}

/// Holds `pos` on the last character of its line, which is where a cursor rests
/// outside of insertion.
pub fn clamp_normal(doc: &Document, pos: usize) -> usize {
    if doc.is_cli() {
        return cmp::min(pos, doc.len());
    }
    let line = doc.line_of(pos);
    let (start, end) = (doc.line_start(line), doc.line_end(line));
    if pos >= end && end > start {
        etc::prev_rune_start(doc.data(), end)
    } else {
        cmp::min(pos, end)
    }
}

/// Moves to the start of the next word.
///
/// The run of characters sharing the class of the current character is skipped,
/// followed by any whitespace, including newlines.
pub fn word_start_forward(doc: &Document, pos: usize, big: bool) -> usize {
    let data = doc.data();
    if pos >= data.len() {
        return data.len();
    }
    let class = etc::class_at(data, pos, big);
    let mut pos = pos;
    if class != Class::Whitespace {
        pos = skip_forward(data, pos, |c| c == class, big);
    }
    skip_forward(data, pos, |c| c == Class::Whitespace, big)
}

/// Moves to the start of the previous word, or the start of the current word if the
/// cursor is inside of one.
pub fn word_start_backward(doc: &Document, pos: usize, big: bool) -> usize {
    let data = doc.data();
    if pos == 0 {
        return 0;
    }
    let mut pos = etc::prev_rune_start(data, pos);
    while pos > 0 && etc::class_at(data, pos, big) == Class::Whitespace {
        pos = etc::prev_rune_start(data, pos);
    }
    let class = etc::class_at(data, pos, big);
    skip_backward(data, pos, |c| c == class, big)
}

/// Moves to the end of the next word.
///
/// The cursor first advances one rune so that repeated use moves from word to word,
/// then skips whitespace and lands on the last character of the resulting run.
pub fn word_end_forward(doc: &Document, pos: usize, big: bool) -> usize {
    let data = doc.data();
    if pos >= data.len() {
        return pos;
    }
    let pos = skip_forward(
        data,
        pos + etc::next_rune_len(data, pos),
        |c| c == Class::Whitespace,
        big,
    );
    if pos >= data.len() {
        return etc::prev_rune_start(data, data.len());
    }
    let class = etc::class_at(data, pos, big);
    let end = skip_forward(data, pos, |c| c == class, big);
    etc::prev_rune_start(data, end)
}

/// Returns the position after the run of characters that shares the class of the
/// character at `pos`.
pub fn word_run_end(doc: &Document, pos: usize, big: bool) -> usize {
    let data = doc.data();
    if pos >= data.len() {
        return data.len();
    }
    let class = etc::class_at(data, pos, big);
    skip_forward(data, pos, |c| c == class, big)
}

/// Moves to the blank line following the current paragraph, or the end of the
/// document if there is none.
pub fn paragraph_forward(doc: &Document, pos: usize) -> usize {
    let last = doc.line_count() - 1;
    let mut line = doc.line_of(pos);
    while line < last && doc.is_blank_line(line) {
        line += 1;
    }
    while line < last && !doc.is_blank_line(line) {
        line += 1;
    }
    if doc.is_blank_line(line) && line != doc.line_of(pos) {
        doc.line_start(line)
    } else {
        doc.len()
    }
}

/// Moves to the blank line preceding the current paragraph, or the start of the
/// document if there is none.
pub fn paragraph_backward(doc: &Document, pos: usize) -> usize {
    let mut line = doc.line_of(pos);
    while line > 0 && doc.is_blank_line(line) {
        line -= 1;
    }
    while line > 0 && !doc.is_blank_line(line) {
        line -= 1;
    }
    doc.line_start(line)
}

/// Returns the first and last lines of the run of lines around `line` that share its
/// blankness, which for a non-blank line is its paragraph.
pub fn paragraph_bounds(doc: &Document, line: usize) -> (usize, usize) {
    let blank = doc.is_blank_line(line);
    let mut first = line;
    while first > 0 && doc.is_blank_line(first - 1) == blank {
        first -= 1;
    }
    let mut last = line;
    while !doc.is_last_line(last) && doc.is_blank_line(last + 1) == blank {
        last += 1;
    }
    (first, last)
}

/// The set of text objects, which are spans of text derived from the cursor position
/// and used as the target of operators or visual selection.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TextObject {
    Word { big: bool, around: bool },
    Paragraph { around: bool },
    Delimited { delim: u8, around: bool },
}

impl Display for TextObject {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let scope = |around: &bool| if *around { "around" } else { "inner" };
        match self {
            TextObject::Word { big, around } => {
                write!(f, "{}-{}", scope(around), if *big { "big-word" } else { "word" })
            }
            TextObject::Paragraph { around } => write!(f, "{}-paragraph", scope(around)),
            TextObject::Delimited { delim, around } => {
                write!(f, "{}-{}", scope(around), *delim as char)
            }
        }
    }
}

/// Returns the range of bytes spanned by `object` relative to `pos`, or `None` if the
/// object does not exist at that position.
pub fn object_range(doc: &Document, pos: usize, object: TextObject) -> Option<Range<usize>> {
    match object {
        TextObject::Word { big, around } => word_range(doc, pos, big, around),
        TextObject::Paragraph { around } => Some(paragraph_range(doc, pos, around)),
        TextObject::Delimited { delim, around } => {
            delim::find_pair(doc.data(), pos, delim).map(|pair| {
                if around {
                    pair.around_range()
                } else {
                    pair.inner_range()
                }
            })
        }
    }
}

/// Returns the word under `pos`, confined to its line.
///
/// The _inner_ word is the run of characters sharing the class of the character at
/// `pos`. The _around_ word adds trailing whitespace, or leading whitespace when there
/// is none to follow. If `pos` is on whitespace, the around variant instead extends
/// over the following word.
fn word_range(doc: &Document, pos: usize, big: bool, around: bool) -> Option<Range<usize>> {
    let data = doc.data();
    let line = doc.line_of(pos);
    let (line_start, line_end) = (doc.line_start(line), doc.line_end(line));
    if line_start == line_end {
        return None;
    }
    let pos = if pos >= line_end {
        etc::prev_rune_start(data, line_end)
    } else {
        pos
    };

    let data = &data[..line_end];
    let class = etc::class_at(data, pos, big);
    let mut start = skip_backward(data, pos, |c| c == class, big);
    start = cmp::max(start, line_start);
    let mut end = skip_forward(data, pos, |c| c == class, big);

    if around {
        if class == Class::Whitespace {
            let next = etc::class_at(data, end, big);
            end = skip_forward(data, end, |c| c == next, big);
        } else {
            let trailing = skip_forward(data, end, |c| c == Class::Whitespace, big);
            if trailing > end {
                end = trailing;
            } else if start > line_start {
                let prev = etc::prev_rune_start(data, start);
                if etc::class_at(data, prev, big) == Class::Whitespace {
                    start = cmp::max(
                        skip_backward(data, prev, |c| c == Class::Whitespace, big),
                        line_start,
                    );
                }
            }
        }
    }
    Some(start..end)
}

/// Returns the full lines of the paragraph around `pos`, including the `\n` of the
/// last line, and with `around` also any blank lines that follow.
fn paragraph_range(doc: &Document, pos: usize, around: bool) -> Range<usize> {
    let (first, mut last) = paragraph_bounds(doc, doc.line_of(pos));
    if around && !doc.is_last_line(last) {
        let (_, next_last) = paragraph_bounds(doc, last + 1);
        last = next_last;
    }
    doc.line_start(first)..doc.next_line_start(last)
}

/// Returns the position after the run of runes starting at `pos` whose class
/// satisfies `pred`.
fn skip_forward<F>(data: &[u8], pos: usize, pred: F, big: bool) -> usize
where
    F: Fn(Class) -> bool,
{
    let mut pos = pos;
    while pos < data.len() && pred(etc::class_at(data, pos, big)) {
        pos += etc::next_rune_len(data, pos);
    }
    pos
}

/// Returns the first position of the run of runes ending at `pos`, inclusive, whose
/// class satisfies `pred`.
fn skip_backward<F>(data: &[u8], pos: usize, pred: F, big: bool) -> usize
where
    F: Fn(Class) -> bool,
{
    let mut pos = pos;
    while pos > 0 {
        let prev = etc::prev_rune_start(data, pos);
        if pred(etc::class_at(data, prev, big)) {
            pos = prev;
        } else {
            break;
        }
    }
    pos
}
