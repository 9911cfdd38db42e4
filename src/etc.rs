//! Useful functions for working with UTF-8 encoded bytes.
//!
//! Buffer positions are byte offsets rather than character indexes, so any operation
//! that moves by whole characters needs to find the boundaries of _runes_ by looking
//! at the bytes themselves.

/// Returns `true` if `b` is a UTF-8 continuation byte, i.e. `10xxxxxx`.
#[inline]
pub fn is_continuation(b: u8) -> bool {
    b & 0xc0 == 0x80
}

/// Returns the number of bytes in the UTF-8 sequence whose leading byte is `b`.
///
/// Malformed leading bytes are treated as single-byte runes so that scanning always
/// makes progress.
#[inline]
pub fn rune_width(b: u8) -> usize {
    match b.leading_ones() {
        0 => 1,
        2 => 2,
        3 => 3,
        4 => 4,
        _ => 1,
    }
}

/// Returns the length of the rune starting at `pos`, or `0` if `pos` is at or beyond
/// the end of `data`.
///
/// The length never extends beyond the end of `data`, even if the leading byte
/// announces a longer sequence.
pub fn next_rune_len(data: &[u8], pos: usize) -> usize {
    if pos < data.len() {
        rune_width(data[pos]).min(data.len() - pos)
    } else {
        0
    }
}

/// Returns the starting position of the rune preceding `pos`, or `0` if `pos` is
/// already `0`.
///
/// At most three continuation bytes are skipped, which is the longest well-formed
/// sequence.
pub fn prev_rune_start(data: &[u8], pos: usize) -> usize {
    let pos = pos.min(data.len());
    if pos == 0 {
        return 0;
    }
    let mut start = pos - 1;
    while start > 0 && pos - start < 4 && is_continuation(data[start]) {
        start -= 1;
    }
    start
}

/// Returns `pos` moved back to the start of the rune containing it.
pub fn snap_rune_start(data: &[u8], pos: usize) -> usize {
    let mut pos = pos.min(data.len());
    while pos > 0 && pos < data.len() && is_continuation(data[pos]) {
        pos -= 1;
    }
    pos
}

/// Returns the rune starting at `pos`, or `None` if `pos` is at the end of `data`.
///
/// Malformed sequences decode as [`char::REPLACEMENT_CHARACTER`].
pub fn rune_at(data: &[u8], pos: usize) -> Option<char> {
    let n = next_rune_len(data, pos);
    if n == 0 {
        None
    } else {
        let c = std::str::from_utf8(&data[pos..pos + n])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        Some(c)
    }
}

/// Returns `true` if `b` is a horizontal whitespace byte that may form indentation.
#[inline]
pub fn is_indent(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Returns the number of indentation bytes at the start of `text`.
pub fn indent_len(text: &[u8]) -> usize {
    text.iter().take_while(|&&b| is_indent(b)).count()
}

/// Classification of runes used by word motions.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Class {
    Whitespace,
    Word,
    Punctuation,
}

/// Returns the class of `c`.
///
/// When `big` is `true`, only whitespace is distinguished and everything else is
/// considered part of a word.
pub fn classify(c: char, big: bool) -> Class {
    if c.is_whitespace() {
        Class::Whitespace
    } else if big || c.is_alphanumeric() || c == '_' {
        Class::Word
    } else {
        Class::Punctuation
    }
}

/// Returns the class of the rune at `pos`, treating the end of `data` as whitespace.
pub fn class_at(data: &[u8], pos: usize, big: bool) -> Class {
    rune_at(data, pos)
        .map(|c| classify(c, big))
        .unwrap_or(Class::Whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "aé€😀b";

    #[test]
    fn rune_lengths() {
        let data = TEXT.as_bytes();
        assert_eq!(next_rune_len(data, 0), 1);
        assert_eq!(next_rune_len(data, 1), 2);
        assert_eq!(next_rune_len(data, 3), 3);
        assert_eq!(next_rune_len(data, 6), 4);
        assert_eq!(next_rune_len(data, 10), 1);
        assert_eq!(next_rune_len(data, 11), 0);
    }

    #[test]
    fn previous_rune_boundaries() {
        let data = TEXT.as_bytes();
        assert_eq!(prev_rune_start(data, 11), 10);
        assert_eq!(prev_rune_start(data, 10), 6);
        assert_eq!(prev_rune_start(data, 6), 3);
        assert_eq!(prev_rune_start(data, 3), 1);
        assert_eq!(prev_rune_start(data, 1), 0);
        assert_eq!(prev_rune_start(data, 0), 0);
    }

    #[test]
    fn snap_inside_rune() {
        let data = TEXT.as_bytes();
        assert_eq!(snap_rune_start(data, 2), 1);
        assert_eq!(snap_rune_start(data, 8), 6);
        assert_eq!(snap_rune_start(data, 11), 11);
    }

    #[test]
    fn truncated_sequence_does_not_overrun() {
        let data = &"€".as_bytes()[..2];
        assert_eq!(next_rune_len(data, 0), 2);
        assert_eq!(rune_at(data, 0), Some(char::REPLACEMENT_CHARACTER));
    }

    #[test]
    fn classes() {
        assert_eq!(classify('x', false), Class::Word);
        assert_eq!(classify('_', false), Class::Word);
        assert_eq!(classify('é', false), Class::Word);
        assert_eq!(classify('(', false), Class::Punctuation);
        assert_eq!(classify('(', true), Class::Word);
        assert_eq!(classify('\n', true), Class::Whitespace);
        assert_eq!(class_at(b"ab", 2, false), Class::Whitespace);
    }
}
