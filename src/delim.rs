//! Resolution of balanced delimiter pairs and quoted ranges.

use std::ops::Range;

/// Positions of an opening and closing delimiter.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Pair {
    pub open: usize,
    pub close: usize,
}

impl Pair {
    /// Returns the range strictly between the delimiters.
    pub fn inner_range(&self) -> Range<usize> {
        self.open + 1..self.close
    }

    /// Returns the range including both delimiters.
    pub fn around_range(&self) -> Range<usize> {
        self.open..self.close + 1
    }
}

/// Returns `true` if `b` is a quote, for which the opening and closing delimiters are
/// the same character.
pub fn is_quote(b: u8) -> bool {
    matches!(b, b'"' | b'\'' | b'`')
}

/// Returns `true` if `b` opens a block that warrants additional indentation on the
/// following line.
pub fn is_block_opener(b: u8) -> bool {
    matches!(b, b'(' | b'[' | b'{')
}

/// Returns `true` if `b` closes a block opened by a character recognized by
/// [`is_block_opener`].
pub fn is_block_closer(b: u8) -> bool {
    matches!(b, b')' | b']' | b'}')
}

/// Returns the opening and closing characters for `delim`, which may name either side
/// of a pair, a quote, or one of the aliases `b` for parentheses and `B` for braces.
pub fn pair_of(delim: u8) -> Option<(u8, u8)> {
    match delim {
        b'(' | b')' | b'b' => Some((b'(', b')')),
        b'[' | b']' => Some((b'[', b']')),
        b'{' | b'}' | b'B' => Some((b'{', b'}')),
        b'<' | b'>' => Some((b'<', b'>')),
        q if is_quote(q) => Some((q, q)),
        _ => None,
    }
}

/// Returns the position of the `open` delimiter enclosing `pos`.
///
/// A nesting counter is incremented on every `close` and decremented on every `open`
/// while scanning left, so that nested pairs are skipped. The enclosing delimiter is
/// the one that drives the counter negative. If `pos` is on an `open` delimiter, it
/// is the one returned.
pub fn find_enclosing_open(data: &[u8], pos: usize, open: u8, close: u8) -> Option<usize> {
    if data.get(pos) == Some(&open) {
        return Some(pos);
    }
    let mut depth = 0isize;
    for i in (0..pos.min(data.len())).rev() {
        if data[i] == close {
            depth += 1;
        } else if data[i] == open {
            depth -= 1;
            if depth < 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Returns the position of the `close` delimiter enclosing `pos`, which mirrors
/// [`find_enclosing_open`] by scanning right.
pub fn find_enclosing_close(data: &[u8], pos: usize, open: u8, close: u8) -> Option<usize> {
    if data.get(pos) == Some(&close) {
        return Some(pos);
    }
    let mut depth = 0isize;
    for (i, &b) in data.iter().enumerate().skip(pos + 1) {
        if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth < 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Returns the pair of `delim` characters enclosing `pos`, or `None` if there is no
/// balanced pair.
pub fn find_pair(data: &[u8], pos: usize, delim: u8) -> Option<Pair> {
    let (open, close) = pair_of(delim)?;
    if open == close {
        find_quotes(data, pos, open)
    } else {
        let open_pos = find_enclosing_open(data, pos, open, close)?;
        let close_pos = find_enclosing_close(data, open_pos, open, close)?;
        if close_pos >= pos || data.get(pos) == Some(&close) {
            Some(Pair {
                open: open_pos,
                close: close_pos,
            })
        } else {
            None
        }
    }
}

/// Returns the nearest quotes surrounding `pos`.
///
/// A quote under the cursor is taken as the opening quote when a closing quote
/// follows it, otherwise as the closing quote.
fn find_quotes(data: &[u8], pos: usize, quote: u8) -> Option<Pair> {
    let backward = |from: usize| data[..from.min(data.len())].iter().rposition(|&b| b == quote);
    let forward = |from: usize| {
        data.get(from..)
            .and_then(|tail| tail.iter().position(|&b| b == quote))
            .map(|i| from + i)
    };

    if data.get(pos) == Some(&quote) {
        match forward(pos + 1) {
            Some(close) => Some(Pair { open: pos, close }),
            None => backward(pos).map(|open| Pair { open, close: pos }),
        }
    } else {
        let open = backward(pos)?;
        let close = forward(pos + 1)?;
        Some(Pair { open, close })
    }
}

/// Returns the position of the bracket that pairs with the bracket at `pos`.
pub fn match_pair(data: &[u8], pos: usize) -> Option<usize> {
    let b = *data.get(pos)?;
    let (open, close) = pair_of(b).filter(|_| !is_quote(b) && b != b'b' && b != b'B')?;
    if b == open {
        find_enclosing_close(data, pos, open, close)
    } else {
        find_enclosing_open(data, pos, open, close).filter(|&p| p != pos)
    }
}
