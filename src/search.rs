//! Text searching.

use crate::error::{Error, Result};
use regex_lite::{Regex, RegexBuilder};
use std::cmp;
use std::ops::Range;

/// Defines an interface for a pattern-matching algorithm.
pub trait Pattern {
    /// Returns the pattern.
    fn pattern(&self) -> &str;

    /// Returns every non-overlapping match inside `range` of `text`, ordered by
    /// position, where positions are relative to the start of `text`.
    ///
    /// Empty matches are never reported.
    fn find_in(&self, text: &[u8], range: Range<usize>) -> Vec<Match>;

    /// Equivalent to [`find_in`](Self::find_in) over the whole of `text`.
    fn find_all(&self, text: &[u8]) -> Vec<Match> {
        self.find_in(text, 0..text.len())
    }
}

/// Represents a pattern match, where the first value is the _starting_ position and
/// the second value is the _ending_ position, exclusive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Match(pub usize, pub usize);

impl Match {
    pub fn range(&self) -> Range<usize> {
        self.0..self.1
    }

    pub fn len(&self) -> usize {
        self.1 - self.0
    }

    /// Returns this match moved by `delta` bytes.
    pub fn shift(&self, delta: isize) -> Match {
        Match(
            self.0.saturating_add_signed(delta),
            self.1.saturating_add_signed(delta),
        )
    }
}

/// Returns a pattern-matching algorithm using `term` as the search string, and
/// `case_strict` to indicate the sensitivity of case when searching.
pub fn using_term(term: &str, case_strict: bool) -> Box<dyn Pattern> {
    Box::new(TermPattern::new(term, case_strict))
}

/// Returns a pattern-matching algorithm using `regex` as the regular expression.
pub fn using_regex(regex: Regex) -> Box<dyn Pattern> {
    Box::new(RegexPattern::new(regex))
}

/// Compiles `pattern` into a regular expression that honors `case_strict`.
pub fn compile_regex(pattern: &str, case_strict: bool) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(!case_strict)
        .build()
        .map_err(|e| Error::invalid_regex(pattern, &e))
}

/// Returns every non-overlapping occurrence of `pattern` in `text` by exact
/// comparison of bytes.
pub fn find_all_occurrences(text: &[u8], pattern: &[u8]) -> Vec<Match> {
    let table = bad_char_table(pattern, true);
    boyer_moore(text, pattern, &table, true, 0)
}

/// Returns the index of the match in `matches` whose start is closest to `pos`.
///
/// When two matches are equally distant, the one after `pos` is chosen.
pub fn nearest_match(pos: usize, matches: &[Match]) -> Option<usize> {
    matches
        .iter()
        .enumerate()
        .min_by_key(|(_, m)| (m.0.abs_diff(pos), m.0 < pos))
        .map(|(i, _)| i)
}

/// Returns the index of the first match starting after `pos` when `forward` is
/// `true`, or the last match starting before `pos` otherwise, wrapping around the
/// ends of `matches`.
pub fn next_match(pos: usize, matches: &[Match], forward: bool) -> Option<usize> {
    if matches.is_empty() {
        None
    } else if forward {
        Some(matches.iter().position(|m| m.0 > pos).unwrap_or(0))
    } else {
        Some(
            matches
                .iter()
                .rposition(|m| m.0 < pos)
                .unwrap_or(matches.len() - 1),
        )
    }
}

/// Maps every byte to the rightmost position at which it occurs in `pattern`, or
/// `-1` when absent.
fn bad_char_table(pattern: &[u8], case_strict: bool) -> [isize; 256] {
    let mut table = [-1; 256];
    for (i, &b) in pattern.iter().enumerate() {
        table[fold(b, case_strict) as usize] = i as isize;
    }
    table
}

#[inline(always)]
fn fold(b: u8, case_strict: bool) -> u8 {
    if case_strict {
        b
    } else {
        b.to_ascii_lowercase()
    }
}

/// Searches `text` for `pattern` using the bad character rule of the Boyer-Moore
/// algorithm, reporting positions offset by `base`.
///
/// After a full match, the search resumes at the end of the match, so matches never
/// overlap. After a mismatch of byte `c` at pattern index `j`, the pattern shifts by
/// `j - last(c)`, but always by at least `1`.
fn boyer_moore(
    text: &[u8],
    pattern: &[u8],
    table: &[isize; 256],
    case_strict: bool,
    base: usize,
) -> Vec<Match> {
    let (n, m) = (text.len(), pattern.len());
    let mut matches = Vec::new();
    if m == 0 || m > n {
        return matches;
    }

    let mut s = 0;
    while s <= n - m {
        let mut j = m;
        while j > 0 && fold(pattern[j - 1], case_strict) == fold(text[s + j - 1], case_strict) {
            j -= 1;
        }
        if j == 0 {
            matches.push(Match(base + s, base + s + m));
            s += m;
        } else {
            let c = fold(text[s + j - 1], case_strict);
            let shift = (j - 1) as isize - table[c as usize];
            s += cmp::max(1, shift) as usize;
        }
    }
    matches
}

/// A term-oriented pattern-matching algorithm implemented using the Boyer-Moore
/// algorithm with only the bad character rule.
struct TermPattern {
    /// The term provided during construction.
    term: String,

    /// Bad character shift table maps bytes in `term` to their rightmost position.
    bc_shift: [isize; 256],

    /// Indicates the sensitivity of case, which only applies to ASCII letters.
    case_strict: bool,
}

impl TermPattern {
    fn new(term: &str, case_strict: bool) -> TermPattern {
        TermPattern {
            term: term.to_string(),
            bc_shift: bad_char_table(term.as_bytes(), case_strict),
            case_strict,
        }
    }
}

impl Pattern for TermPattern {
    fn pattern(&self) -> &str {
        &self.term
    }

    fn find_in(&self, text: &[u8], range: Range<usize>) -> Vec<Match> {
        let end = cmp::min(range.end, text.len());
        let start = cmp::min(range.start, end);
        boyer_moore(
            &text[start..end],
            self.term.as_bytes(),
            &self.bc_shift,
            self.case_strict,
            start,
        )
    }
}

/// A regex-oriented pattern-matching algorithm.
///
/// Only well-formed UTF-8 is searched, so a match never spans a malformed sequence.
struct RegexPattern {
    regex: Regex,
}

impl RegexPattern {
    fn new(regex: Regex) -> RegexPattern {
        RegexPattern { regex }
    }
}

impl Pattern for RegexPattern {
    fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    fn find_in(&self, text: &[u8], range: Range<usize>) -> Vec<Match> {
        let end = cmp::min(range.end, text.len());
        let start = cmp::min(range.start, end);
        let mut matches = Vec::new();
        let mut offset = start;
        for chunk in text[start..end].utf8_chunks() {
            let valid = chunk.valid();
            matches.extend(
                self.regex
                    .find_iter(valid)
                    .filter(|m| !m.is_empty())
                    .map(|m| Match(offset + m.start(), offset + m.end())),
            );
            offset += valid.len() + chunk.invalid().len();
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &[u8] = b"The quick brown fox jumps over the lazy dog";

    #[test]
    fn occurrences_do_not_overlap() {
        assert_eq!(
            find_all_occurrences(b"aaaa", b"aa"),
            vec![Match(0, 2), Match(2, 4)]
        );
        assert_eq!(
            find_all_occurrences(b"aaa", b"aa"),
            vec![Match(0, 2)]
        );
    }

    #[test]
    fn occurrences_of_empty_or_long_pattern() {
        assert!(find_all_occurrences(TEXT, b"").is_empty());
        assert!(find_all_occurrences(b"ab", b"abc").is_empty());
        assert!(find_all_occurrences(b"", b"a").is_empty());
    }

    #[test]
    fn occurrences_after_mismatch_shift() {
        let text = b"abcabdabcabd";
        assert_eq!(
            find_all_occurrences(text, b"abd"),
            vec![Match(3, 6), Match(9, 12)]
        );
        assert_eq!(find_all_occurrences(text, b"cab"), vec![Match(2, 5), Match(8, 11)]);
    }

    #[test]
    fn search_term_normal() {
        let pattern = TermPattern::new("BrOwN FoX", false);
        assert_eq!(pattern.find_all(TEXT), vec![Match(10, 19)]);
    }

    #[test]
    fn search_term_case() {
        let pattern = TermPattern::new("the", true);
        assert_eq!(pattern.find_all(TEXT), vec![Match(31, 34)]);
        let pattern = TermPattern::new("the", false);
        assert_eq!(pattern.find_all(TEXT), vec![Match(0, 3), Match(31, 34)]);
    }

    #[test]
    fn search_term_not_found() {
        let pattern = TermPattern::new("jumpz", false);
        assert!(pattern.find_all(TEXT).is_empty());
    }

    #[test]
    fn search_term_in_range() {
        let pattern = TermPattern::new("o", true);
        let matches = pattern.find_in(TEXT, 12..27);
        assert_eq!(matches, vec![Match(12, 13), Match(17, 18), Match(26, 27)]);
    }

    #[test]
    fn search_term_multibyte() {
        let text = "größe größer".as_bytes();
        let pattern = TermPattern::new("öß", true);
        assert_eq!(pattern.find_all(text), vec![Match(2, 6), Match(10, 14)]);
    }

    #[test]
    fn search_regex() {
        let pattern = RegexPattern::new(compile_regex("qu[A-Z]+\\s*.+wN", false).unwrap());
        assert_eq!(pattern.find_all(TEXT), vec![Match(4, 15)]);

        let pattern = RegexPattern::new(compile_regex("o[a-z]", true).unwrap());
        assert_eq!(
            pattern.find_all(TEXT),
            vec![Match(12, 14), Match(17, 19), Match(26, 28), Match(41, 43)]
        );
    }

    #[test]
    fn search_regex_drops_empty_matches() {
        let pattern = RegexPattern::new(compile_regex("x*", true).unwrap());
        assert_eq!(pattern.find_all(b"axxb"), vec![Match(1, 3)]);
    }

    #[test]
    fn search_regex_across_malformed_bytes() {
        let text = b"ab\xffab";
        let pattern = RegexPattern::new(compile_regex("ab", true).unwrap());
        assert_eq!(pattern.find_all(text), vec![Match(0, 2), Match(3, 5)]);
    }

    #[test]
    fn invalid_regex() {
        assert!(compile_regex("(ab", true).is_err());
    }

    #[test]
    fn nearest_prefers_following_match() {
        let matches = vec![Match(2, 4), Match(10, 12), Match(18, 20)];
        assert_eq!(nearest_match(6, &matches), Some(1));
        assert_eq!(nearest_match(14, &matches), Some(2));
        assert_eq!(nearest_match(9, &matches), Some(1));
        assert_eq!(nearest_match(0, &[]), None);
    }

    #[test]
    fn next_and_previous_wrap() {
        let matches = vec![Match(2, 4), Match(10, 12)];
        assert_eq!(next_match(2, &matches, true), Some(1));
        assert_eq!(next_match(10, &matches, true), Some(0));
        assert_eq!(next_match(10, &matches, false), Some(0));
        assert_eq!(next_match(2, &matches, false), Some(1));
    }
}
