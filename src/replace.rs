//! Interactive search and replace.
//!
//! Replacement proceeds through four stages. It starts [`Inactive`](Stage::Inactive),
//! then collects the [`Pattern`](Stage::Pattern) while matches are highlighted as it
//! is typed, then collects the [`Replacement`](Stage::Replacement), and finally asks
//! for [`Confirm`](Stage::Confirm)ation of each match in turn. Once every match has
//! been visited, or the process is aborted, it returns to the inactive stage.
//!
//! Matching is confined to a range of the document, normally the selection that was
//! active when replacement started.

use crate::cursor::CursorSet;
use crate::document::Document;
use crate::edit;
use crate::search::{self, Match};
use std::collections::VecDeque;
use std::ops::Range;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum Stage {
    #[default]
    Inactive,
    Pattern,
    Replacement,
    Confirm,
}

impl Stage {
    /// Returns the ordinal of this stage, from `0` to `3`.
    pub fn number(&self) -> u8 {
        match self {
            Stage::Inactive => 0,
            Stage::Pattern => 1,
            Stage::Replacement => 2,
            Stage::Confirm => 3,
        }
    }
}

/// The result of answering a confirmation.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Step {
    /// The next match awaiting confirmation.
    Next(Match),

    /// Every match was visited, of which `replaced` were replaced.
    Done { replaced: usize },
}

#[derive(Default)]
pub struct Replace {
    stage: Stage,
    range: Range<usize>,
    pattern: String,
    replacement: String,
    case_strict: bool,

    /// Matches not yet visited, the first of which is awaiting confirmation.
    pending: VecDeque<Match>,
    replaced: usize,
}

impl Replace {
    pub fn new() -> Replace {
        Replace::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_active(&self) -> bool {
        self.stage != Stage::Inactive
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Begins collecting the pattern, confining every match to `range`.
    pub fn start(&mut self, range: Range<usize>, case_strict: bool) {
        *self = Replace {
            stage: Stage::Pattern,
            range,
            case_strict,
            ..Replace::default()
        };
    }

    /// Returns the matches of `pattern` inside the range, which serve as highlights
    /// while the pattern is being typed.
    pub fn preview(&self, doc: &Document, pattern: &str) -> Vec<Match> {
        search::using_term(pattern, self.case_strict).find_in(doc.data(), self.range.clone())
    }

    /// Accepts `pattern` and begins collecting the replacement.
    ///
    /// An empty pattern aborts.
    pub fn set_pattern(&mut self, pattern: &str) {
        if self.stage == Stage::Pattern {
            if pattern.is_empty() {
                self.abort();
            } else {
                self.pattern = pattern.to_string();
                self.stage = Stage::Replacement;
            }
        }
    }

    /// Accepts `replacement` and computes the matches to be confirmed, returning the
    /// first of them, or `None` if there are no matches, in which case replacement
    /// becomes inactive.
    pub fn set_replacement(&mut self, doc: &Document, replacement: &str) -> Option<Match> {
        if self.stage != Stage::Replacement {
            return None;
        }
        self.replacement = replacement.to_string();
        self.pending = self.preview(doc, &self.pattern).into();
        match self.pending.front() {
            Some(&m) => {
                self.stage = Stage::Confirm;
                Some(m)
            }
            None => {
                self.abort();
                None
            }
        }
    }

    /// Returns the match awaiting confirmation.
    pub fn current(&self) -> Option<Match> {
        if self.stage == Stage::Confirm {
            self.pending.front().copied()
        } else {
            None
        }
    }

    /// Returns every match not yet visited.
    pub fn pending(&self) -> impl Iterator<Item = &Match> {
        self.pending.iter()
    }

    /// Replaces the current match and advances.
    ///
    /// Every match not yet visited is moved by the difference in length between the
    /// replacement and the match it replaced, as is the end of the range.
    pub fn confirm(&mut self, doc: &mut Document, cursors: &mut CursorSet) -> Option<Step> {
        let m = self.current()?;
        self.pending.pop_front();
        edit::replace_range(doc, cursors, m.0, m.1, self.replacement.as_bytes());
        let delta = self.replacement.len() as isize - m.len() as isize;
        for p in self.pending.iter_mut() {
            *p = p.shift(delta);
        }
        self.range.end = self.range.end.saturating_add_signed(delta);
        self.replaced += 1;
        Some(self.advance())
    }

    /// Leaves the current match untouched and advances.
    pub fn skip(&mut self) -> Option<Step> {
        self.current()?;
        self.pending.pop_front();
        Some(self.advance())
    }

    /// Discards the remaining matches and becomes inactive.
    pub fn abort(&mut self) {
        self.stage = Stage::Inactive;
        self.pending.clear();
    }

    fn advance(&mut self) -> Step {
        match self.pending.front() {
            Some(&m) => Step::Next(m),
            None => {
                let replaced = self.replaced;
                self.abort();
                Step::Done { replaced }
            }
        }
    }
}
