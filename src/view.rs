//! A snapshot of editor state for rendering.
//!
//! The editor never draws anything itself. Instead, [`Editor::frame`] describes a
//! range of lines together with the cursors and highlights that fall on them, and
//! leaves the drawing to whatever sits in front of the editor.
//!
//! [`Editor::frame`]: crate::editor::Editor::frame

use crate::cursor::CursorStyle;
use crate::mode::Mode;
use std::ops::Range;

/// What a highlighted range represents.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum HighlightKind {
    Selection,
    Match,

    /// The match the cursor is on during find, or the match awaiting confirmation
    /// during replace.
    CurrentMatch,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Highlight {
    pub kind: HighlightKind,
    pub range: Range<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineView {
    pub line: usize,

    /// Byte offset of the first character of the line.
    pub start: usize,

    /// Text of the line without its line break, with malformed sequences replaced.
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CursorView {
    pub pos: usize,
    pub line: usize,
    pub col: usize,
    pub style: CursorStyle,
    pub blink: bool,
    pub primary: bool,
}

#[derive(Clone, Debug)]
pub struct Frame {
    pub mode: Mode,
    pub lines: Vec<LineView>,
    pub cursors: Vec<CursorView>,
    pub highlights: Vec<Highlight>,

    /// Label and contents of the command line, if it is in use.
    pub prompt: Option<String>,

    /// Status message left by the last key.
    pub message: Option<String>,

    /// Indicates that the document has changes not yet written.
    pub modified: bool,
}

impl Frame {
    /// Returns the highlights of `kind`.
    pub fn highlights_of(&self, kind: HighlightKind) -> Vec<Range<usize>> {
        self.highlights
            .iter()
            .filter(|h| h.kind == kind)
            .map(|h| h.range.clone())
            .collect()
    }

    /// Returns the status line, which names the mode unless the command line is in
    /// use. Unwritten changes are marked with `[+]`.
    pub fn status(&self) -> String {
        let marker = if self.modified { " [+]" } else { "" };
        match (&self.prompt, &self.message) {
            (Some(prompt), _) => prompt.clone(),
            (None, Some(message)) => format!("-- {} --{marker} {message}", self.mode),
            (None, None) => format!("-- {} --{marker}", self.mode),
        }
    }
}
