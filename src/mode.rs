//! Editing modes.

use crate::cursor::CursorStyle;
use std::fmt::{self, Display, Formatter};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
    Visual,
    VisualLine,
    VisualBlock,
    /// Typing on the command line.
    Command,
    /// Editing the command line with the keys of [`Normal`](Mode::Normal) mode.
    CommandNormal,
}

impl Mode {
    pub fn is_visual(&self) -> bool {
        matches!(self, Mode::Visual | Mode::VisualLine | Mode::VisualBlock)
    }

    /// Returns `true` if input is directed at the command line.
    pub fn is_command(&self) -> bool {
        matches!(self, Mode::Command | Mode::CommandNormal)
    }

    /// Returns `true` if the cursor may rest after the last character of a line.
    pub fn is_inserting(&self) -> bool {
        matches!(self, Mode::Insert | Mode::Command)
    }

    pub fn cursor_style(&self) -> CursorStyle {
        match self {
            Mode::Insert | Mode::Command => CursorStyle::Bar,
            _ => CursorStyle::Block,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Insert => "INSERT",
            Mode::Visual => "VISUAL",
            Mode::VisualLine => "VISUAL LINE",
            Mode::VisualBlock => "VISUAL BLOCK",
            Mode::Command => "COMMAND",
            Mode::CommandNormal => "COMMAND NORMAL",
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
