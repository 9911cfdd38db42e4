//! Keys and their textual notation.
//!
//! Keys are written in a notation borrowed from Vim, where printable characters stand
//! for themselves and everything else is named inside angle brackets, e.g.
//! `dd<esc>ihello<ret>`. Names are case-insensitive. A literal `<` is written as
//! `<lt>`, and control keys are written as `<c-v>`.
//!
//! Literal line breaks in notation are ignored, so that long sequences can be split
//! across lines of a file.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

/// The set of keys recognized by the editor.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Key {
    Char(char),
    Control(char),
    Esc,
    Enter,
    Tab,
    Backspace,
    Delete,
    Up(Ctrl),
    Down(Ctrl),
    Left(Ctrl),
    Right(Ctrl),
    Home,
    End,
}

/// Represents the state of the _CONTROL_ key for arrow keys.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Ctrl {
    Off,
    On,
}

/// Map of key names to [`Key`]s.
pub type KeyMap = HashMap<&'static str, Key>;

/// Returns a mapping of key names to keys.
pub fn init_key_map() -> KeyMap {
    let mut key_map = KeyMap::new();
    for (name, key) in KEY_MAPPINGS {
        key_map.insert(name, key);
    }
    for c in 'a'..='z' {
        key_map.insert(CONTROL_NAMES[(c as u8 - b'a') as usize], Key::Control(c));
    }
    key_map
}

const KEY_MAPPINGS: [(&str, Key); 21] = [
    ("esc", Key::Esc),
    ("ret", Key::Enter),
    ("cr", Key::Enter),
    ("enter", Key::Enter),
    ("tab", Key::Tab),
    ("bs", Key::Backspace),
    ("del", Key::Delete),
    ("lt", Key::Char('<')),
    ("gt", Key::Char('>')),
    ("space", Key::Char(' ')),
    ("up", Key::Up(Ctrl::Off)),
    ("down", Key::Down(Ctrl::Off)),
    ("left", Key::Left(Ctrl::Off)),
    ("right", Key::Right(Ctrl::Off)),
    ("c-up", Key::Up(Ctrl::On)),
    ("c-down", Key::Down(Ctrl::On)),
    ("c-left", Key::Left(Ctrl::On)),
    ("c-right", Key::Right(Ctrl::On)),
    ("home", Key::Home),
    ("end", Key::End),
    ("c-[", Key::Esc),
];

const CONTROL_NAMES: [&str; 26] = [
    "c-a", "c-b", "c-c", "c-d", "c-e", "c-f", "c-g", "c-h", "c-i", "c-j", "c-k", "c-l", "c-m",
    "c-n", "c-o", "c-p", "c-q", "c-r", "c-s", "c-t", "c-u", "c-v", "c-w", "c-x", "c-y", "c-z",
];

/// Parses `notation` into a sequence of keys.
///
/// # Errors
///
/// Returns an [`Err`] if a bracketed name is unknown or unterminated.
pub fn parse_keys(notation: &str) -> Result<Vec<Key>> {
    let key_map = init_key_map();
    let mut keys = Vec::new();
    let mut chars = notation.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\n' | '\r' => (),
            '<' => {
                let rest = &notation[i + 1..];
                let end = rest
                    .find('>')
                    .ok_or_else(|| Error::invalid_key(&notation[i..]))?;
                let name = rest[..end].to_ascii_lowercase();
                let key = key_map
                    .get(name.as_str())
                    .copied()
                    .ok_or_else(|| Error::invalid_key(&format!("<{name}>")))?;
                keys.push(key);
                for _ in 0..=rest[..end].chars().count() {
                    chars.next();
                }
            }
            c => keys.push(Key::Char(c)),
        }
    }
    Ok(keys)
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fn ctrl(on: &Ctrl) -> &'static str {
            if *on == Ctrl::On { "c-" } else { "" }
        }

        match self {
            Key::Char('<') => write!(f, "<lt>"),
            Key::Char(' ') => write!(f, "<space>"),
            Key::Char(c) => write!(f, "{c}"),
            Key::Control(c) => write!(f, "<c-{c}>"),
            Key::Esc => write!(f, "<esc>"),
            Key::Enter => write!(f, "<ret>"),
            Key::Tab => write!(f, "<tab>"),
            Key::Backspace => write!(f, "<bs>"),
            Key::Delete => write!(f, "<del>"),
            Key::Up(c) => write!(f, "<{}up>", ctrl(c)),
            Key::Down(c) => write!(f, "<{}down>", ctrl(c)),
            Key::Left(c) => write!(f, "<{}left>", ctrl(c)),
            Key::Right(c) => write!(f, "<{}right>", ctrl(c)),
            Key::Home => write!(f, "<home>"),
            Key::End => write!(f, "<end>"),
        }
    }
}

/// Wrapper used only for formatting [`Key`] sequences.
pub struct KeySeq<'a>(pub &'a [Key]);

impl Display for KeySeq<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for key in self.0 {
            write!(f, "{key}")?;
        }
        Ok(())
    }
}
