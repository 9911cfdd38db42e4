//! Key bindings.
//!
//! Every mode that interprets keys as commands has its own [`Vocabulary`], which maps
//! key sequences to [`Command`]s and keeps the set of proper prefixes of those
//! sequences. Keys accumulate in a pending sequence until it either matches a
//! binding, which fires, or is no longer the prefix of any binding, in which case
//! it is discarded.
//!
//! Beyond named operations, commands are built by composing motions and text objects
//! with the `d` and `c` operators, so that `dw`, `c$` and `di(` need not be listed
//! individually.

use crate::error::{Error, Result};
use crate::key::{self, Key};
use crate::mode::Mode;
use crate::nav::{Motion, TextObject};
use crate::op::{self, OpFn, OpMap};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

/// An operator that acts on the text spanned by a motion or text object.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Operator {
    Delete,
    Change,
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Delete => write!(f, "delete"),
            Operator::Change => write!(f, "change"),
        }
    }
}

/// The action bound to a key sequence.
#[derive(Copy, Clone)]
pub enum Command {
    /// A named editing operation.
    Op(&'static str, OpFn),

    /// Moves every cursor, or extends every selection in visual modes.
    Motion(Motion),

    /// Applies an operator to the text between each cursor and the target of a
    /// motion.
    Operator(Operator, Motion),

    /// Applies an operator to the text object around each cursor.
    Object(Operator, TextObject),

    /// Selects the text object around each cursor.
    Select(TextObject),
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Command::Op(name, _) => write!(f, "{name}"),
            Command::Motion(motion) => write!(f, "{motion}"),
            Command::Operator(op, motion) => write!(f, "{op} {motion}"),
            Command::Object(op, obj) => write!(f, "{op} {obj}"),
            Command::Select(obj) => write!(f, "select {obj}"),
        }
    }
}

/// Map of [`Key`] sequences to commands.
type BindMap = IndexMap<Vec<Key>, Command>;

/// Set of [`Key`] sequence prefixes.
type Prefixes = HashSet<Vec<Key>>;

/// The key sequences recognized in a single mode.
#[derive(Default)]
pub struct Vocabulary {
    bind_map: BindMap,
    bind_prefixes: Prefixes,
}

impl Vocabulary {
    /// Binds `keys` to `command`, replacing any existing binding of `keys`.
    pub fn insert(&mut self, keys: Vec<Key>, command: Command) {
        for n in 1..keys.len() {
            self.bind_prefixes.insert(keys[0..n].to_vec());
        }
        self.bind_map.insert(keys, command);
    }

    /// Returns the command bound to `keys`, otherwise `None`.
    pub fn find(&self, keys: &[Key]) -> Option<&Command> {
        self.bind_map.get(keys)
    }

    /// Returns `true` if `keys` is a proper prefix of at least one bound sequence.
    pub fn is_prefix(&self, keys: &[Key]) -> bool {
        self.bind_prefixes.contains(keys)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Vec<Key>, &Command)> {
        self.bind_map.iter()
    }

    pub fn len(&self) -> usize {
        self.bind_map.len()
    }
}

/// The vocabularies of every mode that interprets keys as commands.
pub struct Bindings {
    op_map: OpMap,
    normal: Vocabulary,
    visual: Vocabulary,
    command_normal: Vocabulary,
}

impl Bindings {
    /// Creates the default key bindings.
    pub fn new() -> Bindings {
        let mut this = Bindings {
            op_map: op::init_op_map(),
            normal: Vocabulary::default(),
            visual: Vocabulary::default(),
            command_normal: Vocabulary::default(),
        };

        for (key_seq, op) in Self::NORMAL_BINDINGS {
            this.bind(key_seq, op).unwrap_or_else(|e| panic!("{e}"));
        }
        for (key_seq, op) in Self::VISUAL_BINDINGS {
            let (keys, command) = this.resolve(key_seq, op).unwrap_or_else(|e| panic!("{e}"));
            this.visual.insert(keys, command);
        }
        for (key_seq, op) in Self::COMMAND_NORMAL_BINDINGS {
            let (keys, command) = this.resolve(key_seq, op).unwrap_or_else(|e| panic!("{e}"));
            this.command_normal.insert(keys, command);
        }

        for (key_seq, motion) in Self::MOTIONS {
            let keys = key::parse_keys(key_seq).unwrap_or_else(|e| panic!("{e}"));
            for vocab in [&mut this.normal, &mut this.command_normal] {
                vocab.insert(keys.clone(), Command::Motion(motion));
                for (c, op) in [('d', Operator::Delete), ('c', Operator::Change)] {
                    vocab.insert(prefixed(c, &keys), Command::Operator(op, motion));
                }
            }
            this.visual.insert(keys, Command::Motion(motion));
        }

        for (keys, obj) in text_objects() {
            for vocab in [&mut this.normal, &mut this.command_normal] {
                for (c, op) in [('d', Operator::Delete), ('c', Operator::Change)] {
                    vocab.insert(prefixed(c, &keys), Command::Object(op, obj));
                }
            }
            this.visual.insert(keys, Command::Select(obj));
        }
        this
    }

    /// Binds the key sequence `key_seq` to the editing operation `op` in normal mode.
    ///
    /// A successful bind will override an existing binding with an identical key
    /// sequence.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if either of `key_seq` or `op` do not match the notation of
    /// keys or the name of an editing operation, respectively.
    pub fn bind(&mut self, key_seq: &str, op: &str) -> Result<()> {
        let (keys, command) = self.resolve(key_seq, op)?;
        self.normal.insert(keys, command);
        Ok(())
    }

    fn resolve(&self, key_seq: &str, op: &str) -> Result<(Vec<Key>, Command)> {
        let keys = key::parse_keys(key_seq)?;
        if keys.is_empty()
            || keys
                .iter()
                .any(|key| matches!(key, Key::Char(c) if c.is_control()))
        {
            return Err(Error::invalid_key(key_seq));
        }
        self.op_map
            .get_key_value(op)
            .map(|(&name, &op_fn)| (keys, Command::Op(name, op_fn)))
            .ok_or_else(|| Error::invalid_op(op))
    }

    /// Returns the vocabulary of `mode`, or `None` for modes in which keys are
    /// inserted as text.
    pub fn vocabulary(&self, mode: Mode) -> Option<&Vocabulary> {
        match mode {
            Mode::Normal => Some(&self.normal),
            Mode::Visual | Mode::VisualLine | Mode::VisualBlock => Some(&self.visual),
            Mode::CommandNormal => Some(&self.command_normal),
            Mode::Insert | Mode::Command => None,
        }
    }

    /// Returns the names of every editing operation.
    pub fn op_names(&self) -> impl Iterator<Item = &&'static str> {
        self.op_map.keys()
    }

    /// Default mapping of keys to editing operations in normal mode.
    const NORMAL_BINDINGS: [(&'static str, &'static str); 27] = [
        // --- insertion ---
        ("i", "insert"),
        ("a", "append"),
        ("I", "insert-line-start"),
        ("A", "append-line-end"),
        ("o", "open-below"),
        ("O", "open-above"),
        // --- removal and change ---
        ("x", "delete-char"),
        ("<del>", "delete-char"),
        ("X", "delete-char-before"),
        ("s", "substitute-char"),
        ("dd", "delete-line"),
        ("cc", "change-line"),
        ("S", "change-line"),
        ("D", "delete-to-end"),
        ("C", "change-to-end"),
        ("J", "join-lines"),
        // --- modes ---
        ("v", "visual"),
        ("V", "visual-line"),
        ("<c-v>", "visual-block"),
        (":", "command"),
        ("/", "search"),
        // --- search ---
        ("n", "next-match"),
        ("N", "prev-match"),
        // --- cursors ---
        ("<c-up>", "add-cursor-above"),
        ("<c-down>", "add-cursor-below"),
        // --- files ---
        ("ZZ", "save-and-quit"),
        ("ZQ", "quit"),
    ];

    /// Default mapping of keys to editing operations in visual modes.
    const VISUAL_BINDINGS: [(&'static str, &'static str); 15] = [
        ("d", "delete-selection"),
        ("x", "delete-selection"),
        ("<del>", "delete-selection"),
        ("c", "change-selection"),
        ("s", "change-selection"),
        ("o", "swap-anchor"),
        ("I", "block-insert"),
        ("A", "block-append"),
        ("v", "visual"),
        ("V", "visual-line"),
        ("<c-v>", "visual-block"),
        (":", "command"),
        ("/", "search"),
        ("<c-up>", "add-cursor-above"),
        ("<c-down>", "add-cursor-below"),
    ];

    /// Default mapping of keys to editing operations when editing the command line.
    const COMMAND_NORMAL_BINDINGS: [(&'static str, &'static str); 12] = [
        ("i", "insert"),
        ("a", "append"),
        ("I", "insert-line-start"),
        ("A", "append-line-end"),
        ("x", "delete-char"),
        ("<del>", "delete-char"),
        ("X", "delete-char-before"),
        ("s", "substitute-char"),
        ("dd", "delete-line"),
        ("cc", "change-line"),
        ("D", "delete-to-end"),
        ("C", "change-to-end"),
    ];

    /// Motions shared by every vocabulary, which also combine with operators.
    const MOTIONS: [(&'static str, Motion); 24] = [
        ("h", Motion::Left),
        ("<left>", Motion::Left),
        ("l", Motion::Right),
        ("<right>", Motion::Right),
        ("k", Motion::Up),
        ("<up>", Motion::Up),
        ("j", Motion::Down),
        ("<down>", Motion::Down),
        ("w", Motion::WordStartForward(false)),
        ("W", Motion::WordStartForward(true)),
        ("b", Motion::WordStartBackward(false)),
        ("B", Motion::WordStartBackward(true)),
        ("e", Motion::WordEndForward(false)),
        ("E", Motion::WordEndForward(true)),
        ("0", Motion::LineStart),
        ("<home>", Motion::LineStart),
        ("^", Motion::FirstNonBlank),
        ("$", Motion::LineEnd),
        ("<end>", Motion::LineEnd),
        ("}", Motion::ParagraphForward),
        ("{", Motion::ParagraphBackward),
        ("gg", Motion::Top),
        ("G", Motion::Bottom),
        ("%", Motion::MatchPair),
    ];
}

impl Default for Bindings {
    fn default() -> Bindings {
        Bindings::new()
    }
}

fn prefixed(c: char, keys: &[Key]) -> Vec<Key> {
    let mut seq = vec![Key::Char(c)];
    seq.extend_from_slice(keys);
    seq
}

/// Delimiters that name a delimited text object, each paired with the delimiter
/// whose pair it selects.
const DELIMITERS: [(char, u8); 13] = [
    ('(', b'('),
    (')', b'('),
    ('b', b'('),
    ('[', b'['),
    (']', b'['),
    ('{', b'{'),
    ('}', b'{'),
    ('B', b'{'),
    ('<', b'<'),
    ('>', b'<'),
    ('"', b'"'),
    ('\'', b'\''),
    ('`', b'`'),
];

/// Returns the key sequences of every text object, such as `iw` and `a(`.
fn text_objects() -> Vec<(Vec<Key>, TextObject)> {
    let mut objects = Vec::new();
    for (c, around) in [('i', false), ('a', true)] {
        let mut add = |name: char, obj: TextObject| {
            objects.push((vec![Key::Char(c), Key::Char(name)], obj));
        };
        add('w', TextObject::Word { big: false, around });
        add('W', TextObject::Word { big: true, around });
        add('p', TextObject::Paragraph { around });
        for (name, delim) in DELIMITERS {
            add(name, TextObject::Delimited { delim, around });
        }
    }
    objects
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(notation: &str) -> Vec<Key> {
        key::parse_keys(notation).unwrap()
    }

    #[test]
    fn exact_and_prefix() {
        let bindings = Bindings::new();
        let normal = bindings.vocabulary(Mode::Normal).unwrap();
        assert!(normal.find(&keys("d")).is_none());
        assert!(normal.is_prefix(&keys("d")));
        assert!(normal.is_prefix(&keys("di")));
        assert!(!normal.is_prefix(&keys("dd")));
        assert!(!normal.is_prefix(&keys("z")));
        assert!(matches!(
            normal.find(&keys("dd")),
            Some(Command::Op("delete-line", _))
        ));
    }

    #[test]
    fn operators_compose_with_motions_and_objects() {
        let bindings = Bindings::new();
        let normal = bindings.vocabulary(Mode::Normal).unwrap();
        assert!(matches!(
            normal.find(&keys("dw")),
            Some(Command::Operator(
                Operator::Delete,
                Motion::WordStartForward(false)
            ))
        ));
        assert!(matches!(
            normal.find(&keys("c$")),
            Some(Command::Operator(Operator::Change, Motion::LineEnd))
        ));
        assert!(matches!(
            normal.find(&keys("dgg")),
            Some(Command::Operator(Operator::Delete, Motion::Top))
        ));
        assert!(matches!(
            normal.find(&keys("ci<lt>")),
            Some(Command::Object(
                Operator::Change,
                TextObject::Delimited {
                    delim: b'<',
                    around: false
                }
            ))
        ));
        assert!(matches!(
            normal.find(&keys("daB")),
            Some(Command::Object(
                Operator::Delete,
                TextObject::Delimited {
                    delim: b'{',
                    around: true
                }
            ))
        ));
    }

    #[test]
    fn visual_selects_objects() {
        let bindings = Bindings::new();
        let visual = bindings.vocabulary(Mode::VisualLine).unwrap();
        assert!(visual.is_prefix(&keys("i")));
        assert!(visual.find(&keys("i")).is_none());
        assert!(matches!(
            visual.find(&keys("ip")),
            Some(Command::Select(TextObject::Paragraph { around: false }))
        ));
        assert!(matches!(
            visual.find(&keys("c")),
            Some(Command::Op("change-selection", _))
        ));
    }

    #[test]
    fn insert_modes_have_no_vocabulary() {
        let bindings = Bindings::new();
        assert!(bindings.vocabulary(Mode::Insert).is_none());
        assert!(bindings.vocabulary(Mode::Command).is_none());
        let command_normal = bindings.vocabulary(Mode::CommandNormal).unwrap();
        assert!(command_normal.find(&keys(":")).is_none());
        assert!(command_normal.find(&keys("x")).is_some());
    }

    #[test]
    fn bind_overrides_and_extends() {
        let mut bindings = Bindings::new();
        bindings.bind("x", "delete-line").unwrap();
        bindings.bind("<c-s>w", "save").unwrap();
        let normal = bindings.vocabulary(Mode::Normal).unwrap();
        assert!(matches!(
            normal.find(&keys("x")),
            Some(Command::Op("delete-line", _))
        ));
        assert!(normal.is_prefix(&keys("<c-s>")));
    }

    #[test]
    fn bind_errors() {
        let mut bindings = Bindings::new();
        assert!(matches!(
            bindings.bind("q", "no-such-op"),
            Err(Error::InvalidOp { .. })
        ));
        assert!(matches!(
            bindings.bind("<nope>", "save"),
            Err(Error::InvalidKey { .. })
        ));
        assert!(matches!(
            bindings.bind("a\u{7}", "save"),
            Err(Error::InvalidKey { .. })
        ));
        assert!(matches!(
            bindings.bind("", "save"),
            Err(Error::InvalidKey { .. })
        ));
    }

    #[test]
    fn every_op_resolves() {
        let bindings = Bindings::new();
        for name in bindings.op_names() {
            assert!(bindings.resolve("q", name).is_ok());
        }
    }
}
