//! Main controller.
use crate::config::ConfigurationRef;
use crate::editor::Editor;
use crate::error::Result;
use crate::key::{Key, KeySeq};
use crate::mode::Mode;
use crate::op::Action;
use crate::replace::Stage;
use tracing::trace;

/// The primary control point for coordinating keys and editing operations.
pub struct Controller {
    config: ConfigurationRef,
    editor: Editor,

    /// A sequence of keys forming a prefix of at least one bound sequence.
    key_seq: Vec<Key>,
}

impl Controller {
    pub fn new(editor: Editor) -> Controller {
        Controller {
            config: editor.config().clone(),
            editor,
            key_seq: Vec::new(),
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Returns the keys typed so far toward a bound sequence.
    #[cfg(test)]
    pub fn pending(&self) -> &[Key] {
        &self.key_seq
    }

    /// Feeds `keys` to the editor in order, carrying out the actions they produce,
    /// and returns `true` if the editor was asked to quit.
    pub fn run<I>(&mut self, keys: I) -> Result<bool>
    where
        I: IntoIterator<Item = Key>,
    {
        for key in keys {
            match self.process(key) {
                Some(Action::Save) => self.editor.save()?,
                Some(Action::Quit) => return Ok(true),
                Some(Action::SaveQuit) => {
                    self.editor.save()?;
                    return Ok(true);
                }
                None => (),
            }
        }
        Ok(false)
    }

    /// Processes a single key, returning the action it produced, if any.
    ///
    /// `ESC` always takes precedence. While a replacement awaits confirmation, keys
    /// answer the confirmation. Otherwise, keys typed while inserting are inserted and
    /// keys typed in any other mode accumulate until they match a bound sequence.
    pub fn process(&mut self, key: Key) -> Option<Action> {
        trace!(key = %key, mode = %self.editor.mode(), "key");
        self.editor.clear_message();
        let action = if key == Key::Esc {
            self.clear_keys();
            self.editor.escape();
            None
        } else if self.editor.replace_stage() == Stage::Confirm {
            self.editor.answer_replace(key);
            None
        } else {
            match self.editor.mode() {
                Mode::Insert => {
                    self.editor.context().insert_key(key);
                    None
                }
                Mode::Command => self.editor.command_key(key),
                Mode::CommandNormal if key == Key::Enter && self.key_seq.is_empty() => {
                    self.editor.submit_prompt()
                }
                mode => self.dispatch(mode, key),
            }
        };
        if self.editor.mode().is_command() {
            self.editor.refresh_preview();
        }
        action
    }

    fn dispatch(&mut self, mode: Mode, key: Key) -> Option<Action> {
        let config = self.config.clone();
        let vocab = config.bindings.vocabulary(mode)?;
        self.key_seq.push(key);
        if let Some(&command) = vocab.find(&self.key_seq) {
            trace!(command = %command, "command");
            self.clear_keys();
            self.editor.run(command)
        } else if vocab.is_prefix(&self.key_seq) {
            // Current keys form a prefix of at least one bound sequence.
            self.show_keys();
            None
        } else {
            self.show_undefined_keys();
            self.clear_keys();
            None
        }
    }

    fn show_keys(&mut self) {
        let text = KeySeq(&self.key_seq).to_string();
        self.editor.set_message(text);
    }

    fn show_undefined_keys(&mut self) {
        let text = format!(
            "{}: undefined {}",
            KeySeq(&self.key_seq),
            if self.key_seq.len() == 1 {
                "key"
            } else {
                "key sequence"
            }
        );
        self.editor.set_message(text);
    }

    fn clear_keys(&mut self) {
        self.key_seq.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::key;

    fn setup(text: &str) -> Controller {
        Controller::new(Editor::with_text(Configuration::default().to_ref(), text))
    }

    fn keys(control: &mut Controller, notation: &str) -> Vec<Action> {
        key::parse_keys(notation)
            .unwrap()
            .into_iter()
            .filter_map(|key| control.process(key))
            .collect()
    }

    fn text(control: &Controller) -> String {
        control.editor().doc().text().into_owned()
    }

    fn pos(control: &Controller) -> usize {
        control.editor().cursors().primary().pos
    }

    #[test]
    fn motion_then_delete_line() {
        let mut control = setup("a\nb\nc");
        keys(&mut control, "jdd");
        assert_eq!(text(&control), "a\nc");
        assert_eq!(pos(&control), 2);
        assert!(control.pending().is_empty());
    }

    #[test]
    fn change_inner_word() {
        let mut control = setup("hello world");
        keys(&mut control, "lciw");
        assert_eq!(text(&control), " world");
        assert_eq!(control.editor().mode(), Mode::Insert);
        assert_eq!(pos(&control), 0);
    }

    #[test]
    fn change_and_delete_word() {
        let mut control = setup("foo bar");
        keys(&mut control, "cwX<esc>");
        assert_eq!(text(&control), "X bar");

        let mut control = setup("foo\nbar");
        keys(&mut control, "dw");
        assert_eq!(text(&control), "\nbar");
    }

    #[test]
    fn delete_inside_delimiters() {
        let mut control = setup("f(a, (b))");
        keys(&mut control, "lllldi(");
        assert_eq!(text(&control), "f()");
        assert_eq!(control.editor().mode(), Mode::Normal);
    }

    #[test]
    fn leaving_insert_steps_back() {
        let mut control = setup("");
        keys(&mut control, "ihi<esc>");
        assert_eq!(text(&control), "hi");
        assert_eq!(pos(&control), 1);
        assert_eq!(control.editor().mode(), Mode::Normal);
    }

    #[test]
    fn undefined_sequence_discarded() {
        let mut control = setup("abc");
        keys(&mut control, "d");
        assert_eq!(control.pending(), &[Key::Char('d')]);
        keys(&mut control, "z");
        assert!(control.pending().is_empty());
        assert_eq!(
            control.editor().message(),
            Some("dz: undefined key sequence")
        );
        keys(&mut control, "x");
        assert_eq!(text(&control), "bc");
    }

    #[test]
    fn escape_clears_pending_keys() {
        let mut control = setup("abc");
        keys(&mut control, "d<esc>x");
        assert_eq!(text(&control), "bc");
    }

    #[test]
    fn cursors_insert_together() {
        let mut control = setup("ab\nab");
        keys(&mut control, "<c-down>");
        assert_eq!(control.editor().cursors().len(), 2);
        keys(&mut control, "iX<esc>");
        assert_eq!(text(&control), "Xab\nXab");
        assert_eq!(control.editor().cursors().len(), 1);
    }

    #[test]
    fn block_delete() {
        let mut control = setup("abc\nabc\nabc");
        keys(&mut control, "l<c-v>jjd");
        assert_eq!(text(&control), "ac\nac\nac");
        assert_eq!(control.editor().mode(), Mode::Normal);
    }

    #[test]
    fn block_insert() {
        let mut control = setup("abc\nabc");
        keys(&mut control, "l<c-v>jI-<esc>");
        assert_eq!(text(&control), "a-bc\na-bc");
    }

    #[test]
    fn visual_line_delete() {
        let mut control = setup("a\nb\nc\nd");
        keys(&mut control, "jVjd");
        assert_eq!(text(&control), "a\nd");
    }

    #[test]
    fn write_and_quit() {
        let mut control = setup("abc");
        assert_eq!(keys(&mut control, ":w<ret>"), vec![Action::Save]);
        assert_eq!(control.editor().mode(), Mode::Normal);
        assert_eq!(keys(&mut control, ":q<ret>"), vec![Action::Quit]);
        assert_eq!(keys(&mut control, ":wq<ret>"), vec![Action::SaveQuit]);
        assert_eq!(keys(&mut control, "ZZ"), vec![Action::SaveQuit]);
    }

    #[test]
    fn command_line_edited_in_normal_keys() {
        let mut control = setup("abc");
        keys(&mut control, ":xw<c-f>");
        assert_eq!(control.editor().mode(), Mode::CommandNormal);
        assert_eq!(keys(&mut control, "0x<ret>"), vec![Action::Save]);
        assert_eq!(text(&control), "abc");
    }

    #[test]
    fn unknown_command() {
        let mut control = setup("abc");
        keys(&mut control, ":frob<ret>");
        assert_eq!(control.editor().message(), Some("frob: unknown command"));
        assert_eq!(control.editor().mode(), Mode::Normal);
    }

    #[test]
    fn goto_line() {
        let mut control = setup("a\nb\n  c");
        keys(&mut control, ":3<ret>");
        assert_eq!(pos(&control), 6);
    }

    #[test]
    fn search_and_step() {
        let mut control = setup("foo bar foo baz");
        keys(&mut control, "/baz<ret>");
        assert_eq!(pos(&control), 12);
        keys(&mut control, "/foo<ret>");
        assert_eq!(pos(&control), 8);
        keys(&mut control, "n");
        assert_eq!(pos(&control), 0);
        keys(&mut control, "N");
        assert_eq!(pos(&control), 8);
    }

    #[test]
    fn search_not_found() {
        let mut control = setup("foo");
        keys(&mut control, "/zzz<ret>");
        assert_eq!(pos(&control), 0);
        assert_eq!(control.editor().message(), Some("zzz: not found"));
    }

    #[test]
    fn regex_search() {
        let mut control = setup("ab 12 cd 345");
        keys(&mut control, ":regex<ret>[0-9]+<ret>");
        assert_eq!(pos(&control), 3);
        keys(&mut control, "n");
        assert_eq!(pos(&control), 9);
    }

    #[test]
    fn select_makes_cursors() {
        let mut control = setup("a1 a2 a3");
        keys(&mut control, "v$:select<ret>a<ret>");
        assert_eq!(control.editor().mode(), Mode::Visual);
        assert_eq!(control.editor().cursors().len(), 3);
        keys(&mut control, "cb<esc>");
        assert_eq!(text(&control), "b1 b2 b3");
    }

    #[test]
    fn replace_within_selection() {
        let mut control = setup("foo bar foo");
        keys(&mut control, "v$:replace<ret>foo<ret>baz<ret>");
        assert_eq!(control.editor().replace_stage(), Stage::Confirm);
        keys(&mut control, "yy");
        assert_eq!(text(&control), "baz bar baz");
        assert_eq!(control.editor().replace_stage(), Stage::Inactive);
        assert_eq!(control.editor().message(), Some("2 replaced"));
    }

    #[test]
    fn replace_skips_on_no() {
        let mut control = setup("foo foo foo");
        keys(&mut control, ":replace<ret>foo<ret>x<ret>nyn");
        assert_eq!(text(&control), "foo x foo");
        assert_eq!(control.editor().message(), Some("1 replaced"));
    }

    #[test]
    fn replace_aborted_by_escape() {
        let mut control = setup("foo foo foo");
        keys(&mut control, ":replace<ret>foo<ret>x<ret>y<esc>");
        assert_eq!(text(&control), "x foo foo");
        assert_eq!(control.editor().replace_stage(), Stage::Inactive);
        assert_eq!(control.editor().mode(), Mode::Normal);
        keys(&mut control, "y");
        assert_eq!(text(&control), "x foo foo");
    }

    #[test]
    fn escape_from_prompt_opened_in_visual() {
        let mut control = setup("foo bar");
        keys(&mut control, "vl:<esc>");
        assert_eq!(control.editor().mode(), Mode::Normal);
        let frame = control.editor().frame(0..1);
        assert!(frame.highlights_of(crate::view::HighlightKind::Selection).is_empty());

        keys(&mut control, "vl:select<ret><esc>");
        assert_eq!(control.editor().mode(), Mode::Visual);

        keys(&mut control, "<esc>vl:replace<ret>fo<esc>");
        assert_eq!(control.editor().mode(), Mode::Visual);
    }

    #[test]
    fn replace_pattern_previewed() {
        let mut control = setup("foo bar foo");
        keys(&mut control, ":replace<ret>fo");
        let frame = control.editor().frame(0..1);
        assert_eq!(frame.prompt.as_deref(), Some("replace: fo"));
        assert_eq!(
            frame.highlights_of(crate::view::HighlightKind::Match),
            vec![0..2, 8..10]
        );
    }

    #[test]
    fn run_saves_and_quits() {
        let mut control = setup("abc");
        let quit = control
            .run(key::parse_keys("x:q<ret>x").unwrap())
            .unwrap();
        assert!(quit);
        assert_eq!(text(&control), "bc");
    }
}
