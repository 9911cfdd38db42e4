//! Editor.
//!
//! An [`Editor`] binds a [`Document`] to its cursors and the current [`Mode`], and
//! owns a second, single-line document that serves as the command line. Prompts for
//! commands, searches, selections and replacements are all answered on the command
//! line.
//!
//! Operations reach the document through a [`Context`], which refers to whichever
//! document has focus: the command line in command modes, and the main document
//! otherwise. This is what allows the keys of normal mode to edit the command line.

use crate::bind::{Command, Operator};
use crate::config::{ConfigurationRef, Settings};
use crate::cursor::{self, Cursor, CursorSet};
use crate::delim;
use crate::document::Document;
use crate::edit;
use crate::error::Result;
use crate::etc::{self, Class};
use crate::io;
use crate::key::{Ctrl, Key};
use crate::mode::Mode;
use crate::nav::{self, Motion, MotionKind, TextObject};
use crate::op::Action;
use crate::replace::{Replace, Stage, Step};
use crate::search::{self, Match, Pattern};
use crate::view::{CursorView, Frame, Highlight, HighlightKind, LineView};
use std::cmp;
use std::mem;
use std::ops::Range;
use std::path::Path;
use tracing::debug;

/// The question being asked on the command line.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum PromptKind {
    Command,
    Find { regex: bool },
    Select,
    Replace,
}

struct Prompt {
    kind: PromptKind,

    /// Mode to return to once the prompt is answered or aborted.
    origin: Mode,

    /// Selection that was active when the prompt was opened.
    range: Option<Range<usize>>,
}

pub struct Editor {
    config: ConfigurationRef,
    path: Option<String>,
    doc: Document,
    cursors: CursorSet,
    mode: Mode,

    /// Line and column of the corner opposite the primary cursor in visual block
    /// mode.
    anchor: (usize, usize),

    cli: Document,
    cli_cursors: CursorSet,
    prompt: Option<Prompt>,
    replace: Replace,

    /// Pattern of the last search.
    find: Option<Box<dyn Pattern>>,
    matches: Vec<Match>,
    current: Option<Match>,
    message: Option<String>,
}

impl Editor {
    pub fn new(config: ConfigurationRef) -> Editor {
        Editor {
            config,
            path: None,
            doc: Document::new(),
            cursors: CursorSet::new(),
            mode: Mode::Normal,
            anchor: (0, 0),
            cli: Document::cli(),
            cli_cursors: CursorSet::new(),
            prompt: None,
            replace: Replace::new(),
            find: None,
            matches: Vec::new(),
            current: None,
            message: None,
        }
    }

    /// Creates an editor whose document contains `text`.
    pub fn with_text(config: ConfigurationRef, text: &str) -> Editor {
        let mut editor = Editor::new(config);
        editor.load(text.as_bytes().to_vec());
        editor
    }

    /// Opens the file at `path`, returning `false` if the file does not exist, in
    /// which case the document is empty and saving creates the file.
    pub fn open(&mut self, path: &str) -> Result<bool> {
        let found = Path::new(path).exists();
        let bytes = if found {
            io::read_file(path)?
        } else {
            Vec::new()
        };
        debug!(path, found, bytes = bytes.len(), "open");
        self.path = Some(path.to_string());
        self.load(bytes);
        Ok(found)
    }

    /// Replaces the document with `bytes`, leaving a single cursor at the top.
    pub fn load(&mut self, bytes: Vec<u8>) {
        self.doc.load(bytes);
        self.cursors.reset(&self.doc, 0);
        self.prompt = None;
        self.replace.abort();
        self.matches.clear();
        self.current = None;
        self.set_mode(Mode::Normal);
    }

    /// Writes the document to its file.
    pub fn save(&mut self) -> Result<()> {
        match &self.path {
            Some(path) => {
                io::write_file(path, self.doc.data())?;
                self.doc.clear_dirty();
                debug!(path = %path, bytes = self.doc.len(), "save");
                self.message = Some(format!("{path}: written"));
            }
            None => self.message = Some("no file name".to_string()),
        }
        Ok(())
    }

    pub fn config(&self) -> &ConfigurationRef {
        &self.config
    }

    pub fn set_path(&mut self, path: &str) {
        self.path = Some(path.to_string());
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn cursors(&self) -> &CursorSet {
        &self.cursors
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the contents of the command line.
    pub fn replace_stage(&self) -> Stage {
        self.replace.stage()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_message(&mut self, message: String) {
        self.message = Some(message);
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Returns the context of whichever document has focus.
    pub fn context(&mut self) -> Context<'_> {
        let settings = &self.config.settings;
        if self.mode.is_command() {
            Context {
                doc: &mut self.cli,
                cursors: &mut self.cli_cursors,
                mode: &mut self.mode,
                anchor: &mut self.anchor,
                settings,
            }
        } else {
            Context {
                doc: &mut self.doc,
                cursors: &mut self.cursors,
                mode: &mut self.mode,
                anchor: &mut self.anchor,
                settings,
            }
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!(from = %self.mode, to = %mode, "mode");
            self.mode = mode;
        }
        self.cursors.set_style(mode.cursor_style());
        self.cli_cursors.set_style(mode.cursor_style());
    }

    /// Carries out `command` on the focused document.
    pub fn run(&mut self, command: Command) -> Option<Action> {
        match command {
            Command::Op(_, op_fn) => return op_fn(self),
            Command::Motion(motion) => self.context().apply_motion(motion),
            Command::Operator(op, motion) => self.context().operate(op, motion),
            Command::Object(op, obj) => self.context().operate_on_object(op, obj),
            Command::Select(obj) => self.context().select_object(obj),
        }
        None
    }

    /// Abandons whatever is in progress.
    ///
    /// Secondary cursors are dropped in every case. An open prompt is aborted, and
    /// only an unfinished select or replacement restores the visual mode it was
    /// opened from. Otherwise insertion and visual modes return to normal mode.
    pub fn escape(&mut self) {
        self.cursors.clear_secondary();
        if let Some(prompt) = self.prompt.take() {
            if self.replace.is_active() {
                debug!(stage = self.replace.stage().number(), "replace aborted");
                self.replace.abort();
            }
            self.close_prompt(prompt.origin);
            if prompt.origin.is_visual()
                && !matches!(prompt.kind, PromptKind::Select | PromptKind::Replace)
            {
                self.context().enter_normal();
            }
            return;
        }
        match self.mode {
            Mode::Insert => self.context().leave_insert(),
            Mode::Visual | Mode::VisualLine | Mode::VisualBlock => self.context().enter_normal(),
            _ => {
                self.matches.clear();
                self.current = None;
                self.context().normalize();
            }
        }
    }

    /// Handles `key` typed on the command line.
    pub fn command_key(&mut self, key: Key) -> Option<Action> {
        match key {
            Key::Enter => return self.submit_prompt(),
            Key::Backspace if self.cli.is_empty() => self.escape(),
            Key::Control('f') => self.context().enter_normal(),
            key => self.context().insert_key(key),
        }
        None
    }

    /// Opens the command line to ask the question of `kind`.
    ///
    /// The selection of the primary cursor in visual modes is captured, since it
    /// confines selection and replacement.
    pub fn open_prompt(&mut self, kind: PromptKind) {
        let primary = self.cursors.primary();
        let range = match self.mode {
            Mode::Visual => Some(primary.char_range(&self.doc)),
            Mode::VisualLine => Some(primary.line_range(&self.doc)),
            Mode::VisualBlock => {
                let ranges = cursor::block_ranges(&self.doc, self.anchor, primary);
                match (ranges.first(), ranges.last()) {
                    (Some(first), Some(last)) => Some(first.start..last.end),
                    _ => None,
                }
            }
            _ => None,
        };
        debug!(?kind, origin = %self.mode, "prompt");
        self.prompt = Some(Prompt {
            kind,
            origin: self.mode,
            range,
        });
        self.clear_cli();
        self.set_mode(Mode::Command);
    }

    /// Asks the question of `kind` in place of the one answered by `prompt`.
    fn reopen(&mut self, prompt: Prompt, kind: PromptKind) {
        debug!(?kind, "prompt");
        self.prompt = Some(Prompt { kind, ..prompt });
        self.clear_cli();
        self.set_mode(Mode::Command);
    }

    fn close_prompt(&mut self, origin: Mode) {
        self.clear_cli();
        self.matches.clear();
        self.current = None;
        self.set_mode(origin);
    }

    fn clear_cli(&mut self) {
        self.cli.clear();
        self.cli_cursors.reset(&self.cli, 0);
        self.matches.clear();
    }

    /// Answers the open prompt with the contents of the command line.
    pub fn submit_prompt(&mut self) -> Option<Action> {
        let prompt = self.prompt.take()?;
        let text = self.cli.text().into_owned();
        match prompt.kind {
            PromptKind::Command => self.run_command_line(prompt, text.trim()),
            PromptKind::Find { regex } => {
                self.close_prompt(prompt.origin);
                self.find(&text, regex);
                None
            }
            PromptKind::Select => {
                self.select(prompt, &text);
                None
            }
            PromptKind::Replace => {
                self.advance_replace(prompt, &text);
                None
            }
        }
    }

    fn run_command_line(&mut self, prompt: Prompt, line: &str) -> Option<Action> {
        match line {
            "search" => self.reopen(prompt, PromptKind::Find { regex: false }),
            "regex" => self.reopen(prompt, PromptKind::Find { regex: true }),
            "select" if prompt.range.is_some() => self.reopen(prompt, PromptKind::Select),
            "replace" => {
                let range = prompt.range.clone().unwrap_or(0..self.doc.len());
                self.replace.start(range, self.config.settings.case_strict);
                debug!(stage = self.replace.stage().number(), "replace");
                self.reopen(prompt, PromptKind::Replace);
            }
            _ => {
                self.close_prompt(prompt.origin);
                match line {
                    "" => (),
                    "w" => return Some(Action::Save),
                    "q" => return Some(Action::Quit),
                    "wq" | "x" => return Some(Action::SaveQuit),
                    "select" => self.message = Some("select: no selection".to_string()),
                    _ => match line.parse::<usize>() {
                        Ok(n) => self.goto_line(n),
                        Err(_) => self.message = Some(format!("{line}: unknown command")),
                    },
                }
            }
        }
        None
    }

    /// Moves the primary cursor to the first non-blank character of line `n`,
    /// counting from `1`.
    fn goto_line(&mut self, n: usize) {
        let line = cmp::min(n.saturating_sub(1), self.doc.line_count() - 1);
        let pos = nav::first_non_blank(&self.doc, line);
        self.cursors.clear_secondary();
        self.cursors.primary_mut().move_to(&self.doc, pos);
        self.context().normalize();
    }

    fn find(&mut self, text: &str, regex: bool) {
        let case_strict = self.config.settings.case_strict;
        let pattern = if regex {
            match search::compile_regex(text, case_strict) {
                Ok(regex) => search::using_regex(regex),
                Err(e) => {
                    self.message = Some(e.to_string());
                    return;
                }
            }
        } else {
            search::using_term(text, case_strict)
        };
        debug!(pattern = text, regex, "find");
        self.find = Some(pattern);
        self.goto_match(None);
    }

    /// Moves the primary cursor to the next match of the last search in the
    /// direction of `forward`, wrapping around the ends of the document.
    pub fn step_match(&mut self, forward: bool) {
        self.goto_match(Some(forward));
    }

    fn goto_match(&mut self, forward: Option<bool>) {
        let Some(pattern) = &self.find else {
            self.message = Some("no previous search".to_string());
            return;
        };
        let matches = pattern.find_all(self.doc.data());
        let pos = self.cursors.primary().pos;
        let index = match forward {
            Some(forward) => search::next_match(pos, &matches, forward),
            None => search::nearest_match(pos, &matches),
        };
        match index {
            Some(i) => {
                let m = matches[i];
                self.current = Some(m);
                self.matches = matches;
                self.focus(m);
            }
            None => {
                self.message = Some(format!("{}: not found", pattern.pattern()));
                self.matches.clear();
                self.current = None;
            }
        }
    }

    /// Moves the primary cursor to the start of `m`, dropping secondary cursors.
    fn focus(&mut self, m: Match) {
        self.cursors.clear_secondary();
        self.cursors.primary_mut().move_to(&self.doc, m.0);
        self.context().normalize();
    }

    /// Turns every occurrence of `text` inside the selection into a cursor that
    /// selects it.
    fn select(&mut self, prompt: Prompt, text: &str) {
        self.close_prompt(prompt.origin);
        let range = prompt.range.unwrap_or(0..self.doc.len());
        let ranges = search::using_term(text, self.config.settings.case_strict)
            .find_in(self.doc.data(), range)
            .iter()
            .map(Match::range)
            .collect::<Vec<_>>();
        let mut cursors = edit::selection_cursors(&self.doc, &ranges).into_iter();
        match cursors.next() {
            Some(first) => {
                *self.cursors.primary_mut() = first;
                self.cursors.clear_secondary();
                for c in cursors {
                    self.cursors.add_cursor(c);
                }
                self.set_mode(Mode::Visual);
                debug!(cursors = self.cursors.len(), "select");
            }
            None => self.message = Some(format!("{text}: not found")),
        }
    }

    fn advance_replace(&mut self, prompt: Prompt, text: &str) {
        match self.replace.stage() {
            Stage::Pattern => {
                self.replace.set_pattern(text);
                if self.replace.is_active() {
                    self.reopen(prompt, PromptKind::Replace);
                } else {
                    self.close_prompt(prompt.origin);
                }
            }
            Stage::Replacement => match self.replace.set_replacement(&self.doc, text) {
                Some(m) => {
                    self.close_prompt(prompt.origin);
                    self.prompt = Some(prompt);
                    self.focus(m);
                }
                None => {
                    self.message = Some("no matches".to_string());
                    self.close_prompt(prompt.origin);
                }
            },
            _ => (),
        }
        debug!(
            stage = self.replace.stage().number(),
            pattern = self.replace.pattern(),
            range = ?self.replace.range(),
            "replace"
        );
    }

    /// Answers the confirmation of the current replacement, where `y` replaces, `n`
    /// skips, and any other key is ignored.
    pub fn answer_replace(&mut self, key: Key) {
        let step = match key {
            Key::Char('y') => self.replace.confirm(&mut self.doc, &mut self.cursors),
            Key::Char('n') => self.replace.skip(),
            _ => None,
        };
        match step {
            Some(Step::Next(m)) => self.focus(m),
            Some(Step::Done { replaced }) => {
                debug!(replaced, "replace finished");
                self.prompt = None;
                self.message = Some(format!("{replaced} replaced"));
                self.context().normalize();
            }
            None => (),
        }
    }

    /// Highlights the matches of the text typed so far on the command line.
    pub fn refresh_preview(&mut self) {
        let Some(prompt) = &self.prompt else {
            return;
        };
        let text = self.cli.text();
        let case_strict = self.config.settings.case_strict;
        let data = self.doc.data();
        self.matches = match prompt.kind {
            PromptKind::Find { regex: false } => search::using_term(&text, case_strict).find_all(data),
            PromptKind::Find { regex: true } => search::compile_regex(&text, case_strict)
                .map(|regex| search::using_regex(regex).find_all(data))
                .unwrap_or_default(),
            PromptKind::Select => search::using_term(&text, case_strict)
                .find_in(data, prompt.range.clone().unwrap_or(0..data.len())),
            PromptKind::Replace if self.replace.stage() == Stage::Pattern => {
                self.replace.preview(&self.doc, &text)
            }
            PromptKind::Replace | PromptKind::Command => Vec::new(),
        };
        self.current = None;
    }

    /// Returns a snapshot of `lines` for rendering, which are clamped to the lines of
    /// the document.
    pub fn frame(&self, lines: Range<usize>) -> Frame {
        let doc = &self.doc;
        let count = doc.line_count();
        let lines = cmp::min(lines.start, count)..cmp::min(lines.end, count);
        let visible = if lines.is_empty() {
            0..0
        } else {
            doc.line_start(lines.start)..doc.next_line_start(lines.end - 1)
        };

        let line_views = lines
            .clone()
            .map(|line| LineView {
                line,
                start: doc.line_start(line),
                text: String::from_utf8_lossy(doc.line_text(line)).into_owned(),
            })
            .collect();

        let cursors = self
            .cursors
            .iter()
            .enumerate()
            .filter(|(_, c)| lines.contains(&c.line))
            .map(|(i, c)| CursorView {
                pos: c.pos,
                line: c.line,
                col: c.col,
                style: c.style,
                blink: c.blink,
                primary: i == 0,
            })
            .collect();

        let mut highlights = self
            .selections()
            .into_iter()
            .map(|range| Highlight {
                kind: HighlightKind::Selection,
                range,
            })
            .collect::<Vec<_>>();
        let (matches, current) = if self.replace.stage() == Stage::Confirm {
            (
                self.replace.pending().copied().collect::<Vec<_>>(),
                self.replace.current(),
            )
        } else {
            (self.matches.clone(), self.current)
        };
        highlights.extend(matches.into_iter().map(|m| Highlight {
            kind: if Some(m) == current {
                HighlightKind::CurrentMatch
            } else {
                HighlightKind::Match
            },
            range: m.range(),
        }));
        highlights.retain(|h| h.range.start <= visible.end && h.range.end >= visible.start);

        Frame {
            mode: self.mode,
            lines: line_views,
            cursors,
            highlights,
            prompt: self.prompt_text(),
            message: self.message.clone(),
            modified: doc.is_dirty(),
        }
    }

    /// Returns the selected ranges, which remain visible while a prompt opened from a
    /// visual mode is answered.
    fn selections(&self) -> Vec<Range<usize>> {
        let mode = self.prompt.as_ref().map_or(self.mode, |p| p.origin);
        match mode {
            Mode::Visual => self.cursors.iter().map(|c| c.char_range(&self.doc)).collect(),
            Mode::VisualLine => self.cursors.iter().map(|c| c.line_range(&self.doc)).collect(),
            Mode::VisualBlock => cursor::block_ranges(&self.doc, self.anchor, self.cursors.primary()),
            _ => Vec::new(),
        }
    }

    fn prompt_text(&self) -> Option<String> {
        let prompt = self.prompt.as_ref()?;
        let label = match prompt.kind {
            PromptKind::Command => ":",
            PromptKind::Find { regex: false } => "/",
            PromptKind::Find { regex: true } => "regex: ",
            PromptKind::Select => "select: ",
            PromptKind::Replace => match self.replace.stage() {
                Stage::Pattern => "replace: ",
                Stage::Replacement => "with: ",
                _ => return Some("replace? (y/n)".to_string()),
            },
        };
        Some(format!("{label}{}", self.cli.text()))
    }
}

/// The focused document together with everything an operation needs to edit it.
pub struct Context<'a> {
    pub doc: &'a mut Document,
    pub cursors: &'a mut CursorSet,
    pub mode: &'a mut Mode,
    pub anchor: &'a mut (usize, usize),
    pub settings: &'a Settings,
}

impl Context<'_> {
    fn set_mode(&mut self, mode: Mode) {
        if *self.mode != mode {
            debug!(from = %self.mode, to = %mode, "mode");
            *self.mode = mode;
        }
        self.cursors.set_style(mode.cursor_style());
    }

    /// Restores the resting state of cursors after a command.
    ///
    /// Outside of insertion every cursor is held on a character of its line, and
    /// outside of visual modes selections are collapsed. Cursors that coincide are
    /// merged.
    pub fn normalize(&mut self) {
        if !self.mode.is_inserting() {
            for c in self.cursors.iter_mut() {
                let pos = nav::clamp_normal(self.doc, c.pos);
                if pos != c.pos {
                    c.move_to(self.doc, pos);
                }
            }
        }
        if !self.mode.is_visual() {
            self.cursors.collapse_selections();
        }
        self.cursors.dedup();
    }

    /// Moves every cursor to the position computed by `f`.
    pub fn move_each<F>(&mut self, f: F)
    where
        F: Fn(&Document, &Cursor) -> usize,
    {
        for c in self.cursors.iter_mut() {
            let pos = f(self.doc, c);
            c.move_to(self.doc, pos);
        }
    }

    /// Moves every cursor under `motion`, which extends selections in visual modes.
    pub fn apply_motion(&mut self, motion: Motion) {
        let past_end = self.mode.is_inserting();
        for c in self.cursors.iter_mut() {
            let pos = nav::resolve(self.doc, c, motion, past_end);
            if motion.is_vertical() {
                c.move_vertical(self.doc, pos);
            } else {
                c.move_to(self.doc, pos);
            }
        }
        self.normalize();
    }

    /// Enters insert mode, or command mode when the command line has focus.
    pub fn enter_insert(&mut self) {
        self.cursors.collapse_selections();
        let mode = if self.doc.is_cli() {
            Mode::Command
        } else {
            Mode::Insert
        };
        self.set_mode(mode);
    }

    /// Leaves insertion, stepping back onto the last character inserted.
    pub fn leave_insert(&mut self) {
        self.move_each(|doc, c| nav::move_left(doc, c.pos));
        self.enter_normal();
    }

    /// Enters normal mode, or command normal mode when the command line has focus.
    pub fn enter_normal(&mut self) {
        let mode = if self.doc.is_cli() {
            Mode::CommandNormal
        } else {
            Mode::Normal
        };
        self.set_mode(mode);
        self.normalize();
    }

    /// Enters the visual `mode`, or returns to normal mode if already in it.
    ///
    /// Entering visual block mode records the selection anchor as the corner of the
    /// block opposite the primary cursor.
    pub fn toggle_visual(&mut self, mode: Mode) {
        if *self.mode == mode {
            self.enter_normal();
            return;
        }
        if !self.mode.is_visual() {
            self.cursors.collapse_selections();
        }
        if mode == Mode::VisualBlock {
            let sel = self.cursors.primary().sel;
            let line = self.doc.line_of(sel);
            *self.anchor = (line, sel - self.doc.line_start(line));
        }
        self.set_mode(mode);
    }

    /// Adds a cursor on the line below the lowest cursor when `down` is `true`, or
    /// above the highest cursor otherwise.
    pub fn add_cursor(&mut self, down: bool) {
        let cursors = self.cursors.iter();
        let edge = if down {
            cursors.max_by_key(|c| c.pos)
        } else {
            cursors.min_by_key(|c| c.pos)
        };
        let Some(mut c) = edge.cloned() else {
            return;
        };
        let pos = nav::move_vertical(self.doc, &c, down, self.mode.is_inserting());
        if pos != c.pos {
            c.move_vertical(self.doc, pos);
            c.collapse();
            self.cursors.add_cursor(c);
        }
    }

    /// Applies `op` to the text spanned by each cursor and the target of `motion`.
    pub fn operate(&mut self, op: Operator, motion: Motion) {
        if motion.kind() == MotionKind::Linewise {
            let spans = self
                .cursors
                .iter()
                .filter_map(|c| {
                    let target = nav::resolve(self.doc, c, motion, true);
                    let (from, to) = (self.doc.line_of(c.pos), self.doc.line_of(target));
                    if motion.is_vertical() && from == to {
                        None
                    } else {
                        Some((cmp::min(from, to), cmp::max(from, to)))
                    }
                })
                .collect::<Vec<_>>();
            if spans.is_empty() {
                return;
            }
            match op {
                Operator::Delete => edit::delete_lines(self.doc, self.cursors, spans),
                Operator::Change => edit::change_lines(self.doc, self.cursors, self.settings, spans),
            }
        } else {
            let ranges = self
                .cursors
                .iter()
                .filter_map(|c| operator_range(self.doc, c, op, motion))
                .collect::<Vec<_>>();
            if ranges.is_empty() {
                return;
            }
            edit::delete_ranges(self.doc, self.cursors, ranges);
        }
        self.finish_operator(op);
    }

    /// Applies `op` to the text object around each cursor.
    ///
    /// Cursors for which the object does not exist are left alone, and nothing
    /// happens if it exists for none of them.
    pub fn operate_on_object(&mut self, op: Operator, obj: TextObject) {
        let mut ranges = Vec::new();
        for c in self.cursors.iter_mut() {
            if let Some(mut range) = nav::object_range(self.doc, c.pos, obj) {
                // A change keeps the line break ending a paragraph.
                if op == Operator::Change
                    && range.end > range.start
                    && self.doc.data()[range.end - 1] == b'\n'
                {
                    range.end -= 1;
                }
                c.move_to(self.doc, range.start);
                ranges.push(range);
            }
        }
        if !ranges.is_empty() {
            edit::delete_ranges(self.doc, self.cursors, ranges);
            self.finish_operator(op);
        }
    }

    fn finish_operator(&mut self, op: Operator) {
        match op {
            Operator::Delete => self.normalize(),
            Operator::Change => self.enter_insert(),
        }
    }

    /// Selects the text object around each cursor.
    pub fn select_object(&mut self, obj: TextObject) {
        for c in self.cursors.iter_mut() {
            if let Some(range) = nav::object_range(self.doc, c.pos, obj) {
                if range.start < range.end {
                    c.sel = range.start;
                    c.move_to(self.doc, etc::prev_rune_start(self.doc.data(), range.end));
                }
            }
        }
    }

    /// Deletes the rune before every cursor without leaving its line.
    pub fn delete_char_before(&mut self) {
        let ranges = self
            .cursors
            .iter()
            .map(|c| nav::move_left(self.doc, c.pos)..c.pos)
            .collect();
        edit::delete_ranges(self.doc, self.cursors, ranges);
        self.normalize();
    }

    /// Deletes the selection according to the visual mode.
    pub fn delete_selection(&mut self) {
        match *self.mode {
            Mode::Visual => edit::delete_selection(self.doc, self.cursors),
            Mode::VisualLine => edit::delete_visual_line_selection(self.doc, self.cursors),
            Mode::VisualBlock => edit::delete_block_selection(self.doc, self.cursors, *self.anchor),
            _ => return,
        }
        self.enter_normal();
    }

    /// Deletes the selection according to the visual mode and enters insert mode.
    pub fn change_selection(&mut self) {
        match *self.mode {
            Mode::Visual => edit::delete_selection(self.doc, self.cursors),
            Mode::VisualLine => {
                edit::change_visual_line_selection(self.doc, self.cursors, self.settings)
            }
            Mode::VisualBlock => edit::change_block_selection(self.doc, self.cursors, *self.anchor),
            _ => return,
        }
        self.enter_insert();
    }

    /// Moves each cursor to the other end of its selection.
    pub fn swap_anchor(&mut self) {
        if *self.mode == Mode::VisualBlock {
            let (line, col) = *self.anchor;
            let (p_line, p_col) = (self.cursors.primary().line, self.cursors.primary().col);
            *self.anchor = (p_line, p_col);
            let start = self.doc.line_start(line);
            let pos = cmp::min(start + col, nav::line_end(self.doc, start, false));
            let pos = etc::snap_rune_start(self.doc.data(), pos);
            let primary = self.cursors.primary_mut();
            primary.move_to(self.doc, pos);
            primary.collapse();
        } else {
            for c in self.cursors.iter_mut() {
                mem::swap(&mut c.pos, &mut c.sel);
                c.sync(self.doc);
                c.preferred_col = c.col;
            }
        }
    }

    /// Enters insert mode at the start of each selection, or past the end of it when
    /// `append` is `true`.
    ///
    /// In visual block mode a cursor is placed on every line of the block.
    pub fn block_insert(&mut self, append: bool) {
        match *self.mode {
            Mode::VisualBlock => edit::block_cursors(self.doc, self.cursors, *self.anchor, append),
            Mode::Visual => self.move_each(|doc, c| {
                let (lo, hi) = c.bounds();
                if append {
                    let end = doc.line_end(doc.line_of(hi));
                    cmp::min(hi + etc::next_rune_len(doc.data(), hi), end)
                } else {
                    lo
                }
            }),
            Mode::VisualLine => self.move_each(|doc, c| {
                let (lo, hi) = c.bounds();
                if append {
                    doc.line_end(doc.line_of(hi))
                } else {
                    nav::first_non_blank(doc, doc.line_of(lo))
                }
            }),
            _ => return,
        }
        self.enter_insert();
    }

    /// Handles `key` typed while inserting.
    pub fn insert_key(&mut self, key: Key) {
        match key {
            Key::Char(c) if c.is_ascii() && delim::is_block_closer(c as u8) => {
                edit::insert_closing_delimiter(self.doc, self.cursors, self.settings, c as u8)
            }
            Key::Char(c) => edit::insert_char(self.doc, self.cursors, c),
            Key::Enter => edit::insert_newline(self.doc, self.cursors, self.settings),
            Key::Tab => edit::insert_tab(self.doc, self.cursors, self.settings),
            Key::Backspace => edit::delete_char(self.doc, self.cursors, self.settings),
            Key::Delete => edit::delete_forward_char(self.doc, self.cursors),
            Key::Control('w') => edit::delete_word(self.doc, self.cursors),
            Key::Left(Ctrl::Off) => self.apply_motion(Motion::Left),
            Key::Right(Ctrl::Off) => self.apply_motion(Motion::Right),
            Key::Up(Ctrl::Off) => self.apply_motion(Motion::Up),
            Key::Down(Ctrl::Off) => self.apply_motion(Motion::Down),
            Key::Left(Ctrl::On) => self.apply_motion(Motion::WordStartBackward(false)),
            Key::Right(Ctrl::On) => self.apply_motion(Motion::WordStartForward(false)),
            Key::Up(Ctrl::On) => self.add_cursor(false),
            Key::Down(Ctrl::On) => self.add_cursor(true),
            Key::Home => self.apply_motion(Motion::LineStart),
            Key::End => self.apply_motion(Motion::LineEnd),
            _ => (),
        }
    }
}

/// Returns the range an operator acts on for `cursor` under `motion`, or `None` if
/// the range is empty.
///
/// Changing a word with `w` stops at the end of the word rather than at the start of
/// the next, and deleting with `w` never crosses the end of the line.
fn operator_range(
    doc: &Document,
    cursor: &Cursor,
    op: Operator,
    motion: Motion,
) -> Option<Range<usize>> {
    let pos = cursor.pos;
    let data = doc.data();
    let range = match motion {
        Motion::WordStartForward(big)
            if op == Operator::Change && etc::class_at(data, pos, big) != Class::Whitespace =>
        {
            pos..nav::word_run_end(doc, pos, big)
        }
        Motion::WordStartForward(big) => {
            let target = nav::word_start_forward(doc, pos, big);
            let eol = doc.line_end(doc.line_of(pos));
            let end = if pos < eol { cmp::min(target, eol) } else { target };
            pos..end
        }
        _ => {
            let target = nav::resolve(doc, cursor, motion, true);
            if motion == Motion::MatchPair && target == pos {
                return None;
            }
            let (lo, hi) = (cmp::min(pos, target), cmp::max(pos, target));
            match motion.kind() {
                MotionKind::Inclusive if data.get(hi).is_some_and(|&b| b != b'\n') => {
                    lo..hi + etc::next_rune_len(data, hi)
                }
                _ => lo..hi,
            }
        }
    };
    (range.start < range.end).then_some(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use std::env;
    use std::fs;

    fn editor(text: &str) -> Editor {
        Editor::with_text(Configuration::default().to_ref(), text)
    }

    #[test]
    fn context_follows_focus() {
        let mut editor = editor("abc");
        assert!(!editor.context().doc.is_cli());
        editor.open_prompt(PromptKind::Command);
        assert_eq!(editor.mode(), Mode::Command);
        assert!(editor.context().doc.is_cli());
        editor.escape();
        assert_eq!(editor.mode(), Mode::Normal);
    }

    #[test]
    fn operator_ranges() {
        let doc = Document::with_bytes(b"foo bar\nbaz");
        let c = Cursor::at(&doc, 0);
        let w = Motion::WordStartForward(false);
        assert_eq!(operator_range(&doc, &c, Operator::Delete, w), Some(0..4));
        assert_eq!(operator_range(&doc, &c, Operator::Change, w), Some(0..3));
        let c = Cursor::at(&doc, 4);
        assert_eq!(operator_range(&doc, &c, Operator::Delete, w), Some(4..7));
        assert_eq!(
            operator_range(&doc, &c, Operator::Delete, Motion::LineEnd),
            Some(4..7)
        );
        assert_eq!(
            operator_range(&doc, &c, Operator::Delete, Motion::WordEndForward(false)),
            Some(4..7)
        );
        assert_eq!(
            operator_range(&doc, &c, Operator::Delete, Motion::MatchPair),
            None
        );
        assert_eq!(
            operator_range(&doc, &c, Operator::Delete, Motion::WordStartBackward(false)),
            Some(0..4)
        );
    }

    #[test]
    fn frame_describes_lines_and_selection() {
        let mut editor = editor("one\ntwo\nthree");
        {
            let mut ctx = editor.context();
            ctx.apply_motion(Motion::Down);
            ctx.toggle_visual(Mode::Visual);
            ctx.apply_motion(Motion::Right);
        }
        let frame = editor.frame(1..10);
        assert_eq!(frame.mode, Mode::Visual);
        assert_eq!(
            frame.lines.iter().map(|l| l.text.as_str()).collect::<Vec<_>>(),
            vec!["two", "three"]
        );
        assert_eq!(frame.lines[0].start, 4);
        assert_eq!(frame.cursors.len(), 1);
        assert!(frame.cursors[0].primary);
        assert_eq!(frame.cursors[0].pos, 5);
        assert_eq!(frame.highlights_of(HighlightKind::Selection), vec![4..6]);
        assert_eq!(frame.status(), "-- VISUAL --");
    }

    #[test]
    fn frame_shows_prompt() {
        let mut editor = editor("abc");
        editor.open_prompt(PromptKind::Find { regex: false });
        editor.context().insert_key(Key::Char('b'));
        editor.refresh_preview();
        let frame = editor.frame(0..1);
        assert_eq!(frame.prompt.as_deref(), Some("/b"));
        assert_eq!(frame.highlights_of(HighlightKind::Match), vec![1..2]);
    }

    #[test]
    fn open_missing_file_is_empty() {
        let path = env::temp_dir().join("modal-editor-test-missing-file");
        let _ = fs::remove_file(&path);
        let mut editor = editor("stale");
        let found = editor.open(&path.display().to_string()).unwrap();
        assert!(!found);
        assert!(editor.doc().is_empty());
    }

    #[test]
    fn save_then_open() {
        let path = env::temp_dir().join("modal-editor-test-save");
        let path = path.display().to_string();
        let mut editor = editor("hello\nworld");
        editor.set_path(&path);
        editor.context().insert_key(Key::Char('!'));
        assert_eq!(editor.frame(0..0).status(), "-- NORMAL -- [+]");
        editor.save().unwrap();
        assert_eq!(editor.frame(0..0).status(), format!("-- NORMAL -- {path}: written"));

        let mut other = Editor::new(Configuration::default().to_ref());
        assert!(other.open(&path).unwrap());
        assert_eq!(other.doc().text(), "!hello\nworld");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn save_without_path() {
        let mut editor = editor("x");
        editor.save().unwrap();
        assert_eq!(editor.message(), Some("no file name"));
    }
}
