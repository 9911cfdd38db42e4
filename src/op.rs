//! Editing operations.
//!
//! A collection of functions intended to be associated with canonical names of
//! editing operations. These functions serve as the glue between a key sequence and
//! its respective action in the context of the editing experience.
//!
//! Motions and operators composed with motions or text objects are not named here,
//! since they are formed by [`Bindings`](crate::bind::Bindings) directly.

use crate::edit;
use crate::editor::{Editor, PromptKind};
use crate::mode::Mode;
use crate::nav;
use indexmap::IndexMap;

/// An action that reaches beyond the editor and must be carried out by its host.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Action {
    Save,
    Quit,
    SaveQuit,
}

/// Function type of editing operations.
pub type OpFn = fn(&mut Editor) -> Option<Action>;

/// Map of editing operation names to functions.
pub type OpMap = IndexMap<&'static str, OpFn>;

/// insert
fn insert(editor: &mut Editor) -> Option<Action> {
    editor.context().enter_insert();
    None
}

/// append
fn append(editor: &mut Editor) -> Option<Action> {
    let mut ctx = editor.context();
    ctx.enter_insert();
    ctx.move_each(|doc, c| nav::move_right(doc, c.pos, true));
    None
}

/// insert-line-start
fn insert_line_start(editor: &mut Editor) -> Option<Action> {
    let mut ctx = editor.context();
    ctx.move_each(|doc, c| nav::first_non_blank(doc, c.line));
    ctx.enter_insert();
    None
}

/// append-line-end
fn append_line_end(editor: &mut Editor) -> Option<Action> {
    let mut ctx = editor.context();
    ctx.move_each(|doc, c| doc.line_end(c.line));
    ctx.enter_insert();
    None
}

/// open-below
fn open_below(editor: &mut Editor) -> Option<Action> {
    let mut ctx = editor.context();
    edit::open_line_below(ctx.doc, ctx.cursors, ctx.settings);
    ctx.enter_insert();
    None
}

/// open-above
fn open_above(editor: &mut Editor) -> Option<Action> {
    let mut ctx = editor.context();
    edit::open_line_above(ctx.doc, ctx.cursors, ctx.settings);
    ctx.enter_insert();
    None
}

/// delete-char
fn delete_char(editor: &mut Editor) -> Option<Action> {
    let mut ctx = editor.context();
    edit::delete_under_cursor(ctx.doc, ctx.cursors);
    ctx.normalize();
    None
}

/// delete-char-before
fn delete_char_before(editor: &mut Editor) -> Option<Action> {
    editor.context().delete_char_before();
    None
}

/// substitute-char
fn substitute_char(editor: &mut Editor) -> Option<Action> {
    let mut ctx = editor.context();
    edit::delete_under_cursor(ctx.doc, ctx.cursors);
    ctx.enter_insert();
    None
}

/// delete-line
fn delete_line(editor: &mut Editor) -> Option<Action> {
    let mut ctx = editor.context();
    edit::delete_line(ctx.doc, ctx.cursors);
    ctx.normalize();
    None
}

/// change-line
fn change_line(editor: &mut Editor) -> Option<Action> {
    let mut ctx = editor.context();
    edit::change_line(ctx.doc, ctx.cursors, ctx.settings);
    ctx.enter_insert();
    None
}

/// delete-to-end
fn delete_to_end(editor: &mut Editor) -> Option<Action> {
    let mut ctx = editor.context();
    edit::delete_to_line_end(ctx.doc, ctx.cursors);
    ctx.normalize();
    None
}

/// change-to-end
fn change_to_end(editor: &mut Editor) -> Option<Action> {
    let mut ctx = editor.context();
    edit::delete_to_line_end(ctx.doc, ctx.cursors);
    ctx.enter_insert();
    None
}

/// join-lines
fn join_lines(editor: &mut Editor) -> Option<Action> {
    let mut ctx = editor.context();
    edit::join_lines(ctx.doc, ctx.cursors);
    ctx.normalize();
    None
}

/// visual
fn visual(editor: &mut Editor) -> Option<Action> {
    editor.context().toggle_visual(Mode::Visual);
    None
}

/// visual-line
fn visual_line(editor: &mut Editor) -> Option<Action> {
    editor.context().toggle_visual(Mode::VisualLine);
    None
}

/// visual-block
fn visual_block(editor: &mut Editor) -> Option<Action> {
    editor.context().toggle_visual(Mode::VisualBlock);
    None
}

/// command
fn command(editor: &mut Editor) -> Option<Action> {
    editor.open_prompt(PromptKind::Command);
    None
}

/// search
fn search(editor: &mut Editor) -> Option<Action> {
    editor.open_prompt(PromptKind::Find { regex: false });
    None
}

/// next-match
fn next_match(editor: &mut Editor) -> Option<Action> {
    editor.step_match(true);
    None
}

/// prev-match
fn prev_match(editor: &mut Editor) -> Option<Action> {
    editor.step_match(false);
    None
}

/// add-cursor-above
fn add_cursor_above(editor: &mut Editor) -> Option<Action> {
    editor.context().add_cursor(false);
    None
}

/// add-cursor-below
fn add_cursor_below(editor: &mut Editor) -> Option<Action> {
    editor.context().add_cursor(true);
    None
}

/// delete-selection
fn delete_selection(editor: &mut Editor) -> Option<Action> {
    editor.context().delete_selection();
    None
}

/// change-selection
fn change_selection(editor: &mut Editor) -> Option<Action> {
    editor.context().change_selection();
    None
}

/// swap-anchor
fn swap_anchor(editor: &mut Editor) -> Option<Action> {
    editor.context().swap_anchor();
    None
}

/// block-insert
fn block_insert(editor: &mut Editor) -> Option<Action> {
    editor.context().block_insert(false);
    None
}

/// block-append
fn block_append(editor: &mut Editor) -> Option<Action> {
    editor.context().block_insert(true);
    None
}

/// save
fn save(_: &mut Editor) -> Option<Action> {
    Some(Action::Save)
}

/// quit
fn quit(_: &mut Editor) -> Option<Action> {
    Some(Action::Quit)
}

/// save-and-quit
fn save_and_quit(_: &mut Editor) -> Option<Action> {
    Some(Action::SaveQuit)
}

/// Predefined mapping of editing operations to functions, with a description of
/// each.
pub const OP_MAPPINGS: [(&str, OpFn, &str); 31] = [
    ("insert", insert, "insert before the cursor"),
    ("append", append, "insert after the cursor"),
    ("insert-line-start", insert_line_start, "insert before the first non-blank character"),
    ("append-line-end", append_line_end, "insert at the end of the line"),
    ("open-below", open_below, "open a new line below and insert"),
    ("open-above", open_above, "open a new line above and insert"),
    ("delete-char", delete_char, "delete the character under the cursor"),
    ("delete-char-before", delete_char_before, "delete the character before the cursor"),
    ("substitute-char", substitute_char, "delete the character under the cursor and insert"),
    ("delete-line", delete_line, "delete the line"),
    ("change-line", change_line, "clear the line and insert"),
    ("delete-to-end", delete_to_end, "delete to the end of the line"),
    ("change-to-end", change_to_end, "delete to the end of the line and insert"),
    ("join-lines", join_lines, "join the line with the next"),
    ("visual", visual, "toggle character selection"),
    ("visual-line", visual_line, "toggle line selection"),
    ("visual-block", visual_block, "toggle block selection"),
    ("command", command, "open the command line"),
    ("search", search, "search for text"),
    ("next-match", next_match, "move to the next match of the last search"),
    ("prev-match", prev_match, "move to the previous match of the last search"),
    ("add-cursor-above", add_cursor_above, "add a cursor on the line above"),
    ("add-cursor-below", add_cursor_below, "add a cursor on the line below"),
    ("delete-selection", delete_selection, "delete the selection"),
    ("change-selection", change_selection, "delete the selection and insert"),
    ("swap-anchor", swap_anchor, "move to the other end of the selection"),
    ("block-insert", block_insert, "insert before the selection on every line"),
    ("block-append", block_append, "insert after the selection on every line"),
    ("save", save, "write the file"),
    ("quit", quit, "quit"),
    ("save-and-quit", save_and_quit, "write the file and quit"),
];

pub fn init_op_map() -> OpMap {
    let mut op_map = OpMap::new();
    for (op, op_fn, _) in OP_MAPPINGS {
        op_map.insert(op, op_fn);
    }
    op_map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;

    fn editor(text: &str, pos: usize) -> Editor {
        let mut editor = Editor::with_text(Configuration::default().to_ref(), text);
        let mut ctx = editor.context();
        ctx.move_each(|_, _| pos);
        editor
    }

    #[test]
    fn names_are_unique() {
        assert_eq!(init_op_map().len(), OP_MAPPINGS.len());
    }

    #[test]
    fn append_places_cursor_after() {
        let mut editor = editor("ab", 1);
        append(&mut editor);
        assert_eq!(editor.mode(), Mode::Insert);
        assert_eq!(editor.cursors().primary().pos, 2);
    }

    #[test]
    fn line_start_and_end() {
        let mut editor = editor("  ab\ncd", 3);
        insert_line_start(&mut editor);
        assert_eq!(editor.cursors().primary().pos, 2);
        editor.escape();
        append_line_end(&mut editor);
        assert_eq!(editor.cursors().primary().pos, 4);
    }

    #[test]
    fn change_to_end_leaves_cursor_past_line() {
        let mut editor = editor("abc\nd", 1);
        change_to_end(&mut editor);
        assert_eq!(editor.doc().text(), "a\nd");
        assert_eq!(editor.cursors().primary().pos, 1);
        assert_eq!(editor.mode(), Mode::Insert);
    }

    #[test]
    fn delete_to_end_rests_on_last_char() {
        let mut editor = editor("abc", 1);
        delete_to_end(&mut editor);
        assert_eq!(editor.doc().text(), "a");
        assert_eq!(editor.cursors().primary().pos, 0);
    }

    #[test]
    fn visual_toggles() {
        let mut editor = editor("abc", 0);
        visual(&mut editor);
        assert_eq!(editor.mode(), Mode::Visual);
        visual_line(&mut editor);
        assert_eq!(editor.mode(), Mode::VisualLine);
        visual_line(&mut editor);
        assert_eq!(editor.mode(), Mode::Normal);
    }

    #[test]
    fn actions() {
        let mut editor = editor("", 0);
        assert_eq!(save(&mut editor), Some(Action::Save));
        assert_eq!(quit(&mut editor), Some(Action::Quit));
        assert_eq!(save_and_quit(&mut editor), Some(Action::SaveQuit));
    }
}
