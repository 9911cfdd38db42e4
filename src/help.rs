//! A collection of functions related to help.

#![allow(unused_must_use, reason = "infallible calls to write!()")]

use crate::bind::Bindings;
use crate::key::{self, KeySeq};
use crate::mode::Mode;
use crate::op::OP_MAPPINGS;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Modes whose bindings are listed, along with the heading of each list.
const BINDING_MODES: [(Mode, &str); 3] = [
    (Mode::Normal, "normal"),
    (Mode::Visual, "visual"),
    (Mode::CommandNormal, "command-normal"),
];

/// Returns a formatted list of editing operations and their descriptions.
pub fn ops_content() -> String {
    const HEADER_OP: &str = "[Operation]";
    const HEADER_DESC: &str = "[Description]";

    // Calculate maximum width of operation names to align output.
    let op_width = OP_MAPPINGS
        .iter()
        .map(|(op, _, _)| op.len())
        .max()
        .unwrap_or(0)
        .max(HEADER_OP.len());

    let mut out = String::new();
    writeln!(out, "{HEADER_OP:<op_width$}   {HEADER_DESC}");
    for (op, _, desc) in OP_MAPPINGS {
        writeln!(out, "{op:<op_width$}   {desc}");
    }
    out
}

/// Returns a formatted list of key bindings, grouped by mode.
pub fn bindings_content(bindings: &Bindings) -> String {
    const HEADER_KEY: &str = "[Key]";
    const HEADER_COMMAND: &str = "[Command]";

    let mut out = String::new();
    for (mode, heading) in BINDING_MODES {
        let Some(vocab) = bindings.vocabulary(mode) else {
            continue;
        };
        let entries = vocab
            .iter()
            .map(|(keys, command)| (KeySeq(keys).to_string(), command.to_string()))
            .collect::<Vec<_>>();

        // Calculate maximum width of key sequences to align output.
        let key_width = entries
            .iter()
            .map(|(k, _)| k.len())
            .max()
            .unwrap_or(0)
            .max(HEADER_KEY.len());

        if !out.is_empty() {
            writeln!(out);
        }
        writeln!(out, "{heading}:");
        writeln!(out, "{HEADER_KEY:<key_width$}   {HEADER_COMMAND}");
        for (key_seq, command) in entries {
            writeln!(out, "{key_seq:<key_width$}   {command}");
        }
    }
    out
}

/// Returns a sorted list of key names recognized in key notation.
pub fn keys_content() -> String {
    let keys = key::init_key_map()
        .into_iter()
        .map(|(name, key)| (format!("<{name}>"), key))
        .collect::<BTreeMap<_, _>>();
    let mut out = String::new();
    for (name, key) in keys {
        writeln!(out, "{name:<10}   {key:?}");
    }
    out
}
