//! A modal text editing engine.
//!
//! Copyright 2024 David Edwards
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! you may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//! <https://www.apache.org/licenses/LICENSE-2.0>
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.
//!
//! The binary replays a sequence of keys against a file, as if typed by a user, and
//! optionally prints the resulting document. Logging is written to `stderr` and
//! controlled by the `MODAL_LOG` environment variable using the filter syntax of
//! `tracing-subscriber`, e.g. `MODAL_LOG=modal=debug`.
mod bind;
mod config;
mod control;
mod cursor;
mod delim;
mod document;
mod edit;
mod editor;
mod error;
mod etc;
mod help;
mod io;
mod key;
mod mode;
mod nav;
mod op;
mod opt;
mod replace;
mod search;
mod sys;
mod view;

use crate::config::{Configuration, ConfigurationRef};
use crate::control::Controller;
use crate::editor::Editor;
use crate::error::Result;
use crate::key::Key;
use crate::opt::Options;
use std::io::Write;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Usage documentation for display to terminal.
const USAGE: &str = include_str!("include/usage.in");

// Version and build information.
const PACKAGE_NAME: &str = env!("CARGO_PKG_NAME");
const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");
const BUILD_HASH: &str = env!("BUILD_HASH");
const BUILD_DATE: &str = env!("BUILD_DATE");

/// Environment variable holding the logging filter.
const LOG_ENV: &str = "MODAL_LOG";

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Err(e) => {
            println!("{e}");
            ExitCode::from(1)
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run() -> Result<()> {
    let opts = Options::parse(std::env::args().skip(1))?;
    if opts.help {
        println!("{USAGE}");
        Ok(())
    } else if opts.version {
        println!("{PACKAGE_NAME} {PACKAGE_VERSION} ({BUILD_HASH} {BUILD_DATE})");
        Ok(())
    } else if opts.ops {
        print!("{}", help::ops_content());
        Ok(())
    } else if opts.key_names {
        print!("{}", help::keys_content());
        Ok(())
    } else {
        run_opts(&opts)
    }
}

fn run_opts(opts: &Options) -> Result<()> {
    // Load optional configuration from either standard location or path specified on
    // command line, and apply command line options afterwards since these override
    // all other settings.
    let mut config = if let Some(ref config_path) = opts.config_path {
        Configuration::load_file(config_path)?
    } else {
        Configuration::load()?
    };
    config.apply_opts(opts);

    if opts.bindings {
        print!("{}", help::bindings_content(&config.bindings));
        Ok(())
    } else {
        run_config(opts, config.to_ref())
    }
}

fn run_config(opts: &Options, config: ConfigurationRef) -> Result<()> {
    let mut editor = Editor::new(config);
    if let Some(ref file) = opts.file {
        editor.open(file)?;
    }
    if let Some(ref output_path) = opts.output_path {
        editor.set_path(output_path);
    }

    let keys = read_keys(opts)?;
    debug!(keys = keys.len(), "replaying keys");
    let mut controller = Controller::new(editor);
    let quit = controller.run(keys)?;
    debug!(quit, "keys replayed");

    let editor = controller.editor();
    if opts.print {
        print_document(&mut std::io::stdout().lock(), editor)?;
        eprintln!("{}", editor.frame(0..0).status());
    } else if let Some(message) = editor.message() {
        println!("{message}");
    }
    Ok(())
}

/// Writes the contents of the document to `out` exactly as they would be saved.
fn print_document<W>(out: &mut W, editor: &Editor) -> Result<()>
where
    W: Write,
{
    out.write_all(editor.doc().data())?;
    out.flush()?;
    Ok(())
}

/// Returns the keys given on the command line, or read from a file, in that order
/// of precedence.
fn read_keys(opts: &Options) -> Result<Vec<Key>> {
    if let Some(ref keys) = opts.keys {
        key::parse_keys(keys)
    } else if let Some(ref keys_path) = opts.keys_path {
        let bytes = io::read_file(keys_path)?;
        key::parse_keys(&String::from_utf8_lossy(&bytes))
    } else {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printed(bytes: &[u8]) -> Vec<u8> {
        let mut editor = Editor::new(Configuration::default().to_ref());
        editor.load(bytes.to_vec());
        let mut out = Vec::new();
        print_document(&mut out, &editor).unwrap();
        out
    }

    #[test]
    fn print_keeps_line_breaks() {
        assert_eq!(printed(b"ab\n"), b"ab\n");
        assert_eq!(printed(b"ab\ncd"), b"ab\ncd");
        assert_eq!(printed(b""), b"");
    }

    #[test]
    fn print_keeps_malformed_bytes() {
        assert_eq!(printed(b"a\xffb\n\xc3"), b"a\xffb\n\xc3");
    }
}
