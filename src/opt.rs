//! Options parser.

use std::str::FromStr;

use crate::error::{Error, Result};

pub struct Options {
    pub help: bool,
    pub version: bool,
    pub tab_hard: Option<bool>,
    pub tab_size: Option<usize>,
    pub ops: bool,
    pub bindings: bool,
    pub key_names: bool,
    pub print: bool,
    pub config_path: Option<String>,

    /// Keys to replay, in the notation of key bindings.
    pub keys: Option<String>,
    pub keys_path: Option<String>,

    /// File to write the document to instead of saving it in place.
    pub output_path: Option<String>,
    pub file: Option<String>,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            help: false,
            version: false,
            tab_hard: None,
            tab_size: None,
            ops: false,
            bindings: false,
            key_names: false,
            print: false,
            config_path: None,
            keys: None,
            keys_path: None,
            output_path: None,
            file: None,
        }
    }
}

impl Options {
    pub fn parse<T>(args: T) -> Result<Options>
    where
        T: IntoIterator<Item = String>,
    {
        let mut opts = Options::default();
        let mut it = args.into_iter();
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--help" => opts.help = true,
                "--version" => opts.version = true,
                "--tab-hard" => opts.tab_hard = Some(true),
                "--tab-soft" => opts.tab_hard = Some(false),
                "--tab-size" => opts.tab_size = Some(parse_arg(&arg, it.next())?),
                "--ops" => opts.ops = true,
                "--bindings" => opts.bindings = true,
                "--key-names" => opts.key_names = true,
                "--print" => opts.print = true,
                "--config" => opts.config_path = Some(expect_value(&arg, it.next())?),
                "--keys" => opts.keys = Some(expect_value(&arg, it.next())?),
                "--keys-file" => opts.keys_path = Some(expect_value(&arg, it.next())?),
                "--output" => opts.output_path = Some(expect_value(&arg, it.next())?),
                arg if arg.starts_with("--") => return Err(Error::unexpected_arg(arg)),
                _ if opts.file.is_some() => return Err(Error::unexpected_arg(&arg)),
                _ => opts.file = Some(arg),
            }
        }
        Ok(opts)
    }
}

fn parse_arg<T>(arg: &str, next_arg: Option<String>) -> Result<T>
where
    T: FromStr,
{
    if let Some(value) = next_arg {
        value
            .parse::<T>()
            .map_err(|_| Error::invalid_value(arg, &value))
    } else {
        Err(Error::expected_value(arg))
    }
}

fn expect_value(arg: &str, next_arg: Option<String>) -> Result<String> {
    next_arg.ok_or_else(|| Error::expected_value(arg))
}
