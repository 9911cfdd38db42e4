//! Contains everything related to configuration.
//!
//! All default values for configurable aspects of the editor are defined in this
//! module, which includes *settings* and *key bindings*.
//!
//! At a minimum, [`Configuration::default()`] is sufficient for initializing the
//! editor. However, the normal process is to apply multiple tiers of configuration,
//! all optional, resulting in a final blended configuration.
//!
//! External configuration files are expected to be formatted according to the
//! [TOML specification](https://toml.io).
//!
//! The default method of loading an external configuration file via
//! [`Configuration::load()`] will try to locate files in the following locations in
//! order of precedence:
//!
//! * `$HOME/.modalrc`
//! * `$HOME/.modal/modalrc`
//! * `$HOME/.config/modal/modalrc`

use crate::bind::Bindings;
use crate::error::{Error, Result};
use crate::opt::Options;
use crate::sys::{self, AsString};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

/// A configuration representing all aspects of the editing experience.
pub struct Configuration {
    /// A collection of configurable settings that control the behavior of edits.
    pub settings: Settings,

    /// The key sequences recognized in each mode.
    pub bindings: Bindings,
}

pub type ConfigurationRef = Rc<Configuration>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Insert a hard tab rather than spaces.
    pub tab_hard: bool,

    /// Number of spaces in one level of indentation.
    pub tab_size: usize,

    /// Indent new lines like the line preceding them.
    pub auto_indent: bool,

    /// Distinguish case of ASCII letters when searching.
    pub case_strict: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ExternalConfiguration {
    settings: Option<ExternalSettings>,
    bindings: Option<IndexMap<String, String>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ExternalSettings {
    #[serde(rename = "tab-hard")]
    tab_hard: Option<bool>,

    #[serde(rename = "tab-size")]
    tab_size: Option<usize>,

    #[serde(rename = "auto-indent")]
    auto_indent: Option<bool>,

    #[serde(rename = "case-strict")]
    case_strict: Option<bool>,
}

impl Settings {
    /// Applies the external settings `ext` on top of `self`.
    fn apply(&mut self, ext: Option<ExternalSettings>) {
        if let Some(ext) = ext {
            self.tab_hard = ext.tab_hard.unwrap_or(self.tab_hard);
            self.tab_size = ext.tab_size.unwrap_or(self.tab_size);
            self.auto_indent = ext.auto_indent.unwrap_or(self.auto_indent);
            self.case_strict = ext.case_strict.unwrap_or(self.case_strict);
        }
    }

    /// Applies the relevant settings from `opts` on top of `self`.
    pub fn apply_opts(&mut self, opts: &Options) {
        self.tab_hard = opts.tab_hard.unwrap_or(self.tab_hard);
        self.tab_size = opts.tab_size.unwrap_or(self.tab_size);
    }
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            tab_hard: false,
            tab_size: 4,
            auto_indent: true,
            case_strict: true,
        }
    }
}

impl Configuration {
    /// A collection of resource files to try loading in order of precedence.
    const TRY_FILES: [&str; 3] = [".modalrc", ".modal/modalrc", ".config/modal/modalrc"];

    /// Returns a configuration that is formed by attempting to load a resource file
    /// from well-known locations.
    pub fn load() -> Result<Configuration> {
        let mut config = Configuration::default();
        let root_path = sys::home_dir();
        for try_path in Self::TRY_FILES {
            let path = root_path.join(try_path);
            if path.exists() {
                let ext = Self::read_file(&path)?;
                config.apply(ext)?;
                debug!(path = %path.as_string(), "configuration loaded");
                break;
            }
        }
        Ok(config)
    }

    /// Returns a configuration loaded from the resource file at `path`.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Configuration> {
        let mut config = Configuration::default();
        let ext = Self::read_file(path.as_ref())?;
        config.apply(ext)?;
        debug!(path = %path.as_ref().as_string(), "configuration loaded");
        Ok(config)
    }

    /// Returns a configuration parsed from `content`, which is expected to be in the
    /// same format as a resource file.
    pub fn parse(content: &str) -> Result<Configuration> {
        let mut config = Configuration::default();
        let ext = toml::from_str::<ExternalConfiguration>(content)
            .map_err(|e| Error::configuration("<inline>", &e))?;
        config.apply(ext)?;
        Ok(config)
    }

    /// Turns the configuration into a [`ConfigurationRef`].
    pub fn to_ref(self) -> ConfigurationRef {
        Rc::new(self)
    }

    /// Applies the relevant settings from `opts` on top of `self`.
    pub fn apply_opts(&mut self, opts: &Options) {
        self.settings.apply_opts(opts);
    }

    /// Applies the external configuration `ext` on top of `self`.
    fn apply(&mut self, ext: ExternalConfiguration) -> Result<()> {
        self.settings.apply(ext.settings);
        if let Some(bindings) = ext.bindings {
            for (key_seq, op) in bindings {
                self.bindings.bind(&key_seq, &op)?;
            }
        }
        Ok(())
    }

    fn read_file(path: &Path) -> Result<ExternalConfiguration> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(&path.as_string(), e))?;
        toml::from_str::<ExternalConfiguration>(&content)
            .map_err(|e| Error::configuration(&path.as_string(), &e))
    }
}

impl Default for Configuration {
    fn default() -> Configuration {
        Configuration {
            settings: Settings::default(),
            bindings: Bindings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{self, Key};
    use crate::mode::Mode;

    #[test]
    fn settings_from_file_content() {
        let config = Configuration::parse(
            r#"
            [settings]
            tab-hard = true
            tab-size = 2
            case-strict = false
            "#,
        )
        .unwrap();
        assert_eq!(
            config.settings,
            Settings {
                tab_hard: true,
                tab_size: 2,
                auto_indent: true,
                case_strict: false,
            }
        );
    }

    #[test]
    fn unknown_setting_rejected() {
        let e = Configuration::parse("[settings]\nspotlight = true\n");
        assert!(matches!(e, Err(Error::Configuration { .. })));
    }

    #[test]
    fn bindings_from_file_content() {
        let config = Configuration::parse("[bindings]\n\"<c-s>\" = \"save\"\n").unwrap();
        let keys = key::parse_keys("<c-s>").unwrap();
        let vocab = config.bindings.vocabulary(Mode::Normal).unwrap();
        assert!(vocab.find(&keys).is_some());
        assert!(vocab.find(&[Key::Char('i')]).is_some());
    }

    #[test]
    fn unknown_op_rejected() {
        let e = Configuration::parse("[bindings]\n\"Q\" = \"no-such-op\"\n");
        assert!(matches!(e, Err(Error::InvalidOp { .. })));
    }

    #[test]
    fn options_override_settings() {
        let opts = Options::parse(vec!["--tab-hard".to_string()]).unwrap();
        let mut config = Configuration::default();
        config.apply_opts(&opts);
        assert!(config.settings.tab_hard);
        assert_eq!(config.settings.tab_size, 4);
    }
}
