// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Multi-source configuration.
//!
//! A settings struct whose fields are all `Option<T>` can be populated from,
//! in increasing order of priority:
//!
//!   1. its `Default` implementation (every field `Some`),
//!   2. a TOML file named with `--conf-file`,
//!   3. environment variables prefixed with [`MultiSourceConfig::ENV_PREFIX`],
//!   4. command-line arguments.
//!
//! The struct derives [`clap::Parser`], [`serde::Serialize`] and
//! [`serde::Deserialize`]; the [`multi_source_config!`] macro then provides
//! the per-field merge functions.
//!
//! ```rust
//! use std::path::PathBuf;
//!
//! use bmac_config::{MultiSourceConfig, multi_source_config};
//! use clap::Parser;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Parser, Serialize, Deserialize)]
//! struct Settings {
//!     /// Number of banks
//!     #[arg(long)]
//!     banks: Option<usize>,
//!
//!     /// Path to additional configuration file
//!     #[arg(long)]
//!     #[serde(skip)]
//!     conf_file: Option<PathBuf>,
//! }
//!
//! impl Default for Settings {
//!     fn default() -> Self {
//!         Self {
//!             banks: Some(16),
//!             conf_file: None,
//!         }
//!     }
//! }
//!
//! multi_source_config!(Settings ; conf_file ; banks);
//!
//! let settings = Settings::parse_sources_from(["doc", "--banks", "4"]).unwrap();
//! assert_eq!(settings.banks, Some(4));
//! ```

use std::error::Error;
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::Path;

use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Reasons a configuration could not be assembled.
#[derive(Debug)]
pub enum ConfigError {
    /// A configuration file is missing or is not a file.
    Io(io::Error),

    /// A source held a value of the wrong type.
    Figment(Box<figment::Error>),

    /// The command line could not be parsed (this includes `--help`).
    Clap(clap::Error),
}

impl ConfigError {
    /// The kind of the underlying I/O error, if there is one.
    #[must_use]
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            ConfigError::Io(e) => Some(e.kind()),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration file error: {e}"),
            ConfigError::Figment(e) => write!(f, "Configuration error: {e}"),
            ConfigError::Clap(e) => write!(f, "{e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Figment(e) => Some(&**e),
            ConfigError::Clap(e) => Some(e),
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Figment(Box::new(e))
    }
}

impl From<clap::Error> for ConfigError {
    fn from(e: clap::Error) -> Self {
        ConfigError::Clap(e)
    }
}

/// Check `conf_file` names an existing regular file.
pub fn check_conf_file(conf_file: &Path) -> Result<(), io::Error> {
    if conf_file.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::IsADirectory,
            format!("{} is not a file path", conf_file.display()),
        ));
    }
    if !conf_file.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} not found", conf_file.display()),
        ));
    }
    Ok(())
}

pub trait MultiSourceConfig: Default + Parser + Serialize + DeserializeOwned {
    /// Prefix of the environment variables that override settings, so that
    /// `BMAC_BANKS=4` sets the `banks` field.
    const ENV_PREFIX: &'static str = "BMAC_";

    /// The configuration file requested on the command line, if any.
    fn conf_file(&self) -> Option<&Path>;

    /// Take every field that is `Some` in `cli`.
    fn merge_cli(&mut self, cli: Self);

    /// Take every field of `layered` that differs from the default.
    fn merge_changed(&mut self, layered: Self);

    fn figment_with_defaults() -> Figment {
        Figment::new().merge(Serialized::defaults(Self::default()))
    }

    fn figment_conf_file_merge(figment: Figment, conf_file: &Path) -> Figment {
        figment.merge(Toml::file(conf_file))
    }

    fn figment_env_var_merge(figment: Figment) -> Figment {
        figment.merge(Env::prefixed(Self::ENV_PREFIX))
    }

    fn figment_extract(figment: Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }

    /// Build the configuration from the process arguments and environment.
    fn parse_all_sources() -> Result<Self, ConfigError> {
        Self::parse_sources_from(std::env::args_os())
    }

    /// Build the configuration from explicit arguments (the first being the
    /// program name) and the environment.
    fn parse_sources_from<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = Self::try_parse_from(args)?;

        let mut figment = Self::figment_with_defaults();
        if let Some(conf_file) = cli.conf_file() {
            check_conf_file(conf_file)?;
            debug!("Reading configuration from {}", conf_file.display());
            figment = Self::figment_conf_file_merge(figment, conf_file);
        }
        figment = Self::figment_env_var_merge(figment);

        let mut config = Self::figment_extract(figment)?;
        config.merge_cli(cli);
        Ok(config)
    }

    /// Layer an additional TOML file over an existing configuration.
    ///
    /// Only values in the file that differ from the defaults are applied. An
    /// empty path is ignored.
    fn parse_extra_conf_file(&mut self, conf_file: &Path) -> Result<(), ConfigError> {
        if conf_file.as_os_str().is_empty() {
            return Ok(());
        }
        check_conf_file(conf_file)?;

        let figment = Self::figment_conf_file_merge(Self::figment_with_defaults(), conf_file);
        let layered = Self::figment_extract(figment)?;
        self.merge_changed(layered);
        Ok(())
    }
}

/// Implement [`MultiSourceConfig`] for a struct.
///
/// Takes the struct type, the field holding the optional configuration file
/// path and the list of fields that take part in merging.
#[macro_export]
macro_rules! multi_source_config {
    ($ty:ty ; $conf_file:ident ; $($field:ident),+ $(,)*) => {
        impl $crate::MultiSourceConfig for $ty {
            fn conf_file(&self) -> Option<&std::path::Path> {
                self.$conf_file.as_deref()
            }

            fn merge_cli(&mut self, cli: Self) {
                $(
                if cli.$field.is_some() {
                    self.$field = cli.$field;
                }
                )+
                if cli.$conf_file.is_some() {
                    self.$conf_file = cli.$conf_file;
                }
            }

            fn merge_changed(&mut self, layered: Self) {
                let defaults = <$ty>::default();
                $(
                if layered.$field != defaults.$field {
                    self.$field = layered.$field;
                }
                )+
            }
        }
    };
}
