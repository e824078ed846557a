//! Runtime configuration for the bot
//!
//! Configuration is read from a JSON file whose path can be overridden
//! through the environment. Missing or invalid files never stop the bot:
//! it falls back to the built-in defaults and logs why.

use std::{
    env,
    ffi::OsString,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    constants::{
        command::RANDOM_FLAG,
        roster::DEFAULT_CAPACITY,
        teams::{DEFAULT_MATCH_COUNT, MATCH_SIZE, MAX_MATCH_COUNT, MIN_MATCH_COUNT},
    },
    teams::MatchCount,
};

/// Default location on disk of the JSON configuration
const DEFAULT_CONFIG_PATH: &str = "config/mokki.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`]
const CONFIG_PATH_ENV: &str = "MOKKI_CONFIG_PATH";

/// Errors that can occur while parsing a configuration file
#[derive(Error, Debug)]
pub enum Error {
    /// The file could not be read
    #[error("failed to read config")]
    Read(#[from] std::io::Error),
    /// The file is not valid configuration JSON
    #[error("failed to parse config")]
    Parse(#[from] serde_json::Error),
    /// A value is outside its accepted range
    #[error("invalid config: {0}")]
    Invalid(#[from] garde::Report),
}

/// Settings shared by every command handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Matches formed when the teams command has no count argument
    #[garde(range(min = MIN_MATCH_COUNT, max = MAX_MATCH_COUNT))]
    pub default_match_count: u8,
    /// Number of rows in the registration roster
    #[garde(range(min = MATCH_SIZE))]
    pub roster_capacity: usize,
    /// Second argument of the teams command selecting random mode
    #[garde(length(min = 1))]
    pub random_flag: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_match_count: DEFAULT_MATCH_COUNT,
            roster_capacity: DEFAULT_CAPACITY,
            random_flag: RANDOM_FLAG.to_owned(),
        }
    }
}

impl Config {
    /// Loads the configuration from disk, falling back to defaults
    ///
    /// The file is read from `MOKKI_CONFIG_PATH` when set, otherwise from
    /// `config/mokki.json`.
    pub fn load() -> Self {
        Self::load_from(&resolve_config_path(env::var_os(CONFIG_PATH_ENV)))
    }

    /// Loads the configuration from `path`, falling back to defaults when the
    /// file is missing, unreadable or invalid
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded config");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %Error::from(err),
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parses and validates a JSON configuration document
    ///
    /// Fields left out take their default values.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` for malformed JSON or unknown fields and
    /// `Error::Invalid` for out-of-range values.
    pub fn from_json(contents: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Match count used when the teams command omits it
    pub fn default_match_count(&self) -> MatchCount {
        MatchCount::try_from(self.default_match_count).unwrap_or_default()
    }
}

fn resolve_config_path(overridden: Option<OsString>) -> PathBuf {
    overridden.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}
