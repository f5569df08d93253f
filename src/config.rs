//! Harness configuration.
//!
//! A single immutable [`Config`] is assembled from built-in defaults, an
//! optional `nasm-t.toml` file and command-line flags (highest precedence),
//! then handed by reference to every component.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::HarnessError;

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "nasm-t.toml";
/// Default directory holding test descriptors
pub const DEFAULT_DIRECTORY: &str = "./travis/test";
/// Default assembler executable
pub const DEFAULT_NASM: &str = "./nasm";

/// Resolved configuration for one harness invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root directory searched for `*.json` descriptors
    pub directory: PathBuf,
    /// Assembler under test
    pub nasm: PathBuf,
    /// Abort the remaining descriptors after the first hard failure
    pub stop_on_failure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            nasm: PathBuf::from(DEFAULT_NASM),
            stop_on_failure: true,
        }
    }
}

/// On-disk configuration, every key optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub directory: Option<PathBuf>,

    #[serde(default)]
    pub nasm: Option<PathBuf>,

    /// Default for `run --stop`
    #[serde(default)]
    pub stop: Option<bool>,
}

impl ConfigFile {
    /// Parse a configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load `explicit` if given, else `./nasm-t.toml` when it exists.
    ///
    /// An explicitly named file must exist; the implicit one is optional.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, HarnessError> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(CONFIG_FILE), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .map_err(|e| HarnessError::io("Failed to read", &path, e))?;
        let file = Self::parse(&content).map_err(|e| HarnessError::Config {
            path: path.clone(),
            message: e.to_string(),
        })?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(file)
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub directory: Option<PathBuf>,
    pub nasm: Option<PathBuf>,
    pub stop: Option<bool>,
}

impl Config {
    /// Layer the file and command-line overrides over the defaults
    pub fn resolve(file: ConfigFile, overrides: Overrides) -> Self {
        let defaults = Self::default();
        Self {
            directory: overrides
                .directory
                .or(file.directory)
                .unwrap_or(defaults.directory),
            nasm: overrides.nasm.or(file.nasm).unwrap_or(defaults.nasm),
            stop_on_failure: overrides
                .stop
                .or(file.stop)
                .unwrap_or(defaults.stop_on_failure),
        }
    }
}

/// Parse a `y`/`n` style answer as used by `--stop`
pub fn parse_yes_no(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Ok(true),
        "n" | "no" | "false" | "0" => Ok(false),
        other => Err(format!("expected \"y\" or \"n\", got {:?}", other)),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
