use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IoResultExt, Result};
use crate::ignore::{IgnoreSet, DEFAULT_IGNORES};

pub const DEFAULT_ROOT: &str = "/";
pub const DEFAULT_DB_PATH: &str = "/var/lib/pacman/";

/// which per-record comparisons to skip
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    pub skip_mode: bool,
    pub skip_uid: bool,
    pub skip_gid: bool,
    pub skip_md5: bool,
}

/// scan configuration, optionally read from a TOML file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// installation root to compare against
    pub root: PathBuf,
    /// pacman database directory
    pub db_path: PathBuf,
    /// include [`DEFAULT_IGNORES`] in the ignore set
    pub default_ignores: bool,
    /// extra ignore patterns, after the defaults
    pub ignore: Vec<String>,
    pub checks: CheckOptions,
}

impl Config {
    /// load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// compile the effective ignore patterns
    pub fn ignore_set(&self) -> Result<IgnoreSet> {
        let defaults = if self.default_ignores {
            DEFAULT_IGNORES
        } else {
            &[]
        };
        IgnoreSet::new(
            defaults
                .iter()
                .copied()
                .chain(self.ignore.iter().map(String::as_str)),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            default_ignores: true,
            ignore: vec![],
            checks: CheckOptions::default(),
        }
    }
}
