//! Layered settings.
//!
//! Settings are split into one file per category. [`ExpandSettings`]
//! aggregates all categories and merges `call-expander.toml` files and
//! command-line overrides on top of the defaults.

pub(crate) mod compiler;
pub(crate) mod logging;
pub(crate) mod output;
pub(crate) mod search;

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

pub use compiler::{CompilerSettings, DEFAULT_CLANG};
use compiler::CompilerSettingsPatch;
use logging::LoggingSettingsPatch;
pub use logging::{LogLevel, LoggingSettings};
use output::OutputSettingsPatch;
pub use output::OutputSettings;
use search::SearchSettingsPatch;
pub use search::{DEFAULT_MAX_WALK_DEPTH, MAX_MAX_WALK_DEPTH, MIN_MAX_WALK_DEPTH, SearchSettings};
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILENAME: &str = "call-expander.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExpandSettings {
    pub search: SearchSettings,
    pub compiler: CompilerSettings,
    pub logging: LoggingSettings,
    pub output: OutputSettings,
}

/// Values given on the command line; they win over every file.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub max_walk_depth: Option<usize>,
    pub clang: Option<String>,
    pub extra_flags: Vec<String>,
    pub log_level: Option<LogLevel>,
    pub pretty: Option<bool>,
}

impl ExpandSettings {
    /// Read settings from a TOML file on top of the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::default().merged_with_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Settings for `source`: the nearest `call-expander.toml` above it, or
    /// the defaults when there is none.
    pub fn discover(source: &Path) -> Result<Self, ConfigError> {
        match find_config_toml(source) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn merged_with_toml(
        &self,
        content: &str,
    ) -> Result<Self, toml::de::Error> {
        let patch: ExpandSettingsPatch = toml::from_str(content)?;
        let mut merged = self.clone();
        merged.apply_patch(patch);
        merged.normalize();
        Ok(merged)
    }

    pub fn apply_overrides(
        &mut self,
        overrides: SettingsOverrides,
    ) {
        if let Some(v) = overrides.max_walk_depth {
            self.search.max_walk_depth = v;
        }
        if let Some(v) = overrides.clang {
            self.compiler.clang = v;
        }
        self.compiler.extra_flags.extend(overrides.extra_flags);
        if let Some(v) = overrides.log_level {
            self.logging.level = v;
        }
        if let Some(v) = overrides.pretty {
            self.output.pretty = v;
        }
        self.normalize();
    }

    fn apply_patch(
        &mut self,
        patch: ExpandSettingsPatch,
    ) {
        if let Some(p) = patch.search {
            self.search.apply_patch(p);
        }
        if let Some(p) = patch.compiler {
            self.compiler.apply_patch(p);
        }
        if let Some(p) = patch.logging {
            self.logging.apply_patch(p);
        }
        if let Some(p) = patch.output {
            self.output.apply_patch(p);
        }
    }

    fn normalize(&mut self) {
        self.search.normalize();
        self.compiler.normalize();
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "kebab-case")]
struct ExpandSettingsPatch {
    search: Option<SearchSettingsPatch>,
    compiler: Option<CompilerSettingsPatch>,
    logging: Option<LoggingSettingsPatch>,
    output: Option<OutputSettingsPatch>,
    #[serde(flatten)]
    _extra: HashMap<String, toml::Value>,
}

/// Walks parent directories from `start` looking for `call-expander.toml`.
pub fn find_config_toml(start: &Path) -> Option<PathBuf> {
    let mut dir = if start.is_file() {
        start.parent()?
    } else {
        start
    };
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

#[cfg(test)]
#[path = "../../tests/src/config/settings_tests.rs"]
mod tests;
