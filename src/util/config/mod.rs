//! Lingxi configuration
//!
//! Project-level settings are read from `lingxi.toml`; every field has a
//! default, so an absent file or an empty table is valid.
//!
//! ```toml
//! [language]
//! version = "1.1"
//! api_version = "1.1"      # absent: API version requirements are not checked
//! compiler_version = "0.3.2"
//!
//! [checkers]
//! parallel = true
//! disabled = ["useless-use-site-target"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::frontend::checkers::CheckerConfig;
use crate::metadata::gate::{LanguageVersionSettings, COMPILER_VERSION, CURRENT_LANGUAGE_VERSION};
use crate::metadata::requirement::Version;

/// Project configuration file name
pub const CONFIG_FILE_NAME: &str = "lingxi.toml";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LingxiConfig {
    /// Language and toolchain versions
    #[serde(default)]
    pub language: LanguageConfig,
    /// Declaration checker settings
    #[serde(default)]
    pub checkers: CheckersConfig,
}

/// `[language]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Language version the consumer compiles against
    #[serde(default = "default_language_version")]
    pub version: Version,
    /// API version; `None` disables API version tracking
    #[serde(default)]
    pub api_version: Option<Version>,
    /// Compiler version compared against COMPILER_VERSION requirements
    #[serde(default = "default_compiler_version")]
    pub compiler_version: Version,
}

fn default_language_version() -> Version {
    CURRENT_LANGUAGE_VERSION
}

fn default_compiler_version() -> Version {
    *COMPILER_VERSION
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            version: default_language_version(),
            api_version: None,
            compiler_version: default_compiler_version(),
        }
    }
}

/// `[checkers]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckersConfig {
    /// Run checkers in parallel across declarations
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Checker names to skip
    #[serde(default)]
    pub disabled: Vec<String>,
}

fn default_parallel() -> bool {
    true
}

impl Default for CheckersConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            disabled: Vec::new(),
        }
    }
}

impl LingxiConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize configuration to TOML text
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Version settings for gating library declarations
    pub fn language_settings(&self) -> LanguageVersionSettings {
        let settings = LanguageVersionSettings::new(self.language.version)
            .with_compiler_version(self.language.compiler_version);
        match self.language.api_version {
            Some(api_version) => settings.with_api_version(api_version),
            None => settings,
        }
    }

    /// Settings for the checker registry
    pub fn checker_config(&self) -> CheckerConfig {
        CheckerConfig {
            parallel: self.checkers.parallel,
            disabled: self.checkers.disabled.clone(),
        }
    }
}

/// Load configuration from a file
pub fn load(path: &Path) -> Result<LingxiConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = LingxiConfig::from_toml(&content)?;
    debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Load `lingxi.toml` from `dir`, or defaults when the file does not exist
pub fn load_or_default(dir: &Path) -> Result<LingxiConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.is_file() {
        load(&path)
    } else {
        debug!(dir = %dir.display(), "no configuration file, using defaults");
        Ok(LingxiConfig::default())
    }
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
