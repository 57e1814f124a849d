//! Configuration management for importpick
//!
//! Settings come from a TOML file (every section optional), then
//! `IMPORTPICK_SECTION__KEY` environment overrides, then validation.

use crate::error::{ImportPickError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

pub const SCHEMA_VERSION: &str = "1.0.0";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub search: SearchConfig,
    pub selector: SelectorConfig,
    pub ranking: RankingConfig,
    pub session: SessionConfig,
    pub project: ProjectConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
        }
    }
}

/// Text-search subprocess (ripgrep)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub program: String,
    /// Fixed flags passed before the glob, type exclusions, and pattern
    pub flags: Vec<String>,
    /// File extensions searched, without the dot
    pub extensions: Vec<String>,
    /// ripgrep file types excluded with `--type-not`
    pub exclude_types: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let flags = [
            "--column",
            "--no-filename",
            "-n",
            "--no-heading",
            "--color=never",
            "--smart-case",
            "--no-column",
            "--no-line-number",
        ];
        Self {
            program: "rg".to_string(),
            flags: flags.iter().map(|f| f.to_string()).collect(),
            extensions: ["ts", "tsx", "js", "jsx"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            exclude_types: vec!["lock".to_string()],
        }
    }
}

/// Fuzzy-selector subprocess (fzf)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub program: String,
    pub prompt: String,
    /// Display options passed ahead of `--prompt`
    pub options: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            program: "fzf".to_string(),
            prompt: "import> ".to_string(),
            options: ["--height=40%", "--layout=reverse", "--tiebreak=index"]
                .iter()
                .map(|o| o.to_string())
                .collect(),
        }
    }
}

/// Rank stage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub batch_size: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            batch_size: crate::ranking::DEFAULT_BATCH_SIZE,
        }
    }
}

/// Session lifecycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Time the search subprocess gets between SIGTERM and SIGKILL
    pub grace_period_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: 500,
        }
    }
}

/// Project-root discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub root_markers: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root_markers: ["package.json", "tsconfig.json", ".git"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ImportPickError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ImportPickError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Load from `path`, or the default location when `None`. A missing
    /// file yields the defaults (still subject to env overrides).
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if !path.exists() {
            tracing::debug!("Config file {:?} not found, using defaults", path);
            let mut config = Config::default();
            config.apply_env_overrides();
            ConfigValidator::validate(&config)?;
            return Ok(config);
        }

        Self::load(&path)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ImportPickError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: IMPORTPICK_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        let vars: Vec<(String, String)> = std::env::vars()
            .filter(|(key, _)| key.starts_with("IMPORTPICK_"))
            .collect();
        self.apply_overrides(vars);
    }

    fn apply_overrides(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix("IMPORTPICK_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "SEARCH__PROGRAM" => self.search.program = value.to_string(),
            "SELECTOR__PROGRAM" => self.selector.program = value.to_string(),
            "SELECTOR__PROMPT" => self.selector.prompt = value.to_string(),
            "RANKING__BATCH_SIZE" => {
                self.ranking.batch_size =
                    value
                        .parse()
                        .map_err(|_| ImportPickError::InvalidConfigValue {
                            path: path.to_string(),
                            message: format!("Cannot parse '{}' as an integer", value),
                        })?;
            }
            "SESSION__GRACE_PERIOD_MS" => {
                self.session.grace_period_ms =
                    value
                        .parse()
                        .map_err(|_| ImportPickError::InvalidConfigValue {
                            path: path.to_string(),
                            message: format!("Cannot parse '{}' as milliseconds", value),
                        })?;
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ImportPickError::Config("Cannot determine config directory".to_string())
        })?;

        Ok(config_dir.join("importpick").join("config.toml"))
    }
}
