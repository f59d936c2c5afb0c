//! Configuration management
//!
//! Settings live in a TOML file under the platform config directory. Every
//! field has a default, so a missing file or a partial one is fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analytics::DEFAULT_MIN_ATTEMPTS;
use crate::session::{SessionConfig, DEFAULT_CHALLENGE_ITEM_COUNT};

/// Overrides `storage.database_path`
pub const ENV_DB_PATH: &str = "REFRAIN_DB_PATH";
/// Overrides `quiz.challenge_item_count`
pub const ENV_CHALLENGE_COUNT: &str = "REFRAIN_CHALLENGE_COUNT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefrainConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub quiz: QuizConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Library database; platform data directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Songs drawn for a Challenge session
    #[serde(default = "default_challenge_item_count")]
    pub challenge_item_count: usize,
    /// Seconds an excerpt plays before the round times out
    #[serde(default = "default_presentation_seconds")]
    pub presentation_seconds: u64,
}

fn default_challenge_item_count() -> usize {
    DEFAULT_CHALLENGE_ITEM_COUNT
}

fn default_presentation_seconds() -> u64 {
    15
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            challenge_item_count: default_challenge_item_count(),
            presentation_seconds: default_presentation_seconds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_problem_min_attempts")]
    pub problem_min_attempts: u32,
    #[serde(default = "default_problem_limit")]
    pub problem_limit: usize,
    #[serde(default = "default_mastery_window_days")]
    pub mastery_window_days: u32,
    #[serde(default = "default_history_days")]
    pub history_days: u32,
}

fn default_problem_min_attempts() -> u32 {
    DEFAULT_MIN_ATTEMPTS
}

fn default_problem_limit() -> usize {
    10
}

fn default_mastery_window_days() -> u32 {
    30
}

fn default_history_days() -> u32 {
    14
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            problem_min_attempts: default_problem_min_attempts(),
            problem_limit: default_problem_limit(),
            mastery_window_days: default_mastery_window_days(),
            history_days: default_history_days(),
        }
    }
}

impl RefrainConfig {
    /// Load from `path`, or the default location when `None`, then apply
    /// environment overrides and validate. A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path(),
        };

        let mut config = match path {
            Some(p) if p.exists() => {
                let contents = std::fs::read_to_string(&p)?;
                tracing::debug!("Loaded config from {}", p.display());
                toml::from_str(&contents)?
            }
            _ => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Write pretty TOML to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// [`RefrainConfig::load`])
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB_PATH).filter(|v| !v.is_empty()) {
            self.storage.database_path = Some(PathBuf::from(path));
        }
        if let Some(count) = lookup(ENV_CHALLENGE_COUNT) {
            self.quiz.challenge_item_count = count.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{} must be a positive integer, got '{}'", ENV_CHALLENGE_COUNT, count))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quiz.challenge_item_count == 0 {
            return Err(ConfigError::Invalid(
                "quiz.challenge_item_count must be at least 1".to_string(),
            ));
        }
        if self.analytics.mastery_window_days == 0 {
            return Err(ConfigError::Invalid(
                "analytics.mastery_window_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            challenge_item_count: self.quiz.challenge_item_count,
        }
    }
}

/// `config.toml` in the platform config directory
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "refrain", "refrain")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
