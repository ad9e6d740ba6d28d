//! Configuration management for claude-hooks.
//!
//! This module handles the optional `.claude/hooks-config.yaml` file which
//! stores project-specific settings for the hooks. Every field has a default,
//! so a missing file and an empty file behave the same.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file path relative to project root.
pub const CONFIG_FILE_PATH: &str = ".claude/hooks-config.yaml";

/// Default number of prompt characters kept in the event log.
pub const DEFAULT_PROMPT_LOG_LIMIT: usize = 100;

/// Project configuration for the hooks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HooksConfig {
    /// Log directory, relative to the project root unless absolute.
    /// None means `.claude/logs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// Write each hook's events to its own daily file instead of the
    /// combined daily file.
    #[serde(default)]
    pub separate_files: bool,

    /// Maximum number of prompt characters written to the event log.
    #[serde(default = "default_prompt_log_limit")]
    pub prompt_log_limit: usize,

    /// Case-insensitive substrings that cause a prompt to be blocked.
    #[serde(default = "default_sensitive_patterns")]
    pub sensitive_patterns: Vec<String>,

    /// Whether prompts are augmented with project context.
    #[serde(default = "default_true")]
    pub enhance_prompts: bool,

    /// Shell command words whose execution is recorded as sensitive.
    #[serde(default = "default_sensitive_commands")]
    pub sensitive_commands: Vec<String>,
}

const fn default_prompt_log_limit() -> usize {
    DEFAULT_PROMPT_LOG_LIMIT
}

const fn default_true() -> bool {
    true
}

fn default_sensitive_patterns() -> Vec<String> {
    ["api_key", "secret_key", "password", "token"].iter().map(ToString::to_string).collect()
}

fn default_sensitive_commands() -> Vec<String> {
    ["rm", "mv", "git", "curl", "wget", "ssh"].iter().map(ToString::to_string).collect()
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            separate_files: false,
            prompt_log_limit: default_prompt_log_limit(),
            sensitive_patterns: default_sensitive_patterns(),
            enhance_prompts: true,
            sensitive_commands: default_sensitive_commands(),
        }
    }
}

impl HooksConfig {
    /// Load config from a specific base directory, returning None if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(base_dir: &Path) -> Result<Option<Self>> {
        let config_path = Self::config_path(base_dir);
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)?;
        if content.trim().is_empty() {
            return Ok(Some(Self::default()));
        }
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(Some(config))
    }

    /// Load config, falling back to defaults.
    ///
    /// A config file that exists but cannot be parsed is reported in the
    /// returned warning rather than failing the hook.
    #[must_use]
    pub fn load_or_default(base_dir: &Path) -> (Self, Option<String>) {
        match Self::load_from(base_dir) {
            Ok(Some(config)) => (config, None),
            Ok(None) => (Self::default(), None),
            Err(e) => (
                Self::default(),
                Some(format!("Warning: Could not load {CONFIG_FILE_PATH}: {e}")),
            ),
        }
    }

    /// Save config to a specific base directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, base_dir: &Path) -> Result<()> {
        let config_path = Self::config_path(base_dir);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the config file path for a base directory.
    pub fn config_path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE_PATH)
    }
}

/// Ensure config exists in a specific directory, writing defaults if not.
///
/// Returns the config and whether it was newly created.
///
/// # Errors
///
/// Returns an error if config cannot be loaded or saved.
pub fn ensure_config_in(base_dir: &Path) -> Result<(HooksConfig, bool)> {
    if let Some(config) = HooksConfig::load_from(base_dir)? {
        return Ok((config, false));
    }

    let config = HooksConfig::default();
    config.save_to(base_dir)?;
    Ok((config, true))
}
