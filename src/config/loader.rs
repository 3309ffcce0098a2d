//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.dirdocs.toml` in the workspace root
//! 4. `~/.config/dirdocs/config.toml` (global defaults)
//! 5. Built-in defaults
//!
//! Every section is replaced wholesale when updated at runtime — the
//! orchestrator never mutates a config value in place.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::env::Env;
use crate::prompt::{DEFAULT_CHILD_TEMPLATE, DEFAULT_MAIN_TEMPLATE};
use crate::providers::{ModelInfo, ProviderName};

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ignore: IgnoreConfig,
    pub prompt: PromptConfig,
    pub provider: ProviderConfig,
    pub context: ContextConfig,
}

/// Folder exclusion rules: exact names plus wildcard patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    pub names: Vec<String>,
    pub patterns: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            names: [
                ".git",
                "node_modules",
                "target",
                "dist",
                "build",
                ".venv",
                "venv",
                "__pycache__",
                ".idea",
                ".vscode",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            patterns: Vec::new(),
        }
    }
}

/// Prompt templates with named placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Main template; must reference `{{folder_structure}}` and
    /// `{{child_context}}` to receive the assembled context.
    pub main_template: String,
    /// Per-child template; may reference `{{child_path}}` and
    /// `{{child_summary}}`.
    pub child_template: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            main_template: DEFAULT_MAIN_TEMPLATE.to_string(),
            child_template: DEFAULT_CHILD_TEMPLATE.to_string(),
        }
    }
}

/// LLM provider configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub name: ProviderName,
    /// Explicitly selected model id. There is no silent default: a folder
    /// cannot be generated without a resolved model.
    pub model: Option<String>,
    /// Ordered fallback preference, consulted when `model` is unset; the
    /// first entry present in the catalog wins.
    pub model_priority: Vec<String>,
    /// Model catalog advertised to the dashboard.
    pub models: Vec<ModelInfo>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("model_priority", &self.model_priority)
            .field("models", &self.models)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: ProviderName::Anthropic,
            model: None,
            model_priority: Vec::new(),
            models: Vec::new(),
            base_url: None,
            api_key: None,
        }
    }
}

/// Context assembly bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Maximum number of own files read per folder.
    pub max_files_per_folder: usize,
    /// Character cap per own file, truncation marker appended beyond it.
    pub max_chars_per_file: usize,
    /// Character cap per child summary.
    pub max_chars_per_child_summary: usize,
    /// Sample size of code files pulled from an undocumented child (one
    /// level only).
    pub undocumented_child_sample: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_files_per_folder: 10,
            max_chars_per_file: 4000,
            max_chars_per_child_summary: 2000,
            undocumented_child_sample: 3,
        }
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, workspace-local config, then applies
    /// environment variable overrides.
    pub fn load(workspace_root: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 3: workspace-local config
        if let Some(root) = workspace_root {
            let local_path = root.join(crate::constants::CONFIG_FILENAME);
            if local_path.exists() {
                let local = Self::load_file(&local_path)?;
                config.merge(local);
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(crate::constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one (other takes precedence for
    /// non-default values). Sections are replaced wholesale, never
    /// field-by-field spliced, so a partially-written section in a config
    /// file replaces the whole section.
    fn merge(&mut self, other: Config) {
        if other.ignore != IgnoreConfig::default() {
            self.ignore = other.ignore;
        }
        if other.prompt != PromptConfig::default() {
            self.prompt = other.prompt;
        }
        if other.context != ContextConfig::default() {
            self.context = other.context;
        }

        let default_provider = ProviderConfig::default();
        if other.provider.name != default_provider.name {
            self.provider.name = other.provider.name;
        }
        if other.provider.model.is_some() {
            self.provider.model = other.provider.model;
        }
        if !other.provider.model_priority.is_empty() {
            self.provider.model_priority = other.provider.model_priority;
        }
        if !other.provider.models.is_empty() {
            self.provider.models = other.provider.models;
        }
        if other.provider.base_url.is_some() {
            self.provider.base_url = other.provider.base_url;
        }
        if other.provider.api_key.is_some() {
            self.provider.api_key = other.provider.api_key;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Ok(val) = env.var(crate::constants::ENV_PROVIDER) {
            if let Ok(name) = val.parse::<ProviderName>() {
                self.provider.name = name;
            } else {
                eprintln!(
                    "Warning: ignoring invalid {} value: {val}",
                    crate::constants::ENV_PROVIDER
                );
            }
        }
        if let Ok(val) = env.var(crate::constants::ENV_MODEL) {
            self.provider.model = Some(val);
        }
        if let Ok(val) = env.var(crate::constants::ENV_BASE_URL) {
            self.provider.base_url = Some(val);
        }

        // Provider-specific API key resolution
        let api_key = env
            .var(crate::constants::ENV_API_KEY)
            .or_else(|_| env.var(self.provider.name.api_key_env_var()))
            .ok();
        if api_key.is_some() {
            self.provider.api_key = api_key;
        }
    }
}
