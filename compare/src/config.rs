//! Configuration for comparison sessions.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ComparisonError, Result};

/// Top-level configuration, usually read from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Embedding model runtime.
    pub model: ModelConfig,

    /// How results are rendered.
    pub display: DisplayConfig,
}

impl ComparisonConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model configuration.
    pub fn with_model(mut self, config: ModelConfig) -> Self {
        self.model = config;
        self
    }

    /// Set the display configuration.
    pub fn with_display(mut self, config: DisplayConfig) -> Self {
        self.display = config;
        self
    }

    /// Location of the user's config file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("textsim").join("config.toml"))
    }

    /// Read a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)
            .map_err(|err| ComparisonError::Config(format!("{}: {err}", path.display())))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Read the config file at [`Self::default_path`], falling back to
    /// defaults when it does not exist.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }
}

/// Configuration for the embedding model runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Feature-extraction endpoint.
    pub endpoint: String,

    /// Model name forwarded to the runtime.
    pub model: Option<String>,

    /// Environment variable holding the bearer token.
    pub api_key_env: Option<String>,

    /// Per-request timeout.
    pub timeout_secs: u64,

    /// Text embedded once while loading; `None` skips the warm-up.
    pub warmup: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/embed".to_string(),
            model: None,
            api_key_env: None,
            timeout_secs: 30,
            warmup: Some("warmup".to_string()),
        }
    }
}

impl ModelConfig {
    /// Set the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Read the API key from the given environment variable.
    pub fn with_api_key_env(mut self, var: impl Into<String>) -> Self {
        self.api_key_env = Some(var.into());
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Skip the warm-up embed.
    pub fn without_warmup(mut self) -> Self {
        self.warmup = None;
        self
    }

    /// Resolve the API key, if one is configured.
    pub fn api_key(&self) -> Result<Option<String>> {
        match &self.api_key_env {
            None => Ok(None),
            Some(var) => std::env::var(var).map(Some).map_err(|_| {
                ComparisonError::Config(format!("environment variable {var} is not set"))
            }),
        }
    }
}

/// Configuration for rendering results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Number of leading vector components to show.
    pub preview_len: usize,

    /// Decimal places for vector components and the score.
    pub precision: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            preview_len: 8,
            precision: 4,
        }
    }
}
