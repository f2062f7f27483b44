//! Configuration management for raggate
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.raggate/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{EvalError, Result};
use crate::judge::JudgeSettings;
use crate::llm::DEFAULT_BASE_URL;
use crate::rag::{GeneratorSettings, StoreSettings};

/// Complete configuration for raggate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub llm: LlmConfig,
    pub judge: JudgeSettings,
    pub generator: GeneratorSettings,
    pub store: StoreSettings,
    pub paths: PathsConfig,
}

/// OpenAI-compatible endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
}

/// Default artifact locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub results: String,
    pub ablation_results: String,
    pub reliability_summary: String,
    pub pdf_dir: String,
    pub metrics: String,
    pub baseline: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            results: "evaluation/artifacts/results.jsonl".to_string(),
            ablation_results: "evaluation/artifacts/ablation_results.json".to_string(),
            reliability_summary: "evaluation/artifacts/reliability_summary.json".to_string(),
            pdf_dir: "data".to_string(),
            metrics: "metrics.jsonl".to_string(),
            baseline: "monitoring/baseline.json".to_string(),
        }
    }
}

impl EvalConfig {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            EvalError::ConfigError(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: EvalConfig = toml::from_str(&contents)
            .map_err(|e| EvalError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load from ~/.raggate/config.toml if present, else built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(EvalConfig::default())
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".raggate").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.llm.base_url.trim().is_empty() {
            return Err(EvalError::ConfigError("llm.base_url must not be empty".to_string()));
        }

        if self.llm.api_key_env.trim().is_empty() {
            return Err(EvalError::ConfigError(
                "llm.api_key_env must not be empty".to_string(),
            ));
        }

        if self.llm.timeout_secs == 0 {
            return Err(EvalError::ConfigError(
                "llm.timeout_secs must be greater than 0".to_string(),
            ));
        }

        for (name, temperature) in [
            ("judge.temperature", self.judge.temperature),
            ("generator.temperature", self.generator.temperature),
        ] {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(EvalError::ConfigError(format!(
                    "{} must be between 0.0 and 2.0",
                    name
                )));
            }
        }

        if self.judge.model.trim().is_empty() || self.generator.model.trim().is_empty() {
            return Err(EvalError::ConfigError("model names must not be empty".to_string()));
        }

        if self.store.url.trim().is_empty() {
            return Err(EvalError::ConfigError("store.url must not be empty".to_string()));
        }

        if self.store.batch_size == 0 {
            return Err(EvalError::ConfigError(
                "store.batch_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_secs)
    }
}
