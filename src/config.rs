use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::cli::LlmProvider;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_provider")]
    pub default_provider: String,
    pub default_model: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Where exports land when no explicit output path is given
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    pub openai: Option<ProviderConfig>,
    pub anthropic: Option<ProviderConfig>,
    pub ollama: Option<ProviderConfig>,
    pub google: Option<ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            default_model: None,
            max_tokens: default_max_tokens(),
            output_dir: None,
            providers: ProvidersConfig::default(),
        }
    }
}

impl Config {
    /// Get the configuration directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("article-analyzer");
        Ok(config_dir)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Configuration file not found at {}. Run 'article-analyzer init' first.",
                config_path.display()
            );
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file at {}", config_path.display()))
    }

    /// Load the config file if there is one, otherwise fall back to defaults
    /// so a run can be driven purely from environment variables.
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load()
        } else {
            tracing::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.expand_env_vars();
        Ok(config)
    }

    /// Expand environment variables in configuration values
    fn expand_env_vars(&mut self) {
        for provider in [
            &mut self.providers.openai,
            &mut self.providers.anthropic,
            &mut self.providers.ollama,
            &mut self.providers.google,
        ]
        .into_iter()
        .flatten()
        {
            provider.api_key = expand_env_var(&provider.api_key);
        }
    }

    /// Get provider configuration by name
    pub fn get_provider(&self, provider: LlmProvider) -> Option<&ProviderConfig> {
        match provider {
            LlmProvider::OpenAI => self.providers.openai.as_ref(),
            LlmProvider::Anthropic => self.providers.anthropic.as_ref(),
            LlmProvider::Ollama => self.providers.ollama.as_ref(),
            LlmProvider::Google => self.providers.google.as_ref(),
        }
    }

    /// Provider named by `default_provider`, falling back to OpenAI
    pub fn default_llm_provider(&self) -> LlmProvider {
        match self.default_provider.to_lowercase().as_str() {
            "anthropic" => LlmProvider::Anthropic,
            "ollama" => LlmProvider::Ollama,
            "google" => LlmProvider::Google,
            _ => LlmProvider::OpenAI,
        }
    }

    /// Resolve the API key for a provider: config file first, then the
    /// provider's conventional environment variable.
    pub fn api_key(&self, provider: LlmProvider) -> Option<String> {
        self.api_key_with(provider, |var| std::env::var(var).ok())
    }

    /// [`Config::api_key`] with the environment lookup supplied by the caller
    pub fn api_key_with<E>(&self, provider: LlmProvider, env: E) -> Option<String>
    where
        E: Fn(&str) -> Option<String>,
    {
        let from_config = self
            .get_provider(provider)
            .map(|p| p.api_key.trim().to_string())
            .filter(|k| !k.is_empty() && !k.starts_with("${"));

        from_config.or_else(|| {
            provider
                .env_vars()
                .iter()
                .filter_map(|var| env(var))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        })
    }

    /// Model for a provider: explicit override, provider config, global
    /// default, then the provider's built-in default.
    pub fn model_for(&self, provider: LlmProvider, model_override: Option<&str>) -> String {
        model_override
            .map(String::from)
            .or_else(|| self.get_provider(provider).and_then(|p| p.model.clone()))
            .or_else(|| self.default_model.clone())
            .unwrap_or_else(|| provider.default_model().to_string())
    }

    pub fn base_url(&self, provider: LlmProvider) -> Option<String> {
        self.get_provider(provider).and_then(|p| p.base_url.clone())
    }

    /// Export directory, defaulting to `output/` under the current directory
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("output"))
    }
}

/// Expand environment variable references like ${VAR_NAME}
fn expand_env_var(value: &str) -> String {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).unwrap_or_default()
    } else if let Some(var_name) = value.strip_prefix('$') {
        std::env::var(var_name).unwrap_or_default()
    } else {
        value.to_string()
    }
}
