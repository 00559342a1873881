//! Configuration types for the SER pipelines

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, SerError};
use crate::prompts::{self, PromptLanguage};

/// Default OpenAI-compatible endpoint (DashScope compatible mode)
pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";

/// Default chat model
pub const DEFAULT_MODEL: &str = "qwen3-omni-flash";

/// Environment variable consulted when no API key is configured
pub const DEFAULT_API_KEY_ENV: &str = "DASHSCOPE_API_KEY";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SerConfig {
    /// Completion endpoint and conversation settings
    pub llm: LlmSettings,

    /// System instruction selection
    pub prompts: PromptSettings,
}

/// Audio output sub-configuration forwarded to the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    pub voice: String,
    pub format: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            voice: "Cherry".to_string(),
            format: "wav".to_string(),
        }
    }
}

/// `stream_options` request field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamOptions {
    pub include_usage: bool,
}

/// Settings for one conversation client.
///
/// Everything here is fixed once a client is built; only the system prompt
/// and history capacity can be changed afterwards through the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// API key (prefer `api_key_env`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Base URL of the OpenAI-compatible API
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Requested output modalities (e.g. `["text"]`, `["text", "audio"]`)
    pub modalities: Vec<String>,

    /// Audio output configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioConfig>,

    /// Maximum retained turns, excluding the system turn. `None` keeps everything.
    pub max_history: Option<usize>,

    /// Transport-level request deadline
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Explicit `stream_options`; streaming requests default to `include_usage: true`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            modalities: vec!["text".to_string()],
            audio: None,
            max_history: Some(4),
            timeout: Duration::from_secs(60),
            stream_options: None,
        }
    }
}

impl LlmSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_history(mut self, max_history: Option<usize>) -> Self {
        self.max_history = max_history;
        self
    }

    pub fn with_audio(mut self, audio: AudioConfig) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Resolve the API key: the explicit field first, then the named
    /// environment variable. Empty values count as missing.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Some(key.clone());
        }
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
    }

    /// Like [`resolve_api_key`](Self::resolve_api_key) but fails with
    /// [`SerError::Authentication`].
    pub fn require_api_key(&self) -> Result<String> {
        self.resolve_api_key().ok_or_else(|| {
            SerError::Authentication(format!(
                "API key is not set (pass one explicitly or export {})",
                self.api_key_env
            ))
        })
    }
}

/// System instruction settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Language of the built-in prompts
    pub language: PromptLanguage,

    /// Override for the emotion recognition prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,

    /// Override for the gait generation prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gait: Option<String>,
}

impl PromptSettings {
    pub fn emotion_prompt(&self) -> String {
        self.emotion
            .clone()
            .unwrap_or_else(|| prompts::emotion_prompt(self.language).to_string())
    }

    pub fn gait_prompt(&self) -> String {
        self.gait
            .clone()
            .unwrap_or_else(|| prompts::gait_prompt(self.language).to_string())
    }
}

impl SerConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. `ser.toml` in the working directory
    /// 3. The file named by `SER_CONFIG_PATH`, if set
    /// 4. `SER_`-prefixed environment variables (`SER_LLM__MODEL=...`)
    pub fn load() -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let mut figment = Figment::from(Serialized::defaults(SerConfig::default()))
            .merge(Toml::file("ser.toml"));

        if let Ok(path) = std::env::var("SER_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let config: SerConfig = figment
            .merge(Env::prefixed("SER_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific TOML file on top of the defaults.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Serialized, Toml},
        };

        let path = path.as_ref();
        if !path.exists() {
            return Err(SerError::Configuration(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        let config: SerConfig = Figment::from(Serialized::defaults(SerConfig::default()))
            .merge(Toml::file(path))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.llm.model.trim().is_empty() {
            return Err(SerError::Configuration("llm.model must not be empty".into()));
        }
        if self.llm.base_url.trim().is_empty() {
            return Err(SerError::Configuration(
                "llm.base_url must not be empty".into(),
            ));
        }
        if self.llm.max_history == Some(0) {
            return Err(SerError::Configuration(
                "llm.max_history must be at least 1 (omit it for unbounded history)".into(),
            ));
        }
        Ok(())
    }
}
