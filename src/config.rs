use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, RpyError};
use crate::language::TargetLanguage;

/// File name picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "rpy-translate.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub translate: TranslateConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Translation backend to use
    pub backend: TranslationBackend,
    /// Base URL of the translation service, defaults per backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// LLM model to use (ollama backend only)
    pub model: String,
    /// Source language code, `auto` lets the service detect it
    pub source_language: String,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
    /// Extra attempts after a failed translation
    pub max_retries: u32,
    /// Delay between attempts in milliseconds
    pub retry_delay_ms: u64,
    /// Translate identical strings only once per run
    pub cache: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationBackend {
    /// Google web translation endpoint, no API key required
    Google,
    /// Local LLM served by Ollama
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root for single-file output and the per-language batch directories
    pub directory: PathBuf,
    /// Language used when none is given on the command line
    pub default_language: TargetLanguage,
}

impl TranslationBackend {
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Google => "https://translate.googleapis.com",
            Self::Ollama => "http://localhost:11434",
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            backend: TranslationBackend::Google,
            endpoint: None,
            model: "llama3.2:3b".to_string(),
            source_language: "auto".to_string(),
            timeout_secs: 30,
            max_retries: 2,
            retry_delay_ms: 500,
            cache: true,
        }
    }
}

impl TranslateConfig {
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.backend.default_endpoint())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            default_language: TargetLanguage::French,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RpyError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| RpyError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RpyError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| RpyError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
