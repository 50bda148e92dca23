// Pluggable translation backends
//
// - Google: keyless web translation endpoint
// - Ollama: local LLM with a JSON-constrained prompt
//
// Backends are fallible. `SafeTranslator` sits in front of them and is the
// only thing the script rewriter talks to.

pub mod google;
pub mod ollama;
pub mod safe;

use async_trait::async_trait;
use std::time::Duration;
use reqwest::Client;

pub use safe::SafeTranslator;
use crate::config::{TranslateConfig, TranslationBackend};
use crate::error::{Result, RpyError};
use crate::language::TargetLanguage;

/// A machine translation service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target`
    async fn translate(&self, text: &str, target: TargetLanguage) -> Result<String>;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create a translator based on the configured backend
    pub fn create_translator(config: &TranslateConfig) -> Result<Box<dyn Translator>> {
        let client = build_client(config.timeout_secs)?;

        let translator: Box<dyn Translator> = match config.backend {
            TranslationBackend::Google => Box::new(google::GoogleTranslator::new(
                client,
                config.endpoint().to_string(),
                config.source_language.clone(),
            )),
            TranslationBackend::Ollama => Box::new(ollama::OllamaTranslator::new(
                client,
                config.endpoint().to_string(),
                config.model.clone(),
            )),
        };

        Ok(translator)
    }

    /// Fail early when the configured backend cannot serve requests
    pub async fn check_availability(config: &TranslateConfig) -> Result<()> {
        match config.backend {
            // The web endpoint has no health check; failures surface per line.
            TranslationBackend::Google => Ok(()),
            TranslationBackend::Ollama => {
                let client = build_client(config.timeout_secs)?;
                ollama::OllamaTranslator::new(client, config.endpoint().to_string(), config.model.clone())
                    .check_availability()
                    .await
            }
        }
    }
}

fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(concat!("rpy-translate/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| RpyError::Config(format!("Failed to create HTTP client: {}", e)))
}
