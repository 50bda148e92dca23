use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::error::{Result, RpyError};
use crate::language::TargetLanguage;
use super::Translator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    pub text: String,
}

/// Translation through a local Ollama model
pub struct OllamaTranslator {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaTranslator {
    pub fn new(client: Client, endpoint: String, model: String) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model,
        }
    }

    /// Check that Ollama is reachable and the model is pulled
    pub async fn check_availability(&self) -> Result<()> {
        let url = format!("{}/api/show", self.endpoint);

        let response = self.client
            .post(&url)
            .json(&json!({ "name": self.model }))
            .send()
            .await
            .map_err(|e| RpyError::Translation(format!("Failed to connect to Ollama: {}", e)))?;

        if response.status().is_success() {
            info!("Ollama model '{}' is available", self.model);
            Ok(())
        } else {
            Err(RpyError::Translation(format!(
                "Ollama model '{}' not found. Please pull the model first: ollama pull {}",
                self.model, self.model
            )))
        }
    }

    fn build_prompt(text: &str, target: TargetLanguage) -> String {
        let language_name = target.english_name();
        format!(
            "You are a professional translator working on visual novel dialogue.\n\
             \n\
             CRITICAL: You must translate the text to {} ONLY. Do not translate to any other language.\n\
             The target language is: {} (language code: {})\n\
             Keep Ren'Py text tags such as {{i}} and {{/i}} untouched.\n\
             \n\
             Return ONLY the translation in JSON format as {{\"text\":\"your {} translation here\"}}.\n\
             Do not include any explanations, alternatives, or text in other languages.\n\
             \n\
             Text to translate: \"{}\"\n",
            language_name, language_name, target.code(), language_name, text
        )
    }

    /// Extract the translation from the model output
    pub fn parse_generated(raw: &str) -> Result<String> {
        let raw = raw.trim();

        if raw.is_empty() {
            return Err(RpyError::Translation("Empty translation received".to_string()));
        }

        if let Ok(result) = serde_json::from_str::<TranslationResult>(raw) {
            return Ok(result.text.trim().to_string());
        }

        // Models sometimes answer with prose around the translation; keep the
        // first line that looks like content.
        let cleaned = raw
            .lines()
            .map(str::trim)
            .find(|line| {
                !line.is_empty()
                    && !line.starts_with("Here is")
                    && !line.starts_with("Translation:")
                    && !(line.starts_with("**") && line.ends_with("**"))
            })
            .unwrap_or(raw);

        Ok(cleaned.to_string())
    }
}

#[async_trait]
impl Translator for OllamaTranslator {
    async fn translate(&self, text: &str, target: TargetLanguage) -> Result<String> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: Self::build_prompt(text, target),
            stream: false,
            format: "json".to_string(),
        };

        let url = format!("{}/api/generate", self.endpoint);

        debug!("Sending translation request to: {}", url);

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RpyError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RpyError::Translation(format!(
                "Ollama API error {}: {}", status, error_text
            )));
        }

        let generated: GenerateResponse = response.json().await
            .map_err(|e| RpyError::Translation(format!("Failed to parse response: {}", e)))?;

        debug!("Raw Ollama response: {}", generated.response);

        Self::parse_generated(&generated.response)
    }
}
