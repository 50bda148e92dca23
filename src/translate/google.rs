use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, RpyError};
use crate::language::TargetLanguage;
use super::Translator;

/// Google's web translation endpoint (`client=gtx`), the one browser
/// extensions use. Needs no API key.
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
    source_language: String,
}

impl GoogleTranslator {
    pub fn new(client: Client, endpoint: String, source_language: String) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            source_language,
        }
    }

    /// Pull the translation out of the nested array response.
    ///
    /// The body looks like `[[["Bonjour","Hello",null,null,10], ...], null, "en", ...]`;
    /// long inputs are split into several sentence entries which are joined back.
    pub fn parse_response(body: &Value) -> Result<String> {
        let sentences = body
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| RpyError::Translation("Invalid response: missing sentence array".to_string()))?;

        let mut translated = String::new();
        for sentence in sentences {
            if let Some(part) = sentence.get(0).and_then(Value::as_str) {
                translated.push_str(part);
            }
        }

        if translated.is_empty() {
            return Err(RpyError::Translation("Empty translation received".to_string()));
        }

        Ok(translated)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target: TargetLanguage) -> Result<String> {
        let url = format!("{}/translate_a/single", self.endpoint);
        debug!("Sending translation request to: {}", url);

        let response = self.client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source_language.as_str()),
                ("tl", target.code()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| RpyError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RpyError::Translation(format!(
                "Google translate error {}: {}", status, error_text
            )));
        }

        let body: Value = response.json().await
            .map_err(|e| RpyError::Translation(format!("Failed to parse response: {}", e)))?;

        Self::parse_response(&body)
    }
}
