use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::TranslateConfig;
use crate::language::TargetLanguage;
use super::Translator;

/// Retry and fallback policy for [`SafeTranslator`]
#[derive(Debug, Clone)]
pub struct SafePolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub cache: bool,
}

impl From<&TranslateConfig> for SafePolicy {
    fn from(config: &TranslateConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            cache: config.cache,
        }
    }
}

impl Default for SafePolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            retry_delay: Duration::ZERO,
            cache: false,
        }
    }
}

/// Infallible front for a translation backend.
///
/// Every failure is retried according to the policy, then logged and
/// answered with the source text, so callers always get a string back.
pub struct SafeTranslator {
    inner: Box<dyn Translator>,
    policy: SafePolicy,
    cache: Mutex<HashMap<(String, TargetLanguage), String>>,
}

impl SafeTranslator {
    pub fn new(inner: Box<dyn Translator>, policy: SafePolicy) -> Self {
        Self {
            inner,
            policy,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Translate `text`, falling back to `text` itself on failure
    pub async fn translate(&self, text: &str, target: TargetLanguage) -> String {
        if text.is_empty() {
            return String::new();
        }

        let key = (text.to_string(), target);
        if self.policy.cache {
            if let Some(cached) = self.cache.lock().await.get(&key) {
                debug!("Translation cache hit: {}", text);
                return cached.clone();
            }
        }

        let attempts = self.policy.max_retries + 1;
        for attempt in 1..=attempts {
            match self.inner.translate(text, target).await {
                Ok(translation) => {
                    if self.policy.cache {
                        self.cache.lock().await.insert(key, translation.clone());
                    }
                    return translation;
                }
                Err(e) if attempt < attempts => {
                    warn!("Translation attempt {}/{} failed: {}", attempt, attempts, e);
                    if !self.policy.retry_delay.is_zero() {
                        tokio::time::sleep(self.policy.retry_delay).await;
                    }
                }
                Err(e) => {
                    warn!("Translation failed, keeping original text: {}", e);
                }
            }
        }

        text.to_string()
    }

    /// Number of distinct strings translated so far
    pub async fn cached_entries(&self) -> usize {
        self.cache.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RpyError;
    use crate::translate::MockTranslator;

    fn policy(max_retries: u32, cache: bool) -> SafePolicy {
        SafePolicy {
            max_retries,
            retry_delay: Duration::ZERO,
            cache,
        }
    }

    #[tokio::test]
    async fn test_success_passes_translation_through() {
        let mut mock = MockTranslator::new();
        mock.expect_translate()
            .times(1)
            .returning(|text, target| Ok(format!("{}:{}", target.code(), text)));

        let safe = SafeTranslator::new(Box::new(mock), policy(2, false));
        assert_eq!(safe.translate("Hello", TargetLanguage::French).await, "fr:Hello");
    }

    #[tokio::test]
    async fn test_failure_returns_original_after_retries() {
        let mut mock = MockTranslator::new();
        mock.expect_translate()
            .times(3)
            .returning(|_, _| Err(RpyError::Translation("quota exceeded".to_string())));

        let safe = SafeTranslator::new(Box::new(mock), policy(2, true));
        assert_eq!(safe.translate("Hello", TargetLanguage::French).await, "Hello");
        assert_eq!(safe.cached_entries().await, 0);
    }

    #[tokio::test]
    async fn test_retry_recovers() {
        let mut mock = MockTranslator::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_translate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(RpyError::Translation("timeout".to_string())));
        mock.expect_translate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok("Bonjour".to_string()));

        let safe = SafeTranslator::new(Box::new(mock), policy(1, false));
        assert_eq!(safe.translate("Hello", TargetLanguage::French).await, "Bonjour");
    }

    #[tokio::test]
    async fn test_cache_avoids_second_call() {
        let mut mock = MockTranslator::new();
        mock.expect_translate()
            .times(2)
            .returning(|text, target| Ok(format!("{}-{}", text, target.code())));

        let safe = SafeTranslator::new(Box::new(mock), policy(0, true));
        assert_eq!(safe.translate("Hi", TargetLanguage::German).await, "Hi-de");
        assert_eq!(safe.translate("Hi", TargetLanguage::German).await, "Hi-de");
        // a different target is a different entry
        assert_eq!(safe.translate("Hi", TargetLanguage::Dutch).await, "Hi-nl");
        assert_eq!(safe.cached_entries().await, 2);
    }

    #[tokio::test]
    async fn test_empty_text_skips_backend() {
        let mut mock = MockTranslator::new();
        mock.expect_translate().never();

        let safe = SafeTranslator::new(Box::new(mock), SafePolicy::default());
        assert_eq!(safe.translate("", TargetLanguage::French).await, "");
    }
}
