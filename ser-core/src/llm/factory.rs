//! Factory for creating LLM providers from configuration

use std::sync::Arc;

use crate::config::LlmSettings;
use crate::error::Result;
use crate::llm::LLMProvider;
use crate::llm::providers::OpenAIProvider;

/// Factory for creating LLM providers
pub struct LLMProviderFactory;

impl LLMProviderFactory {
    /// Create an LLM provider from settings.
    ///
    /// # Errors
    ///
    /// Returns [`SerError::Authentication`](crate::error::SerError::Authentication)
    /// when neither `api_key` nor the `api_key_env` variable yields a key.
    pub fn create(settings: &LlmSettings) -> Result<Arc<dyn LLMProvider>> {
        let api_key = settings.require_api_key()?;
        let provider = OpenAIProvider::from_settings(settings, api_key)?;
        Ok(Arc::new(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SerError;

    #[test]
    fn test_create_without_key_fails() {
        let settings = LlmSettings {
            api_key_env: "SER_TEST_UNSET_KEY_VAR_3".to_string(),
            ..LlmSettings::default()
        };
        let result = LLMProviderFactory::create(&settings);
        assert!(matches!(result, Err(SerError::Authentication(_))));
    }

    #[test]
    fn test_create_with_key() {
        let settings = LlmSettings::default().with_api_key("sk-test");
        let provider = LLMProviderFactory::create(&settings).unwrap();
        assert_eq!(provider.model_info().model_name, settings.model);
    }
}
