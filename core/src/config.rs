//! Startup-time provider selection.
//!
//! Credentials are read from the environment exactly once, when the server
//! process boots. The resulting [`ProviderConfig`] is injected into the
//! pipeline and never re-evaluated, so rotating a credential requires a
//! process restart. That constraint is deliberate: it keeps every request
//! free of configuration races.

use serde::Serialize;

const HF_DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Which vendor-level family of models backs all generation operations.
///
/// Hugging Face wins whenever its credential is present, even if an OpenAI
/// key is also configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFamily {
    HuggingFace,
    OpenAi,
    None,
}

/// Immutable provider configuration fixed at process start.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    family: ProviderFamily,
    huggingface_api_key: Option<String>,
    openai_api_key: Option<String>,
    huggingface_base_url: String,
    openai_base_url: String,
}

impl ProviderConfig {
    /// Read credentials and endpoint overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_parts(
            std::env::var("HUGGINGFACE_API_KEY").ok(),
            std::env::var("OPENAI_API_KEY").ok(),
            std::env::var("HUGGINGFACE_BASE_URL").ok(),
            std::env::var("OPENAI_BASE_URL").ok(),
        )
    }

    /// Build a configuration from explicit values. Blank or whitespace-only
    /// values count as absent.
    pub fn from_parts(
        huggingface_api_key: Option<String>,
        openai_api_key: Option<String>,
        huggingface_base_url: Option<String>,
        openai_base_url: Option<String>,
    ) -> Self {
        let huggingface_api_key = non_empty(huggingface_api_key);
        let openai_api_key = non_empty(openai_api_key);
        let huggingface_base_url = non_empty(huggingface_base_url);
        let openai_base_url = non_empty(openai_base_url);
        let family = if huggingface_api_key.is_some() {
            ProviderFamily::HuggingFace
        } else if openai_api_key.is_some() {
            ProviderFamily::OpenAi
        } else {
            ProviderFamily::None
        };
        Self {
            family,
            huggingface_api_key,
            openai_api_key,
            huggingface_base_url: huggingface_base_url
                .unwrap_or_else(|| HF_DEFAULT_BASE_URL.to_string()),
            openai_base_url: openai_base_url.unwrap_or_else(|| OPENAI_DEFAULT_BASE_URL.to_string()),
        }
    }

    pub fn active_family(&self) -> ProviderFamily {
        self.family
    }

    pub fn is_available(&self) -> bool {
        self.family != ProviderFamily::None
    }

    pub fn huggingface_api_key(&self) -> Option<&str> {
        self.huggingface_api_key.as_deref()
    }

    pub fn openai_api_key(&self) -> Option<&str> {
        self.openai_api_key.as_deref()
    }

    pub fn huggingface_base_url(&self) -> &str {
        &self.huggingface_base_url
    }

    pub fn openai_base_url(&self) -> &str {
        &self.openai_base_url
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn huggingface_wins_when_both_keys_present() {
        let config = ProviderConfig::from_parts(
            Some("hf_test".into()),
            Some("sk-test".into()),
            None,
            None,
        );
        assert_eq!(config.active_family(), ProviderFamily::HuggingFace);
        assert!(config.is_available());
    }

    #[test]
    fn openai_selected_when_only_secondary_present() {
        let config = ProviderConfig::from_parts(None, Some("sk-test".into()), None, None);
        assert_eq!(config.active_family(), ProviderFamily::OpenAi);
    }

    #[test]
    fn no_family_without_credentials() {
        let config = ProviderConfig::from_parts(None, None, None, None);
        assert_eq!(config.active_family(), ProviderFamily::None);
        assert!(!config.is_available());
    }

    #[test]
    fn blank_keys_are_treated_as_absent() {
        let config = ProviderConfig::from_parts(Some("   ".into()), None, None, None);
        assert_eq!(config.active_family(), ProviderFamily::None);
    }

    #[test]
    fn default_base_urls_apply() {
        let config = ProviderConfig::from_parts(Some("hf_test".into()), None, None, None);
        assert_eq!(
            config.huggingface_base_url(),
            "https://api-inference.huggingface.co"
        );
        assert_eq!(config.openai_base_url(), "https://api.openai.com");
    }
}
