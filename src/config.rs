use std::env;

use thiserror::Error;

pub const DEFAULT_APP_TITLE: &str = "NewsPulse – NLP Analysis";
pub const DEFAULT_GNEWS_BASE_URL: &str = "https://gnews.io/api/v4";
pub const DEFAULT_SENTIMENT_MODEL: &str = "cardiffnlp/twitter-roberta-base-sentiment-latest";
pub const DEFAULT_NER_MODEL: &str = "dslim/bert-base-NER";
pub const DEFAULT_HF_INFERENCE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Which entity tagger backs `/analyze` and `/overall`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NerBackendKind {
    Rules,
    Hosted,
}

impl NerBackendKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rules" | "spacy" | "" => Some(Self::Rules),
            "hosted" | "hf" => Some(Self::Hosted),
            _ => None,
        }
    }
}

/// Process-wide settings, read once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_title: String,
    pub gnews_api_key: Option<String>,
    pub gnews_base_url: String,
    pub sentiment_model: String,
    pub ner_model: String,
    pub ner_backend: NerBackendKind,
    pub hf_api_token: Option<String>,
    pub hf_inference_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub redis_url: Option<String>,
    pub require_login: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_title: DEFAULT_APP_TITLE.to_string(),
            gnews_api_key: None,
            gnews_base_url: DEFAULT_GNEWS_BASE_URL.to_string(),
            sentiment_model: DEFAULT_SENTIMENT_MODEL.to_string(),
            ner_model: DEFAULT_NER_MODEL.to_string(),
            ner_backend: NerBackendKind::Rules,
            hf_api_token: None,
            hf_inference_url: DEFAULT_HF_INFERENCE_URL.to_string(),
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            redis_url: None,
            require_login: false,
        }
    }
}

impl AppConfig {
    /// Build the configuration from environment variables.
    ///
    /// Call `dotenv().ok()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let ner_backend = match env::var("NER_BACKEND") {
            Ok(raw) => NerBackendKind::parse(&raw).ok_or(ConfigError::Invalid {
                name: "NER_BACKEND",
                value: raw,
            })?,
            Err(_) => defaults.ner_backend,
        };

        let require_login = match env::var("REQUIRE_LOGIN") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::Invalid {
                name: "REQUIRE_LOGIN",
                value: raw,
            })?,
            Err(_) => false,
        };

        Ok(Self {
            app_title: var_or("APP_TITLE", defaults.app_title),
            gnews_api_key: non_empty_var("GNEWS_API_KEY"),
            gnews_base_url: var_or("GNEWS_BASE_URL", defaults.gnews_base_url),
            sentiment_model: var_or("SENTIMENT_MODEL", defaults.sentiment_model),
            ner_model: var_or("NER_HF_MODEL", defaults.ner_model),
            ner_backend,
            hf_api_token: non_empty_var("HF_API_TOKEN"),
            hf_inference_url: var_or("HF_INFERENCE_URL", defaults.hf_inference_url),
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            gemini_base_url: var_or("GEMINI_BASE_URL", defaults.gemini_base_url),
            gemini_model: var_or("GEMINI_MODEL", defaults.gemini_model),
            redis_url: non_empty_var("REDIS_URL"),
            require_login,
        })
    }
}

/// Trimmed value of `name`, or `None` when unset or blank.
pub fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn var_or(name: &str, fallback: String) -> String {
    non_empty_var(name).unwrap_or(fallback)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("Yes"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn ner_backend_names() {
        assert_eq!(NerBackendKind::parse("rules"), Some(NerBackendKind::Rules));
        assert_eq!(NerBackendKind::parse("HF"), Some(NerBackendKind::Hosted));
        assert_eq!(NerBackendKind::parse("flair"), None);
    }
}
