use std::time::Duration;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::models::Article;

pub const MAX_CONTEXT_ARTICLES: usize = 20;
pub const MAX_CONTEXT_LINE_CHARS: usize = 500;
pub const MAX_ANSWER_CHARS: usize = 4000;

pub const CHAT_UNAVAILABLE: &str = "Chatbot unavailable. Please set GEMINI_API_KEY.";

const CHAT_TIMEOUT: Duration = Duration::from_secs(60);

const PERSONA: &str = "You are Nova, an intelligent and friendly AI journalist inside the NewsPulse app. \
You understand current affairs, explain terms and full forms (like BCCI, GDP, OTT), \
and use your general world knowledge when news context isn't enough. \
Always sound natural, confident, and concise.";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat request failed: {0}")]
    Http(String),
    #[error("Gemini returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected Gemini response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatAnswer {
    pub text: String,
    /// The model's reply was longer than [`MAX_ANSWER_CHARS`] and was cut.
    pub truncated: bool,
    /// `false` when chat is not configured and `text` is the notice.
    pub available: bool,
}

impl ChatAnswer {
    fn unavailable() -> Self {
        Self {
            text: CHAT_UNAVAILABLE.to_string(),
            truncated: false,
            available: false,
        }
    }
}

/// Article notes for the prompt: at most 20 lines, each capped at 500 chars.
pub fn build_context(articles: &[Article]) -> Vec<String> {
    articles
        .iter()
        .take(MAX_CONTEXT_ARTICLES)
        .filter_map(|a| {
            let title = a.title.trim();
            let desc = a.description.trim();
            if title.is_empty() && desc.is_empty() {
                return None;
            }
            let mut line = format!("- {title} :: {desc}");
            let source = a.source.trim();
            if !source.is_empty() {
                line.push_str(&format!(" (source: {source})"));
            }
            Some(line.chars().take(MAX_CONTEXT_LINE_CHARS).collect())
        })
        .collect()
}

pub fn build_prompt(question: &str, context: &[String]) -> String {
    let notes = if context.is_empty() {
        "(no news notes available)".to_string()
    } else {
        context.join("\n")
    };
    format!(
        "{PERSONA}\n\n\
         Use the following article context (if available) to answer the question. \
         If context doesn't help, use your general knowledge.\n\n\
         Article notes:\n{notes}\n\n\
         User question: {}\n\n\
         Your answer should be short, clear, and factually correct.",
        question.trim()
    )
}

/// Cut `text` to `max` characters, reporting whether anything was dropped.
pub fn cap_answer(text: &str, max: usize) -> (String, bool) {
    let mut chars = text.char_indices();
    match chars.nth(max) {
        Some((byte, _)) => (text[..byte].to_string(), true),
        None => (text.to_string(), false),
    }
}

/// Concatenated text parts of the first candidate.
pub fn parse_generate_response(body: &Value) -> Result<String, ChatError> {
    let candidates = body["candidates"]
        .as_array()
        .ok_or_else(|| ChatError::InvalidResponse("missing 'candidates' array".to_string()))?;
    let candidate = candidates
        .first()
        .ok_or_else(|| ChatError::InvalidResponse("empty 'candidates' array".to_string()))?;

    let text = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default();
    Ok(text.trim().to_string())
}

/// Gemini `generateContent` client. Without an API key every question is
/// answered with the unavailable notice.
pub struct ChatService {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl ChatService {
    pub fn new(config: &AppConfig) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(CHAT_TIMEOUT)
            .build()
            .map_err(|e| ChatError::Http(format!("failed to build client: {e}")))?;

        if config.gemini_api_key.is_none() {
            info!("GEMINI_API_KEY not set; chat disabled");
        }

        Ok(Self {
            client,
            api_key: config.gemini_api_key.clone(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config
                .gemini_model
                .trim_start_matches("models/")
                .to_string(),
        })
    }

    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn ask(&self, question: &str, articles: &[Article]) -> Result<ChatAnswer, ChatError> {
        let Some(key) = self.api_key.as_deref() else {
            return Ok(ChatAnswer::unavailable());
        };

        let context = build_context(articles);
        let prompt = build_prompt(question, &context);
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        debug!("Asking {} with {} context lines", self.model, context.len());

        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        });

        let resp = self
            .client
            .post(&url)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Http(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ChatError::Http(format!("body read failed: {e}")))?;

        if !status.is_success() {
            let preview: String = text.chars().take(500).collect();
            warn!("Gemini returned {}: {}", status, preview);
            return Err(ChatError::Status {
                status: status.as_u16(),
                body: preview,
            });
        }

        let json: Value = serde_json::from_str(&text)
            .map_err(|e| ChatError::InvalidResponse(format!("invalid JSON: {e}")))?;
        let reply = parse_generate_response(&json)?;
        let (text, truncated) = cap_answer(&reply, MAX_ANSWER_CHARS);
        if truncated {
            info!("Chat answer truncated to {} chars", MAX_ANSWER_CHARS);
        }

        Ok(ChatAnswer {
            text,
            truncated,
            available: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_counts_characters() {
        assert_eq!(cap_answer("héllo", 3), ("hél".to_string(), true));
        assert_eq!(cap_answer("abc", 3), ("abc".to_string(), false));
    }

    #[test]
    fn response_parts_are_joined() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Hello " }, { "text": "world" }] } }]
        });
        assert_eq!(parse_generate_response(&body).unwrap(), "Hello world");
        assert!(parse_generate_response(&json!({ "candidates": [] })).is_err());
    }

    #[tokio::test]
    async fn missing_key_degrades_to_notice() {
        let service = ChatService::new(&AppConfig::default()).unwrap();
        let answer = service.ask("What happened?", &[]).await.unwrap();
        assert!(!answer.available);
        assert_eq!(answer.text, CHAT_UNAVAILABLE);
    }
}
