use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::preprocessing::MAX_MODEL_TOKENS;
use super::AnalysisError;

const INFERENCE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

/// Text-classification replies come back nested (one list per input) or flat.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyPayload {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

/// One token-classification span as returned with `aggregation_strategy=simple`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntity {
    #[serde(default)]
    pub entity_group: Option<String>,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub score: Option<f32>,
    pub word: String,
    #[serde(default)]
    pub start: Option<usize>,
    #[serde(default)]
    pub end: Option<usize>,
}

impl RawEntity {
    /// Group label with any `B-`/`I-` prefix removed.
    pub fn label(&self) -> &str {
        let raw = self
            .entity_group
            .as_deref()
            .or(self.entity.as_deref())
            .unwrap_or("");
        raw.strip_prefix("B-")
            .or_else(|| raw.strip_prefix("I-"))
            .unwrap_or(raw)
    }

    /// Surface form with word-piece markers stripped.
    pub fn clean_word(&self) -> String {
        self.word.replace("##", "").trim().to_string()
    }
}

/// Thin client for the Hugging Face Inference API.
#[derive(Debug, Clone)]
pub struct HostedInference {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HostedInference {
    pub fn new(base_url: &str, token: &str) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .timeout(INFERENCE_TIMEOUT)
            .build()
            .map_err(|e| AnalysisError::Http(format!("failed to build client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    async fn post(&self, model: &str, body: serde_json::Value) -> Result<Vec<u8>, AnalysisError> {
        let url = format!("{}/models/{}", self.base_url, model);
        debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalysisError::Http(e.to_string()))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| AnalysisError::Http(format!("body read failed: {e}")))?;

        if !status.is_success() {
            let preview = String::from_utf8_lossy(&bytes[..bytes.len().min(500)]).into_owned();
            warn!("Inference call to {} failed with {}: {}", model, status, preview);
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body: preview,
            });
        }
        Ok(bytes.to_vec())
    }

    /// Top label per input text.
    pub async fn classify(
        &self,
        model: &str,
        texts: &[String],
    ) -> Result<Vec<LabelScore>, AnalysisError> {
        let bytes = self.post(model, classify_body(texts)).await?;
        parse_classification(&bytes, texts.len())
    }

    pub async fn token_classify(
        &self,
        model: &str,
        text: &str,
    ) -> Result<Vec<RawEntity>, AnalysisError> {
        let bytes = self.post(model, token_classify_body(text)).await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| AnalysisError::InvalidResponse(format!("token classification: {e}")))
    }
}

fn classify_body(texts: &[String]) -> serde_json::Value {
    json!({
        "inputs": texts,
        "parameters": { "truncation": true, "max_length": MAX_MODEL_TOKENS },
        "options": { "wait_for_model": true },
    })
}

/// Whitespace truncation does not bound subword tokens, so the model side
/// truncates as well.
fn token_classify_body(text: &str) -> serde_json::Value {
    json!({
        "inputs": text,
        "parameters": {
            "aggregation_strategy": "simple",
            "truncation": true,
            "max_length": MAX_MODEL_TOKENS,
        },
        "options": { "wait_for_model": true },
    })
}

/// Reduce a classification payload to the best label per input.
///
/// A flat list is one text's label distribution when a single input was sent,
/// and one label per input otherwise.
pub fn parse_classification(body: &[u8], expected: usize) -> Result<Vec<LabelScore>, AnalysisError> {
    let payload: ClassifyPayload = serde_json::from_slice(body)
        .map_err(|e| AnalysisError::InvalidResponse(format!("classification: {e}")))?;

    let best = match payload {
        ClassifyPayload::Nested(lists) => lists
            .into_iter()
            .map(best_of)
            .collect::<Option<Vec<_>>>(),
        ClassifyPayload::Flat(list) if expected == 1 => best_of(list).map(|b| vec![b]),
        ClassifyPayload::Flat(list) => Some(list),
    }
    .ok_or_else(|| AnalysisError::InvalidResponse("empty label list".to_string()))?;

    if best.len() != expected {
        return Err(AnalysisError::LengthMismatch {
            expected,
            got: best.len(),
        });
    }
    Ok(best)
}

fn best_of(list: Vec<LabelScore>) -> Option<LabelScore> {
    list.into_iter().max_by(|a, b| a.score.total_cmp(&b.score))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_bodies_ask_the_model_to_truncate() {
        let texts = vec!["markets rally".to_string()];
        for body in [classify_body(&texts), token_classify_body("markets rally")] {
            assert_eq!(body["parameters"]["truncation"], true);
            assert_eq!(body["parameters"]["max_length"], 512);
            assert_eq!(body["options"]["wait_for_model"], true);
        }
        let ner = token_classify_body("markets rally");
        assert_eq!(ner["inputs"], "markets rally");
        assert_eq!(ner["parameters"]["aggregation_strategy"], "simple");
    }

    #[test]
    fn nested_payload_picks_highest_score() {
        let body = br#"[[{"label":"negative","score":0.1},{"label":"positive","score":0.8}],
                        [{"label":"neutral","score":0.6},{"label":"negative","score":0.4}]]"#;
        let best = parse_classification(body, 2).unwrap();
        assert_eq!(best[0].label, "positive");
        assert_eq!(best[1].label, "neutral");
    }

    #[test]
    fn flat_payload_for_single_text() {
        let body = br#"[{"label":"LABEL_0","score":0.2},{"label":"LABEL_2","score":0.7}]"#;
        let best = parse_classification(body, 1).unwrap();
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].label, "LABEL_2");
    }

    #[test]
    fn count_mismatch_is_an_error() {
        let body = br#"[[{"label":"positive","score":0.9}]]"#;
        assert!(matches!(
            parse_classification(body, 2),
            Err(AnalysisError::LengthMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn raw_entity_cleanup() {
        let raw: RawEntity = serde_json::from_str(
            r###"{"entity_group":"PER","score":0.99,"word":" ##Musk ","start":5,"end":9}"###,
        )
        .unwrap();
        assert_eq!(raw.label(), "PER");
        assert_eq!(raw.clean_word(), "Musk");

        let tagged: RawEntity =
            serde_json::from_str(r#"{"entity":"B-ORG","word":"Tesla"}"#).unwrap();
        assert_eq!(tagged.label(), "ORG");
    }
}
