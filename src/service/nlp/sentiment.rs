use tracing::debug;

use super::hosted::HostedInference;
use super::lexicon::LexiconScorer;
use super::preprocessing::{truncate_to_max_tokens, MAX_MODEL_TOKENS};
use super::AnalysisError;
use crate::models::{SentimentLabel, SentimentResult};

/// Models whose `LABEL_n` outputs follow the negative/neutral/positive layout.
pub const THREE_CLASS_MODEL: &str = "cardiffnlp/twitter-roberta-base-sentiment";

/// Fold a raw model label into positive/negative/neutral.
///
/// Named labels go through a synonym table; generic `LABEL_n` labels are
/// resolved by index against the active model. Anything unrecognised is neutral.
pub fn normalize_label(raw: &str, model_name: &str) -> SentimentLabel {
    let label = raw.trim().to_lowercase();

    match label.as_str() {
        "positive" | "pos" => return SentimentLabel::Positive,
        "negative" | "neg" => return SentimentLabel::Negative,
        "neutral" | "neu" => return SentimentLabel::Neutral,
        _ => {}
    }

    let Some(index) = label
        .strip_prefix("label_")
        .and_then(|n| n.parse::<usize>().ok())
    else {
        return SentimentLabel::Neutral;
    };

    if model_name.to_lowercase().contains(THREE_CLASS_MODEL) {
        match index {
            0 => SentimentLabel::Negative,
            1 => SentimentLabel::Neutral,
            2 => SentimentLabel::Positive,
            _ => SentimentLabel::Neutral,
        }
    } else {
        match index {
            0 => SentimentLabel::Negative,
            1 => SentimentLabel::Positive,
            _ => SentimentLabel::Neutral,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HostedClassifier {
    inference: HostedInference,
    model: String,
}

impl HostedClassifier {
    pub fn new(inference: HostedInference, model: impl Into<String>) -> Self {
        Self {
            inference,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// A loaded sentiment model.
#[derive(Debug, Clone)]
pub enum SentimentBackend {
    Hosted(HostedClassifier),
    Lexicon(LexiconScorer),
}

impl SentimentBackend {
    pub fn name(&self) -> &str {
        match self {
            SentimentBackend::Hosted(c) => c.model(),
            SentimentBackend::Lexicon(_) => "lexicon",
        }
    }

    /// One result per input, order preserved.
    pub async fn predict(&self, texts: &[String]) -> Result<Vec<SentimentResult>, AnalysisError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let inputs: Vec<String> = texts
            .iter()
            .map(|t| truncate_to_max_tokens(t, MAX_MODEL_TOKENS).to_string())
            .collect();

        match self {
            SentimentBackend::Hosted(classifier) => {
                debug!(
                    "Classifying {} texts with {}",
                    inputs.len(),
                    classifier.model
                );
                let best = classifier
                    .inference
                    .classify(&classifier.model, &inputs)
                    .await?;
                Ok(best
                    .into_iter()
                    .map(|b| SentimentResult {
                        label: normalize_label(&b.label, &classifier.model),
                        score: b.score.clamp(0.0, 1.0),
                    })
                    .collect())
            }
            SentimentBackend::Lexicon(scorer) => {
                Ok(inputs.iter().map(|t| scorer.classify(t)).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARDIFF: &str = "cardiffnlp/twitter-roberta-base-sentiment-latest";

    #[test]
    fn synonyms() {
        assert_eq!(normalize_label("POS", CARDIFF), SentimentLabel::Positive);
        assert_eq!(normalize_label("negative", "x"), SentimentLabel::Negative);
        assert_eq!(normalize_label(" Neu ", "x"), SentimentLabel::Neutral);
    }

    #[test]
    fn indexed_labels_depend_on_model() {
        assert_eq!(normalize_label("LABEL_2", CARDIFF), SentimentLabel::Positive);
        assert_eq!(normalize_label("LABEL_1", CARDIFF), SentimentLabel::Neutral);
        assert_eq!(
            normalize_label("LABEL_1", "distilbert-base-uncased-finetuned-sst-2-english"),
            SentimentLabel::Positive
        );
        assert_eq!(normalize_label("LABEL_0", "any"), SentimentLabel::Negative);
    }

    #[test]
    fn unknown_labels_are_neutral() {
        assert_eq!(normalize_label("LABEL_7", CARDIFF), SentimentLabel::Neutral);
        assert_eq!(normalize_label("5 stars", CARDIFF), SentimentLabel::Neutral);
    }

    #[tokio::test]
    async fn lexicon_backend_keeps_order() {
        let backend = SentimentBackend::Lexicon(LexiconScorer::new());
        let texts = vec![
            "Profits surge at record pace".to_string(),
            "Factory fire kills workers".to_string(),
        ];
        let out = backend.predict(&texts).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].label, SentimentLabel::Positive);
        assert_eq!(out[1].label, SentimentLabel::Negative);
    }
}
