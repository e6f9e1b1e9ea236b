use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{AppConfig, NerBackendKind};
use crate::models::{
    Article, ArticleAnalysis, EntityMention, OverallAnalysis, PreprocessedText, SentimentResult,
};

pub mod entities;
pub mod hosted;
pub mod lemmatizer;
pub mod lexicon;
pub mod preprocessing;
pub mod registry;
pub mod sentiment;
pub mod stopwords;

pub use entities::{EntityBackend, HostedTagger, RuleTagger};
pub use hosted::HostedInference;
pub use lexicon::LexiconScorer;
pub use preprocessing::{
    clean_and_lemmatize, compute_top_bigrams, compute_top_frequencies, preprocess_texts,
    truncate_to_max_tokens, DEFAULT_TOP_BIGRAMS, DEFAULT_TOP_FREQUENCIES, MAX_MODEL_TOKENS,
};
pub use registry::ModelRegistry;
pub use sentiment::{normalize_label, HostedClassifier, SentimentBackend};

/// Per-article panels show fewer rows than the overall view.
pub const ARTICLE_TOP_FREQUENCIES: usize = 15;
pub const ARTICLE_TOP_BIGRAMS: usize = 10;

const LEXICON_MODEL: &str = "lexicon";
const RULES_MODEL: &str = "rules";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("inference request failed: {0}")]
    Http(String),
    #[error("inference returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected inference response: {0}")]
    InvalidResponse(String),
    #[error("model returned {got} results for {expected} inputs")]
    LengthMismatch { expected: usize, got: usize },
    #[error("HF_API_TOKEN is not configured")]
    MissingToken,
    #[error("article has no text to analyse")]
    NoText,
    #[error("model registry lock poisoned")]
    RegistryPoisoned,
}

/// Long-lived owner of the text-analytics models.
pub struct AnalysisService {
    registry: ModelRegistry,
    hosted: Option<HostedInference>,
    sentiment_model: String,
    ner_model: String,
    ner_backend: NerBackendKind,
}

impl AnalysisService {
    pub fn new(config: &AppConfig) -> Result<Self, AnalysisError> {
        let hosted = match config.hf_api_token.as_deref() {
            Some(token) => Some(HostedInference::new(&config.hf_inference_url, token)?),
            None => {
                info!("HF_API_TOKEN not set, using offline lexicon sentiment");
                None
            }
        };

        let ner_backend = match (config.ner_backend, hosted.is_some()) {
            (NerBackendKind::Hosted, false) => {
                warn!("NER_BACKEND=hosted needs HF_API_TOKEN; falling back to rules");
                NerBackendKind::Rules
            }
            (kind, _) => kind,
        };

        Ok(Self {
            registry: ModelRegistry::new(),
            hosted,
            sentiment_model: config.sentiment_model.clone(),
            ner_model: config.ner_model.clone(),
            ner_backend,
        })
    }

    /// Lexicon sentiment and rule-based entities, no network.
    pub fn offline() -> Self {
        Self {
            registry: ModelRegistry::new(),
            hosted: None,
            sentiment_model: LEXICON_MODEL.to_string(),
            ner_model: RULES_MODEL.to_string(),
            ner_backend: NerBackendKind::Rules,
        }
    }

    pub fn sentiment_model(&self) -> &str {
        match self.hosted {
            Some(_) => &self.sentiment_model,
            None => LEXICON_MODEL,
        }
    }

    pub fn ner_model(&self) -> &str {
        match self.ner_backend {
            NerBackendKind::Hosted => &self.ner_model,
            NerBackendKind::Rules => RULES_MODEL,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    fn sentiment_backend(&self, model: &str) -> Result<Arc<SentimentBackend>, AnalysisError> {
        match &self.hosted {
            Some(inference) => self.registry.sentiment(model, || {
                Ok(SentimentBackend::Hosted(HostedClassifier::new(
                    inference.clone(),
                    model,
                )))
            }),
            None => self
                .registry
                .sentiment(LEXICON_MODEL, || Ok(SentimentBackend::Lexicon(LexiconScorer::new()))),
        }
    }

    fn entity_backend(&self) -> Result<Arc<EntityBackend>, AnalysisError> {
        match (self.ner_backend, &self.hosted) {
            (NerBackendKind::Hosted, Some(inference)) => {
                self.registry.entities(&self.ner_model, || {
                    Ok(EntityBackend::Hosted(HostedTagger::new(
                        inference.clone(),
                        self.ner_model.as_str(),
                    )))
                })
            }
            _ => self
                .registry
                .entities(RULES_MODEL, || Ok(EntityBackend::Rules(RuleTagger::new()))),
        }
    }

    pub async fn predict_sentiment(
        &self,
        texts: &[String],
    ) -> Result<Vec<SentimentResult>, AnalysisError> {
        let model = self.sentiment_model.clone();
        self.predict_sentiment_with(texts, &model).await
    }

    /// Classify with a specific model id. Without hosted inference every id
    /// resolves to the lexicon scorer.
    pub async fn predict_sentiment_with(
        &self,
        texts: &[String],
        model: &str,
    ) -> Result<Vec<SentimentResult>, AnalysisError> {
        let backend = self.sentiment_backend(model)?;
        backend.predict(texts).await
    }

    pub async fn extract_entities(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<EntityMention>>, AnalysisError> {
        let backend = self.entity_backend()?;
        backend.extract(texts).await
    }

    /// Sentiment, word statistics and entities for one article.
    pub async fn analyze_article(&self, article: &Article) -> Result<ArticleAnalysis, AnalysisError> {
        let raw = article.analysis_text().ok_or(AnalysisError::NoText)?;
        let pre = preprocess_texts(&[raw]);
        let PreprocessedText { raw, clean, tokens } = pre.into_iter().next().ok_or(AnalysisError::NoText)?;

        // Negators are stopwords, so a single article is scored on its raw text.
        let sentiment = self
            .predict_sentiment(&[raw.clone()])
            .await?
            .into_iter()
            .next()
            .ok_or(AnalysisError::LengthMismatch { expected: 1, got: 0 })?;

        let entities = self
            .extract_entities(&[raw])
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();

        let lists = [tokens];
        Ok(ArticleAnalysis {
            article_id: article.id.clone(),
            title: article.title.clone(),
            sentiment,
            clean,
            frequencies: compute_top_frequencies(&lists, ARTICLE_TOP_FREQUENCIES),
            bigrams: compute_top_bigrams(&lists, ARTICLE_TOP_BIGRAMS),
            entities,
        })
    }

    /// Batch analysis over every article that has text.
    pub async fn analyze_overall(&self, articles: &[Article]) -> Result<OverallAnalysis, AnalysisError> {
        let raws: Vec<&str> = articles.iter().filter_map(Article::analysis_text).collect();
        if raws.is_empty() {
            return Ok(OverallAnalysis::default());
        }

        info!("Running overall analysis on {} articles", raws.len());
        let pre = preprocess_texts(&raws);

        let sentiment_inputs: Vec<String> = pre
            .iter()
            .map(|p| if p.clean.is_empty() { p.raw.clone() } else { p.clean.clone() })
            .collect();
        let raw_texts: Vec<String> = pre.iter().map(|p| p.raw.clone()).collect();
        let token_lists: Vec<Vec<String>> = pre.into_iter().map(|p| p.tokens).collect();

        let sentiments = self.predict_sentiment(&sentiment_inputs).await?;
        let entities = self.extract_entities(&raw_texts).await?;

        Ok(OverallAnalysis {
            sentiments,
            frequencies: compute_top_frequencies(&token_lists, DEFAULT_TOP_FREQUENCIES),
            bigrams: compute_top_bigrams(&token_lists, DEFAULT_TOP_BIGRAMS),
            entities,
        })
    }
}
