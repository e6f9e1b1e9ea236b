use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    /// Model confidence in `[0, 1]`.
    pub score: f32,
}

/// Entity categories kept after tagging. Both backends' spellings fold into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityLabel {
    #[serde(rename = "PERSON", alias = "PER")]
    Person,
    #[serde(rename = "ORG")]
    Org,
    #[serde(rename = "GPE")]
    Gpe,
    #[serde(rename = "LOC")]
    Loc,
}

impl EntityLabel {
    /// Map a raw tagger label onto the allow-list; anything else is dropped.
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PERSON" | "PER" => Some(EntityLabel::Person),
            "ORG" => Some(EntityLabel::Org),
            "GPE" => Some(EntityLabel::Gpe),
            "LOC" => Some(EntityLabel::Loc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLabel::Person => "PERSON",
            EntityLabel::Org => "ORG",
            EntityLabel::Gpe => "GPE",
            EntityLabel::Loc => "LOC",
        }
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMention {
    pub text: String,
    pub label: EntityLabel,
    /// Character offsets into the analysed text.
    pub start: usize,
    pub end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// `(token, count)`, sorted by count descending, ties in first-seen order.
pub type FrequencyPair = (String, usize);

/// `("w1 w2", count)`, same ordering as [`FrequencyPair`].
pub type BigramPair = (String, usize);

/// Output of one pass through the preprocessing stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessedText {
    pub raw: String,
    pub clean: String,
    pub tokens: Vec<String>,
}

/// Grouped entity row for the "top entities" table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCount {
    pub label: EntityLabel,
    pub entity: String,
    pub count: usize,
}

/// Per-article analysis shown after `/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleAnalysis {
    pub article_id: String,
    pub title: String,
    pub sentiment: SentimentResult,
    pub clean: String,
    pub frequencies: Vec<FrequencyPair>,
    pub bigrams: Vec<BigramPair>,
    pub entities: Vec<EntityMention>,
}

/// Batch analysis over every fetched article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallAnalysis {
    pub sentiments: Vec<SentimentResult>,
    pub frequencies: Vec<FrequencyPair>,
    pub bigrams: Vec<BigramPair>,
    pub entities: Vec<Vec<EntityMention>>,
}

impl OverallAnalysis {
    pub fn is_empty(&self) -> bool {
        self.sentiments.is_empty() && self.frequencies.is_empty() && self.entities.is_empty()
    }
}
