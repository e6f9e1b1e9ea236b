use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityMention, SentimentResult};

/// Record appended to the document store after an analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_id: Option<String>,
    pub text: String,
    pub clean: String,
    pub sentiment: SentimentResult,
    pub entities: Vec<EntityMention>,
    pub analyzed_at: DateTime<Utc>,
}

/// Stored credential; `password_hash` is a bcrypt string carrying its own salt and cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
