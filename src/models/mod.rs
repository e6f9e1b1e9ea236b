pub mod analysis;
pub mod document;
pub mod news;
pub mod session;

pub use analysis::{
    ArticleAnalysis, BigramPair, EntityCount, EntityLabel, EntityMention, FrequencyPair,
    OverallAnalysis, PreprocessedText, SentimentLabel, SentimentResult,
};
pub use document::{AnalyzedDocument, UserRecord};
pub use news::Article;
pub use session::{SessionState, DASHBOARD_CATEGORIES};
