use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::models::Article;

pub mod category;
pub mod retry;

pub use category::{map_category, Category};
pub use retry::{
    request_with_retry, HttpResponse, ReqwestTransport, RetryError, RetryPolicy, Sleeper,
    TokioSleeper, Transport, TransportError,
};

pub const MAX_ARTICLES_PER_REQUEST: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum NewsApiError {
    #[error("GNEWS_API_KEY is not configured")]
    MissingApiKey,
    #[error("search query is empty")]
    EmptyQuery,
    #[error("GNews rate limit reached. Please try again in a moment.")]
    RateLimited,
    #[error("GNews request failed: {0}")]
    Request(RetryError),
    #[error("GNews search failed: {0}")]
    Search(RetryError),
    #[error("GNews returned invalid JSON")]
    InvalidJson,
    #[error("No articles returned from GNews")]
    NoArticles,
    #[error("No results returned from GNews search")]
    NoSearchResults,
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] TransportError),
}

/// News providers the client can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NewsProvider {
    #[default]
    GNews,
}

impl NewsProvider {
    fn headlines_path(&self) -> &'static str {
        match self {
            NewsProvider::GNews => "top-headlines",
        }
    }

    fn search_path(&self) -> &'static str {
        match self {
            NewsProvider::GNews => "search",
        }
    }
}

/// Fetches and normalizes headlines. Stateless apart from its settings: every
/// call re-queries the provider.
pub struct NewsClient<T = ReqwestTransport, S = TokioSleeper> {
    provider: NewsProvider,
    api_key: Option<String>,
    base_url: String,
    transport: T,
    sleeper: S,
    policy: RetryPolicy,
}

impl NewsClient {
    /// Build a GNews client from the process configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, NewsApiError> {
        Ok(Self::with_transport(
            config.gnews_api_key.clone(),
            config.gnews_base_url.clone(),
            ReqwestTransport::new()?,
            TokioSleeper,
        ))
    }
}

impl<T: Transport, S: Sleeper> NewsClient<T, S> {
    pub fn with_transport(
        api_key: Option<String>,
        base_url: impl Into<String>,
        transport: T,
        sleeper: S,
    ) -> Self {
        Self {
            provider: NewsProvider::GNews,
            api_key: api_key
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            sleeper,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn provider(&self) -> NewsProvider {
        self.provider
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Top headlines for a UI category (`finance`, `sports`, ...).
    pub async fn fetch_category(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<Vec<Article>, NewsApiError> {
        let key = self.api_key.as_deref().ok_or(NewsApiError::MissingApiKey)?;
        let mapped = map_category(category);
        let url = format!("{}/{}", self.base_url, self.provider.headlines_path());

        info!("Fetching {} headlines (provider category {})", category, mapped);

        let params = vec![
            ("token".to_string(), key.to_string()),
            ("lang".to_string(), "en".to_string()),
            ("category".to_string(), mapped.to_string()),
            ("max".to_string(), clamp_limit(limit).to_string()),
        ];

        let resp = request_with_retry(&self.transport, &self.sleeper, &url, &params, &self.policy)
            .await
            .map_err(|e| match e {
                RetryError::RateLimited { .. } => NewsApiError::RateLimited,
                other => NewsApiError::Request(other),
            })?;

        let articles = parse_articles(&resp)?;
        if articles.is_empty() {
            warn!("No usable articles for category {}", category);
            return Err(NewsApiError::NoArticles);
        }

        info!("Fetched {} {} articles", articles.len(), category);
        Ok(articles
            .into_iter()
            .map(|a| a.with_category(category))
            .collect())
    }

    /// Keyword search across the provider's index.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Article>, NewsApiError> {
        let key = self.api_key.as_deref().ok_or(NewsApiError::MissingApiKey)?;
        let query = query.trim();
        if query.is_empty() {
            return Err(NewsApiError::EmptyQuery);
        }
        let url = format!("{}/{}", self.base_url, self.provider.search_path());

        info!("Searching headlines for {:?}", query);

        let params = vec![
            ("token".to_string(), key.to_string()),
            ("lang".to_string(), "en".to_string()),
            ("q".to_string(), query.to_string()),
            ("max".to_string(), clamp_limit(limit).to_string()),
        ];

        let resp = request_with_retry(&self.transport, &self.sleeper, &url, &params, &self.policy)
            .await
            .map_err(|e| match e {
                RetryError::RateLimited { .. } => NewsApiError::RateLimited,
                other => NewsApiError::Search(other),
            })?;

        let articles = parse_articles(&resp)?;
        if articles.is_empty() {
            return Err(NewsApiError::NoSearchResults);
        }

        info!("Search for {:?} returned {} articles", query, articles.len());
        Ok(articles
            .into_iter()
            .map(|a| a.with_category("search"))
            .collect())
    }

    /// Fetch each category in order; the first failure aborts the batch.
    pub async fn fetch_dashboard(
        &self,
        categories: &[&str],
        limit: usize,
    ) -> Result<BTreeMap<String, Vec<Article>>, NewsApiError> {
        let mut out = BTreeMap::new();
        for category in categories {
            let articles = self.fetch_category(category, limit).await?;
            out.insert(category.to_string(), articles);
        }
        Ok(out)
    }
}

fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_ARTICLES_PER_REQUEST)
}

/// Turn a provider payload into articles, skipping entries with neither title
/// nor description. A `null` body or missing `articles` yields an empty list.
pub fn parse_articles(resp: &HttpResponse) -> Result<Vec<Article>, NewsApiError> {
    let data: Value = resp.json().map_err(|e| {
        warn!(
            "Failed to parse news response: {}; body preview: {}",
            e,
            resp.text_preview(500)
        );
        NewsApiError::InvalidJson
    })?;

    let empty = Vec::new();
    let entries = data
        .get("articles")
        .and_then(|a| a.as_array())
        .unwrap_or(&empty);

    let articles = entries
        .iter()
        .filter_map(|item| {
            let field = |name: &str| item.get(name).and_then(|v| v.as_str()).unwrap_or("");
            let source = item
                .get("source")
                .and_then(|s| s.get("name"))
                .and_then(|n| n.as_str())
                .unwrap_or("");
            Article::from_parts(
                field("title"),
                field("description"),
                field("url"),
                field("image"),
                source,
            )
        })
        .collect();

    Ok(articles)
}
