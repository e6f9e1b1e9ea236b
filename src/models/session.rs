use std::collections::{BTreeMap, HashMap};

use super::{Article, ArticleAnalysis, OverallAnalysis, SentimentResult};

/// Categories shown on the dashboard and fetched by `/fetch`.
pub const DASHBOARD_CATEGORIES: [&str; 4] = ["entertainment", "finance", "sports", "technology"];

/// Everything one user has fetched and computed during their session.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub articles: BTreeMap<String, Vec<Article>>,
    pub search_results: Vec<Article>,
    pub search_query: String,
    pub article_sentiments: HashMap<String, SentimentResult>,
    pub overall: OverallAnalysis,
    pub open_analysis: Option<ArticleAnalysis>,
    pub chat_answers: HashMap<String, String>,
    pub username: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            articles: DASHBOARD_CATEGORIES
                .iter()
                .map(|c| (c.to_string(), Vec::new()))
                .collect(),
            search_results: Vec::new(),
            search_query: String::new(),
            article_sentiments: HashMap::new(),
            overall: OverallAnalysis::default(),
            open_analysis: None,
            chat_answers: HashMap::new(),
            username: None,
        }
    }
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        self.username.is_some()
    }

    /// Replace the dashboard articles and drop everything derived from the old batch.
    pub fn replace_articles(&mut self, fetched: BTreeMap<String, Vec<Article>>) {
        self.articles = fetched;
        self.article_sentiments.clear();
        self.overall = OverallAnalysis::default();
        self.open_analysis = None;
        self.search_results.clear();
    }

    pub fn set_category(&mut self, category: &str, articles: Vec<Article>) {
        self.articles.insert(category.to_string(), articles);
    }

    pub fn set_search_results(&mut self, query: &str, results: Vec<Article>) {
        self.search_query = query.to_string();
        self.search_results = results;
        self.open_analysis = None;
    }

    /// All dashboard articles, in category order.
    pub fn all_articles(&self) -> Vec<Article> {
        self.articles.values().flatten().cloned().collect()
    }

    /// Look up an article by 1-based index within a category, or within the
    /// search results when `category` is `"search"`.
    pub fn article_at(&self, category: &str, index: usize) -> Option<&Article> {
        let list = if category == "search" {
            Some(&self.search_results)
        } else {
            self.articles.get(category)
        }?;
        index.checked_sub(1).and_then(|i| list.get(i))
    }

    pub fn logout(&mut self) {
        self.username = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> Article {
        Article::from_parts(title, "", "", "", "").unwrap()
    }

    #[test]
    fn default_has_dashboard_categories() {
        let state = SessionState::default();
        let keys: Vec<_> = state.articles.keys().map(String::as_str).collect();
        assert_eq!(keys, DASHBOARD_CATEGORIES.to_vec());
    }

    #[test]
    fn replacing_articles_resets_derived_state() {
        let mut state = SessionState::default();
        state.set_search_results("rust", vec![article("a")]);
        state.chat_answers.insert("x".into(), "kept".into());

        let mut fetched = BTreeMap::new();
        fetched.insert("sports".to_string(), vec![article("b")]);
        state.replace_articles(fetched);

        assert!(state.search_results.is_empty());
        assert_eq!(state.all_articles().len(), 1);
        assert_eq!(state.chat_answers.len(), 1);
    }

    #[test]
    fn article_lookup_is_one_based() {
        let mut state = SessionState::default();
        state.set_category("sports", vec![article("first"), article("second")]);
        assert_eq!(state.article_at("sports", 2).map(|a| a.title.as_str()), Some("second"));
        assert!(state.article_at("sports", 0).is_none());
        assert!(state.article_at("sports", 3).is_none());
    }
}
