use serde::{Deserialize, Serialize};

/// A normalized headline from the news provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// URL when present, title otherwise.
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image: String,
    pub source: String,
    /// Title and description joined with ". ".
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Article {
    /// Build an article from already-extracted provider fields.
    ///
    /// Returns `None` when both title and description are blank.
    pub fn from_parts(
        title: &str,
        description: &str,
        url: &str,
        image: &str,
        source: &str,
    ) -> Option<Self> {
        let title = title.trim();
        let description = description.trim();
        if title.is_empty() && description.is_empty() {
            return None;
        }

        let url = url.trim();
        let id = if url.is_empty() { title } else { url };

        Some(Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            url: url.to_string(),
            image: image.trim().to_string(),
            source: source.trim().to_string(),
            content: join_content(title, description),
            category: None,
        })
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Text fed to the analysis pipeline: content, then description, then title.
    pub fn analysis_text(&self) -> Option<&str> {
        [&self.content, &self.description, &self.title]
            .into_iter()
            .map(|s| s.as_str())
            .find(|s| !s.is_empty())
    }
}

fn join_content(title: &str, description: &str) -> String {
    let joined = [title, description]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(". ");
    joined.trim_matches(|c| c == '.' || c == ' ').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_falls_back_to_title() {
        let a = Article::from_parts("Markets rally", "", "", "", "Reuters").unwrap();
        assert_eq!(a.id, "Markets rally");
        assert_eq!(a.content, "Markets rally");
    }

    #[test]
    fn content_strips_trailing_periods() {
        let a = Article::from_parts("Title.", "Body text.", "https://x.test/a", "", "").unwrap();
        assert_eq!(a.id, "https://x.test/a");
        assert_eq!(a.content, "Title.. Body text");
    }

    #[test]
    fn blank_entries_are_rejected() {
        assert!(Article::from_parts("  ", "", "https://x.test", "", "").is_none());
    }
}
