use std::fmt;

/// Categories the dashboard knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Entertainment,
    Finance,
    Business,
    Technology,
    Sports,
    Science,
    Health,
    World,
    Nation,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Entertainment,
        Category::Finance,
        Category::Business,
        Category::Technology,
        Category::Sports,
        Category::Science,
        Category::Health,
        Category::World,
        Category::Nation,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == raw)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Entertainment => "entertainment",
            Category::Finance => "finance",
            Category::Business => "business",
            Category::Technology => "technology",
            Category::Sports => "sports",
            Category::Science => "science",
            Category::Health => "health",
            Category::World => "world",
            Category::Nation => "nation",
        }
    }

    /// GNews has no finance topic; it lives under business.
    pub fn provider_category(&self) -> &'static str {
        match self {
            Category::Finance => "business",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider category for a raw UI category; unknown names fall back to entertainment.
pub fn map_category(raw: &str) -> &'static str {
    Category::parse(raw)
        .unwrap_or(Category::Entertainment)
        .provider_category()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finance_maps_to_business() {
        assert_eq!(map_category("finance"), "business");
        assert_eq!(map_category("Finance "), "business");
    }

    #[test]
    fn known_categories_pass_through() {
        for c in ["business", "technology", "sports", "science", "health", "world", "nation"] {
            assert_eq!(map_category(c), c);
        }
    }

    #[test]
    fn unknown_category_falls_back() {
        assert_eq!(map_category("gardening"), "entertainment");
        assert_eq!(map_category(""), "entertainment");
    }
}
