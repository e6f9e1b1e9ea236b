use chrono::Utc;
use serenity::all::{CommandInteraction, CommandOptionType, CreateCommand, CreateCommandOption};
use tracing::warn;

use crate::models::{AnalyzedDocument, Article, SessionState};
use crate::service::caching::collections::append_documents;
use crate::service::news::{Category, Sleeper, Transport};
use crate::service::viz::{bigram_chart, entities_count_table, entity_label_chart, word_frequency_chart};

use super::overall::{entity_table, pairs_summary};
use super::{chart_image, get_int_opt, get_str_opt, truncate_for_discord, CommandResponse, Services};

pub fn register_command() -> CreateCommand {
    CreateCommand::new("analyze")
        .description("Sentiment, keywords and entities for one article")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::Integer,
                "index",
                "Article number as listed by /headlines or /search",
            )
            .min_int_value(1)
            .required(true),
        )
        .add_option(category_option())
}

const SEARCH_TARGET: &str = "search";

/// Shared by `/analyze` and `/ask`: any `/headlines` category or `search`.
pub(crate) fn category_option() -> CreateCommandOption {
    let mut option = CreateCommandOption::new(
        CommandOptionType::String,
        "category",
        "Where the index points (default: search results, else all fetched news)",
    );
    for c in Category::ALL {
        option = option.add_string_choice(c.as_str(), c.as_str());
    }
    option.add_string_choice(SEARCH_TARGET, SEARCH_TARGET)
}

/// `true` for the values `category_option` offers.
pub(crate) fn is_article_list(word: &str) -> bool {
    word.trim().eq_ignore_ascii_case(SEARCH_TARGET) || Category::parse(word).is_some()
}

/// Find the article at 1-based `index`. Without a category the index points
/// into the search results when there are any, otherwise into all fetched news.
pub(crate) fn resolve_article(
    session: &SessionState,
    category: Option<&str>,
    index: usize,
) -> Result<Article, String> {
    let category = category.map(|c| c.trim().to_ascii_lowercase());
    let found = match category.as_deref() {
        Some(c) => session.article_at(c, index).cloned(),
        None if !session.search_results.is_empty() => session.article_at("search", index).cloned(),
        None => index
            .checked_sub(1)
            .and_then(|i| session.all_articles().into_iter().nth(i)),
    };

    found.ok_or_else(|| match category {
        Some(c) => format!("no article #{index} in `{c}`; fetch it first with `/headlines` or `/search`"),
        None => format!("no article #{index}; run `/fetch` or `/search` first"),
    })
}

pub async fn handle<T: Transport, S: Sleeper>(
    command: &CommandInteraction,
    services: &Services<T, S>,
    session: &mut SessionState,
) -> Result<CommandResponse, String> {
    let index = get_int_opt(command, "index").ok_or("index is required")?;
    let index = usize::try_from(index).map_err(|_| "index must be positive".to_string())?;
    let category = get_str_opt(command, "category");
    handle_text(services, session, index, category).await
}

pub async fn handle_text<T: Transport, S: Sleeper>(
    services: &Services<T, S>,
    session: &mut SessionState,
    index: usize,
    category: Option<&str>,
) -> Result<CommandResponse, String> {
    let article = resolve_article(session, category, index)?;
    let analysis = services
        .analysis
        .analyze_article(&article)
        .await
        .map_err(|e| format!("analysis failed: {e}"))?;

    if let Some(store) = &services.store {
        let document = AnalyzedDocument {
            username: session.username.clone(),
            article_id: Some(article.id.clone()),
            text: article.analysis_text().unwrap_or_default().to_string(),
            clean: analysis.clean.clone(),
            sentiment: analysis.sentiment.clone(),
            entities: analysis.entities.clone(),
            analyzed_at: Utc::now(),
        };
        if let Err(err) = append_documents(store, &[document]).await {
            warn!("Could not store analysis for {}: {}", article.id, err);
        }
    }

    let entity_lists = vec![analysis.entities.clone()];
    let title = if article.title.is_empty() { &article.description } else { &article.title };
    let mut lines = vec![format!("🧠 **{}**", title)];
    if !article.url.is_empty() {
        lines.push(format!("<{}>", article.url));
    }
    lines.push(format!(
        "**Sentiment:** {} ({:.2})",
        analysis.sentiment.label, analysis.sentiment.score
    ));
    lines.push(pairs_summary("Top words", &analysis.frequencies));
    lines.push(pairs_summary("Top bigrams", &analysis.bigrams));
    lines.push(entity_table(&entities_count_table(&entity_lists)));

    let images = [
        chart_image(word_frequency_chart(&analysis.frequencies), "word-frequencies.png"),
        chart_image(bigram_chart(&analysis.bigrams), "bigrams.png"),
        chart_image(entity_label_chart(&entity_lists), "entity-labels.png"),
    ]
    .into_iter()
    .flatten()
    .collect();

    session
        .article_sentiments
        .insert(article.id.clone(), analysis.sentiment.clone());
    session.open_analysis = Some(analysis);

    Ok(CommandResponse {
        content: truncate_for_discord(&lines.join("\n")),
        images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> Article {
        Article::from_parts(title, "", "", "", "").unwrap()
    }

    #[test]
    fn index_defaults_to_search_results() {
        let mut session = SessionState::default();
        session.set_category("sports", vec![article("Derby day")]);
        assert_eq!(resolve_article(&session, None, 1).unwrap().title, "Derby day");

        session.set_search_results("rust", vec![article("Rust 2.0")]);
        assert_eq!(resolve_article(&session, None, 1).unwrap().title, "Rust 2.0");
        assert_eq!(
            resolve_article(&session, Some("Sports"), 1).unwrap().title,
            "Derby day"
        );
    }

    #[test]
    fn missing_index_is_reported() {
        let session = SessionState::default();
        let err = resolve_article(&session, Some("sports"), 3).unwrap_err();
        assert!(err.contains("#3"));
        assert!(resolve_article(&session, None, 1).is_err());
    }

    #[test]
    fn every_headline_category_is_a_list() {
        for c in Category::ALL {
            assert!(is_article_list(c.as_str()));
        }
        assert!(is_article_list("Search"));
        assert!(!is_article_list("weather"));
    }
}
