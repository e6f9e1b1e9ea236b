use serenity::all::CreateCommand;

use crate::models::{EntityCount, SentimentResult, SessionState};
use crate::service::news::{Sleeper, Transport};
use crate::service::viz::{
    bigram_chart, entities_count_table, entity_label_chart, sentiment_distribution_chart,
    word_frequency_chart,
};

use super::{chart_image, truncate_for_discord, CommandResponse, Services};

const SUMMARY_ROWS: usize = 10;

pub fn register_command() -> CreateCommand {
    CreateCommand::new("overall")
        .description("Sentiment, word statistics and entities across all fetched news")
}

pub async fn handle_text<T: Transport, S: Sleeper>(
    services: &Services<T, S>,
    session: &mut SessionState,
) -> Result<CommandResponse, String> {
    let articles = session.all_articles();
    if articles.is_empty() {
        return Err("No articles fetched yet. Run `/fetch` first.".to_string());
    }

    let overall = services
        .analysis
        .analyze_overall(&articles)
        .await
        .map_err(|e| format!("analysis failed: {e}"))?;

    let mut lines = vec![format!(
        "📊 **Overall analysis** of {} articles (sentiment: `{}`, entities: `{}`)",
        overall.sentiments.len(),
        services.analysis.sentiment_model(),
        services.analysis.ner_model()
    )];
    lines.push(sentiment_summary(&overall.sentiments));
    lines.push(pairs_summary("Top words", &overall.frequencies));
    lines.push(pairs_summary("Top bigrams", &overall.bigrams));
    lines.push(entity_table(&entities_count_table(&overall.entities)));

    let images = [
        chart_image(sentiment_distribution_chart(&overall.sentiments), "sentiment.png"),
        chart_image(word_frequency_chart(&overall.frequencies), "word-frequencies.png"),
        chart_image(bigram_chart(&overall.bigrams), "bigrams.png"),
        chart_image(entity_label_chart(&overall.entities), "entity-labels.png"),
    ]
    .into_iter()
    .flatten()
    .collect();

    session.overall = overall;
    Ok(CommandResponse {
        content: truncate_for_discord(&lines.join("\n")),
        images,
    })
}

/// `Sentiment: positive 3 · neutral 2`, labels in first-seen order.
pub(crate) fn sentiment_summary(sentiments: &[SentimentResult]) -> String {
    match sentiment_distribution_chart(sentiments) {
        Some(chart) => {
            let parts: Vec<String> = chart
                .categories
                .iter()
                .zip(&chart.values)
                .map(|(label, n)| format!("{label} {n}"))
                .collect();
            format!("**Sentiment:** {}", parts.join(" · "))
        }
        None => "**Sentiment:** n/a".to_string(),
    }
}

pub(crate) fn pairs_summary(title: &str, pairs: &[(String, usize)]) -> String {
    if pairs.is_empty() {
        return format!("**{title}:** none");
    }
    let shown: Vec<String> = pairs
        .iter()
        .take(SUMMARY_ROWS)
        .map(|(term, n)| format!("{term} ({n})"))
        .collect();
    format!("**{title}:** {}", shown.join(", "))
}

pub(crate) fn entity_table(rows: &[EntityCount]) -> String {
    if rows.is_empty() {
        return "**Top entities:** none found".to_string();
    }
    let mut out = String::from("**Top entities:**");
    for row in rows.iter().take(SUMMARY_ROWS) {
        out.push_str(&format!("\n`{:<6}` {} ({})", row.label.as_str(), row.entity, row.count));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityLabel, SentimentLabel};

    #[test]
    fn summaries_handle_empty_input() {
        assert_eq!(sentiment_summary(&[]), "**Sentiment:** n/a");
        assert_eq!(pairs_summary("Top words", &[]), "**Top words:** none");
        assert_eq!(entity_table(&[]), "**Top entities:** none found");
    }

    #[test]
    fn sentiment_summary_counts_labels() {
        let s = |label| SentimentResult { label, score: 0.8 };
        let text = sentiment_summary(&[
            s(SentimentLabel::Positive),
            s(SentimentLabel::Negative),
            s(SentimentLabel::Positive),
        ]);
        assert_eq!(text, "**Sentiment:** negative 1 · positive 2");
    }

    #[test]
    fn entity_rows_are_capped() {
        let rows: Vec<EntityCount> = (0..15)
            .map(|i| EntityCount {
                label: EntityLabel::Org,
                entity: format!("Org {i}"),
                count: 1,
            })
            .collect();
        assert_eq!(entity_table(&rows).lines().count(), 1 + SUMMARY_ROWS);
    }
}
