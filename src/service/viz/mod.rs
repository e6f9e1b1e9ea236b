use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{json, Value};

use crate::models::{BigramPair, EntityCount, EntityLabel, EntityMention, FrequencyPair, SentimentResult};

pub mod render;

pub use render::{render_png, RenderError};

pub const BAR_COLOR: &str = "#4C78A8";
pub const SENTIMENT_HOLE: f32 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
}

/// Renderer-neutral chart description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub values: Vec<usize>,
    /// Donut hole as a fraction of the radius; pie only.
    pub hole: Option<f32>,
    /// X tick rotation in degrees; bar only.
    pub tick_angle: Option<i32>,
}

impl ChartSpec {
    fn bar(title: &str, x_label: &str, y_label: &str, pairs: Vec<(String, usize)>) -> Self {
        let (categories, values) = pairs.into_iter().unzip();
        Self {
            kind: ChartKind::Bar,
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            categories,
            values,
            hole: None,
            tick_angle: None,
        }
    }

    pub fn total(&self) -> usize {
        self.values.iter().sum()
    }

    /// Plotly figure JSON (`data` + `layout`).
    pub fn to_plotly_json(&self) -> Value {
        let trace = match self.kind {
            ChartKind::Bar => json!({
                "type": "bar",
                "x": self.categories,
                "y": self.values,
                "marker": { "color": BAR_COLOR },
            }),
            ChartKind::Pie => json!({
                "type": "pie",
                "labels": self.categories,
                "values": self.values,
                "hole": self.hole.unwrap_or(0.0),
                "textposition": "inside",
                "textinfo": "percent+label",
            }),
        };

        let mut layout = json!({
            "title": { "text": self.title },
            "template": "plotly_white",
        });
        if self.kind == ChartKind::Bar {
            layout["xaxis"] = json!({ "title": { "text": self.x_label } });
            layout["yaxis"] = json!({ "title": { "text": self.y_label } });
            if let Some(angle) = self.tick_angle {
                layout["xaxis"]["tickangle"] = json!(angle);
            }
        }

        json!({ "data": [trace], "layout": layout })
    }
}

pub fn word_frequency_chart(freq_pairs: &[FrequencyPair]) -> Option<ChartSpec> {
    if freq_pairs.is_empty() {
        return None;
    }
    let mut chart = ChartSpec::bar("Top Word Frequencies", "Word", "Frequency", freq_pairs.to_vec());
    chart.tick_angle = Some(-45);
    Some(chart)
}

pub fn bigram_chart(bigrams: &[BigramPair]) -> Option<ChartSpec> {
    if bigrams.is_empty() {
        return None;
    }
    let mut chart = ChartSpec::bar("Top Bigrams", "Bigram", "Frequency", bigrams.to_vec());
    chart.tick_angle = Some(-45);
    Some(chart)
}

/// Pie of label counts, slices in alphabetical label order.
pub fn sentiment_distribution_chart(sentiments: &[SentimentResult]) -> Option<ChartSpec> {
    if sentiments.is_empty() {
        return None;
    }

    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for s in sentiments {
        *counts.entry(s.label.as_str()).or_default() += 1;
    }

    let (categories, values) = counts
        .into_iter()
        .map(|(label, n)| (label.to_string(), n))
        .unzip();
    Some(ChartSpec {
        kind: ChartKind::Pie,
        title: "Sentiment Distribution".to_string(),
        x_label: "Label".to_string(),
        y_label: "Count".to_string(),
        categories,
        values,
        hole: Some(SENTIMENT_HOLE),
        tick_angle: None,
    })
}

/// Mentions per entity label, labels in alphabetical order.
pub fn entity_label_chart(entities_lists: &[Vec<EntityMention>]) -> Option<ChartSpec> {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for mention in entities_lists.iter().flatten() {
        *counts.entry(mention.label.as_str()).or_default() += 1;
    }
    if counts.is_empty() {
        return None;
    }

    let pairs = counts
        .into_iter()
        .map(|(label, n)| (label.to_string(), n))
        .collect();
    Some(ChartSpec::bar("Entity Labels", "label", "count", pairs))
}

/// `(label, entity, count)` rows, most frequent first; ties ordered by label
/// then entity.
pub fn entities_count_table(entities_lists: &[Vec<EntityMention>]) -> Vec<EntityCount> {
    let mut counts: HashMap<(EntityLabel, &str), usize> = HashMap::new();
    for mention in entities_lists.iter().flatten() {
        *counts
            .entry((mention.label, mention.text.as_str()))
            .or_default() += 1;
    }

    let mut rows: Vec<EntityCount> = counts
        .into_iter()
        .map(|((label, entity), count)| EntityCount {
            label,
            entity: entity.to_string(),
            count,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.label.as_str().cmp(b.label.as_str()))
            .then_with(|| a.entity.cmp(&b.entity))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentimentLabel;

    fn mention(text: &str, label: EntityLabel) -> EntityMention {
        EntityMention {
            text: text.to_string(),
            label,
            start: 0,
            end: text.len(),
            score: None,
        }
    }

    #[test]
    fn pie_slices_are_alphabetical() {
        let s = |label| SentimentResult { label, score: 0.9 };
        let chart = sentiment_distribution_chart(&[
            s(SentimentLabel::Positive),
            s(SentimentLabel::Neutral),
            s(SentimentLabel::Positive),
            s(SentimentLabel::Negative),
        ])
        .unwrap();
        assert_eq!(chart.categories, vec!["negative", "neutral", "positive"]);
        assert_eq!(chart.values, vec![1, 1, 2]);
        assert_eq!(chart.hole, Some(0.35));
    }

    #[test]
    fn entity_table_counts_across_lists() {
        let lists = vec![
            vec![mention("Tesla", EntityLabel::Org), mention("Berlin", EntityLabel::Gpe)],
            vec![mention("Tesla", EntityLabel::Org)],
        ];
        let rows = entities_count_table(&lists);
        assert_eq!(rows[0].entity, "Tesla");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[1].entity, "Berlin");

        let chart = entity_label_chart(&lists).unwrap();
        assert_eq!(chart.categories, vec!["GPE", "ORG"]);
        assert_eq!(chart.values, vec![1, 2]);
    }

    #[test]
    fn plotly_export_has_trace_and_layout() {
        let chart = word_frequency_chart(&[("market".to_string(), 3)]).unwrap();
        let fig = chart.to_plotly_json();
        assert_eq!(fig["data"][0]["type"], "bar");
        assert_eq!(fig["data"][0]["x"][0], "market");
        assert_eq!(fig["layout"]["xaxis"]["tickangle"], -45);
        assert_eq!(fig["layout"]["title"]["text"], "Top Word Frequencies");
    }
}
