use newspulse_bot::models::{Article, EntityLabel, SentimentLabel};
use newspulse_bot::service::nlp::{
    compute_top_bigrams, compute_top_frequencies, normalize_label, preprocess_texts,
    AnalysisService, LexiconScorer,
};

#[test]
fn top_frequencies_count_across_lists() {
    let lists = vec![vec!["a", "b", "a"]];
    assert_eq!(
        compute_top_frequencies(&lists, 2),
        vec![("a".to_string(), 2), ("b".to_string(), 1)]
    );
}

#[test]
fn top_bigrams_join_adjacent_tokens() {
    let lists = vec![vec!["a", "b", "c"]];
    assert_eq!(
        compute_top_bigrams(&lists, 5),
        vec![("a b".to_string(), 1), ("b c".to_string(), 1)]
    );
}

#[test]
fn preprocessing_keeps_raw_text() {
    let out = preprocess_texts(&["Investors were buying shares", ""]);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].raw, "Investors were buying shares");
    assert_eq!(out[0].tokens, vec!["investor", "buy", "share"]);
    assert_eq!(out[1].clean, "");
    assert!(out[1].tokens.is_empty());
}

#[test]
fn indexed_labels_follow_the_model() {
    assert_eq!(
        normalize_label("LABEL_2", "cardiffnlp/twitter-roberta-base-sentiment"),
        SentimentLabel::Positive
    );
    assert_eq!(
        normalize_label("LABEL_1", "distilbert-base-uncased-finetuned-sst-2-english"),
        SentimentLabel::Positive
    );
    assert_eq!(normalize_label("mixed", "any"), SentimentLabel::Neutral);
}

#[test]
fn lexicon_handles_negation() {
    let scorer = LexiconScorer::new();
    assert!(scorer.polarity("a great win for fans") > 0.0);
    assert!(scorer.polarity("not a great win for fans") < 0.0);
    assert_eq!(
        scorer.classify("The committee met on Tuesday").label,
        SentimentLabel::Neutral
    );
}

#[tokio::test]
async fn article_analysis_offline() {
    let service = AnalysisService::offline();
    let article = Article::from_parts(
        "Microsoft shares surge after strong earnings",
        "Investors in London cheered the record growth",
        "https://news.test/msft",
        "",
        "Wire",
    )
    .unwrap();

    let analysis = service.analyze_article(&article).await.unwrap();

    assert_eq!(analysis.article_id, "https://news.test/msft");
    assert_eq!(analysis.sentiment.label, SentimentLabel::Positive);
    assert!((0.0..=1.0).contains(&analysis.sentiment.score));
    assert!(analysis.frequencies.len() <= 15);
    assert!(analysis
        .entities
        .iter()
        .any(|e| e.text == "London" && e.label == EntityLabel::Gpe));
}

#[tokio::test]
async fn negated_headline_keeps_its_negation() {
    let service = AnalysisService::offline();
    let article = Article::from_parts(
        "Investors are not happy with the results",
        "",
        "https://news.test/results",
        "",
        "Wire",
    )
    .unwrap();

    let analysis = service.analyze_article(&article).await.unwrap();
    let direct = service
        .predict_sentiment(&[article.content.clone()])
        .await
        .unwrap();

    assert_eq!(analysis.clean, "investor happy result");
    assert_eq!(analysis.sentiment.label, SentimentLabel::Negative);
    assert_eq!(analysis.sentiment.label, direct[0].label);
    assert!((analysis.sentiment.score - direct[0].score).abs() < 1e-6);
}

#[tokio::test]
async fn overall_analysis_of_nothing_is_empty() {
    let service = AnalysisService::offline();
    let overall = service.analyze_overall(&[]).await.unwrap();
    assert!(overall.is_empty());
}

#[tokio::test]
async fn registry_reuses_loaded_backends() {
    let service = AnalysisService::offline();
    let texts = vec!["good news".to_string()];
    service.predict_sentiment(&texts).await.unwrap();
    service.predict_sentiment(&texts).await.unwrap();
    service.extract_entities(&texts).await.unwrap();
    assert_eq!(service.registry().len(), 2);
}
