mod common;

use common::{articles_json, offline_services, RecordingSleeper, ScriptedTransport};
use newspulse_bot::models::{Article, SessionState, DASHBOARD_CATEGORIES};
use newspulse_bot::service::chat::CHAT_UNAVAILABLE;
use newspulse_bot::service::command::{
    allowed_without_login, analyze, ask, fetch, headlines, mention, overall, search,
};

#[tokio::test]
async fn headlines_then_analyze_updates_session() {
    let transport = ScriptedTransport::new().respond(
        200,
        &articles_json(&["Nvidia shares surge on record demand", "Storm damage in Texas"]),
    );
    let services = offline_services(&transport, &RecordingSleeper::default());
    let mut session = SessionState::default();

    let listing = headlines::handle_text(&services, &mut session, "technology", 5)
        .await
        .unwrap();
    assert!(listing.content.contains("1. [Nvidia shares surge on record demand]"));
    assert_eq!(session.articles["technology"].len(), 2);

    analyze::handle_text(&services, &mut session, 1, Some("technology"))
        .await
        .unwrap();
    let open = session.open_analysis.as_ref().unwrap();
    assert_eq!(open.article_id, "https://news.test/0");
    assert!(session.article_sentiments.contains_key("https://news.test/0"));

    let err = analyze::handle_text(&services, &mut session, 9, Some("technology"))
        .await
        .unwrap_err();
    assert!(err.contains("#9"));
}

#[tokio::test]
async fn science_headlines_can_be_analysed_and_asked_about() {
    let transport = ScriptedTransport::new().respond(
        200,
        &articles_json(&["Telescope spots water on distant planet"]),
    );
    let services = offline_services(&transport, &RecordingSleeper::default());
    let mut session = SessionState::default();

    let listing = headlines::handle_text(&services, &mut session, "science", 5)
        .await
        .unwrap();
    assert!(listing.content.contains("category:science"));

    analyze::handle_text(&services, &mut session, 1, Some("science"))
        .await
        .unwrap();
    assert_eq!(
        session.open_analysis.as_ref().unwrap().article_id,
        "https://news.test/0"
    );

    mention::handle("analyze 1 science", &services, &mut session)
        .await
        .unwrap();

    let err = ask::handle_text(&services, &mut session, "why?", Some(3), Some("science"))
        .await
        .unwrap_err();
    assert!(err.contains("`science`"));
}

#[tokio::test]
async fn unknown_category_is_rejected_without_request() {
    let transport = ScriptedTransport::new();
    let services = offline_services(&transport, &RecordingSleeper::default());
    let mut session = SessionState::default();

    let err = headlines::handle_text(&services, &mut session, "gardening", 5)
        .await
        .unwrap_err();
    assert!(err.contains("unknown category"));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn fetch_resets_derived_state_and_overall_fills_it() {
    let mut transport = ScriptedTransport::new();
    for category in DASHBOARD_CATEGORIES {
        transport = transport.respond(
            200,
            &articles_json(&[format!("Great {category} win in London").as_str()]),
        );
    }
    let services = offline_services(&transport, &RecordingSleeper::default());
    let mut session = SessionState::default();
    let stale = Article::from_parts("Rust release", "", "", "", "").unwrap();
    session.set_search_results("rust", vec![stale]);

    fetch::handle_text(&services, &mut session).await.unwrap();
    assert_eq!(session.all_articles().len(), DASHBOARD_CATEGORIES.len());
    assert!(session.search_results.is_empty());

    let response = overall::handle_text(&services, &mut session).await.unwrap();
    assert!(response.content.contains("Overall analysis"));
    assert_eq!(session.overall.sentiments.len(), DASHBOARD_CATEGORIES.len());
    assert!(!session.overall.frequencies.is_empty());
}

#[tokio::test]
async fn search_results_are_the_default_analysis_target() {
    let transport = ScriptedTransport::new().respond(200, &articles_json(&["Rust 2.0 ships"]));
    let services = offline_services(&transport, &RecordingSleeper::default());
    let mut session = SessionState::default();

    search::handle_text(&services, &mut session, "rust", 5)
        .await
        .unwrap();
    assert_eq!(session.search_query, "rust");

    analyze::handle_text(&services, &mut session, 1, None)
        .await
        .unwrap();
    assert_eq!(
        session.open_analysis.as_ref().map(|a| a.title.as_str()),
        Some("Rust 2.0 ships")
    );
}

#[tokio::test]
async fn overall_needs_fetched_articles() {
    let transport = ScriptedTransport::new();
    let services = offline_services(&transport, &RecordingSleeper::default());
    let mut session = SessionState::default();

    let err = overall::handle_text(&services, &mut session).await.unwrap_err();
    assert!(err.contains("/fetch"));
}

#[tokio::test]
async fn ask_without_key_returns_notice() {
    let transport = ScriptedTransport::new();
    let services = offline_services(&transport, &RecordingSleeper::default());
    let mut session = SessionState::default();

    let reply = ask::handle_text(&services, &mut session, "What is GDP?", None, None)
        .await
        .unwrap();
    assert_eq!(reply.content, CHAT_UNAVAILABLE);
    assert!(session.chat_answers.is_empty());
}

#[tokio::test]
async fn mention_text_dispatches_to_commands() {
    let transport = ScriptedTransport::new().respond(200, &articles_json(&["Cup final tonight"]));
    let services = offline_services(&transport, &RecordingSleeper::default());
    let mut session = SessionState::default();

    let reply = mention::handle("headlines sports 3", &services, &mut session)
        .await
        .unwrap();
    assert!(reply.content.contains("Sports"));
    assert_eq!(transport.calls()[0].param("max"), Some("3"));

    assert!(mention::handle("login ada secret", &services, &mut session)
        .await
        .is_err());
    assert!(mention::handle("dance", &services, &mut session)
        .await
        .unwrap_err()
        .contains("Unknown command"));
}

#[test]
fn login_gate_allows_auth_commands() {
    assert!(allowed_without_login("login"));
    assert!(allowed_without_login("register"));
    assert!(!allowed_without_login("overall"));
    assert!(!services_require_login());
}

fn services_require_login() -> bool {
    let services = offline_services(&ScriptedTransport::new(), &RecordingSleeper::default());
    services.login_required()
}
