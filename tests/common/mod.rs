#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use newspulse_bot::service::chat::ChatService;
use newspulse_bot::service::command::Services;
use newspulse_bot::service::news::{HttpResponse, NewsClient, Sleeper, Transport, TransportError};
use newspulse_bot::service::nlp::AnalysisService;
use newspulse_bot::AppConfig;

pub const BASE_URL: &str = "https://gnews.test/api/v4";

/// One recorded GET: url plus query parameters.
#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl Call {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Replays queued responses in order and records every request.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.push(Ok(HttpResponse::new(status, body)))
    }

    pub fn push(self, response: Result<HttpResponse, TransportError>) -> Self {
        self.script.lock().unwrap().push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn get(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            params: params.to_vec(),
        });
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("script exhausted".to_string())));
        async move { next }
    }
}

/// Records requested delays without waiting.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) -> impl Future<Output = ()> + Send {
        self.delays.lock().unwrap().push(delay);
        async {}
    }
}

pub fn articles_json(titles: &[&str]) -> String {
    let articles: Vec<serde_json::Value> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            serde_json::json!({
                "title": title,
                "description": format!("{title} according to officials"),
                "url": format!("https://news.test/{i}"),
                "image": "",
                "source": { "name": "Test Wire" },
            })
        })
        .collect();
    serde_json::json!({ "totalArticles": articles.len(), "articles": articles }).to_string()
}

pub fn news_client(
    transport: &ScriptedTransport,
    sleeper: &RecordingSleeper,
) -> NewsClient<ScriptedTransport, RecordingSleeper> {
    NewsClient::with_transport(
        Some("test-key".to_string()),
        BASE_URL,
        transport.clone(),
        sleeper.clone(),
    )
}

/// Offline services: scripted news, lexicon sentiment, rule entities, no chat key, no store.
pub fn offline_services(
    transport: &ScriptedTransport,
    sleeper: &RecordingSleeper,
) -> Services<ScriptedTransport, RecordingSleeper> {
    let config = AppConfig::default();
    Services {
        news: news_client(transport, sleeper),
        analysis: AnalysisService::offline(),
        chat: ChatService::new(&config).expect("chat client builds"),
        store: None,
        config,
    }
}
