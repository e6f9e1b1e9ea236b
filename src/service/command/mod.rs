use serenity::all::{CommandDataOptionValue, CommandInteraction, CreateAttachment};
use tracing::warn;

use crate::config::AppConfig;
use crate::models::Article;
use crate::service::caching::RedisCache;
use crate::service::chat::ChatService;
use crate::service::news::{NewsClient, ReqwestTransport, TokioSleeper};
use crate::service::nlp::AnalysisService;
use crate::service::viz::{render_png, ChartSpec};

pub mod analyze;
pub mod ask;
pub mod auth;
pub mod fetch;
pub mod headlines;
pub mod mention;
pub mod overall;
pub mod search;

/// Default article count for dashboard fetches and searches.
pub const DEFAULT_FETCH_LIMIT: usize = 20;

/// Discord rejects message content over 2000 characters.
pub const DISCORD_CONTENT_LIMIT: usize = 1900;

/// Long-lived services shared by every command.
pub struct Services<T = ReqwestTransport, S = TokioSleeper> {
    pub config: AppConfig,
    pub news: NewsClient<T, S>,
    pub analysis: AnalysisService,
    pub chat: ChatService,
    pub store: Option<RedisCache>,
}

impl<T, S> Services<T, S> {
    /// Commands other than auth need a login when the gate is on and the
    /// store is reachable.
    pub fn login_required(&self) -> bool {
        self.config.require_login && self.store.is_some()
    }
}

/// Commands that stay usable before `/login` when the gate is on.
pub fn allowed_without_login(command: &str) -> bool {
    matches!(command, "ping" | "help" | "register" | "login" | "logout")
}

#[derive(Debug, Clone)]
pub struct ChartImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Text plus optional PNG attachments for a single reply.
#[derive(Debug, Clone, Default)]
pub struct CommandResponse {
    pub content: String,
    pub images: Vec<ChartImage>,
}

impl CommandResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            images: Vec::new(),
        }
    }

    pub fn attachments(&self) -> Vec<CreateAttachment> {
        self.images
            .iter()
            .map(|img| CreateAttachment::bytes(img.bytes.clone(), img.filename.clone()))
            .collect()
    }
}

/// Render a chart for attachment; a missing font or encoder failure just
/// leaves the chart out.
pub fn chart_image(chart: Option<ChartSpec>, filename: &str) -> Option<ChartImage> {
    let chart = chart?;
    match render_png(&chart) {
        Ok(bytes) => Some(ChartImage {
            filename: filename.to_string(),
            bytes,
        }),
        Err(err) => {
            warn!("Could not render {}: {}", chart.title, err);
            None
        }
    }
}

pub fn truncate_for_discord(text: &str) -> String {
    if text.chars().count() <= DISCORD_CONTENT_LIMIT {
        return text.to_string();
    }
    let cut: String = text.chars().take(DISCORD_CONTENT_LIMIT - 1).collect();
    format!("{}…", cut.trim_end())
}

/// One numbered line per article: `1. [title](url) — source`.
pub fn article_lines(articles: &[Article]) -> Vec<String> {
    articles
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let title = if a.title.is_empty() { &a.description } else { &a.title };
            let link = if a.url.is_empty() {
                title.to_string()
            } else {
                format!("[{}](<{}>)", title, a.url)
            };
            if a.source.is_empty() {
                format!("{}. {}", i + 1, link)
            } else {
                format!("{}. {} — {}", i + 1, link, a.source)
            }
        })
        .collect()
}

/// Append lines until the Discord limit, noting how many were left out.
pub fn join_lines_within_limit(header: &str, lines: &[String]) -> String {
    let mut out = header.to_string();
    for (shown, line) in lines.iter().enumerate() {
        let remaining = lines.len() - shown;
        let footer = format!("\n…and {} more", remaining);
        if out.chars().count() + line.chars().count() + 1 + footer.chars().count()
            > DISCORD_CONTENT_LIMIT
        {
            out.push_str(&footer);
            return out;
        }
        out.push('\n');
        out.push_str(line);
    }
    out
}

pub fn get_str_opt<'a>(command: &'a CommandInteraction, name: &str) -> Option<&'a str> {
    command
        .data
        .options
        .iter()
        .find(|o| o.name == name)
        .and_then(|o| match o.value {
            CommandDataOptionValue::String(ref s) => Some(s.as_str()),
            _ => None,
        })
}

pub fn get_int_opt(command: &CommandInteraction, name: &str) -> Option<i64> {
    command
        .data
        .options
        .iter()
        .find(|o| o.name == name)
        .and_then(|o| match o.value {
            CommandDataOptionValue::Integer(i) => Some(i),
            _ => None,
        })
}
