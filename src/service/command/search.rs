use serenity::all::{CommandInteraction, CommandOptionType, CreateCommand, CreateCommandOption};

use crate::models::SessionState;
use crate::service::news::{Sleeper, Transport, MAX_ARTICLES_PER_REQUEST};

use super::{
    article_lines, get_int_opt, get_str_opt, join_lines_within_limit, CommandResponse, Services,
    DEFAULT_FETCH_LIMIT,
};

pub fn register_command() -> CreateCommand {
    CreateCommand::new("search")
        .description("Search news by keyword")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "query", "Keywords to search for")
                .required(true),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::Integer,
                "limit",
                "How many results (1-100, default 20)",
            )
            .min_int_value(1)
            .max_int_value(MAX_ARTICLES_PER_REQUEST as u64),
        )
}

pub async fn handle<T: Transport, S: Sleeper>(
    command: &CommandInteraction,
    services: &Services<T, S>,
    session: &mut SessionState,
) -> Result<CommandResponse, String> {
    let query = get_str_opt(command, "query").ok_or("query is required")?;
    let limit = get_int_opt(command, "limit")
        .map(|l| l.clamp(1, MAX_ARTICLES_PER_REQUEST as i64) as usize)
        .unwrap_or(DEFAULT_FETCH_LIMIT);
    handle_text(services, session, query, limit).await
}

pub async fn handle_text<T: Transport, S: Sleeper>(
    services: &Services<T, S>,
    session: &mut SessionState,
    query: &str,
    limit: usize,
) -> Result<CommandResponse, String> {
    let results = services
        .news
        .search(query, limit)
        .await
        .map_err(|e| e.to_string())?;

    let header = format!("🔎 Results for **{}** ({})", query.trim(), results.len());
    let mut lines = article_lines(&results);
    lines.push("Analyse one with `/analyze index:1 category:search`".to_string());

    session.set_search_results(query.trim(), results);
    Ok(CommandResponse::text(join_lines_within_limit(&header, &lines)))
}
