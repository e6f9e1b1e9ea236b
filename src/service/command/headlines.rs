use serenity::all::{CommandInteraction, CommandOptionType, CreateCommand, CreateCommandOption};

use crate::models::SessionState;
use crate::service::news::{Category, Sleeper, Transport, MAX_ARTICLES_PER_REQUEST};

use super::{
    article_lines, get_int_opt, get_str_opt, join_lines_within_limit, CommandResponse, Services,
    DEFAULT_FETCH_LIMIT,
};

pub fn register_command() -> CreateCommand {
    let mut category = CreateCommandOption::new(
        CommandOptionType::String,
        "category",
        "News category, e.g., technology",
    )
    .required(true);
    for c in Category::ALL {
        category = category.add_string_choice(c.as_str(), c.as_str());
    }

    CreateCommand::new("headlines")
        .description("Top headlines for one category")
        .add_option(category)
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::Integer,
                "limit",
                "How many headlines (1-100, default 20)",
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
    let category = get_str_opt(command, "category").ok_or("category is required")?;
    let limit = get_int_opt(command, "limit")
        .map(|l| l.clamp(1, MAX_ARTICLES_PER_REQUEST as i64) as usize)
        .unwrap_or(DEFAULT_FETCH_LIMIT);
    handle_text(services, session, category, limit).await
}

pub async fn handle_text<T: Transport, S: Sleeper>(
    services: &Services<T, S>,
    session: &mut SessionState,
    category: &str,
    limit: usize,
) -> Result<CommandResponse, String> {
    let category = Category::parse(category).ok_or_else(|| {
        let names: Vec<_> = Category::ALL.iter().map(|c| c.as_str()).collect();
        format!("unknown category `{}`; choose one of {}", category, names.join(", "))
    })?;

    let articles = services
        .news
        .fetch_category(category.as_str(), limit)
        .await
        .map_err(|e| e.to_string())?;

    let header = format!(
        "📰 **{}** headlines ({})",
        capitalize(category.as_str()),
        articles.len()
    );
    let mut lines = article_lines(&articles);
    lines.push(format!(
        "Analyse one with `/analyze index:1 category:{}`",
        category
    ));

    session.set_category(category.as_str(), articles);
    Ok(CommandResponse::text(join_lines_within_limit(&header, &lines)))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
