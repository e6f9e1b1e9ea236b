use serenity::all::{CommandInteraction, CommandOptionType, CreateCommand, CreateCommandOption};

use crate::models::SessionState;
use crate::service::chat::MAX_ANSWER_CHARS;
use crate::service::news::{Sleeper, Transport};

use super::analyze::{category_option, resolve_article};
use super::{get_int_opt, get_str_opt, truncate_for_discord, CommandResponse, Services};

pub fn register_command() -> CreateCommand {
    CreateCommand::new("ask")
        .description("Ask Nova about the news")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "question", "Your question")
                .required(true),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::Integer,
                "index",
                "Ask about one article instead of the whole feed",
            )
            .min_int_value(1),
        )
        .add_option(category_option())
}

pub async fn handle<T: Transport, S: Sleeper>(
    command: &CommandInteraction,
    services: &Services<T, S>,
    session: &mut SessionState,
) -> Result<CommandResponse, String> {
    let question = get_str_opt(command, "question").ok_or("question is required")?;
    let index = get_int_opt(command, "index")
        .map(usize::try_from)
        .transpose()
        .map_err(|_| "index must be positive".to_string())?;
    let category = get_str_opt(command, "category");
    handle_text(services, session, question, index, category).await
}

pub async fn handle_text<T, S>(
    services: &Services<T, S>,
    session: &mut SessionState,
    question: &str,
    index: Option<usize>,
    category: Option<&str>,
) -> Result<CommandResponse, String> {
    if question.trim().is_empty() {
        return Err("question is required".to_string());
    }

    let (articles, article_id) = match index {
        Some(i) => {
            let article = resolve_article(session, category, i)?;
            let id = article.id.clone();
            (vec![article], Some(id))
        }
        None => (session.all_articles(), None),
    };

    let answer = services
        .chat
        .ask(question, &articles)
        .await
        .map_err(|e| format!("chat failed: {e}"))?;

    if !answer.available {
        return Ok(CommandResponse::text(answer.text));
    }

    if let Some(id) = article_id {
        session.chat_answers.insert(id, answer.text.clone());
    }

    let mut content = format!("🤖 **Nova:** {}", answer.text);
    if answer.truncated {
        content.push_str(&format!("\n_(answer cut at {MAX_ANSWER_CHARS} characters)_"));
    }
    Ok(CommandResponse::text(truncate_for_discord(&content)))
}
