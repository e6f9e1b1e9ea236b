use crate::models::SessionState;
use crate::service::news::{Sleeper, Transport, MAX_ARTICLES_PER_REQUEST};

use super::{analyze, ask, auth, fetch, headlines, overall, search};
use super::{CommandResponse, Services, DEFAULT_FETCH_LIMIT};

/// Dispatch `@bot <command> ...` text to the same handlers the slash commands use.
pub async fn handle<T: Transport, S: Sleeper>(
    text: &str,
    services: &Services<T, S>,
    session: &mut SessionState,
) -> Result<CommandResponse, String> {
    let mut parts = text.split_whitespace();
    let cmd = parts
        .next()
        .ok_or_else(|| "No command provided. Try: ".to_string() + help_text())?
        .to_ascii_lowercase();
    let rest: Vec<&str> = parts.collect();

    match cmd.as_str() {
        "ping" => Ok(CommandResponse::text("Pong!")),
        "help" => Ok(CommandResponse::text(help_text())),
        "headlines" => {
            let category = rest
                .first()
                .ok_or("category required, e.g., headlines technology 5")?;
            let limit = rest
                .get(1)
                .map(|raw| parse_usize(raw))
                .transpose()
                .map_err(|e| format!("invalid limit: {e}"))?
                .unwrap_or(DEFAULT_FETCH_LIMIT)
                .clamp(1, MAX_ARTICLES_PER_REQUEST);
            headlines::handle_text(services, session, category, limit).await
        }
        "fetch" => fetch::handle_text(services, session).await,
        "search" => {
            let (query, limit) = split_trailing_limit(&rest);
            if query.is_empty() {
                return Err("query required, e.g., search electric cars 10".into());
            }
            search::handle_text(services, session, &query, limit).await
        }
        "overall" => overall::handle_text(services, session).await,
        "analyze" | "analyse" => {
            let index = rest
                .first()
                .ok_or("article number required, e.g., analyze 3 sports")?;
            let index = parse_usize(index).map_err(|e| format!("invalid index: {e}"))?;
            analyze::handle_text(services, session, index, rest.get(1).copied()).await
        }
        "ask" => {
            let (index, category, question) = split_ask_target(&rest)?;
            ask::handle_text(services, session, &question, index, category).await
        }
        "register" | "login" => Err(format!(
            "use the `/{cmd}` slash command so your password stays private"
        )),
        "logout" => Ok(auth::logout(session)),
        _ => Err(format!("Unknown command: {}. {}", cmd, help_text())),
    }
}

pub fn help_text() -> &'static str {
    "Usage: @Bot headlines CATEGORY [LIMIT] | fetch | search QUERY [LIMIT] | overall | analyze INDEX [CATEGORY] | ask [#INDEX [CATEGORY]] QUESTION | logout"
}

/// `search electric cars 10` searches "electric cars" with limit 10; a lone
/// number is treated as the query.
fn split_trailing_limit(words: &[&str]) -> (String, usize) {
    match words.split_last() {
        Some((last, head)) if !head.is_empty() => match parse_usize(last) {
            Ok(n) => (head.join(" "), n.clamp(1, MAX_ARTICLES_PER_REQUEST)),
            Err(_) => (words.join(" "), DEFAULT_FETCH_LIMIT),
        },
        _ => (words.join(" "), DEFAULT_FETCH_LIMIT),
    }
}

/// `ask #2 sports who won?` targets article 2 in sports; `ask #2 who won?`
/// uses the default lookup; anything else asks over the whole feed.
fn split_ask_target<'a>(
    words: &[&'a str],
) -> Result<(Option<usize>, Option<&'a str>, String), String> {
    let Some(target) = words.first().and_then(|w| w.strip_prefix('#')) else {
        return non_empty_question(None, None, words);
    };
    let index = parse_usize(target).map_err(|e| format!("invalid index: {e}"))?;

    let rest = &words[1..];
    match rest.first() {
        Some(word) if analyze::is_article_list(word) => {
            non_empty_question(Some(index), Some(*word), &rest[1..])
        }
        _ => non_empty_question(Some(index), None, rest),
    }
}

fn non_empty_question<'a>(
    index: Option<usize>,
    category: Option<&'a str>,
    words: &[&str],
) -> Result<(Option<usize>, Option<&'a str>, String), String> {
    if words.is_empty() {
        return Err("question required, e.g., ask what happened in tech today?".into());
    }
    Ok((index, category, words.join(" ")))
}

fn parse_usize(raw: &str) -> Result<usize, std::num::ParseIntError> {
    raw.parse::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_number_is_a_limit() {
        assert_eq!(
            split_trailing_limit(&["electric", "cars", "10"]),
            ("electric cars".to_string(), 10)
        );
        assert_eq!(
            split_trailing_limit(&["2024"]),
            ("2024".to_string(), DEFAULT_FETCH_LIMIT)
        );
        assert_eq!(
            split_trailing_limit(&["rust", "500"]),
            ("rust".to_string(), MAX_ARTICLES_PER_REQUEST)
        );
    }

    #[test]
    fn ask_target_is_optional() {
        let (index, category, question) =
            split_ask_target(&["#2", "Sports", "who", "won?"]).unwrap();
        assert_eq!((index, category), (Some(2), Some("Sports")));
        assert_eq!(question, "who won?");

        let (index, category, question) = split_ask_target(&["#1", "why?"]).unwrap();
        assert_eq!((index, category, question.as_str()), (Some(1), None, "why?"));

        let (index, _, question) = split_ask_target(&["what", "is", "GDP?"]).unwrap();
        assert_eq!(index, None);
        assert_eq!(question, "what is GDP?");

        let (index, category, question) =
            split_ask_target(&["#1", "science", "what", "was", "found?"]).unwrap();
        assert_eq!((index, category), (Some(1), Some("science")));
        assert_eq!(question, "what was found?");

        let (_, category, question) = split_ask_target(&["#4", "search", "who?"]).unwrap();
        assert_eq!((category, question.as_str()), (Some("search"), "who?"));

        assert!(split_ask_target(&["#x", "why"]).is_err());
        assert!(split_ask_target(&["#3"]).is_err());
    }
}
