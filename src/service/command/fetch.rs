use serenity::all::CreateCommand;
use tracing::info;

use crate::models::{SessionState, DASHBOARD_CATEGORIES};
use crate::service::news::{Sleeper, Transport};

use super::{CommandResponse, Services, DEFAULT_FETCH_LIMIT};

pub fn register_command() -> CreateCommand {
    CreateCommand::new("fetch").description("Fetch fresh headlines for every dashboard category")
}

/// Refetch the dashboard. A failure in any category leaves the session as it was.
pub async fn handle_text<T: Transport, S: Sleeper>(
    services: &Services<T, S>,
    session: &mut SessionState,
) -> Result<CommandResponse, String> {
    let fetched = services
        .news
        .fetch_dashboard(&DASHBOARD_CATEGORIES, DEFAULT_FETCH_LIMIT)
        .await
        .map_err(|e| e.to_string())?;

    let mut lines = vec![format!("✅ Fetched news for {}", services.config.app_title)];
    for (category, articles) in &fetched {
        lines.push(format!("• {}: {} articles", category, articles.len()));
    }
    let total: usize = fetched.values().map(Vec::len).sum();
    info!("Dashboard refreshed with {} articles", total);

    session.replace_articles(fetched);
    lines.push("Run `/overall` for the combined analysis.".to_string());
    Ok(CommandResponse::text(lines.join("\n")))
}
