use serenity::all::{CommandInteraction, CommandOptionType, CreateCommand, CreateCommandOption};
use tracing::info;

use crate::models::SessionState;
use crate::service::caching::collections::{authenticate_user, register_user};

use super::{get_str_opt, CommandResponse, Services};

const STORE_DISABLED: &str = "User accounts need the document store. Set REDIS_URL to enable them.";

fn credential_options(command: CreateCommand) -> CreateCommand {
    command
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "username", "Your username")
                .required(true),
        )
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "password", "Your password")
                .required(true),
        )
}

pub fn register_register_command() -> CreateCommand {
    credential_options(CreateCommand::new("register").description("Create a NewsPulse account"))
}

pub fn register_login_command() -> CreateCommand {
    credential_options(CreateCommand::new("login").description("Log in to NewsPulse"))
}

pub fn register_logout_command() -> CreateCommand {
    CreateCommand::new("logout").description("Log out of NewsPulse")
}

fn credentials(command: &CommandInteraction) -> Result<(&str, &str), String> {
    let username = get_str_opt(command, "username").ok_or("username is required")?;
    let password = get_str_opt(command, "password").ok_or("password is required")?;
    Ok((username, password))
}

pub async fn handle_register<T, S>(
    command: &CommandInteraction,
    services: &Services<T, S>,
) -> Result<CommandResponse, String> {
    let (username, password) = credentials(command)?;
    register(services, username, password).await
}

pub async fn handle_login<T, S>(
    command: &CommandInteraction,
    services: &Services<T, S>,
    session: &mut SessionState,
) -> Result<CommandResponse, String> {
    let (username, password) = credentials(command)?;
    login(services, session, username, password).await
}

pub async fn register<T, S>(
    services: &Services<T, S>,
    username: &str,
    password: &str,
) -> Result<CommandResponse, String> {
    let store = services.store.as_ref().ok_or(STORE_DISABLED)?;
    let created = register_user(store, username, password)
        .await
        .map_err(|e| e.to_string())?;

    if created {
        Ok(CommandResponse::text(format!(
            "✅ Account `{}` created. Log in with `/login`.",
            username.trim()
        )))
    } else {
        Err(format!("username `{}` is already taken", username.trim()))
    }
}

pub async fn login<T, S>(
    services: &Services<T, S>,
    session: &mut SessionState,
    username: &str,
    password: &str,
) -> Result<CommandResponse, String> {
    let store = services.store.as_ref().ok_or(STORE_DISABLED)?;
    let ok = authenticate_user(store, username, password)
        .await
        .map_err(|e| e.to_string())?;

    if !ok {
        return Err("invalid username or password".to_string());
    }

    let username = username.trim().to_string();
    info!("User {} logged in", username);
    let reply = format!("👋 Welcome back, **{}**!", username);
    session.username = Some(username);
    Ok(CommandResponse::text(reply))
}

pub fn logout(session: &mut SessionState) -> CommandResponse {
    let name = session.username.clone();
    session.logout();
    match name {
        Some(name) => CommandResponse::text(format!("Logged out `{}`.", name)),
        None => CommandResponse::text("You are not logged in."),
    }
}
