use std::{collections::HashMap, env, sync::Arc};

use anyhow::Result;
use dotenv::dotenv;
use serenity::all::{
    ApplicationId, Command, CommandInteraction, CreateCommand, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateMessage, EditAttachments, EditInteractionResponse,
    EditMessage, GatewayIntents, GuildId, Interaction, Message, UserId,
};
use serenity::{async_trait, model::gateway::Ready, prelude::*, Client};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use newspulse_bot::models::SessionState;
use newspulse_bot::service::caching::collections::document_count;
use newspulse_bot::service::caching::RedisCache;
use newspulse_bot::service::chat::ChatService;
use newspulse_bot::service::command::{
    allowed_without_login, analyze as analyze_cmd, ask as ask_cmd, auth as auth_cmd,
    fetch as fetch_cmd, headlines as headlines_cmd, mention as mention_cmd,
    overall as overall_cmd, search as search_cmd, CommandResponse, Services,
};
use newspulse_bot::service::news::NewsClient;
use newspulse_bot::service::nlp::AnalysisService;
use newspulse_bot::AppConfig;

const LOGIN_REQUIRED: &str = "Please log in first with `/login` (or `/register`).";

struct Handler {
    services: Arc<Services>,
    sessions: Mutex<HashMap<UserId, Arc<Mutex<SessionState>>>>,
}

impl Handler {
    /// Each user gets their own session; commands from one user run one at a time.
    async fn session(&self, user: UserId) -> Arc<Mutex<SessionState>> {
        let mut sessions = self.sessions.lock().await;
        sessions.entry(user).or_default().clone()
    }

    async fn dispatch(
        &self,
        command: &CommandInteraction,
        session: &mut SessionState,
    ) -> Result<CommandResponse, String> {
        let name = command.data.name.as_str();
        if self.services.login_required() && !allowed_without_login(name) && !session.is_logged_in()
        {
            return Err(LOGIN_REQUIRED.to_string());
        }

        let services = self.services.as_ref();
        match name {
            "headlines" => headlines_cmd::handle(command, services, session).await,
            "fetch" => fetch_cmd::handle_text(services, session).await,
            "search" => search_cmd::handle(command, services, session).await,
            "overall" => overall_cmd::handle_text(services, session).await,
            "analyze" => analyze_cmd::handle(command, services, session).await,
            "ask" => ask_cmd::handle(command, services, session).await,
            "register" => auth_cmd::handle_register(command, services).await,
            "login" => auth_cmd::handle_login(command, services, session).await,
            "logout" => Ok(auth_cmd::logout(session)),
            _ => Err("Command not implemented.".to_string()),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        #[cfg(debug_assertions)]
        let use_guild_commands = true;
        #[cfg(not(debug_assertions))]
        let use_guild_commands = false;

        if use_guild_commands {
            let guild_ids_str = env::var("GUILD_IDS")
                .unwrap_or_else(|_| env::var("GUILD_ID").unwrap_or_default());

            let guild_ids: Vec<GuildId> = guild_ids_str
                .split(',')
                .filter_map(|id| id.trim().parse::<u64>().ok())
                .map(GuildId::new)
                .collect();

            if !guild_ids.is_empty() {
                for guild_id in guild_ids.iter() {
                    for command in all_commands() {
                        if let Err(err) = guild_id.create_command(&ctx.http, command).await {
                            warn!("Failed to register command in guild {}: {}", guild_id, err);
                        }
                    }
                    info!("Guild commands registered for guild ID: {}", guild_id);
                }
                info!(
                    "{} is connected. [DEV MODE] Guild commands registered instantly for {} server(s).",
                    ready.user.name,
                    guild_ids.len()
                );
            } else {
                info!(
                    "{} is connected. [DEV MODE] No GUILD_IDS found, falling back to global commands.",
                    ready.user.name
                );
                register_global_commands(&ctx).await;
            }
        } else {
            register_global_commands(&ctx).await;
            info!(
                "{} is connected. [PRODUCTION MODE] Global commands registered (may take up to 1 hour).",
                ready.user.name
            );
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };

        if command.data.name == "ping" {
            let _ = command
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new().content("Pong!"),
                    ),
                )
                .await;
            return;
        }

        // Credentials never show up in the channel.
        let private = matches!(command.data.name.as_str(), "register" | "login" | "logout");
        let _ = command
            .create_response(
                &ctx.http,
                CreateInteractionResponse::Defer(
                    CreateInteractionResponseMessage::new().ephemeral(private),
                ),
            )
            .await;

        let session = self.session(command.user.id).await;
        let result = {
            let mut session = session.lock().await;
            self.dispatch(&command, &mut session).await
        };

        let edit = match result {
            Ok(response) => {
                let mut edit = EditInteractionResponse::new().content(response.content.clone());
                let attachments = response.attachments();
                if !attachments.is_empty() {
                    let mut files = EditAttachments::new();
                    for attachment in attachments {
                        files = files.add(attachment);
                    }
                    edit = edit.attachments(files);
                }
                edit
            }
            Err(err) => EditInteractionResponse::new().content(format!("❌ {}", err)),
        };

        if let Err(err) = command.edit_response(&ctx.http, edit).await {
            error!("Failed to send /{} response: {}", command.data.name, err);
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let bot_id = ctx.cache.current_user().id;
        let prefixes = [format!("<@{}>", bot_id), format!("<@!{}>", bot_id)];

        let content = msg.content.trim();
        let rest = match prefixes.iter().find_map(|p| content.strip_prefix(p)) {
            Some(r) => r.trim(),
            None => return,
        };

        if rest.is_empty() {
            let _ = msg.reply(&ctx.http, mention_cmd::help_text()).await;
            return;
        }

        let mut placeholder = match msg
            .channel_id
            .send_message(&ctx.http, CreateMessage::new().content("NewsPulse thinking…"))
            .await
        {
            Ok(m) => m,
            Err(err) => {
                let _ = msg.reply(&ctx.http, format!("❌ {}", err)).await;
                return;
            }
        };

        let session = self.session(msg.author.id).await;
        let result = {
            let mut session = session.lock().await;
            let cmd = rest
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_ascii_lowercase();
            if self.services.login_required()
                && !allowed_without_login(&cmd)
                && !session.is_logged_in()
            {
                Err(LOGIN_REQUIRED.to_string())
            } else {
                mention_cmd::handle(rest, self.services.as_ref(), &mut session).await
            }
        };

        let edit = match result {
            Ok(resp) => {
                let mut edit = EditMessage::new().content(resp.content.clone());
                let attachments = resp.attachments();
                if !attachments.is_empty() {
                    let mut files = EditAttachments::new();
                    for attachment in attachments {
                        files = files.add(attachment);
                    }
                    edit = edit.attachments(files);
                }
                edit
            }
            Err(err) => EditMessage::new().content(format!("❌ {}", err)),
        };

        if let Err(err) = placeholder.edit(&ctx.http, edit).await {
            let _ = msg
                .reply(&ctx.http, format!("❌ failed to edit message: {}", err))
                .await;
        }
    }
}

fn all_commands() -> Vec<CreateCommand> {
    vec![
        ping_command(),
        headlines_cmd::register_command(),
        fetch_cmd::register_command(),
        search_cmd::register_command(),
        overall_cmd::register_command(),
        analyze_cmd::register_command(),
        ask_cmd::register_command(),
        auth_cmd::register_register_command(),
        auth_cmd::register_login_command(),
        auth_cmd::register_logout_command(),
    ]
}

async fn register_global_commands(ctx: &Context) {
    for command in all_commands() {
        if let Err(err) = Command::create_global_command(&ctx.http, command).await {
            warn!("Failed to register global command: {}", err);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let token = env::var("DISCORD_TOKEN")?;
    let app_id_raw: u64 = env::var("APPLICATION_ID")?.parse()?;
    let app_id: ApplicationId = app_id_raw.into();

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let config = AppConfig::from_env()?;

    info!("Initializing news client...");
    let news = NewsClient::from_config(&config)?;
    if !news.is_configured() {
        warn!("GNEWS_API_KEY not set; news commands will report a configuration error");
    }

    info!("Initializing analysis service...");
    let analysis = AnalysisService::new(&config)?;
    info!(
        "Sentiment backend: {}, entity backend: {}",
        analysis.sentiment_model(),
        analysis.ner_model()
    );

    let chat = ChatService::new(&config)?;

    info!("Initializing Redis document store (optional)...");
    let store = RedisCache::connect_optional(config.redis_url.as_deref()).await;
    if let Some(store) = &store {
        match document_count(store).await {
            Ok(n) => info!("Document store holds {} analysed documents", n),
            Err(err) => warn!("Could not read document store size: {}", err),
        }
    }
    if config.require_login && store.is_none() {
        warn!("REQUIRE_LOGIN is set but the document store is down; login gate disabled");
    }

    let services = Arc::new(Services {
        config,
        news,
        analysis,
        chat,
        store,
    });

    info!("Starting Discord client...");
    let mut client = Client::builder(token, intents)
        .application_id(app_id)
        .event_handler(Handler {
            services,
            sessions: Mutex::new(HashMap::new()),
        })
        .await?;

    if let Err(why) = client.start().await {
        error!("Client error: {why}");
    }

    Ok(())
}

fn ping_command() -> CreateCommand {
    CreateCommand::new("ping").description("Simple ping command")
}
