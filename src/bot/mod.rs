//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for `InvoiceDesk`: slash commands for
//! the client and service catalog, the invoice composer and the invoice browser,
//! plus autocomplete handlers and the per-user session map.

/// Discord command implementations (client, service, invoice, invoices, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;
/// Per-user interactive state
pub mod session;
/// Embeds and message text built from session state
pub mod views;

use crate::{config::AppConfig, errors::Error};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use session::SessionStore;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands.
/// This structure holds the database connection, the application configuration
/// and every user's session state.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Business profile, numbering and PDF settings
    pub config: Arc<AppConfig>,
    /// Catalog, draft and browser state per user
    pub sessions: SessionStore,
}

impl BotData {
    /// Creates a new `BotData` instance with empty sessions.
    #[must_use]
    pub fn new(database: DatabaseConnection, config: Arc<AppConfig>) -> Self {
        Self {
            database,
            config,
            sessions: SessionStore::default(),
        }
    }
}

/// Poise command context carrying [`BotData`].
pub type Context<'a> = poise::Context<'a, BotData, Error>;

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            match &error {
                Error::Database(_) | Error::Io(_) | Error::FrameworkError(_) => {
                    error!("Error in command `{}`: {:?}", ctx.command().name, error);
                }
                _ => warn!("Rejected `{}`: {}", ctx.command().name, error),
            }
            if let Err(e) = ctx.say(format!("❌ {error}")).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Connects to Discord and serves commands until the client stops.
#[instrument(skip_all)]
pub async fn run_bot(
    token: String,
    config: Arc<AppConfig>,
    database: DatabaseConnection,
) -> Result<(), serenity::Error> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::client(),
                commands::service(),
                commands::invoice(),
                commands::invoices(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(database, config))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e:?}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e:?}"))
}
