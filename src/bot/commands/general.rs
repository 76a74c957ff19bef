//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    ///
    /// This is a simple health check command that doesn't require any database operations.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = format!(
            "**Invoice Desk Help** for {}\n\
        Manage clients and services, compose invoices and browse what has been billed.\n\n\
        **Catalog**\n\
        • `/client <subcommand>` - List, add, edit, delete, import or export clients.\n\
        • `/service <subcommand>` - List, add, edit or delete services and their default rates.\n\n\
        **Invoices**\n\
        • `/invoice new` - Start a draft, then `/invoice client`, `/invoice line` and `/invoice submit`.\n\
        • `/invoices list [client] [fy]` - Browse saved invoices.\n\
        • `/invoices paid <number>` - Mark an invoice as paid.\n\
        • `/invoices export` / `/invoices pdf <number>` - Download invoices.\n\n\
        **Utility Commands**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.",
            ctx.data().config.business.name
        );

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
