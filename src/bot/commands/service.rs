//! Service Discord commands - the service half of the catalog manager.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::client::current_catalog,
            handlers::{autocomplete, confirm::confirm},
            views,
        },
        errors::{Error, Result},
        session::catalog::{Catalog, ServiceField, ServiceForm},
    };

    type Context<'a> = poise::Context<'a, BotData, Error>;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum ServiceFieldChoice {
        Name,
        #[name = "Default rate"]
        DefaultRate,
    }

    impl From<ServiceFieldChoice> for ServiceField {
        fn from(choice: ServiceFieldChoice) -> Self {
            match choice {
                ServiceFieldChoice::Name => Self::Name,
                ServiceFieldChoice::DefaultRate => Self::DefaultRate,
            }
        }
    }

    fn service_id(catalog: &Catalog, name: &str) -> Result<i64> {
        catalog
            .service_named(name)
            .map(|s| s.id)
            .ok_or_else(|| Error::ServiceNotFound {
                name: name.to_string(),
            })
    }

    /// Parent command for managing the service catalog.
    #[poise::command(
        slash_command,
        subcommands(
            "service_list",
            "service_add",
            "service_edit",
            "service_save",
            "service_cancel",
            "service_delete"
        )
    )]
    pub async fn service(ctx: Context<'_>) -> Result<()> {
        let help_text = "Service catalog command. Available subcommands:\n\
            `/service list` - List all services\n\
            `/service add` - Add a new service with a default rate\n\
            `/service edit` - Change the name or rate of a service\n\
            `/service save` / `/service cancel` - Finish editing\n\
            `/service delete` - Delete a service";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Lists all services with their default rates.
    #[poise::command(slash_command, rename = "list")]
    pub async fn service_list(ctx: Context<'_>) -> Result<()> {
        let db = &ctx.data().database;
        let catalog = match ctx.data().sessions.catalog(ctx.author().id).await {
            Some(catalog) => catalog.reload(db).await?,
            None => Catalog::load(db).await?,
        };

        let embed = views::service_list(&catalog, &ctx.data().config.invoice);
        ctx.data()
            .sessions
            .put_catalog(ctx.author().id, catalog)
            .await;
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Adds a new service to the catalog.
    #[poise::command(slash_command, rename = "add")]
    pub async fn service_add(
        ctx: Context<'_>,
        #[description = "Service name (e.g., 'GST Filing')"] name: String,
        #[description = "Default rate per unit (e.g., 1500)"] rate: String,
    ) -> Result<()> {
        let form = ServiceForm {
            name,
            default_rate: rate,
        };
        let catalog = current_catalog(ctx)
            .await?
            .with_service_form(form)
            .add_service(&ctx.data().database)
            .await?;

        let added = catalog.services().last().cloned();
        ctx.data()
            .sessions
            .put_catalog(ctx.author().id, catalog)
            .await;
        if let Some(service) = added {
            ctx.say(format!(
                "✅ Service '{}' added at {}{}.",
                service.name,
                ctx.data().config.invoice.currency_symbol,
                crate::core::amount::format_amount(service.default_rate)
            ))
            .await?;
        }
        Ok(())
    }

    /// Changes one field of a service. Nothing is saved until `/service save`.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn service_edit(
        ctx: Context<'_>,
        #[description = "Service to edit"]
        #[autocomplete = "autocomplete::autocomplete_service_name"]
        service: String,
        #[description = "Field to change"] field: ServiceFieldChoice,
        #[description = "New value"] value: String,
    ) -> Result<()> {
        let catalog = current_catalog(ctx).await?;
        let id = service_id(&catalog, &service)?;

        let catalog = if catalog.service_edit().is_some_and(|edit| edit.id == id) {
            catalog
        } else {
            catalog.begin_service_edit(id)?
        };
        let catalog = catalog.set_service_field(field.into(), value)?;

        let embed = catalog.service_edit().map(views::service_edit);
        ctx.data()
            .sessions
            .put_catalog(ctx.author().id, catalog)
            .await;
        if let Some(embed) = embed {
            ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
                .await?;
        }
        Ok(())
    }

    /// Saves the service being edited.
    #[poise::command(slash_command, rename = "save")]
    pub async fn service_save(ctx: Context<'_>) -> Result<()> {
        let catalog = current_catalog(ctx).await?;
        let name = catalog.service_edit().map(|s| s.name.clone());

        let (catalog, result) = catalog.save_service_edit(&ctx.data().database).await;
        ctx.data()
            .sessions
            .put_catalog(ctx.author().id, catalog)
            .await;
        result?;

        ctx.say(format!("✅ Service '{}' saved.", name.unwrap_or_default()))
            .await?;
        Ok(())
    }

    /// Discards the service being edited.
    #[poise::command(slash_command, rename = "cancel")]
    pub async fn service_cancel(ctx: Context<'_>) -> Result<()> {
        let catalog = current_catalog(ctx).await?.cancel_service_edit();
        ctx.data()
            .sessions
            .put_catalog(ctx.author().id, catalog)
            .await;
        ctx.say("Edit discarded.").await?;
        Ok(())
    }

    /// Permanently deletes a service. Saved invoices keep their line items.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn service_delete(
        ctx: Context<'_>,
        #[description = "Service to delete"]
        #[autocomplete = "autocomplete::autocomplete_service_name"]
        service: String,
    ) -> Result<()> {
        let catalog = current_catalog(ctx).await?;
        let id = service_id(&catalog, &service)?;

        let confirmed = confirm(
            ctx,
            &format!("Delete service '{service}'? This cannot be undone."),
            "Delete",
        )
        .await?;
        let catalog = catalog
            .delete_service(&ctx.data().database, id, confirmed)
            .await?;
        ctx.data()
            .sessions
            .put_catalog(ctx.author().id, catalog)
            .await;

        if confirmed {
            ctx.say(format!("🗑️ Service '{service}' deleted.")).await?;
        }
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
