//! Client Discord commands - the client half of the catalog manager.
//!
//! Clients can be added, listed, edited field by field (one client at a time),
//! deleted after confirmation, and bulk imported from or exported to xlsx.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            handlers::{autocomplete, confirm::confirm},
            views,
        },
        errors::{Error, Result},
        export::CLIENTS_FILENAME,
        session::catalog::{Catalog, ClientField, ClientForm},
    };
    use poise::serenity_prelude as serenity;
    use tracing::info;

    type Context<'a> = poise::Context<'a, BotData, Error>;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum ClientFieldChoice {
        Name,
        Address,
        Contact,
        #[name = "Tax ID"]
        TaxId,
    }

    impl From<ClientFieldChoice> for ClientField {
        fn from(choice: ClientFieldChoice) -> Self {
            match choice {
                ClientFieldChoice::Name => Self::Name,
                ClientFieldChoice::Address => Self::Address,
                ClientFieldChoice::Contact => Self::Contact,
                ClientFieldChoice::TaxId => Self::TaxId,
            }
        }
    }

    /// The user's catalog, loaded from the database on first use.
    pub(crate) async fn current_catalog(ctx: Context<'_>) -> Result<Catalog> {
        match ctx.data().sessions.catalog(ctx.author().id).await {
            Some(catalog) => Ok(catalog),
            None => Catalog::load(&ctx.data().database).await,
        }
    }

    fn client_id(catalog: &Catalog, name: &str) -> Result<i64> {
        catalog
            .client_named(name)
            .map(|c| c.id)
            .ok_or_else(|| Error::ClientNotFound {
                name: name.to_string(),
            })
    }

    /// Parent command for managing clients.
    #[poise::command(
        slash_command,
        subcommands(
            "client_list",
            "client_add",
            "client_edit",
            "client_save",
            "client_cancel",
            "client_delete",
            "client_import",
            "client_export"
        )
    )]
    pub async fn client(ctx: Context<'_>) -> Result<()> {
        let help_text = "Client management command. Available subcommands:\n\
            `/client list` - List all clients\n\
            `/client add` - Add a new client\n\
            `/client edit` - Change one field of a client\n\
            `/client save` / `/client cancel` - Finish editing\n\
            `/client delete` - Delete a client\n\
            `/client import` - Import clients from an xlsx file\n\
            `/client export` - Download all clients as xlsx";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Lists all clients, re-reading them from the database.
    #[poise::command(slash_command, rename = "list")]
    pub async fn client_list(ctx: Context<'_>) -> Result<()> {
        let db = &ctx.data().database;
        let catalog = match ctx.data().sessions.catalog(ctx.author().id).await {
            Some(catalog) => catalog.reload(db).await?,
            None => Catalog::load(db).await?,
        };

        let embed = views::client_list(&catalog);
        ctx.data()
            .sessions
            .put_catalog(ctx.author().id, catalog)
            .await;
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Adds a new client.
    #[poise::command(slash_command, rename = "add")]
    pub async fn client_add(
        ctx: Context<'_>,
        #[description = "Client name"] name: String,
        #[description = "Postal address"] address: Option<String>,
        #[description = "Phone number or email"] contact: Option<String>,
        #[description = "Tax registration number (GSTIN, VAT id, ...)"] tax_id: Option<String>,
    ) -> Result<()> {
        let form = ClientForm {
            name,
            address: address.unwrap_or_default(),
            contact: contact.unwrap_or_default(),
            tax_id: tax_id.unwrap_or_default(),
        };
        let catalog = current_catalog(ctx)
            .await?
            .with_client_form(form)
            .add_client(&ctx.data().database)
            .await?;

        let added = catalog
            .clients()
            .last()
            .map(|c| c.name.clone())
            .unwrap_or_default();
        ctx.data()
            .sessions
            .put_catalog(ctx.author().id, catalog)
            .await;
        ctx.say(format!("✅ Client '{added}' added.")).await?;
        Ok(())
    }

    /// Changes one field of a client. Nothing is saved until `/client save`.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn client_edit(
        ctx: Context<'_>,
        #[description = "Client to edit"]
        #[autocomplete = "autocomplete::autocomplete_client_name"]
        client: String,
        #[description = "Field to change"] field: ClientFieldChoice,
        #[description = "New value"] value: String,
    ) -> Result<()> {
        let catalog = current_catalog(ctx).await?;
        let id = client_id(&catalog, &client)?;

        let catalog = if catalog.client_edit().is_some_and(|edit| edit.id == id) {
            catalog
        } else {
            catalog.begin_client_edit(id)?
        };
        let catalog = catalog.set_client_field(field.into(), value)?;

        let embed = catalog.client_edit().map(views::client_edit);
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

    /// Saves the client being edited.
    #[poise::command(slash_command, rename = "save")]
    pub async fn client_save(ctx: Context<'_>) -> Result<()> {
        let catalog = current_catalog(ctx).await?;
        let name = catalog.client_edit().map(|c| c.name.clone());

        let (catalog, result) = catalog.save_client_edit(&ctx.data().database).await;
        ctx.data()
            .sessions
            .put_catalog(ctx.author().id, catalog)
            .await;
        result?;

        ctx.say(format!("✅ Client '{}' saved.", name.unwrap_or_default()))
            .await?;
        Ok(())
    }

    /// Discards the client being edited.
    #[poise::command(slash_command, rename = "cancel")]
    pub async fn client_cancel(ctx: Context<'_>) -> Result<()> {
        let catalog = current_catalog(ctx).await?.cancel_client_edit();
        ctx.data()
            .sessions
            .put_catalog(ctx.author().id, catalog)
            .await;
        ctx.say("Edit discarded.").await?;
        Ok(())
    }

    /// Permanently deletes a client. Saved invoices keep their copy of the client.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn client_delete(
        ctx: Context<'_>,
        #[description = "Client to delete"]
        #[autocomplete = "autocomplete::autocomplete_client_name"]
        client: String,
    ) -> Result<()> {
        let catalog = current_catalog(ctx).await?;
        let id = client_id(&catalog, &client)?;

        let confirmed = confirm(
            ctx,
            &format!("Delete client '{client}'? This cannot be undone."),
            "Delete",
        )
        .await?;
        let catalog = catalog
            .delete_client(&ctx.data().database, id, confirmed)
            .await?;
        ctx.data()
            .sessions
            .put_catalog(ctx.author().id, catalog)
            .await;

        if confirmed {
            info!("Client '{client}' deleted by {}", ctx.author().name);
            ctx.say(format!("🗑️ Client '{client}' deleted.")).await?;
        }
        Ok(())
    }

    /// Imports clients from the first sheet of an xlsx file. One bad row rejects the file.
    #[poise::command(slash_command, rename = "import")]
    pub async fn client_import(
        ctx: Context<'_>,
        #[description = "xlsx file with name, address, contact and tax_id columns"]
        file: serenity::Attachment,
    ) -> Result<()> {
        ctx.defer().await?;
        let workbook = file.download().await?;

        let before = current_catalog(ctx).await?;
        let catalog = before
            .import_clients(&ctx.data().database, &workbook)
            .await?;
        let imported = catalog.clients().len() - before.clients().len();
        ctx.data()
            .sessions
            .put_catalog(ctx.author().id, catalog)
            .await;

        ctx.say(format!("✅ Imported {imported} clients from '{}'.", file.filename))
            .await?;
        Ok(())
    }

    /// Downloads all clients as an xlsx file.
    #[poise::command(slash_command, rename = "export")]
    pub async fn client_export(ctx: Context<'_>) -> Result<()> {
        let catalog = current_catalog(ctx).await?;
        let workbook = catalog.export_clients()?;

        ctx.send(
            poise::CreateReply::default()
                .content(format!("📄 {} clients", catalog.clients().len()))
                .attachment(serenity::CreateAttachment::bytes(workbook, CLIENTS_FILENAME)),
        )
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
