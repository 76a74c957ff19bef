//! Invoice composer Discord commands.
//!
//! A user builds one draft at a time: start it, pick or type the client, fill in
//! line items, then submit. The draft lives in the user's session until it is
//! submitted or discarded.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, views},
        errors::{Error, Result},
        session::{InvoiceDraft, composer::LineField},
    };
    use tracing::info;

    type Context<'a> = poise::Context<'a, BotData, Error>;

    async fn current_draft(ctx: Context<'_>) -> Result<InvoiceDraft> {
        ctx.data()
            .sessions
            .draft(ctx.author().id)
            .await
            .ok_or_else(|| Error::validation("No draft in progress. Start one with `/invoice new`."))
    }

    async fn save_and_show(ctx: Context<'_>, draft: InvoiceDraft) -> Result<()> {
        let embed = views::draft(&draft, &ctx.data().config.invoice);
        ctx.data()
            .sessions
            .put_draft(ctx.author().id, Some(draft))
            .await;
        ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
            .await?;
        Ok(())
    }

    /// Parent command for composing an invoice.
    #[poise::command(
        slash_command,
        subcommands(
            "invoice_new",
            "invoice_client",
            "invoice_details",
            "invoice_add_line",
            "invoice_line",
            "invoice_show",
            "invoice_submit",
            "invoice_discard"
        )
    )]
    pub async fn invoice(ctx: Context<'_>) -> Result<()> {
        let help_text = "Invoice composer. Available subcommands:\n\
            `/invoice new` - Start a new draft\n\
            `/invoice client` - Set the client (known clients fill in their details)\n\
            `/invoice details` - Set the client's address, contact or tax id\n\
            `/invoice add_line` - Add a blank line item\n\
            `/invoice line` - Fill in a line item\n\
            `/invoice show` - Show the draft\n\
            `/invoice submit` - Save the draft as an invoice\n\
            `/invoice discard` - Throw the draft away";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Starts a new draft, replacing any draft in progress.
    #[poise::command(slash_command, rename = "new")]
    pub async fn invoice_new(ctx: Context<'_>) -> Result<()> {
        let format = ctx.data().config.invoice.number_format();
        let draft = InvoiceDraft::load(&ctx.data().database, format).await?;
        save_and_show(ctx, draft).await
    }

    /// Sets the client name. A name matching a known client fills in its details.
    #[poise::command(slash_command, rename = "client")]
    pub async fn invoice_client(
        ctx: Context<'_>,
        #[description = "Client name"]
        #[autocomplete = "autocomplete::autocomplete_client_name"]
        name: String,
    ) -> Result<()> {
        let draft = current_draft(ctx).await?.type_client_name(name.as_str());

        let exact = draft
            .suggestions()
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
            .map(|c| c.id);
        let draft = match exact {
            Some(id) => draft.select_client(id)?,
            None => draft,
        };
        save_and_show(ctx, draft).await
    }

    /// Sets the client details printed on the invoice.
    #[poise::command(slash_command, rename = "details")]
    pub async fn invoice_details(
        ctx: Context<'_>,
        #[description = "Postal address"] address: Option<String>,
        #[description = "Phone number or email"] contact: Option<String>,
        #[description = "Tax registration number"] tax_id: Option<String>,
    ) -> Result<()> {
        let mut draft = current_draft(ctx).await?;
        if let Some(address) = address {
            draft = draft.with_client_address(address);
        }
        if let Some(contact) = contact {
            draft = draft.with_client_contact(contact);
        }
        if let Some(tax_id) = tax_id {
            draft = draft.with_client_tax_id(tax_id);
        }
        save_and_show(ctx, draft).await
    }

    /// Appends a blank line item.
    #[poise::command(slash_command, rename = "add_line")]
    pub async fn invoice_add_line(ctx: Context<'_>) -> Result<()> {
        let draft = current_draft(ctx).await?.add_line_item();
        save_and_show(ctx, draft).await
    }

    /// Fills in a line item. Naming a known service fills in its rate.
    #[poise::command(slash_command, rename = "line")]
    pub async fn invoice_line(
        ctx: Context<'_>,
        #[description = "Line number, starting at 1"]
        #[min = 1]
        line: u32,
        #[description = "Service name"]
        #[autocomplete = "autocomplete::autocomplete_service_name"]
        service: Option<String>,
        #[description = "Rate per unit"] rate: Option<String>,
        #[description = "Quantity"] quantity: Option<String>,
        #[description = "Fiscal year (e.g., 2024-25)"] fy: Option<String>,
    ) -> Result<()> {
        let index = usize::try_from(line.saturating_sub(1)).unwrap_or(usize::MAX);
        let mut draft = current_draft(ctx).await?;

        // Service first so an explicit rate overrides the catalog default
        let edits = [
            (LineField::ServiceName, service),
            (LineField::Rate, rate),
            (LineField::Quantity, quantity),
            (LineField::FiscalYear, fy),
        ];
        for (field, value) in edits {
            if let Some(value) = value {
                draft = draft.edit_line_item(index, field, value)?;
            }
        }
        save_and_show(ctx, draft).await
    }

    /// Shows the draft.
    #[poise::command(slash_command, rename = "show")]
    pub async fn invoice_show(ctx: Context<'_>) -> Result<()> {
        let draft = current_draft(ctx).await?;
        save_and_show(ctx, draft).await
    }

    /// Saves the draft as an invoice, creating the client and any new services.
    #[poise::command(slash_command, rename = "submit")]
    pub async fn invoice_submit(ctx: Context<'_>) -> Result<()> {
        let draft = current_draft(ctx).await?;
        let (draft, result) = draft.submit(&ctx.data().database).await;

        let invoice = match result {
            Ok(invoice) => invoice,
            Err(e) => {
                ctx.data()
                    .sessions
                    .put_draft(ctx.author().id, Some(draft))
                    .await;
                return Err(e);
            }
        };

        ctx.data().sessions.put_draft(ctx.author().id, None).await;
        info!(
            "Invoice {} saved by {}",
            invoice.invoice_number,
            ctx.author().name
        );

        let embed = views::invoice_detail(&invoice, &ctx.data().config.invoice);
        ctx.send(
            poise::CreateReply::default()
                .content(format!("✅ Invoice {} saved.", invoice.invoice_number))
                .embed(embed),
        )
        .await?;
        Ok(())
    }

    /// Throws the draft away.
    #[poise::command(slash_command, rename = "discard")]
    pub async fn invoice_discard(ctx: Context<'_>) -> Result<()> {
        ctx.data().sessions.put_draft(ctx.author().id, None).await;
        ctx.say("Draft discarded.").await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
