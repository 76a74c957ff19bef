//! Invoice browser Discord commands - list, filter, inspect, mark paid and export.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, views},
        errors::{Error, Result},
        export::{INVOICES_FILENAME, invoice_pdf_filename},
        session::InvoiceBrowser,
    };
    use poise::serenity_prelude as serenity;
    use tracing::info;

    type Context<'a> = poise::Context<'a, BotData, Error>;

    async fn current_browser(ctx: Context<'_>) -> Result<InvoiceBrowser> {
        match ctx.data().sessions.browser(ctx.author().id).await {
            Some(browser) => Ok(browser),
            None => InvoiceBrowser::load(&ctx.data().database).await,
        }
    }

    fn invoice_id(browser: &InvoiceBrowser, number: &str) -> Result<i64> {
        browser
            .find_by_number(number.trim())
            .map(|inv| inv.id)
            .ok_or_else(|| Error::InvoiceNotFound {
                number: number.to_string(),
            })
    }

    async fn save_and_list(ctx: Context<'_>, browser: InvoiceBrowser) -> Result<()> {
        let embed = views::invoice_list(&browser, &ctx.data().config.invoice);
        ctx.data()
            .sessions
            .put_browser(ctx.author().id, browser)
            .await;
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Parent command for browsing saved invoices.
    #[poise::command(
        slash_command,
        subcommands(
            "invoices_list",
            "invoices_filter",
            "invoices_clear",
            "invoices_show",
            "invoices_paid",
            "invoices_export",
            "invoices_pdf"
        )
    )]
    pub async fn invoices(ctx: Context<'_>) -> Result<()> {
        let help_text = "Invoice browser. Available subcommands:\n\
            `/invoices list` - Reload and list invoices, optionally filtered\n\
            `/invoices filter` - Filter by client and/or fiscal year\n\
            `/invoices clear` - Clear both filters\n\
            `/invoices show` - Open or close an invoice's details\n\
            `/invoices paid` - Mark an invoice as paid\n\
            `/invoices export` - Download the filtered invoices as xlsx\n\
            `/invoices pdf` - Download one invoice as PDF";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Reloads invoices from the database, newest first.
    #[poise::command(slash_command, rename = "list")]
    pub async fn invoices_list(
        ctx: Context<'_>,
        #[description = "Only invoices for this client"]
        #[autocomplete = "autocomplete::autocomplete_invoice_client"]
        client: Option<String>,
        #[description = "Only invoices with a line in this fiscal year"]
        #[autocomplete = "autocomplete::autocomplete_fiscal_year"]
        fy: Option<String>,
    ) -> Result<()> {
        let browser = InvoiceBrowser::load(&ctx.data().database)
            .await?
            .with_client_filter(client)
            .with_fiscal_year_filter(fy);
        save_and_list(ctx, browser).await
    }

    /// Changes the filters without reloading. Omitted filters keep their value.
    #[poise::command(slash_command, rename = "filter")]
    pub async fn invoices_filter(
        ctx: Context<'_>,
        #[description = "Only invoices for this client"]
        #[autocomplete = "autocomplete::autocomplete_invoice_client"]
        client: Option<String>,
        #[description = "Only invoices with a line in this fiscal year"]
        #[autocomplete = "autocomplete::autocomplete_fiscal_year"]
        fy: Option<String>,
    ) -> Result<()> {
        let mut browser = current_browser(ctx).await?;
        if client.is_some() {
            browser = browser.with_client_filter(client);
        }
        if fy.is_some() {
            browser = browser.with_fiscal_year_filter(fy);
        }
        save_and_list(ctx, browser).await
    }

    /// Clears both filters.
    #[poise::command(slash_command, rename = "clear")]
    pub async fn invoices_clear(ctx: Context<'_>) -> Result<()> {
        let browser = current_browser(ctx)
            .await?
            .with_client_filter(None)
            .with_fiscal_year_filter(None);
        save_and_list(ctx, browser).await
    }

    /// Opens an invoice's details, or closes them if already open.
    #[poise::command(slash_command, rename = "show")]
    pub async fn invoices_show(
        ctx: Context<'_>,
        #[description = "Invoice number"]
        #[autocomplete = "autocomplete::autocomplete_invoice_number"]
        number: String,
    ) -> Result<()> {
        let browser = current_browser(ctx).await?;
        let id = invoice_id(&browser, &number)?;
        let browser = browser.toggle_detail(id);

        let reply = match browser.open_invoice() {
            Some(invoice) => {
                let mut embed = views::invoice_detail(invoice, &ctx.data().config.invoice);
                if browser.controls_visible() {
                    embed = embed.footer(serenity::CreateEmbedFooter::new(
                        "/invoices paid to mark as paid · /invoices pdf to download",
                    ));
                }
                poise::CreateReply::default().embed(embed)
            }
            None => poise::CreateReply::default().content(format!("Closed {number}.")),
        };
        ctx.data()
            .sessions
            .put_browser(ctx.author().id, browser)
            .await;
        ctx.send(reply).await?;
        Ok(())
    }

    /// Marks an unpaid invoice as paid. Paid invoices stay paid.
    #[poise::command(slash_command, rename = "paid")]
    pub async fn invoices_paid(
        ctx: Context<'_>,
        #[description = "Invoice number"]
        #[autocomplete = "autocomplete::autocomplete_invoice_number"]
        number: String,
    ) -> Result<()> {
        let browser = current_browser(ctx).await?;
        let id = invoice_id(&browser, &number)?;
        let browser = browser.mark_paid(&ctx.data().database, id).await?;
        ctx.data()
            .sessions
            .put_browser(ctx.author().id, browser)
            .await;

        info!("Invoice {number} marked paid by {}", ctx.author().name);
        ctx.say(format!("✅ Invoice {number} marked as paid.")).await?;
        Ok(())
    }

    /// Downloads the filtered invoices as an xlsx file.
    #[poise::command(slash_command, rename = "export")]
    pub async fn invoices_export(ctx: Context<'_>) -> Result<()> {
        let browser = current_browser(ctx).await?;
        let workbook = browser.export_spreadsheet(&ctx.data().config)?;

        ctx.send(
            poise::CreateReply::default()
                .content(format!("📄 {} invoices", browser.filtered().len()))
                .attachment(serenity::CreateAttachment::bytes(workbook, INVOICES_FILENAME)),
        )
        .await?;
        Ok(())
    }

    /// Downloads one invoice as a PDF.
    #[poise::command(slash_command, rename = "pdf")]
    pub async fn invoices_pdf(
        ctx: Context<'_>,
        #[description = "Invoice number"]
        #[autocomplete = "autocomplete::autocomplete_invoice_number"]
        number: String,
    ) -> Result<()> {
        ctx.defer().await?;
        let mut browser = current_browser(ctx).await?;
        let id = invoice_id(&browser, &number)?;
        let rendered = browser.export_pdf(id, &ctx.data().config);
        ctx.data()
            .sessions
            .put_browser(ctx.author().id, browser)
            .await;

        let document = rendered?;
        ctx.send(poise::CreateReply::default().attachment(
            serenity::CreateAttachment::bytes(document, invoice_pdf_filename(number.trim())),
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
