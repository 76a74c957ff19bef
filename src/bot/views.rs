//! Embeds and message text built from session state.

use crate::{
    config::app::InvoiceSettings,
    core::amount::format_amount,
    entities::{ClientModel, InvoiceModel, ServiceModel},
    session::{
        InvoiceBrowser, InvoiceDraft,
        catalog::{Catalog, ServiceEdit},
    },
};
use poise::serenity_prelude as serenity;

/// Discord limits an embed to 25 fields.
const MAX_FIELDS: usize = 25;
const BLURPLE: u32 = 0x0058_65F2;
const GREEN: u32 = 0x0057_F287;
const RED: u32 = 0x00ED_4245;

fn money(settings: &InvoiceSettings, value: f64) -> String {
    format!("{}{}", settings.currency_symbol, format_amount(value))
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

fn client_details(client: &ClientModel) -> String {
    let mut details = format!("{}\n{}", or_dash(&client.address), or_dash(&client.contact));
    if let Some(tax_id) = &client.tax_id {
        details.push_str(&format!("\nTax ID: {tax_id}"));
    }
    details
}

/// The client list, with the working copy appended when a client is being edited.
pub fn client_list(catalog: &Catalog) -> serenity::CreateEmbed {
    let fields = catalog
        .clients()
        .iter()
        .take(MAX_FIELDS)
        .map(|c| (c.name.clone(), client_details(c), false));

    let mut embed = serenity::CreateEmbed::default()
        .title("**Clients**")
        .color(BLURPLE)
        .fields(fields);
    if catalog.clients().is_empty() {
        embed = embed.description("No clients yet. Use `/client add` or `/client import`.");
    } else if catalog.clients().len() > MAX_FIELDS {
        embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
            "Showing {MAX_FIELDS} of {} clients",
            catalog.clients().len()
        )));
    }
    embed
}

/// A client working copy.
pub fn client_edit(edit: &ClientModel) -> serenity::CreateEmbed {
    serenity::CreateEmbed::default()
        .title(format!("Editing {}", edit.name))
        .color(BLURPLE)
        .field("Name", or_dash(&edit.name), true)
        .field("Address", or_dash(&edit.address), true)
        .field("Contact", or_dash(&edit.contact), true)
        .field("Tax ID", edit.tax_id.as_deref().unwrap_or("-"), true)
        .footer(serenity::CreateEmbedFooter::new(
            "/client save to keep, /client cancel to discard",
        ))
}

/// The service list.
pub fn service_list(catalog: &Catalog, settings: &InvoiceSettings) -> serenity::CreateEmbed {
    let lines: Vec<String> = catalog
        .services()
        .iter()
        .map(|s: &ServiceModel| format!("• **{}** - {}", s.name, money(settings, s.default_rate)))
        .collect();
    let description = if lines.is_empty() {
        "No services yet. Use `/service add`.".to_string()
    } else {
        lines.join("\n")
    };
    serenity::CreateEmbed::default()
        .title("**Services**")
        .color(BLURPLE)
        .description(description)
}

/// A service working copy.
pub fn service_edit(edit: &ServiceEdit) -> serenity::CreateEmbed {
    serenity::CreateEmbed::default()
        .title(format!("Editing {}", edit.name))
        .color(BLURPLE)
        .field("Name", or_dash(&edit.name), true)
        .field("Default rate", or_dash(&edit.default_rate), true)
        .footer(serenity::CreateEmbedFooter::new(
            "/service save to keep, /service cancel to discard",
        ))
}

/// The draft invoice, one numbered field per line item.
pub fn draft(draft: &InvoiceDraft, settings: &InvoiceSettings) -> serenity::CreateEmbed {
    let mut billed_to = format!(
        "**{}**\n{}\n{}",
        or_dash(draft.client_name()),
        or_dash(draft.client_address()),
        or_dash(draft.client_contact())
    );
    if !draft.client_tax_id().trim().is_empty() {
        billed_to.push_str(&format!("\nTax ID: {}", draft.client_tax_id()));
    }

    let mut embed = serenity::CreateEmbed::default()
        .title(format!("Draft {}", draft.preview_number()))
        .color(BLURPLE)
        .field("Billed to", billed_to, false);

    if !draft.suggestions().is_empty() {
        let names: Vec<&str> = draft
            .suggestions()
            .iter()
            .take(10)
            .map(|c| c.name.as_str())
            .collect();
        embed = embed.field("Matching clients", names.join(", "), false);
    }

    for (index, line) in draft.line_items().iter().enumerate().take(MAX_FIELDS - 3) {
        embed = embed.field(
            format!("{}. {}", index + 1, or_dash(&line.service_name)),
            format!(
                "{} × {} · FY {} = {}",
                or_dash(&line.rate),
                or_dash(&line.quantity),
                or_dash(&line.fy),
                money(settings, line.subtotal)
            ),
            false,
        );
    }

    embed.field("Total", money(settings, draft.total()), false)
}

/// One row of the invoice list.
fn invoice_summary(invoice: &InvoiceModel, settings: &InvoiceSettings) -> String {
    format!(
        "`{}` {} · {} · {} · {}",
        invoice.invoice_number,
        invoice.client_name,
        invoice.created_at.format("%d/%m/%Y"),
        money(settings, invoice.total),
        if invoice.paid { "✅ Paid" } else { "Unpaid" }
    )
}

/// The filtered invoice list.
pub fn invoice_list(browser: &InvoiceBrowser, settings: &InvoiceSettings) -> serenity::CreateEmbed {
    let filtered = browser.filtered();
    let mut lines: Vec<String> = filtered
        .iter()
        .take(20)
        .map(|inv| invoice_summary(inv, settings))
        .collect();
    if filtered.len() > lines.len() {
        lines.push(format!("…and {} more", filtered.len() - lines.len()));
    }
    let description = if lines.is_empty() {
        "No invoices match.".to_string()
    } else {
        lines.join("\n")
    };

    let filters = format!(
        "Client: {} · FY: {}",
        browser.client_filter().unwrap_or("all"),
        browser.fiscal_year_filter().unwrap_or("all")
    );

    serenity::CreateEmbed::default()
        .title(format!("**Invoices** ({})", filtered.len()))
        .color(BLURPLE)
        .description(description)
        .footer(serenity::CreateEmbedFooter::new(filters))
}

/// The detail view of one invoice.
pub fn invoice_detail(invoice: &InvoiceModel, settings: &InvoiceSettings) -> serenity::CreateEmbed {
    let mut billed_to = format!(
        "**{}**\n{}\n{}",
        invoice.client_name,
        or_dash(&invoice.client_address),
        or_dash(&invoice.client_contact)
    );
    if let Some(tax_id) = &invoice.client_tax_id {
        billed_to.push_str(&format!("\nTax ID: {tax_id}"));
    }

    let items: Vec<String> = invoice
        .line_items
        .0
        .iter()
        .map(|item| {
            format!(
                "• {} - {} × {} · FY {} = {}",
                item.name,
                money(settings, item.rate),
                format_amount(item.quantity),
                item.fy,
                money(settings, item.subtotal)
            )
        })
        .collect();

    serenity::CreateEmbed::default()
        .title(format!("Invoice {}", invoice.invoice_number))
        .color(if invoice.paid { GREEN } else { RED })
        .field("Date", invoice.created_at.format("%d/%m/%Y").to_string(), true)
        .field("Status", if invoice.paid { "Paid" } else { "Unpaid" }, true)
        .field("Billed to", billed_to, false)
        .field("Items", items.join("\n"), false)
        .field("Total", money(settings, invoice.total), false)
}
