//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions come straight from the database so they stay current even when the
//! user's session snapshot is stale.

use crate::{
    bot::BotData,
    core::{client, invoice, service},
    errors::Error,
};

/// Discord autocomplete limit
const MAX_CHOICES: usize = 25;

/// Provides autocomplete suggestions for client names.
///
/// Matches clients whose name starts with what the user has typed, ignoring case,
/// the same way the invoice composer suggests clients.
pub async fn autocomplete_client_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(clients) = client::get_all_clients(&ctx.data().database).await else {
        return Vec::new();
    };

    client::suggest_clients(&clients, partial)
        .into_iter()
        .map(|c| c.name.clone())
        .take(MAX_CHOICES)
        .collect()
}

/// Provides autocomplete suggestions for service names.
pub async fn autocomplete_service_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(services) = service::get_all_services(&ctx.data().database).await else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = services
        .into_iter()
        .filter(|s| s.name.to_lowercase().contains(&partial_lower))
        .map(|s| s.name)
        .take(MAX_CHOICES)
        .collect();

    // Sort alphabetically for consistent UX
    matching.sort();
    matching
}

/// Provides autocomplete suggestions for client names that appear on invoices.
pub async fn autocomplete_invoice_client(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(invoices) = invoice::get_all_invoices(&ctx.data().database).await else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();
    invoice::distinct_client_names(&invoices)
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .take(MAX_CHOICES)
        .collect()
}

/// Provides autocomplete suggestions for fiscal-year labels used on invoices.
pub async fn autocomplete_fiscal_year(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(invoices) = invoice::get_all_invoices(&ctx.data().database).await else {
        return Vec::new();
    };

    invoice::distinct_fiscal_years(&invoices)
        .into_iter()
        .filter(|fy| fy.contains(partial))
        .take(MAX_CHOICES)
        .collect()
}

/// Provides autocomplete suggestions for invoice numbers, newest first.
pub async fn autocomplete_invoice_number(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(invoices) = invoice::get_all_invoices(&ctx.data().database).await else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();
    invoices
        .into_iter()
        .filter(|inv| inv.invoice_number.to_lowercase().contains(&partial_lower))
        .map(|inv| inv.invoice_number)
        .take(MAX_CHOICES)
        .collect()
}
