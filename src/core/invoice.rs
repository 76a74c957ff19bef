//! Invoice business logic.
//!
//! Invoices are inserted once, with their number reserved in the same transaction,
//! and afterwards only ever change from unpaid to paid. Filtering and the distinct
//! filter values operate on an in-memory list so the browser can recompute its view
//! without touching the database.

use crate::{
    core::numbering::{self, NumberFormat},
    entities::{
        Invoice,
        invoice::{self, LineItem, LineItems},
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument};

/// Everything needed to insert an invoice except its number and timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewInvoice {
    /// Id of the matched or created client, if any
    pub client_id: Option<i64>,
    pub client_name: String,
    pub client_address: String,
    pub client_contact: String,
    pub client_tax_id: Option<String>,
    /// Frozen line items; the total is computed from them
    pub line_items: Vec<LineItem>,
}

/// Retrieves all invoices, newest first.
pub async fn get_all_invoices(db: &DatabaseConnection) -> Result<Vec<invoice::Model>> {
    Invoice::find()
        .order_by_desc(invoice::Column::CreatedAt)
        .order_by_desc(invoice::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves an invoice by its unique ID.
pub async fn get_invoice_by_id(
    db: &DatabaseConnection,
    invoice_id: i64,
) -> Result<Option<invoice::Model>> {
    Invoice::find_by_id(invoice_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Inserts an invoice, reserving the next invoice number atomically with the insert.
///
/// The stored total is always the sum of the line item subtotals.
///
/// # Errors
/// Returns an error if:
/// - The client name is empty
/// - There are no line items
/// - The database transaction fails
#[instrument(skip(db, new_invoice), fields(client = %new_invoice.client_name))]
pub async fn create_invoice(
    db: &DatabaseConnection,
    new_invoice: NewInvoice,
    format: &NumberFormat,
) -> Result<invoice::Model> {
    if new_invoice.client_name.trim().is_empty() {
        return Err(Error::validation("Client name cannot be empty"));
    }
    if new_invoice.line_items.is_empty() {
        return Err(Error::validation("An invoice needs at least one line item"));
    }

    let line_items = LineItems(new_invoice.line_items);
    let total = line_items.total();

    let txn = db.begin().await?;
    let invoice_number = numbering::reserve_next_number(&txn, format).await?;

    let model = invoice::ActiveModel {
        invoice_number: Set(invoice_number),
        client_id: Set(new_invoice.client_id),
        client_name: Set(new_invoice.client_name.trim().to_string()),
        client_address: Set(new_invoice.client_address),
        client_contact: Set(new_invoice.client_contact),
        client_tax_id: Set(new_invoice.client_tax_id),
        line_items: Set(line_items),
        total: Set(total),
        created_at: Set(chrono::Utc::now()),
        paid: Set(false),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(
        "Created invoice {} for {} (total {})",
        model.invoice_number, model.client_name, model.total
    );
    Ok(model)
}

/// Marks an unpaid invoice as paid. Paid invoices can never go back to unpaid.
///
/// The update only matches rows that are still unpaid, so of two concurrent calls
/// exactly one succeeds.
///
/// # Errors
/// Returns [`Error::AlreadyPaid`] if the invoice is already paid, or
/// [`Error::InvoiceNotFound`] if it does not exist.
#[instrument(skip(db))]
pub async fn mark_invoice_paid(db: &DatabaseConnection, invoice_id: i64) -> Result<invoice::Model> {
    let result = Invoice::update_many()
        .col_expr(invoice::Column::Paid, Expr::value(true))
        .filter(invoice::Column::Id.eq(invoice_id))
        .filter(invoice::Column::Paid.eq(false))
        .exec(db)
        .await?;

    let invoice = get_invoice_by_id(db, invoice_id)
        .await?
        .ok_or_else(|| Error::InvoiceNotFound {
            number: invoice_id.to_string(),
        })?;

    if result.rows_affected == 0 {
        return Err(Error::AlreadyPaid {
            number: invoice.invoice_number,
        });
    }

    debug!("Invoice {} marked as paid", invoice.invoice_number);
    Ok(invoice)
}

/// Invoices matching the optional client and fiscal-year filters.
///
/// The client filter requires exact name equality; the fiscal-year filter requires
/// at least one line item with an equal label. `None` disables a filter.
#[must_use]
pub fn filter_invoices<'a>(
    invoices: &'a [invoice::Model],
    client_name: Option<&str>,
    fiscal_year: Option<&str>,
) -> Vec<&'a invoice::Model> {
    invoices
        .iter()
        .filter(|inv| client_name.is_none_or(|name| inv.client_name == name))
        .filter(|inv| fiscal_year.is_none_or(|fy| inv.line_items.has_fiscal_year(fy)))
        .collect()
}

/// Distinct client names, in the order they first appear.
#[must_use]
pub fn distinct_client_names(invoices: &[invoice::Model]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for inv in invoices {
        if !names.contains(&inv.client_name) {
            names.push(inv.client_name.clone());
        }
    }
    names
}

/// Distinct fiscal-year labels across all line items, in the order they first appear.
#[must_use]
pub fn distinct_fiscal_years(invoices: &[invoice::Model]) -> Vec<String> {
    let mut years: Vec<String> = Vec::new();
    for item in invoices.iter().flat_map(|inv| inv.line_items.0.iter()) {
        if !years.contains(&item.fy) {
            years.push(item.fy.clone());
        }
    }
    years
}
