//! Invoice entity - A saved invoice with its denormalized client and line items.
//!
//! Everything about the client and the services is copied in at creation time, so
//! later edits to the catalog never change an invoice. `paid` is the only column
//! that changes after insert, and only from `false` to `true`.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    /// Unique identifier assigned by the store
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Sequential, zero-padded number such as `INV-00005`
    #[sea_orm(unique)]
    pub invoice_number: String,
    /// Id of the client at creation time; informational only, never joined
    pub client_id: Option<i64>,
    /// Client name snapshot
    pub client_name: String,
    /// Client address snapshot
    pub client_address: String,
    /// Client contact snapshot
    pub client_contact: String,
    /// Client tax id snapshot
    pub client_tax_id: Option<String>,
    /// Ordered line items, frozen at creation
    pub line_items: LineItems,
    /// Sum of line item subtotals
    pub total: f64,
    /// When the invoice was created
    pub created_at: DateTimeUtc,
    /// Whether the invoice has been paid
    pub paid: bool,
}

/// One billed service inside an invoice.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Service name as typed on the invoice
    pub name: String,
    /// Rate per unit
    pub rate: f64,
    /// Quantity billed
    pub quantity: f64,
    /// Free-text fiscal year label (e.g., `2024-25`)
    pub fy: String,
    /// `rate * quantity`
    pub subtotal: f64,
}

impl LineItem {
    /// Builds a line item, computing its subtotal.
    #[must_use]
    pub fn new(name: impl Into<String>, rate: f64, quantity: f64, fy: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rate,
            quantity,
            fy: fy.into(),
            subtotal: rate * quantity,
        }
    }
}

/// The line item list, stored as a single JSON column.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct LineItems(pub Vec<LineItem>);

impl LineItems {
    /// Sum of all subtotals.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.iter().map(|item| item.subtotal).sum()
    }

    /// Whether any line item carries the given fiscal year label.
    #[must_use]
    pub fn has_fiscal_year(&self, fy: &str) -> bool {
        self.0.iter().any(|item| item.fy == fy)
    }
}

/// Invoices have no relations; the client is a snapshot.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_line_items_stored_as_json_array() {
        let items = LineItems(vec![LineItem::new("Audit", 5000.0, 2.0, "2024-25")]);

        let stored = serde_json::to_value(&items).unwrap_or_default();
        assert_eq!(
            stored,
            serde_json::json!([{
                "name": "Audit",
                "rate": 5000.0,
                "quantity": 2.0,
                "fy": "2024-25",
                "subtotal": 10000.0
            }])
        );
        assert_eq!(items.total(), 10000.0);
        assert!(items.has_fiscal_year("2024-25"));
        assert!(!items.has_fiscal_year("2024"));
    }
}
