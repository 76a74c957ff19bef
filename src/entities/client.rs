//! Client entity - A business the invoices are billed to.
//!
//! Invoices never reference this table for their billed-to block; they copy the
//! name, address, contact and tax id at creation time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Client database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    /// Unique identifier assigned by the store
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, used for autocomplete and invoice matching
    pub name: String,
    /// Postal address printed on invoices
    pub address: String,
    /// Phone number or email
    pub contact: String,
    /// Optional tax registration number (GSTIN, VAT id, ...)
    pub tax_id: Option<String>,
    /// When the client was created
    pub created_at: DateTimeUtc,
}

/// Clients have no relations; invoices hold a snapshot instead.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
