//! Shared test utilities for `InvoiceDesk`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        client::{self, NewClient},
        invoice::{self, NewInvoice},
        numbering::NumberFormat,
        service,
    },
    entities::{
        ClientModel, InvoiceModel, ServiceModel,
        invoice::{LineItem, LineItems},
    },
    errors::{Error, Result},
    store::InvoiceStore,
};
use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A new client with the given name and filler address and contact.
pub fn new_test_client(name: &str) -> NewClient {
    NewClient {
        name: name.to_string(),
        address: "12 Mill Road".to_string(),
        contact: "billing@example.com".to_string(),
        tax_id: None,
    }
}

/// Inserts a client with sensible defaults.
pub async fn create_test_client(db: &DatabaseConnection, name: &str) -> Result<ClientModel> {
    client::create_client(db, new_test_client(name)).await
}

/// Inserts a catalog service.
pub async fn create_test_service(
    db: &DatabaseConnection,
    name: &str,
    default_rate: f64,
) -> Result<ServiceModel> {
    service::create_service(db, name.to_string(), default_rate).await
}

/// Inserts a single-item invoice (rate 1000, quantity 1) for the given client.
pub async fn create_test_invoice(
    db: &DatabaseConnection,
    client_name: &str,
    fy: &str,
) -> Result<InvoiceModel> {
    invoice::create_invoice(
        db,
        NewInvoice {
            client_id: None,
            client_name: client_name.to_string(),
            client_address: "12 Mill Road".to_string(),
            client_contact: "billing@example.com".to_string(),
            client_tax_id: None,
            line_items: vec![LineItem::new("Bookkeeping", 1000.0, 1.0, fy)],
        },
        &NumberFormat::default(),
    )
    .await
}

/// An unsaved client record for pure tests.
pub fn test_client_model(id: i64, name: &str) -> ClientModel {
    ClientModel {
        id,
        name: name.to_string(),
        address: format!("{id} Mill Road"),
        contact: format!("client{id}@example.com"),
        tax_id: None,
        created_at: chrono::Utc::now(),
    }
}

/// An unsaved service record for pure tests.
pub fn test_service_model(id: i64, name: &str, default_rate: f64) -> ServiceModel {
    ServiceModel {
        id,
        name: name.to_string(),
        default_rate,
        created_at: chrono::Utc::now(),
    }
}

/// An unpaid invoice with one 1000-rate line item per fiscal year label.
pub fn test_invoice_model(id: i64, client_name: &str, fiscal_years: &[&str]) -> InvoiceModel {
    let line_items = LineItems(
        fiscal_years
            .iter()
            .map(|fy| LineItem::new("Bookkeeping", 1000.0, 1.0, *fy))
            .collect(),
    );
    InvoiceModel {
        id,
        invoice_number: NumberFormat::default().format(u64::try_from(id).unwrap_or_default()),
        client_id: None,
        client_name: client_name.to_string(),
        client_address: "12 Mill Road".to_string(),
        client_contact: "billing@example.com".to_string(),
        client_tax_id: None,
        total: line_items.total(),
        line_items,
        created_at: chrono::Utc::now(),
        paid: false,
    }
}

/// A store whose every call fails.
///
/// Hand it to a session operation to prove the operation either never reaches the
/// store or reacts correctly to a store failure.
pub struct FailingStore;

fn unavailable<T>() -> Result<T> {
    Err(Error::Database(DbErr::Custom("store unavailable".to_string())))
}

#[async_trait]
impl InvoiceStore for FailingStore {
    async fn list_clients(&self) -> Result<Vec<ClientModel>> {
        unavailable()
    }
    async fn insert_client(&self, _: NewClient) -> Result<ClientModel> {
        unavailable()
    }
    async fn insert_clients(&self, _: Vec<NewClient>) -> Result<Vec<ClientModel>> {
        unavailable()
    }
    async fn update_client(&self, _: ClientModel) -> Result<ClientModel> {
        unavailable()
    }
    async fn delete_client(&self, _: i64) -> Result<()> {
        unavailable()
    }
    async fn list_services(&self) -> Result<Vec<ServiceModel>> {
        unavailable()
    }
    async fn insert_service(&self, _: String, _: f64) -> Result<ServiceModel> {
        unavailable()
    }
    async fn update_service(&self, _: ServiceModel) -> Result<ServiceModel> {
        unavailable()
    }
    async fn delete_service(&self, _: i64) -> Result<()> {
        unavailable()
    }
    async fn list_invoices(&self) -> Result<Vec<InvoiceModel>> {
        unavailable()
    }
    async fn preview_invoice_number(&self, _: &NumberFormat) -> Result<String> {
        unavailable()
    }
    async fn insert_invoice(&self, _: NewInvoice, _: &NumberFormat) -> Result<InvoiceModel> {
        unavailable()
    }
    async fn mark_invoice_paid(&self, _: i64) -> Result<InvoiceModel> {
        unavailable()
    }
}
