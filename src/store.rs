//! Repository interface over the three invoicing tables.
//!
//! Sessions talk to persistence only through [`InvoiceStore`], which exposes typed
//! CRUD per entity. The `SeaORM` connection implements it by delegating to the
//! functions in [`crate::core`].

use crate::{
    core::{
        client::{self, NewClient},
        invoice::{self, NewInvoice},
        numbering::{self, NumberFormat},
        service,
    },
    entities::{ClientModel, InvoiceModel, ServiceModel},
    errors::Result,
};
use async_trait::async_trait;
use sea_orm::DatabaseConnection;

/// Typed access to clients, services and invoices.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// All clients in insertion order.
    async fn list_clients(&self) -> Result<Vec<ClientModel>>;
    /// Inserts one client and returns it with its assigned id.
    async fn insert_client(&self, client: NewClient) -> Result<ClientModel>;
    /// Inserts many clients; all or none.
    async fn insert_clients(&self, clients: Vec<NewClient>) -> Result<Vec<ClientModel>>;
    /// Replaces a client's fields, keyed by its id.
    async fn update_client(&self, client: ClientModel) -> Result<ClientModel>;
    async fn delete_client(&self, client_id: i64) -> Result<()>;

    /// All services in insertion order.
    async fn list_services(&self) -> Result<Vec<ServiceModel>>;
    async fn insert_service(&self, name: String, default_rate: f64) -> Result<ServiceModel>;
    async fn update_service(&self, service: ServiceModel) -> Result<ServiceModel>;
    async fn delete_service(&self, service_id: i64) -> Result<()>;

    /// All invoices, newest first.
    async fn list_invoices(&self) -> Result<Vec<InvoiceModel>>;
    /// The number the next invoice will most likely receive; nothing is reserved.
    async fn preview_invoice_number(&self, format: &NumberFormat) -> Result<String>;
    /// Inserts an invoice, reserving its number in the same transaction.
    async fn insert_invoice(&self, invoice: NewInvoice, format: &NumberFormat)
    -> Result<InvoiceModel>;
    /// Moves an unpaid invoice to paid.
    async fn mark_invoice_paid(&self, invoice_id: i64) -> Result<InvoiceModel>;
}

#[async_trait]
impl InvoiceStore for DatabaseConnection {
    async fn list_clients(&self) -> Result<Vec<ClientModel>> {
        client::get_all_clients(self).await
    }

    async fn insert_client(&self, new_client: NewClient) -> Result<ClientModel> {
        client::create_client(self, new_client).await
    }

    async fn insert_clients(&self, new_clients: Vec<NewClient>) -> Result<Vec<ClientModel>> {
        client::create_clients(self, new_clients).await
    }

    async fn update_client(&self, updated: ClientModel) -> Result<ClientModel> {
        client::update_client(self, updated).await
    }

    async fn delete_client(&self, client_id: i64) -> Result<()> {
        client::delete_client(self, client_id).await
    }

    async fn list_services(&self) -> Result<Vec<ServiceModel>> {
        service::get_all_services(self).await
    }

    async fn insert_service(&self, name: String, default_rate: f64) -> Result<ServiceModel> {
        service::create_service(self, name, default_rate).await
    }

    async fn update_service(&self, updated: ServiceModel) -> Result<ServiceModel> {
        service::update_service(self, updated).await
    }

    async fn delete_service(&self, service_id: i64) -> Result<()> {
        service::delete_service(self, service_id).await
    }

    async fn list_invoices(&self) -> Result<Vec<InvoiceModel>> {
        invoice::get_all_invoices(self).await
    }

    async fn preview_invoice_number(&self, format: &NumberFormat) -> Result<String> {
        numbering::preview_next_number(self, format).await
    }

    async fn insert_invoice(
        &self,
        new_invoice: NewInvoice,
        format: &NumberFormat,
    ) -> Result<InvoiceModel> {
        invoice::create_invoice(self, new_invoice, format).await
    }

    async fn mark_invoice_paid(&self, invoice_id: i64) -> Result<InvoiceModel> {
        invoice::mark_invoice_paid(self, invoice_id).await
    }
}
