//! Catalog manager state - the client and service lists with their forms and edits.
//!
//! Every successful mutation patches the in-memory lists by record id, so the
//! catalog never has to reload both tables after a change.

use crate::{
    core::{amount, client::NewClient},
    entities::{ClientModel, ServiceModel},
    errors::{Error, Result},
    export::spreadsheet,
    store::InvoiceStore,
};
use tracing::{debug, warn};

/// The "add client" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientForm {
    pub name: String,
    pub address: String,
    pub contact: String,
    pub tax_id: String,
}

/// The "add service" form. The rate is kept as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceForm {
    pub name: String,
    pub default_rate: String,
}

/// Working copy of a service being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEdit {
    pub id: i64,
    pub name: String,
    /// Rate as typed; parsed only when saving
    pub default_rate: String,
}

/// Editable client fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientField {
    Name,
    Address,
    Contact,
    TaxId,
}

/// Editable service fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceField {
    Name,
    DefaultRate,
}

/// Snapshot of both catalog tables plus the add forms and the current edits.
///
/// At most one client and one service can be in edit mode at a time.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    clients: Vec<ClientModel>,
    services: Vec<ServiceModel>,
    client_form: ClientForm,
    service_form: ServiceForm,
    client_edit: Option<ClientModel>,
    service_edit: Option<ServiceEdit>,
}

impl Catalog {
    /// Loads both tables.
    pub async fn load<S: InvoiceStore + ?Sized>(store: &S) -> Result<Self> {
        Ok(Self {
            clients: store.list_clients().await?,
            services: store.list_services().await?,
            ..Self::default()
        })
    }

    /// Re-reads both tables, keeping forms and edit state.
    pub async fn reload<S: InvoiceStore + ?Sized>(&self, store: &S) -> Result<Self> {
        Ok(Self {
            clients: store.list_clients().await?,
            services: store.list_services().await?,
            ..self.clone()
        })
    }

    #[must_use]
    pub fn clients(&self) -> &[ClientModel] {
        &self.clients
    }

    #[must_use]
    pub fn services(&self) -> &[ServiceModel] {
        &self.services
    }

    #[must_use]
    pub const fn client_form(&self) -> &ClientForm {
        &self.client_form
    }

    #[must_use]
    pub const fn service_form(&self) -> &ServiceForm {
        &self.service_form
    }

    /// The client working copy, if a client is being edited.
    #[must_use]
    pub const fn client_edit(&self) -> Option<&ClientModel> {
        self.client_edit.as_ref()
    }

    /// The service working copy, if a service is being edited.
    #[must_use]
    pub const fn service_edit(&self) -> Option<&ServiceEdit> {
        self.service_edit.as_ref()
    }

    /// Finds a client in the snapshot by exact name, ignoring case.
    #[must_use]
    pub fn client_named(&self, name: &str) -> Option<&ClientModel> {
        crate::core::client::find_client_by_name(&self.clients, name)
    }

    /// Finds a service in the snapshot by exact name, ignoring case.
    #[must_use]
    pub fn service_named(&self, name: &str) -> Option<&ServiceModel> {
        crate::core::service::find_service_by_name(&self.services, name)
    }

    #[must_use]
    pub fn with_client_form(self, client_form: ClientForm) -> Self {
        Self {
            client_form,
            ..self
        }
    }

    #[must_use]
    pub fn with_service_form(self, service_form: ServiceForm) -> Self {
        Self {
            service_form,
            ..self
        }
    }

    /// Inserts the client form as a new client and clears the form.
    ///
    /// # Errors
    /// Fails if the name is empty or the store rejects the insert; the state
    /// (including the form) is then left as it was.
    pub async fn add_client<S: InvoiceStore + ?Sized>(&self, store: &S) -> Result<Self> {
        let form = &self.client_form;
        if form.name.trim().is_empty() {
            return Err(Error::validation("Client name cannot be empty"));
        }
        let tax_id = Some(form.tax_id.trim().to_string()).filter(|t| !t.is_empty());

        let created = store
            .insert_client(NewClient {
                name: form.name.clone(),
                address: form.address.clone(),
                contact: form.contact.clone(),
                tax_id,
            })
            .await?;

        let mut next = self.clone();
        next.clients.push(created);
        next.client_form = ClientForm::default();
        Ok(next)
    }

    /// Inserts the service form as a new service and clears the form.
    ///
    /// # Errors
    /// Fails if the name is empty, the rate does not parse, or the store rejects
    /// the insert; the state is then left as it was.
    pub async fn add_service<S: InvoiceStore + ?Sized>(&self, store: &S) -> Result<Self> {
        let form = &self.service_form;
        if form.name.trim().is_empty() {
            return Err(Error::validation("Service name cannot be empty"));
        }
        let rate = amount::parse_rate(&form.default_rate)?;

        let created = store.insert_service(form.name.trim().to_string(), rate).await?;

        let mut next = self.clone();
        next.services.push(created);
        next.service_form = ServiceForm::default();
        Ok(next)
    }

    /// Starts editing a client, replacing any client edit in progress.
    ///
    /// # Errors
    /// Returns [`Error::ClientNotFound`] if the id is not in the snapshot.
    pub fn begin_client_edit(self, client_id: i64) -> Result<Self> {
        let working_copy = self
            .clients
            .iter()
            .find(|c| c.id == client_id)
            .cloned()
            .ok_or_else(|| Error::ClientNotFound {
                name: client_id.to_string(),
            })?;
        Ok(Self {
            client_edit: Some(working_copy),
            ..self
        })
    }

    /// Changes one field of the client working copy.
    ///
    /// # Errors
    /// Returns a validation error if no client is being edited.
    pub fn set_client_field(mut self, field: ClientField, value: impl Into<String>) -> Result<Self> {
        let edit = self
            .client_edit
            .as_mut()
            .ok_or_else(|| Error::validation("No client is being edited"))?;
        let value = value.into();
        match field {
            ClientField::Name => edit.name = value,
            ClientField::Address => edit.address = value,
            ClientField::Contact => edit.contact = value,
            ClientField::TaxId => {
                edit.tax_id = Some(value.trim().to_string()).filter(|t| !t.is_empty());
            }
        }
        Ok(self)
    }

    /// Sends the client working copy to the store.
    ///
    /// Edit mode ends whether or not the store accepts the update; the returned
    /// state always has no client edit, and is patched only on success.
    pub async fn save_client_edit<S: InvoiceStore + ?Sized>(&self, store: &S) -> (Self, Result<()>) {
        let mut next = self.clone();
        let Some(working_copy) = next.client_edit.take() else {
            return (next, Err(Error::validation("No client is being edited")));
        };

        match store.update_client(working_copy).await {
            Ok(updated) => {
                replace_by_id(&mut next.clients, updated, |c| c.id);
                (next, Ok(()))
            }
            Err(e) => {
                warn!("Client update rejected: {e}");
                (next, Err(e))
            }
        }
    }

    /// Discards the client working copy without touching the store.
    #[must_use]
    pub fn cancel_client_edit(self) -> Self {
        Self {
            client_edit: None,
            ..self
        }
    }

    /// Starts editing a service, replacing any service edit in progress.
    ///
    /// # Errors
    /// Returns [`Error::ServiceNotFound`] if the id is not in the snapshot.
    pub fn begin_service_edit(self, service_id: i64) -> Result<Self> {
        let service = self
            .services
            .iter()
            .find(|s| s.id == service_id)
            .ok_or_else(|| Error::ServiceNotFound {
                name: service_id.to_string(),
            })?;
        let working_copy = ServiceEdit {
            id: service.id,
            name: service.name.clone(),
            default_rate: service.default_rate.to_string(),
        };
        Ok(Self {
            service_edit: Some(working_copy),
            ..self
        })
    }

    /// Changes one field of the service working copy.
    ///
    /// # Errors
    /// Returns a validation error if no service is being edited.
    pub fn set_service_field(
        mut self,
        field: ServiceField,
        value: impl Into<String>,
    ) -> Result<Self> {
        let edit = self
            .service_edit
            .as_mut()
            .ok_or_else(|| Error::validation("No service is being edited"))?;
        match field {
            ServiceField::Name => edit.name = value.into(),
            ServiceField::DefaultRate => edit.default_rate = value.into(),
        }
        Ok(self)
    }

    /// Sends the service working copy to the store.
    ///
    /// Edit mode ends unconditionally. A rate that is not a number is rejected the
    /// way the store would reject it.
    pub async fn save_service_edit<S: InvoiceStore + ?Sized>(
        &self,
        store: &S,
    ) -> (Self, Result<()>) {
        let mut next = self.clone();
        let Some(edit) = next.service_edit.take() else {
            return (next, Err(Error::validation("No service is being edited")));
        };
        let Some(original) = next.services.iter().find(|s| s.id == edit.id).cloned() else {
            return (
                next,
                Err(Error::ServiceNotFound {
                    name: edit.id.to_string(),
                }),
            );
        };
        let default_rate = match amount::parse_rate(&edit.default_rate) {
            Ok(rate) => rate,
            Err(e) => return (next, Err(e)),
        };

        let working_copy = ServiceModel {
            name: edit.name,
            default_rate,
            ..original
        };
        match store.update_service(working_copy).await {
            Ok(updated) => {
                replace_by_id(&mut next.services, updated, |s| s.id);
                (next, Ok(()))
            }
            Err(e) => {
                warn!("Service update rejected: {e}");
                (next, Err(e))
            }
        }
    }

    /// Discards the service working copy without touching the store.
    #[must_use]
    pub fn cancel_service_edit(self) -> Self {
        Self {
            service_edit: None,
            ..self
        }
    }

    /// Deletes a client once the user has confirmed. Unconfirmed calls change nothing
    /// and never reach the store.
    pub async fn delete_client<S: InvoiceStore + ?Sized>(
        &self,
        store: &S,
        client_id: i64,
        confirmed: bool,
    ) -> Result<Self> {
        if !confirmed {
            debug!("Client {client_id} deletion not confirmed");
            return Ok(self.clone());
        }
        store.delete_client(client_id).await?;

        let mut next = self.clone();
        next.clients.retain(|c| c.id != client_id);
        if next.client_edit.as_ref().is_some_and(|c| c.id == client_id) {
            next.client_edit = None;
        }
        Ok(next)
    }

    /// Deletes a service once the user has confirmed.
    pub async fn delete_service<S: InvoiceStore + ?Sized>(
        &self,
        store: &S,
        service_id: i64,
        confirmed: bool,
    ) -> Result<Self> {
        if !confirmed {
            debug!("Service {service_id} deletion not confirmed");
            return Ok(self.clone());
        }
        store.delete_service(service_id).await?;

        let mut next = self.clone();
        next.services.retain(|s| s.id != service_id);
        if next.service_edit.as_ref().is_some_and(|s| s.id == service_id) {
            next.service_edit = None;
        }
        Ok(next)
    }

    /// Imports clients from the first sheet of an xlsx workbook. Either every row
    /// becomes a client or none does.
    pub async fn import_clients<S: InvoiceStore + ?Sized>(
        &self,
        store: &S,
        workbook: &[u8],
    ) -> Result<Self> {
        let rows = spreadsheet::read_clients(workbook)?;
        if rows.is_empty() {
            return Err(Error::Import {
                message: "the first sheet has no client rows".to_string(),
            });
        }
        let created = store.insert_clients(rows).await.map_err(|e| match e {
            Error::Import { .. } => e,
            other => Error::Import {
                message: other.to_string(),
            },
        })?;

        let mut next = self.clone();
        next.clients.extend(created);
        Ok(next)
    }

    /// Serializes the client snapshot to an xlsx workbook.
    pub fn export_clients(&self) -> Result<Vec<u8>> {
        spreadsheet::write_clients(&self.clients)
    }
}

fn replace_by_id<T>(items: &mut [T], updated: T, id_of: impl Fn(&T) -> i64) {
    let id = id_of(&updated);
    if let Some(slot) = items.iter_mut().find(|item| id_of(item) == id) {
        *slot = updated;
    }
}
