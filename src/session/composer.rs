//! Invoice composer state - a draft invoice being put together.
//!
//! The draft holds its own snapshot of the client and service catalogs. Typing a
//! client name narrows the suggestion list, picking a suggestion fills in the
//! client details, and naming a known service fills in its rate. Nothing reaches
//! the store until [`InvoiceDraft::submit`].

use crate::{
    core::{
        amount,
        client::{self, NewClient},
        invoice::NewInvoice,
        numbering::NumberFormat,
        service,
    },
    entities::{ClientModel, InvoiceModel, ServiceModel, invoice::LineItem},
    errors::{Error, Result},
    store::InvoiceStore,
};
use tracing::{debug, info};

/// One editable row of the draft. Rate and quantity stay as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItemDraft {
    pub service_name: String,
    pub rate: String,
    pub quantity: String,
    pub fy: String,
    /// `rate * quantity`, with unparsable numbers counted as zero
    pub subtotal: f64,
}

impl LineItemDraft {
    fn recompute(&mut self) {
        self.subtotal = amount::parse_or_zero(&self.rate) * amount::parse_or_zero(&self.quantity);
    }

    fn freeze(&self) -> LineItem {
        LineItem::new(
            self.service_name.trim(),
            amount::parse_or_zero(&self.rate),
            amount::parse_or_zero(&self.quantity),
            self.fy.trim(),
        )
    }
}

/// Editable line item fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineField {
    ServiceName,
    Rate,
    Quantity,
    FiscalYear,
}

/// A draft invoice.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    clients: Vec<ClientModel>,
    services: Vec<ServiceModel>,
    number_format: NumberFormat,
    preview_number: String,
    client_name: String,
    client_address: String,
    client_contact: String,
    client_tax_id: String,
    suggestions: Vec<ClientModel>,
    line_items: Vec<LineItemDraft>,
    total: f64,
}

impl InvoiceDraft {
    /// Loads the catalogs and the next invoice number, starting with one blank line.
    pub async fn load<S: InvoiceStore + ?Sized>(store: &S, number_format: NumberFormat) -> Result<Self> {
        let clients = store.list_clients().await?;
        let services = store.list_services().await?;
        let preview_number = store.preview_invoice_number(&number_format).await?;
        Ok(Self::new(clients, services, number_format, preview_number))
    }

    /// Builds a draft from already-loaded catalogs.
    #[must_use]
    pub fn new(
        clients: Vec<ClientModel>,
        services: Vec<ServiceModel>,
        number_format: NumberFormat,
        preview_number: String,
    ) -> Self {
        Self {
            clients,
            services,
            number_format,
            preview_number,
            client_name: String::new(),
            client_address: String::new(),
            client_contact: String::new(),
            client_tax_id: String::new(),
            suggestions: Vec::new(),
            line_items: vec![LineItemDraft::default()],
            total: 0.0,
        }
    }

    /// The number shown on the draft. The saved invoice may get a later one if
    /// another invoice is inserted first.
    #[must_use]
    pub fn preview_number(&self) -> &str {
        &self.preview_number
    }

    #[must_use]
    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    #[must_use]
    pub fn client_address(&self) -> &str {
        &self.client_address
    }

    #[must_use]
    pub fn client_contact(&self) -> &str {
        &self.client_contact
    }

    #[must_use]
    pub fn client_tax_id(&self) -> &str {
        &self.client_tax_id
    }

    #[must_use]
    pub fn suggestions(&self) -> &[ClientModel] {
        &self.suggestions
    }

    #[must_use]
    pub fn line_items(&self) -> &[LineItemDraft] {
        &self.line_items
    }

    #[must_use]
    pub fn services(&self) -> &[ServiceModel] {
        &self.services
    }

    /// Sum of the line subtotals.
    #[must_use]
    pub const fn total(&self) -> f64 {
        self.total
    }

    /// Sets the client name and recomputes the suggestions from it.
    #[must_use]
    pub fn type_client_name(self, typed: impl Into<String>) -> Self {
        let client_name = typed.into();
        let suggestions = client::suggest_clients(&self.clients, &client_name)
            .into_iter()
            .cloned()
            .collect();
        Self {
            client_name,
            suggestions,
            ..self
        }
    }

    /// Fills the client fields from a suggestion and clears the suggestions.
    ///
    /// # Errors
    /// Returns [`Error::ClientNotFound`] if the id is not among the current suggestions.
    pub fn select_client(self, client_id: i64) -> Result<Self> {
        let chosen = self
            .suggestions
            .iter()
            .find(|c| c.id == client_id)
            .cloned()
            .ok_or_else(|| Error::ClientNotFound {
                name: client_id.to_string(),
            })?;
        Ok(Self {
            client_name: chosen.name,
            client_address: chosen.address,
            client_contact: chosen.contact,
            client_tax_id: chosen.tax_id.unwrap_or_default(),
            suggestions: Vec::new(),
            ..self
        })
    }

    #[must_use]
    pub fn with_client_address(self, client_address: impl Into<String>) -> Self {
        Self {
            client_address: client_address.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_client_contact(self, client_contact: impl Into<String>) -> Self {
        Self {
            client_contact: client_contact.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_client_tax_id(self, client_tax_id: impl Into<String>) -> Self {
        Self {
            client_tax_id: client_tax_id.into(),
            ..self
        }
    }

    /// Appends a blank line item.
    #[must_use]
    pub fn add_line_item(mut self) -> Self {
        self.line_items.push(LineItemDraft::default());
        self
    }

    /// Changes one field of the line at `index` (0-based).
    ///
    /// Setting the service name to a known service, matched exactly and ignoring
    /// case, replaces the rate with that service's default rate.
    ///
    /// # Errors
    /// Returns [`Error::LineItemOutOfRange`] for an index past the last line.
    pub fn edit_line_item(
        mut self,
        index: usize,
        field: LineField,
        value: impl Into<String>,
    ) -> Result<Self> {
        let len = self.line_items.len();
        let line = self
            .line_items
            .get_mut(index)
            .ok_or(Error::LineItemOutOfRange { index, len })?;

        let value = value.into();
        match field {
            LineField::ServiceName => {
                if let Some(known) = service::find_service_by_name(&self.services, &value) {
                    line.rate = known.default_rate.to_string();
                }
                line.service_name = value;
            }
            LineField::Rate => line.rate = value,
            LineField::Quantity => line.quantity = value,
            LineField::FiscalYear => line.fy = value,
        }
        line.recompute();
        self.total = self.line_items.iter().map(|l| l.subtotal).sum();
        Ok(self)
    }

    /// Checks that the draft can be submitted without touching the store.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The client name is empty
    /// - There are no line items, or a line has no service name
    /// - A line names a service not in the catalog and its rate does not parse
    pub fn validate(&self) -> Result<()> {
        if self.client_name.trim().is_empty() {
            return Err(Error::validation("Client name cannot be empty"));
        }
        if self.line_items.is_empty() {
            return Err(Error::validation("An invoice needs at least one line item"));
        }
        if let Some(index) = self
            .line_items
            .iter()
            .position(|l| l.service_name.trim().is_empty())
        {
            return Err(Error::validation(format!(
                "Line {} has no service name",
                index + 1
            )));
        }
        for line in &self.line_items {
            if service::find_service_by_name(&self.services, &line.service_name).is_none() {
                amount::parse_rate(&line.rate)?;
            }
        }
        Ok(())
    }

    /// Saves the draft as an invoice.
    ///
    /// In order: the client is matched by exact name (ignoring case) or created,
    /// services not in the catalog are created once per distinct name, and the
    /// invoice is inserted with its number assigned by the store.
    ///
    /// The returned draft knows about any client or services created along the way,
    /// so retrying after a failed insert does not create them twice.
    pub async fn submit<S: InvoiceStore + ?Sized>(
        &self,
        store: &S,
    ) -> (Self, Result<InvoiceModel>) {
        let mut next = self.clone();
        let result = next.submit_inner(store).await;
        (next, result)
    }

    async fn submit_inner<S: InvoiceStore + ?Sized>(&mut self, store: &S) -> Result<InvoiceModel> {
        self.validate()?;

        let client_id = match client::find_client_by_name(&self.clients, &self.client_name) {
            Some(existing) => existing.id,
            None => {
                let created = store
                    .insert_client(NewClient {
                        name: self.client_name.trim().to_string(),
                        address: self.client_address.clone(),
                        contact: self.client_contact.clone(),
                        tax_id: Some(self.client_tax_id.trim().to_string())
                            .filter(|t| !t.is_empty()),
                    })
                    .await?;
                debug!("Created client {} while saving invoice", created.name);
                let id = created.id;
                self.clients.push(created);
                id
            }
        };

        let lines = self.line_items.clone();
        for line in &lines {
            if service::find_service_by_name(&self.services, &line.service_name).is_some() {
                continue;
            }
            let rate = amount::parse_rate(&line.rate)?;
            let created = store
                .insert_service(line.service_name.trim().to_string(), rate)
                .await?;
            debug!("Created service {} while saving invoice", created.name);
            self.services.push(created);
        }

        let invoice = store
            .insert_invoice(
                NewInvoice {
                    client_id: Some(client_id),
                    client_name: self.client_name.trim().to_string(),
                    client_address: self.client_address.clone(),
                    client_contact: self.client_contact.clone(),
                    client_tax_id: Some(self.client_tax_id.trim().to_string())
                        .filter(|t| !t.is_empty()),
                    line_items: lines.iter().map(LineItemDraft::freeze).collect(),
                },
                &self.number_format,
            )
            .await?;

        info!("Saved invoice {}", invoice.invoice_number);
        Ok(invoice)
    }

}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn draft() -> InvoiceDraft {
        InvoiceDraft::new(
            vec![test_client_model(1, "Acme"), test_client_model(2, "Globex")],
            vec![
                test_service_model(1, "GST Filing", 1500.0),
                test_service_model(2, "Audit", 5000.0),
            ],
            NumberFormat::default(),
            "INV-00001".to_string(),
        )
    }

    #[test]
    fn test_new_draft_has_one_blank_line() {
        let draft = draft();
        assert_eq!(draft.line_items(), &[LineItemDraft::default()]);
        assert_eq!(draft.total(), 0.0);
        assert_eq!(draft.preview_number(), "INV-00001");
    }

    #[test]
    fn test_client_suggestions() {
        let draft = draft().type_client_name("ac");
        assert_eq!(draft.suggestions().len(), 1);
        assert_eq!(draft.suggestions()[0].name, "Acme");

        let draft = draft.type_client_name("zz");
        assert!(draft.suggestions().is_empty());
    }

    #[test]
    fn test_select_client_fills_fields() -> Result<()> {
        let draft = draft().type_client_name("gl").select_client(2)?;
        assert_eq!(draft.client_name(), "Globex");
        assert_eq!(draft.client_address(), "2 Mill Road");
        assert_eq!(draft.client_contact(), "client2@example.com");
        assert!(draft.suggestions().is_empty());
        Ok(())
    }

    #[test]
    fn test_select_client_outside_suggestions() {
        let result = draft().type_client_name("gl").select_client(1);
        assert!(matches!(result.unwrap_err(), Error::ClientNotFound { .. }));
    }

    #[test]
    fn test_known_service_fills_rate() -> Result<()> {
        let draft = draft()
            .edit_line_item(0, LineField::ServiceName, "gst filing")?
            .edit_line_item(0, LineField::Quantity, "2")?;
        assert_eq!(draft.line_items()[0].rate, "1500");
        assert_eq!(draft.line_items()[0].subtotal, 3000.0);
        assert_eq!(draft.total(), 3000.0);

        // A partial name does not match
        let draft = draft.edit_line_item(0, LineField::ServiceName, "GST")?;
        assert_eq!(draft.line_items()[0].rate, "1500");
        Ok(())
    }

    #[test]
    fn test_known_service_rate_is_not_rounded() -> Result<()> {
        let draft = InvoiceDraft::new(
            Vec::new(),
            vec![test_service_model(1, "Hourly", 0.125)],
            NumberFormat::default(),
            "INV-00001".to_string(),
        )
        .edit_line_item(0, LineField::ServiceName, "Hourly")?
        .edit_line_item(0, LineField::Quantity, "8")?;
        assert_eq!(draft.line_items()[0].rate, "0.125");
        assert_eq!(draft.line_items()[0].subtotal, 1.0);
        assert_eq!(draft.total(), 1.0);
        Ok(())
    }

    #[test]
    fn test_total_tracks_every_edit() -> Result<()> {
        let draft = draft()
            .edit_line_item(0, LineField::Rate, "100")?
            .edit_line_item(0, LineField::Quantity, "3")?
            .add_line_item()
            .edit_line_item(1, LineField::Rate, "50")?
            .edit_line_item(1, LineField::Quantity, "2")?;
        assert_eq!(draft.total(), 400.0);

        let draft = draft.edit_line_item(1, LineField::Quantity, "abc")?;
        assert_eq!(draft.line_items()[1].subtotal, 0.0);
        assert_eq!(draft.total(), 300.0);
        Ok(())
    }

    #[test]
    fn test_edit_out_of_range() {
        let result = draft().edit_line_item(3, LineField::Rate, "1");
        assert!(matches!(
            result.unwrap_err(),
            Error::LineItemOutOfRange { index: 3, len: 1 }
        ));
    }

    #[tokio::test]
    async fn test_submit_validates_before_store_calls() -> Result<()> {
        let unnamed = draft().edit_line_item(0, LineField::ServiceName, "Audit")?;
        let (_, result) = unnamed.submit(&FailingStore).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let no_items = draft().type_client_name("Acme");
        let (_, result) = no_items.submit(&FailingStore).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let bad_rate = draft()
            .type_client_name("Acme")
            .edit_line_item(0, LineField::ServiceName, "Consulting")?
            .edit_line_item(0, LineField::Rate, "a lot")?;
        let (_, result) = bad_rate.submit(&FailingStore).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidRate { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_creates_missing_client_and_services_once() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_client(&db, "Acme").await?;
        create_test_service(&db, "Audit", 5000.0).await?;

        let draft = InvoiceDraft::load(&db, NumberFormat::default())
            .await?
            .type_client_name("Initech")
            .with_client_address("4 Office Park")
            .edit_line_item(0, LineField::ServiceName, "Payroll")?
            .edit_line_item(0, LineField::Rate, "800")?
            .edit_line_item(0, LineField::Quantity, "2")?
            .add_line_item()
            .edit_line_item(1, LineField::ServiceName, "payroll")?
            .edit_line_item(1, LineField::Rate, "800")?
            .edit_line_item(1, LineField::Quantity, "1")?
            .add_line_item()
            .edit_line_item(2, LineField::ServiceName, "audit")?
            .edit_line_item(2, LineField::Quantity, "1")?;
        assert_eq!(draft.preview_number(), "INV-00001");

        let (_, result) = draft.submit(&db).await;
        let invoice = result?;

        assert_eq!(invoice.invoice_number, "INV-00001");
        assert_eq!(invoice.total, 7400.0);
        assert_eq!(invoice.client_address, "4 Office Park");
        assert_eq!(invoice.line_items.0.len(), 3);

        let clients = db.list_clients().await?;
        assert_eq!(clients.len(), 2);
        assert_eq!(invoice.client_id, Some(clients[1].id));

        let services = db.list_services().await?;
        let names: Vec<_> = services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Audit", "Payroll"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_trims_new_client_fields() -> Result<()> {
        let db = setup_test_db().await?;

        let draft = InvoiceDraft::load(&db, NumberFormat::default())
            .await?
            .type_client_name("  Initech ")
            .with_client_tax_id("  GST-9 ")
            .edit_line_item(0, LineField::ServiceName, "Payroll")?
            .edit_line_item(0, LineField::Rate, "800")?
            .edit_line_item(0, LineField::Quantity, "1")?;
        let (_, result) = draft.submit(&db).await;
        let invoice = result?;

        let clients = db.list_clients().await?;
        assert_eq!(clients[0].name, "Initech");
        assert_eq!(clients[0].tax_id.as_deref(), Some("GST-9"));
        assert_eq!(invoice.client_tax_id.as_deref(), Some("GST-9"));
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_reuses_existing_client() -> Result<()> {
        let db = setup_test_db().await?;
        let acme = create_test_client(&db, "Acme").await?;

        let draft = InvoiceDraft::load(&db, NumberFormat::default())
            .await?
            .type_client_name("ACME")
            .edit_line_item(0, LineField::ServiceName, "Bookkeeping")?
            .edit_line_item(0, LineField::Rate, "1000")?
            .edit_line_item(0, LineField::Quantity, "1")?;
        let (_, result) = draft.submit(&db).await;
        let invoice = result?;

        assert_eq!(invoice.client_id, Some(acme.id));
        assert_eq!(db.list_clients().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_drafts_from_same_preview_get_distinct_numbers() -> Result<()> {
        let db = setup_test_db().await?;
        let first = InvoiceDraft::load(&db, NumberFormat::default()).await?;
        let second = InvoiceDraft::load(&db, NumberFormat::default()).await?;
        assert_eq!(first.preview_number(), second.preview_number());

        let fill = |d: InvoiceDraft| {
            d.type_client_name("Acme")
                .edit_line_item(0, LineField::ServiceName, "Bookkeeping")
                .and_then(|d| d.edit_line_item(0, LineField::Rate, "1000"))
        };
        let (_, a) = fill(first)?.submit(&db).await;
        let (_, b) = fill(second)?.submit(&db).await;

        assert_eq!(a?.invoice_number, "INV-00001");
        assert_eq!(b?.invoice_number, "INV-00002");
        Ok(())
    }
}
