//! Invoice browser state - the saved invoice list with its filters and detail view.

use crate::{
    config::AppConfig,
    core::invoice,
    entities::InvoiceModel,
    errors::{Error, Result},
    export::{pdf, spreadsheet},
    store::InvoiceStore,
};
use tracing::{debug, info};

/// What a capture sees while it renders one invoice.
#[derive(Debug, Clone, Copy)]
pub struct CaptureView<'a> {
    pub invoice: &'a InvoiceModel,
    /// Always `false` while a capture runs
    pub controls_visible: bool,
}

/// Hides the detail controls for as long as it lives.
struct HiddenControls<'a> {
    visible: &'a mut bool,
}

impl<'a> HiddenControls<'a> {
    fn hide(visible: &'a mut bool) -> Self {
        *visible = false;
        Self { visible }
    }
}

impl Drop for HiddenControls<'_> {
    fn drop(&mut self) {
        *self.visible = true;
    }
}

/// Snapshot of saved invoices plus the browser's view state.
#[derive(Debug, Clone)]
pub struct InvoiceBrowser {
    invoices: Vec<InvoiceModel>,
    client_filter: Option<String>,
    fiscal_year_filter: Option<String>,
    open_invoice: Option<i64>,
    controls_visible: bool,
}

impl Default for InvoiceBrowser {
    fn default() -> Self {
        Self::from_invoices(Vec::new())
    }
}

impl InvoiceBrowser {
    /// Loads every invoice, newest first.
    pub async fn load<S: InvoiceStore + ?Sized>(store: &S) -> Result<Self> {
        Ok(Self::from_invoices(store.list_invoices().await?))
    }

    #[must_use]
    pub const fn from_invoices(invoices: Vec<InvoiceModel>) -> Self {
        Self {
            invoices,
            client_filter: None,
            fiscal_year_filter: None,
            open_invoice: None,
            controls_visible: true,
        }
    }

    /// Every loaded invoice, ignoring filters.
    #[must_use]
    pub fn invoices(&self) -> &[InvoiceModel] {
        &self.invoices
    }

    /// Invoices passing both filters.
    #[must_use]
    pub fn filtered(&self) -> Vec<&InvoiceModel> {
        invoice::filter_invoices(
            &self.invoices,
            self.client_filter.as_deref(),
            self.fiscal_year_filter.as_deref(),
        )
    }

    #[must_use]
    pub fn client_filter(&self) -> Option<&str> {
        self.client_filter.as_deref()
    }

    #[must_use]
    pub fn fiscal_year_filter(&self) -> Option<&str> {
        self.fiscal_year_filter.as_deref()
    }

    /// Sets or clears the client filter. An empty name clears it.
    #[must_use]
    pub fn with_client_filter(self, client_name: Option<String>) -> Self {
        Self {
            client_filter: client_name.filter(|name| !name.is_empty()),
            ..self
        }
    }

    /// Sets or clears the fiscal-year filter. An empty label clears it.
    #[must_use]
    pub fn with_fiscal_year_filter(self, fiscal_year: Option<String>) -> Self {
        Self {
            fiscal_year_filter: fiscal_year.filter(|fy| !fy.is_empty()),
            ..self
        }
    }

    /// Values offered by the client filter.
    #[must_use]
    pub fn client_names(&self) -> Vec<String> {
        invoice::distinct_client_names(&self.invoices)
    }

    /// Values offered by the fiscal-year filter.
    #[must_use]
    pub fn fiscal_years(&self) -> Vec<String> {
        invoice::distinct_fiscal_years(&self.invoices)
    }

    #[must_use]
    pub fn find_by_number(&self, invoice_number: &str) -> Option<&InvoiceModel> {
        self.invoices
            .iter()
            .find(|inv| inv.invoice_number == invoice_number)
    }

    /// Opens the detail view of an invoice, or closes it if it is already open.
    /// Opening one invoice closes any other.
    #[must_use]
    pub fn toggle_detail(self, invoice_id: i64) -> Self {
        let open_invoice = if self.open_invoice == Some(invoice_id) {
            None
        } else {
            Some(invoice_id)
        };
        Self {
            open_invoice,
            ..self
        }
    }

    /// The invoice whose detail view is open.
    #[must_use]
    pub fn open_invoice(&self) -> Option<&InvoiceModel> {
        let id = self.open_invoice?;
        self.invoices.iter().find(|inv| inv.id == id)
    }

    /// Whether the detail view shows its action controls.
    #[must_use]
    pub const fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    /// Marks an unpaid invoice as paid and patches it in place.
    ///
    /// # Errors
    /// Returns [`Error::AlreadyPaid`] without calling the store if the snapshot
    /// already shows the invoice as paid, and passes through the store's refusal if
    /// it was paid elsewhere in the meantime.
    pub async fn mark_paid<S: InvoiceStore + ?Sized>(
        &self,
        store: &S,
        invoice_id: i64,
    ) -> Result<Self> {
        let current = self
            .invoices
            .iter()
            .find(|inv| inv.id == invoice_id)
            .ok_or_else(|| Error::InvoiceNotFound {
                number: invoice_id.to_string(),
            })?;
        if current.paid {
            return Err(Error::AlreadyPaid {
                number: current.invoice_number.clone(),
            });
        }

        let updated = store.mark_invoice_paid(invoice_id).await?;
        debug!("Invoice {} is now paid", updated.invoice_number);

        let mut next = self.clone();
        if let Some(slot) = next.invoices.iter_mut().find(|inv| inv.id == invoice_id) {
            *slot = updated;
        }
        Ok(next)
    }

    /// Serializes the filtered invoices to an xlsx workbook.
    pub fn export_spreadsheet(&self, config: &AppConfig) -> Result<Vec<u8>> {
        let rows: Vec<_> = self
            .filtered()
            .into_iter()
            .map(|inv| spreadsheet::InvoiceExportRow::new(inv, &config.invoice.currency_symbol))
            .collect();
        info!("Exporting {} invoices to a spreadsheet", rows.len());
        spreadsheet::write_invoices(&rows)
    }

    /// Renders one invoice as a PDF document.
    pub fn export_pdf(&mut self, invoice_id: i64, config: &AppConfig) -> Result<Vec<u8>> {
        self.capture(invoice_id, |view| pdf::render_invoice(view.invoice, config))
    }

    /// Runs `render` against an invoice with the controls hidden.
    ///
    /// The controls are shown again when `render` returns, whether it succeeded,
    /// failed or panicked.
    pub fn capture<F>(&mut self, invoice_id: i64, render: F) -> Result<Vec<u8>>
    where
        F: FnOnce(CaptureView<'_>) -> Result<Vec<u8>>,
    {
        let Self {
            invoices,
            controls_visible,
            ..
        } = self;
        let invoice = invoices
            .iter()
            .find(|inv| inv.id == invoice_id)
            .ok_or_else(|| Error::InvoiceNotFound {
                number: invoice_id.to_string(),
            })?;

        let hidden = HiddenControls::hide(controls_visible);
        render(CaptureView {
            invoice,
            controls_visible: *hidden.visible,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn browser() -> InvoiceBrowser {
        InvoiceBrowser::from_invoices(vec![
            test_invoice_model(3, "Acme", &["2024-25"]),
            test_invoice_model(2, "Globex", &["2023-24"]),
            test_invoice_model(1, "Acme", &["2023-24"]),
        ])
    }

    fn ids(invoices: &[&InvoiceModel]) -> Vec<i64> {
        invoices.iter().map(|inv| inv.id).collect()
    }

    #[test]
    fn test_filters_combine_and_clear() {
        let browser = browser().with_client_filter(Some("Acme".to_string()));
        assert_eq!(ids(&browser.filtered()), vec![3, 1]);

        let browser = browser.with_fiscal_year_filter(Some("2023-24".to_string()));
        assert_eq!(ids(&browser.filtered()), vec![1]);

        let browser = browser
            .with_client_filter(Some(String::new()))
            .with_fiscal_year_filter(None);
        assert_eq!(browser.filtered().len(), 3);
        assert!(browser.client_filter().is_none());
    }

    #[test]
    fn test_filter_values() {
        let browser = browser();
        assert_eq!(browser.client_names(), vec!["Acme", "Globex"]);
        assert_eq!(browser.fiscal_years(), vec!["2024-25", "2023-24"]);
    }

    #[test]
    fn test_toggle_detail() {
        let browser = browser().toggle_detail(2);
        assert_eq!(browser.open_invoice().unwrap().id, 2);

        let browser = browser.toggle_detail(3);
        assert_eq!(browser.open_invoice().unwrap().id, 3);

        let browser = browser.toggle_detail(3);
        assert!(browser.open_invoice().is_none());
    }

    #[tokio::test]
    async fn test_mark_paid_patches_snapshot() -> Result<()> {
        let db = setup_test_db().await?;
        let invoice = create_test_invoice(&db, "Acme", "2024-25").await?;
        let browser = InvoiceBrowser::load(&db).await?;

        let browser = browser.mark_paid(&db, invoice.id).await?;
        assert!(browser.invoices()[0].paid);
        assert_eq!(browser.invoices(), InvoiceBrowser::load(&db).await?.invoices());
        Ok(())
    }

    #[tokio::test]
    async fn test_mark_paid_twice_skips_store() -> Result<()> {
        let mut paid = test_invoice_model(1, "Acme", &["2024-25"]);
        paid.paid = true;
        let browser = InvoiceBrowser::from_invoices(vec![paid]);

        let result = browser.mark_paid(&FailingStore, 1).await;
        assert!(matches!(result.unwrap_err(), Error::AlreadyPaid { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_mark_paid_refused_by_store() -> Result<()> {
        let db = setup_test_db().await?;
        let invoice = create_test_invoice(&db, "Acme", "2024-25").await?;
        let stale = InvoiceBrowser::load(&db).await?;
        crate::core::invoice::mark_invoice_paid(&db, invoice.id).await?;

        let result = stale.mark_paid(&db, invoice.id).await;
        assert!(matches!(result.unwrap_err(), Error::AlreadyPaid { .. }));
        Ok(())
    }

    #[test]
    fn test_capture_hides_then_restores_controls() {
        let mut browser = browser().toggle_detail(1);
        let bytes = browser
            .capture(1, |view| {
                assert!(!view.controls_visible);
                Ok(view.invoice.invoice_number.clone().into_bytes())
            })
            .unwrap();
        assert_eq!(bytes, b"INV-00001");
        assert!(browser.controls_visible());
    }

    #[test]
    fn test_failed_capture_restores_controls() {
        let mut browser = browser();
        let result = browser.capture(1, |_| {
            Err(Error::Pdf {
                message: "renderer crashed".to_string(),
            })
        });
        assert!(matches!(result.unwrap_err(), Error::Pdf { .. }));
        assert!(browser.controls_visible());
    }

    #[test]
    fn test_panicking_capture_restores_controls() {
        let mut browser = browser();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            browser.capture(1, |_| panic!("renderer panicked"))
        }));
        assert!(outcome.is_err());
        assert!(browser.controls_visible());
    }

    #[test]
    fn test_export_pdf() -> Result<()> {
        let mut browser = browser();
        let bytes = browser.export_pdf(2, &AppConfig::default())?;
        assert!(bytes.starts_with(b"%PDF"));
        assert!(matches!(
            browser.export_pdf(99, &AppConfig::default()).unwrap_err(),
            Error::InvoiceNotFound { .. }
        ));
        Ok(())
    }

    #[test]
    fn test_export_spreadsheet_uses_filters() -> Result<()> {
        let browser = browser().with_client_filter(Some("Globex".to_string()));
        let bytes = browser.export_spreadsheet(&AppConfig::default())?;
        let rows = spreadsheet::read_rows(&bytes)?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], "Globex");
        Ok(())
    }
}
