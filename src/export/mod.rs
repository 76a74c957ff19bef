//! Document export - xlsx workbooks for clients and invoices, PDF for single invoices.

/// Invoice PDF rendering
pub mod pdf;
/// Client and invoice workbooks
pub mod spreadsheet;

/// Attachment name for the client workbook
pub const CLIENTS_FILENAME: &str = "clients.xlsx";
/// Attachment name for the invoice workbook
pub const INVOICES_FILENAME: &str = "Invoices.xlsx";

/// Attachment name for a single invoice PDF
#[must_use]
pub fn invoice_pdf_filename(invoice_number: &str) -> String {
    format!("invoice-{invoice_number}.pdf")
}
