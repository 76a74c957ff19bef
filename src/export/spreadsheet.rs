//! Spreadsheet export and import.
//!
//! Workbooks are written with `rust_xlsxwriter` and read back with `calamine`.
//! Every cell is written as a plain string, so nothing a user typed is ever
//! evaluated as a formula.

use crate::{
    core::{amount, client::NewClient},
    entities::{ClientModel, InvoiceModel},
    errors::{Error, Result},
};
use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use rust_xlsxwriter::{Format, Workbook};
use std::io::Cursor;

/// Sheet holding exported clients.
pub const CLIENT_SHEET: &str = "Clients";
/// Sheet holding exported invoices.
pub const INVOICE_SHEET: &str = "Invoices";

/// Column headers of the client sheet, matching the client field names.
pub const CLIENT_HEADERS: [&str; 4] = ["name", "address", "contact", "tax_id"];
/// Column headers of the invoice sheet.
pub const INVOICE_HEADERS: [&str; 6] = ["Invoice_No", "Client", "Date", "Amount", "Paid", "Services"];

/// One invoice flattened into spreadsheet columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceExportRow {
    pub invoice_number: String,
    pub client: String,
    pub date: String,
    pub amount: String,
    pub paid: String,
    pub services: String,
}

impl InvoiceExportRow {
    /// Flattens an invoice. Services read like `Audit (₹5000 × 1) FY:2024-25`.
    #[must_use]
    pub fn new(invoice: &InvoiceModel, currency_symbol: &str) -> Self {
        let services = invoice
            .line_items
            .0
            .iter()
            .map(|item| {
                format!(
                    "{} ({currency_symbol}{} × {}) FY:{}",
                    item.name,
                    amount::format_amount(item.rate),
                    amount::format_amount(item.quantity),
                    item.fy
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            invoice_number: invoice.invoice_number.clone(),
            client: invoice.client_name.clone(),
            date: invoice.created_at.format("%d/%m/%Y").to_string(),
            amount: format!("{currency_symbol}{}", amount::format_amount(invoice.total)),
            paid: if invoice.paid { "Paid" } else { "Unpaid" }.to_string(),
            services,
        }
    }

    fn cells(&self) -> [&str; 6] {
        [
            &self.invoice_number,
            &self.client,
            &self.date,
            &self.amount,
            &self.paid,
            &self.services,
        ]
    }
}

/// Writes clients to a single-sheet workbook.
pub fn write_clients(clients: &[ClientModel]) -> Result<Vec<u8>> {
    let rows = clients.iter().map(|c| {
        [
            c.name.as_str(),
            c.address.as_str(),
            c.contact.as_str(),
            c.tax_id.as_deref().unwrap_or_default(),
        ]
    });
    write_sheet(CLIENT_SHEET, &CLIENT_HEADERS, rows)
}

/// Writes invoice rows to a single-sheet workbook.
pub fn write_invoices(rows: &[InvoiceExportRow]) -> Result<Vec<u8>> {
    write_sheet(INVOICE_SHEET, &INVOICE_HEADERS, rows.iter().map(InvoiceExportRow::cells))
}

fn write_sheet<'a, const N: usize>(
    sheet_name: &str,
    headers: &[&str; N],
    rows: impl Iterator<Item = [&'a str; N]>,
) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, header) in (0u16..).zip(headers) {
        worksheet.write_string_with_format(0, col, *header, &bold)?;
    }
    for (row, cells) in (1u32..).zip(rows) {
        for (col, cell) in (0u16..).zip(cells) {
            if !cell.is_empty() {
                worksheet.write_string(row, col, cell)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Reads every row of the first sheet as text, header row included.
pub fn read_rows(workbook: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut xlsx: Xlsx<_> = open_workbook_from_rs(Cursor::new(workbook))?;
    let range = xlsx
        .worksheet_range_at(0)
        .ok_or_else(|| Error::Import {
            message: "the workbook has no sheets".to_string(),
        })??;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

/// Reads clients from the first sheet of a workbook.
///
/// The first row must name the columns; `name`, `address`, `contact` and `tax_id`
/// are recognised in any order and other columns are ignored. Blank rows are
/// skipped. Rows are not validated here.
pub fn read_clients(workbook: &[u8]) -> Result<Vec<NewClient>> {
    let mut rows = read_rows(workbook)?.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };

    let column = |name: &str| {
        header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    let name_col = column("name").ok_or_else(|| Error::Import {
        message: "the first row has no 'name' column".to_string(),
    })?;
    let address_col = column("address");
    let contact_col = column("contact");
    let tax_id_col = column("tax_id");

    let cell = |row: &[String], col: Option<usize>| {
        col.and_then(|c| row.get(c)).cloned().unwrap_or_default()
    };

    Ok(rows
        .filter(|row| row.iter().any(|value| !value.is_empty()))
        .map(|row| NewClient {
            name: cell(&row, Some(name_col)),
            address: cell(&row, address_col),
            contact: cell(&row, contact_col),
            tax_id: Some(cell(&row, tax_id_col)).filter(|t| !t.trim().is_empty()),
        })
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => amount::format_amount(*f),
        Data::Int(i) => i.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_clients_round_trip_through_workbook() -> Result<()> {
        let mut globex = test_client_model(2, "Globex");
        globex.tax_id = Some("27AAACG1234A1Z5".to_string());
        let bytes = write_clients(&[test_client_model(1, "Acme"), globex])?;

        let clients = read_clients(&bytes)?;
        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].name, "Acme");
        assert_eq!(clients[0].address, "1 Mill Road");
        assert!(clients[0].tax_id.is_none());
        assert_eq!(clients[1].tax_id.as_deref(), Some("27AAACG1234A1Z5"));
        Ok(())
    }

    #[test]
    fn test_header_written_in_bold_first_row() -> Result<()> {
        let rows = read_rows(&write_clients(&[])?)?;
        assert_eq!(rows, vec![CLIENT_HEADERS.map(String::from).to_vec()]);
        Ok(())
    }

    #[test]
    fn test_formula_like_text_stays_text() -> Result<()> {
        let client = test_client_model(1, "=SUM(A1:A9)");
        let clients = read_clients(&write_clients(&[client])?)?;
        assert_eq!(clients[0].name, "=SUM(A1:A9)");
        Ok(())
    }

    #[test]
    fn test_read_clients_requires_name_column() -> Result<()> {
        let rows = [InvoiceExportRow::new(
            &test_invoice_model(1, "Acme", &["2024-25"]),
            "₹",
        )];
        let bytes = write_invoices(&rows)?;
        assert!(matches!(read_clients(&bytes).unwrap_err(), Error::Import { .. }));
        Ok(())
    }

    #[test]
    fn test_read_garbage_fails() {
        assert!(matches!(
            read_rows(b"not a workbook").unwrap_err(),
            Error::Spreadsheet { .. }
        ));
    }

    #[test]
    fn test_invoice_row_format() {
        let mut invoice = test_invoice_model(7, "Acme", &["2024-25", "2023-24"]);
        invoice.paid = true;
        let row = InvoiceExportRow::new(&invoice, "₹");

        assert_eq!(row.invoice_number, "INV-00007");
        assert_eq!(row.amount, "₹2000");
        assert_eq!(row.paid, "Paid");
        assert_eq!(
            row.services,
            "Bookkeeping (₹1000 × 1) FY:2024-25, Bookkeeping (₹1000 × 1) FY:2023-24"
        );
    }
}
