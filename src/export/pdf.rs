//! Invoice PDF rendering with `printpdf`.
//!
//! Layout runs top to bottom: business profile and invoice header, billed-to
//! block, line item table, total, bank details. The table continues on a new page
//! (with its header repeated) when the current one fills up.

use crate::{
    config::{
        AppConfig,
        app::{BankDetails, BusinessProfile},
    },
    core::amount,
    entities::{InvoiceModel, invoice::LineItem},
    errors::{Error, Result},
};
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point,
};
use std::io::BufWriter;
use tracing::debug;

const TITLE_SIZE: f32 = 20.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
const LINE_HEIGHT: f32 = 5.0;
const ROW_HEIGHT: f32 = 6.0;
const ITEM_NAME_CHARS: usize = 48;

/// Left edges of the table columns as fractions of the content width.
const COLUMNS: [(&str, f32); 5] = [
    ("Item", 0.0),
    ("Quantity", 0.50),
    ("Rate", 0.62),
    ("FY", 0.76),
    ("Amount", 0.88),
];

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Tracks the current page and the vertical write position on it.
struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: &'a Fonts,
    width: f32,
    height: f32,
    margin: f32,
    y: f32,
    pages: usize,
}

impl PageCursor<'_> {
    fn left(&self) -> f32 {
        self.margin
    }

    fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    fn text(&self, text: &str, size: f32, x: f32) {
        self.layer
            .use_text(text, size, Mm(x), Mm(self.y), &self.fonts.regular);
    }

    fn bold(&self, text: &str, size: f32, x: f32) {
        self.layer
            .use_text(text, size, Mm(x), Mm(self.y), &self.fonts.bold);
    }

    fn rule(&self) {
        let left = self.left();
        let right = self.width - self.margin;
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(left), Mm(self.y)), false),
                (Point::new(Mm(right), Mm(self.y)), false),
            ],
            is_closed: false,
        });
    }

    /// Moves down, returning `true` if that required a new page.
    fn advance(&mut self, by: f32) -> bool {
        self.y -= by;
        if self.y >= self.margin + LINE_HEIGHT {
            return false;
        }
        let (page, layer) = self
            .doc
            .add_page(Mm(self.width), Mm(self.height), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = self.height - self.margin - HEADING_SIZE / 2.0;
        self.pages += 1;
        true
    }
}

/// Renders an invoice to PDF bytes.
pub fn render_invoice(invoice: &InvoiceModel, config: &AppConfig) -> Result<Vec<u8>> {
    let (width, height) = config.pdf.page_dimensions_mm();
    let margin = config.pdf.margin_mm();
    if 2.0 * margin >= width.min(height) {
        return Err(Error::Pdf {
            message: format!("a {margin:.1}mm margin leaves no room on the page"),
        });
    }

    let (doc, page, layer) = PdfDocument::new(
        format!("Invoice {}", invoice.invoice_number),
        Mm(width),
        Mm(height),
        "Layer 1",
    );
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?,
    };
    let mut cursor = PageCursor {
        layer: doc.get_page(page).get_layer(layer),
        doc: &doc,
        fonts: &fonts,
        width,
        height,
        margin,
        y: height - margin - TITLE_SIZE / 2.0,
        pages: 1,
    };

    let currency = &config.invoice.currency_code;
    write_header(&mut cursor, invoice, &config.business);
    write_billed_to(&mut cursor, invoice);
    write_items(&mut cursor, &invoice.line_items.0, currency);
    write_total(&mut cursor, invoice.total, currency);
    if let Some(bank) = &config.bank {
        write_bank_details(&mut cursor, bank);
    }
    let pages = cursor.pages;

    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer).map_err(pdf_error)?;
    let bytes = writer.into_inner().map_err(pdf_error)?;

    debug!(
        "Rendered invoice {} ({} pages, {} bytes)",
        invoice.invoice_number,
        pages,
        bytes.len()
    );
    Ok(bytes)
}

fn write_header(cursor: &mut PageCursor<'_>, invoice: &InvoiceModel, business: &BusinessProfile) {
    let left = cursor.left();
    let right_col = left + cursor.content_width() * 0.62;
    let top = cursor.y;
    let date = invoice.created_at.format("%d/%m/%Y").to_string();

    cursor.bold("INVOICE", TITLE_SIZE, right_col);
    cursor.y -= ROW_HEIGHT + 2.0;
    cursor.bold(&invoice.invoice_number, HEADING_SIZE, right_col);
    cursor.y -= ROW_HEIGHT;
    cursor.text(&format!("Invoice date: {date}"), BODY_SIZE, right_col);
    cursor.y -= LINE_HEIGHT;
    cursor.text(&format!("Due date: {date}"), BODY_SIZE, right_col);
    let header_bottom = cursor.y;

    cursor.y = top;
    cursor.bold(&business.name, HEADING_SIZE + 2.0, left);
    cursor.y -= ROW_HEIGHT + 1.0;
    for line in &business.address_lines {
        cursor.text(line, BODY_SIZE, left);
        cursor.y -= LINE_HEIGHT;
    }
    if let Some(phone) = &business.phone {
        cursor.text(&format!("Phone: {phone}"), BODY_SIZE, left);
        cursor.y -= LINE_HEIGHT;
    }

    cursor.y = cursor.y.min(header_bottom);
    cursor.advance(LINE_HEIGHT);
    cursor.rule();
}

fn write_billed_to(cursor: &mut PageCursor<'_>, invoice: &InvoiceModel) {
    let left = cursor.left();
    cursor.advance(ROW_HEIGHT + 2.0);
    cursor.bold("Billed to", HEADING_SIZE, left);
    cursor.advance(ROW_HEIGHT);
    cursor.text(&invoice.client_name, BODY_SIZE, left);

    let details = [
        Some(invoice.client_address.as_str()),
        Some(invoice.client_contact.as_str()),
        invoice.client_tax_id.as_deref(),
    ];
    for detail in details.into_iter().flatten().filter(|d| !d.trim().is_empty()) {
        cursor.advance(LINE_HEIGHT);
        cursor.text(detail, BODY_SIZE, left);
    }
}

fn write_table_header(cursor: &PageCursor<'_>) {
    let left = cursor.left();
    let width = cursor.content_width();
    for (title, offset) in COLUMNS {
        cursor.bold(title, BODY_SIZE, left + width * offset);
    }
}

fn write_items(cursor: &mut PageCursor<'_>, items: &[LineItem], currency: &str) {
    cursor.advance(ROW_HEIGHT * 2.0);
    write_table_header(cursor);
    cursor.advance(2.0);
    cursor.rule();

    let left = cursor.left();
    let width = cursor.content_width();
    for item in items {
        if cursor.advance(ROW_HEIGHT) {
            write_table_header(cursor);
            cursor.advance(ROW_HEIGHT);
        }
        let name: String = item.name.chars().take(ITEM_NAME_CHARS).collect();
        let cells = [
            name,
            amount::format_amount(item.quantity),
            format!("{currency} {}", amount::format_amount(item.rate)),
            item.fy.clone(),
            format!("{currency} {}", amount::format_amount(item.subtotal)),
        ];
        for ((_, offset), cell) in COLUMNS.iter().zip(&cells) {
            cursor.text(cell, BODY_SIZE, left + width * offset);
        }
    }

    cursor.advance(3.0);
    cursor.rule();
}

fn write_total(cursor: &mut PageCursor<'_>, total: f64, currency: &str) {
    let x = cursor.left() + cursor.content_width() * COLUMNS[3].1;
    cursor.advance(ROW_HEIGHT + 1.0);
    cursor.bold(
        &format!("Total: {currency} {}", amount::format_amount(total)),
        HEADING_SIZE,
        x,
    );
}

fn write_bank_details(cursor: &mut PageCursor<'_>, bank: &BankDetails) {
    let left = cursor.left();
    cursor.advance(ROW_HEIGHT * 2.0);
    cursor.bold("Bank details", HEADING_SIZE, left);

    let lines = [
        Some(format!("Account name: {}", bank.account_name)),
        Some(format!("Account number: {}", bank.account_number)),
        bank.ifsc.as_ref().map(|ifsc| format!("IFSC: {ifsc}")),
        Some(format!("Bank: {}", bank.bank)),
        bank.upi.as_ref().map(|upi| format!("UPI: {upi}")),
    ];
    for line in lines.into_iter().flatten() {
        cursor.advance(LINE_HEIGHT);
        cursor.text(&line, BODY_SIZE, left);
    }
}

fn pdf_error(e: impl std::fmt::Display) -> Error {
    Error::Pdf {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        config::app::{Orientation, PageSize},
        test_utils::*,
    };

    fn config_with_bank() -> AppConfig {
        AppConfig {
            bank: Some(BankDetails {
                account_name: "Invoice Desk".to_string(),
                account_number: "000123456789".to_string(),
                ifsc: Some("HDFC0000123".to_string()),
                bank: "HDFC Bank".to_string(),
                upi: None,
            }),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_render_single_page() -> Result<()> {
        let invoice = test_invoice_model(1, "Acme", &["2024-25"]);
        let bytes = render_invoice(&invoice, &config_with_bank())?;
        assert!(bytes.starts_with(b"%PDF"));
        Ok(())
    }

    #[test]
    fn test_long_invoice_spans_pages() -> Result<()> {
        let fiscal_years: Vec<String> = (0..120).map(|i| format!("FY{i}")).collect();
        let labels: Vec<&str> = fiscal_years.iter().map(String::as_str).collect();
        let invoice = test_invoice_model(1, "Acme", &labels);

        let mut config = config_with_bank();
        config.pdf.page_size = PageSize::Letter;
        config.pdf.orientation = Orientation::Landscape;

        let bytes = render_invoice(&invoice, &config)?;
        assert!(bytes.starts_with(b"%PDF"));
        Ok(())
    }

    #[test]
    fn test_margin_too_large() {
        let mut config = AppConfig::default();
        config.pdf.margin_in = 5.0;
        let invoice = test_invoice_model(1, "Acme", &["2024-25"]);
        assert!(matches!(
            render_invoice(&invoice, &config).unwrap_err(),
            Error::Pdf { .. }
        ));
    }
}
