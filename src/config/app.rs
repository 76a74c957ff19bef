//! Application configuration loading from config.toml
//!
//! The business profile printed on every invoice, the invoice numbering format and
//! the PDF page setup all come from a TOML file. Every section has defaults, so a
//! partial (or missing) file still yields a usable configuration.

use crate::core::numbering::NumberFormat;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "INVOICE_DESK_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Issuer details shown in the invoice header
    pub business: BusinessProfile,
    /// Bank details shown in the invoice footer
    pub bank: Option<BankDetails>,
    /// Numbering and currency settings
    pub invoice: InvoiceSettings,
    /// PDF page setup
    pub pdf: PdfSettings,
}

/// The business issuing the invoices
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BusinessProfile {
    /// Trading name
    pub name: String,
    /// Address, one entry per printed line
    pub address_lines: Vec<String>,
    /// Phone number printed under the address
    pub phone: Option<String>,
}

impl Default for BusinessProfile {
    fn default() -> Self {
        Self {
            name: "Invoice Desk".to_string(),
            address_lines: Vec::new(),
            phone: None,
        }
    }
}

/// Where clients should send payment
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BankDetails {
    pub account_name: String,
    pub account_number: String,
    pub ifsc: Option<String>,
    pub bank: String,
    pub upi: Option<String>,
}

/// Invoice numbering and currency display
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InvoiceSettings {
    /// Text placed before the sequence number
    pub prefix: String,
    /// Zero-padded width of the sequence number
    pub number_width: usize,
    /// Symbol used in spreadsheets and chat replies
    pub currency_symbol: String,
    /// Code used in PDFs, whose builtin fonts cannot draw every symbol
    pub currency_code: String,
}

impl Default for InvoiceSettings {
    fn default() -> Self {
        Self {
            prefix: "INV-".to_string(),
            number_width: 5,
            currency_symbol: "₹".to_string(),
            currency_code: "INR".to_string(),
        }
    }
}

impl InvoiceSettings {
    /// The numbering format described by these settings.
    #[must_use]
    pub fn number_format(&self) -> NumberFormat {
        NumberFormat::new(self.prefix.clone(), self.number_width)
    }
}

/// Supported page sizes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

/// Page orientation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// PDF page setup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PdfSettings {
    /// Margin on every side, in inches
    pub margin_in: f32,
    pub page_size: PageSize,
    pub orientation: Orientation,
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            margin_in: 0.3,
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
        }
    }
}

impl PdfSettings {
    /// Page width and height in millimetres, after applying orientation.
    #[must_use]
    pub fn page_dimensions_mm(&self) -> (f32, f32) {
        let (width, height) = match self.page_size {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
        };
        match self.orientation {
            Orientation::Portrait => (width, height),
            Orientation::Landscape => (height, width),
        }
    }

    /// Margin in millimetres.
    #[must_use]
    pub fn margin_mm(&self) -> f32 {
        self.margin_in * 25.4
    }
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if config.invoice.number_width == 0 {
        return Err(Error::Config {
            message: "invoice.number_width must be at least 1".to_string(),
        });
    }
    if !config.pdf.margin_in.is_finite() || config.pdf.margin_in < 0.0 {
        return Err(Error::Config {
            message: format!("pdf.margin_in must be non-negative, got {}", config.pdf.margin_in),
        });
    }
    Ok(config)
}

/// Loads the application configuration from `$INVOICE_DESK_CONFIG` or `./config.toml`.
///
/// A missing file is not an error: defaults are used and a warning is logged.
/// A file that exists but does not parse is an error.
pub fn load_app_config() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());
    debug!("Loading configuration from {path}");

    if Path::new(&path).exists() {
        load_config(&path)
    } else {
        warn!("Config file {path} not found, using defaults");
        Ok(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [business]
            name = "Taneja & Company"
            address_lines = ["Office 14, 2nd Floor", "Pune - 411018"]
            phone = "+91 82085 88950"

            [bank]
            account_name = "L. Taneja"
            account_number = "8045585339"
            ifsc = "KKBK0002049"
            bank = "Kotak Mahindra Bank"

            [invoice]
            prefix = "TC/"
            number_width = 4

            [pdf]
            margin_in = 0.5
            page_size = "letter"
            orientation = "landscape"
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.business.name, "Taneja & Company");
        assert_eq!(config.business.address_lines.len(), 2);
        assert_eq!(config.bank.as_ref().unwrap().ifsc.as_deref(), Some("KKBK0002049"));
        assert!(config.bank.unwrap().upi.is_none());
        assert_eq!(config.invoice.prefix, "TC/");
        assert_eq!(config.invoice.number_width, 4);
        // Unspecified keys inside a section keep their defaults
        assert_eq!(config.invoice.currency_code, "INR");
        assert_eq!(config.pdf.page_size, PageSize::Letter);
        assert_eq!(config.pdf.page_dimensions_mm(), (279.4, 215.9));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.invoice.prefix, "INV-");
        assert_eq!(config.invoice.number_width, 5);
        assert_eq!(config.pdf.margin_in, 0.3);
        assert_eq!(config.pdf.page_dimensions_mm(), (210.0, 297.0));
        assert!(config.bank.is_none());
    }

    #[test]
    fn test_zero_width_rejected() {
        let result = parse_config("[invoice]\nnumber_width = 0\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = parse_config("[invoice\nprefix = ");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/nonexistent/invoice-desk.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
