use thiserror::Error;

/// Every failure the invoicing system can surface to a user.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The store rejected an operation; carries the store's raw message
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A required field was missing or malformed
    #[error("Validation error: {message}")]
    Validation {
        /// Which field failed and why
        message: String,
    },

    /// A service rate did not parse as a finite, non-negative number
    #[error("Invalid rate: '{value}' is not a valid non-negative number")]
    InvalidRate {
        /// The text that was rejected
        value: String,
    },

    #[error("Client not found: {name}")]
    #[allow(missing_docs)]
    ClientNotFound { name: String },

    #[error("Service not found: {name}")]
    #[allow(missing_docs)]
    ServiceNotFound { name: String },

    #[error("Invoice not found: {number}")]
    #[allow(missing_docs)]
    InvoiceNotFound { number: String },

    /// The one-way paid transition was attempted twice
    #[error("Invoice {number} is already marked as paid and cannot be changed")]
    AlreadyPaid {
        /// Invoice number of the already-paid invoice
        number: String,
    },

    /// A line-item index outside the draft's list
    #[error("Line item {index} does not exist (draft has {len} line items)")]
    LineItemOutOfRange {
        /// 1-based index requested
        index: usize,
        /// Number of line items in the draft
        len: usize,
    },

    /// A bulk import failed; nothing was inserted
    #[error("Import failed: {message}")]
    Import {
        /// First problem found in the batch
        message: String,
    },

    /// The spreadsheet codec failed
    #[error("Spreadsheet error: {message}")]
    Spreadsheet {
        /// Codec error text
        message: String,
    },

    /// The PDF renderer failed
    #[error("PDF rendering error: {message}")]
    Pdf {
        /// Renderer error text
        message: String,
    },

    #[error("I/O error: {0}")]
    #[allow(missing_docs)]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    #[allow(missing_docs)]
    EnvVar(#[from] std::env::VarError),

    /// Serenity/Poise failures while talking to Discord
    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(value: rust_xlsxwriter::XlsxError) -> Self {
        Self::Spreadsheet {
            message: value.to_string(),
        }
    }
}

impl From<calamine::XlsxError> for Error {
    fn from(value: calamine::XlsxError) -> Self {
        Self::Spreadsheet {
            message: value.to_string(),
        }
    }
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
