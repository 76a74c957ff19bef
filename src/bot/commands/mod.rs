//! Discord command implementations organized by screen.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Client catalog commands
pub mod client;

/// General utility commands
pub mod general;

/// Invoice composer commands
pub mod invoice;

/// Invoice browser commands
pub mod invoices;

/// Service catalog commands
pub mod service;

// Export commands
pub use client::*;
pub use general::*;
pub use invoice::*;
pub use invoices::*;
pub use service::*;
