//! Core business logic - framework-agnostic client, service and invoice operations.
//!
//! Functions here talk to the database through `SeaORM` and know nothing about
//! Discord or sessions; the bot and session layers are built on top of them.

/// Client CRUD and name matching
pub mod client;
/// Invoice persistence, paid transition and filtering
pub mod invoice;
/// Parsing of free-text amounts typed into forms
pub mod amount;
/// Invoice number formatting and the store-side sequence
pub mod numbering;
/// Service catalog CRUD and name matching
pub mod service;
