//! Per-user interactive state for the three screens of the app.
//!
//! Each state is a plain value. Pure transitions consume the state and return the
//! next one; transitions that touch the store borrow it and return a new state, so
//! a failed call leaves the caller's copy untouched.

pub mod browser;
pub mod catalog;
pub mod composer;

pub use browser::InvoiceBrowser;
pub use catalog::Catalog;
pub use composer::InvoiceDraft;
