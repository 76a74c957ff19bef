//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions such as autocomplete
//! and confirmation buttons.

/// Autocomplete handlers for client, service, fiscal-year and invoice values
pub mod autocomplete;
/// Yes/no confirmation prompts
pub mod confirm;
