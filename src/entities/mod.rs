//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables; each has a Model struct for data
//! and an Entity struct for operations.

pub mod client;
pub mod invoice;
pub mod service;
pub mod system_state;

// Re-export specific types to avoid conflicts
pub use client::{Column as ClientColumn, Entity as Client, Model as ClientModel};
pub use invoice::{Column as InvoiceColumn, Entity as Invoice, Model as InvoiceModel};
pub use service::{Column as ServiceColumn, Entity as Service, Model as ServiceModel};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
