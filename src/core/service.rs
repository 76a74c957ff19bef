//! Service catalog business logic.
//!
//! Services are named entries with a default rate. The composer looks them up by
//! exact case-insensitive name to pre-fill line item rates, and creates missing ones
//! when an invoice bills a service the catalog has never seen.

use crate::{
    core::amount,
    entities::{Service, service},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, instrument};

/// Retrieves all services in insertion order.
pub async fn get_all_services(db: &DatabaseConnection) -> Result<Vec<service::Model>> {
    Service::find()
        .order_by_asc(service::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific service by its unique ID.
pub async fn get_service_by_id(
    db: &DatabaseConnection,
    service_id: i64,
) -> Result<Option<service::Model>> {
    Service::find_by_id(service_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new catalog service.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or whitespace-only
/// - The rate is negative or not finite (NaN, infinity)
/// - The database insert operation fails
#[instrument(skip(db))]
pub async fn create_service(
    db: &DatabaseConnection,
    name: String,
    default_rate: f64,
) -> Result<service::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("Service name cannot be empty"));
    }
    let default_rate = amount::validate_rate(default_rate)?;

    let model = service::ActiveModel {
        name: Set(name.trim().to_string()),
        default_rate: Set(default_rate),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    debug!("Created service {} ({})", model.name, model.id);
    Ok(model)
}

/// Replaces the name and rate of an existing service.
///
/// # Errors
/// Returns [`Error::ServiceNotFound`] if no service has the record's id.
#[instrument(skip(db, updated), fields(service_id = updated.id))]
pub async fn update_service(
    db: &DatabaseConnection,
    updated: service::Model,
) -> Result<service::Model> {
    let mut service: service::ActiveModel = get_service_by_id(db, updated.id)
        .await?
        .ok_or_else(|| Error::ServiceNotFound {
            name: updated.id.to_string(),
        })?
        .into();

    service.name = Set(updated.name);
    service.default_rate = Set(updated.default_rate);

    service.update(db).await.map_err(Into::into)
}

/// Permanently deletes a service. Saved invoices keep their line items.
#[instrument(skip(db))]
pub async fn delete_service(db: &DatabaseConnection, service_id: i64) -> Result<()> {
    let result = Service::delete_by_id(service_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::ServiceNotFound {
            name: service_id.to_string(),
        });
    }
    Ok(())
}

/// The service whose name equals `name`, ignoring case. Partial names never match.
#[must_use]
pub fn find_service_by_name<'a>(
    services: &'a [service::Model],
    name: &str,
) -> Option<&'a service::Model> {
    let name_lower = name.trim().to_lowercase();
    services
        .iter()
        .find(|s| s.name.to_lowercase() == name_lower)
}
