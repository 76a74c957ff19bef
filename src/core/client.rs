//! Client business logic - Handles all client-related operations.
//!
//! This module provides functions for creating, retrieving, updating and deleting
//! clients, plus the name matching used by the invoice composer: prefix matching for
//! suggestions and exact case-insensitive matching to decide whether a typed client
//! already exists.

use crate::{
    entities::{Client, client},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Fields needed to create a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub tax_id: Option<String>,
}

impl NewClient {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Client name cannot be empty"));
        }
        Ok(())
    }

    fn into_active_model(self, now: DateTimeUtc) -> client::ActiveModel {
        client::ActiveModel {
            name: Set(self.name.trim().to_string()),
            address: Set(self.address),
            contact: Set(self.contact),
            tax_id: Set(self.tax_id.filter(|t| !t.trim().is_empty())),
            created_at: Set(now),
            ..Default::default()
        }
    }
}

/// Retrieves all clients in insertion order.
pub async fn get_all_clients(db: &DatabaseConnection) -> Result<Vec<client::Model>> {
    Client::find()
        .order_by_asc(client::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific client by its unique ID.
pub async fn get_client_by_id(
    db: &DatabaseConnection,
    client_id: i64,
) -> Result<Option<client::Model>> {
    Client::find_by_id(client_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new client.
///
/// # Errors
/// Returns an error if:
/// - The client name is empty or whitespace-only
/// - The database insert operation fails
#[instrument(skip(db))]
pub async fn create_client(db: &DatabaseConnection, new_client: NewClient) -> Result<client::Model> {
    new_client.validate()?;
    let model = new_client
        .into_active_model(chrono::Utc::now())
        .insert(db)
        .await?;
    debug!("Created client {} ({})", model.name, model.id);
    Ok(model)
}

/// Creates many clients at once. Either every client is inserted or none is.
///
/// Rows are validated before the transaction starts; the first invalid row fails the
/// whole batch with its 1-based row number in the message.
#[instrument(skip(db, new_clients), fields(count = new_clients.len()))]
pub async fn create_clients(
    db: &DatabaseConnection,
    new_clients: Vec<NewClient>,
) -> Result<Vec<client::Model>> {
    for (index, new_client) in new_clients.iter().enumerate() {
        new_client.validate().map_err(|e| Error::Import {
            message: format!("row {}: {e}", index + 1),
        })?;
    }

    let txn = db.begin().await?;
    let now = chrono::Utc::now();
    let mut created = Vec::with_capacity(new_clients.len());
    for new_client in new_clients {
        created.push(new_client.into_active_model(now).insert(&txn).await?);
    }
    txn.commit().await?;

    debug!("Imported {} clients", created.len());
    Ok(created)
}

/// Replaces every editable field of an existing client with the given record.
///
/// No validation happens beyond what the database itself enforces.
///
/// # Errors
/// Returns [`Error::ClientNotFound`] if no client has the record's id.
#[instrument(skip(db, updated), fields(client_id = updated.id))]
pub async fn update_client(db: &DatabaseConnection, updated: client::Model) -> Result<client::Model> {
    let mut client: client::ActiveModel = get_client_by_id(db, updated.id)
        .await?
        .ok_or_else(|| Error::ClientNotFound {
            name: updated.id.to_string(),
        })?
        .into();

    client.name = Set(updated.name);
    client.address = Set(updated.address);
    client.contact = Set(updated.contact);
    client.tax_id = Set(updated.tax_id);

    client.update(db).await.map_err(Into::into)
}

/// Permanently deletes a client. Saved invoices keep their copy of the client.
///
/// # Errors
/// Returns [`Error::ClientNotFound`] if no row was deleted.
#[instrument(skip(db))]
pub async fn delete_client(db: &DatabaseConnection, client_id: i64) -> Result<()> {
    let result = Client::delete_by_id(client_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::ClientNotFound {
            name: client_id.to_string(),
        });
    }
    Ok(())
}

/// Clients whose name starts with `typed`, ignoring case.
///
/// An empty `typed` matches every client.
#[must_use]
pub fn suggest_clients<'a>(clients: &'a [client::Model], typed: &str) -> Vec<&'a client::Model> {
    let typed_lower = typed.to_lowercase();
    clients
        .iter()
        .filter(|c| c.name.to_lowercase().starts_with(&typed_lower))
        .collect()
}

/// The client whose name equals `name`, ignoring case.
#[must_use]
pub fn find_client_by_name<'a>(
    clients: &'a [client::Model],
    name: &str,
) -> Option<&'a client::Model> {
    let name_lower = name.trim().to_lowercase();
    clients
        .iter()
        .find(|c| c.name.to_lowercase() == name_lower)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_client_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_client(&db, NewClient::default()).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = create_client(
            &db,
            NewClient {
                name: "   ".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_client_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let client = create_client(
            &db,
            NewClient {
                name: "  Acme Corp ".to_string(),
                address: "12 Mill Road".to_string(),
                contact: "acme@example.com".to_string(),
                tax_id: Some(String::new()),
            },
        )
        .await?;

        assert_eq!(client.name, "Acme Corp");
        assert_eq!(client.address, "12 Mill Road");
        assert!(client.tax_id.is_none());
        assert_eq!(get_client_by_id(&db, client.id).await?, Some(client));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_clients_all_or_nothing() -> Result<()> {
        let db = setup_test_db().await?;

        let batch = vec![
            new_test_client("Acme"),
            new_test_client(""),
            new_test_client("Globex"),
        ];
        let result = create_clients(&db, batch).await;
        match result {
            Err(Error::Import { message }) => assert!(message.starts_with("row 2")),
            other => panic!("expected import error, got {other:?}"),
        }
        assert!(get_all_clients(&db).await?.is_empty());

        let created = create_clients(&db, vec![new_test_client("Acme"), new_test_client("Globex")])
            .await?;
        assert_eq!(created.len(), 2);
        assert_eq!(get_all_clients(&db).await?, created);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_client_replaces_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "Acme").await?;

        let mut edited = client.clone();
        edited.address = "99 New Street".to_string();
        edited.tax_id = Some("27AAACA1234A1Z5".to_string());
        let updated = update_client(&db, edited).await?;

        assert_eq!(updated.id, client.id);
        assert_eq!(updated.address, "99 New Street");
        assert_eq!(updated.created_at, client.created_at);
        assert_eq!(get_client_by_id(&db, client.id).await?, Some(updated));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_client() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "Acme").await?;
        delete_client(&db, client.id).await?;

        let result = update_client(&db, client).await;
        assert!(matches!(result.unwrap_err(), Error::ClientNotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_client() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "Acme").await?;

        delete_client(&db, client.id).await?;
        assert!(get_client_by_id(&db, client.id).await?.is_none());

        let again = delete_client(&db, client.id).await;
        assert!(matches!(again.unwrap_err(), Error::ClientNotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_deleting_client_keeps_invoice_snapshot() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "Acme").await?;
        let invoice = create_test_invoice(&db, "Acme", "2024-25").await?;

        delete_client(&db, client.id).await?;

        let invoices = crate::core::invoice::get_all_invoices(&db).await?;
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].client_name, invoice.client_name);
        assert_eq!(invoices[0].client_address, invoice.client_address);
        assert_eq!(invoices[0].client_contact, invoice.client_contact);
        Ok(())
    }

    #[test]
    fn test_suggest_clients_prefix_case_insensitive() {
        let clients = vec![test_client_model(1, "Acme"), test_client_model(2, "Globex")];

        let suggestions = suggest_clients(&clients, "ac");
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].name, "Acme");

        assert!(suggest_clients(&clients, "zz").is_empty());
        // Prefix only, not substring
        assert!(suggest_clients(&clients, "cme").is_empty());
        assert_eq!(suggest_clients(&clients, "").len(), 2);
    }

    #[test]
    fn test_find_client_by_name_exact_only() {
        let clients = vec![test_client_model(1, "Acme"), test_client_model(2, "Acme Labs")];

        assert_eq!(find_client_by_name(&clients, "ACME").unwrap().id, 1);
        assert_eq!(find_client_by_name(&clients, "acme labs ").unwrap().id, 2);
        assert!(find_client_by_name(&clients, "Acm").is_none());
    }
}
