//! Invoice numbering.
//!
//! Numbers are a fixed prefix followed by a zero-padded sequence (`INV-00005`).
//! The sequence lives in the `system_state` table and is advanced inside the same
//! transaction that inserts the invoice, so two invoices can never be handed the
//! same number. The next sequence is `max(counter, invoice rows) + 1`, which keeps
//! numbering continuous for databases that already hold invoices but no counter.

use crate::{
    entities::{Invoice, SystemState, system_state},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, PaginatorTrait, Set, prelude::*};
use tracing::debug;

const SEQUENCE_KEY: &str = "invoice_sequence";

/// Prefix and zero-padded width of invoice numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    prefix: String,
    width: usize,
}

impl NumberFormat {
    /// Creates a format; a zero width is treated as one digit.
    #[must_use]
    pub fn new(prefix: impl Into<String>, width: usize) -> Self {
        Self {
            prefix: prefix.into(),
            width: width.max(1),
        }
    }

    /// Formats a sequence value, e.g. `5` → `INV-00005`.
    #[must_use]
    pub fn format(&self, sequence: u64) -> String {
        format!("{}{:0width$}", self.prefix, sequence, width = self.width)
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::new("INV-", 5)
    }
}

/// Reads the next sequence value without reserving it.
async fn next_sequence<C: ConnectionTrait>(conn: &C) -> Result<u64> {
    let stored = SystemState::find()
        .filter(system_state::Column::Key.eq(SEQUENCE_KEY))
        .one(conn)
        .await?;

    let counter = match stored {
        Some(state) => state.value.parse::<u64>().map_err(|e| Error::Config {
            message: format!("Stored invoice sequence '{}' is not a number: {e}", state.value),
        })?,
        None => 0,
    };
    let rows = Invoice::find().count(conn).await?;

    Ok(counter.max(rows) + 1)
}

/// Shows the number the next invoice will most likely receive.
///
/// This is what a freshly loaded draft displays. It is not a reservation: the real
/// number is assigned by [`reserve_next_number`] when the invoice is inserted.
pub async fn preview_next_number<C: ConnectionTrait>(
    conn: &C,
    format: &NumberFormat,
) -> Result<String> {
    Ok(format.format(next_sequence(conn).await?))
}

/// Advances the stored sequence and returns the formatted number.
///
/// Call this on the transaction that inserts the invoice so the counter only moves
/// when the insert commits.
pub async fn reserve_next_number<C: ConnectionTrait>(
    conn: &C,
    format: &NumberFormat,
) -> Result<String> {
    let next = next_sequence(conn).await?;
    let now = chrono::Utc::now().naive_utc();

    let existing = SystemState::find()
        .filter(system_state::Column::Key.eq(SEQUENCE_KEY))
        .one(conn)
        .await?;

    if let Some(state) = existing {
        let mut active: system_state::ActiveModel = state.into();
        active.value = Set(next.to_string());
        active.updated_at = Set(now);
        active.update(conn).await?;
    } else {
        system_state::ActiveModel {
            key: Set(SEQUENCE_KEY.to_string()),
            value: Set(next.to_string()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;
    }

    let number = format.format(next);
    debug!("Reserved invoice number {number}");
    Ok(number)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_format_pads_to_width() {
        let format = NumberFormat::default();
        assert_eq!(format.format(5), "INV-00005");
        assert_eq!(format.format(12345), "INV-12345");
        // Wider values are never truncated
        assert_eq!(format.format(123_456), "INV-123456");
    }

    #[test]
    fn test_zero_width_is_one_digit() {
        assert_eq!(NumberFormat::new("N", 0).format(7), "N7");
    }

    #[tokio::test]
    async fn test_preview_on_empty_database() -> Result<()> {
        let db = setup_test_db().await?;
        assert_eq!(
            preview_next_number(&db, &NumberFormat::default()).await?,
            "INV-00001"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_preview_after_four_invoices() -> Result<()> {
        let db = setup_test_db().await?;
        for _ in 0..4 {
            create_test_invoice(&db, "Acme", "2024-25").await?;
        }

        assert_eq!(
            preview_next_number(&db, &NumberFormat::default()).await?,
            "INV-00005"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_preview_does_not_reserve() -> Result<()> {
        let db = setup_test_db().await?;
        let format = NumberFormat::default();

        assert_eq!(preview_next_number(&db, &format).await?, "INV-00001");
        assert_eq!(preview_next_number(&db, &format).await?, "INV-00001");
        assert_eq!(reserve_next_number(&db, &format).await?, "INV-00001");
        assert_eq!(reserve_next_number(&db, &format).await?, "INV-00002");
        assert_eq!(preview_next_number(&db, &format).await?, "INV-00003");
        Ok(())
    }

    #[tokio::test]
    async fn test_counter_never_moves_backwards_after_rows_disappear() -> Result<()> {
        let db = setup_test_db().await?;
        let format = NumberFormat::default();
        let first = create_test_invoice(&db, "Acme", "2024-25").await?;
        create_test_invoice(&db, "Acme", "2024-25").await?;

        Invoice::delete_by_id(first.id).exec(&db).await?;

        // One row left, but the counter remembers two numbers were issued
        assert_eq!(preview_next_number(&db, &format).await?, "INV-00003");
        Ok(())
    }
}
