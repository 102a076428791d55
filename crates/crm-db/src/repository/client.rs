//! # Client Repository
//!
//! Database operations for clients.
//!
//! A client cannot be deleted while it owns customers: the schema declares
//! `customer.client_id` with `ON DELETE RESTRICT`, and [`ClientRepository::delete`]
//! surfaces the rejection as `DbError::ConstraintViolation`.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crm_core::{Client, EntityId};

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Inserts a new active client.
    ///
    /// ## Returns
    /// The stored row, including the engine-assigned id and timestamps.
    pub async fn insert(&self, name: &str) -> DbResult<Client> {
        debug!(name = %name, "Inserting client");

        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO client (name, active)
            VALUES (?1, 1)
            RETURNING id, name, active, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(client)
    }

    /// Gets a client by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Client))` - Client found
    /// * `Ok(None)` - Client not found
    pub async fn get_by_id(&self, id: EntityId) -> DbResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, active, created_at, updated_at
            FROM client
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    /// Lists every client ordered by id.
    pub async fn list_all(&self) -> DbResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, active, created_at, updated_at
            FROM client
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    /// Writes every non-key column of `client`.
    ///
    /// ## Returns
    /// * `Ok(1)` - Row updated (`updated_at` is refreshed by trigger)
    /// * `Err(DbError::NotFound)` - No row with this id
    pub async fn save(&self, client: &Client) -> DbResult<u64> {
        debug!(id = client.id, "Saving client");

        let result = sqlx::query(
            r#"
            UPDATE client SET
                name = ?2,
                active = ?3
            WHERE id = ?1
            "#,
        )
        .bind(client.id)
        .bind(&client.name)
        .bind(client.active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", client.id));
        }

        Ok(result.rows_affected())
    }

    /// Deletes a client by id.
    ///
    /// ## Returns
    /// * `Ok(n)` - Rows deleted (0 when the id no longer exists)
    /// * `Err(DbError::ConstraintViolation)` - Client still owns customers
    pub async fn delete(&self, id: EntityId) -> DbResult<u64> {
        debug!(id = id, "Deleting client");

        let result = sqlx::query("DELETE FROM client WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).on_delete("Client", Some(id)))?;

        Ok(result.rows_affected())
    }

    /// Deletes every client. Blocked while any customer exists.
    pub async fn delete_all(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM client")
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).on_delete("Client", None))?;

        Ok(result.rows_affected())
    }

    /// Counts clients (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM client")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.clients();

        let inserted = repo.insert("Los Angeles Lakers").await.unwrap();
        assert!(inserted.active);

        let loaded = repo.get_by_id(inserted.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Los Angeles Lakers");
        assert_eq!(loaded.created_at, inserted.created_at);
    }

    #[tokio::test]
    async fn test_save_missing_client() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.clients();

        let mut client = repo.insert("Boston Celtics").await.unwrap();
        repo.delete(client.id).await.unwrap();

        client.name = "Evil Empire".to_string();
        let err = repo.save(&client).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_missing_client_is_zero_rows() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert_eq!(db.clients().delete(42).await.unwrap(), 0);
        assert_eq!(db.clients().count().await.unwrap(), 0);
    }
}
