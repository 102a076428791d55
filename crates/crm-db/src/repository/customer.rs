//! # Customer Repository
//!
//! Database operations for customers.
//!
//! ## Referential Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  customer.client_id ──► client.id        ON DELETE RESTRICT            │
//! │  customer_product.customer_id ──► id     ON DELETE CASCADE             │
//! │                                                                         │
//! │  insert with unknown client  → DbError::ForeignKeyViolation            │
//! │  delete customer             → its links are removed by the engine     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crm_core::{Customer, EntityId};

/// Fields of a customer that does not exist yet.
#[derive(Debug, Clone, Copy)]
pub struct NewCustomer<'a> {
    pub code: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email_address: &'a str,
    pub client_id: EntityId,
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a new customer.
    ///
    /// ## Returns
    /// * `Ok(Customer)` - Stored row with engine-assigned id
    /// * `Err(DbError::ForeignKeyViolation)` - `client_id` does not exist
    pub async fn insert(&self, customer: NewCustomer<'_>) -> DbResult<Customer> {
        debug!(
            code = %customer.code,
            client_id = customer.client_id,
            "Inserting customer"
        );

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customer (code, first_name, last_name, email_address, client_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, code, first_name, last_name, email_address, client_id,
                      created_at, updated_at
            "#,
        )
        .bind(customer.code)
        .bind(customer.first_name)
        .bind(customer.last_name)
        .bind(customer.email_address)
        .bind(customer.client_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by its ID.
    pub async fn get_by_id(&self, id: EntityId) -> DbResult<Option<Customer>> {
        Self::get_by_id_in(&self.pool, id).await
    }

    /// Gets a customer by its ID using the given executor.
    pub async fn get_by_id_in<'e>(
        executor: impl SqliteExecutor<'e>,
        id: EntityId,
    ) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, code, first_name, last_name, email_address, client_id,
                   created_at, updated_at
            FROM customer
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(customer)
    }

    /// Lists every customer ordered by id.
    pub async fn list_all(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, code, first_name, last_name, email_address, client_id,
                   created_at, updated_at
            FROM customer
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Writes every non-key column of `customer`.
    pub async fn save(&self, customer: &Customer) -> DbResult<u64> {
        Self::save_in(&self.pool, customer).await
    }

    /// Writes every non-key column of `customer` using the given executor.
    ///
    /// ## Returns
    /// * `Ok(1)` - Row updated
    /// * `Err(DbError::NotFound)` - No row with this id
    /// * `Err(DbError::ForeignKeyViolation)` - `client_id` does not exist
    pub async fn save_in<'e>(
        executor: impl SqliteExecutor<'e>,
        customer: &Customer,
    ) -> DbResult<u64> {
        debug!(id = customer.id, "Saving customer");

        let result = sqlx::query(
            r#"
            UPDATE customer SET
                code = ?2,
                first_name = ?3,
                last_name = ?4,
                email_address = ?5,
                client_id = ?6
            WHERE id = ?1
            "#,
        )
        .bind(customer.id)
        .bind(&customer.code)
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.email_address)
        .bind(customer.client_id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", customer.id));
        }

        Ok(result.rows_affected())
    }

    /// Deletes a customer by id; the engine cascades its product links.
    pub async fn delete(&self, id: EntityId) -> DbResult<u64> {
        debug!(id = id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customer WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).on_delete("Customer", Some(id)))?;

        Ok(result.rows_affected())
    }

    /// Deletes every customer and, by cascade, every product link.
    pub async fn delete_all(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM customer")
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).on_delete("Customer", None))?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
