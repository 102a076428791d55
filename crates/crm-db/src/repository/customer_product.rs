//! # Customer/Product Link Repository
//!
//! Links are never created on their own: the only writer is the
//! transactional "update email and link to product" operation, which calls
//! [`CustomerProductRepository::insert_in`] with its open transaction.

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crm_core::{CustomerProduct, EntityId};

/// Repository for customer/product links.
#[derive(Debug, Clone)]
pub struct CustomerProductRepository {
    pool: SqlitePool,
}

impl CustomerProductRepository {
    /// Creates a new CustomerProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerProductRepository { pool }
    }

    /// Inserts a link using the given executor.
    ///
    /// ## Returns
    /// * `Ok(CustomerProduct)` - Stored link
    /// * `Err(DbError::ForeignKeyViolation)` - Customer or product missing
    /// * `Err(DbError::UniqueViolation)` - Already linked
    pub async fn insert_in<'e>(
        executor: impl SqliteExecutor<'e>,
        customer_id: EntityId,
        product_id: EntityId,
    ) -> DbResult<CustomerProduct> {
        debug!(customer_id, product_id, "Linking customer to product");

        let link = sqlx::query_as::<_, CustomerProduct>(
            r#"
            INSERT INTO customer_product (customer_id, product_id)
            VALUES (?1, ?2)
            RETURNING id, customer_id, product_id
            "#,
        )
        .bind(customer_id)
        .bind(product_id)
        .fetch_one(executor)
        .await?;

        Ok(link)
    }

    /// Lists every link ordered by id.
    pub async fn list_all(&self) -> DbResult<Vec<CustomerProduct>> {
        let links = sqlx::query_as::<_, CustomerProduct>(
            "SELECT id, customer_id, product_id FROM customer_product ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    /// Lists the links of one customer ordered by id.
    pub async fn list_for_customer(&self, customer_id: EntityId) -> DbResult<Vec<CustomerProduct>> {
        let links = sqlx::query_as::<_, CustomerProduct>(
            r#"
            SELECT id, customer_id, product_id
            FROM customer_product
            WHERE customer_id = ?1
            ORDER BY id
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    /// Counts links (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customer_product")
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
    use super::*;
    use crate::repository::customer::NewCustomer;
    use crate::{Database, DbConfig, DbError};

    #[tokio::test]
    async fn test_duplicate_link_is_unique_violation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client = db.clients().insert("Los Angeles Lakers").await.unwrap();
        let customer = db
            .customers()
            .insert(NewCustomer {
                code: "567",
                first_name: "Jerry",
                last_name: "West",
                email_address: "jwest@lakers.com",
                client_id: client.id,
            })
            .await
            .unwrap();
        let product = db.products().insert("Fantastic Identity Monitoring").await.unwrap();

        CustomerProductRepository::insert_in(db.pool(), customer.id, product.id)
            .await
            .unwrap();
        let err = CustomerProductRepository::insert_in(db.pool(), customer.id, product.id)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(db.customer_products().count().await.unwrap(), 1);
        assert_eq!(
            db.customer_products()
                .list_for_customer(customer.id)
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
