//! # Product Repository
//!
//! Database operations for products.
//!
//! A product that is still linked to a customer cannot be deleted
//! (`customer_product.product_id` has no delete action). Delete the
//! customers first; their links go with them.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crm_core::{EntityId, Product};

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new active product.
    pub async fn insert(&self, name: &str) -> DbResult<Product> {
        debug!(name = %name, "Inserting product");

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO product (name, active)
            VALUES (?1, 1)
            RETURNING id, name, active, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: EntityId) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, active, created_at, updated_at
            FROM product
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists every product ordered by id.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, active, created_at, updated_at
            FROM product
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Writes every non-key column of `product`.
    ///
    /// ## Returns
    /// * `Ok(1)` - Row updated
    /// * `Err(DbError::NotFound)` - No row with this id
    pub async fn save(&self, product: &Product) -> DbResult<u64> {
        debug!(id = product.id, "Saving product");

        let result = sqlx::query(
            r#"
            UPDATE product SET
                name = ?2,
                active = ?3
            WHERE id = ?1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product.id));
        }

        Ok(result.rows_affected())
    }

    /// Deletes a product by id.
    ///
    /// ## Returns
    /// * `Ok(n)` - Rows deleted (0 when the id no longer exists)
    /// * `Err(DbError::ConstraintViolation)` - Product is still linked
    pub async fn delete(&self, id: EntityId) -> DbResult<u64> {
        debug!(id = id, "Deleting product");

        let result = sqlx::query("DELETE FROM product WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).on_delete("Product", Some(id)))?;

        Ok(result.rows_affected())
    }

    /// Deletes every product. Blocked while any link exists.
    pub async fn delete_all(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM product")
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).on_delete("Product", None))?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_rename_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let mut product = repo.insert("Watching Some Other Stuff").await.unwrap();
        product.name = "Stupendous Cyber Monitoring".to_string();
        repo.save(&product).await.unwrap();

        let names: Vec<String> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Stupendous Cyber Monitoring".to_string()]);
    }
}
