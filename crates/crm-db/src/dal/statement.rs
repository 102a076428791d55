//! Direct-statement backend.
//!
//! Every operation is one parameterized statement against the pool, except
//! the compound email/link update (one transaction) and `list_state` (one
//! read transaction so the four result sets describe the same moment).

use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{FromRow, Sqlite, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info};

use super::{begin_failed, log_affected, rollback, BackendKind, DataAccess};
use crate::error::{DbError, DbResult};
use crm_core::validation::split_full_name;
use crm_core::{
    Client, Customer, CustomerProduct, CustomerProductRow, CustomerRow, DatabaseState, EntityId,
    Product,
};

/// [`DataAccess`] over hand-written SQL.
#[derive(Debug, Clone)]
pub struct StatementBackend {
    pool: SqlitePool,
}

impl StatementBackend {
    pub fn new(pool: SqlitePool) -> Self {
        StatementBackend { pool }
    }

    /// Runs a single-row update; zero affected rows means the id is gone.
    async fn execute_update<'q>(
        &self,
        operation: &str,
        entity: &str,
        id: EntityId,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> DbResult<u64> {
        let rows = query.execute(&self.pool).await?.rows_affected();
        log_affected(operation, rows);

        if rows == 0 {
            return Err(DbError::not_found(entity, id));
        }
        Ok(rows)
    }

    /// Runs a delete; foreign key failures become `ConstraintViolation`.
    async fn execute_delete(
        &self,
        operation: &str,
        entity: &str,
        id: Option<EntityId>,
        sql: &str,
    ) -> DbResult<u64> {
        let mut query = sqlx::query(sql);
        if let Some(id) = id {
            query = query.bind(id);
        }

        let rows = query
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).on_delete(entity, id))?
            .rows_affected();
        log_affected(operation, rows);
        Ok(rows)
    }
}

/// Customer joined with its client name, before links are attached.
#[derive(Debug, FromRow)]
struct CustomerJoin {
    id: EntityId,
    code: String,
    first_name: String,
    last_name: String,
    email_address: String,
    client_name: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, FromRow)]
struct LinkedProduct {
    customer_id: EntityId,
    product_name: String,
}

#[async_trait]
impl DataAccess for StatementBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Statement
    }

    async fn insert_client(&self, name: &str) -> DbResult<Client> {
        info!(name = %name, "Insert client");

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

    async fn insert_customer(
        &self,
        code: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
        client: &Client,
    ) -> DbResult<Customer> {
        info!(
            first_name = %first_name,
            last_name = %last_name,
            client_id = client.id,
            "Insert customer"
        );

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customer (code, first_name, last_name, email_address, client_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, code, first_name, last_name, email_address, client_id,
                      created_at, updated_at
            "#,
        )
        .bind(code)
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(client.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn insert_product(&self, name: &str) -> DbResult<Product> {
        info!(name = %name, "Insert product");

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

    async fn list_clients(&self) -> DbResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            "SELECT id, name, active, created_at, updated_at FROM client ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(clients)
    }

    async fn list_customers(&self) -> DbResult<Vec<Customer>> {
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

    async fn list_products(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, active, created_at, updated_at FROM product ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn update_customer_name(
        &self,
        customer: &Customer,
        new_full_name: &str,
    ) -> DbResult<u64> {
        info!(id = customer.id, new_full_name = %new_full_name, "Update customer name");
        let (first_name, last_name) = split_full_name(new_full_name)?;

        let query = sqlx::query(
            r#"
            UPDATE customer
            SET first_name = ?2
              , last_name = ?3
            WHERE id = ?1
            "#,
        )
        .bind(customer.id)
        .bind(first_name)
        .bind(last_name);

        self.execute_update("Update customer name", "Customer", customer.id, query)
            .await
    }

    async fn update_product_name(&self, product: &Product, new_name: &str) -> DbResult<u64> {
        info!(id = product.id, new_name = %new_name, "Update product name");

        let query = sqlx::query("UPDATE product SET name = ?2 WHERE id = ?1")
            .bind(product.id)
            .bind(new_name);

        self.execute_update("Update product name", "Product", product.id, query)
            .await
    }

    async fn update_customer_email_and_link_to_product(
        &self,
        customer: &Customer,
        new_email: &str,
        product: &Product,
    ) -> DbResult<CustomerProduct> {
        info!(id = customer.id, new_email = %new_email, "Update customer email address");
        let mut tx = self.pool.begin().await.map_err(begin_failed)?;

        let updated = sqlx::query("UPDATE customer SET email_address = ?2 WHERE id = ?1")
            .bind(customer.id)
            .bind(new_email)
            .execute(&mut *tx)
            .await;
        let updated = match updated {
            Ok(result) => result.rows_affected(),
            Err(e) => return Err(rollback(tx, e.into()).await),
        };
        log_affected("Update customer email", updated);
        if updated == 0 {
            return Err(rollback(tx, DbError::not_found("Customer", customer.id)).await);
        }

        info!(product_id = product.id, customer_id = customer.id, "Link product to customer");
        let link = sqlx::query_as::<_, CustomerProduct>(
            r#"
            INSERT INTO customer_product (customer_id, product_id)
            VALUES (?1, ?2)
            RETURNING id, customer_id, product_id
            "#,
        )
        .bind(customer.id)
        .bind(product.id)
        .fetch_one(&mut *tx)
        .await;
        let link = match link {
            Ok(link) => link,
            Err(e) => return Err(rollback(tx, e.into()).await),
        };
        log_affected("Link customer to product", 1);

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(link)
    }

    async fn delete_client(&self, client: &Client) -> DbResult<u64> {
        info!(id = client.id, "Delete client");
        self.execute_delete(
            "Delete client",
            "Client",
            Some(client.id),
            "DELETE FROM client WHERE id = ?1",
        )
        .await
    }

    async fn update_client_name(&self, client: &Client, new_name: &str) -> DbResult<u64> {
        info!(id = client.id, new_name = %new_name, "Update client name");

        let query = sqlx::query("UPDATE client SET name = ?2 WHERE id = ?1")
            .bind(client.id)
            .bind(new_name);

        self.execute_update("Update client name", "Client", client.id, query)
            .await
    }

    async fn delete_customer(&self, customer: &Customer) -> DbResult<u64> {
        info!(id = customer.id, "Delete customer");
        self.execute_delete(
            "Delete customer",
            "Customer",
            Some(customer.id),
            "DELETE FROM customer WHERE id = ?1",
        )
        .await
    }

    async fn delete_product(&self, product: &Product) -> DbResult<u64> {
        info!(id = product.id, "Delete product");
        self.execute_delete(
            "Delete product",
            "Product",
            Some(product.id),
            "DELETE FROM product WHERE id = ?1",
        )
        .await
    }

    async fn delete_all_customers(&self) -> DbResult<u64> {
        info!("Delete all customers");
        self.execute_delete(
            "Delete all customers",
            "Customer",
            None,
            "DELETE FROM customer",
        )
        .await
    }

    async fn delete_all_products(&self) -> DbResult<u64> {
        info!("Delete all products");
        self.execute_delete(
            "Delete all products",
            "Product",
            None,
            "DELETE FROM product",
        )
        .await
    }

    async fn delete_all_clients(&self) -> DbResult<u64> {
        info!("Delete all clients");
        self.execute_delete(
            "Delete all clients",
            "Client",
            None,
            "DELETE FROM client",
        )
        .await
    }

    async fn list_state(&self) -> DbResult<DatabaseState> {
        let mut tx = self.pool.begin().await.map_err(begin_failed)?;

        let clients = sqlx::query_as::<_, Client>(
            "SELECT id, name, active, created_at, updated_at FROM client ORDER BY id",
        )
        .fetch_all(&mut *tx)
        .await?;

        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, active, created_at, updated_at FROM product ORDER BY id",
        )
        .fetch_all(&mut *tx)
        .await?;

        let joined = sqlx::query_as::<_, CustomerJoin>(
            r#"
            SELECT c.id, c.code, c.first_name, c.last_name, c.email_address,
                   cl.name AS client_name, c.created_at, c.updated_at
            FROM customer c
            JOIN client cl ON cl.id = c.client_id
            ORDER BY c.id
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let linked = sqlx::query_as::<_, LinkedProduct>(
            r#"
            SELECT cp.customer_id, p.name AS product_name
            FROM customer_product cp
            JOIN product p ON p.id = cp.product_id
            ORDER BY cp.id
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let customer_products = sqlx::query_as::<_, CustomerProductRow>(
            r#"
            SELECT c.code, c.first_name, c.last_name, p.name AS product_name
            FROM customer c
            INNER JOIN customer_product cp ON c.id = cp.customer_id
            INNER JOIN product p ON cp.product_id = p.id
            ORDER BY c.last_name, c.id, cp.id
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut product_names: HashMap<EntityId, Vec<String>> = HashMap::new();
        for link in linked {
            product_names
                .entry(link.customer_id)
                .or_default()
                .push(link.product_name);
        }

        let customers = joined
            .into_iter()
            .map(|c| CustomerRow {
                product_names: product_names.remove(&c.id).unwrap_or_default(),
                id: c.id,
                code: c.code,
                first_name: c.first_name,
                last_name: c.last_name,
                email_address: c.email_address,
                client_name: c.client_name,
                created_at: c.created_at,
                updated_at: c.updated_at,
            })
            .collect();

        debug!(
            clients = clients.len(),
            products = products.len(),
            links = customer_products.len(),
            "Loaded database state"
        );

        Ok(DatabaseState {
            clients,
            products,
            customers,
            customer_products,
        })
    }
}
