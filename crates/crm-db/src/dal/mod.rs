//! # Data Access Layer
//!
//! One capability set, two interchangeable backends.
//!
//! ## Backends
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        DataAccess (trait)                               │
//! │                                                                         │
//! │  create      insert_client / insert_customer / insert_product          │
//! │  read-all    list_clients / list_customers / list_products             │
//! │  update      update_client_name / update_customer_name /               │
//! │              update_product_name                                        │
//! │  delete      delete_client / delete_customer / delete_product          │
//! │  delete-all  delete_all_customers / _products / _clients               │
//! │  report      list_state                                                │
//! │  compound    update_customer_email_and_link_to_product (atomic)        │
//! │                                                                         │
//! │         ┌──────────────────────┴──────────────────────┐                │
//! │         ▼                                             ▼                │
//! │  StatementBackend                           RepositoryBackend          │
//! │  hand-written SQL, JOINs                    load → mutate → save       │
//! │  for the report view                        report assembled in memory │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both backends produce the same results and the same errors for the same
//! calls. Pick one at composition time with [`crate::Database::data_access`].
//!
//! ## Compound Operation
//! ```text
//!   BEGIN
//!     UPDATE customer SET email_address = ?      ── 0 rows → ROLLBACK, NotFound
//!     INSERT INTO customer_product (...)         ── error  → ROLLBACK, error
//!   COMMIT
//! ```
//! The rollback completes before the error is returned, so no reader ever
//! sees the new email without the link or the link without the new email.

mod repository;
mod statement;

pub use repository::RepositoryBackend;
pub use statement::StatementBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, Transaction};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use crate::error::{DbError, DbResult};
use crm_core::{Client, Customer, CustomerProduct, DatabaseState, Product};

// =============================================================================
// Capability Set
// =============================================================================

/// Data access contract for clients, customers and products.
///
/// Every method fails fast: nothing is retried and nothing is swallowed.
/// Row counts are the engine's affected-row counts.
#[async_trait]
pub trait DataAccess: Send + Sync {
    /// Which backend this is.
    fn kind(&self) -> BackendKind;

    /// Creates an active client.
    async fn insert_client(&self, name: &str) -> DbResult<Client>;

    /// Creates a customer owned by `client`.
    ///
    /// Fails with `ForeignKeyViolation` when `client` no longer exists.
    async fn insert_customer(
        &self,
        code: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
        client: &Client,
    ) -> DbResult<Customer>;

    /// Creates an active product.
    async fn insert_product(&self, name: &str) -> DbResult<Product>;

    /// Lists clients ordered by id.
    async fn list_clients(&self) -> DbResult<Vec<Client>>;

    /// Lists customers ordered by id.
    async fn list_customers(&self) -> DbResult<Vec<Customer>>;

    /// Lists products ordered by id.
    async fn list_products(&self) -> DbResult<Vec<Product>>;

    /// Replaces first and last name with the two halves of `new_full_name`.
    ///
    /// `InvalidFormat` is returned before anything is written; `NotFound`
    /// when the customer no longer exists.
    async fn update_customer_name(&self, customer: &Customer, new_full_name: &str)
        -> DbResult<u64>;

    /// Renames a product. `NotFound` when it no longer exists.
    async fn update_product_name(&self, product: &Product, new_name: &str) -> DbResult<u64>;

    /// Atomically changes the customer's email and links it to `product`.
    async fn update_customer_email_and_link_to_product(
        &self,
        customer: &Customer,
        new_email: &str,
        product: &Product,
    ) -> DbResult<CustomerProduct>;

    /// Deletes a client.
    ///
    /// While the client owns customers this fails with
    /// `ConstraintViolation` and the client is left in place.
    async fn delete_client(&self, client: &Client) -> DbResult<u64>;

    /// Renames a client. `NotFound` when it no longer exists.
    async fn update_client_name(&self, client: &Client, new_name: &str) -> DbResult<u64>;

    /// Deletes a customer together with its product links.
    async fn delete_customer(&self, customer: &Customer) -> DbResult<u64>;

    /// Deletes a product. `ConstraintViolation` while it is linked.
    async fn delete_product(&self, product: &Product) -> DbResult<u64>;

    /// Deletes every customer (and every link).
    async fn delete_all_customers(&self) -> DbResult<u64>;

    /// Deletes every product. Call after [`DataAccess::delete_all_customers`].
    async fn delete_all_products(&self) -> DbResult<u64>;

    /// Deletes every client. Call after [`DataAccess::delete_all_customers`].
    async fn delete_all_clients(&self) -> DbResult<u64>;

    /// Reads every table for reporting.
    async fn list_state(&self) -> DbResult<DatabaseState>;
}

// =============================================================================
// Backend Selection
// =============================================================================

/// Available [`DataAccess`] implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hand-written SQL statements.
    #[default]
    Statement,
    /// Entity repositories (load, mutate, save).
    Repository,
}

impl BackendKind {
    /// Every backend, for exercising both in tests.
    pub const ALL: [BackendKind; 2] = [BackendKind::Statement, BackendKind::Repository];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Statement => "statement",
            BackendKind::Repository => "repository",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "statement" | "sql" => Ok(BackendKind::Statement),
            "repository" | "repo" => Ok(BackendKind::Repository),
            other => Err(format!(
                "unknown backend '{other}', expected 'statement' or 'repository'"
            )),
        }
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Logs an affected-row count the same way for every operation.
fn log_affected(operation: &str, rows: u64) {
    info!(rows, "{:<20}: {} row(s) affected", operation, rows);
}

/// Rolls back `tx` and hands `err` back for propagation.
///
/// A failed rollback is logged; the original error is still the one the
/// caller sees (dropping the transaction rolls back as well).
async fn rollback(tx: Transaction<'_, Sqlite>, err: DbError) -> DbError {
    warn!(error = %err, "Rolling back transaction");
    if let Err(rollback_err) = tx.rollback().await {
        warn!(error = %rollback_err, "Rollback failed");
    }
    err
}

fn begin_failed(err: sqlx::Error) -> DbError {
    match DbError::from(err) {
        DbError::Internal(msg) | DbError::QueryFailed(msg) => DbError::TransactionFailed(msg),
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig, ErrorKind};

    async fn open(kind: BackendKind) -> (Database, Box<dyn DataAccess>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let dal = db.data_access(kind);
        (db, dal)
    }

    async fn seed_customer(dal: &dyn DataAccess) -> (Client, Customer) {
        let client = dal.insert_client("Los Angeles Lakers").await.unwrap();
        let customer = dal
            .insert_customer("567", "Jerry", "West", "jwest@lakers.com", &client)
            .await
            .unwrap();
        (client, customer)
    }

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("statement".parse::<BackendKind>(), Ok(BackendKind::Statement));
        assert_eq!(" Repository ".parse::<BackendKind>(), Ok(BackendKind::Repository));
        assert!("orm".parse::<BackendKind>().is_err());
        assert_eq!(BackendKind::default(), BackendKind::Statement);
        assert_eq!(BackendKind::Repository.to_string(), "repository");
    }

    #[tokio::test]
    async fn test_insert_client_round_trip() {
        for kind in BackendKind::ALL {
            let (_db, dal) = open(kind).await;
            assert_eq!(dal.kind(), kind);

            let lakers = dal.insert_client("Los Angeles Lakers").await.unwrap();
            let celtics = dal.insert_client("Boston Celtics").await.unwrap();
            assert_ne!(lakers.id, celtics.id);

            let clients = dal.list_clients().await.unwrap();
            assert_eq!(clients.len(), 2);
            assert_eq!(clients[0].id, lakers.id);
            assert_eq!(clients[0].name, "Los Angeles Lakers");
            assert!(clients[0].active);

            // Deleted identities are never handed out again
            dal.delete_client(&celtics).await.unwrap();
            let next = dal.insert_client("Chicago Bulls").await.unwrap();
            assert!(next.id > celtics.id, "{kind}: id {} reused", next.id);
        }
    }

    #[tokio::test]
    async fn test_insert_customer_with_missing_client() {
        for kind in BackendKind::ALL {
            let (_db, dal) = open(kind).await;
            let client = dal.insert_client("Boston Celtics").await.unwrap();
            dal.delete_client(&client).await.unwrap();

            let err = dal
                .insert_customer("678", "Bill", "Russell", "brussel@celtics.com", &client)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ForeignKey, "{kind}");
            assert!(dal.list_customers().await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_delete_all_is_idempotent() {
        for kind in BackendKind::ALL {
            let (_db, dal) = open(kind).await;
            seed_customer(dal.as_ref()).await;

            assert_eq!(dal.delete_all_customers().await.unwrap(), 1);
            assert_eq!(dal.delete_all_customers().await.unwrap(), 0);
            assert!(dal.list_customers().await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_update_customer_name() {
        for kind in BackendKind::ALL {
            let (_db, dal) = open(kind).await;
            let (_, customer) = seed_customer(dal.as_ref()).await;

            let rows = dal.update_customer_name(&customer, "Lew Alcindor").await.unwrap();
            assert_eq!(rows, 1);

            let customers = dal.list_customers().await.unwrap();
            assert_eq!(customers[0].first_name, "Lew");
            assert_eq!(customers[0].last_name, "Alcindor");
            assert_eq!(customers[0].email_address, "jwest@lakers.com");
        }
    }

    #[tokio::test]
    async fn test_update_customer_name_rejects_bad_format() {
        for kind in BackendKind::ALL {
            let (_db, dal) = open(kind).await;
            let (_, customer) = seed_customer(dal.as_ref()).await;

            for bad in ["Madonna", "A B C"] {
                let err = dal.update_customer_name(&customer, bad).await.unwrap_err();
                assert_eq!(err.kind(), ErrorKind::InvalidFormat, "{kind}: {bad}");
            }

            let customers = dal.list_customers().await.unwrap();
            assert_eq!(customers[0].full_name(), "Jerry West");
        }
    }

    #[tokio::test]
    async fn test_update_deleted_rows_is_not_found() {
        for kind in BackendKind::ALL {
            let (_db, dal) = open(kind).await;
            let (client, customer) = seed_customer(dal.as_ref()).await;
            let product = dal.insert_product("Fantastic Identity Monitoring").await.unwrap();

            assert_eq!(dal.delete_customer(&customer).await.unwrap(), 1);
            assert_eq!(dal.delete_product(&product).await.unwrap(), 1);
            assert_eq!(dal.delete_client(&client).await.unwrap(), 1);

            let err = dal.update_customer_name(&customer, "Lew Alcindor").await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound, "{kind}");
            let err = dal.update_product_name(&product, "Renamed").await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound, "{kind}");
            let err = dal.update_client_name(&client, "Evil Empire").await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound, "{kind}");

            // Deleting again is not an error, just zero rows
            assert_eq!(dal.delete_customer(&customer).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_rename_product_and_client() {
        for kind in BackendKind::ALL {
            let (_db, dal) = open(kind).await;
            let (client, _) = seed_customer(dal.as_ref()).await;
            let product = dal.insert_product("Watching Some Other Stuff").await.unwrap();

            assert_eq!(dal.update_product_name(&product, "Stupendous Cyber Monitoring").await.unwrap(), 1);
            assert_eq!(dal.update_client_name(&client, "Evil Empire").await.unwrap(), 1);

            assert_eq!(dal.list_products().await.unwrap()[0].name, "Stupendous Cyber Monitoring");
            assert_eq!(dal.list_clients().await.unwrap()[0].name, "Evil Empire");
        }
    }

    #[tokio::test]
    async fn test_email_and_link_commits_both() {
        for kind in BackendKind::ALL {
            let (_db, dal) = open(kind).await;
            let (_, customer) = seed_customer(dal.as_ref()).await;
            let product = dal.insert_product("Fantastic Identity Monitoring").await.unwrap();

            let link = dal
                .update_customer_email_and_link_to_product(&customer, "jwest@clippers.com", &product)
                .await
                .unwrap();
            assert_eq!(link.customer_id, customer.id);
            assert_eq!(link.product_id, product.id);

            let state = dal.list_state().await.unwrap();
            let row = state.customer(customer.id).unwrap();
            assert_eq!(row.email_address, "jwest@clippers.com");
            assert_eq!(row.product_names, vec!["Fantastic Identity Monitoring".to_string()]);
            assert_eq!(state.customer_products.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_email_and_link_rolls_back_on_missing_product() {
        for kind in BackendKind::ALL {
            let (_db, dal) = open(kind).await;
            let (_, customer) = seed_customer(dal.as_ref()).await;
            let product = dal.insert_product("Doomed Product").await.unwrap();
            dal.delete_product(&product).await.unwrap();

            let err = dal
                .update_customer_email_and_link_to_product(&customer, "jwest@clippers.com", &product)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ForeignKey, "{kind}");

            let state = dal.list_state().await.unwrap();
            assert_eq!(state.customer(customer.id).unwrap().email_address, "jwest@lakers.com");
            assert!(state.customer_products.is_empty());
        }
    }

    #[tokio::test]
    async fn test_email_and_link_rolls_back_on_duplicate_link() {
        for kind in BackendKind::ALL {
            let (_db, dal) = open(kind).await;
            let (_, customer) = seed_customer(dal.as_ref()).await;
            let product = dal.insert_product("Fantastic Identity Monitoring").await.unwrap();

            dal.update_customer_email_and_link_to_product(&customer, "first@clippers.com", &product)
                .await
                .unwrap();
            let err = dal
                .update_customer_email_and_link_to_product(&customer, "second@clippers.com", &product)
                .await
                .unwrap_err();
            assert!(matches!(err, DbError::UniqueViolation { .. }), "{kind}: {err}");

            let state = dal.list_state().await.unwrap();
            assert_eq!(state.customer(customer.id).unwrap().email_address, "first@clippers.com");
            assert_eq!(state.customer_products.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_email_and_link_missing_customer() {
        for kind in BackendKind::ALL {
            let (_db, dal) = open(kind).await;
            let (_, customer) = seed_customer(dal.as_ref()).await;
            let product = dal.insert_product("Fantastic Identity Monitoring").await.unwrap();
            dal.delete_customer(&customer).await.unwrap();

            let err = dal
                .update_customer_email_and_link_to_product(&customer, "jwest@clippers.com", &product)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound, "{kind}");
            assert!(dal.list_state().await.unwrap().customer_products.is_empty());
        }
    }

    #[tokio::test]
    async fn test_delete_client_with_customers_is_blocked() {
        for kind in BackendKind::ALL {
            let (_db, dal) = open(kind).await;
            let (client, _) = seed_customer(dal.as_ref()).await;

            let err = dal.delete_client(&client).await.unwrap_err();
            assert!(err.is_constraint_violation(), "{kind}: {err}");

            let err = dal.delete_all_clients().await.unwrap_err();
            assert!(err.is_constraint_violation(), "{kind}: {err}");

            let clients = dal.list_clients().await.unwrap();
            assert_eq!(clients, vec![client]);
        }
    }

    #[tokio::test]
    async fn test_delete_linked_product_is_blocked() {
        for kind in BackendKind::ALL {
            let (_db, dal) = open(kind).await;
            let (_, customer) = seed_customer(dal.as_ref()).await;
            let product = dal.insert_product("Fantastic Identity Monitoring").await.unwrap();
            dal.update_customer_email_and_link_to_product(&customer, "jwest@clippers.com", &product)
                .await
                .unwrap();

            let err = dal.delete_product(&product).await.unwrap_err();
            assert!(err.is_constraint_violation(), "{kind}: {err}");
            assert_eq!(dal.list_products().await.unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_delete_customer_cascades_links() {
        for kind in BackendKind::ALL {
            let (db, dal) = open(kind).await;
            let (_, customer) = seed_customer(dal.as_ref()).await;
            let first = dal.insert_product("Super Personal Resolution Service").await.unwrap();
            let second = dal.insert_product("Fantastic Identity Monitoring").await.unwrap();
            dal.update_customer_email_and_link_to_product(&customer, "a@clippers.com", &first)
                .await
                .unwrap();
            dal.update_customer_email_and_link_to_product(&customer, "b@clippers.com", &second)
                .await
                .unwrap();
            assert_eq!(db.customer_products().count().await.unwrap(), 2);

            assert_eq!(dal.delete_customer(&customer).await.unwrap(), 1);

            assert_eq!(db.customer_products().count().await.unwrap(), 0);
            assert_eq!(dal.list_products().await.unwrap(), vec![first, second]);
        }
    }

    #[tokio::test]
    async fn test_customer_products_ordered_by_last_name() {
        for kind in BackendKind::ALL {
            let (_db, dal) = open(kind).await;
            let client = dal.insert_client("Boston Celtics").await.unwrap();
            let russell = dal
                .insert_customer("678", "Bill", "Russell", "brussel@celtics.com", &client)
                .await
                .unwrap();
            let bird = dal
                .insert_customer("789", "Larry", "Bird", "lbird@celtics.com", &client)
                .await
                .unwrap();
            let product = dal.insert_product("Fantastic Identity Monitoring").await.unwrap();

            dal.update_customer_email_and_link_to_product(&russell, "r@celtics.com", &product)
                .await
                .unwrap();
            dal.update_customer_email_and_link_to_product(&bird, "b@celtics.com", &product)
                .await
                .unwrap();

            let state = dal.list_state().await.unwrap();
            let last_names: Vec<&str> = state
                .customer_products
                .iter()
                .map(|row| row.last_name.as_str())
                .collect();
            assert_eq!(last_names, vec!["Bird", "Russell"], "{kind}");

            let ids: Vec<_> = state.customers.iter().map(|c| c.id).collect();
            assert_eq!(ids, vec![russell.id, bird.id]);
            assert_eq!(state.customers[0].client_name, "Boston Celtics");
        }
    }

    #[tokio::test]
    async fn test_empty_state() {
        for kind in BackendKind::ALL {
            let (_db, dal) = open(kind).await;
            assert!(dal.list_state().await.unwrap().is_empty(), "{kind}");
        }
    }
}
