//! # Demo Script
//!
//! The fixed seed / mutate / cleanup sequence the `demo` binary runs.
//!
//! ```text
//! seed      2 clients, 8 customers, 3 products        → snapshot 1
//! mutate    rename customer 4, rename product 3,
//!           move customer 5 to a new email + link product 2,
//!           try to delete client 2 (must be blocked),
//!           rename client 2, delete customer 8          → snapshot 2
//! cleanup   delete customers, then products, then clients → snapshot 3
//! ```
//!
//! The script works against any [`DataAccess`] backend and returns the
//! snapshots instead of printing them.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::dal::DataAccess;
use crate::error::DbError;
use crm_core::{Client, DatabaseState};

const CLIENTS: [&str; 2] = ["Los Angeles Lakers", "Boston Celtics"];

/// (code, first name, last name, email, index into [`CLIENTS`])
const CUSTOMERS: [(&str, &str, &str, &str, usize); 8] = [
    ("123", "Kobe", "Bryant", "kbryant8@lakers.com", 0),
    ("234", "Shaquille", "O'Neal", "soneal@lakers.com", 0),
    ("345", "Magic", "Johnson", "mjohnson@lakers.com", 0),
    ("456", "Kareem", "Abdul-Jabbar", "kabduljabbar@lakers.com", 0),
    ("567", "Jerry", "West", "jwest@lakers.com", 0),
    ("678", "Bill", "Russell", "brussel@celtics.com", 1),
    ("789", "Larry", "Bird", "lbird@celtics.com", 1),
    ("890", "Paul", "Pierce", "ppierce@celtics.com", 1),
];

const PRODUCTS: [&str; 3] = [
    "Super Personal Resolution Service",
    "Fantastic Identity Monitoring",
    "Watching Some Other Stuff",
];

/// Errors raised while running the script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Db(#[from] DbError),

    /// A delete that referential integrity should have rejected went through.
    #[error("Delete of client {0} succeeded but should have been blocked")]
    IntegrityNotEnforced(i64),
}

/// Outcome of deliberately violating referential integrity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityCheck {
    /// The engine rejected the operation; holds its message.
    Blocked(String),
    /// The operation succeeded.
    NotEnforced,
}

/// Attempts to delete a client that still owns customers.
///
/// A `ConstraintViolation` is the expected result and is reported as
/// [`IntegrityCheck::Blocked`]. Any other error is returned unchanged.
pub async fn check_client_delete_blocked(
    dal: &dyn DataAccess,
    client: &Client,
) -> Result<IntegrityCheck, DbError> {
    match dal.delete_client(client).await {
        Err(DbError::ConstraintViolation { message, .. }) => {
            info!("Delete client was blocked by DB constraints, as expected");
            Ok(IntegrityCheck::Blocked(message))
        }
        Err(e) => Err(e),
        Ok(rows) => {
            warn!(id = client.id, rows, "Delete client was not blocked");
            Ok(IntegrityCheck::NotEnforced)
        }
    }
}

/// Database state after each phase of the script.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptReport {
    pub seeded: DatabaseState,
    pub mutated: DatabaseState,
    pub cleaned: DatabaseState,
}

/// Runs the full script.
///
/// Expects an empty database; ids are taken from the inserted rows, never
/// assumed.
pub async fn run(dal: &dyn DataAccess) -> Result<ScriptReport, ScriptError> {
    info!(backend = %dal.kind(), "Running demo script");

    // Seed
    let mut clients = Vec::with_capacity(CLIENTS.len());
    for name in CLIENTS {
        clients.push(dal.insert_client(name).await?);
    }

    let mut customers = Vec::with_capacity(CUSTOMERS.len());
    for (code, first_name, last_name, email, client) in CUSTOMERS {
        customers.push(
            dal.insert_customer(code, first_name, last_name, email, &clients[client])
                .await?,
        );
    }

    let mut products = Vec::with_capacity(PRODUCTS.len());
    for name in PRODUCTS {
        products.push(dal.insert_product(name).await?);
    }

    let seeded = dal.list_state().await?;

    // Mutate
    dal.update_customer_name(&customers[3], "Lew Alcindor").await?;
    dal.update_product_name(&products[2], "Stupendous Cyber Monitoring")
        .await?;
    dal.update_customer_email_and_link_to_product(
        &customers[4],
        "jwest@clippers.com",
        &products[1],
    )
    .await?;

    if check_client_delete_blocked(dal, &clients[1]).await? == IntegrityCheck::NotEnforced {
        return Err(ScriptError::IntegrityNotEnforced(clients[1].id));
    }

    dal.update_client_name(&clients[1], "Evil Empire").await?;
    dal.delete_customer(&customers[7]).await?;

    let mutated = dal.list_state().await?;

    // Cleanup: customers first (their links cascade), then products, then clients
    dal.delete_all_customers().await?;
    dal.delete_all_products().await?;
    dal.delete_all_clients().await?;

    let cleaned = dal.list_state().await?;

    Ok(ScriptReport {
        seeded,
        mutated,
        cleaned,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
