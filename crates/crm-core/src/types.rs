//! # Domain Types
//!
//! Entities and read models used throughout the CRM data access layer.
//!
//! ## Entity Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Entity Model                                    │
//! │                                                                         │
//! │  ┌─────────────────┐  1   * ┌─────────────────┐                        │
//! │  │     Client      │───────►│    Customer     │                        │
//! │  │  ─────────────  │        │  ─────────────  │                        │
//! │  │  id             │        │  id             │                        │
//! │  │  name           │        │  code           │                        │
//! │  │  active         │        │  first_name     │                        │
//! │  └─────────────────┘        │  last_name      │                        │
//! │                             │  email_address  │                        │
//! │                             │  client_id (FK) │                        │
//! │                             └────────┬────────┘                        │
//! │                                      │ *                                │
//! │                             ┌────────▼────────┐  *   1 ┌─────────────┐ │
//! │                             │ CustomerProduct │───────►│   Product   │ │
//! │                             │  (link entity)  │        │  id, name   │ │
//! │                             └─────────────────┘        │  active     │ │
//! │                                                        └─────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity carries an `id` assigned by the storage engine on insert.
//! Ids never change and are never reused, so equality is identity equality:
//! two values with the same `id` denote the same row, even if one of them
//! holds stale attribute values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Engine-assigned row identity.
pub type EntityId = i64;

// =============================================================================
// Client
// =============================================================================

/// An organisation that owns customers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Client {
    pub id: EntityId,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Customer
// =============================================================================

/// A person belonging to exactly one client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: EntityId,

    /// Business identifier (not the primary key).
    pub code: String,

    pub first_name: String,
    pub last_name: String,
    pub email_address: String,

    /// Owning client. Always resolves to an existing client row.
    pub client_id: EntityId,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Returns "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product customers can be linked to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: EntityId,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Customer / Product Link
// =============================================================================

/// Many-to-many association between a customer and a product.
///
/// Only created by the "update email and link to product" operation;
/// removed when its customer is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CustomerProduct {
    pub id: EntityId,
    pub customer_id: EntityId,
    pub product_id: EntityId,
}

// =============================================================================
// Identity Equality
// =============================================================================

macro_rules! identity_eq {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl PartialEq for $entity {
                fn eq(&self, other: &Self) -> bool {
                    self.id == other.id
                }
            }

            impl Eq for $entity {}
        )+
    };
}

identity_eq!(Client, Customer, Product, CustomerProduct);

// =============================================================================
// Read Models
// =============================================================================

/// A customer joined with its owning client and linked products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerRow {
    pub id: EntityId,
    pub code: String,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub client_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Names of linked products, in link order.
    pub product_names: Vec<String>,
}

/// One customer/product association, flattened for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CustomerProductRow {
    pub code: String,
    pub first_name: String,
    pub last_name: String,
    pub product_name: String,
}

/// Snapshot of every table, as consumed by the report renderer.
///
/// ## Ordering
/// - `clients`, `products`, `customers`: by id
/// - `customer_products`: by customer last name, then customer id, then link id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseState {
    pub clients: Vec<Client>,
    pub products: Vec<Product>,
    pub customers: Vec<CustomerRow>,
    pub customer_products: Vec<CustomerProductRow>,
}

impl DatabaseState {
    /// True when every table is empty.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
            && self.products.is_empty()
            && self.customers.is_empty()
            && self.customer_products.is_empty()
    }

    /// Finds a customer row by id.
    pub fn customer(&self, id: EntityId) -> Option<&CustomerRow> {
        self.customers.iter().find(|c| c.id == id)
    }

    /// Finds a client by id.
    pub fn client(&self, id: EntityId) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Finds a product by id.
    pub fn product(&self, id: EntityId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: EntityId, name: &str) -> Client {
        let now = Utc::now();
        Client {
            id,
            name: name.to_string(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_identity_equality_ignores_attributes() {
        let a = client(1, "Los Angeles Lakers");
        let b = client(1, "Evil Empire");
        let c = client(2, "Los Angeles Lakers");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_customer_full_name() {
        let now = Utc::now();
        let customer = Customer {
            id: 4,
            code: "456".to_string(),
            first_name: "Kareem".to_string(),
            last_name: "Abdul-Jabbar".to_string(),
            email_address: "kabduljabbar@lakers.com".to_string(),
            client_id: 1,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(customer.full_name(), "Kareem Abdul-Jabbar");
    }

    #[test]
    fn test_empty_state() {
        let state = DatabaseState::default();
        assert!(state.is_empty());
        assert!(state.client(1).is_none());
    }

    #[test]
    fn test_state_serializes_to_json() {
        let state = DatabaseState {
            clients: vec![client(7, "Boston Celtics")],
            ..Default::default()
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["clients"][0]["name"], "Boston Celtics");
        assert_eq!(json["customers"].as_array().map(Vec::len), Some(0));
    }
}
