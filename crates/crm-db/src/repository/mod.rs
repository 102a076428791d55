//! # Repository Module
//!
//! Entity-oriented repositories over the CRM tables.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  RepositoryBackend (DataAccess)                                        │
//! │       │                                                                 │
//! │       │  db.customers().get_by_id(4)                                   │
//! │       │  customer.first_name = "Lew"                                   │
//! │       │  db.customers().save(&customer)                                │
//! │       ▼                                                                 │
//! │  CustomerRepository                                                    │
//! │  ├── insert(&self, ...)        → Customer (engine-assigned id)         │
//! │  ├── get_by_id(&self, id)      → Option<Customer>                      │
//! │  ├── list_all(&self)           → Vec<Customer> ordered by id           │
//! │  ├── save(&self, &customer)    → writes every non-key column           │
//! │  ├── delete(&self, id)         → affected rows                         │
//! │  └── delete_all(&self)         → affected rows                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Operations that must join a transaction are also exposed as associated
//! functions taking any [`sqlx::SqliteExecutor`] (`*_in` suffix), so a
//! caller can pass `&mut *tx`.
//!
//! ## Available Repositories
//!
//! - [`client::ClientRepository`]
//! - [`customer::CustomerRepository`]
//! - [`product::ProductRepository`]
//! - [`customer_product::CustomerProductRepository`]

pub mod client;
pub mod customer;
pub mod customer_product;
pub mod product;
