//! # crm-db: Data Access Layer for the CRM Store
//!
//! This crate provides database access for clients, customers, products and
//! their links. It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          CRM Data Flow                                  │
//! │                                                                         │
//! │  demo binary (script::run)                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      crm-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │ dyn DataAccess│    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (dal/)      │───►│ (repository/)  │    │  (embedded)  │  │   │
//! │  │   │               │    │                │    │              │  │   │
//! │  │   │ Statement     │    │ ClientRepo     │    │ 001_initial_ │  │   │
//! │  │   │ Repository    │    │ CustomerRepo   │    │   schema.sql │  │   │
//! │  │   └───────┬───────┘    └───────┬────────┘    └──────────────┘  │   │
//! │  │           └─────────┬──────────┘                               │   │
//! │  │                     ▼                                          │   │
//! │  │            Database (pool.rs)                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   crm.db (CRM_DATABASE_PATH)                                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Per-table repositories
//! - [`dal`] - The [`DataAccess`] trait and its two backends
//! - [`report`] - Fixed-width rendering of a [`crm_core::DatabaseState`]
//! - [`script`] - The seed / mutate / cleanup demo sequence
//! - [`config`] - Environment-driven driver configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crm_db::{BackendKind, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("crm.db")).await?;
//! let dal = db.data_access(BackendKind::Statement);
//!
//! let lakers = dal.insert_client("Los Angeles Lakers").await?;
//! println!("{}", crm_db::report::render_state(&dal.list_state().await?));
//!
//! db.close().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod dal;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod report;
pub mod repository;
pub mod script;

// =============================================================================
// Re-exports
// =============================================================================

pub use dal::{BackendKind, DataAccess, RepositoryBackend, StatementBackend};
pub use error::{DbError, DbResult, ErrorKind};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::client::ClientRepository;
pub use repository::customer::{CustomerRepository, NewCustomer};
pub use repository::customer_product::CustomerProductRepository;
pub use repository::product::ProductRepository;
