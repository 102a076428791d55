//! # crm-core: Entities for the CRM Data Access Layer
//!
//! This crate holds the entity model shared by every data access backend.
//! It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CRM DAL Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    demo driver (bin)                            │   │
//! │  │    seed ──► report ──► mutate ──► report ──► cleanup            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               crm-db (DataAccess backends, report)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ crm-core (THIS CRATE) ★                         │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  Client   │  │ Customer  │  │  Product  │  │ validation│  │   │
//! │  │   │           │  │           │  │           │  │ full name │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Client, Customer, Product, CustomerProduct) and report rows
//! - [`error`] - Validation error types
//! - [`validation`] - Full-name splitting
//!
//! ## Example Usage
//!
//! ```rust
//! use crm_core::validation::split_full_name;
//!
//! let (first, last) = split_full_name("Lew Alcindor").unwrap();
//! assert_eq!(first, "Lew");
//! assert_eq!(last, "Alcindor");
//!
//! assert!(split_full_name("Madonna").is_err());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::ValidationError;
pub use types::*;
