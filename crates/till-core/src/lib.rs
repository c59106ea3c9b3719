//! # till-core: Pure Business Logic for the Till POS Core
//!
//! This crate holds the catalog, the cart and the JSON codec behind the
//! Till C ABI. It performs no I/O; the `till-ffi` crate adapts it for hosts.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Till POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Host application (any language)                 │   │
//! │  │    Item buttons ──► Cart grid ──► Tender box ──► Change shown   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ C ABI (status codes + JSON text)      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    till-ffi                                     │   │
//! │  │    handles, last error, buffers, panic guard                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   json    │  │  catalog  │  │   cart    │  │ validation│  │   │
//! │  │   │  parser   │  │   Store   │  │   Cart    │  │   rules   │  │   │
//! │  │   │  writer   │  │   State   │  │ CartLine  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO RAW POINTERS • INTEGER CENTS                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`json`] - JSON value model, parser and writer
//! - [`catalog`] - Catalog store with whole-state replacement
//! - [`cart`] - Cart lines, totals and payment
//! - [`types`] - Wire types (CatalogItem, CartSummary, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//! - [`config`] - Settings read at init
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::{Cart, CatalogStore};
//!
//! let catalog = CatalogStore::new();
//! catalog
//!     .load(r#"{"items":[{"id":"COFFEE","name":"Coffee","unit_cents":500}]}"#)
//!     .unwrap();
//!
//! let mut cart = Cart::new();
//! cart.add_item(&catalog, "COFFEE", 2).unwrap();
//! cart.set_given_cents(2000).unwrap();
//!
//! assert_eq!(cart.total_cents(), 1000);
//! assert_eq!(cart.change_cents(), 1000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod json;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use catalog::{CatalogLoad, CatalogState, CatalogStore};
pub use config::CoreConfig;
pub use error::{CoreError, CoreResult, JsonError, ValidationError};
pub use json::ToJson;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Version reported by `till_get_version`.
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");
