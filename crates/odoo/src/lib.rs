//! Odoo client for reviewing and updating product costs.
//!
//! Talks to Odoo's legacy XML-RPC API (`/xmlrpc/2/common` and
//! `/xmlrpc/2/object`) using the codec from `costos-core`.
//!
//! # Architecture
//!
//! - [`transport`]: one HTTP `POST` per call, errors tagged with the call
//! - [`client`]: session (lazy, cached uid) and the generic primitives
//!   `search_read`, `search_count`, `write` and `call`
//! - [`catalog`]: categories and products with the editor's filters
//! - [`analysis`]: what the products of a category currently cost
//! - [`batch`]: staged cost changes applied in paced batches
//! - [`stats`]: catalog counts and cost rankings
//!
//! The client never retries. Retry policy belongs to the caller.
//!
//! # Example
//!
//! ```rust,no_run
//! use costos_odoo::{OdooClient, ProductQuery};
//!
//! # async fn example() -> Result<(), costos_odoo::OdooError> {
//! let client = OdooClient::from_env()?;
//! for product in client.get_products(&ProductQuery::new(20)).await? {
//!     println!("{} {}", product.name, product.standard_price);
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod analysis;
pub mod batch;
pub mod catalog;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod models;
pub mod stats;
pub mod transport;

pub use analysis::{PriceAnalysis, PriceConsistency, SuggestedAction};
pub use batch::{
    BatchOptions, BatchReport, CategoryCostChange, CostChange, ItemResult, ItemStatus,
    apply_cost_changes,
};
pub use catalog::{CategoryQuery, CategoryWithCount, ProductQuery};
pub use client::{ConnectionStatus, OdooClient, SearchReadOptions, WriteOutcome};
pub use config::{ConfigError, OdooConfig};
pub use domain::Domain;
pub use error::{OdooError, RpcCall};
pub use models::{Category, FromRecord, Many2One, Product};
pub use stats::{CatalogStats, ProductCost};
pub use transport::Endpoint;
