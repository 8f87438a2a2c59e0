//! Core domain types.
//!
//! Type-safe record IDs and the validated [`Cost`] written back to Odoo.

pub mod cost;
pub mod id;

pub use cost::{Cost, CostError};
pub use id::*;
