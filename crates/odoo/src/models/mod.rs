//! Domain projections of Odoo records.
//!
//! Records arrive as XML-RPC structs. Each model type implements
//! [`FromRecord`], which names the fields to request and maps the struct,
//! flattening many2one references into `_id` / `_name` pairs.

mod category;
mod many2one;
mod product;
mod record;

pub use category::Category;
pub use many2one::Many2One;
pub use product::Product;
pub use record::{FromRecord, Record, map_records};
