//! Product templates (`product.template`).

use costos_core::xmlrpc::Struct;
use costos_core::{CategoryId, ProductId};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{FromRecord, Many2One, Record};
use crate::error::OdooError;

/// A stockable product and its current cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Internal reference (SKU)
    pub default_code: Option<String>,
    pub categ_id: Option<CategoryId>,
    pub categ_name: Option<String>,
    /// Current cost as stored in Odoo; may be zero.
    pub standard_price: Decimal,
    pub active: bool,
}

impl FromRecord for Product {
    const MODEL: &'static str = "product.template";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "default_code",
        "categ_id",
        "standard_price",
        "active",
    ];

    fn from_record(record: &Struct) -> Result<Self, OdooError> {
        let r = Record::new(Self::MODEL, record);
        let (categ_id, categ_name) = Many2One::split(r.many2one("categ_id")?);

        Ok(Self {
            id: ProductId::new(r.int("id")?),
            name: r.string("name")?,
            default_code: r.optional_string("default_code")?,
            categ_id: categ_id.map(CategoryId::new),
            categ_name,
            standard_price: r.decimal("standard_price")?,
            // Not every caller asks for `active`; search_read filters on it anyway.
            active: record.get("active").is_none() || r.bool("active")?,
        })
    }
}
