//! Product categories (`product.category`).

use costos_core::CategoryId;
use costos_core::xmlrpc::Struct;
use serde::Serialize;

use super::{FromRecord, Many2One, Record};
use crate::error::OdooError;

/// A product category with its parent flattened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
    pub parent_name: Option<String>,
}

impl FromRecord for Category {
    const MODEL: &'static str = "product.category";
    const FIELDS: &'static [&'static str] = &["id", "name", "parent_id"];

    fn from_record(record: &Struct) -> Result<Self, OdooError> {
        let r = Record::new(Self::MODEL, record);
        let (parent_id, parent_name) = Many2One::split(r.many2one("parent_id")?);

        Ok(Self {
            id: CategoryId::new(r.int("id")?),
            name: r.string("name")?,
            parent_id: parent_id.map(CategoryId::new),
            parent_name,
        })
    }
}
