//! Typed field access on `search_read` results.

use costos_core::xmlrpc::{Struct, Value};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use super::Many2One;
use crate::error::OdooError;

/// A model type that can be read with `search_read`.
pub trait FromRecord: Sized {
    /// Technical model name, e.g. `product.template`.
    const MODEL: &'static str;
    /// Fields requested from the server.
    const FIELDS: &'static [&'static str];

    /// Map one record.
    ///
    /// # Errors
    ///
    /// Returns `OdooError::Mapping` if a field is missing or mistyped.
    fn from_record(record: &Struct) -> Result<Self, OdooError>;
}

/// Borrowed view over one record with typed accessors.
///
/// Odoo returns `false` for empty optional fields; the `optional_*`
/// accessors map that to `None`.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    model: &'static str,
    fields: &'a Struct,
}

impl<'a> Record<'a> {
    #[must_use]
    pub const fn new(model: &'static str, fields: &'a Struct) -> Self {
        Self { model, fields }
    }

    fn error(&self, message: String) -> OdooError {
        OdooError::Mapping {
            model: self.model,
            message,
        }
    }

    fn field(&self, name: &str) -> Result<&'a Value, OdooError> {
        self.fields
            .get(name)
            .ok_or_else(|| self.error(format!("missing field {name}")))
    }

    fn mistyped(&self, name: &str, expected: &str, value: &Value) -> OdooError {
        self.error(format!("field {name}: expected {expected}, got {}", value.kind()))
    }

    /// # Errors
    ///
    /// Returns `OdooError::Mapping` unless the field is an integer.
    pub fn int(&self, name: &str) -> Result<i64, OdooError> {
        let value = self.field(name)?;
        value
            .as_i64()
            .ok_or_else(|| self.mistyped(name, "int", value))
    }

    /// # Errors
    ///
    /// Returns `OdooError::Mapping` unless the field is a string.
    pub fn string(&self, name: &str) -> Result<String, OdooError> {
        let value = self.field(name)?;
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| self.mistyped(name, "string", value))
    }

    /// A string field where `false` (or absence) means empty.
    ///
    /// # Errors
    ///
    /// Returns `OdooError::Mapping` if the field holds another type.
    pub fn optional_string(&self, name: &str) -> Result<Option<String>, OdooError> {
        match self.fields.get(name) {
            None | Some(Value::Bool(false)) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.mistyped(name, "string or false", other)),
        }
    }

    /// # Errors
    ///
    /// Returns `OdooError::Mapping` unless the field is a boolean.
    pub fn bool(&self, name: &str) -> Result<bool, OdooError> {
        let value = self.field(name)?;
        value
            .as_bool()
            .ok_or_else(|| self.mistyped(name, "boolean", value))
    }

    /// A float field as a decimal. Integers are accepted since Odoo may send
    /// `<int>` for whole amounts.
    ///
    /// # Errors
    ///
    /// Returns `OdooError::Mapping` if the field is not numeric.
    pub fn decimal(&self, name: &str) -> Result<Decimal, OdooError> {
        let value = self.field(name)?;
        match value {
            Value::Int(n) => Ok(Decimal::from(*n)),
            Value::Double(n) => Decimal::from_f64(*n)
                .ok_or_else(|| self.error(format!("field {name}: {n} is not representable"))),
            // Unset float fields read back as false on some models.
            Value::Bool(false) => Ok(Decimal::ZERO),
            other => Err(self.mistyped(name, "number", other)),
        }
    }

    /// # Errors
    ///
    /// Returns `OdooError::Mapping` unless the field is `[id, name]` or `false`.
    pub fn many2one(&self, name: &str) -> Result<Option<Many2One>, OdooError> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(value) => {
                Many2One::from_value(value).map_err(|e| self.error(format!("field {name}: {e}")))
            }
        }
    }
}

/// Map every record of a `search_read` result.
///
/// # Errors
///
/// Returns the first mapping error.
pub fn map_records<T: FromRecord>(records: &[Struct]) -> Result<Vec<T>, OdooError> {
    records.iter().map(T::from_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Struct {
        Struct::new()
            .with("id", 101_i64)
            .with("name", "Lavanda 10ml")
            .with("default_code", false)
            .with("standard_price", 55.5)
            .with("list_price", 120_i64)
            .with("active", true)
            .with("categ_id", vec![Value::Int(7), Value::from("Aceites")])
    }

    #[test]
    fn test_typed_accessors() {
        let fields = record();
        let r = Record::new("product.template", &fields);
        assert_eq!(r.int("id").expect("id"), 101);
        assert_eq!(r.string("name").expect("name"), "Lavanda 10ml");
        assert_eq!(r.optional_string("default_code").expect("code"), None);
        assert_eq!(r.optional_string("barcode").expect("absent"), None);
        assert!(r.bool("active").expect("active"));
        assert_eq!(r.decimal("standard_price").expect("price"), Decimal::new(555, 1));
        assert_eq!(r.decimal("list_price").expect("price"), Decimal::from(120));
        assert_eq!(r.many2one("categ_id").expect("categ").map(|c| c.id), Some(7));
    }

    #[test]
    fn test_mapping_errors_name_model_and_field() {
        let fields = record();
        let r = Record::new("product.template", &fields);

        let err = r.int("missing").expect_err("missing field");
        assert_eq!(
            err.to_string(),
            "Cannot map product.template record: missing field missing"
        );

        let err = r.int("name").expect_err("wrong type");
        assert!(err.to_string().contains("field name: expected int, got string"));
    }
}
