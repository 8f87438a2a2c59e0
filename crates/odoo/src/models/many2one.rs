//! Odoo's many2one reference convention.

use costos_core::xmlrpc::Value;
use serde::Serialize;

/// A resolved many2one reference.
///
/// Odoo reads a many2one field as `[id, "Display Name"]`, or as `false`
/// when the reference is unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Many2One {
    pub id: i64,
    pub name: String,
}

impl Many2One {
    /// Interpret a field value.
    ///
    /// Returns `Ok(None)` for `false`.
    ///
    /// # Errors
    ///
    /// Returns a description of the value if it is neither `false` nor an
    /// `[id, name]` pair.
    pub fn from_value(value: &Value) -> Result<Option<Self>, String> {
        if value.is_false() {
            return Ok(None);
        }
        match value.as_array() {
            Some([Value::Int(id), Value::String(name)]) => Ok(Some(Self {
                id: *id,
                name: name.clone(),
            })),
            // Some servers send `[id, false]` when the target has no display name.
            Some([Value::Int(id), Value::Bool(false)]) => Ok(Some(Self {
                id: *id,
                name: String::new(),
            })),
            _ => Err(format!(
                "expected [id, name] or false, got {}",
                value.kind()
            )),
        }
    }

    /// Split into the flattened `(id, name)` pair used by domain records.
    #[must_use]
    pub fn split(reference: Option<Self>) -> (Option<i64>, Option<String>) {
        reference.map_or((None, None), |r| (Some(r.id), Some(r.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_parsed() {
        let value = Value::Array(vec![Value::Int(7), Value::from("Aceites esenciales")]);
        let reference = Many2One::from_value(&value).expect("valid");
        assert_eq!(
            reference,
            Some(Many2One {
                id: 7,
                name: "Aceites esenciales".to_string()
            })
        );
        assert_eq!(
            Many2One::split(reference),
            (Some(7), Some("Aceites esenciales".to_string()))
        );
    }

    #[test]
    fn test_false_is_unset() {
        let reference = Many2One::from_value(&Value::Bool(false)).expect("valid");
        assert_eq!(reference, None);
        assert_eq!(Many2One::split(reference), (None, None));
    }

    #[test]
    fn test_other_shapes_are_rejected() {
        assert!(Many2One::from_value(&Value::Int(7)).is_err());
        assert!(Many2One::from_value(&Value::Bool(true)).is_err());
        assert!(Many2One::from_value(&Value::Array(vec![Value::Int(7)])).is_err());
    }
}
