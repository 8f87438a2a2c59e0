//! Odoo search domains.
//!
//! A domain is a list of `(field, operator, value)` triples that Odoo joins
//! with an implicit AND. On the wire each triple is a three-element array.

use costos_core::xmlrpc::Value;

/// One `(field, operator, value)` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: String,
    pub value: Value,
}

impl From<Condition> for Value {
    fn from(condition: Condition) -> Self {
        Self::Array(vec![
            Self::String(condition.field),
            Self::String(condition.operator),
            condition.value,
        ])
    }
}

/// An AND-ed list of conditions. The empty domain matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Domain {
    conditions: Vec<Condition>,
}

impl Domain {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }

    /// Add a condition with an arbitrary operator.
    #[must_use]
    pub fn with(
        mut self,
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn equals(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, "=", value)
    }

    /// Case-insensitive substring match.
    #[must_use]
    pub fn ilike(self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.with(field, "ilike", Value::String(pattern.into()))
    }

    /// Append the conditions of `other` after this domain's own.
    #[must_use]
    pub fn and(mut self, other: Self) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Array(self.conditions.iter().cloned().map(Value::from).collect())
    }
}

impl From<Domain> for Value {
    fn from(domain: Domain) -> Self {
        Self::Array(domain.conditions.into_iter().map(Self::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use costos_core::xmlrpc::encode_value;

    use super::*;

    #[test]
    fn test_empty_domain_is_empty_array() {
        assert_eq!(Domain::new().to_value(), Value::Array(vec![]));
        assert!(Domain::default().is_empty());
    }

    #[test]
    fn test_condition_shape() {
        let domain = Domain::new().equals("active", true).ilike("name", "aceite");
        assert_eq!(domain.len(), 2);
        assert_eq!(
            domain.to_value(),
            Value::Array(vec![
                Value::Array(vec![
                    Value::from("active"),
                    Value::from("="),
                    Value::Bool(true)
                ]),
                Value::Array(vec![
                    Value::from("name"),
                    Value::from("ilike"),
                    Value::from("aceite")
                ]),
            ])
        );
    }

    #[test]
    fn test_and_keeps_base_conditions_first() {
        let base = Domain::new().equals("active", true);
        let combined = base.and(Domain::new().equals("categ_id", 7_i64));
        let fields: Vec<_> = combined
            .conditions()
            .iter()
            .map(|c| c.field.as_str())
            .collect();
        assert_eq!(fields, ["active", "categ_id"]);
    }

    #[test]
    fn test_domain_wire_format() {
        let domain = Domain::new().with("id", "in", vec![1_i64, 2]);
        assert_eq!(
            encode_value(&Value::from(domain)),
            concat!(
                "<array><data><value><array><data>",
                "<value><string>id</string></value>",
                "<value><string>in</string></value>",
                "<value><array><data><value><int>1</int></value><value><int>2</int></value></data></array></value>",
                "</data></array></value></data></array>"
            )
        );
    }
}
