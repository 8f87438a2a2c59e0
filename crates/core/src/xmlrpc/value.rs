//! The XML-RPC value model.

use std::fmt;

use super::error::ValueError;

/// A single XML-RPC value.
///
/// Integers and doubles are separate variants; the tag chosen on the wire
/// follows the variant. Use [`Value::number`] when the caller only has an
/// untyped number and wants integral values sent as `<int>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `<int>` (also decoded from `<i4>` and `<i8>`).
    Int(i64),
    /// `<double>`.
    Double(f64),
    /// `<boolean>`.
    Bool(bool),
    /// `<string>`, or a bare `<value>` with text content.
    String(String),
    /// `<array>`.
    Array(Vec<Self>),
    /// `<struct>`.
    Struct(Struct),
}

/// The tag category of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Double,
    Bool,
    String,
    Array,
    Struct,
}

impl ValueKind {
    /// The XML-RPC tag name for this kind.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Double => "double",
            Self::Bool => "boolean",
            Self::String => "string",
            Self::Array => "array",
            Self::Struct => "struct",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Value {
    /// Build a value from an untyped number.
    ///
    /// Mathematically integral, finite numbers inside the `i64` range become
    /// [`Value::Int`]; everything else becomes [`Value::Double`]. This means
    /// `5.0` is sent as `<int>5</int>`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn number(n: f64) -> Self {
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
        if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
            Self::Int(n as i64)
        } else {
            Self::Double(n)
        }
    }

    /// Fallback for types with no XML-RPC tag: send their `Display` output
    /// as a string. Lossy; the receiving side sees only text.
    #[must_use]
    pub fn display(value: impl fmt::Display) -> Self {
        Self::String(value.to_string())
    }

    /// An empty struct, e.g. the trailing `{}` argument of `authenticate`.
    #[must_use]
    pub fn empty_struct() -> Self {
        Self::Struct(Struct::new())
    }

    /// The tag category of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::Double(_) => ValueKind::Double,
            Self::Bool(_) => ValueKind::Bool,
            Self::String(_) => ValueKind::String,
            Self::Array(_) => ValueKind::Array,
            Self::Struct(_) => ValueKind::Struct,
        }
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view of the value; integers are widened to `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(n) => Some(*n),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_struct(&self) -> Option<&Struct> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is Odoo's `false` placeholder for an empty field.
    #[must_use]
    pub const fn is_false(&self) -> bool {
        matches!(self, Self::Bool(false))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Double(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<Struct> for Value {
    fn from(s: Struct) -> Self {
        Self::Struct(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Value>> From<&[T]> for Value {
    fn from(items: &[T]) -> Self {
        Self::Array(items.iter().cloned().map(Into::into).collect())
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = ValueError;

    /// Convert a JSON document, bucketing numbers by integrality.
    ///
    /// JSON `null` is rejected anywhere in the tree.
    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::Null => Err(ValueError::Null),
            serde_json::Value::Bool(b) => Ok(Self::Bool(b)),
            serde_json::Value::Number(n) => Ok(n
                .as_i64()
                .map_or_else(|| Self::number(n.as_f64().unwrap_or(f64::NAN)), Self::Int)),
            serde_json::Value::String(s) => Ok(Self::String(s)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(Self::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Array),
            serde_json::Value::Object(map) => {
                let mut members = Struct::with_capacity(map.len());
                for (name, value) in map {
                    members.insert(name, Self::try_from(value)?);
                }
                Ok(Self::Struct(members))
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Int(n) => Self::from(n),
            Value::Double(n) => serde_json::Number::from_f64(n).map_or(Self::Null, Self::Number),
            Value::Bool(b) => Self::Bool(b),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Into::into).collect()),
            Value::Struct(members) => Self::Object(
                members
                    .into_iter()
                    .map(|(name, value)| (name, value.into()))
                    .collect(),
            ),
        }
    }
}

/// An XML-RPC struct: unique member names in insertion order.
///
/// Inserting an existing name replaces its value in place, so the first
/// position is kept and the last write wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Struct {
    members: Vec<(String, Value)>,
}

impl Struct {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: Vec::with_capacity(capacity),
        }
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a member, returning the previous value for that name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        if let Some((_, slot)) = self.members.iter_mut().find(|(n, _)| *n == name) {
            return Some(std::mem::replace(slot, value));
        }
        self.members.push((name, value));
        None
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.members
            .iter()
            .find_map(|(n, v)| (n == name).then_some(v))
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.members.iter().position(|(n, _)| n == name)?;
        Some(self.members.remove(index).1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.members.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|(n, _)| n.as_str())
    }
}

impl IntoIterator for Struct {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Struct {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut members = Self::new();
        for (name, value) in iter {
            members.insert(name, value);
        }
        members
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_number_buckets_integral_values() {
        assert_eq!(Value::number(5.0), Value::Int(5));
        assert_eq!(Value::number(-3.0), Value::Int(-3));
        assert_eq!(Value::number(55.5), Value::Double(55.5));
        assert_eq!(Value::number(0.1), Value::Double(0.1));
    }

    #[test]
    fn test_number_keeps_out_of_range_as_double() {
        assert_eq!(Value::number(1e20), Value::Double(1e20));
        assert!(matches!(Value::number(f64::INFINITY), Value::Double(_)));
        assert!(matches!(Value::number(f64::NAN), Value::Double(_)));
    }

    #[test]
    fn test_typed_constructors_keep_their_variant() {
        assert_eq!(Value::from(5.0), Value::Double(5.0));
        assert_eq!(Value::from(5_i32), Value::Int(5));
        assert_eq!(Value::from("x"), Value::String("x".to_string()));
        assert_eq!(
            Value::from(vec![1_i64, 2]),
            Value::Array(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn test_display_fallback() {
        let value = Value::display(std::net::Ipv4Addr::LOCALHOST);
        assert_eq!(value, Value::String("127.0.0.1".to_string()));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int(7).as_i64(), Some(7));
        assert_eq!(Value::Int(7).as_f64(), Some(7.0));
        assert_eq!(Value::Double(1.5).as_i64(), None);
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::from("a").as_str(), Some("a"));
        assert!(Value::Bool(false).is_false());
        assert!(!Value::Int(0).is_false());
        assert_eq!(Value::empty_struct().kind(), ValueKind::Struct);
    }

    #[test]
    fn test_struct_last_write_wins_in_place() {
        let mut members = Struct::new().with("a", 1_i64).with("b", 2_i64);
        let previous = members.insert("a", 3_i64);

        assert_eq!(previous, Some(Value::Int(1)));
        assert_eq!(members.len(), 2);
        assert_eq!(members.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(members.get("a"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_struct_remove_and_lookup() {
        let mut members: Struct = [("x", 1_i64), ("y", 2_i64)].into_iter().collect();
        assert!(members.contains_key("x"));
        assert_eq!(members.remove("x"), Some(Value::Int(1)));
        assert!(!members.contains_key("x"));
        assert_eq!(members.remove("missing"), None);
        assert!(!members.is_empty());
    }

    #[test]
    fn test_from_json_buckets_numbers() {
        let value = Value::try_from(json!({
            "standard_price": 55.5,
            "qty": 5.0,
            "ids": [1, 2],
            "active": true,
            "name": "Silla"
        }))
        .expect("convert");

        let members = value.as_struct().expect("struct");
        assert_eq!(members.get("standard_price"), Some(&Value::Double(55.5)));
        assert_eq!(members.get("qty"), Some(&Value::Int(5)));
        assert_eq!(
            members.get("ids"),
            Some(&Value::Array(vec![Value::Int(1), Value::Int(2)]))
        );
        assert_eq!(members.get("active"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_from_json_rejects_null() {
        assert_eq!(Value::try_from(json!(null)), Err(ValueError::Null));
        assert_eq!(
            Value::try_from(json!({"parent_id": null})),
            Err(ValueError::Null)
        );
        assert_eq!(Value::try_from(json!([1, null])), Err(ValueError::Null));
    }

    #[test]
    fn test_into_json() {
        let value = Value::Struct(
            Struct::new()
                .with("id", 7_i64)
                .with("parent_id", Value::Bool(false))
                .with("price", 1.25),
        );
        let json: serde_json::Value = value.into();
        assert_eq!(json, json!({"id": 7, "parent_id": false, "price": 1.25}));
    }
}
