//! Method call and response envelopes.

use thiserror::Error;

use super::encode::{escape, write_value};
use super::value::{Struct, Value};

const XML_DECLARATION: &str = r#"<?xml version="1.0"?>"#;

/// An XML-RPC request: method name plus positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub params: Vec<Value>,
}

impl MethodCall {
    #[must_use]
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// Render the `<methodCall>` document.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(128);
        out.push_str(XML_DECLARATION);
        out.push_str("<methodCall><methodName>");
        out.push_str(&escape(&self.method));
        out.push_str("</methodName><params>");
        for param in &self.params {
            out.push_str("<param><value>");
            write_value(&mut out, param);
            out.push_str("</value></param>");
        }
        out.push_str("</params></methodCall>");
        out
    }
}

/// A remote XML-RPC fault.
///
/// `code` is best effort: servers that send no integer `faultCode` yield `0`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Fault {
    pub code: i64,
    pub message: String,
}

impl Fault {
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Interpret a decoded fault value.
    ///
    /// `faultString` must be a string. `faultCode` may be an integer or a
    /// numeric string; anything else becomes `0`.
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        let members = value.as_struct()?;
        let message = members.get("faultString")?.as_str()?.to_owned();
        let code = members
            .get("faultCode")
            .and_then(|code| match code {
                Value::Int(n) => Some(*n),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .unwrap_or(0);
        Some(Self { code, message })
    }

    fn to_value(&self) -> Value {
        Value::Struct(
            Struct::new()
                .with("faultCode", self.code)
                .with("faultString", self.message.as_str()),
        )
    }
}

/// An XML-RPC response: either one value or a fault.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Success(Value),
    Fault(Fault),
}

impl MethodResponse {
    /// Split into the returned value or the remote fault.
    ///
    /// # Errors
    ///
    /// Returns the [`Fault`] when the server answered with one.
    pub fn into_result(self) -> Result<Value, Fault> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Fault(fault) => Err(fault),
        }
    }

    /// Render the `<methodResponse>` document.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(128);
        out.push_str(XML_DECLARATION);
        out.push_str("<methodResponse>");
        match self {
            Self::Success(value) => {
                out.push_str("<params><param><value>");
                write_value(&mut out, value);
                out.push_str("</value></param></params>");
            }
            Self::Fault(fault) => {
                out.push_str("<fault><value>");
                write_value(&mut out, &fault.to_value());
                out.push_str("</value></fault>");
            }
        }
        out.push_str("</methodResponse>");
        out
    }
}

impl From<Value> for MethodResponse {
    fn from(value: Value) -> Self {
        Self::Success(value)
    }
}

impl From<Fault> for MethodResponse {
    fn from(fault: Fault) -> Self {
        Self::Fault(fault)
    }
}
