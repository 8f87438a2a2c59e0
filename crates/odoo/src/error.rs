//! Error types for the Odoo client.

use std::fmt;

use costos_core::xmlrpc::{DecodeError, MethodCall, ValueKind};
use thiserror::Error;

use crate::config::ConfigError;
use crate::transport::Endpoint;

/// Identifies a single RPC call in errors and logs.
///
/// For `execute_kw` the target model and method are recorded too, so a failed
/// write reads as `object.execute_kw(product.template.write)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcCall {
    pub endpoint: Endpoint,
    pub method: String,
    /// `model.method` for `execute_kw` calls.
    pub target: Option<String>,
}

impl RpcCall {
    #[must_use]
    pub fn new(endpoint: Endpoint, request: &MethodCall) -> Self {
        let target = (request.method == "execute_kw")
            .then(|| match (request.params.get(3), request.params.get(4)) {
                (Some(model), Some(method)) => model
                    .as_str()
                    .zip(method.as_str())
                    .map(|(model, method)| format!("{model}.{method}")),
                _ => None,
            })
            .flatten();

        Self {
            endpoint,
            method: request.method.clone(),
            target,
        }
    }
}

impl fmt::Display for RpcCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.endpoint, self.method)?;
        if let Some(target) = &self.target {
            write!(f, "({target})")?;
        }
        Ok(())
    }
}

/// Errors that can occur when talking to Odoo.
#[derive(Debug, Error)]
pub enum OdooError {
    /// Connection settings are missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The request never produced a response (connection refused, timeout).
    #[error("{call}: request failed: {source}")]
    Transport {
        call: RpcCall,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("{call}: HTTP {status}: {body}")]
    HttpStatus {
        call: RpcCall,
        status: reqwest::StatusCode,
        /// Leading part of the response body.
        body: String,
    },

    /// The server answered with an XML-RPC fault.
    #[error("{call}: fault {code}: {message}")]
    Fault {
        call: RpcCall,
        code: i64,
        message: String,
    },

    /// The response body is not a recognizable XML-RPC response.
    #[error("{call}: {source} in response {snippet:?}")]
    Decode {
        call: RpcCall,
        #[source]
        source: DecodeError,
        /// Leading part of the offending payload.
        snippet: String,
    },

    /// `authenticate` was rejected or returned something other than a uid.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The call succeeded but the result has the wrong shape.
    #[error("{call}: expected {expected}, got {found}")]
    UnexpectedResult {
        call: RpcCall,
        expected: &'static str,
        found: ValueKind,
    },

    /// A record could not be mapped into a domain type.
    #[error("Cannot map {model} record: {message}")]
    Mapping {
        model: &'static str,
        message: String,
    },

    /// A caller-supplied argument is out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl OdooError {
    /// The RPC call this error belongs to, if any.
    #[must_use]
    pub const fn call(&self) -> Option<&RpcCall> {
        match self {
            Self::Transport { call, .. }
            | Self::HttpStatus { call, .. }
            | Self::Fault { call, .. }
            | Self::Decode { call, .. }
            | Self::UnexpectedResult { call, .. } => Some(call),
            _ => None,
        }
    }

    /// The server's fault string, for faults and rejected logins.
    #[must_use]
    pub fn fault_message(&self) -> Option<&str> {
        match self {
            Self::Fault { message, .. } | Self::Authentication(message) => Some(message),
            _ => None,
        }
    }

    /// Whether the request timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_timeout())
    }
}
