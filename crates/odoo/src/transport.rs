//! XML-RPC over HTTP.
//!
//! One request is one `POST` of a `methodCall` document; the response body is
//! decoded with the codec from `costos-core`. Nothing here retries.

use std::fmt;

use costos_core::xmlrpc::{MethodCall, Value, parse_response};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};
use url::Url;

use crate::config::{ConfigError, OdooConfig};
use crate::error::{OdooError, RpcCall};

const USER_AGENT: &str = concat!("costos/", env!("CARGO_PKG_VERSION"));

/// Longest slice of a bad response body kept in an error.
const SNIPPET_CHARS: usize = 256;

/// The two XML-RPC services Odoo exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `/xmlrpc/2/common`: authentication and server info
    Common,
    /// `/xmlrpc/2/object`: `execute_kw` for every model operation
    Object,
}

impl Endpoint {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Common => "xmlrpc/2/common",
            Self::Object => "xmlrpc/2/object",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// HTTP transport bound to one Odoo server.
#[derive(Debug, Clone)]
pub struct XmlRpcTransport {
    http: reqwest::Client,
    common_url: Url,
    object_url: Url,
}

impl XmlRpcTransport {
    /// Create a transport for the configured server.
    ///
    /// # Errors
    ///
    /// Returns `OdooError::HttpClient` if the HTTP client cannot be built.
    pub fn new(config: &OdooConfig) -> Result<Self, OdooError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(OdooError::HttpClient)?;

        let join = |endpoint: Endpoint| {
            config.url.join(endpoint.path()).map_err(|e| {
                ConfigError::InvalidUrl(config.url.to_string(), e.to_string())
            })
        };

        Ok(Self {
            http,
            common_url: join(Endpoint::Common)?,
            object_url: join(Endpoint::Object)?,
        })
    }

    #[must_use]
    pub const fn endpoint_url(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::Common => &self.common_url,
            Endpoint::Object => &self.object_url,
        }
    }

    /// Send one method call and decode its result.
    ///
    /// # Errors
    ///
    /// Every error carries the [`RpcCall`] that failed:
    /// - `OdooError::Transport` if the request could not be sent or timed out
    /// - `OdooError::HttpStatus` for a non-2xx response
    /// - `OdooError::Decode` if the body is not an XML-RPC response
    /// - `OdooError::Fault` if the server answered with a fault
    #[instrument(skip_all, fields(call = %RpcCall::new(endpoint, request)))]
    pub async fn call(&self, endpoint: Endpoint, request: &MethodCall) -> Result<Value, OdooError> {
        let call = RpcCall::new(endpoint, request);
        let body = request.to_xml();
        debug!(bytes = body.len(), "Sending XML-RPC request");

        let response = self
            .http
            .post(self.endpoint_url(endpoint).clone())
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await
            .map_err(|source| OdooError::Transport {
                call: call.clone(),
                source,
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| OdooError::Transport {
                call: call.clone(),
                source,
            })?;
        debug!(%status, bytes = text.len(), "Received XML-RPC response");

        if !status.is_success() {
            return Err(OdooError::HttpStatus {
                call,
                status,
                body: snippet(&text),
            });
        }

        let decoded = parse_response(&text).map_err(|source| OdooError::Decode {
            call: call.clone(),
            source,
            snippet: snippet(&text),
        })?;

        decoded.into_result().map_err(|fault| OdooError::Fault {
            call,
            code: fault.code,
            message: fault.message,
        })
    }
}

/// First [`SNIPPET_CHARS`] characters of `body`, marked when cut.
pub(crate) fn snippet(body: &str) -> String {
    let mut chars = body.chars();
    let mut out: String = chars.by_ref().take(SNIPPET_CHARS).collect();
    if chars.next().is_some() {
        out.push_str("...");
    }
    out
}
