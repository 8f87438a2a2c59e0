//! Stub Odoo server for end-to-end client tests.
//!
//! Serves `/xmlrpc/2/common` and `/xmlrpc/2/object` on an ephemeral local
//! port, decodes every request with the real codec, records it, and answers
//! with canned replies.
//!
//! # Usage
//!
//! ```rust,no_run
//! use costos_core::xmlrpc::Value;
//! use costos_integration_tests::{StubOdoo, StubReply};
//!
//! # async fn example() -> std::io::Result<()> {
//! let stub = StubOdoo::start().await?;
//! stub.on_authenticate(StubReply::Value(Value::Int(42))).await;
//! stub.on_execute("product.template", "search_count", StubReply::Value(Value::Int(3))).await;
//!
//! let client = stub.client();
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use costos_core::xmlrpc::{Fault, MethodCall, MethodResponse, Value, parse_call};
use costos_odoo::{OdooClient, OdooConfig};
use secrecy::SecretString;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

pub const STUB_DB: &str = "test";
pub const STUB_USER: &str = "admin";
pub const STUB_API_KEY: &str = "stub-api-key";

/// What the stub answers to a call.
#[derive(Debug, Clone)]
pub enum StubReply {
    /// A successful response carrying this value.
    Value(Value),
    /// An XML-RPC fault.
    Fault { code: i64, message: String },
    /// This body verbatim with status 200.
    Raw(String),
    /// An HTTP error status with a plain-text body.
    Status(u16),
    /// The inner reply after a pause.
    Delayed(Duration, Box<StubReply>),
}

impl StubReply {
    #[must_use]
    pub fn fault(code: i64, message: impl Into<String>) -> Self {
        Self::Fault {
            code,
            message: message.into(),
        }
    }
}

/// One request as the stub received it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// `common` or `object`
    pub endpoint: String,
    pub call: MethodCall,
}

impl RecordedCall {
    /// `(model, method)` for `execute_kw` calls.
    #[must_use]
    pub fn target(&self) -> Option<(&str, &str)> {
        if self.call.method != "execute_kw" {
            return None;
        }
        let model = self.call.params.get(3)?.as_str()?;
        let method = self.call.params.get(4)?.as_str()?;
        Some((model, method))
    }
}

#[derive(Default)]
struct StubState {
    authenticate: RwLock<Option<StubReply>>,
    execute: RwLock<HashMap<(String, String), StubReply>>,
    /// Replies for `model.method` called with exact positional arguments
    execute_with_args: RwLock<Vec<(String, String, Value, StubReply)>>,
    calls: RwLock<Vec<RecordedCall>>,
}

/// A running stub server. Stops when dropped.
pub struct StubOdoo {
    addr: SocketAddr,
    state: Arc<StubState>,
    server: JoinHandle<()>,
}

impl StubOdoo {
    /// Bind to `127.0.0.1:0` and start serving.
    ///
    /// # Errors
    ///
    /// Returns the bind error.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(StubState::default());

        let app = Router::new()
            .route("/xmlrpc/2/{endpoint}", post(handle))
            .with_state(Arc::clone(&state));

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointing at this stub.
    ///
    /// # Panics
    ///
    /// Never in practice: the stub URL and fixed credentials are valid.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn config(&self) -> OdooConfig {
        OdooConfig::new(
            &self.url(),
            STUB_DB,
            STUB_USER,
            SecretString::from(STUB_API_KEY),
        )
        .expect("stub configuration is valid")
    }

    /// A fresh client (its own session) for this stub.
    ///
    /// # Panics
    ///
    /// If the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn client(&self) -> OdooClient {
        OdooClient::new(self.config()).expect("stub client")
    }

    /// Reply to `common.authenticate`.
    pub async fn on_authenticate(&self, reply: StubReply) {
        *self.state.authenticate.write().await = Some(reply);
    }

    /// Reply to `object.execute_kw` for `model.method`.
    pub async fn on_execute(&self, model: &str, method: &str, reply: StubReply) {
        self.state
            .execute
            .write()
            .await
            .insert((model.to_string(), method.to_string()), reply);
    }

    /// Reply to `object.execute_kw` for `model.method` when its positional
    /// arguments equal `args`. Takes precedence over [`Self::on_execute`].
    pub async fn on_execute_with_args(
        &self,
        model: &str,
        method: &str,
        args: Value,
        reply: StubReply,
    ) {
        self.state.execute_with_args.write().await.push((
            model.to_string(),
            method.to_string(),
            args,
            reply,
        ));
    }

    /// Every call received so far, in arrival order.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.read().await.clone()
    }

    /// Number of calls received on `endpoint` (`common` or `object`).
    pub async fn count(&self, endpoint: &str) -> usize {
        self.state
            .calls
            .read()
            .await
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .count()
    }

    /// `execute_kw` calls for `model.method`, in arrival order.
    pub async fn calls_to(&self, model: &str, method: &str) -> Vec<MethodCall> {
        self.state
            .calls
            .read()
            .await
            .iter()
            .filter(|c| c.target() == Some((model, method)))
            .map(|c| c.call.clone())
            .collect()
    }
}

impl Drop for StubOdoo {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    State(state): State<Arc<StubState>>,
    Path(endpoint): Path<String>,
    body: String,
) -> Response {
    let call = match parse_call(&body) {
        Ok(call) => call,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let recorded = RecordedCall { endpoint, call };
    let reply = match (recorded.endpoint.as_str(), recorded.call.method.as_str()) {
        ("common", "authenticate") => state.authenticate.read().await.clone(),
        ("object", "execute_kw") => match recorded.target() {
            Some((model, method)) => {
                let args = recorded.call.params.get(5);
                let exact = state
                    .execute_with_args
                    .read()
                    .await
                    .iter()
                    .find(|(m, name, expected, _)| {
                        m == model && name == method && Some(expected) == args
                    })
                    .map(|(_, _, _, reply)| reply.clone());
                match exact {
                    Some(reply) => Some(reply),
                    None => state
                        .execute
                        .read()
                        .await
                        .get(&(model.to_string(), method.to_string()))
                        .cloned(),
                }
            }
            None => None,
        },
        _ => None,
    };
    let reply = reply.unwrap_or_else(|| {
        StubReply::fault(
            1,
            format!(
                "no stub reply for {}.{}",
                recorded.endpoint, recorded.call.method
            ),
        )
    });

    state.calls.write().await.push(recorded);
    respond(reply).await
}

async fn respond(mut reply: StubReply) -> Response {
    loop {
        let xml = match reply {
            StubReply::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                reply = *inner;
                continue;
            }
            StubReply::Value(value) => MethodResponse::Success(value).to_xml(),
            StubReply::Fault { code, message } => {
                MethodResponse::Fault(Fault::new(code, message)).to_xml()
            }
            StubReply::Raw(body) => body,
            StubReply::Status(code) => {
                let status =
                    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                return (status, format!("stub error {code}")).into_response();
            }
        };

        return ([(header::CONTENT_TYPE, "text/xml")], xml).into_response();
    }
}
