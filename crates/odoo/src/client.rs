//! Odoo XML-RPC client.
//!
//! Owns the transport and the authenticated session. Model operations go
//! through `execute_kw` on the object endpoint and authenticate lazily on
//! first use.

use std::sync::Arc;

use costos_core::xmlrpc::{MethodCall, Struct, Value};
use costos_core::{CompanyId, Cost, ProductId, UserId};
use secrecy::ExposeSecret;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::config::OdooConfig;
use crate::domain::Domain;
use crate::error::{OdooError, RpcCall};
use crate::transport::{Endpoint, XmlRpcTransport};

/// Default sort order for `search_read`.
pub const DEFAULT_ORDER: &str = "id asc";

/// Odoo XML-RPC client.
///
/// Cheap to clone; clones share the session.
///
/// # Authentication
///
/// The first call that needs a uid runs `authenticate` on the common
/// endpoint. The uid is cached until [`OdooClient::invalidate_session`], and
/// concurrent first calls wait on the same login instead of each sending one.
#[derive(Clone)]
pub struct OdooClient {
    inner: Arc<OdooClientInner>,
}

struct OdooClientInner {
    config: OdooConfig,
    transport: XmlRpcTransport,
    /// Cached uid; held locked for the whole login round trip
    uid: Mutex<Option<UserId>>,
}

impl std::fmt::Debug for OdooClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OdooClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Paging, ordering and context for `search_read`.
///
/// `limit` has no default: every caller states how many records it wants.
/// Odoo reads a limit of 0 as "no limit", so `search_read` rejects it.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReadOptions {
    pub limit: u32,
    pub offset: u32,
    pub order: String,
    pub context: Struct,
}

impl SearchReadOptions {
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            offset: 0,
            order: DEFAULT_ORDER.to_string(),
            context: Struct::new(),
        }
    }

    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = order.into();
        self
    }

    #[must_use]
    pub fn context(mut self, context: Struct) -> Self {
        self.context = context;
        self
    }

    fn to_kwargs(&self, fields: &[&str]) -> Struct {
        Struct::new()
            .with("fields", fields.to_vec())
            .with("offset", self.offset)
            .with("limit", self.limit)
            .with("order", self.order.as_str())
            .with("context", self.context.clone())
    }
}

/// Result of a `write`.
///
/// `Rejected` means the server answered `false`: the call went through but
/// nothing was written. Callers must branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    Applied,
    Rejected,
}

impl WriteOutcome {
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Outcome of [`OdooClient::test_connection`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Logged in.
    Connected {
        /// Authenticated user id.
        uid: UserId,
    },
    /// Login failed; `error` is the reason.
    Failed { error: String },
}

impl OdooClient {
    /// Create a client. No request is sent until the first call.
    ///
    /// # Errors
    ///
    /// Returns `OdooError` if the endpoint URLs or HTTP client cannot be built.
    pub fn new(config: OdooConfig) -> Result<Self, OdooError> {
        let transport = XmlRpcTransport::new(&config)?;

        Ok(Self {
            inner: Arc::new(OdooClientInner {
                config,
                transport,
                uid: Mutex::new(None),
            }),
        })
    }

    /// Create a client from `ODOO_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `OdooError::Config` if the configuration is missing or invalid.
    pub fn from_env() -> Result<Self, OdooError> {
        Self::new(OdooConfig::from_env()?)
    }

    #[must_use]
    pub fn config(&self) -> &OdooConfig {
        &self.inner.config
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Log in and cache the uid.
    ///
    /// Returns the cached uid without a round trip once logged in.
    ///
    /// # Errors
    ///
    /// Returns `OdooError::Authentication` if the server rejects the
    /// credentials (fault or non-positive uid). Transport, HTTP and decode
    /// failures are returned as they are.
    #[instrument(skip(self), fields(db = %self.inner.config.db, user = %self.inner.config.user))]
    pub async fn authenticate(&self) -> Result<UserId, OdooError> {
        let mut slot = self.inner.uid.lock().await;
        if let Some(uid) = *slot {
            return Ok(uid);
        }

        let config = &self.inner.config;
        let request = MethodCall::new(
            "authenticate",
            vec![
                Value::from(config.db.as_str()),
                Value::from(config.user.as_str()),
                Value::from(config.api_key.expose_secret()),
                Value::empty_struct(),
            ],
        );

        let result = match self.inner.transport.call(Endpoint::Common, &request).await {
            Ok(result) => result,
            Err(OdooError::Fault { message, .. }) => {
                warn!(%message, "Odoo rejected login");
                return Err(OdooError::Authentication(message));
            }
            Err(e) => return Err(e),
        };

        match result {
            Value::Int(id) if id > 0 => {
                let uid = UserId::new(id);
                info!(%uid, "Authenticated with Odoo");
                *slot = Some(uid);
                Ok(uid)
            }
            Value::Bool(false) => Err(OdooError::Authentication(
                "invalid database, login or API key".to_string(),
            )),
            other => Err(OdooError::Authentication(format!(
                "expected a positive uid, got {}",
                describe(&other)
            ))),
        }
    }

    /// The cached uid, if logged in.
    pub async fn uid(&self) -> Option<UserId> {
        *self.inner.uid.lock().await
    }

    /// Forget the cached uid; the next call logs in again.
    pub async fn invalidate_session(&self) {
        *self.inner.uid.lock().await = None;
    }

    /// Try to log in and report the result instead of failing.
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> ConnectionStatus {
        match self.authenticate().await {
            Ok(uid) => ConnectionStatus::Connected { uid },
            Err(e) => ConnectionStatus::Failed {
                error: e.to_string(),
            },
        }
    }

    // =========================================================================
    // Model Operations
    // =========================================================================

    async fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Struct,
    ) -> Result<(RpcCall, Value), OdooError> {
        let uid = self.authenticate().await?;
        let config = &self.inner.config;

        let request = MethodCall::new(
            "execute_kw",
            vec![
                Value::from(config.db.as_str()),
                Value::from(uid),
                Value::from(config.api_key.expose_secret()),
                Value::from(model),
                Value::from(method),
                Value::Array(args),
                Value::Struct(kwargs),
            ],
        );

        let result = self.inner.transport.call(Endpoint::Object, &request).await?;
        Ok((RpcCall::new(Endpoint::Object, &request), result))
    }

    /// Read records matching `domain`.
    ///
    /// Records come back in server order.
    ///
    /// # Errors
    ///
    /// Returns `OdooError` if the call fails or the result is not a list of
    /// structs.
    #[instrument(skip(self, domain, fields, options), fields(limit = options.limit, offset = options.offset))]
    pub async fn search_read(
        &self,
        model: &str,
        domain: &Domain,
        fields: &[&str],
        options: &SearchReadOptions,
    ) -> Result<Vec<Struct>, OdooError> {
        if options.limit == 0 {
            return Err(OdooError::InvalidArgument(format!(
                "search_read on {model} needs a limit of at least 1"
            )));
        }

        let (call, result) = self
            .execute_kw(
                model,
                "search_read",
                vec![domain.to_value()],
                options.to_kwargs(fields),
            )
            .await?;

        let records = match result {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Struct(record) => Ok(record),
                    other => Err(OdooError::UnexpectedResult {
                        call: call.clone(),
                        expected: "array of structs",
                        found: other.kind(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?,
            other => {
                return Err(OdooError::UnexpectedResult {
                    call,
                    expected: "array of structs",
                    found: other.kind(),
                });
            }
        };

        debug!(count = records.len(), "search_read returned records");
        Ok(records)
    }

    /// Count records matching `domain`.
    ///
    /// # Errors
    ///
    /// Returns `OdooError` if the call fails or the result is not an integer.
    #[instrument(skip(self, domain))]
    pub async fn search_count(&self, model: &str, domain: &Domain) -> Result<i64, OdooError> {
        let (call, result) = self
            .execute_kw(model, "search_count", vec![domain.to_value()], Struct::new())
            .await?;

        result.as_i64().ok_or_else(|| OdooError::UnexpectedResult {
            call,
            expected: "int",
            found: result.kind(),
        })
    }

    /// Write `values` to the records `ids`.
    ///
    /// # Errors
    ///
    /// Returns `OdooError` if the call fails or the server answers with
    /// anything but a boolean. A `false` answer is `Ok(WriteOutcome::Rejected)`.
    pub async fn write<I>(&self, model: &str, ids: I, values: Struct) -> Result<WriteOutcome, OdooError>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.write_with_context(model, ids, values, Struct::new())
            .await
    }

    /// [`OdooClient::write`] with an explicit Odoo context.
    ///
    /// # Errors
    ///
    /// See [`OdooClient::write`].
    #[instrument(skip_all, fields(model = %model))]
    pub async fn write_with_context<I>(
        &self,
        model: &str,
        ids: I,
        values: Struct,
        context: Struct,
    ) -> Result<WriteOutcome, OdooError>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let ids: Vec<Value> = ids.into_iter().map(Into::into).collect();
        let count = ids.len();
        let (call, result) = self
            .execute_kw(
                model,
                "write",
                vec![Value::Array(ids), Value::Struct(values)],
                Struct::new().with("context", context),
            )
            .await?;

        match result {
            Value::Bool(true) => Ok(WriteOutcome::Applied),
            Value::Bool(false) => {
                warn!(%call, count, "Odoo returned false for write");
                Ok(WriteOutcome::Rejected)
            }
            other => Err(OdooError::UnexpectedResult {
                call,
                expected: "boolean",
                found: other.kind(),
            }),
        }
    }

    /// Call any model method.
    ///
    /// Put an Odoo context under the `context` key of `kwargs`.
    ///
    /// # Errors
    ///
    /// Returns `OdooError` if the call fails.
    #[instrument(skip(self, args, kwargs))]
    pub async fn call(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Struct,
    ) -> Result<Value, OdooError> {
        let (_, result) = self.execute_kw(model, method, args, kwargs).await?;
        Ok(result)
    }

    /// Revalue products through Odoo's accounting-aware
    /// `product.template.change_standard_price`.
    ///
    /// Unlike writing `standard_price` directly, this posts the stock
    /// valuation entries for `company`.
    ///
    /// # Errors
    ///
    /// Returns `OdooError` if the call fails.
    #[instrument(skip(self, product_ids), fields(products = product_ids.len(), cost = %cost, company = %company))]
    pub async fn change_standard_price(
        &self,
        product_ids: &[ProductId],
        cost: Cost,
        company: CompanyId,
    ) -> Result<Value, OdooError> {
        let kwargs = Struct::new().with(
            "context",
            Struct::new().with("company_id", company),
        );
        self.call(
            "product.template",
            "change_standard_price",
            vec![Value::from(product_ids), cost.to_value()],
            kwargs,
        )
        .await
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Int(n) => n.to_string(),
        Value::String(s) => format!("{s:?}"),
        other => other.kind().to_string(),
    }
}
