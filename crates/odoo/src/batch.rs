//! Batch cost updates.
//!
//! Applies a list of staged cost changes in fixed-size batches, with bounded
//! per-item concurrency and an optional pause between batches. Every item
//! gets its own status; nothing is retried, so a failed item is reported and
//! the run moves on.

use std::time::{Duration, Instant};

use costos_core::{CategoryId, Cost, ProductId};
use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{error, info, instrument, warn};

use crate::client::{OdooClient, WriteOutcome};
use crate::error::OdooError;
use crate::models::Product;

/// A staged change of one product's cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostChange {
    pub product_id: ProductId,
    /// Display name used in logs and reports
    #[serde(default)]
    pub label: String,
    /// Cost before the change, if known
    #[serde(default)]
    pub current: Option<Decimal>,
    pub new_cost: Cost,
    /// Name of the category change this item came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via_category: Option<String>,
}

impl CostChange {
    #[must_use]
    pub fn new(product_id: ProductId, new_cost: Cost) -> Self {
        Self {
            product_id,
            label: product_id.to_string(),
            current: None,
            new_cost,
            via_category: None,
        }
    }
}

/// A staged cost for every product of a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCostChange {
    pub category_id: CategoryId,
    #[serde(default)]
    pub label: String,
    pub new_cost: Cost,
}

impl CategoryCostChange {
    /// One [`CostChange`] per affected product.
    #[must_use]
    pub fn expand(&self, products: &[Product]) -> Vec<CostChange> {
        products
            .iter()
            .map(|product| CostChange {
                product_id: product.id,
                label: product.name.clone(),
                current: Some(product.standard_price),
                new_cost: self.new_cost,
                via_category: Some(self.label.clone()),
            })
            .collect()
    }
}

/// How a batch run is paced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Items per batch
    pub batch_size: usize,
    /// Writes in flight at once within a batch
    pub concurrency: usize,
    /// Pause after each batch except the last
    pub inter_batch_delay: Duration,
    /// Report what would be written without writing
    pub dry_run: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 10,
            concurrency: 1,
            inter_batch_delay: Duration::from_millis(100),
            dry_run: false,
        }
    }
}

impl BatchOptions {
    /// # Errors
    ///
    /// Returns `OdooError::InvalidArgument` if `batch_size` or `concurrency`
    /// is zero.
    pub fn validate(&self) -> Result<(), OdooError> {
        if self.batch_size == 0 {
            return Err(OdooError::InvalidArgument(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(OdooError::InvalidArgument(
                "concurrency must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-item result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum ItemStatus {
    Applied,
    /// Dry run; nothing was sent.
    DryRun,
    /// Odoo answered `false`.
    Rejected,
    /// The call failed.
    Failed(String),
}

impl ItemStatus {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Applied | Self::DryRun)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResult {
    pub change: CostChange,
    #[serde(flatten)]
    pub status: ItemStatus,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Outcome of a batch run, items in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub dry_run: bool,
    pub results: Vec<ItemResult>,
}

impl BatchReport {
    fn count(&self, f: impl Fn(&ItemStatus) -> bool) -> usize {
        self.results.iter().filter(|r| f(&r.status)).count()
    }

    #[must_use]
    pub fn applied(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Applied))
    }

    #[must_use]
    pub fn rejected(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Rejected))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Failed(_)))
    }

    /// Whether every item was applied (or would have been, in a dry run).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| r.status.is_success())
    }
}

/// Apply `changes` in batches.
///
/// Logs in once before the first write; in a dry run nothing is sent.
///
/// # Errors
///
/// Returns `OdooError::InvalidArgument` for invalid options and the login
/// error if authentication fails. Per-item failures are reported in the
/// [`BatchReport`] instead.
#[instrument(skip_all, fields(changes = changes.len(), dry_run = options.dry_run))]
pub async fn apply_cost_changes(
    client: &OdooClient,
    changes: Vec<CostChange>,
    options: &BatchOptions,
) -> Result<BatchReport, OdooError> {
    options.validate()?;

    let mut report = BatchReport {
        dry_run: options.dry_run,
        results: Vec::with_capacity(changes.len()),
    };
    if changes.is_empty() {
        return Ok(report);
    }

    if !options.dry_run {
        client.authenticate().await?;
    }

    let batches = changes.len().div_ceil(options.batch_size);
    for (index, batch) in changes.chunks(options.batch_size).enumerate() {
        info!(batch = index + 1, of = batches, items = batch.len(), "Processing batch");

        let results: Vec<ItemResult> = stream::iter(batch.iter().cloned())
            .map(|change| apply_one(client, change, options.dry_run))
            .buffered(options.concurrency)
            .collect()
            .await;
        report.results.extend(results);

        if index + 1 < batches && !options.inter_batch_delay.is_zero() {
            tokio::time::sleep(options.inter_batch_delay).await;
        }
    }

    info!(
        applied = report.applied(),
        rejected = report.rejected(),
        failed = report.failed(),
        "Batch run finished"
    );
    Ok(report)
}

async fn apply_one(client: &OdooClient, change: CostChange, dry_run: bool) -> ItemResult {
    let started = Instant::now();

    let status = if dry_run {
        info!(product = %change.product_id, label = %change.label, new_cost = %change.new_cost, "[dry run] Would update cost");
        ItemStatus::DryRun
    } else {
        match client
            .update_product_cost(change.product_id, change.new_cost)
            .await
        {
            Ok(WriteOutcome::Applied) => ItemStatus::Applied,
            Ok(WriteOutcome::Rejected) => {
                warn!(product = %change.product_id, label = %change.label, "Cost update rejected");
                ItemStatus::Rejected
            }
            Err(e) => {
                error!(product = %change.product_id, label = %change.label, error = %e, "Cost update failed");
                ItemStatus::Failed(e.to_string())
            }
        }
    };

    ItemResult {
        change,
        status,
        duration: started.elapsed(),
    }
}
