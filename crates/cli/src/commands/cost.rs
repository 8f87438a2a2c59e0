//! Cost changes: one product, or a staged change set from a file.

use std::path::Path;

use costos_core::{CompanyId, Cost, ProductId};
use costos_odoo::{
    BatchOptions, CategoryCostChange, CostChange, OdooClient, ProductQuery, WriteOutcome,
    apply_cost_changes,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::{CliError, client, print_json};

/// Staged changes as saved by the cost editor.
///
/// ```json
/// {
///   "products": [{ "product_id": 101, "new_cost": "55.50" }],
///   "categories": [{ "category_id": 7, "label": "Aceites", "new_cost": "12" }]
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangeSet {
    #[serde(default)]
    pub products: Vec<CostChange>,
    #[serde(default)]
    pub categories: Vec<CategoryCostChange>,
}

impl ChangeSet {
    /// Parse a change set from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `CliError::InvalidInput` if the JSON does not describe a
    /// change set.
    pub fn parse(text: &str) -> Result<Self, CliError> {
        serde_json::from_str(text).map_err(|e| CliError::InvalidInput {
            what: "change set",
            message: e.to_string(),
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.categories.is_empty()
    }

    /// Product changes first, then every product of each category change.
    ///
    /// A product staged directly wins over the same product reached through
    /// a category.
    async fn expand(self, client: &OdooClient, category_limit: u32) -> Result<Vec<CostChange>, CliError> {
        let mut changes = self.products;
        for category in &self.categories {
            let products = client
                .get_products(&ProductQuery::new(category_limit).category(category.category_id))
                .await?;
            if products.len() >= category_limit as usize {
                warn!(
                    category = %category.category_id,
                    limit = category_limit,
                    "Category may have more products than were fetched"
                );
            }
            for change in category.expand(&products) {
                if !changes.iter().any(|c| c.product_id == change.product_id) {
                    changes.push(change);
                }
            }
        }
        Ok(changes)
    }
}

/// Set the cost of one product.
///
/// With `company`, the cost goes through `change_standard_price` so Odoo
/// posts the valuation entries; otherwise `standard_price` is written.
///
/// # Errors
///
/// Returns `CliError` if the call fails or Odoo rejects the write.
pub async fn set_cost(product: i64, cost: Cost, company: Option<i64>) -> Result<(), CliError> {
    let client = client()?;
    let product = ProductId::new(product);

    match company {
        Some(company) => {
            let company = CompanyId::new(company);
            client
                .change_standard_price(&[product], cost, company)
                .await?;
            info!(%product, %cost, %company, "Product revalued");
        }
        None => {
            if client.update_product_cost(product, cost).await? == WriteOutcome::Rejected {
                return Err(CliError::WriteRejected(product));
            }
            info!(%product, %cost, "Product cost updated");
        }
    }

    print_json(&json!({ "product_id": product, "new_cost": cost }))
}

/// Apply a change set file in paced batches and print the report.
///
/// # Errors
///
/// Returns `CliError` if the file cannot be read or parsed, the login fails,
/// or any item is not applied.
pub async fn apply(file: &Path, options: &BatchOptions, category_limit: u32) -> Result<(), CliError> {
    let text = std::fs::read_to_string(file).map_err(|source| CliError::ReadFile {
        path: file.to_path_buf(),
        source,
    })?;
    let change_set = ChangeSet::parse(&text)?;
    if change_set.is_empty() {
        warn!(file = %file.display(), "No changes to apply");
        return print_json(&json!({ "dry_run": options.dry_run, "results": [] }));
    }

    let client = client()?;
    let changes = change_set.expand(&client, category_limit).await?;
    info!(
        changes = changes.len(),
        dry_run = options.dry_run,
        "Applying cost changes"
    );

    let report = apply_cost_changes(&client, changes, options).await?;
    print_json(&report)?;

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::BatchIncomplete {
            failed: report.rejected() + report.failed(),
            total: report.results.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_parse_change_set() {
        let change_set = ChangeSet::parse(
            r#"{
                "products": [
                    { "product_id": 101, "new_cost": "55.50", "label": "Lavanda 10ml" },
                    { "product_id": 102, "new_cost": 12 }
                ],
                "categories": [
                    { "category_id": 7, "label": "Aceites", "new_cost": "9.9" }
                ]
            }"#,
        )
        .expect("valid change set");

        assert_eq!(change_set.products.len(), 2);
        assert_eq!(change_set.products[0].product_id, ProductId::new(101));
        assert_eq!(change_set.products[0].new_cost.amount(), Decimal::new(5550, 2));
        assert_eq!(change_set.products[1].label, "");
        assert_eq!(change_set.categories[0].category_id, costos_core::CategoryId::new(7));
    }

    #[test]
    fn test_parse_change_set_defaults_to_empty() {
        let change_set = ChangeSet::parse("{}").expect("empty change set");
        assert!(change_set.is_empty());
    }

    #[test]
    fn test_parse_change_set_rejects_invalid_cost() {
        let err = ChangeSet::parse(r#"{ "products": [{ "product_id": 1, "new_cost": "0" }] }"#)
            .expect_err("zero cost");
        assert!(matches!(err, CliError::InvalidInput { what: "change set", .. }));
    }

    #[test]
    fn test_parse_change_set_rejects_unknown_keys() {
        assert!(ChangeSet::parse(r#"{ "product": [] }"#).is_err());
    }
}
