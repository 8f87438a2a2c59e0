//! Price analysis for a category.
//!
//! Before a category-wide cost change the editor looks at what the products
//! of the category currently cost. Zero costs are treated as "not set".

use costos_core::CategoryId;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument};

use crate::catalog::ProductQuery;
use crate::client::OdooClient;
use crate::error::OdooError;
use crate::models::Product;

/// How the current costs of a category relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceConsistency {
    /// The category has no products.
    NoProducts,
    /// Every product costs zero.
    AllZero,
    /// Every product with a cost has the same one.
    Uniform { price: Decimal },
    /// Costs differ.
    Mixed { min: Decimal, max: Decimal },
}

/// What the editor should offer for the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// No costs yet: ask for a base cost.
    SetBaseCost,
    /// Pre-fill the shared cost.
    AutoFill,
    /// Let the user pick.
    ManualDecision,
}

/// Summary of the costs in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceAnalysis {
    pub product_count: usize,
    pub consistency: PriceConsistency,
    /// Distinct positive costs, ascending; `[0]` when all are zero.
    pub unique_prices: Vec<Decimal>,
    pub suggested_action: Option<SuggestedAction>,
}

impl PriceAnalysis {
    /// Analyze a list of costs, one per product.
    #[must_use]
    pub fn from_prices(prices: &[Decimal]) -> Self {
        let product_count = prices.len();
        if product_count == 0 {
            return Self {
                product_count,
                consistency: PriceConsistency::NoProducts,
                unique_prices: Vec::new(),
                suggested_action: None,
            };
        }

        let mut unique: Vec<Decimal> = prices
            .iter()
            .filter(|price| price.is_sign_positive() && !price.is_zero())
            .map(|price| price.normalize())
            .collect();
        unique.sort_unstable();
        unique.dedup();

        let (consistency, suggested_action) = match unique.as_slice() {
            [] => (PriceConsistency::AllZero, SuggestedAction::SetBaseCost),
            [price] => (
                PriceConsistency::Uniform { price: *price },
                SuggestedAction::AutoFill,
            ),
            [min, .., max] => (
                PriceConsistency::Mixed {
                    min: *min,
                    max: *max,
                },
                SuggestedAction::ManualDecision,
            ),
        };
        if unique.is_empty() {
            unique.push(Decimal::ZERO);
        }

        Self {
            product_count,
            consistency,
            unique_prices: unique,
            suggested_action: Some(suggested_action),
        }
    }

    /// Analyze mapped products.
    #[must_use]
    pub fn from_products(products: &[Product]) -> Self {
        let prices: Vec<Decimal> = products.iter().map(|p| p.standard_price).collect();
        Self::from_prices(&prices)
    }

    #[must_use]
    pub const fn has_products(&self) -> bool {
        self.product_count > 0
    }

    /// The shared cost, when there is one.
    #[must_use]
    pub const fn uniform_price(&self) -> Option<Decimal> {
        match self.consistency {
            PriceConsistency::Uniform { price } => Some(price),
            _ => None,
        }
    }

    /// One-line description for operators.
    #[must_use]
    pub fn message(&self) -> String {
        match self.consistency {
            PriceConsistency::NoProducts => "No products in this category".to_string(),
            PriceConsistency::AllZero => "Every product has a cost of $0".to_string(),
            PriceConsistency::Uniform { price } => {
                format!("Every product has the same cost: ${price:.2}")
            }
            PriceConsistency::Mixed { min, max } => format!(
                "Mixed costs: ${min:.2} - ${max:.2} ({} distinct)",
                self.unique_prices.len()
            ),
        }
    }
}

impl OdooClient {
    /// Fetch up to `limit` products of `category` and analyze their costs.
    ///
    /// # Errors
    ///
    /// Returns `OdooError` if the products cannot be fetched.
    #[instrument(skip(self))]
    pub async fn analyze_category(
        &self,
        category: CategoryId,
        limit: u32,
    ) -> Result<PriceAnalysis, OdooError> {
        let products = self
            .get_products(&ProductQuery::new(limit).category(category))
            .await?;
        let analysis = PriceAnalysis::from_products(&products);
        info!(
            products = analysis.product_count,
            distinct = analysis.unique_prices.len(),
            "{}",
            analysis.message()
        );
        Ok(analysis)
    }
}
