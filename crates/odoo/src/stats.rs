//! Catalog overview: how many products and categories there are, how many
//! products still have no cost, and the cheapest and dearest products.

use costos_core::ProductId;
use costos_core::xmlrpc::Struct;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument};

use crate::catalog::stockable_products;
use crate::client::{OdooClient, SearchReadOptions};
use crate::domain::Domain;
use crate::error::OdooError;
use crate::models::{Category, FromRecord, Product, Record, map_records};

/// Products listed in each of the cheapest and dearest rankings.
pub const RANKING_SIZE: u32 = 10;

/// A product in a cost ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCost {
    pub id: ProductId,
    pub name: String,
    pub cost: Decimal,
}

impl FromRecord for ProductCost {
    const MODEL: &'static str = Product::MODEL;
    const FIELDS: &'static [&'static str] = &["id", "name", "standard_price"];

    fn from_record(record: &Struct) -> Result<Self, OdooError> {
        let r = Record::new(Self::MODEL, record);
        Ok(Self {
            id: ProductId::new(r.int("id")?),
            name: r.string("name")?,
            cost: r.decimal("standard_price")?,
        })
    }
}

/// Counts and cost rankings over active stockable products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub total_products: i64,
    pub total_categories: i64,
    /// Products whose cost is still zero
    pub zero_cost_products: i64,
    /// Cheapest products with a cost, ascending
    pub lowest_cost: Vec<ProductCost>,
    /// Dearest products, descending
    pub highest_cost: Vec<ProductCost>,
}

impl OdooClient {
    /// Gather the catalog overview. The five queries run concurrently.
    ///
    /// # Errors
    ///
    /// Returns `OdooError` if any query fails or a record cannot be mapped.
    #[instrument(skip(self))]
    pub async fn catalog_stats(&self) -> Result<CatalogStats, OdooError> {
        let zero_cost = stockable_products().equals("standard_price", 0_i64);
        let with_cost = stockable_products().with("standard_price", ">", 0_i64);
        let stockable = stockable_products();
        let all_categories = Domain::new();

        let (total_products, total_categories, zero_cost_products, lowest_cost, highest_cost) = tokio::try_join!(
            self.search_count(Product::MODEL, &stockable),
            self.search_count(Category::MODEL, &all_categories),
            self.search_count(Product::MODEL, &zero_cost),
            self.cost_ranking(&with_cost, "standard_price asc"),
            self.cost_ranking(&stockable, "standard_price desc"),
        )?;

        info!(
            total_products,
            total_categories,
            zero_cost_products,
            "Loaded catalog statistics"
        );
        Ok(CatalogStats {
            total_products,
            total_categories,
            zero_cost_products,
            lowest_cost,
            highest_cost,
        })
    }

    async fn cost_ranking(&self, domain: &Domain, order: &str) -> Result<Vec<ProductCost>, OdooError> {
        let records = self
            .search_read(
                ProductCost::MODEL,
                domain,
                ProductCost::FIELDS,
                &SearchReadOptions::new(RANKING_SIZE).order(order),
            )
            .await?;
        map_records(&records)
    }
}
