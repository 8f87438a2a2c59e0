//! Catalog operations: categories, products and cost updates.
//!
//! Thin wrappers over the client primitives that apply the filters the cost
//! editor always wants and map records into [`Category`] and [`Product`].

use costos_core::xmlrpc::Struct;
use costos_core::{CategoryId, CompanyId, Cost, ProductId};
use futures::{StreamExt, TryStreamExt, stream};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::client::{OdooClient, SearchReadOptions, WriteOutcome};
use crate::domain::Domain;
use crate::error::OdooError;
use crate::models::{Category, FromRecord, Product, map_records};

/// Sort order for catalog listings.
pub const CATALOG_ORDER: &str = "name asc";

/// Product counts requested at once when listing categories with counts.
const COUNT_CONCURRENCY: usize = 4;

/// Active stockable products: the base of every product domain.
pub(crate) fn stockable_products() -> Domain {
    Domain::new()
        .equals("active", true)
        .equals("type", "product")
}

/// Context selecting the company whose costs are read or written.
fn company_context(company: Option<CompanyId>) -> Struct {
    company.map_or_else(Struct::new, |id| Struct::new().with("company_id", id))
}

/// Filters for listing categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryQuery {
    pub limit: u32,
    pub offset: u32,
    /// Case-insensitive match on the category name
    pub search: Option<String>,
    pub company: Option<CompanyId>,
}

impl CategoryQuery {
    #[must_use]
    pub const fn new(limit: u32) -> Self {
        Self {
            limit,
            offset: 0,
            search: None,
            company: None,
        }
    }

    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    #[must_use]
    pub const fn company(mut self, company: CompanyId) -> Self {
        self.company = Some(company);
        self
    }

    /// Categories have no `active` field, so only the search applies.
    #[must_use]
    pub fn domain(&self) -> Domain {
        match &self.search {
            Some(text) => Domain::new().ilike("name", text.as_str()),
            None => Domain::new(),
        }
    }

    fn options(&self) -> SearchReadOptions {
        SearchReadOptions::new(self.limit)
            .offset(self.offset)
            .order(CATALOG_ORDER)
            .context(company_context(self.company))
    }
}

/// Filters for listing stockable products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub limit: u32,
    pub offset: u32,
    pub category: Option<CategoryId>,
    /// Case-insensitive match on the product name
    pub search: Option<String>,
    pub company: Option<CompanyId>,
}

impl ProductQuery {
    #[must_use]
    pub const fn new(limit: u32) -> Self {
        Self {
            limit,
            offset: 0,
            category: None,
            search: None,
            company: None,
        }
    }

    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub const fn category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    #[must_use]
    pub const fn company(mut self, company: CompanyId) -> Self {
        self.company = Some(company);
        self
    }

    /// Active stockable products, then the optional filters.
    #[must_use]
    pub fn domain(&self) -> Domain {
        let mut filters = Domain::new();
        if let Some(category) = self.category {
            filters = filters.equals("categ_id", category);
        }
        if let Some(text) = &self.search {
            filters = filters.ilike("name", text.as_str());
        }
        stockable_products().and(filters)
    }

    fn options(&self) -> SearchReadOptions {
        SearchReadOptions::new(self.limit)
            .offset(self.offset)
            .order(CATALOG_ORDER)
            .context(company_context(self.company))
    }
}

/// A category with the number of active stockable products filed directly
/// under it (subcategories are not included).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    pub products_count: i64,
}

impl OdooClient {
    // =========================================================================
    // Categories
    // =========================================================================

    /// List product categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `OdooError` if the call fails or a record cannot be mapped.
    #[instrument(skip(self))]
    pub async fn get_categories(&self, query: &CategoryQuery) -> Result<Vec<Category>, OdooError> {
        let records = self
            .search_read(Category::MODEL, &query.domain(), Category::FIELDS, &query.options())
            .await?;
        map_records(&records)
    }

    /// List categories with their product counts.
    ///
    /// With `only_with_products`, empty categories are dropped before paging,
    /// so `query.offset` and `query.limit` apply to the non-empty ones.
    /// Categories are then scanned page by page until enough are found.
    ///
    /// # Errors
    ///
    /// Returns `OdooError` if any call fails or a record cannot be mapped.
    #[instrument(skip(self))]
    pub async fn get_categories_with_counts(
        &self,
        query: &CategoryQuery,
        only_with_products: bool,
    ) -> Result<Vec<CategoryWithCount>, OdooError> {
        if !only_with_products {
            let categories = self.get_categories(query).await?;
            return self.with_product_counts(categories, query.company).await;
        }

        let wanted = query.offset as usize + query.limit as usize;
        let mut scan = query.clone().offset(0);
        let mut found = Vec::new();
        loop {
            let categories = self.get_categories(&scan).await?;
            let exhausted = categories.len() < scan.limit as usize;
            found.extend(
                self.with_product_counts(categories, query.company)
                    .await?
                    .into_iter()
                    .filter(|c| c.products_count > 0),
            );
            if exhausted || found.len() >= wanted {
                break;
            }
            scan.offset = scan.offset.saturating_add(scan.limit);
        }

        debug!(non_empty = found.len(), "Scanned categories for products");
        Ok(found
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn with_product_counts(
        &self,
        categories: Vec<Category>,
        company: Option<CompanyId>,
    ) -> Result<Vec<CategoryWithCount>, OdooError> {
        stream::iter(categories)
            .map(|category| async move {
                let mut query = ProductQuery::new(1).category(category.id);
                query.company = company;
                let products_count = self.count_products(&query).await?;
                Ok::<_, OdooError>(CategoryWithCount {
                    category,
                    products_count,
                })
            })
            .buffered(COUNT_CONCURRENCY)
            .try_collect()
            .await
    }

    /// Count categories matching the query's filters (paging is ignored).
    ///
    /// # Errors
    ///
    /// Returns `OdooError` if the call fails.
    pub async fn count_categories(&self, query: &CategoryQuery) -> Result<i64, OdooError> {
        self.search_count(Category::MODEL, &query.domain()).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List active stockable products ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `OdooError` if the call fails or a record cannot be mapped.
    #[instrument(skip(self))]
    pub async fn get_products(&self, query: &ProductQuery) -> Result<Vec<Product>, OdooError> {
        let records = self
            .search_read(Product::MODEL, &query.domain(), Product::FIELDS, &query.options())
            .await?;
        map_records(&records)
    }

    /// Count products matching the query's filters (paging is ignored).
    ///
    /// # Errors
    ///
    /// Returns `OdooError` if the call fails.
    pub async fn count_products(&self, query: &ProductQuery) -> Result<i64, OdooError> {
        self.search_count(Product::MODEL, &query.domain()).await
    }

    /// Write arbitrary fields on one product.
    ///
    /// # Errors
    ///
    /// Returns `OdooError` if the call fails; see [`OdooClient::write`].
    pub async fn update_product(
        &self,
        id: ProductId,
        values: Struct,
    ) -> Result<WriteOutcome, OdooError> {
        self.write(Product::MODEL, [id], values).await
    }

    /// Set a product's `standard_price`.
    ///
    /// # Errors
    ///
    /// Returns `OdooError` if the call fails; see [`OdooClient::write`].
    #[instrument(skip(self), fields(product = %id, cost = %cost))]
    pub async fn update_product_cost(
        &self,
        id: ProductId,
        cost: Cost,
    ) -> Result<WriteOutcome, OdooError> {
        let outcome = self
            .update_product(id, Struct::new().with("standard_price", cost))
            .await?;
        if outcome.is_applied() {
            info!("Updated product cost");
        }
        Ok(outcome)
    }
}
