//! Catalog listings and counts.

use costos_core::{CategoryId, CompanyId};
use costos_odoo::{CategoryQuery, ProductQuery};
use serde_json::json;
use tracing::info;

use super::{CliError, client, print_json};

/// Whether category listings carry product counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counts {
    Omitted,
    Included,
    /// Counts, and categories without products are left out
    NonEmptyOnly,
}

fn category_query(limit: u32, offset: u32, search: Option<String>, company: Option<i64>) -> CategoryQuery {
    let mut query = CategoryQuery::new(limit).offset(offset);
    if let Some(text) = search {
        query = query.search(text);
    }
    if let Some(id) = company {
        query = query.company(CompanyId::new(id));
    }
    query
}

fn product_query(
    limit: u32,
    offset: u32,
    category: Option<i64>,
    search: Option<String>,
    company: Option<i64>,
) -> ProductQuery {
    let mut query = ProductQuery::new(limit).offset(offset);
    if let Some(id) = category {
        query = query.category(CategoryId::new(id));
    }
    if let Some(text) = search {
        query = query.search(text);
    }
    if let Some(id) = company {
        query = query.company(CompanyId::new(id));
    }
    query
}

/// Print product categories.
///
/// # Errors
///
/// Returns `CliError` if the Odoo call fails.
pub async fn categories(
    limit: u32,
    offset: u32,
    search: Option<String>,
    company: Option<i64>,
    counts: Counts,
) -> Result<(), CliError> {
    let client = client()?;
    let query = category_query(limit, offset, search, company);

    if counts == Counts::Omitted {
        let categories = client.get_categories(&query).await?;
        info!(count = categories.len(), "Fetched categories");
        return print_json(&categories);
    }

    let categories = client
        .get_categories_with_counts(&query, counts == Counts::NonEmptyOnly)
        .await?;
    info!(count = categories.len(), "Fetched categories with product counts");
    print_json(&categories)
}

/// Print catalog counts and the cheapest and dearest products.
///
/// # Errors
///
/// Returns `CliError` if any Odoo call fails.
pub async fn stats() -> Result<(), CliError> {
    let stats = client()?.catalog_stats().await?;
    print_json(&stats)
}

/// Print active stockable products.
///
/// # Errors
///
/// Returns `CliError` if the Odoo call fails.
pub async fn products(
    limit: u32,
    offset: u32,
    category: Option<i64>,
    search: Option<String>,
    company: Option<i64>,
) -> Result<(), CliError> {
    let products = client()?
        .get_products(&product_query(limit, offset, category, search, company))
        .await?;
    info!(count = products.len(), "Fetched products");
    print_json(&products)
}

/// Print the number of matching categories.
///
/// # Errors
///
/// Returns `CliError` if the Odoo call fails.
pub async fn count_categories(search: Option<String>) -> Result<(), CliError> {
    let count = client()?
        .count_categories(&category_query(1, 0, search, None))
        .await?;
    print_json(&json!({ "categories": count }))
}

/// Print the number of matching products.
///
/// # Errors
///
/// Returns `CliError` if the Odoo call fails.
pub async fn count_products(category: Option<i64>, search: Option<String>) -> Result<(), CliError> {
    let count = client()?
        .count_products(&product_query(1, 0, category, search, None))
        .await?;
    print_json(&json!({ "products": count }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_query_from_flags() {
        let query = product_query(20, 40, Some(7), Some("lav".to_string()), Some(1));
        assert_eq!(query.limit, 20);
        assert_eq!(query.offset, 40);
        assert_eq!(query.category, Some(CategoryId::new(7)));
        assert_eq!(query.search.as_deref(), Some("lav"));
        assert_eq!(query.company, Some(CompanyId::new(1)));
        assert_eq!(query.domain().len(), 4);
    }

    #[test]
    fn test_category_query_without_flags() {
        let query = category_query(50, 0, None, None);
        assert!(query.domain().is_empty());
        assert_eq!(query.company, None);
    }
}
