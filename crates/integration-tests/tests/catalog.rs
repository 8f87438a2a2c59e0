//! End-to-end tests for catalog wrappers, price analysis and batch updates.

use std::time::Duration;

use costos_core::xmlrpc::{Struct, Value};
use costos_core::{CategoryId, CompanyId, Cost, ProductId};
use costos_integration_tests::{StubOdoo, StubReply};
use costos_odoo::{
    BatchOptions, CategoryCostChange, CategoryQuery, CostChange, ItemStatus, OdooError,
    PriceConsistency, ProductCost, ProductQuery, SuggestedAction, WriteOutcome,
    apply_cost_changes,
};
use rust_decimal::Decimal;

async fn stub() -> StubOdoo {
    let stub = StubOdoo::start().await.expect("start stub server");
    stub.on_authenticate(StubReply::Value(Value::Int(42))).await;
    stub
}

fn cost(amount: &str) -> Cost {
    amount.parse().expect("valid cost")
}

fn product(id: i64, name: &str, price: f64) -> Value {
    Value::Struct(
        Struct::new()
            .with("id", id)
            .with("name", name)
            .with("default_code", false)
            .with(
                "categ_id",
                vec![Value::Int(7), Value::from("Aceites esenciales")],
            )
            .with("standard_price", price)
            .with("active", true),
    )
}

// ============================================================================
// Categories
// ============================================================================

#[tokio::test]
async fn test_get_categories_normalizes_many2one() {
    let stub = stub().await;
    stub.on_execute(
        "product.category",
        "search_read",
        StubReply::Value(Value::Array(vec![
            Value::Struct(
                Struct::new()
                    .with("id", 12_i64)
                    .with("name", "Lavanda")
                    .with(
                        "parent_id",
                        vec![Value::Int(7), Value::from("Aceites esenciales")],
                    ),
            ),
            Value::Struct(
                Struct::new()
                    .with("id", 1_i64)
                    .with("name", "All")
                    .with("parent_id", false),
            ),
        ])),
    )
    .await;

    let categories = stub
        .client()
        .get_categories(&CategoryQuery::new(50))
        .await
        .expect("categories");

    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].parent_id, Some(CategoryId::new(7)));
    assert_eq!(
        categories[0].parent_name.as_deref(),
        Some("Aceites esenciales")
    );
    assert_eq!(categories[1].parent_id, None);
    assert_eq!(categories[1].parent_name, None);

    let calls = stub.calls_to("product.category", "search_read").await;
    let kwargs = calls[0].params[6].as_struct().expect("kwargs");
    assert_eq!(kwargs.get("order"), Some(&Value::from("name asc")));
    assert_eq!(kwargs.get("limit"), Some(&Value::Int(50)));
}

#[tokio::test]
async fn test_mapping_error_names_model() {
    let stub = stub().await;
    stub.on_execute(
        "product.category",
        "search_read",
        StubReply::Value(Value::Array(vec![Value::Struct(
            Struct::new().with("id", 1_i64),
        )])),
    )
    .await;

    let err = stub
        .client()
        .get_categories(&CategoryQuery::new(10))
        .await
        .expect_err("missing name");
    assert!(matches!(
        err,
        OdooError::Mapping {
            model: "product.category",
            ..
        }
    ));
}

fn category(id: i64, name: &str) -> Value {
    Value::Struct(
        Struct::new()
            .with("id", id)
            .with("name", name)
            .with("parent_id", false),
    )
}

/// Positional arguments of a `search_count` over `conditions`.
fn count_args(conditions: Vec<Value>) -> Value {
    Value::Array(vec![Value::Array(conditions)])
}

fn condition(field: &str, operator: &str, value: impl Into<Value>) -> Value {
    Value::Array(vec![Value::from(field), Value::from(operator), value.into()])
}

fn in_category(id: i64) -> Value {
    count_args(vec![
        condition("active", "=", true),
        condition("type", "=", "product"),
        condition("categ_id", "=", id),
    ])
}

async fn stub_with_category_counts() -> StubOdoo {
    let stub = stub().await;
    stub.on_execute(
        "product.category",
        "search_read",
        StubReply::Value(Value::Array(vec![
            category(1, "All"),
            category(2, "Aceites"),
            category(3, "Cremas"),
        ])),
    )
    .await;
    stub.on_execute(
        "product.template",
        "search_count",
        StubReply::Value(Value::Int(0)),
    )
    .await;
    stub.on_execute_with_args(
        "product.template",
        "search_count",
        in_category(2),
        StubReply::Value(Value::Int(5)),
    )
    .await;
    stub.on_execute_with_args(
        "product.template",
        "search_count",
        in_category(3),
        StubReply::Value(Value::Int(2)),
    )
    .await;
    stub
}

#[tokio::test]
async fn test_categories_with_counts() {
    let stub = stub_with_category_counts().await;

    let categories = stub
        .client()
        .get_categories_with_counts(&CategoryQuery::new(50), false)
        .await
        .expect("categories");

    let counts: Vec<_> = categories
        .iter()
        .map(|c| (c.category.id.as_i64(), c.products_count))
        .collect();
    assert_eq!(counts, [(1, 0), (2, 5), (3, 2)]);
    assert_eq!(
        stub.calls_to("product.template", "search_count").await.len(),
        3
    );
    assert_eq!(stub.count("common").await, 1);
}

#[tokio::test]
async fn test_categories_with_products_only() {
    let stub = stub_with_category_counts().await;

    let categories = stub
        .client()
        .get_categories_with_counts(&CategoryQuery::new(10), true)
        .await
        .expect("categories");

    let ids: Vec<_> = categories.iter().map(|c| c.category.id).collect();
    assert_eq!(ids, [CategoryId::new(2), CategoryId::new(3)]);
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_get_products_sends_base_domain_and_company_context() {
    let stub = stub().await;
    stub.on_execute(
        "product.template",
        "search_read",
        StubReply::Value(Value::Array(vec![product(101, "Lavanda 10ml", 55.5)])),
    )
    .await;

    let query = ProductQuery::new(5)
        .category(CategoryId::new(7))
        .company(CompanyId::new(1));
    let products = stub.client().get_products(&query).await.expect("products");

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, ProductId::new(101));
    assert_eq!(products[0].categ_id, Some(CategoryId::new(7)));
    assert_eq!(products[0].default_code, None);
    assert_eq!(products[0].standard_price, Decimal::new(555, 1));

    let calls = stub.calls_to("product.template", "search_read").await;
    assert_eq!(calls[0].params[5], Value::Array(vec![query.domain().to_value()]));
    let kwargs = calls[0].params[6].as_struct().expect("kwargs");
    assert_eq!(
        kwargs.get("context"),
        Some(&Value::Struct(Struct::new().with("company_id", 1_i64)))
    );
}

#[tokio::test]
async fn test_count_products() {
    let stub = stub().await;
    stub.on_execute(
        "product.template",
        "search_count",
        StubReply::Value(Value::Int(128)),
    )
    .await;

    let count = stub
        .client()
        .count_products(&ProductQuery::new(1).search("aceite"))
        .await
        .expect("count");
    assert_eq!(count, 128);
}

#[tokio::test]
async fn test_update_product_cost_writes_double() {
    let stub = stub().await;
    stub.on_execute("product.template", "write", StubReply::Value(Value::Bool(true)))
        .await;

    let outcome = stub
        .client()
        .update_product_cost(ProductId::new(101), cost("55"))
        .await
        .expect("write");
    assert_eq!(outcome, WriteOutcome::Applied);

    let calls = stub.calls_to("product.template", "write").await;
    assert_eq!(
        calls[0].params[5],
        Value::Array(vec![
            Value::Array(vec![Value::Int(101)]),
            Value::Struct(Struct::new().with("standard_price", Value::Double(55.0))),
        ])
    );
}

#[tokio::test]
async fn test_change_standard_price_uses_company_context() {
    let stub = stub().await;
    stub.on_execute(
        "product.template",
        "change_standard_price",
        StubReply::Value(Value::Bool(true)),
    )
    .await;

    stub.client()
        .change_standard_price(
            &[ProductId::new(101), ProductId::new(102)],
            cost("12.5"),
            CompanyId::new(1),
        )
        .await
        .expect("revaluation");

    let calls = stub
        .calls_to("product.template", "change_standard_price")
        .await;
    assert_eq!(
        calls[0].params[5],
        Value::Array(vec![
            Value::Array(vec![Value::Int(101), Value::Int(102)]),
            Value::Double(12.5),
        ])
    );
    assert_eq!(
        calls[0].params[6],
        Value::Struct(
            Struct::new().with("context", Struct::new().with("company_id", 1_i64))
        )
    );
}

// ============================================================================
// Statistics
// ============================================================================

#[tokio::test]
async fn test_catalog_stats() {
    let stub = stub().await;
    stub.on_execute(
        "product.template",
        "search_count",
        StubReply::Value(Value::Int(120)),
    )
    .await;
    stub.on_execute_with_args(
        "product.template",
        "search_count",
        count_args(vec![
            condition("active", "=", true),
            condition("type", "=", "product"),
            condition("standard_price", "=", 0_i64),
        ]),
        StubReply::Value(Value::Int(7)),
    )
    .await;
    stub.on_execute(
        "product.category",
        "search_count",
        StubReply::Value(Value::Int(15)),
    )
    .await;
    stub.on_execute(
        "product.template",
        "search_read",
        StubReply::Value(Value::Array(vec![
            product(1, "Lavanda", 10.0),
            product(2, "Romero", 12.5),
        ])),
    )
    .await;

    let stats = stub.client().catalog_stats().await.expect("stats");

    assert_eq!(stats.total_products, 120);
    assert_eq!(stats.total_categories, 15);
    assert_eq!(stats.zero_cost_products, 7);
    assert_eq!(
        stats.lowest_cost[1],
        ProductCost {
            id: ProductId::new(2),
            name: "Romero".to_string(),
            cost: Decimal::new(125, 1),
        }
    );
    assert_eq!(stats.highest_cost.len(), 2);
    assert_eq!(stub.count("common").await, 1);

    let rankings = stub.calls_to("product.template", "search_read").await;
    assert_eq!(rankings.len(), 2);
    let ascending = rankings
        .iter()
        .find(|call| {
            call.params[6].as_struct().and_then(|k| k.get("order"))
                == Some(&Value::from("standard_price asc"))
        })
        .expect("cheapest ranking");
    assert_eq!(
        ascending.params[5],
        count_args(vec![
            condition("active", "=", true),
            condition("type", "=", "product"),
            condition("standard_price", ">", 0_i64),
        ])
    );
    assert_eq!(
        ascending.params[6].as_struct().and_then(|k| k.get("limit")),
        Some(&Value::Int(10))
    );
    assert!(rankings.iter().any(|call| {
        call.params[6].as_struct().and_then(|k| k.get("order"))
            == Some(&Value::from("standard_price desc"))
    }));
}

// ============================================================================
// Analysis
// ============================================================================

#[tokio::test]
async fn test_analyze_category_mixed() {
    let stub = stub().await;
    stub.on_execute(
        "product.template",
        "search_read",
        StubReply::Value(Value::Array(vec![
            product(1, "A", 30.0),
            product(2, "B", 10.0),
            product(3, "C", 0.0),
        ])),
    )
    .await;

    let analysis = stub
        .client()
        .analyze_category(CategoryId::new(7), 1000)
        .await
        .expect("analysis");

    assert_eq!(analysis.product_count, 3);
    assert_eq!(
        analysis.consistency,
        PriceConsistency::Mixed {
            min: Decimal::from(10),
            max: Decimal::from(30)
        }
    );
    assert_eq!(
        analysis.suggested_action,
        Some(SuggestedAction::ManualDecision)
    );
}

#[tokio::test]
async fn test_analyze_empty_category() {
    let stub = stub().await;
    stub.on_execute(
        "product.template",
        "search_read",
        StubReply::Value(Value::Array(vec![])),
    )
    .await;

    let analysis = stub
        .client()
        .analyze_category(CategoryId::new(7), 1000)
        .await
        .expect("analysis");
    assert_eq!(analysis.consistency, PriceConsistency::NoProducts);
}

// ============================================================================
// Batch updates
// ============================================================================

fn no_delay(batch_size: usize) -> BatchOptions {
    BatchOptions {
        batch_size,
        inter_batch_delay: Duration::ZERO,
        ..BatchOptions::default()
    }
}

#[tokio::test]
async fn test_batch_applies_every_item_once() {
    let stub = stub().await;
    stub.on_execute("product.template", "write", StubReply::Value(Value::Bool(true)))
        .await;

    let changes: Vec<_> = (1..=5)
        .map(|id| CostChange::new(ProductId::new(id), cost("20")))
        .collect();
    let report = apply_cost_changes(&stub.client(), changes, &no_delay(2))
        .await
        .expect("batch run");

    assert_eq!(report.applied(), 5);
    assert!(report.is_success());
    assert_eq!(stub.count("common").await, 1);
    assert_eq!(stub.calls_to("product.template", "write").await.len(), 5);
}

#[tokio::test]
async fn test_batch_reports_rejected_items_without_retry() {
    let stub = stub().await;
    stub.on_execute("product.template", "write", StubReply::Value(Value::Bool(false)))
        .await;

    let changes = vec![
        CostChange::new(ProductId::new(1), cost("20")),
        CostChange::new(ProductId::new(2), cost("20")),
    ];
    let report = apply_cost_changes(&stub.client(), changes, &no_delay(10))
        .await
        .expect("batch run");

    assert_eq!(report.rejected(), 2);
    assert!(!report.is_success());
    assert!(report.results.iter().all(|r| r.status == ItemStatus::Rejected));
    assert_eq!(stub.calls_to("product.template", "write").await.len(), 2);
}

#[tokio::test]
async fn test_batch_failed_item_does_not_stop_run() {
    let stub = stub().await;
    stub.on_execute(
        "product.template",
        "write",
        StubReply::fault(2, "Record does not exist"),
    )
    .await;

    let changes = vec![
        CostChange::new(ProductId::new(1), cost("20")),
        CostChange::new(ProductId::new(2), cost("20")),
    ];
    let report = apply_cost_changes(&stub.client(), changes, &no_delay(1))
        .await
        .expect("batch run");

    assert_eq!(report.failed(), 2);
    assert!(matches!(
        &report.results[0].status,
        ItemStatus::Failed(message) if message.contains("Record does not exist")
    ));
}

#[tokio::test]
async fn test_batch_aborts_on_login_failure() {
    let stub = StubOdoo::start().await.expect("start stub server");
    stub.on_authenticate(StubReply::fault(3, "Access Denied")).await;

    let changes = vec![CostChange::new(ProductId::new(1), cost("20"))];
    let err = apply_cost_changes(&stub.client(), changes, &no_delay(10))
        .await
        .expect_err("login failure");
    assert!(matches!(err, OdooError::Authentication(_)));
    assert_eq!(stub.count("object").await, 0);
}

#[tokio::test]
async fn test_category_change_expands_and_applies() {
    let stub = stub().await;
    stub.on_execute(
        "product.template",
        "search_read",
        StubReply::Value(Value::Array(vec![
            product(1, "Lavanda", 10.0),
            product(2, "Romero", 0.0),
        ])),
    )
    .await;
    stub.on_execute("product.template", "write", StubReply::Value(Value::Bool(true)))
        .await;
    let client = stub.client();

    let change = CategoryCostChange {
        category_id: CategoryId::new(7),
        label: "Aceites esenciales".to_string(),
        new_cost: cost("15"),
    };
    let products = client
        .get_products(&ProductQuery::new(1000).category(change.category_id))
        .await
        .expect("products");
    let report = apply_cost_changes(&client, change.expand(&products), &no_delay(10))
        .await
        .expect("batch run");

    assert_eq!(report.applied(), 2);
    assert_eq!(report.results[1].change.label, "Romero");
    assert_eq!(
        report.results[1].change.via_category.as_deref(),
        Some("Aceites esenciales")
    );
}
