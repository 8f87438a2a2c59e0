//! Category cost analysis.

use costos_core::CategoryId;
use serde_json::json;

use super::{CliError, client, print_json};

/// Print how the current costs of a category relate to each other.
///
/// # Errors
///
/// Returns `CliError` if the products cannot be fetched.
pub async fn run(category: i64, limit: u32) -> Result<(), CliError> {
    let analysis = client()?
        .analyze_category(CategoryId::new(category), limit)
        .await?;

    print_json(&json!({
        "category_id": category,
        "message": analysis.message(),
        "analysis": analysis,
    }))
}
