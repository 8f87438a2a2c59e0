//! Raw model method calls.

use costos_core::xmlrpc::{Struct, Value};

use super::{CliError, client, print_json};

fn parse_json(what: &'static str, text: &str) -> Result<Value, CliError> {
    let json: serde_json::Value = serde_json::from_str(text).map_err(|e| CliError::InvalidInput {
        what,
        message: e.to_string(),
    })?;
    Value::try_from(json).map_err(|e| CliError::InvalidInput {
        what,
        message: e.to_string(),
    })
}

/// Positional arguments from a JSON array.
fn parse_args(text: &str) -> Result<Vec<Value>, CliError> {
    match parse_json("args", text)? {
        Value::Array(items) => Ok(items),
        other => Err(CliError::InvalidInput {
            what: "args",
            message: format!("expected a JSON array, found {}", other.kind()),
        }),
    }
}

/// Keyword arguments from a JSON object.
fn parse_kwargs(text: &str) -> Result<Struct, CliError> {
    match parse_json("kwargs", text)? {
        Value::Struct(members) => Ok(members),
        other => Err(CliError::InvalidInput {
            what: "kwargs",
            message: format!("expected a JSON object, found {}", other.kind()),
        }),
    }
}

/// Call `model.method` and print the result as JSON.
///
/// # Errors
///
/// Returns `CliError` if the arguments are not valid JSON or the call fails.
pub async fn run(model: &str, method: &str, args: &str, kwargs: &str) -> Result<(), CliError> {
    let args = parse_args(args)?;
    let kwargs = parse_kwargs(kwargs)?;

    let result = client()?.call(model, method, args, kwargs).await?;
    print_json(&serde_json::Value::from(result))
}
