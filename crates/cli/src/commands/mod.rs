//! Command implementations.
//!
//! Every command builds its client from the environment, writes its result
//! to stdout as pretty JSON and logs progress to stderr.

pub mod analyze;
pub mod call;
pub mod catalog;
pub mod check;
pub mod cost;

use std::io::Write;
use std::path::PathBuf;

use costos_core::ProductId;
use costos_odoo::{OdooClient, OdooError};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Odoo configuration, transport or protocol error.
    #[error(transparent)]
    Odoo(#[from] OdooError),

    /// Odoo could not be reached or rejected the credentials.
    #[error("Connection check failed: {0}")]
    ConnectionFailed(String),

    /// An input file could not be read.
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An argument or input file is not valid JSON of the expected shape.
    #[error("Invalid {what}: {message}")]
    InvalidInput { what: &'static str, message: String },

    /// Writing the JSON output failed.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// Encoding the JSON output failed.
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    /// Odoo answered `false` to a write.
    #[error("Odoo rejected the cost update for product {0}")]
    WriteRejected(ProductId),

    /// Some batch items were rejected or failed.
    #[error("{failed} of {total} cost updates were not applied")]
    BatchIncomplete { failed: usize, total: usize },
}

/// Client configured from `ODOO_*` environment variables.
pub fn client() -> Result<OdooClient, CliError> {
    Ok(OdooClient::from_env()?)
}

/// Write `value` to stdout as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
