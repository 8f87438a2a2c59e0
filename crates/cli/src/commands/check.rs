//! Connection check.

use costos_odoo::ConnectionStatus;
use tracing::info;

use super::{CliError, client, print_json};

/// Log in and print the connection status.
///
/// # Errors
///
/// Returns `CliError::ConnectionFailed` if the login fails, after printing
/// the status.
pub async fn run() -> Result<(), CliError> {
    let client = client()?;
    info!(url = %client.config().url, db = %client.config().db, "Checking Odoo connection");

    let status = client.test_connection().await;
    print_json(&status)?;

    match status {
        ConnectionStatus::Connected { uid } => {
            info!(%uid, "Connected");
            Ok(())
        }
        ConnectionStatus::Failed { error } => Err(CliError::ConnectionFailed(error)),
    }
}
