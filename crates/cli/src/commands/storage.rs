//! `storage` subcommands.

use super::App;
use crate::error::CliError;
use crate::output;

pub async fn show(app: &App) -> Result<(), CliError> {
    let entries = app.client.storage_entries().await?;
    output::entries(&entries);
    Ok(())
}

pub async fn clear(app: &App) -> Result<(), CliError> {
    app.client.clear_storage().await?;
    output::line("Saved data cleared.");
    Ok(())
}

pub async fn clear_auth(app: &App) -> Result<(), CliError> {
    app.client.clear_credentials().await?;
    output::line("Saved credentials cleared.");
    Ok(())
}
