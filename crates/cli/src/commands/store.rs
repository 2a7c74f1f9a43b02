//! `dashboard`, `store` and `upload`.

use std::path::Path;

use quickshop_client::{DashboardLoader, ResourceLoader, ResourceSource, StoreInfoLoader};
use tracing::info;

use super::App;
use crate::error::CliError;
use crate::output;

/// Run a loader once and return its data or error.
async fn load_once<S: ResourceSource>(loader: &ResourceLoader<S>) -> Result<Option<S::Output>, CliError> {
    loader.start().await;
    let state = loader.snapshot();
    loader.dispose();

    match state.error {
        Some(error) => Err(CliError::Resource(error)),
        None => Ok(state.data),
    }
}

pub async fn dashboard(app: &App) -> Result<(), CliError> {
    app.require_session().await?;

    let loader = DashboardLoader::dashboard(app.client.clone(), app.session.handle());
    if let Some(data) = load_once(&loader).await? {
        output::dashboard(&data);
    }
    Ok(())
}

pub async fn store_info(app: &App) -> Result<(), CliError> {
    app.require_session().await?;

    let loader = StoreInfoLoader::store_info(app.client.clone(), app.session.handle());
    if let Some(info) = load_once(&loader).await? {
        output::store(&info, app.config.stores_base_url.as_str());
    }
    Ok(())
}

pub async fn upload(app: &App, path: &Path) -> Result<(), CliError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    app.require_session().await?;
    let result = app.client.upload_file(bytes, &file_name).await?;

    info!(file = %file_name, "uploaded");
    output::line(result.url.as_deref().or(result.filename.as_deref()).unwrap_or("Uploaded."));
    Ok(())
}
