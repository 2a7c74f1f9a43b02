//! Dashboard, store profile and file upload.

use quickshop_core::{DashboardData, StoreInfo};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::instrument;

use super::client::Body;
use super::types::UploadResult;
use super::{ApiClient, ApiError, ValidationError};

#[derive(Deserialize)]
struct StoreEnvelope {
    store: Option<StoreInfo>,
}

impl ApiClient {
    /// Fetch the dashboard snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_dashboard_data(&self) -> Result<DashboardData, ApiError> {
        let url = self.api_url("dashboard.php")?;
        self.get(url).await
    }

    /// Fetch the signed-in user's store profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the answer carries no store, and
    /// `ApiError` for request failures.
    #[instrument(skip(self))]
    pub async fn get_store_info(&self) -> Result<StoreInfo, ApiError> {
        let url = self.api_url("store.php")?;
        let envelope: StoreEnvelope = self.get(url).await?;
        envelope
            .store
            .ok_or_else(|| ApiError::NotFound("store".to_owned()))
    }

    /// Upload an image as the multipart field `image`.
    ///
    /// The result carries only `filename` and `url`. A `success: false` body
    /// surfaces as [`ApiError::Api`] with the server's `error` message.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidArgument` for an empty file or name,
    /// and `ApiError` if the request fails or the server refuses the file.
    #[instrument(skip(self, bytes), fields(file_name = %file_name, size = bytes.len()))]
    pub async fn upload_file(&self, bytes: Vec<u8>, file_name: &str) -> Result<UploadResult, ApiError> {
        if bytes.is_empty() {
            return Err(ValidationError::InvalidArgument {
                field: "file",
                reason: "file is empty".to_owned(),
            }
            .into());
        }
        if file_name.trim().is_empty() {
            return Err(ValidationError::InvalidArgument {
                field: "file_name",
                reason: "file name is empty".to_owned(),
            }
            .into());
        }

        let mut part = Part::bytes(bytes).file_name(file_name.to_owned());
        if let Some(mime) = image_mime(file_name) {
            part = part.mime_str(mime)?;
        }
        let form = Form::new().part("image", part);

        let url = self.api_url("upload.php")?;
        self.execute(Method::POST, url, Body::Multipart(form)).await
    }
}

/// MIME type for common image extensions.
fn image_mime(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime("cake.JPG"), Some("image/jpeg"));
        assert_eq!(image_mime("logo.png"), Some("image/png"));
        assert_eq!(image_mime("notes.txt"), None);
        assert_eq!(image_mime("noext"), None);
    }
}
