use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use zeroize::Zeroizing;

use crate::{
    constants::{ALLOWED_IMAGE_TYPES, MAX_UPLOAD_BYTES},
    errors::AppError,
    settings::AppConfig,
};

use super::ObjectStorage;

/// Storage client speaking the Supabase storage REST API with the
/// service-role key. Public URLs are deterministic, so `public_url` needs
/// no round trip.
#[derive(Clone)]
pub struct SupabaseStorage {
    http: Client,
    base_url: String,
    service_key: Zeroizing<String>,
}

impl SupabaseStorage {
    pub fn new(config: &AppConfig) -> Self {
        SupabaseStorage {
            http: Client::new(),
            base_url: config.storage_url.trim_end_matches('/').to_string(),
            service_key: Zeroizing::new(config.storage_service_key.clone()),
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.service_key.as_str())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), AppError> {
        let response = self
            .http
            .post(format!("{}/storage/v1/bucket", self.base_url))
            .header("Authorization", self.bearer())
            .json(&serde_json::json!({
                "id": bucket,
                "name": bucket,
                "public": true,
                "allowed_mime_types": ALLOWED_IMAGE_TYPES,
                "file_size_limit": MAX_UPLOAD_BYTES,
            }))
            .send()
            .await?;

        // Another request may have created it between the existence check
        // and here.
        if response.status() == StatusCode::CONFLICT {
            return Ok(());
        }

        fail_on_error(response, "bucket creation").await
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn ensure_bucket(&self, bucket: &str) -> Result<(), AppError> {
        let response = self
            .http
            .get(format!("{}/storage/v1/bucket/{}", self.base_url, bucket))
            .header("Authorization", self.bearer())
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => self.create_bucket(bucket).await,
            _ => Err(storage_error(response, "bucket lookup").await),
        }
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), AppError> {
        let response = self
            .http
            .post(format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, key))
            .header("Authorization", self.bearer())
            .header("Content-Type", content_type)
            .header("Cache-Control", "3600")
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        fail_on_error(response, "object upload").await
    }

    fn public_url(&self, bucket: &str, key: &str) -> Result<String, AppError> {
        if key.is_empty() {
            return Err(AppError::Storage("cannot resolve URL for empty key".into()));
        }
        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, key
        ))
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> Result<(), AppError> {
        if keys.is_empty() {
            return Ok(());
        }

        let response = self
            .http
            .delete(format!("{}/storage/v1/object/{}", self.base_url, bucket))
            .header("Authorization", self.bearer())
            .json(&serde_json::json!({ "prefixes": keys }))
            .send()
            .await?;

        fail_on_error(response, "object removal").await
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Storage(format!(
                "object fetch returned {}",
                response.status()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

async fn fail_on_error(response: reqwest::Response, operation: &str) -> Result<(), AppError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(storage_error(response, operation).await)
    }
}

async fn storage_error(response: reqwest::Response, operation: &str) -> AppError {
    let status = response.status();
    let detail = response.text().await.unwrap_or_default();
    AppError::Storage(format!("{operation} failed with {status}: {detail}"))
}
