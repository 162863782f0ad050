use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::AppError;

mod supabase;

pub use supabase::SupabaseStorage;

/// Blob store boundary. Every operation is atomic at single-object
/// granularity; there is no cross-object transaction, which is exactly why
/// the ingestion workflow layers compensations on top of this trait.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Create-if-absent; an already existing bucket is not an error.
    async fn ensure_bucket(&self, bucket: &str) -> Result<(), AppError>;

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), AppError>;

    /// Resolves the public locator for an object.
    fn public_url(&self, bucket: &str, key: &str) -> Result<String, AppError>;

    async fn remove(&self, bucket: &str, keys: &[String]) -> Result<(), AppError>;

    /// Fetches object bytes through their public locator.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError>;
}

static PUBLIC_OBJECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/object/public/([^/]+)/(.+)$").expect("valid regex"));

/// Recovers `(bucket, key)` from a stored public URL. Rows written by older
/// deployments may hold URLs from other stores; those simply yield `None`
/// and their objects are left for an out-of-band sweep.
pub fn parse_public_url(url: &str) -> Option<(String, String)> {
    let captures = PUBLIC_OBJECT_RE.captures(url)?;
    Some((captures[1].to_string(), captures[2].to_string()))
}
