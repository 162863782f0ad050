use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// MIME types accepted by the upload and edit endpoints.
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Upload ceiling shared by the multipart extractor and the workflow check.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Quality used for every derived WebP encoding.
pub const WEBP_QUALITY: f32 = 80.0;

/// Fallback when the original image cannot be decoded for a dimension probe.
pub const DEFAULT_DIMENSIONS: (u32, u32) = (1920, 1080);
