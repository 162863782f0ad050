use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// ───── Constants ──────────────────────────────────────────────────────
const MAX_TITLE_LENGTH: u64 = 200;
const MAX_DESCRIPTION_LENGTH: u64 = 1000;

// ───── Database Models ───────────────────────────────────────────────

/// One row of the `wallpapers` relation. Every non-null `*_url` points at an
/// object the ingestion workflow placed in the storage bucket.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Wallpaper {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub webp_url: Option<String>,
    pub thumbnail_url: String,
    pub category_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub download_count: i64,
    pub width: i32,
    pub height: i32,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct WallpaperInsert {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub webp_url: Option<String>,
    pub thumbnail_url: String,
    pub category_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub width: i32,
    pub height: i32,
    pub file_size: i64,
}

// ───── Workflow Inputs ───────────────────────────────────────────────

/// Raw upload as the ingestion workflow sees it, independent of the wire
/// encoding. Validation happens inside the workflow, in a fixed order.
#[derive(Debug)]
pub struct NewWallpaperUpload {
    pub bytes: Vec<u8>,
    pub declared_mime: Option<String>,
    pub file_name: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub tags: Option<String>,
}

/// Replacement file carried by an image-replacing edit.
#[derive(Debug)]
pub struct ReplacementFile {
    pub bytes: Vec<u8>,
    pub declared_mime: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug)]
pub struct EditWallpaper {
    pub id: Uuid,
    pub title: String,
    pub category_id: Option<Uuid>,
    pub replacement: Option<ReplacementFile>,
}

/// Outcome of a delete: the row is gone; storage reclamation is best-effort
/// and any failures come back as warnings rather than errors.
#[derive(Debug, Default, Serialize)]
pub struct DeleteOutcome {
    pub warnings: Vec<String>,
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, MultipartForm)]
pub struct WallpaperUploadForm {
    // MiB, not MB: the decimal unit would undercut the workflow's own size
    // check and reject files in the 10 MB..10 MiB gap at the extractor.
    #[multipart(rename = "file", limit = "10MiB")]
    pub file: TempFile,

    pub title: Text<String>,
    pub description: Option<Text<String>>,

    #[multipart(rename = "categoryId")]
    pub category_id: Option<Text<String>>,

    pub tags: Option<Text<String>>,
}

#[derive(Debug, MultipartForm)]
pub struct WallpaperEditForm {
    pub id: Text<String>,
    pub title: Text<String>,

    #[multipart(rename = "categoryId")]
    pub category_id: Option<Text<String>>,

    #[multipart(rename = "file", limit = "10MiB")]
    pub file: Option<TempFile>,
}

/// JSON body for a metadata-only edit.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWallpaperRequest {
    pub id: Uuid,

    #[validate(length(min = 1, max = MAX_TITLE_LENGTH, message = "Title is required"))]
    pub title: String,

    #[serde(rename = "categoryId")]
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DownloadRequest {
    pub id: Uuid,
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListWallpapersQuery {
    pub category: Option<Uuid>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct WallpaperCreatedResponse {
    pub success: bool,
    pub wallpaper: Wallpaper,
}

// ───── Helper Functions ─────────────────────────────────────────────

// Multipart text fields bypass the validator derive, so the description cap
// is enforced here instead. Cuts on a char boundary; a byte-indexed
// truncate would panic on multibyte text.
pub fn clamp_description(description: Option<String>) -> String {
    let mut description = description.unwrap_or_default().trim().to_string();
    if let Some((boundary, _)) = description
        .char_indices()
        .nth(MAX_DESCRIPTION_LENGTH as usize)
    {
        description.truncate(boundary);
    }
    description
}

/// Splits a comma-separated tag string: trimmed, empties dropped, input
/// order preserved, duplicates accepted as-is.
pub fn parse_tags(input: Option<&str>) -> Vec<String> {
    input
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Builds the attachment filename for a download: title with anything
/// non-alphanumeric collapsed to `_`, lowercased, plus the format extension.
pub fn attachment_file_name(title: &str, extension: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}.{extension}")
}
