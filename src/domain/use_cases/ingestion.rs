use uuid::Uuid;

use crate::{
    constants::{ALLOWED_IMAGE_TYPES, DEFAULT_DIMENSIONS, MAX_UPLOAD_BYTES, WEBP_QUALITY},
    entities::wallpaper::{
        clamp_description, parse_tags, DeleteOutcome, EditWallpaper, NewWallpaperUpload,
        ReplacementFile, Wallpaper, WallpaperInsert,
    },
    errors::AppError,
    infrastructure::{
        media::{generate_storage_key, resolve_mime, webp_sibling_key, ImageTranscoder},
        storage::{parse_public_url, ObjectStorage},
    },
    repositories::wallpaper::WallpaperRepository,
    use_cases::saga::{try_step, Compensations},
};

/// Orchestrates transcoder, object store and metadata store so that a
/// wallpaper's three artifacts (original, WebP, row) come into and go out
/// of existence together. Each side-effecting step registers exactly
/// one compensation; the metadata write is the commit point.
pub struct IngestionWorkflow<R, S, T> {
    pub wallpaper_repo: R,
    pub storage: S,
    pub transcoder: T,
    bucket: String,
}

impl<R, S, T> IngestionWorkflow<R, S, T>
where
    R: WallpaperRepository,
    S: ObjectStorage,
    T: ImageTranscoder,
{
    pub fn new(wallpaper_repo: R, storage: S, transcoder: T, bucket: impl Into<String>) -> Self {
        IngestionWorkflow {
            wallpaper_repo,
            storage,
            transcoder,
            bucket: bucket.into(),
        }
    }

    /// Create path. Order matters: everything pure (validation, dimension
    /// probe, WebP encode) happens before the first storage write, so early
    /// failures need no cleanup at all.
    pub async fn create_wallpaper(
        &self,
        upload: NewWallpaperUpload,
    ) -> Result<Wallpaper, AppError> {
        let mime = validate_file(&upload.bytes, upload.declared_mime.as_deref())?;
        let title = validate_title(&upload.title)?;

        let (width, height) = self
            .transcoder
            .dimensions(&upload.bytes)
            .await
            .unwrap_or(DEFAULT_DIMENSIONS);

        let original_key = generate_storage_key(upload.file_name.as_deref(), &mime);
        let webp_key = webp_sibling_key(&original_key);

        self.storage.ensure_bucket(&self.bucket).await?;

        let webp_bytes = self.transcoder.encode_webp(&upload.bytes, WEBP_QUALITY).await?;
        let file_size = upload.bytes.len() as i64;

        let mut comp = Compensations::new();

        try_step!(
            comp,
            self.storage
                .upload(&self.bucket, &original_key, upload.bytes, &mime)
                .await
        );
        comp.push("remove original object", self.removal(&original_key));

        try_step!(
            comp,
            self.storage
                .upload(&self.bucket, &webp_key, webp_bytes, "image/webp")
                .await
        );
        comp.push("remove webp object", self.removal(&webp_key));

        let image_url = try_step!(comp, self.storage.public_url(&self.bucket, &original_key));
        let webp_url = try_step!(comp, self.storage.public_url(&self.bucket, &webp_key));

        let insert = WallpaperInsert {
            title,
            description: clamp_description(upload.description),
            image_url,
            webp_url: Some(webp_url.clone()),
            // The WebP derivative doubles as the thumbnail.
            thumbnail_url: webp_url,
            category_id: upload.category_id,
            tags: parse_tags(upload.tags.as_deref()),
            width: width as i32,
            height: height as i32,
            file_size,
        };

        let wallpaper = try_step!(comp, self.wallpaper_repo.insert_wallpaper(&insert).await);

        // Commit point: the row exists, the asset exists.
        comp.disarm();
        Ok(wallpaper)
    }

    /// Edit path. Metadata-only edits are a single row update. An
    /// image-replacing edit removes the old objects first, treating
    /// old-object removal failures as warnings rather than blockers.
    pub async fn edit_wallpaper(&self, edit: EditWallpaper) -> Result<(), AppError> {
        let title = validate_title(&edit.title)?;

        let Some(replacement) = edit.replacement else {
            return self
                .wallpaper_repo
                .update_wallpaper_metadata(&edit.id, &title, edit.category_id)
                .await;
        };

        self.replace_image(&edit.id, &title, edit.category_id, replacement)
            .await
    }

    async fn replace_image(
        &self,
        id: &Uuid,
        title: &str,
        category_id: Option<Uuid>,
        replacement: ReplacementFile,
    ) -> Result<(), AppError> {
        let mime = validate_file(&replacement.bytes, replacement.declared_mime.as_deref())?;

        let existing = self.wallpaper_repo.get_wallpaper_by_id(id).await?;

        // Old objects go first. If this fails we proceed anyway: an
        // orphaned old object is reclaimable, a blocked edit is not.
        for (bucket, key) in storage_locators(&existing) {
            if let Err(e) = self.storage.remove(&bucket, &[key.clone()]).await {
                tracing::warn!(%id, key, error = %e, "failed to remove old object, continuing edit");
            }
        }

        let original_key = generate_storage_key(replacement.file_name.as_deref(), &mime);
        let webp_key = webp_sibling_key(&original_key);

        self.storage.ensure_bucket(&self.bucket).await?;

        let webp_bytes = self
            .transcoder
            .encode_webp(&replacement.bytes, WEBP_QUALITY)
            .await?;

        let mut comp = Compensations::new();

        try_step!(
            comp,
            self.storage
                .upload(&self.bucket, &original_key, replacement.bytes, &mime)
                .await
        );
        comp.push("remove replacement original", self.removal(&original_key));

        try_step!(
            comp,
            self.storage
                .upload(&self.bucket, &webp_key, webp_bytes, "image/webp")
                .await
        );
        comp.push("remove replacement webp", self.removal(&webp_key));

        let image_url = try_step!(comp, self.storage.public_url(&self.bucket, &original_key));
        let webp_url = try_step!(comp, self.storage.public_url(&self.bucket, &webp_key));

        try_step!(
            comp,
            self.wallpaper_repo
                .update_wallpaper_image(id, title, category_id, &image_url, &webp_url, &webp_url)
                .await
        );

        comp.disarm();
        Ok(())
    }

    /// Delete path: row first, storage second. A missing row with orphaned
    /// objects is a safer failure than a live row pointing at nothing, so
    /// storage reclamation is strictly best-effort.
    pub async fn delete_wallpaper(&self, id: &Uuid) -> Result<DeleteOutcome, AppError> {
        let existing = self.wallpaper_repo.get_wallpaper_by_id(id).await?;

        self.wallpaper_repo.delete_wallpaper(id).await?;

        let mut outcome = DeleteOutcome::default();
        for (bucket, key) in storage_locators(&existing) {
            if let Err(e) = self.storage.remove(&bucket, &[key.clone()]).await {
                tracing::warn!(%id, key, error = %e, "failed to reclaim storage object");
                outcome
                    .warnings
                    .push(format!("failed to remove {key}: {e}"));
            }
        }

        Ok(outcome)
    }

    /// Compensation closure that deletes one object from the workflow's
    /// bucket.
    fn removal<'a>(
        &'a self,
        key: &str,
    ) -> impl FnOnce() -> futures_util::future::BoxFuture<'a, Result<(), AppError>> + Send + 'a
    {
        let storage = &self.storage;
        let bucket = self.bucket.clone();
        let key = key.to_string();
        move || Box::pin(async move { storage.remove(&bucket, &[key]).await })
    }
}

/// Precondition checks: media type first, then size. The first violation
/// wins.
fn validate_file(bytes: &[u8], declared_mime: Option<&str>) -> Result<String, AppError> {
    let mime = resolve_mime(declared_mime, bytes)
        .filter(|mime| ALLOWED_IMAGE_TYPES.contains(&mime.as_str()))
        .ok_or_else(|| AppError::validation("file", "unsupported media type"))?;

    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::validation("file", "file too large"));
    }

    Ok(mime)
}

fn validate_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::validation("title", "missing title"));
    }
    Ok(title.to_string())
}

/// Distinct `(bucket, key)` pairs referenced by a row's URL fields. The
/// thumbnail usually aliases the WebP object, hence the dedup.
fn storage_locators(wallpaper: &Wallpaper) -> Vec<(String, String)> {
    let urls = [
        Some(wallpaper.image_url.as_str()),
        wallpaper.webp_url.as_deref(),
        Some(wallpaper.thumbnail_url.as_str()),
    ];

    let mut locators: Vec<(String, String)> = Vec::new();
    for url in urls.into_iter().flatten() {
        if let Some(locator) = parse_public_url(url) {
            if !locators.contains(&locator) {
                locators.push(locator);
            }
        }
    }
    locators
}
