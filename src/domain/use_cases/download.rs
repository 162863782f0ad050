use derive_more::Display;
use uuid::Uuid;

use crate::{
    entities::wallpaper::attachment_file_name,
    errors::AppError,
    infrastructure::storage::ObjectStorage,
    repositories::wallpaper::WallpaperRepository,
};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    #[display("webp")]
    Webp,
    #[display("jpg")]
    Jpg,
    #[display("png")]
    Png,
}

impl DownloadFormat {
    /// Unknown or missing formats fall back to jpg, mirroring the upload
    /// default.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("webp") => DownloadFormat::Webp,
            Some("png") => DownloadFormat::Png,
            _ => DownloadFormat::Jpg,
        }
    }

    fn content_type(self) -> &'static str {
        match self {
            DownloadFormat::Webp => "image/webp",
            DownloadFormat::Jpg => "image/jpeg",
            DownloadFormat::Png => "image/png",
        }
    }
}

#[derive(Debug)]
pub struct DownloadPayload {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub file_name: String,
}

/// Download accounting path: fully decoupled from ingestion, reads the row,
/// streams bytes, counts afterwards. The counter is bookkeeping and must
/// never block delivery.
pub struct DownloadHandler<R, S> {
    pub wallpaper_repo: R,
    pub storage: S,
}

impl<R, S> DownloadHandler<R, S>
where
    R: WallpaperRepository,
    S: ObjectStorage,
{
    pub fn new(wallpaper_repo: R, storage: S) -> Self {
        DownloadHandler { wallpaper_repo, storage }
    }

    pub async fn download(
        &self,
        id: &Uuid,
        format: DownloadFormat,
    ) -> Result<DownloadPayload, AppError> {
        let wallpaper = self.wallpaper_repo.get_wallpaper_by_id(id).await?;

        let (url, format) = match (format, &wallpaper.webp_url) {
            (DownloadFormat::Webp, Some(webp_url)) => (webp_url.clone(), DownloadFormat::Webp),
            // No stored derivative for the requested format: serve the
            // original under the requested label.
            (DownloadFormat::Webp, None) => (wallpaper.image_url.clone(), DownloadFormat::Jpg),
            (other, _) => (wallpaper.image_url.clone(), other),
        };

        // The fetch decides. No bytes, no count.
        let bytes = self.storage.fetch(&url).await?;

        if let Err(e) = self.wallpaper_repo.increment_download_count(id).await {
            tracing::warn!(%id, error = %e, "failed to record download, delivering anyway");
        }

        Ok(DownloadPayload {
            bytes,
            content_type: format.content_type(),
            file_name: attachment_file_name(&wallpaper.title, &format.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_formats() {
        assert_eq!(DownloadFormat::parse(Some("webp")), DownloadFormat::Webp);
        assert_eq!(DownloadFormat::parse(Some("png")), DownloadFormat::Png);
        assert_eq!(DownloadFormat::parse(Some("jpg")), DownloadFormat::Jpg);
    }

    #[test]
    fn parse_defaults_to_jpg() {
        assert_eq!(DownloadFormat::parse(None), DownloadFormat::Jpg);
        assert_eq!(DownloadFormat::parse(Some("gif")), DownloadFormat::Jpg);
    }
}
