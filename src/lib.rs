mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{db, media, storage};

use interfaces::repositories::sqlx_repo::{SqlxCategoryRepo, SqlxWallpaperRepo};
use media::ImageRsTranscoder;
use storage::SupabaseStorage;
use use_cases::{download::DownloadHandler, gallery::GalleryHandler, ingestion::IngestionWorkflow};

pub type AppIngestion = IngestionWorkflow<SqlxWallpaperRepo, SupabaseStorage, ImageRsTranscoder>;
pub type AppDownloads = DownloadHandler<SqlxWallpaperRepo, SupabaseStorage>;
pub type AppGallery = GalleryHandler<SqlxWallpaperRepo, SqlxCategoryRepo>;

pub struct AppState {
    pub ingestion: AppIngestion,
    pub downloads: AppDownloads,
    pub gallery: AppGallery,
    pub db_pool: sqlx::PgPool,
}

impl AppState {
    pub fn new(config: &settings::AppConfig, pool: sqlx::PgPool) -> Self {
        let storage = SupabaseStorage::new(config);
        let wallpaper_repo = SqlxWallpaperRepo::new(pool.clone());
        let category_repo = SqlxCategoryRepo::new(pool.clone());

        let ingestion = IngestionWorkflow::new(
            wallpaper_repo.clone(),
            storage.clone(),
            ImageRsTranscoder,
            config.storage_bucket.clone(),
        );
        let downloads = DownloadHandler::new(wallpaper_repo.clone(), storage);
        let gallery = GalleryHandler::new(wallpaper_repo, category_repo);

        AppState {
            ingestion,
            downloads,
            gallery,
            db_pool: pool,
        }
    }
}
