use uuid::Uuid;

use crate::{
    entities::{category::Category, wallpaper::Wallpaper},
    errors::AppError,
    repositories::{category::CategoryRepository, wallpaper::WallpaperRepository},
};

/// Read side of the gallery: browse, search, categories. No storage
/// interaction; rows are only visible once the ingestion workflow has
/// committed them.
pub struct GalleryHandler<R, C> {
    pub wallpaper_repo: R,
    pub category_repo: C,
}

impl<R, C> GalleryHandler<R, C>
where
    R: WallpaperRepository,
    C: CategoryRepository,
{
    pub fn new(wallpaper_repo: R, category_repo: C) -> Self {
        GalleryHandler { wallpaper_repo, category_repo }
    }

    pub async fn list_wallpapers(
        &self,
        category_id: Option<Uuid>,
        search: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Wallpaper>, AppError> {
        self.wallpaper_repo
            .list_wallpapers(category_id, search, page, per_page)
            .await
    }

    pub async fn get_wallpaper(&self, id: &Uuid) -> Result<Wallpaper, AppError> {
        self.wallpaper_repo.get_wallpaper_by_id(id).await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.category_repo.list_categories().await
    }
}
