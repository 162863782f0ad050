use async_trait::async_trait;
use uuid::Uuid;
use sqlx::{self, PgPool, QueryBuilder};

use crate::{
    entities::wallpaper::{Wallpaper, WallpaperInsert},
    errors::AppError,
    repositories::sqlx_repo::SqlxWallpaperRepo,
};

/// Helper to compute OFFSET safely from 1-based `page` and `per_page`.
fn page_offset(page: u32, per_page: u32) -> i64 {
    let page = page.saturating_sub(1);
    (page as i64) * (per_page as i64)
}

/// Metadata store boundary for the `wallpapers` relation. Single-row writes
/// are atomic; `increment_download_count` uses a store-side increment
/// expression so concurrent downloads commute.
#[async_trait]
pub trait WallpaperRepository: Sync + Send {
    async fn insert_wallpaper(&self, wallpaper: &WallpaperInsert) -> Result<Wallpaper, AppError>;
    async fn get_wallpaper_by_id(&self, id: &Uuid) -> Result<Wallpaper, AppError>;
    async fn list_wallpapers(
        &self,
        category_id: Option<Uuid>,
        search: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Wallpaper>, AppError>;
    async fn update_wallpaper_metadata(
        &self,
        id: &Uuid,
        title: &str,
        category_id: Option<Uuid>,
    ) -> Result<(), AppError>;
    async fn update_wallpaper_image(
        &self,
        id: &Uuid,
        title: &str,
        category_id: Option<Uuid>,
        image_url: &str,
        webp_url: &str,
        thumbnail_url: &str,
    ) -> Result<(), AppError>;
    async fn increment_download_count(&self, id: &Uuid) -> Result<(), AppError>;
    async fn delete_wallpaper(&self, id: &Uuid) -> Result<(), AppError>;
}

impl SqlxWallpaperRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxWallpaperRepo { pool }
    }
}

#[async_trait]
impl WallpaperRepository for SqlxWallpaperRepo {
    async fn insert_wallpaper(&self, wallpaper: &WallpaperInsert) -> Result<Wallpaper, AppError> {
        let row = sqlx::query_as::<_, Wallpaper>(
            r#"
            INSERT INTO wallpapers (
                title, description, image_url, webp_url, thumbnail_url,
                category_id, tags, width, height, file_size
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&wallpaper.title)
        .bind(&wallpaper.description)
        .bind(&wallpaper.image_url)
        .bind(&wallpaper.webp_url)
        .bind(&wallpaper.thumbnail_url)
        .bind(wallpaper.category_id)
        .bind(&wallpaper.tags)
        .bind(wallpaper.width)
        .bind(wallpaper.height)
        .bind(wallpaper.file_size)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_wallpaper_by_id(&self, id: &Uuid) -> Result<Wallpaper, AppError> {
        let wallpaper = sqlx::query_as::<_, Wallpaper>(
            "SELECT * FROM wallpapers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Wallpaper not found".into()))?;

        Ok(wallpaper)
    }

    async fn list_wallpapers(
        &self,
        category_id: Option<Uuid>,
        search: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Wallpaper>, AppError> {
        let mut query = QueryBuilder::new("SELECT * FROM wallpapers WHERE TRUE");

        if let Some(category_id) = category_id {
            query.push(" AND category_id = ");
            query.push_bind(category_id);
        }
        if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query.push(" AND (title ILIKE ");
            query.push_bind(format!("%{search}%"));
            query.push(" OR ");
            query.push_bind(search.to_string());
            query.push(" = ANY(tags))");
        }

        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(per_page as i64);
        query.push(" OFFSET ");
        query.push_bind(page_offset(page, per_page));

        let wallpapers = query
            .build_query_as::<Wallpaper>()
            .fetch_all(&self.pool)
            .await?;

        Ok(wallpapers)
    }

    async fn update_wallpaper_metadata(
        &self,
        id: &Uuid,
        title: &str,
        category_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE wallpapers
            SET title = $1, category_id = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(title)
        .bind(category_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Wallpaper not found".into()));
        }
        Ok(())
    }

    async fn update_wallpaper_image(
        &self,
        id: &Uuid,
        title: &str,
        category_id: Option<Uuid>,
        image_url: &str,
        webp_url: &str,
        thumbnail_url: &str,
    ) -> Result<(), AppError> {
        // Single statement: the row is either fully re-pointed at the new
        // objects or untouched.
        let result = sqlx::query(
            r#"
            UPDATE wallpapers
            SET title = $1, category_id = $2, image_url = $3, webp_url = $4,
                thumbnail_url = $5, updated_at = NOW()
            WHERE id = $6
            "#,
        )
        .bind(title)
        .bind(category_id)
        .bind(image_url)
        .bind(webp_url)
        .bind(thumbnail_url)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Wallpaper not found".into()));
        }
        Ok(())
    }

    async fn increment_download_count(&self, id: &Uuid) -> Result<(), AppError> {
        // Increment expression, not read-modify-write: lost-update-free
        // under concurrent downloads of the same id.
        let result = sqlx::query(
            "UPDATE wallpapers SET download_count = download_count + 1 WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Wallpaper not found".into()));
        }
        Ok(())
    }

    async fn delete_wallpaper(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM wallpapers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Wallpaper not found".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_based_from_one_based_pages() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 20), 40);
        // Page 0 is treated as page 1 rather than underflowing.
        assert_eq!(page_offset(0, 20), 0);
    }
}
