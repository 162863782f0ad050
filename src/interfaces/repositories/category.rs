use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    entities::category::Category,
    errors::AppError,
    repositories::sqlx_repo::SqlxCategoryRepo,
};

/// Read-only view of the `categories` relation.
#[async_trait]
pub trait CategoryRepository: Sync + Send {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;
}

impl SqlxCategoryRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxCategoryRepo { pool }
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepo {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}
