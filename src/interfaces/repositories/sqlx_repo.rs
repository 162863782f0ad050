use sqlx::PgPool;

#[derive(Clone)]
pub struct SqlxWallpaperRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxCategoryRepo {
    pub pool: PgPool,
}
