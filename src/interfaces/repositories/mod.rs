pub mod category;
pub mod sqlx_repo;
pub mod wallpaper;
