use std::io::Cursor;

use chrono::Utc;
use mockall::mock;
use uuid::Uuid;

use wallpaper_backend::{
    entities::{
        category::Category,
        wallpaper::{Wallpaper, WallpaperInsert},
    },
    errors::AppError,
    repositories::{category::CategoryRepository, wallpaper::WallpaperRepository},
    storage::ObjectStorage,
    media::ImageTranscoder,
};

// Mockall cannot mock an async method whose argument nests a reference
// (`Option<&str>`), so the mock exposes sync inherent methods and the
// async trait impl below delegates to them.
mock! {
    pub WallpaperRepo {
        pub fn insert_wallpaper(&self, wallpaper: &WallpaperInsert) -> Result<Wallpaper, AppError>;
        pub fn get_wallpaper_by_id(&self, id: &Uuid) -> Result<Wallpaper, AppError>;
        pub fn list_wallpapers<'a>(
            &self,
            category_id: Option<Uuid>,
            search: Option<&'a str>,
            page: u32,
            per_page: u32,
        ) -> Result<Vec<Wallpaper>, AppError>;
        pub fn update_wallpaper_metadata(
            &self,
            id: &Uuid,
            title: &str,
            category_id: Option<Uuid>,
        ) -> Result<(), AppError>;
        pub fn update_wallpaper_image(
            &self,
            id: &Uuid,
            title: &str,
            category_id: Option<Uuid>,
            image_url: &str,
            webp_url: &str,
            thumbnail_url: &str,
        ) -> Result<(), AppError>;
        pub fn increment_download_count(&self, id: &Uuid) -> Result<(), AppError>;
        pub fn delete_wallpaper(&self, id: &Uuid) -> Result<(), AppError>;
    }
}

#[async_trait::async_trait]
impl WallpaperRepository for MockWallpaperRepo {
    async fn insert_wallpaper(&self, wallpaper: &WallpaperInsert) -> Result<Wallpaper, AppError> {
        MockWallpaperRepo::insert_wallpaper(self, wallpaper)
    }
    async fn get_wallpaper_by_id(&self, id: &Uuid) -> Result<Wallpaper, AppError> {
        MockWallpaperRepo::get_wallpaper_by_id(self, id)
    }
    async fn list_wallpapers(
        &self,
        category_id: Option<Uuid>,
        search: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Wallpaper>, AppError> {
        MockWallpaperRepo::list_wallpapers(self, category_id, search, page, per_page)
    }
    async fn update_wallpaper_metadata(
        &self,
        id: &Uuid,
        title: &str,
        category_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        MockWallpaperRepo::update_wallpaper_metadata(self, id, title, category_id)
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
        MockWallpaperRepo::update_wallpaper_image(
            self,
            id,
            title,
            category_id,
            image_url,
            webp_url,
            thumbnail_url,
        )
    }
    async fn increment_download_count(&self, id: &Uuid) -> Result<(), AppError> {
        MockWallpaperRepo::increment_download_count(self, id)
    }
    async fn delete_wallpaper(&self, id: &Uuid) -> Result<(), AppError> {
        MockWallpaperRepo::delete_wallpaper(self, id)
    }
}

mock! {
    pub CategoryRepo {}

    #[async_trait::async_trait]
    impl CategoryRepository for CategoryRepo {
        async fn list_categories(&self) -> Result<Vec<Category>, AppError>;
    }
}

mock! {
    pub Storage {}

    #[async_trait::async_trait]
    impl ObjectStorage for Storage {
        async fn ensure_bucket(&self, bucket: &str) -> Result<(), AppError>;
        async fn upload(
            &self,
            bucket: &str,
            key: &str,
            bytes: Vec<u8>,
            content_type: &str,
        ) -> Result<(), AppError>;
        fn public_url(&self, bucket: &str, key: &str) -> Result<String, AppError>;
        async fn remove(&self, bucket: &str, keys: &[String]) -> Result<(), AppError>;
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError>;
    }
}

mock! {
    pub Transcoder {}

    #[async_trait::async_trait]
    impl ImageTranscoder for Transcoder {
        async fn dimensions(&self, bytes: &[u8]) -> Option<(u32, u32)>;
        async fn encode_webp(&self, bytes: &[u8], quality: f32) -> Result<Vec<u8>, AppError>;
    }
}

#[allow(dead_code)]
pub const BUCKET: &str = "wallpapers";

#[allow(dead_code)]
pub fn public_url(key: &str) -> String {
    format!("https://xyz.supabase.co/storage/v1/object/public/{BUCKET}/{key}")
}

/// A stored row whose URLs parse back to bucket/key pairs, the way the
/// create workflow writes them. Thumbnail aliases the WebP object.
#[allow(dead_code)]
pub fn sample_wallpaper(id: Uuid) -> Wallpaper {
    Wallpaper {
        id,
        title: "Test".into(),
        description: String::new(),
        image_url: public_url("1700000000000-abcdef.jpg"),
        webp_url: Some(public_url("1700000000000-abcdef.webp")),
        thumbnail_url: public_url("1700000000000-abcdef.webp"),
        category_id: None,
        tags: vec![],
        download_count: 0,
        width: 1920,
        height: 1080,
        file_size: 1024,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Commits an insert the way the real repository would.
#[allow(dead_code)]
pub fn row_from_insert(insert: &WallpaperInsert) -> Wallpaper {
    Wallpaper {
        id: Uuid::new_v4(),
        title: insert.title.clone(),
        description: insert.description.clone(),
        image_url: insert.image_url.clone(),
        webp_url: insert.webp_url.clone(),
        thumbnail_url: insert.thumbnail_url.clone(),
        category_id: insert.category_id,
        tags: insert.tags.clone(),
        download_count: 0,
        width: insert.width,
        height: insert.height,
        file_size: insert.file_size,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[allow(dead_code)]
pub fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([30, 60, 90]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}
