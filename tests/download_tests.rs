mod common;

use std::sync::Arc;

use common::*;
use mockall::predicate::*;
use uuid::Uuid;

use wallpaper_backend::{
    errors::AppError,
    use_cases::download::{DownloadFormat, DownloadHandler},
};

#[tokio::test]
async fn successful_download_counts_exactly_once() {
    let mut repo = MockWallpaperRepo::new();
    let mut storage = MockStorage::new();
    let id = Uuid::new_v4();

    repo.expect_get_wallpaper_by_id()
        .returning(|id| Ok(sample_wallpaper(*id)));
    storage
        .expect_fetch()
        .withf(|url| url.ends_with(".webp"))
        .times(1)
        .returning(|_| Ok(vec![1, 2, 3]));
    repo.expect_increment_download_count()
        .with(eq(id))
        .times(1)
        .returning(|_| Ok(()));

    let handler = DownloadHandler::new(repo, storage);

    let payload = handler.download(&id, DownloadFormat::Webp).await.unwrap();

    assert_eq!(payload.bytes, vec![1, 2, 3]);
    assert_eq!(payload.content_type, "image/webp");
    assert_eq!(payload.file_name, "test.webp");
}

#[tokio::test]
async fn failed_fetch_does_not_touch_the_counter() {
    let mut repo = MockWallpaperRepo::new();
    let mut storage = MockStorage::new();

    repo.expect_get_wallpaper_by_id()
        .returning(|id| Ok(sample_wallpaper(*id)));
    storage
        .expect_fetch()
        .returning(|_| Err(AppError::Storage("object gone".into())));
    repo.expect_increment_download_count().never();

    let handler = DownloadHandler::new(repo, storage);

    let err = handler
        .download(&Uuid::new_v4(), DownloadFormat::Jpg)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Storage(_)));
}

#[tokio::test]
async fn failed_count_still_delivers_the_bytes() {
    let mut repo = MockWallpaperRepo::new();
    let mut storage = MockStorage::new();

    repo.expect_get_wallpaper_by_id()
        .returning(|id| Ok(sample_wallpaper(*id)));
    storage.expect_fetch().returning(|_| Ok(vec![7; 32]));
    repo.expect_increment_download_count()
        .times(1)
        .returning(|_| Err(AppError::Database("connection reset".into())));

    let handler = DownloadHandler::new(repo, storage);

    let payload = handler.download(&Uuid::new_v4(), DownloadFormat::Jpg).await.unwrap();
    assert_eq!(payload.bytes.len(), 32);
}

#[tokio::test]
async fn missing_row_is_not_found() {
    let mut repo = MockWallpaperRepo::new();
    let mut storage = MockStorage::new();

    repo.expect_get_wallpaper_by_id()
        .returning(|_| Err(AppError::NotFound("Wallpaper not found".into())));
    storage.expect_fetch().never();
    repo.expect_increment_download_count().never();

    let handler = DownloadHandler::new(repo, storage);

    let err = handler
        .download(&Uuid::new_v4(), DownloadFormat::Webp)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn webp_request_without_derivative_serves_the_original_as_jpg() {
    let mut repo = MockWallpaperRepo::new();
    let mut storage = MockStorage::new();

    repo.expect_get_wallpaper_by_id().returning(|id| {
        let mut wallpaper = sample_wallpaper(*id);
        wallpaper.webp_url = None;
        Ok(wallpaper)
    });
    storage
        .expect_fetch()
        .withf(|url| url.ends_with(".jpg"))
        .times(1)
        .returning(|_| Ok(vec![1]));
    repo.expect_increment_download_count().returning(|_| Ok(()));

    let handler = DownloadHandler::new(repo, storage);

    let payload = handler
        .download(&Uuid::new_v4(), DownloadFormat::Webp)
        .await
        .unwrap();

    assert_eq!(payload.content_type, "image/jpeg");
    assert_eq!(payload.file_name, "test.jpg");
}

#[tokio::test]
async fn png_request_serves_the_original_under_the_png_label() {
    let mut repo = MockWallpaperRepo::new();
    let mut storage = MockStorage::new();

    repo.expect_get_wallpaper_by_id()
        .returning(|id| Ok(sample_wallpaper(*id)));
    storage
        .expect_fetch()
        .withf(|url| url.ends_with(".jpg"))
        .times(1)
        .returning(|_| Ok(vec![1]));
    repo.expect_increment_download_count().returning(|_| Ok(()));

    let handler = DownloadHandler::new(repo, storage);

    let payload = handler
        .download(&Uuid::new_v4(), DownloadFormat::Png)
        .await
        .unwrap();

    assert_eq!(payload.content_type, "image/png");
    assert_eq!(payload.file_name, "test.png");
}

#[tokio::test]
async fn concurrent_downloads_each_record_a_count() {
    const DOWNLOADS: usize = 8;

    let mut repo = MockWallpaperRepo::new();
    let mut storage = MockStorage::new();
    let id = Uuid::new_v4();

    repo.expect_get_wallpaper_by_id()
        .times(DOWNLOADS)
        .returning(|id| Ok(sample_wallpaper(*id)));
    storage
        .expect_fetch()
        .times(DOWNLOADS)
        .returning(|_| Ok(vec![0; 8]));
    repo.expect_increment_download_count()
        .with(eq(id))
        .times(DOWNLOADS)
        .returning(|_| Ok(()));

    let handler = Arc::new(DownloadHandler::new(repo, storage));

    let tasks: Vec<_> = (0..DOWNLOADS)
        .map(|_| {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move { handler.download(&id, DownloadFormat::Jpg).await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }
}
