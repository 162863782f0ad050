use actix_multipart::form::MultipartForm;
use actix_web::{web, Either, HttpResponse, Responder};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::wallpaper::{
        DownloadRequest, EditWallpaper, ListWallpapersQuery, NewWallpaperUpload, ReplacementFile,
        UpdateWallpaperRequest, WallpaperCreatedResponse, WallpaperEditForm, WallpaperUploadForm,
    },
    errors::AppError,
    use_cases::download::DownloadFormat,
    AppState,
};

#[instrument(skip(state, form))]
pub async fn upload_wallpaper(
    state: web::Data<AppState>,
    form: MultipartForm<WallpaperUploadForm>,
) -> Result<impl Responder, AppError> {
    let form = form.into_inner();

    let declared_mime = form.file.content_type.as_ref().map(|m| m.to_string());
    let file_name = form.file.file_name.clone();
    let bytes = read_temp_file(&form.file).await?;

    let upload = NewWallpaperUpload {
        bytes,
        declared_mime,
        file_name,
        title: form.title.into_inner(),
        description: form.description.map(|d| d.into_inner()),
        category_id: parse_category_id(form.category_id.map(|c| c.into_inner()))?,
        tags: form.tags.map(|t| t.into_inner()),
    };

    let wallpaper = state.ingestion.create_wallpaper(upload).await?;

    Ok(HttpResponse::Ok().json(WallpaperCreatedResponse {
        success: true,
        wallpaper,
    }))
}

/// Edits arrive either as multipart (optionally carrying a replacement
/// file) or as plain JSON for metadata-only changes.
#[instrument(skip(state, data_input))]
pub async fn edit_wallpaper(
    state: web::Data<AppState>,
    data_input: Result<
        Either<MultipartForm<WallpaperEditForm>, web::Json<UpdateWallpaperRequest>>,
        actix_web::Error,
    >,
) -> Result<impl Responder, AppError> {
    let either = data_input.map_err(|e| {
        AppError::validation(
            "content_type",
            &format!("Request must be multipart/form-data or application/json: {e}"),
        )
    })?;

    let edit = match either {
        Either::Left(form) => {
            let form = form.into_inner();

            let replacement = match form.file {
                Some(file) => Some(ReplacementFile {
                    declared_mime: file.content_type.as_ref().map(|m| m.to_string()),
                    file_name: file.file_name.clone(),
                    bytes: read_temp_file(&file).await?,
                }),
                None => None,
            };

            EditWallpaper {
                id: parse_id(&form.id)?,
                title: form.title.into_inner(),
                category_id: parse_category_id(form.category_id.map(|c| c.into_inner()))?,
                replacement,
            }
        }
        Either::Right(json) => {
            let request = json.into_inner();
            request.validate()?;

            EditWallpaper {
                id: request.id,
                title: request.title,
                category_id: request.category_id,
                replacement: None,
            }
        }
    };

    state.ingestion.edit_wallpaper(edit).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub id: Uuid,
}

#[instrument(skip(state))]
pub async fn delete_wallpaper(
    state: web::Data<AppState>,
    query: web::Query<DeleteQuery>,
) -> Result<impl Responder, AppError> {
    let outcome = state.ingestion.delete_wallpaper(&query.id).await?;

    let body = if outcome.warnings.is_empty() {
        serde_json::json!({ "success": true })
    } else {
        serde_json::json!({ "success": true, "warning": outcome.warnings.join("; ") })
    };

    Ok(HttpResponse::Ok().json(body))
}

#[instrument(skip(state, data))]
pub async fn download_wallpaper(
    state: web::Data<AppState>,
    data: web::Json<DownloadRequest>,
) -> Result<impl Responder, AppError> {
    let request = data.into_inner();
    let format = DownloadFormat::parse(request.format.as_deref());

    let payload = state.downloads.download(&request.id, format).await?;

    Ok(HttpResponse::Ok()
        .content_type(payload.content_type)
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", payload.file_name),
        ))
        .insert_header(("Cache-Control", "no-cache"))
        .body(payload.bytes))
}

#[instrument(skip(state, query))]
pub async fn list_wallpapers(
    state: web::Data<AppState>,
    query: web::Query<ListWallpapersQuery>,
) -> Result<impl Responder, AppError> {
    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(20).min(100);

    let wallpapers = state
        .gallery
        .list_wallpapers(query.category, query.search.as_deref(), page, per_page)
        .await?;

    Ok(HttpResponse::Ok().json(wallpapers))
}

#[instrument(skip(state))]
pub async fn get_wallpaper(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let wallpaper = state.gallery.get_wallpaper(&id).await?;
    Ok(HttpResponse::Ok().json(wallpaper))
}

async fn read_temp_file(file: &actix_multipart::form::tempfile::TempFile) -> Result<Vec<u8>, AppError> {
    tokio::fs::read(file.file.path())
        .await
        .map_err(|e| AppError::InternalError(format!("failed to read upload: {e}")))
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::validation("id", "invalid wallpaper id"))
}

/// Empty string means "uncategorized" (the form sends it for the blank
/// option); anything else must be a valid category id.
fn parse_category_id(raw: Option<String>) -> Result<Option<Uuid>, AppError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Uuid::parse_str(value)
            .map(Some)
            .map_err(|_| AppError::validation("categoryId", "invalid category id")),
    }
}
