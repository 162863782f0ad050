use actix_web::web;

use crate::handlers::{
    categories::list_categories,
    system::health_check,
    wallpapers::{
        delete_wallpaper, download_wallpaper, edit_wallpaper, get_wallpaper, list_wallpapers,
        upload_wallpaper,
    },
};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check);

    cfg.service(
        web::scope("/api")
            .service(
                // Literal segments are registered before the `{id}` catch-all.
                web::scope("/wallpapers")
                    .route("", web::get().to(list_wallpapers))
                    .route("/upload", web::post().to(upload_wallpaper))
                    .route("/edit", web::post().to(edit_wallpaper))
                    .route("/delete", web::delete().to(delete_wallpaper))
                    .route("/download", web::post().to(download_wallpaper))
                    .route("/{id}", web::get().to(get_wallpaper)),
            )
            .route("/categories", web::get().to(list_categories)),
    );
}
