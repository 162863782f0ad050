pub mod category;
pub mod wallpaper;
