pub mod categories;
pub mod system;
pub mod wallpapers;
