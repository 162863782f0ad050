pub mod download;
pub mod gallery;
pub mod ingestion;
pub mod saga;
