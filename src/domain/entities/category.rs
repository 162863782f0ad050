use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Categories are managed out of band; this core only reads them and
/// references their ids from wallpapers.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}
