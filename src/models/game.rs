use chrono::{DateTime, Utc};
use rocket::serde::Serialize;
use schemars::JsonSchema;
use uuid::Uuid;

/// Local cache row for an external catalog entry. Title and cover are fixed
/// at first insert and never refreshed from the catalog.
#[derive(Serialize, Debug, Clone, sqlx::FromRow)]
pub struct Game {
    pub id: Uuid,
    pub api_id: i64,
    pub title: String,
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Projection of a catalog search hit returned to clients.
#[derive(Serialize, Debug, PartialEq, JsonSchema)]
pub struct GameSearchResult {
    pub id: i64,
    pub name: String,
    pub released: Option<String>,
    pub background_image: Option<String>,
}
