use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Columns returned by journey writes.
#[derive(Debug, Clone, FromRow)]
pub struct Journey {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

/// Fields supplied when inserting a journey.
#[derive(Debug, Clone)]
pub struct NewJourney {
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub image: String,
}

/// Journey joined with its owner and bookmark count.
#[derive(Debug, Clone, FromRow)]
pub struct JourneyRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: String,
    pub created_at: OffsetDateTime,
    pub user_id: Uuid,
    pub user_fullname: String,
    pub user_email: String,
    pub user_image: String,
    pub bookmark_count: i64,
}
