use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::journeys::{repo::JOURNEY_ROW_SELECT, repo_types::JourneyRow};

#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// Idempotent: bookmarking twice keeps a single row.
    async fn add(&self, user_id: Uuid, journey_id: Uuid) -> AppResult<()>;
    /// Returns whether a bookmark was removed.
    async fn remove(&self, user_id: Uuid, journey_id: Uuid) -> AppResult<bool>;
    /// Journeys bookmarked by `user_id`, most recently bookmarked first.
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<JourneyRow>>;
}

#[derive(Clone)]
pub struct PgBookmarkStore {
    db: PgPool,
}

impl PgBookmarkStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookmarkStore for PgBookmarkStore {
    async fn add(&self, user_id: Uuid, journey_id: Uuid) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO bookmarks (user_id, journey_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, journey_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(journey_id)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn remove(&self, user_id: Uuid, journey_id: Uuid) -> AppResult<bool> {
        let res = sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND journey_id = $2")
            .bind(user_id)
            .bind(journey_id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<JourneyRow>> {
        let rows = sqlx::query_as::<_, JourneyRow>(&format!(
            r#"{JOURNEY_ROW_SELECT}
              JOIN bookmarks mine ON mine.journey_id = j.id AND mine.user_id = $1
             ORDER BY mine.created_at DESC"#
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
