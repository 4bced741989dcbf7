use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::journeys::repo_types::{Journey, JourneyRow, NewJourney};

const JOURNEY_COLUMNS: &str = "id, title, description";

pub(crate) const JOURNEY_ROW_SELECT: &str = r#"
    SELECT j.id, j.title, j.description, j.image, j.created_at,
           u.id       AS user_id,
           u.fullname AS user_fullname,
           u.email    AS user_email,
           u.image    AS user_image,
           (SELECT COUNT(*) FROM bookmarks b WHERE b.journey_id = j.id) AS bookmark_count
      FROM journeys j
      JOIN users u ON u.id = j.user_id
"#;

fn unique_title(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return AppError::JourneyExists;
        }
    }
    AppError::Store(e)
}

/// Persistence operations on `journeys`.
#[async_trait]
pub trait JourneyStore: Send + Sync {
    /// All journeys, newest first.
    async fn list_all(&self) -> AppResult<Vec<JourneyRow>>;
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<JourneyRow>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<JourneyRow>>;
    async fn exists(&self, id: Uuid) -> AppResult<bool>;
    async fn title_taken(&self, title: &str) -> AppResult<bool>;
    /// Unique violation on `title` surfaces as `AppError::JourneyExists`.
    async fn insert(&self, journey: NewJourney) -> AppResult<Journey>;
    /// Patches a journey owned by `user_id`; `None` when it is absent or not theirs.
    async fn update_owned(
        &self,
        id: Uuid,
        user_id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
    ) -> AppResult<Option<Journey>>;
    /// Deletes a journey owned by `user_id`, returning its image URL.
    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<String>>;
}

#[derive(Clone)]
pub struct PgJourneyStore {
    db: PgPool,
}

impl PgJourneyStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl JourneyStore for PgJourneyStore {
    async fn list_all(&self) -> AppResult<Vec<JourneyRow>> {
        let rows = sqlx::query_as::<_, JourneyRow>(&format!(
            "{JOURNEY_ROW_SELECT} ORDER BY j.created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<JourneyRow>> {
        let rows = sqlx::query_as::<_, JourneyRow>(&format!(
            "{JOURNEY_ROW_SELECT} WHERE j.user_id = $1 ORDER BY j.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<JourneyRow>> {
        let row =
            sqlx::query_as::<_, JourneyRow>(&format!("{JOURNEY_ROW_SELECT} WHERE j.id = $1"))
                .bind(id)
                .fetch_optional(&self.db)
                .await?;
        Ok(row)
    }

    async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let found =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM journeys WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.db)
                .await?;
        Ok(found)
    }

    async fn title_taken(&self, title: &str) -> AppResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM journeys WHERE title = $1)",
        )
        .bind(title)
        .fetch_one(&self.db)
        .await?;
        Ok(taken)
    }

    async fn insert(&self, journey: NewJourney) -> AppResult<Journey> {
        sqlx::query_as::<_, Journey>(&format!(
            r#"
            INSERT INTO journeys (user_id, title, description, image)
            VALUES ($1, $2, $3, $4)
            RETURNING {JOURNEY_COLUMNS}
            "#
        ))
        .bind(journey.user_id)
        .bind(&journey.title)
        .bind(&journey.description)
        .bind(&journey.image)
        .fetch_one(&self.db)
        .await
        .map_err(unique_title)
    }

    async fn update_owned(
        &self,
        id: Uuid,
        user_id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
    ) -> AppResult<Option<Journey>> {
        sqlx::query_as::<_, Journey>(&format!(
            r#"
            UPDATE journeys
               SET title = COALESCE($3, title),
                   description = COALESCE($4, description),
                   updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {JOURNEY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(title)
        .bind(description)
        .fetch_optional(&self.db)
        .await
        .map_err(unique_title)
    }

    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<String>> {
        let image = sqlx::query_scalar::<_, String>(
            "DELETE FROM journeys WHERE id = $1 AND user_id = $2 RETURNING image",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(image)
    }
}
