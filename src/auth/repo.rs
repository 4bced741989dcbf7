use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};

const USER_COLUMNS: &str = "id, fullname, email, password_hash";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

fn duplicate_email(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StoreError::DuplicateEmail;
        }
    }
    StoreError::Db(e)
}

/// Persistence operations the auth service needs on `users`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Fails with `StoreError::DuplicateEmail` when the unique constraint rejects the row.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
    async fn update_reset_link(
        &self,
        user_id: Uuid,
        link: &str,
        expires_at: OffsetDateTime,
    ) -> Result<(), StoreError>;
    /// Sets `password_hash` and clears the reset link of the user holding an
    /// unexpired `link`. Returns the user id, or `None` when nothing matched.
    async fn update_password_by_reset_link(
        &self,
        link: &str,
        password_hash: &str,
        now: OffsetDateTime,
    ) -> Result<Option<Uuid>, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (fullname, email, password_hash, phone, address, image)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.fullname)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(&user.image)
        .fetch_one(&self.db)
        .await
        .map_err(duplicate_email)?;
        Ok(created)
    }

    async fn update_reset_link(
        &self,
        user_id: Uuid,
        link: &str,
        expires_at: OffsetDateTime,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users
               SET reset_link = $2, reset_link_expires_at = $3, updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(link)
        .bind(expires_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn update_password_by_reset_link(
        &self,
        link: &str,
        password_hash: &str,
        now: OffsetDateTime,
    ) -> Result<Option<Uuid>, StoreError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE users
               SET password_hash = $2,
                   reset_link = NULL,
                   reset_link_expires_at = NULL,
                   updated_at = now()
             WHERE reset_link = $1
               AND reset_link_expires_at > $3
            RETURNING id
            "#,
        )
        .bind(link)
        .bind(password_hash)
        .bind(now)
        .fetch_optional(&self.db)
        .await?;
        Ok(id)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::testing::unique_violation;
    use time::Duration;

    #[test]
    fn unique_violation_means_duplicate_email() {
        assert!(matches!(
            duplicate_email(unique_violation()),
            StoreError::DuplicateEmail
        ));
        assert!(matches!(
            duplicate_email(sqlx::Error::PoolTimedOut),
            StoreError::Db(_)
        ));
    }

    fn jane(email: &str) -> NewUser {
        NewUser {
            fullname: "Jane Doe".into(),
            email: email.into(),
            password_hash: "old-hash".into(),
            phone: None,
            address: None,
            image: "http://img/profile.png".into(),
        }
    }

    async fn reset_columns(db: &PgPool, id: Uuid) -> (Option<String>, Option<OffsetDateTime>) {
        sqlx::query_as("SELECT reset_link, reset_link_expires_at FROM users WHERE id = $1")
            .bind(id)
            .fetch_one(db)
            .await
            .unwrap()
    }

    #[sqlx::test]
    #[ignore = "requires a postgres DATABASE_URL"]
    async fn pg_second_insert_with_same_email_is_duplicate(db: PgPool) {
        let store = PgUserStore::new(db);
        store.create(jane("jane@x.com")).await.unwrap();
        assert!(matches!(
            store.create(jane("jane@x.com")).await,
            Err(StoreError::DuplicateEmail)
        ));
    }

    #[sqlx::test]
    #[ignore = "requires a postgres DATABASE_URL"]
    async fn pg_reset_sets_hash_and_clears_link_once(db: PgPool) {
        let store = PgUserStore::new(db.clone());
        let user = store.create(jane("jane@x.com")).await.unwrap();
        let now = OffsetDateTime::now_utc();
        store
            .update_reset_link(user.id, "tok", now + Duration::minutes(60))
            .await
            .unwrap();

        let reset = store
            .update_password_by_reset_link("tok", "new-hash", now)
            .await
            .unwrap();
        assert_eq!(reset, Some(user.id));
        assert_eq!(reset_columns(&db, user.id).await, (None, None));
        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "new-hash");

        assert_eq!(
            store
                .update_password_by_reset_link("tok", "other-hash", now)
                .await
                .unwrap(),
            None
        );
    }

    #[sqlx::test]
    #[ignore = "requires a postgres DATABASE_URL"]
    async fn pg_expired_link_alters_nothing(db: PgPool) {
        let store = PgUserStore::new(db.clone());
        let user = store.create(jane("jane@x.com")).await.unwrap();
        let now = OffsetDateTime::now_utc();
        store
            .update_reset_link(user.id, "tok", now - Duration::minutes(1))
            .await
            .unwrap();

        assert_eq!(
            store
                .update_password_by_reset_link("tok", "new-hash", now)
                .await
                .unwrap(),
            None
        );
        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "old-hash");
        assert_eq!(reset_columns(&db, user.id).await.0.as_deref(), Some("tok"));
    }
}
