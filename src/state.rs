use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo::{PgUserStore, UserStore};
use crate::bookmarks::repo::{BookmarkStore, PgBookmarkStore};
use crate::config::AppConfig;
use crate::journeys::repo::{JourneyStore, PgJourneyStore};
use crate::mail::{self, Mailer};
use crate::storage::{Storage, StorageClient};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub users: Arc<dyn UserStore>,
    pub journeys: Arc<dyn JourneyStore>,
    pub bookmarks: Arc<dyn BookmarkStore>,
    pub mailer: Arc<dyn Mailer>,
    pub storage: Arc<dyn StorageClient>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let storage = Arc::new(Storage::new(&config.storage).await?) as Arc<dyn StorageClient>;
        let mailer = mail::from_config(&config.mail)?;

        Ok(Self {
            keys: JwtKeys::new(&config.jwt),
            users: Arc::new(PgUserStore::new(db.clone())),
            journeys: Arc::new(PgJourneyStore::new(db.clone())),
            bookmarks: Arc::new(PgBookmarkStore::new(db.clone())),
            db,
            config,
            mailer,
            storage,
        })
    }
}
