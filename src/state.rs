use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    auth::jwt::JwtKeys,
    clock::SystemClock,
    config::AppConfig,
    posts::repo::{PgPostStore, PostStore},
    users::repo::{PgUserStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub posts: Arc<dyn PostStore>,
    pub keys: JwtKeys,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        // Run migrations if present
        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
        }

        Ok(Self {
            users: Arc::new(PgUserStore::new(db.clone())),
            posts: Arc::new(PgPostStore::new(db)),
            keys: JwtKeys::from_config(&config.jwt, Arc::new(SystemClock)),
        })
    }

    #[cfg(test)]
    pub fn fake(
        store: Arc<crate::memory::MemoryStore>,
        clock: Arc<crate::clock::FixedClock>,
    ) -> Self {
        Self {
            users: store.clone(),
            posts: store,
            keys: JwtKeys::new(
                "test-secret",
                time::Duration::minutes(crate::config::DEFAULT_TTL_MINUTES),
                clock,
            ),
        }
    }
}
