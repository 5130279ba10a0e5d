use std::{future::Future, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::warn;

use crate::{
    attendees::repo::AttendeeRepo, auth::repo::UserRepo, config::DbConfig,
    events::repo::EventRepo,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{op} timed out after {after:?}")]
    Timeout { op: &'static str, after: Duration },

    #[error("unique constraint violated")]
    UniqueViolation,

    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::UniqueViolation,
            _ => Self::Database(e),
        }
    }
}

/// Everything the handlers need from persistence.
pub trait Store: UserRepo + EventRepo + AttendeeRepo {}

impl<T> Store for T where T: UserRepo + EventRepo + AttendeeRepo {}

/// Runs one statement, failing with [`StoreError::Timeout`] once `limit` elapses.
pub(crate) async fn bounded<T, F>(limit: Duration, op: &'static str, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res.map_err(StoreError::from),
        Err(_) => {
            warn!(op, ?limit, "statement timed out");
            Err(StoreError::Timeout { op, after: limit })
        }
    }
}

#[derive(Clone)]
pub struct PgStore {
    pub(crate) pool: PgPool,
    pub(crate) timeout: Duration,
}

impl PgStore {
    pub async fn connect(cfg: &DbConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(cfg.timeout())
            .connect(&cfg.url)
            .await
            .context("connect to database")?;
        Ok(Self {
            pool,
            timeout: cfg.timeout(),
        })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("run migrations")
    }
}
