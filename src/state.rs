use crate::auth::jwt::TokenService;
use crate::config::AppConfig;
use crate::db::{PgStore, Store};
use std::sync::Arc;

/// Shared, immutable per-process dependencies handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let store = PgStore::connect(&config.db).await?;

        if let Err(e) = store.migrate().await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        Ok(Self::from_parts(Arc::new(store), Arc::new(config)))
    }

    pub fn from_parts(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        let tokens = Arc::new(TokenService::from_config(&config.jwt));
        Self {
            store,
            tokens,
            config,
        }
    }
}
