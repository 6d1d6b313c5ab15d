use std::sync::Arc;

use crate::auth::{
    jwt::JwtKeys,
    repo::{PgUserStore, UserStore},
    services::Authority,
};
use crate::config::AppConfig;
use crate::db;

#[derive(Clone)]
pub struct AppState {
    pub authority: Authority,
    pub store: Arc<dyn UserStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let pool = db::init_pool(&config.db)?;
        db::bootstrap(&pool, &config.db).await;

        let store = Arc::new(PgUserStore::new(
            pool,
            config.db.query_timeout(),
            config.db.ping_timeout(),
        )) as Arc<dyn UserStore>;

        Ok(Self::from_parts(store, config))
    }

    pub fn from_parts(store: Arc<dyn UserStore>, config: Arc<AppConfig>) -> Self {
        let keys = JwtKeys::from_config(&config.jwt);
        Self {
            authority: Authority::new(store.clone(), keys),
            store,
            config,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_store().0
    }

    #[cfg(test)]
    pub fn fake_with_store() -> (Self, Arc<crate::auth::repo::MemoryUserStore>) {
        let store = Arc::new(crate::auth::repo::MemoryUserStore::default());
        let config = Arc::new(AppConfig::for_tests());
        (Self::from_parts(store.clone(), config), store)
    }
}
