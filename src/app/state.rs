use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    app::config::AppConfig,
    auth::jwt::JwtConfig,
    dto::comments::CommentListResponse,
    services::{
        filter_state::FilterStateStore, list_cache::ListCache, translations::Translations,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub config: Arc<AppConfig>,
    pub filter_state: FilterStateStore,
    pub list_cache: ListCache<CommentListResponse>,
    pub translations: Arc<Translations>,
}

impl AppState {
    pub fn new(db: PgPool, config: AppConfig, translations: Translations) -> Self {
        Self {
            db,
            jwt_config: JwtConfig::from_env(config.jwt_secret.clone()),
            list_cache: ListCache::new(config.list_cache_ttl),
            config: Arc::new(config),
            filter_state: FilterStateStore::new(),
            translations: Arc::new(translations),
        }
    }
}
