use std::{net::SocketAddr, time::Duration};

use crate::{error::AppError, models::filters::AuthorScope};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
/// View level every visitor holds, signed in or not.
const DEFAULT_PUBLIC_ACCESS_LEVEL: i32 = 1;

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub run_migrations: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub bind_addr: SocketAddr,
    pub cors_origin: String,
    pub jwt_secret: String,
    pub public_access_level: i32,
    pub author_scope: AuthorScope,
    pub list_cache_ttl: Duration,
    pub translations_path: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let read_parsed = |key: &str| read(key).and_then(|value| value.parse::<u64>().ok());
        let read_u32 = |key: &str| read(key).and_then(|value| value.parse::<u32>().ok());

        let url = read("DATABASE_URL")
            .ok_or_else(|| AppError::Internal("DATABASE_URL missing".to_string()))?;
        let jwt_secret = read("JWT_SECRET")
            .ok_or_else(|| AppError::Internal("JWT_SECRET missing".to_string()))?;

        let bind_addr = read("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|err| AppError::Internal(format!("BIND_ADDR invalid: {}", err)))?;

        let author_scope = match read("COMMENTS_AUTHOR_SCOPE") {
            Some(value) => AuthorScope::parse(&value).ok_or_else(|| {
                AppError::Internal(format!(
                    "COMMENTS_AUTHOR_SCOPE must be 'all' or 'project', got '{value}'"
                ))
            })?,
            None => AuthorScope::default(),
        };

        Ok(Self {
            database: DatabaseSettings {
                url,
                max_connections: read_u32("DATABASE_MAX_CONNECTIONS").unwrap_or(20),
                min_connections: read_u32("DATABASE_MIN_CONNECTIONS").unwrap_or(5),
                acquire_timeout: Duration::from_secs(
                    read_parsed("DATABASE_ACQUIRE_TIMEOUT_SECS").unwrap_or(15),
                ),
                run_migrations: matches!(
                    read("RUN_MIGRATIONS").as_deref(),
                    Some("1" | "true" | "yes")
                ),
            },
            bind_addr,
            cors_origin: read("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            jwt_secret,
            public_access_level: read("PUBLIC_ACCESS_LEVEL")
                .and_then(|value| value.parse::<i32>().ok())
                .unwrap_or(DEFAULT_PUBLIC_ACCESS_LEVEL),
            author_scope,
            list_cache_ttl: Duration::from_secs(
                read_parsed("COMMENT_LIST_CACHE_TTL_SECS").unwrap_or(0),
            ),
            translations_path: read("TRANSLATIONS_PATH"),
        })
    }
}
