use redis::{aio::ConnectionManager, Client};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis url not set (REDIS_URL)")]
    MissingUrl,
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    pub async fn new(url: &str) -> Result<Self, CacheError> {
        let client = Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self { manager })
    }

    pub async fn from_url(url: Option<&str>) -> Result<Self, CacheError> {
        let url = url.ok_or(CacheError::MissingUrl)?;
        Self::new(url).await
    }

    /// Connect if a URL is configured; any failure disables the store.
    pub async fn connect_optional(url: Option<&str>) -> Option<Self> {
        match Self::from_url(url).await {
            Ok(cache) => {
                info!("Redis document store enabled");
                Some(cache)
            }
            Err(CacheError::MissingUrl) => {
                info!("REDIS_URL not set; document store and login disabled");
                None
            }
            Err(err) => {
                warn!("Redis unavailable, continuing without it: {}", err);
                None
            }
        }
    }

    pub fn connection(&self) -> ConnectionManager {
        self.manager.clone()
    }
}
