use bcrypt::BcryptError;
use chrono::Utc;
use redis::{AsyncCommands, RedisError};
use thiserror::Error;
use tracing::info;

use crate::models::UserRecord;
use crate::service::caching::RedisCache;

const USERS_KEY: &str = "newspulse:users";

pub const BCRYPT_COST: u32 = 12;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username and password are required")]
    MissingCredentials,
    #[error("password hashing failed: {0}")]
    Hash(#[from] BcryptError),
    #[error("password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Redis(#[from] RedisError),
}

/// Salted bcrypt credential for `username`; the password itself is never kept.
pub fn hash_password(username: &str, password: &str) -> Result<UserRecord, AuthError> {
    Ok(UserRecord {
        username: username.to_string(),
        password_hash: bcrypt::hash(password, BCRYPT_COST)?,
        created_at: Utc::now(),
    })
}

pub fn verify_password(record: &UserRecord, password: &str) -> Result<bool, AuthError> {
    Ok(bcrypt::verify(password, &record.password_hash)?)
}

fn normalize(username: &str, password: &str) -> Result<String, AuthError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(username.to_string())
}

/// Create a user. Returns `false` when the name is already taken.
pub async fn register_user(
    cache: &RedisCache,
    username: &str,
    password: &str,
) -> Result<bool, AuthError> {
    let username = normalize(username, password)?;
    let record = {
        let (username, password) = (username.clone(), password.to_string());
        tokio::task::spawn_blocking(move || hash_password(&username, &password)).await??
    };
    let json = serde_json::to_string(&record)?;

    let mut conn = cache.connection();
    let created: bool = conn.hset_nx(USERS_KEY, &username, json).await?;
    if created {
        info!("Registered user {}", username);
    }
    Ok(created)
}

/// `true` only for an existing user with a matching password.
pub async fn authenticate_user(
    cache: &RedisCache,
    username: &str,
    password: &str,
) -> Result<bool, AuthError> {
    let username = normalize(username, password)?;
    let mut conn = cache.connection();
    let stored: Option<String> = conn.hget(USERS_KEY, &username).await?;

    match stored {
        Some(json) => {
            let record: UserRecord = serde_json::from_str(&json)?;
            let password = password.to_string();
            tokio::task::spawn_blocking(move || verify_password(&record, &password)).await?
        }
        None => Ok(false),
    }
}
