use redis::{AsyncCommands, RedisError};
use thiserror::Error;
use tracing::info;

use crate::models::AnalyzedDocument;
use crate::service::caching::RedisCache;

const DOCUMENTS_KEY: &str = "newspulse:documents";

#[derive(Debug, Error)]
pub enum DocumentStoreError {
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Redis(#[from] RedisError),
}

/// Append analysed documents; records are never updated or removed.
/// Returns how many were written.
pub async fn append_documents(
    cache: &RedisCache,
    documents: &[AnalyzedDocument],
) -> Result<usize, DocumentStoreError> {
    if documents.is_empty() {
        return Ok(0);
    }

    let payloads = documents
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;

    let mut conn = cache.connection();
    let _: usize = conn.rpush(DOCUMENTS_KEY, &payloads).await?;

    info!("Stored {} analysed documents", payloads.len());
    Ok(payloads.len())
}

pub async fn document_count(cache: &RedisCache) -> Result<usize, DocumentStoreError> {
    let mut conn = cache.connection();
    Ok(conn.llen(DOCUMENTS_KEY).await?)
}
