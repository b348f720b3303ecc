pub mod auth;
pub mod drive;
pub mod reporting;
pub mod resolution;
pub mod sheets;
pub mod submission;

use async_trait::async_trait;

use crate::models::record::JobRecord;
use crate::services::auth::AuthError;

/// Append-only record store. `append` adds exactly one row; nothing is ever
/// mutated or deleted, so `read_all` snapshots are in chronological write order.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn read_all(&self) -> Result<Vec<JobRecord>, StoreError>;
    async fn append(&self, record: &JobRecord) -> Result<(), StoreError>;
}

/// Blob store for evidence photos. One upload attempt per submission; the
/// returned string is a viewer-accessible link.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, name: &str) -> Result<String, StoreError>;
}

/// Failures talking to the remote Google services.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("remote request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote service rejected request: {0}")]
    Api(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}
