pub mod repository;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewUpload, UploadRecord};

pub use repository::PgRecordStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence for upload records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist one upload and return it with its generated id
    async fn insert(&self, upload: NewUpload) -> Result<UploadRecord, StoreError>;

    /// Every stored record, in the store's natural scan order
    async fn list_all(&self) -> Result<Vec<UploadRecord>, StoreError>;

    async fn ping(&self) -> bool;
}
