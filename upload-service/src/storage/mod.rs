// Media hosting for uploaded images

pub mod cloudinary;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::models::ImageField;

pub use cloudinary::{CloudinaryConfig, CloudinaryUploader};

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Media upload transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider refused the payload; carries its message verbatim
    #[error("{0}")]
    Rejected(String),

    #[error("Invalid response from media service: {0}")]
    InvalidResponse(String),

    #[error("Media client configuration error: {0}")]
    Config(String),
}

/// Turns raw bytes into a durable, publicly fetchable URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Upload one file. `field` names the form field it arrived under.
    async fn upload(&self, data: Bytes, field: ImageField) -> Result<String, MediaError>;
}
