//! In-memory collaborators and request builders for handler tests

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{RecordStore, StoreError};
use crate::models::{NewUpload, UploadRecord};
use crate::storage::MediaUploader;
use crate::{create_router, AppState};

pub const BOUNDARY: &str = "upload-test-boundary";

#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<Vec<UploadRecord>>,
    unavailable: bool,
}

impl InMemoryRecordStore {
    /// A store whose every operation fails, like a lost database connection
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub async fn records(&self) -> Vec<UploadRecord> {
        self.records.read().await.clone()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, upload: NewUpload) -> Result<UploadRecord, StoreError> {
        self.check()?;
        let record = UploadRecord {
            id: Uuid::new_v4(),
            upload,
        };
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<UploadRecord>, StoreError> {
        self.check()?;
        Ok(self.records().await)
    }

    async fn ping(&self) -> bool {
        !self.unavailable
    }
}

pub fn test_app(store: Arc<InMemoryRecordStore>, uploader: impl MediaUploader + 'static) -> Router {
    let state = AppState {
        store,
        uploader: Arc::new(uploader),
    };
    create_router(state, 1024 * 1024)
}

pub enum FormPart<'a> {
    Text(&'a str, &'a str),
    /// name, filename, contents
    File(&'a str, &'a str, &'a [u8]),
}

pub fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            FormPart::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            FormPart::File(name, filename, contents) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(contents);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[FormPart<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}
