//! Cloudinary client for hosting uploaded images.
//!
//! Uses the signed upload API with the `auto` resource type, so Cloudinary
//! detects whether the payload is an image, video or raw file.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{
    multipart::{Form, Part},
    Client, StatusCode,
};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tracing::{debug, error, info};

use super::{MediaError, MediaUploader};
use crate::models::ImageField;

/// Cloudinary account settings
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base: String,
    pub timeout_seconds: u64,
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            api_base: "https://api.cloudinary.com".to_string(),
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadResult {
    secure_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

pub struct CloudinaryUploader {
    config: CloudinaryConfig,
    http_client: Client,
    upload_url: String,
}

impl CloudinaryUploader {
    pub fn new(config: CloudinaryConfig) -> Result<Self, MediaError> {
        if config.cloud_name.is_empty()
            || config.api_key.is_empty()
            || config.api_secret.is_empty()
        {
            return Err(MediaError::Config(
                "cloud name, API key and API secret are required".to_string(),
            ));
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| MediaError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let upload_url = format!(
            "{}/v1_1/{}/auto/upload",
            config.api_base.trim_end_matches('/'),
            config.cloud_name
        );

        info!("Initializing Cloudinary client for cloud: {}", config.cloud_name);

        Ok(Self {
            config,
            http_client,
            upload_url,
        })
    }
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload(&self, data: Bytes, field: ImageField) -> Result<String, MediaError> {
        debug!("Uploading {} to Cloudinary ({} bytes)", field.as_str(), data.len());

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(&[("timestamp", timestamp.as_str())], &self.config.api_secret);

        let form = Form::new()
            .part("file", Part::bytes(data.to_vec()).file_name(field.as_str()))
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);

        let response = self
            .http_client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        let url = parse_upload_response(status, &body).map_err(|e| {
            error!("Cloudinary upload of {} failed: {}", field.as_str(), e);
            e
        })?;

        info!("Uploaded {} to {}", field.as_str(), url);
        Ok(url)
    }
}

/// Cloudinary request signature: the parameters sorted by name, joined as
/// `k=v` pairs with `&`, followed by the API secret, hashed with SHA-1.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn parse_upload_response(status: StatusCode, body: &[u8]) -> Result<String, MediaError> {
    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| format!("Media service responded with {}", status));
        return Err(MediaError::Rejected(message));
    }

    let result: UploadResult = serde_json::from_slice(body)
        .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;

    let secure_url = result
        .secure_url
        .ok_or_else(|| MediaError::InvalidResponse("missing secure_url".to_string()))?;

    // Records must only ever hold absolute URLs
    match url::Url::parse(&secure_url) {
        Ok(parsed) if matches!(parsed.scheme(), "https" | "http") => Ok(secure_url),
        _ => Err(MediaError::InvalidResponse(format!(
            "secure_url '{}' is not an absolute URL",
            secure_url
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Multipart, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    const SECRET: &str = "secret";

    fn test_config(api_base: String) -> CloudinaryConfig {
        CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: SECRET.to_string(),
            api_base,
            timeout_seconds: 5,
        }
    }

    async fn spawn_fake_cloudinary(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn fake_signed_upload(mut multipart: Multipart) -> (axum::http::StatusCode, Json<Value>) {
        let mut fields = HashMap::new();
        let mut file = None;
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap().to_string();
            if name == "file" {
                file = Some(field.bytes().await.unwrap());
            } else {
                fields.insert(name, field.text().await.unwrap());
            }
        }

        let expected = sign_params(&[("timestamp", fields["timestamp"].as_str())], SECRET);
        if fields["api_key"] != "key" || fields["signature"] != expected {
            return (
                axum::http::StatusCode::UNAUTHORIZED,
                Json(json!({ "error": { "message": "Invalid Signature" } })),
            );
        }

        match file {
            Some(data) if !data.is_empty() => {
                let url = format!(
                    "https://res.cloudinary.com/demo/image/upload/{}.jpg",
                    data.len()
                );
                (axum::http::StatusCode::OK, Json(json!({ "secure_url": url })))
            }
            _ => (
                axum::http::StatusCode::BAD_REQUEST,
                Json(json!({ "error": { "message": "Empty file" } })),
            ),
        }
    }

    #[test]
    fn test_sign_params_matches_documented_example() {
        let signature = sign_params(
            &[
                ("timestamp", "1315060510"),
                ("public_id", "sample_image"),
                ("eager", "w_400,h_300,c_pad|w_260,h_200,c_crop"),
            ],
            "abcd",
        );
        assert_eq!(signature, "bfd09f95f331f558cbd1320e67aa8d488770583e");
    }

    #[test]
    fn test_sign_timestamp_only() {
        assert_eq!(
            sign_params(&[("timestamp", "1700000000")], SECRET),
            "84af3c6077e429a8e7ff26d2ca13d5feb6bc7cb0"
        );
    }

    #[test]
    fn test_new_requires_credentials() {
        let config = CloudinaryConfig {
            cloud_name: "demo".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            CloudinaryUploader::new(config),
            Err(MediaError::Config(_))
        ));
    }

    #[test]
    fn test_parse_success_response() {
        let body = br#"{"secure_url":"https://res.cloudinary.com/demo/a.jpg","public_id":"a"}"#;
        let url = parse_upload_response(StatusCode::OK, body).unwrap();
        assert_eq!(url, "https://res.cloudinary.com/demo/a.jpg");
    }

    #[test]
    fn test_parse_rejects_missing_or_relative_url() {
        assert!(matches!(
            parse_upload_response(StatusCode::OK, br#"{"public_id":"a"}"#),
            Err(MediaError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_upload_response(StatusCode::OK, br#"{"secure_url":"/demo/a.jpg"}"#),
            Err(MediaError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_error_response() {
        let err = parse_upload_response(
            StatusCode::BAD_REQUEST,
            br#"{"error":{"message":"Invalid image file"}}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid image file");

        let err = parse_upload_response(StatusCode::BAD_GATEWAY, b"<html>oops</html>").unwrap_err();
        assert_eq!(err.to_string(), "Media service responded with 502 Bad Gateway");
    }

    #[tokio::test]
    async fn test_upload_sends_signed_request() {
        let router = Router::new().route("/v1_1/demo/auto/upload", post(fake_signed_upload));
        let base = spawn_fake_cloudinary(router).await;
        let uploader = CloudinaryUploader::new(test_config(base)).unwrap();

        let url = uploader
            .upload(Bytes::from_static(b"jpeg-bytes"), ImageField::ArtistImage)
            .await
            .unwrap();

        assert_eq!(url, "https://res.cloudinary.com/demo/image/upload/10.jpg");
    }

    #[tokio::test]
    async fn test_upload_surfaces_provider_rejection() {
        let router = Router::new().route("/v1_1/demo/auto/upload", post(fake_signed_upload));
        let base = spawn_fake_cloudinary(router).await;
        let uploader = CloudinaryUploader::new(test_config(base)).unwrap();

        let err = uploader
            .upload(Bytes::new(), ImageField::EventImage)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::Rejected(ref message) if message == "Empty file"));
    }
}
