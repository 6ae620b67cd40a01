// Multipart form parsing for upload submissions

use axum::extract::Multipart;
use bytes::Bytes;

use crate::error::ServiceError;
use crate::models::{ImageField, NewUpload};

/// A parsed submission: text values plus the attached files in arrival order
#[derive(Debug, Default)]
pub struct UploadForm {
    pub upload: NewUpload,
    pub files: Vec<(ImageField, Bytes)>,
}

impl UploadForm {
    fn has_file(&self, field: ImageField) -> bool {
        self.files.iter().any(|(existing, _)| *existing == field)
    }
}

/// Read the whole multipart body into memory.
///
/// Parts carrying a filename are files and must use one of the image field
/// names, once each. Empty file parts count as "no file chosen". Text parts
/// with names that are not upload fields are ignored.
pub async fn parse_upload_form(mut multipart: Multipart) -> Result<UploadForm, ServiceError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::InvalidForm(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if field.file_name().is_some() {
            let image = ImageField::from_name(&name)
                .ok_or_else(|| ServiceError::UnexpectedField(name.clone()))?;
            if form.has_file(image) {
                return Err(ServiceError::DuplicateField(name));
            }

            let data = field
                .bytes()
                .await
                .map_err(|e| ServiceError::InvalidForm(e.body_text()))?;

            if data.is_empty() {
                tracing::warn!("Skipping empty file part: {}", name);
                continue;
            }

            tracing::debug!("Received file for {}: {} bytes", name, data.len());
            form.files.push((image, data));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ServiceError::InvalidForm(e.body_text()))?;

            if !form.upload.set_text(&name, value) {
                tracing::debug!("Ignoring form field: {}", name);
            }
        }
    }

    Ok(form)
}
