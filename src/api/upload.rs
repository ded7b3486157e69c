use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use rand::Rng;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::storage::client::StorageClient;

/// Largest accepted image, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

pub const FILE_TOO_LARGE: &str = "File size too large. Maximum size allowed is 5MB";
pub const UNSUPPORTED_TYPE: &str = "Only PNG and JPG images are allowed";
pub const TOO_MANY_FILES: &str = "Too many files. Only one file is allowed";

/// A validated image received in a multipart request, not yet stored.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Generated storage key, e.g. `image-1714557600000-123456789.png`.
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Text fields and the optional image of a multipart form.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: Map<String, Value>,
    pub image: Option<ImageUpload>,
}

/// Read every part of a multipart form, validating the single image.
pub async fn read_multipart(mut multipart: Multipart) -> Result<MultipartForm, AppError> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if field.file_name().is_none() {
            let text = field.text().await.map_err(multipart_error)?;
            form.fields.insert(name, Value::String(text));
            continue;
        }

        if name != IMAGE_FIELD {
            return Err(AppError::Upload(format!(
                "File upload error: Unexpected field '{name}'"
            )));
        }
        if form.image.is_some() {
            return Err(AppError::Upload(TOO_MANY_FILES.into()));
        }
        form.image = read_image(field).await?;
    }

    Ok(form)
}

async fn read_image(field: Field<'_>) -> Result<Option<ImageUpload>, AppError> {
    let original_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_ascii_lowercase();

    let data = field.bytes().await.map_err(multipart_error)?;

    // Browsers send an empty part when no file was chosen
    if data.is_empty() && original_name.is_empty() {
        return Ok(None);
    }

    validate_image(&content_type, data.len())?;

    Ok(Some(ImageUpload {
        file_name: image_file_name(&original_name, &content_type),
        content_type,
        data: data.to_vec(),
    }))
}

/// Check the declared type and the size of an uploaded image.
pub fn validate_image(content_type: &str, size: usize) -> Result<(), AppError> {
    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(AppError::Upload(UNSUPPORTED_TYPE.into()));
    }
    if size > MAX_IMAGE_BYTES {
        return Err(AppError::Upload(FILE_TOO_LARGE.into()));
    }
    Ok(())
}

/// Generate a unique storage name: `image-<millis>-<random><ext>`.
///
/// The extension comes from the original name when it has a sane one,
/// otherwise from the content type.
pub fn image_file_name(original_name: &str, content_type: &str) -> String {
    let extension = std::path::Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| matches!(e.as_str(), "png" | "jpg" | "jpeg"))
        .unwrap_or_else(|| match content_type {
            "image/png" => "png".to_string(),
            _ => "jpg".to_string(),
        });

    let timestamp = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
    format!("{IMAGE_FIELD}-{timestamp}-{suffix}.{extension}")
}

/// Store an uploaded image and return its storage key.
pub async fn store_image(
    storage: &dyn StorageClient,
    image: ImageUpload,
) -> Result<String, AppError> {
    storage.put_object(&image.file_name, image.data).await?;
    tracing::debug!(
        file = %image.file_name,
        content_type = %image.content_type,
        "stored uploaded image"
    );
    Ok(image.file_name)
}

/// Best-effort removal of a stored image. Failures are only logged.
pub async fn discard_image(storage: &dyn StorageClient, key: &str) {
    match storage.delete_object(key).await {
        Ok(true) => tracing::debug!(file = key, "removed image file"),
        Ok(false) => tracing::warn!(file = key, "image file was already missing"),
        Err(e) => tracing::warn!(file = key, error = %e, "failed to remove image file"),
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Upload(FILE_TOO_LARGE.into())
    } else {
        AppError::Upload(format!("File upload error: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::client::MockStorageClient;

    #[test]
    fn test_validate_image() {
        assert!(validate_image("image/png", 1024).is_ok());
        assert!(validate_image("image/jpeg", MAX_IMAGE_BYTES).is_ok());

        match validate_image("image/gif", 10) {
            Err(AppError::Upload(msg)) => assert_eq!(msg, UNSUPPORTED_TYPE),
            other => panic!("Expected upload error, got: {:?}", other),
        }
        match validate_image("image/png", MAX_IMAGE_BYTES + 1) {
            Err(AppError::Upload(msg)) => assert_eq!(msg, FILE_TOO_LARGE),
            other => panic!("Expected upload error, got: {:?}", other),
        }
    }

    #[test]
    fn test_image_file_name() {
        let name = image_file_name("Holiday Photo.PNG", "image/png");
        assert!(name.starts_with("image-"));
        assert!(name.ends_with(".png"));

        let name = image_file_name("no-extension", "image/jpeg");
        assert!(name.ends_with(".jpg"));

        let name = image_file_name("evil.php", "image/png");
        assert!(name.ends_with(".png"));

        assert_ne!(
            image_file_name("a.png", "image/png"),
            image_file_name("a.png", "image/png")
        );
    }

    #[tokio::test]
    async fn test_store_image_uses_generated_key() {
        let mut storage = MockStorageClient::new();
        storage
            .expect_put_object()
            .withf(|key, content| key == "image-1-2.png" && content == b"bytes")
            .times(1)
            .returning(|_, _| Ok(()));

        let key = store_image(
            &storage,
            ImageUpload {
                file_name: "image-1-2.png".into(),
                content_type: "image/png".into(),
                data: b"bytes".to_vec(),
            },
        )
        .await
        .unwrap();
        assert_eq!(key, "image-1-2.png");
    }

    #[tokio::test]
    async fn test_discard_image_swallows_errors() {
        let mut storage = MockStorageClient::new();
        storage
            .expect_delete_object()
            .times(1)
            .returning(|_| Err(AppError::Storage("disk gone".into())));

        discard_image(&storage, "image-1-2.png").await;
    }
}
