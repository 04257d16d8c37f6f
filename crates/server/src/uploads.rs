//! Submitted form reading and image checks.
//!
//! Screen actions accept either `application/x-www-form-urlencoded` or
//! `multipart/form-data`. Both are read into an [`UploadedForm`] so repeated
//! fields (bulk selections) and files are handled the same way. Image files
//! are checked for size and type before anything is sent to the API.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use nepostore_core::models::MAX_PRODUCT_IMAGES;
use thiserror::Error;

use crate::api::ImageUpload;

/// Image content types the API stores.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Why an uploaded file was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("{file} is larger than {max_mb} MB")]
    TooLarge { file: String, max_mb: usize },

    #[error("{file} is not a JPEG, PNG, WebP or GIF image")]
    UnsupportedType { file: String },

    #[error("At most {max} images can be uploaded")]
    TooMany { max: usize },

    #[error("Could not read the upload: {0}")]
    Malformed(String),
}

/// A file part of a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Text fields and files of a multipart form.
#[derive(Debug, Clone, Default)]
pub struct UploadedForm {
    fields: HashMap<String, Vec<String>>,
    files: Vec<UploadedFile>,
}

impl UploadedForm {
    /// Read a form body of either encoding.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Malformed`] if the body cannot be read.
    pub async fn from_request(request: Request) -> Result<Self, UploadError> {
        let is_multipart = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(request, &())
                .await
                .map_err(|e| UploadError::Malformed(e.body_text()))?;
            Self::read(multipart).await
        } else {
            let body = Bytes::from_request(request, &())
                .await
                .map_err(|e| UploadError::Malformed(e.body_text()))?;
            Ok(Self::from_urlencoded(&body))
        }
    }

    /// Parse an urlencoded body.
    #[must_use]
    pub fn from_urlencoded(body: &[u8]) -> Self {
        let mut form = Self::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            form.fields
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        form
    }

    /// Read every part. Empty file inputs are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Malformed`] if the body is not valid multipart.
    pub async fn read(mut multipart: Multipart) -> Result<Self, UploadError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| UploadError::Malformed(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if let Some(file_name) = field.file_name().map(String::from) {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| UploadError::Malformed(e.body_text()))?;
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.files.push(UploadedFile {
                    field: name,
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| UploadError::Malformed(e.body_text()))?;
                form.fields.entry(name).or_default().push(value);
            }
        }
        Ok(form)
    }

    /// First value of a text field, trimmed; blank counts as absent.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Every value of a repeated text field.
    #[must_use]
    pub fn all(&self, name: &str) -> &[String] {
        self.fields.get(name).map_or(&[], Vec::as_slice)
    }

    /// Files posted under `field`.
    pub fn files<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a UploadedFile> {
        self.files.iter().filter(move |file| file.field == field)
    }

    /// Take the files posted under `field`.
    #[must_use]
    pub fn take_files(&mut self, field: &str) -> Vec<UploadedFile> {
        let (taken, kept) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|file| file.field == field);
        self.files = kept;
        taken
    }
}

/// Check image files and convert them for the API client.
///
/// # Errors
///
/// Returns the first file that is too large or not an allowed type, or
/// [`UploadError::TooMany`] past [`MAX_PRODUCT_IMAGES`].
pub fn validate_images(
    files: Vec<UploadedFile>,
    max_bytes: usize,
) -> Result<Vec<ImageUpload>, UploadError> {
    if files.len() > MAX_PRODUCT_IMAGES {
        return Err(UploadError::TooMany {
            max: MAX_PRODUCT_IMAGES,
        });
    }
    files
        .into_iter()
        .map(|file| validate_image(file, max_bytes))
        .collect()
}

fn validate_image(file: UploadedFile, max_bytes: usize) -> Result<ImageUpload, UploadError> {
    if file.bytes.len() > max_bytes {
        return Err(UploadError::TooLarge {
            file: file.file_name,
            max_mb: max_bytes.div_ceil(1024 * 1024),
        });
    }
    let content_type = file.content_type.to_ascii_lowercase();
    if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
        return Err(UploadError::UnsupportedType {
            file: file.file_name,
        });
    }
    Ok(ImageUpload {
        file_name: file.file_name,
        content_type,
        bytes: file.bytes,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn file(name: &str, content_type: &str, len: usize) -> UploadedFile {
        UploadedFile {
            field: "images".to_string(),
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0; len],
        }
    }

    #[test]
    fn test_accepts_allowed_types() {
        let images = validate_images(
            vec![file("a.jpg", "image/jpeg", 10), file("b.webp", "IMAGE/WEBP", 10)],
            1024,
        )
        .unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[1].content_type, "image/webp");
    }

    #[test]
    fn test_rejects_large_files() {
        let err = validate_images(vec![file("big.png", "image/png", 2 * 1024 * 1024 + 1)], 2 * 1024 * 1024)
            .unwrap_err();
        assert_eq!(
            err,
            UploadError::TooLarge {
                file: "big.png".to_string(),
                max_mb: 2
            }
        );
    }

    #[test]
    fn test_rejects_other_types() {
        let err = validate_images(vec![file("x.svg", "image/svg+xml", 10)], 1024).unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType { .. }));
    }

    #[test]
    fn test_rejects_too_many() {
        let files = (0..=MAX_PRODUCT_IMAGES)
            .map(|i| file(&format!("{i}.png"), "image/png", 1))
            .collect();
        assert_eq!(
            validate_images(files, 1024).unwrap_err(),
            UploadError::TooMany { max: 6 }
        );
    }

    #[test]
    fn test_urlencoded_repeated_fields() {
        let form = UploadedForm::from_urlencoded(b"action=bulk_delete&ids=p1&ids=p2&note=a+b");
        assert_eq!(form.text("action"), Some("bulk_delete"));
        assert_eq!(form.all("ids"), ["p1", "p2"]);
        assert_eq!(form.text("note"), Some("a b"));
    }

    #[test]
    fn test_form_accessors() {
        let mut form = UploadedForm::default();
        form.fields
            .insert("name".to_string(), vec!["  Tea  ".to_string()]);
        form.fields.insert("blank".to_string(), vec![" ".to_string()]);
        form.files.push(file("a.png", "image/png", 1));
        form.files.push(UploadedFile {
            field: "file".to_string(),
            ..file("rows.csv", "text/csv", 1)
        });

        assert_eq!(form.text("name"), Some("Tea"));
        assert_eq!(form.text("blank"), None);
        assert!(form.all("missing").is_empty());
        assert_eq!(form.files("images").count(), 1);
        assert_eq!(form.take_files("file").len(), 1);
        assert_eq!(form.files("file").count(), 0);
    }
}
