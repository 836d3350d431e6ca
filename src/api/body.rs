use async_trait::async_trait;
use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::header,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ApiError;
use crate::services::{UploadError, UploadedFile};

/// A request body sent either as JSON or as `multipart/form-data`.
///
/// Text parts become the fields of `T`; a name sent more than once, or
/// ending in `[]`, becomes an array. File parts are kept aside for the
/// handler to claim with [`FormBody::files`]. Empty file parts, which
/// browsers send for untouched file inputs, are dropped.
#[derive(Debug)]
pub struct FormBody<T> {
    pub data: T,
    files: Vec<UploadedFile>,
}

impl<T> FormBody<T> {
    /// Claim the files sent under `field`, refusing any other file field
    pub fn files(&mut self, field: &str, max: usize) -> Result<Vec<UploadedFile>, UploadError> {
        if let Some(other) = self.files.iter().find(|f| f.field != field) {
            return Err(UploadError::UnexpectedField(other.field.clone()));
        }
        if self.files.len() > max {
            return Err(UploadError::TooManyFiles {
                field: field.to_string(),
                max,
            });
        }
        Ok(std::mem::take(&mut self.files))
    }

    /// The single file sent under `field`, if any
    pub fn file(&mut self, field: &str) -> Result<Option<UploadedFile>, UploadError> {
        Ok(self.files(field, 1)?.pop())
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for FormBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let Json(data) = Json::<T>::from_request(req, state).await?;
            return Ok(Self {
                data,
                files: Vec::new(),
            });
        }

        let mut multipart = Multipart::from_request(req, state).await.map_err(|rejection| {
            debug!("Rejected multipart body: {}", rejection.body_text());
            ApiError::bad_request("Invalid form data")
        })?;

        let mut fields = Map::new();
        let mut files = Vec::new();

        while let Some(field) = multipart.next_field().await.map_err(invalid_part)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if field.file_name().is_some() {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(invalid_part)?;
                if !bytes.is_empty() {
                    files.push(UploadedFile {
                        field: name,
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            } else {
                let text = field.text().await.map_err(invalid_part)?;
                insert_field(&mut fields, name, text);
            }
        }

        let data = serde_json::from_value(Value::Object(fields)).map_err(|e| {
            debug!("Form fields did not match the request shape: {}", e);
            ApiError::bad_request("Invalid form data")
        })?;

        Ok(Self { data, files })
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
}

fn invalid_part(err: MultipartError) -> ApiError {
    debug!("Failed to read multipart field: {}", err);
    ApiError::bad_request("Invalid form data")
}

fn insert_field(fields: &mut Map<String, Value>, name: String, text: String) {
    let (name, forced_array) = match name.strip_suffix("[]") {
        Some(base) => (base.to_string(), true),
        None => (name, false),
    };

    match fields.get_mut(&name) {
        Some(Value::Array(items)) => items.push(Value::String(text)),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, Value::String(text)]);
        }
        None if forced_array => {
            fields.insert(name, Value::Array(vec![Value::String(text)]));
        }
        None => {
            fields.insert(name, Value::String(text));
        }
    }
}
