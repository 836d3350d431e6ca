//! Image uploads for project logos, project screenshots and user avatars.

use std::path::PathBuf;

use axum::body::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::config::config;

/// Content types accepted for uploads and the extension they are stored under
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Only JPEG, PNG, GIF and WebP images are allowed")]
    UnsupportedType(String),

    #[error("Each file must be at most {0} bytes")]
    TooLarge(usize),

    #[error("Unexpected file field `{0}`")]
    UnexpectedField(String),

    #[error("At most {max} files may be uploaded as `{field}`")]
    TooManyFiles { field: String, max: usize },

    #[error("upload storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// One file part of a multipart request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Writes accepted images under the upload directory and names them by URL path
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    public_path: String,
    max_file_bytes: usize,
}

impl UploadStore {
    pub fn from_config() -> Self {
        let uploads = &config().uploads;
        Self::new(&uploads.dir, &uploads.public_path, uploads.max_file_bytes)
    }

    pub fn new(dir: impl Into<PathBuf>, public_path: &str, max_file_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            public_path: public_path.trim_end_matches('/').to_string(),
            max_file_bytes,
        }
    }

    /// Store one file under a fresh name and return its public path
    pub async fn save(&self, file: &UploadedFile) -> Result<String, UploadError> {
        let extension = image_extension(file)?;
        if file.bytes.len() > self.max_file_bytes {
            return Err(UploadError::TooLarge(self.max_file_bytes));
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let name = format!("{}.{}", Uuid::new_v4(), extension);
        tokio::fs::write(self.dir.join(&name), &file.bytes).await?;

        info!("Stored {} upload as {} ({} bytes)", file.field, name, file.bytes.len());
        Ok(format!("{}/{}", self.public_path, name))
    }

    /// Every file is checked before any is written
    pub async fn save_all(&self, files: &[UploadedFile]) -> Result<Vec<String>, UploadError> {
        for file in files {
            image_extension(file)?;
            if file.bytes.len() > self.max_file_bytes {
                return Err(UploadError::TooLarge(self.max_file_bytes));
            }
        }

        let mut paths = Vec::with_capacity(files.len());
        for file in files {
            paths.push(self.save(file).await?);
        }
        Ok(paths)
    }
}

/// Declared content type first, then the file name when the client sent a generic type
fn image_extension(file: &UploadedFile) -> Result<&'static str, UploadError> {
    let declared = file
        .content_type
        .as_deref()
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase());

    if let Some(ct) = declared.as_deref().filter(|ct| *ct != "application/octet-stream") {
        return IMAGE_TYPES
            .iter()
            .find(|(mime, _)| *mime == ct)
            .map(|(_, ext)| *ext)
            .ok_or_else(|| UploadError::UnsupportedType(ct.to_string()));
    }

    let suffix = file
        .file_name
        .as_deref()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match suffix.as_str() {
        "jpg" | "jpeg" => Ok("jpg"),
        "png" => Ok("png"),
        "gif" => Ok("gif"),
        "webp" => Ok("webp"),
        _ => Err(UploadError::UnsupportedType(suffix)),
    }
}
