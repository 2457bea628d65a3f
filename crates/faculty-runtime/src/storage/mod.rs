//! Photograph storage on the local filesystem.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use faculty_core::config::StorageConfig;
use faculty_core::error::{FacultyError, Result};

/// URL prefix under which stored photographs are served.
pub const PUBLIC_PREFIX: &str = "uploads";

/// Accepted photograph extensions.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// An uploaded file held in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Writes photographs under the configured upload directory.
#[derive(Debug, Clone)]
pub struct PhotoStorage {
    dir: PathBuf,
}

impl PhotoStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.upload_dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store a photograph and return its public path, `uploads/<name>`.
    pub async fn store(&self, file: &UploadedFile) -> Result<String> {
        let extension = image_extension(&file.file_name)?;
        let name = format!("{}.{}", Uuid::new_v4(), extension);

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&name), &file.bytes).await?;

        debug!(file = %name, bytes = file.bytes.len(), "Stored photograph");
        Ok(format!("{}/{}", PUBLIC_PREFIX, name))
    }

    /// Remove a previously stored photograph. Missing files are ignored.
    pub async fn remove(&self, public_path: &str) {
        let Some(name) = public_path
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return;
        };
        // Stored names never contain separators
        if name.contains('/') || name.contains('\\') || name.contains("..") {
            return;
        }

        if let Err(e) = tokio::fs::remove_file(self.dir.join(name)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(file = %name, "Failed to remove photograph: {}", e);
            }
        }
    }
}

fn image_extension(file_name: &str) -> Result<String> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(FacultyError::validation(format!(
            "Photograph must be one of: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )))
    }
}
