//! Spreadsheet files accepted by the ingestion endpoint.

use std::path::Path;

use crate::error::ClientError;

/// Extensions the ingestion endpoint accepts, lower-case.
pub const ALLOWED_EXTENSIONS: &[&str] = &["xlsx", "xls", "csv"];

pub const MAX_FILES_PER_BATCH: usize = 5;

/// A file queued for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Reads a file from disk, keeping only its file name.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] if the file cannot be read and
    /// [`ClientError::InvalidFile`] if the path has no file name.
    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ClientError::InvalidFile {
                name: path.display().to_string(),
                reason: "path has no file name".to_string(),
            })?
            .to_string();
        let bytes = tokio::fs::read(path).await.map_err(|e| ClientError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Self { name, bytes })
    }

    #[must_use]
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }

    /// MIME type sent with the multipart part.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Some("xls") => "application/vnd.ms-excel",
            Some("csv") => "text/csv",
            _ => "application/octet-stream",
        }
    }

    /// # Errors
    ///
    /// Returns [`ClientError::InvalidFile`] for an unsupported extension or
    /// an empty file.
    pub fn validate(&self) -> Result<(), ClientError> {
        let supported = self
            .extension()
            .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()));
        if !supported {
            return Err(ClientError::InvalidFile {
                name: self.name.clone(),
                reason: format!(
                    "only spreadsheet files are accepted ({})",
                    ALLOWED_EXTENSIONS.join(", ")
                ),
            });
        }
        if self.bytes.is_empty() {
            return Err(ClientError::InvalidFile {
                name: self.name.clone(),
                reason: "file is empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Checks the batch size alone: at least one file, at most
/// [`MAX_FILES_PER_BATCH`].
///
/// # Errors
///
/// Returns [`ClientError::InvalidFile`] for an empty or oversized batch.
pub fn check_batch_size(files: &[UploadFile]) -> Result<(), ClientError> {
    if files.is_empty() {
        return Err(ClientError::InvalidFile {
            name: String::new(),
            reason: "no files selected".to_string(),
        });
    }
    if files.len() > MAX_FILES_PER_BATCH {
        return Err(ClientError::InvalidFile {
            name: String::new(),
            reason: format!(
                "at most {MAX_FILES_PER_BATCH} files per upload, got {}",
                files.len()
            ),
        });
    }
    Ok(())
}
