//! Batch spreadsheet upload with per-file status tracking.

use futures::future::join_all;
use serde::Serialize;
use socialdash_client::{AnalyticsClient, UploadFile};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum UploadStatus {
    Idle,
    Uploading,
    Success,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileUpload {
    pub name: String,
    pub status: UploadStatus,
}

/// Outcome of a batch, in the order the files were given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    pub files: Vec<FileUpload>,
}

impl UploadReport {
    /// Every file in `Idle`, before anything is sent.
    #[must_use]
    pub fn pending(files: &[UploadFile]) -> Self {
        Self {
            files: files
                .iter()
                .map(|f| FileUpload {
                    name: f.name.clone(),
                    status: UploadStatus::Idle,
                })
                .collect(),
        }
    }

    /// True only when every file succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        !self.files.is_empty()
            && self
                .files
                .iter()
                .all(|f| f.status == UploadStatus::Success)
    }

    #[must_use]
    pub fn failures(&self) -> Vec<&FileUpload> {
        self.files
            .iter()
            .filter(|f| matches!(f.status, UploadStatus::Error(_)))
            .collect()
    }
}

/// Uploads every file in parallel, one request each, and records each
/// file's final status. A failure never stops the other uploads.
pub async fn upload_all(client: &AnalyticsClient, files: &[UploadFile]) -> UploadReport {
    let mut report = UploadReport::pending(files);
    for entry in &mut report.files {
        entry.status = UploadStatus::Uploading;
    }

    let outcomes = join_all(files.iter().map(|file| async move {
        match client.upload_file(file).await {
            Ok(_) => {
                tracing::info!(file = %file.name, "upload succeeded");
                UploadStatus::Success
            }
            Err(e) => {
                tracing::warn!(file = %file.name, error = %e, "upload failed");
                UploadStatus::Error(e.normalized().message)
            }
        }
    }))
    .await;

    for (entry, status) in report.files.iter_mut().zip(outcomes) {
        entry.status = status;
    }
    report
}
