use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a file record.
///
/// Transitions are strictly forward: `init -> uploading -> {uploaded, failed}`.
/// A terminal record is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Init,
    Uploading,
    Uploaded,
    Failed,
}

impl FileStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, FileStatus::Uploaded | FileStatus::Failed)
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FileStatus::Init => "init",
            FileStatus::Uploading => "uploading",
            FileStatus::Uploaded => "uploaded",
            FileStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// The persisted metadata for one upload.
///
/// `id`, `name` and `url` are fixed at creation; only the relay mutates
/// `status` and `progress` during a transfer attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    pub name: String,
    pub status: FileStatus,
    /// Percent in [0, 100]; meaningful only while `status` is `uploading`.
    pub progress: f32,
    /// Blob-store write location issued at creation time.
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn new(name: String, url: String) -> Self {
        let now = Utc::now();
        FileRecord {
            id: Uuid::new_v4(),
            name,
            status: FileStatus::Init,
            progress: 0.0,
            url,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy with updated status/progress and a fresh `updated_at`.
    pub fn with_state(&self, status: FileStatus, progress: f32) -> Self {
        let mut next = self.clone();
        next.status = status;
        next.progress = progress;
        next.updated_at = Utc::now();
        next
    }
}

/// Body of `POST /files`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFileRequest {
    pub name: String,
}

/// One frame of the status event stream: `{"type": ..., "content": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum StatusFrame {
    /// Emitted once at subscription start, carrying the record's name.
    Name(String),
    /// Current percent while the record is non-terminal.
    Progress(f32),
    /// Terminal status; exactly one per session, then the stream closes.
    Done(FileStatus),
    /// A poll failure. Does not terminate the stream.
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&FileStatus::Uploading).unwrap(),
            "\"uploading\""
        );
        assert_eq!(
            serde_json::from_str::<FileStatus>("\"failed\"").unwrap(),
            FileStatus::Failed
        );
    }

    #[test]
    fn terminal_states() {
        assert!(!FileStatus::Init.is_terminal());
        assert!(!FileStatus::Uploading.is_terminal());
        assert!(FileStatus::Uploaded.is_terminal());
        assert!(FileStatus::Failed.is_terminal());
    }

    #[test]
    fn status_frame_wire_shape() {
        let frame = StatusFrame::Progress(42.5);
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["content"], 42.5);

        let done = StatusFrame::Done(FileStatus::Uploaded);
        let json: serde_json::Value = serde_json::to_value(&done).unwrap();
        assert_eq!(json["type"], "done");
        assert_eq!(json["content"], "uploaded");
    }

    #[test]
    fn with_state_keeps_identity_fields() {
        let record = FileRecord::new("report.pdf".to_string(), "blob://x/1".to_string());
        let updated = record.with_state(FileStatus::Uploading, 0.0);
        assert_eq!(updated.id, record.id);
        assert_eq!(updated.name, record.name);
        assert_eq!(updated.url, record.url);
        assert_eq!(updated.status, FileStatus::Uploading);
        assert!(updated.updated_at >= record.updated_at);
    }
}
