use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Lifecycle of a `files` row.
///
/// A row is `Pending` from the moment its storage key is reserved until the
/// blob is stored and its public URL recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Pending,
    Ready,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Pending => "pending",
            FileStatus::Ready => "ready",
        }
    }
}

/// Database model for files
#[derive(Debug, Clone, FromRow)]
pub struct File {
    pub id: i64,
    /// Original client-supplied filename (untrusted)
    pub name: String,
    /// MIME type as reported by the client (untrusted)
    #[sqlx(rename = "type")]
    pub file_type: String,
    pub size: i64,
    pub url: Option<String>,
    pub storage_key: String,
    pub status: String,
    pub uploaded_at: DateTime<Utc>,
}

impl File {
    pub fn is_ready(&self) -> bool {
        self.status == FileStatus::Ready.as_str()
    }
}

/// Values for a freshly reserved row
#[derive(Debug, Clone)]
pub struct NewFile {
    pub name: String,
    pub file_type: String,
    pub size: i64,
    pub storage_key: String,
}
