use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

use crate::core::error::{AppError, Result};
use crate::features::files::models::{File, FileStatus, NewFile};
use crate::features::files::repositories::FileRepository;
use crate::modules::storage::StorageError;

/// In-memory `files` table
#[derive(Default)]
pub struct MemoryFileRepository {
    rows: Mutex<Vec<File>>,
}

impl MemoryFileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every row, pending ones included
    pub fn all(&self) -> Vec<File> {
        self.rows.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<File>>> {
        self.rows
            .lock()
            .map_err(|_| AppError::Internal("file table lock poisoned".to_string()))
    }
}

#[async_trait]
impl FileRepository for MemoryFileRepository {
    async fn create_pending(&self, new_file: NewFile) -> Result<File> {
        let mut rows = self.lock()?;
        if rows.iter().any(|r| r.storage_key == new_file.storage_key) {
            return Err(StorageError::AlreadyExists(new_file.storage_key).into());
        }

        let file = File {
            id: rows.iter().map(|r| r.id).max().unwrap_or(0) + 1,
            name: new_file.name,
            file_type: new_file.file_type,
            size: new_file.size,
            url: None,
            storage_key: new_file.storage_key,
            status: FileStatus::Pending.as_str().to_string(),
            uploaded_at: Utc::now(),
        };
        rows.push(file.clone());
        Ok(file)
    }

    async fn mark_ready(&self, id: i64, url: &str) -> Result<File> {
        let mut rows = self.lock()?;
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::Internal(format!("Pending file {} disappeared", id)))?;
        row.url = Some(url.to_string());
        row.status = FileStatus::Ready.as_str().to_string();
        Ok(row.clone())
    }

    async fn discard(&self, id: i64) -> Result<()> {
        self.lock()?.retain(|r| r.id != id || r.is_ready());
        Ok(())
    }

    async fn list_ready(&self) -> Result<Vec<File>> {
        let mut files: Vec<File> = self
            .lock()?
            .iter()
            .filter(|r| r.is_ready())
            .cloned()
            .collect();
        files.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(files)
    }

    async fn find_ready(&self, id: i64) -> Result<Option<File>> {
        Ok(self
            .lock()?
            .iter()
            .find(|r| r.id == id && r.is_ready())
            .cloned())
    }
}
