use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::{FileDownload, FileResponseDto, UploadedFile};
use crate::features::files::models::{File, NewFile};
use crate::features::files::repositories::FileRepository;
use crate::modules::storage::{ObjectStore, StorageError};

/// Source of the millisecond timestamp used in storage keys
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Storage key for an upload: `{millis}_{original name}`.
///
/// The name is used as-is; two uploads of the same name within one
/// millisecond map to the same key.
pub fn storage_key(millis: i64, original_name: &str) -> String {
    format!("{}_{}", millis, original_name)
}

/// Service for file operations
pub struct FileService {
    repository: Arc<dyn FileRepository>,
    store: Arc<dyn ObjectStore>,
    clock: Clock,
}

impl FileService {
    pub fn new(repository: Arc<dyn FileRepository>, store: Arc<dyn ObjectStore>) -> Self {
        Self::with_clock(
            repository,
            store,
            Arc::new(|| Utc::now().timestamp_millis()),
        )
    }

    pub fn with_clock(
        repository: Arc<dyn FileRepository>,
        store: Arc<dyn ObjectStore>,
        clock: Clock,
    ) -> Self {
        Self {
            repository,
            store,
            clock,
        }
    }

    /// Store an uploaded file and record its metadata.
    ///
    /// The row is reserved as `pending` before the blob is written and only
    /// becomes visible once the blob exists and its public URL is known.
    /// Every failure after the reservation removes what was written so far.
    pub async fn upload(&self, upload: UploadedFile) -> Result<FileResponseDto> {
        let key = storage_key((self.clock)(), &upload.name);

        let pending = self
            .repository
            .create_pending(NewFile {
                name: upload.name,
                file_type: upload.content_type.clone(),
                size: upload.data.len() as i64,
                storage_key: key.clone(),
            })
            .await?;

        if let Err(e) = self.store.put(&key, upload.data, &upload.content_type).await {
            warn!("Storage upload failed for '{}': {}", key, e);
            self.discard(&pending).await;
            return Err(e.into());
        }
        debug!("Blob stored: {}", key);

        let url = match self.store.public_url(&key) {
            Some(url) => url,
            None => {
                warn!("No public URL for '{}'", key);
                self.rollback(&pending).await;
                return Err(AppError::Storage("Failed to get public URL".to_string()));
            }
        };

        let file = match self.repository.mark_ready(pending.id, &url).await {
            Ok(file) => file,
            Err(e) => {
                self.rollback(&pending).await;
                return Err(e);
            }
        };

        info!(
            "File stored: id={}, key={}, type={}, size={}",
            file.id, file.storage_key, file.file_type, file.size
        );

        Ok(file.into())
    }

    /// Every stored file, newest first
    pub async fn list(&self) -> Result<Vec<FileResponseDto>> {
        let files = self.repository.list_ready().await?;
        Ok(files.into_iter().map(FileResponseDto::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<FileResponseDto> {
        Ok(self.find(id).await?.into())
    }

    /// Load the full blob for a stored file
    pub async fn download(&self, id: i64) -> Result<FileDownload> {
        let file = self.find(id).await?;

        let data = self.store.get(&file.storage_key).await.map_err(|e| {
            warn!("Storage download failed for '{}': {}", file.storage_key, e);
            match e {
                StorageError::NotFound(_) => {
                    AppError::Storage("Failed to fetch file from storage".to_string())
                }
                other => other.into(),
            }
        })?;

        debug!("Serving file id={} ({} bytes)", file.id, data.len());

        Ok(FileDownload {
            name: file.name,
            content_type: file.file_type,
            data,
        })
    }

    async fn find(&self, id: i64) -> Result<File> {
        self.repository
            .find_ready(id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }

    async fn discard(&self, pending: &File) {
        if let Err(e) = self.repository.discard(pending.id).await {
            warn!("Failed to discard pending file id={}: {}", pending.id, e);
        }
    }

    /// Remove both the stored blob and the pending row
    async fn rollback(&self, pending: &File) {
        if let Err(e) = self.store.delete(&pending.storage_key).await {
            warn!(
                "Failed to delete blob '{}' during rollback: {}",
                pending.storage_key, e
            );
        }
        self.discard(pending).await;
    }
}
