use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::files::models::{File, FileStatus, NewFile};
use crate::modules::storage::StorageError;

/// Persistence for `files` rows.
///
/// Only `ready` rows are visible through the read methods.
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Insert a `pending` row, reserving its storage key.
    ///
    /// A key that is already taken fails with the same error the object
    /// store reports for an existing object.
    async fn create_pending(&self, new_file: NewFile) -> Result<File>;

    /// Record the public URL and make the row visible.
    async fn mark_ready(&self, id: i64, url: &str) -> Result<File>;

    /// Remove a row that never became ready.
    async fn discard(&self, id: i64) -> Result<()>;

    /// All ready rows, newest first.
    async fn list_ready(&self) -> Result<Vec<File>>;

    async fn find_ready(&self, id: i64) -> Result<Option<File>>;
}

const FILE_COLUMNS: &str = "id, name, type, size, url, storage_key, status, uploaded_at";

/// Map a unique violation on the storage key to a storage collision.
fn handle_insert_error(e: sqlx::Error, storage_key: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return StorageError::AlreadyExists(storage_key.to_string()).into();
        }
    }
    AppError::Database(e)
}

pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn create_pending(&self, new_file: NewFile) -> Result<File> {
        let query = format!(
            r#"
            INSERT INTO files (name, type, size, storage_key, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {FILE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, File>(&query)
            .bind(&new_file.name)
            .bind(&new_file.file_type)
            .bind(new_file.size)
            .bind(&new_file.storage_key)
            .bind(FileStatus::Pending.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| handle_insert_error(e, &new_file.storage_key))
    }

    async fn mark_ready(&self, id: i64, url: &str) -> Result<File> {
        let query = format!(
            r#"
            UPDATE files
            SET url = $2, status = $3
            WHERE id = $1
            RETURNING {FILE_COLUMNS}
            "#
        );

        let file = sqlx::query_as::<_, File>(&query)
            .bind(id)
            .bind(url)
            .bind(FileStatus::Ready.as_str())
            .fetch_optional(&self.pool)
            .await?;

        file.ok_or_else(|| AppError::Internal(format!("Pending file {} disappeared", id)))
    }

    async fn discard(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM files WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(FileStatus::Pending.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_ready(&self) -> Result<Vec<File>> {
        let query = format!(
            r#"
            SELECT {FILE_COLUMNS}
            FROM files
            WHERE status = $1
            ORDER BY uploaded_at DESC, id DESC
            "#
        );

        let files = sqlx::query_as::<_, File>(&query)
            .bind(FileStatus::Ready.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(files)
    }

    async fn find_ready(&self, id: i64) -> Result<Option<File>> {
        let query = format!(
            r#"
            SELECT {FILE_COLUMNS}
            FROM files
            WHERE id = $1 AND status = $2
            "#
        );

        let file = sqlx::query_as::<_, File>(&query)
            .bind(id)
            .bind(FileStatus::Ready.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(file)
    }
}
