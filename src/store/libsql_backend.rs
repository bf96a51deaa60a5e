//! libSQL-backed thread store.
//!
//! One table, upsert-by-id writes. Persistence failures are the
//! caller's to swallow — the sync run never depends on a save landing.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;

use crate::error::StoreError;
use crate::model::{NotificationThread, Repository, Subject};
use crate::ports::ThreadStore;

/// libSQL thread store.
///
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async
/// use, so a single connection is reused for all operations.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Open(format!("Failed to create database directory: {e}")))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.init_schema().await?;
        info!(path = %path.display(), "Notification store opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to create in-memory database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS notifications (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    url TEXT NOT NULL,
                    latest_comment_url TEXT,
                    repository TEXT NOT NULL,
                    unread INTEGER NOT NULL,
                    updated_at TEXT
                )",
                (),
            )
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }

    /// All persisted threads, newest update first.
    pub async fn all(&self) -> Result<Vec<NotificationThread>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, title, url, latest_comment_url, repository, unread, updated_at
                 FROM notifications ORDER BY updated_at DESC",
                (),
            )
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut threads = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?
        {
            threads.push(row_to_thread(&row).map_err(|e| StoreError::Query(e.to_string()))?);
        }
        Ok(threads)
    }

    /// Number of persisted threads still marked unread.
    pub async fn unread_count(&self) -> Result<u64, StoreError> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM notifications WHERE unread = 1", ())
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let row = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?
            .ok_or_else(|| StoreError::Query("COUNT returned no rows".to_string()))?;
        row.get::<u64>(0)
            .map_err(|e| StoreError::Query(e.to_string()))
    }
}

fn row_to_thread(row: &libsql::Row) -> Result<NotificationThread, libsql::Error> {
    let updated_at: Option<String> = row.get(6)?;
    Ok(NotificationThread {
        id: row.get(0)?,
        subject: Subject {
            title: row.get(1)?,
            url: row.get(2)?,
            latest_comment_url: row.get(3)?,
        },
        repository: Repository {
            full_name: row.get(4)?,
        },
        unread: row.get::<i64>(5)? != 0,
        updated_at: updated_at.as_deref().and_then(parse_datetime),
    })
}

/// Parse the RFC 3339 strings this store writes.
fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl ThreadStore for LibSqlStore {
    async fn save(&self, threads: &[NotificationThread]) -> Result<(), StoreError> {
        for thread in threads {
            self.conn
                .execute(
                    "INSERT INTO notifications
                        (id, title, url, latest_comment_url, repository, unread, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(id) DO UPDATE SET
                        title = excluded.title,
                        url = excluded.url,
                        latest_comment_url = excluded.latest_comment_url,
                        repository = excluded.repository,
                        unread = excluded.unread,
                        updated_at = excluded.updated_at",
                    params![
                        thread.id.clone(),
                        thread.subject.title.clone(),
                        thread.subject.url.clone(),
                        thread.subject.latest_comment_url.clone(),
                        thread.repository.full_name.clone(),
                        thread.unread as i64,
                        thread.updated_at.map(|dt| dt.to_rfc3339()),
                    ],
                )
                .await
                .map_err(|e| StoreError::Query(e.to_string()))?;
        }
        Ok(())
    }
}
