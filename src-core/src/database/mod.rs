//! Database module
//!
//! This module provides all database functionality including:
//! - Schema and migrations
//! - Model definitions
//! - The shared local store handle
//! - Repository layer for CRUD operations

pub mod models;
pub mod repository;
pub mod schema;
pub mod seed;

pub use models::*;
pub use repository::Repository;
pub use schema::initialize_database;

use crate::config::{BUSY_TIMEOUT_SECS, MAX_POOL_CONNECTIONS};
use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Build connection options shared by migration and application connections.
fn connect_options(db_path: &Path) -> std::result::Result<SqliteConnectOptions, sqlx::Error> {
    SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display())).map(
        |opts| {
            opts.create_if_missing(true)
                .busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS))
                .journal_mode(SqliteJournalMode::Wal)
                .foreign_keys(true)
        },
    )
}

/// Create and initialize a database connection pool at `target_version`.
///
/// Migrations run on a dedicated single-connection pool that is closed
/// before the application pool is created, so every pooled connection
/// reads the final schema.
pub async fn create_pool(db_path: &Path, target_version: i32) -> Result<SqlitePool> {
    tracing::info!("Creating database connection pool at: {:?}", db_path);

    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let migration_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options(db_path)?)
        .await?;

    let migrated = initialize_database(&migration_pool, target_version).await;
    migration_pool.close().await;
    migrated?;

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_POOL_CONNECTIONS)
        .connect_with(connect_options(db_path)?)
        .await?;

    tracing::info!("Database pool created successfully");

    Ok(pool)
}

struct StoreInner {
    db_path: PathBuf,
    target_version: i32,
    pool: OnceCell<SqlitePool>,
    initializations: AtomicUsize,
}

/// Shared handle to the on-device store.
///
/// Clones share one lazily created pool. Concurrent first callers wait on
/// the same initialization; a failed initialization leaves the cell empty
/// so the next caller tries again.
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<StoreInner>,
}

impl LocalStore {
    /// Handle that initializes on first use
    pub fn new(db_path: impl Into<PathBuf>, target_version: i32) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                db_path: db_path.into(),
                target_version,
                pool: OnceCell::new(),
                initializations: AtomicUsize::new(0),
            }),
        }
    }

    /// Handle that is initialized before returning
    pub async fn open(db_path: impl Into<PathBuf>, target_version: i32) -> Result<Self> {
        let store = Self::new(db_path, target_version);
        store.pool().await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.inner.db_path
    }

    pub fn target_version(&self) -> i32 {
        self.inner.target_version
    }

    /// The shared pool, initializing the store if needed
    pub async fn pool(&self) -> Result<SqlitePool> {
        let pool = self
            .inner
            .pool
            .get_or_try_init(|| async {
                self.inner.initializations.fetch_add(1, Ordering::SeqCst);
                create_pool(&self.inner.db_path, self.inner.target_version)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to initialize local store: {}", e);
                        e
                    })
            })
            .await?;

        Ok(pool.clone())
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.pool.initialized()
    }

    /// Schema version recorded on disk
    pub async fn version(&self) -> Result<i32> {
        let pool = self.pool().await?;
        schema::current_version(&pool).await
    }

    /// Close the shared pool, if it was ever opened
    pub async fn close(&self) {
        if let Some(pool) = self.inner.pool.get() {
            pool.close().await;
            tracing::info!("Local store closed");
        }
    }

    #[cfg(test)]
    pub(crate) fn initialization_count(&self) -> usize {
        self.inner.initializations.load(Ordering::SeqCst)
    }

    /// Store whose database path is a directory, so every open fails
    #[cfg(test)]
    pub(crate) fn unavailable(dir: &Path) -> Self {
        let path = dir.join("unavailable.sqlite");
        std::fs::create_dir_all(&path).unwrap();
        Self::new(path, crate::config::DB_VERSION)
    }
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("db_path", &self.inner.db_path)
            .field("target_version", &self.inner.target_version)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DB_VERSION;
    use crate::error::AppError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_creates_schema() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(temp_dir.path().join("nested/db.sqlite"), DB_VERSION)
            .await
            .unwrap();

        assert!(store.is_initialized());
        assert_eq!(store.version().await.unwrap(), DB_VERSION);
        store.close().await;
    }

    #[tokio::test]
    async fn test_concurrent_first_use_initializes_once() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::new(temp_dir.path().join("db.sqlite"), DB_VERSION);
        assert!(!store.is_initialized());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.pool().await.map(|_| ()) })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.initialization_count(), 1);
    }

    #[tokio::test]
    async fn test_reopen_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.sqlite");

        let first = LocalStore::open(&path, DB_VERSION).await.unwrap();
        first.close().await;

        let second = LocalStore::open(&path, DB_VERSION).await.unwrap();
        assert_eq!(second.version().await.unwrap(), DB_VERSION);
    }

    #[tokio::test]
    async fn test_open_older_version_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.sqlite");

        LocalStore::open(&path, DB_VERSION).await.unwrap().close().await;

        let older = LocalStore::new(&path, 2);
        let err = older.pool().await.unwrap_err();
        assert!(matches!(err, AppError::SchemaDowngrade { .. }));
        assert!(!older.is_initialized());
    }

    #[tokio::test]
    async fn test_failed_initialization_is_retried() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the database file should be makes the open fail
        let path = temp_dir.path().join("db.sqlite");
        std::fs::create_dir_all(&path).unwrap();

        let store = LocalStore::new(&path, DB_VERSION);
        assert!(store.pool().await.is_err());
        assert!(store.pool().await.is_err());
        assert_eq!(store.initialization_count(), 2);

        std::fs::remove_dir_all(&path).unwrap();
        assert!(store.pool().await.is_ok());
        assert_eq!(store.initialization_count(), 3);
    }
}
