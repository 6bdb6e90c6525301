//! Database schema and migrations
//!
//! This module handles database initialization and schema migrations.
//! Uses SQLite with WAL mode for better concurrency and crash safety.
//!
//! Upgrades run as an ordered sequence over `(on_disk, target]`. After the
//! sequence, every collection and index that should exist at the target
//! version is (re)created if missing, so the resulting schema does not depend
//! on which service opened the store first.

use crate::error::{AppError, Result};
use sqlx::{sqlite::SqlitePool, Row};

/// Initialize database with schema at `target_version`
pub async fn initialize_database(pool: &SqlitePool, target_version: i32) -> Result<()> {
    tracing::info!("Initializing database schema (target version {})", target_version);

    // Enable WAL mode for better performance and crash safety
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(pool)
        .await?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await?;

    // Create migrations table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    let current = current_version(pool).await?;

    tracing::info!("Current database version: {}", current);

    if current > target_version {
        return Err(AppError::SchemaDowngrade {
            on_disk: current,
            requested: target_version,
        });
    }

    apply_migrations(pool, current, target_version).await?;
    ensure_collections(pool, target_version).await?;

    tracing::info!("Database initialization complete");
    Ok(())
}

/// Highest applied migration version, 0 for a fresh database
pub async fn current_version(pool: &SqlitePool) -> Result<i32> {
    let version: i32 = sqlx::query("SELECT COALESCE(MAX(version), 0) FROM migrations")
        .fetch_one(pool)
        .await?
        .get(0);

    Ok(version)
}

async fn apply_migrations(pool: &SqlitePool, current_version: i32, target_version: i32) -> Result<()> {
    for (version, sql) in get_migrations() {
        if version <= current_version || version > target_version {
            continue;
        }

        tracing::info!("Applying migration version {}", version);

        let mut tx = pool.begin().await?;

        for statement in statements(sql) {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }

        sqlx::query("INSERT INTO migrations (version) VALUES (?)")
            .bind(version)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Migration version {} applied successfully", version);
    }

    Ok(())
}

/// Re-run the CREATE statements of every migration up to `target_version`.
///
/// Newest first, so a collection whose shape changed (photos in v2) is
/// recreated with its latest definition; older `IF NOT EXISTS` statements for
/// the same collection then do nothing.
async fn ensure_collections(pool: &SqlitePool, target_version: i32) -> Result<()> {
    let mut tx = pool.begin().await?;

    for (version, sql) in get_migrations().into_iter().rev() {
        if version > target_version {
            continue;
        }
        for statement in statements(sql) {
            if statement.to_uppercase().starts_with("CREATE") {
                sqlx::query(&statement).execute(&mut *tx).await?;
            }
        }
    }

    tx.commit().await?;

    tracing::debug!("Collections verified for version {}", target_version);
    Ok(())
}

fn get_migrations() -> Vec<(i32, &'static str)> {
    vec![
        (1, include_str!("migrations/001_initial_schema.sql")),
        (2, include_str!("migrations/002_photo_metadata.sql")),
        (3, include_str!("migrations/003_moods.sql")),
        (4, include_str!("migrations/004_auth_token_cache.sql")),
    ]
}

/// Split a migration file into statements, dropping `--` comment lines
fn statements(sql: &str) -> Vec<String> {
    let without_comments: String = sql
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    without_comments
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DB_VERSION;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    async fn object_count(pool: &SqlitePool, kind: &str, name: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = ? AND name = ?")
            .bind(kind)
            .bind(name)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize_database() {
        let pool = memory_pool().await;

        initialize_database(&pool, DB_VERSION).await.unwrap();

        let version = current_version(&pool).await.unwrap();
        assert_eq!(version, DB_VERSION);

        for table in ["messages", "photos", "moods", "auth_token_cache"] {
            assert_eq!(object_count(&pool, "table", table).await, 1, "{}", table);
        }
    }

    #[tokio::test]
    async fn test_initialize_twice_is_idempotent() {
        let pool = memory_pool().await;

        initialize_database(&pool, DB_VERSION).await.unwrap();
        initialize_database(&pool, DB_VERSION).await.unwrap();

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(applied, DB_VERSION as i64);

        for index in [
            "idx_messages_by_category",
            "idx_messages_by_date",
            "idx_photos_by_date",
            "idx_moods_by_date",
        ] {
            assert_eq!(object_count(&pool, "index", index).await, 1, "{}", index);
        }
    }

    #[tokio::test]
    async fn test_partial_target_version() {
        let pool = memory_pool().await;

        initialize_database(&pool, 2).await.unwrap();

        assert_eq!(current_version(&pool).await.unwrap(), 2);
        assert_eq!(object_count(&pool, "table", "moods").await, 0);
        assert_eq!(object_count(&pool, "table", "photos").await, 1);
    }

    #[tokio::test]
    async fn test_downgrade_rejected() {
        let pool = memory_pool().await;

        initialize_database(&pool, DB_VERSION).await.unwrap();
        let err = initialize_database(&pool, 2).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::SchemaDowngrade {
                on_disk: DB_VERSION,
                requested: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_collection_is_recreated() {
        let pool = memory_pool().await;

        initialize_database(&pool, DB_VERSION).await.unwrap();
        sqlx::query("DROP TABLE moods").execute(&pool).await.unwrap();

        initialize_database(&pool, DB_VERSION).await.unwrap();

        assert_eq!(object_count(&pool, "table", "moods").await, 1);
        assert_eq!(object_count(&pool, "index", "idx_moods_by_date").await, 1);
    }

    #[tokio::test]
    async fn test_missing_photos_recreated_with_current_schema() {
        let pool = memory_pool().await;

        initialize_database(&pool, DB_VERSION).await.unwrap();
        sqlx::query("DROP TABLE photos").execute(&pool).await.unwrap();

        initialize_database(&pool, DB_VERSION).await.unwrap();

        let has_mime_column: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pragma_table_info('photos') WHERE name = 'mime_type'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(has_mime_column, 1);
    }

    #[tokio::test]
    async fn test_v1_photos_dropped_on_upgrade() {
        let pool = memory_pool().await;

        initialize_database(&pool, 1).await.unwrap();
        sqlx::query("INSERT INTO photos (blob, caption, upload_date) VALUES (x'00', 'old', '2024-01-01')")
            .execute(&pool)
            .await
            .unwrap();

        initialize_database(&pool, DB_VERSION).await.unwrap();

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM photos")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_statement_splitting_skips_comments() {
        let sql = "-- header; with semicolon\nCREATE TABLE a (x INTEGER);\n\n-- trailing\n";
        assert_eq!(statements(sql), vec!["CREATE TABLE a (x INTEGER)".to_string()]);
    }
}
