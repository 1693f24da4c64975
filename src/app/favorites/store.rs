//! Favorites persistence
//!
//! A single `favorite_meals` table keyed by meal identifier. The table is
//! created on open; there is no separate migration step.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::app::models::FavoriteMeal;
use crate::constants::favorites;
use crate::errors::{StoreError, StoreResult};

/// Storage operations the favorites coordinator needs
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    /// Insert the favorite, replacing any row with the same id
    async fn upsert(&self, favorite: &FavoriteMeal) -> StoreResult<()>;

    /// Delete by id; returns whether a row was removed
    async fn delete(&self, id: &str) -> StoreResult<bool>;

    /// Whether a favorite with this id exists
    async fn exists(&self, id: &str) -> StoreResult<bool>;

    /// All favorites, most recently added first
    async fn list_recent_first(&self) -> StoreResult<Vec<FavoriteMeal>>;
}

/// SQLite-backed favorites table
#[derive(Debug, Clone)]
pub struct SqliteFavoritesStore {
    pool: SqlitePool,
}

impl SqliteFavoritesStore {
    /// Open (creating if needed) the database file at `path`
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the parent directory cannot be created or the
    /// database cannot be opened
    pub async fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|_| StoreError::DirectoryNotAccessible {
                    path: parent.to_path_buf(),
                })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(favorites::MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        tracing::debug!("Opened favorites database at {}", path.display());
        Self::with_pool(pool).await
    }

    /// Open a private in-memory database
    ///
    /// The pool is pinned to a single connection that never expires, since
    /// every SQLite memory connection is its own database.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database cannot be created
    pub async fn in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    /// Wrap an existing pool, creating the table if needed
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the table cannot be created
    pub async fn with_pool(pool: SqlitePool) -> StoreResult<Self> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Get a reference to the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS favorite_meals (
                id TEXT PRIMARY KEY NOT NULL,
                name TEXT NOT NULL,
                thumbnail TEXT,
                category TEXT,
                area TEXT,
                created_at INTEGER NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_favorite_meals_created_at ON favorite_meals(created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl FavoritesStore for SqliteFavoritesStore {
    async fn upsert(&self, favorite: &FavoriteMeal) -> StoreResult<()> {
        sqlx::query(
            r"
            INSERT OR REPLACE INTO favorite_meals (id, name, thumbnail, category, area, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&favorite.id)
        .bind(&favorite.name)
        .bind(&favorite.thumbnail)
        .bind(&favorite.category)
        .bind(&favorite.area)
        .bind(favorite.created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM favorite_meals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, id: &str) -> StoreResult<bool> {
        let row = sqlx::query("SELECT 1 FROM favorite_meals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn list_recent_first(&self) -> StoreResult<Vec<FavoriteMeal>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, thumbnail, category, area, created_at
            FROM favorite_meals
            ORDER BY created_at DESC, rowid DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_favorite).collect()
    }
}

fn row_to_favorite(row: &SqliteRow) -> StoreResult<FavoriteMeal> {
    let id: String = row.try_get("id")?;
    let created_at_ms: i64 = row.try_get("created_at")?;
    let created_at =
        DateTime::<Utc>::from_timestamp_millis(created_at_ms).ok_or_else(|| {
            StoreError::InvalidRow {
                id: id.clone(),
                reason: format!("timestamp {created_at_ms} out of range"),
            }
        })?;

    Ok(FavoriteMeal {
        name: row.try_get("name")?,
        thumbnail: row.try_get("thumbnail")?,
        category: row.try_get("category")?,
        area: row.try_get("area")?,
        created_at,
        id,
    })
}
