//! SQLite-backed key-value store with connection pooling

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::{BackendKind, StorageBackend};
use crate::error::Result;

pub type KvPool = Pool<SqliteConnectionManager>;
pub type KvConn = PooledConnection<SqliteConnectionManager>;

/// Namespace used when none is given
pub const DEFAULT_NAMESPACE: &str = "finance-app";

/// Rows in a `kv_store` table, scoped by namespace
///
/// The table is created the first time any operation touches the store.
pub struct SqliteStore {
    pool: KvPool,
    path: PathBuf,
    namespace: String,
    initialized: AtomicBool,
}

impl SqliteStore {
    /// Open (or create) a database file in the default namespace
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_namespaced(path, DEFAULT_NAMESPACE)
    }

    pub fn open_namespaced(path: impl Into<PathBuf>, namespace: &str) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Per-connection setting, so every pooled connection needs it
        let manager = SqliteConnectionManager::file(&path)
            .with_init(|conn| conn.execute_batch("PRAGMA synchronous = NORMAL;"));
        let pool = Pool::builder().max_size(4).build(manager)?;

        Ok(Self {
            pool,
            path,
            namespace: namespace.to_string(),
            initialized: AtomicBool::new(false),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Get a connection, creating the schema on first use
    fn conn(&self) -> Result<KvConn> {
        let conn = self.pool.get()?;
        if !self.initialized.load(Ordering::Acquire) {
            conn.execute_batch(
                r#"
                PRAGMA journal_mode = WAL;

                CREATE TABLE IF NOT EXISTS kv_store (
                    namespace TEXT NOT NULL,
                    key TEXT NOT NULL,
                    value TEXT NOT NULL,
                    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    PRIMARY KEY (namespace, key)
                );
                "#,
            )?;
            self.initialized.store(true, Ordering::Release);
            info!("Initialized kv_store schema in {}", self.path.display());
        }
        Ok(conn)
    }
}

#[async_trait]
impl StorageBackend for SqliteStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO kv_store (namespace, key, value, updated_at)
            VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP)
            ON CONFLICT(namespace, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![self.namespace, key, value],
        )?;
        tx.commit()?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE namespace = ?1 AND key = ?2",
                params![self.namespace, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM kv_store WHERE namespace = ?1 AND key = ?2",
            params![self.namespace, key],
        )?;
        tx.commit()?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let removed = tx.execute(
            "DELETE FROM kv_store WHERE namespace = ?1",
            params![self.namespace],
        )?;
        tx.commit()?;
        info!("Cleared {} stored values from namespace {}", removed, self.namespace);
        Ok(())
    }

    async fn probe(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}
