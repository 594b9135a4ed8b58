//! Directory-backed key-value store

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use super::{BackendKind, StorageBackend, NAMESPACE_PREFIX};
use crate::error::{Error, Result};

const PROBE_FILE: &str = ".finsight-probe";

/// One file per key, named with the namespace prefix
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Create a new local store
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| {
                Error::Storage(format!(
                    "Failed to create storage directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
            info!("Created storage directory: {}", dir.display());
        }

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the file path for a key
    fn key_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}", NAMESPACE_PREFIX, encode_key(key)))
    }
}

/// Percent-encode everything outside `[A-Za-z0-9._-]` so any key is a safe filename
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[async_trait]
impl StorageBackend for LocalStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        fs::write(self.key_path(key), value)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self) -> Result<()> {
        let mut removed = 0usize;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let owned = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(NAMESPACE_PREFIX));
            if owned && entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        info!("Cleared {} stored values from {}", removed, self.dir.display());
        Ok(())
    }

    async fn probe(&self) -> Result<()> {
        let path = self.dir.join(PROBE_FILE);
        fs::write(&path, b"ok")?;
        fs::remove_file(&path)?;
        Ok(())
    }
}
