//! Filesystem-based secret storage.
//!
//! Stores each record as `<dir>/<key>.json`, with `/` in keys mapped to
//! `__` so `app/secret` becomes `app__secret.json`. Files are written with
//! restricted permissions (0600 on Unix). File access runs on tokio's
//! blocking pool.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::trace;

use super::SecretStore;
use crate::error::StoreError;

/// Filesystem-based secret storage.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the record for `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key.replace('/', "__")))
    }

    fn write_new(path: &Path, value: &str) -> std::io::Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()
    }

    fn replace(path: &Path, value: &str) -> std::io::Result<()> {
        let tmp = path.with_extension("json.tmp");
        // Leftover from an interrupted replace.
        match fs::remove_file(&tmp) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        Self::write_new(&tmp, value)?;
        fs::rename(&tmp, path)
    }
}

async fn blocking<T, F>(f: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Backend(format!("file store task failed: {}", e)))?
}

#[async_trait]
impl SecretStore for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn get_value(&self, key: &str) -> Result<String, StoreError> {
        let path = self.path_for(key);
        let key = key.to_string();
        trace!(path = %path.display(), "reading state file");

        blocking(move || {
            fs::read_to_string(&path).map_err(|e| match e.kind() {
                ErrorKind::NotFound => StoreError::NotFound(key),
                _ => StoreError::Io(e),
            })
        })
        .await
    }

    async fn put_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let key = key.to_string();
        let value = value.to_string();

        blocking(move || {
            if !path.exists() {
                return Err(StoreError::NotFound(key));
            }

            trace!(path = %path.display(), "replacing state file");
            Self::replace(&path, &value)?;
            Ok(())
        })
        .await
    }

    async fn create_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let dir = self.dir.clone();
        let path = self.path_for(key);
        let key = key.to_string();
        let value = value.to_string();

        blocking(move || {
            fs::create_dir_all(&dir)?;

            trace!(path = %path.display(), "creating state file");
            Self::write_new(&path, &value).map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StoreError::AlreadyExists(key),
                _ => StoreError::Io(e),
            })
        })
        .await
    }
}
