// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable object store for finished task logs.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("invalid object path: {0}")]
    InvalidPath(String),
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Object store keyed by relative paths such as `1/2/0a/10.log`.
#[async_trait]
pub trait ArchiveStore: Clone + Send + Sync + 'static {
    /// Store `data` at `path`, replacing any previous object.
    async fn put(&self, path: &str, data: Vec<u8>) -> Result<(), ArchiveError>;

    async fn get(&self, path: &str) -> Result<Vec<u8>, ArchiveError>;

    /// Remove the object. Deleting a missing object is not an error.
    async fn delete(&self, path: &str) -> Result<(), ArchiveError>;
}

/// Archive on the local filesystem under a root directory.
#[derive(Clone, Debug)]
pub struct FsArchive {
    root: PathBuf,
}

impl FsArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, ArchiveError> {
        let rel = Path::new(path);
        let clean = !path.is_empty() && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(ArchiveError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(rel))
    }
}

fn io_err(path: &str) -> impl FnOnce(std::io::Error) -> ArchiveError + '_ {
    move |source| ArchiveError::Io { path: path.to_string(), source }
}

#[async_trait]
impl ArchiveStore for FsArchive {
    async fn put(&self, path: &str, data: Vec<u8>) -> Result<(), ArchiveError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err(path))?;
        }
        let mut tmp = target.clone().into_os_string();
        tmp.push(".part");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, &data).await.map_err(io_err(path))?;
        tokio::fs::rename(&tmp, &target).await.map_err(io_err(path))?;
        tracing::debug!(path, bytes = data.len(), "archived object");
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, ArchiveError> {
        let target = self.resolve(path)?;
        match tokio::fs::read(&target).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ArchiveError::NotFound(path.to_string()))
            }
            Err(e) => Err(io_err(path)(e)),
        }
    }

    async fn delete(&self, path: &str) -> Result<(), ArchiveError> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(path)(e)),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{ArchiveError, ArchiveStore};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeArchiveState {
        objects: BTreeMap<String, Vec<u8>>,
        fail_puts: bool,
        puts: usize,
    }

    /// In-memory archive with injectable put failures.
    #[derive(Clone, Default)]
    pub struct FakeArchive {
        inner: Arc<Mutex<FakeArchiveState>>,
    }

    impl FakeArchive {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every following `put` fail until reset.
        pub fn set_fail_puts(&self, fail: bool) {
            self.inner.lock().fail_puts = fail;
        }

        pub fn object(&self, path: &str) -> Option<Vec<u8>> {
            self.inner.lock().objects.get(path).cloned()
        }

        pub fn paths(&self) -> Vec<String> {
            self.inner.lock().objects.keys().cloned().collect()
        }

        /// Number of successful puts.
        pub fn put_count(&self) -> usize {
            self.inner.lock().puts
        }
    }

    #[async_trait]
    impl ArchiveStore for FakeArchive {
        async fn put(&self, path: &str, data: Vec<u8>) -> Result<(), ArchiveError> {
            let mut inner = self.inner.lock();
            if inner.fail_puts {
                return Err(ArchiveError::Io {
                    path: path.to_string(),
                    source: std::io::Error::other("injected put failure"),
                });
            }
            inner.objects.insert(path.to_string(), data);
            inner.puts += 1;
            Ok(())
        }

        async fn get(&self, path: &str) -> Result<Vec<u8>, ArchiveError> {
            self.object(path).ok_or_else(|| ArchiveError::NotFound(path.to_string()))
        }

        async fn delete(&self, path: &str) -> Result<(), ArchiveError> {
            self.inner.lock().objects.remove(path);
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeArchive;

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
