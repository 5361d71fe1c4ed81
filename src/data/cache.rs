//! Load Cache Module
//! Keeps the last load cycle and hands it back while the data directory is
//! unchanged. Owned by the caller; nothing is cached globally.

use crate::data::loader::{DataLoader, DatasetKey, LoadedDatasets};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

/// Metadata of one dataset file at capture time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStamp {
    pub key: DatasetKey,
    pub len: Option<u64>,
    pub modified: Option<SystemTime>,
}

/// Identity of a data directory's contents, cheap enough to take per reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    data_dir: PathBuf,
    files: Vec<FileStamp>,
}

impl Fingerprint {
    pub fn capture(data_dir: &Path) -> Self {
        let files = DatasetKey::ALL
            .iter()
            .map(|&key| {
                let meta = fs::metadata(data_dir.join(key.file_name())).ok();
                FileStamp {
                    key,
                    len: meta.as_ref().map(|m| m.len()),
                    modified: meta.and_then(|m| m.modified().ok()),
                }
            })
            .collect();

        Self {
            data_dir: data_dir.to_path_buf(),
            files,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

struct CacheEntry {
    fingerprint: Fingerprint,
    datasets: Arc<LoadedDatasets>,
}

/// Single-slot cache of loaded datasets keyed by [`Fingerprint`].
#[derive(Default)]
pub struct DatasetCache {
    entry: Option<CacheEntry>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }

    /// Cached datasets if they were loaded from the same fingerprint.
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<Arc<LoadedDatasets>> {
        self.entry
            .as_ref()
            .filter(|entry| &entry.fingerprint == fingerprint)
            .map(|entry| Arc::clone(&entry.datasets))
    }

    pub fn store(
        &mut self,
        fingerprint: Fingerprint,
        datasets: LoadedDatasets,
    ) -> Arc<LoadedDatasets> {
        let datasets = Arc::new(datasets);
        debug!(data_dir = %fingerprint.data_dir().display(), "load cache updated");
        self.entry = Some(CacheEntry {
            fingerprint,
            datasets: Arc::clone(&datasets),
        });
        datasets
    }

    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            debug!("load cache invalidated");
        }
    }

    /// Return the cached load for the loader's directory, reloading if the
    /// directory contents changed since the last load.
    pub fn get_or_load(&mut self, loader: &DataLoader) -> Arc<LoadedDatasets> {
        let fingerprint = Fingerprint::capture(loader.data_dir());
        if let Some(datasets) = self.lookup(&fingerprint) {
            debug!("load cache hit");
            return datasets;
        }
        self.store(fingerprint, loader.load_all())
    }
}
