//! JSON snapshot store.
//!
//! Layout: `{data_dir}/{market}/{SYMBOL}.json`, market lower-case.
//!
//! The store is read-then-replace only:
//! - `load` reads and parses the whole file, or reports why it could not
//! - `replace` writes the new snapshot to `{SYMBOL}.json.tmp`, syncs it,
//!   and renames it over the old file, so readers never see a partial file

use crate::domain::{Market, Snapshot};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Persistence failures. Always carry the path involved.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to serialize {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("atomic rename onto {} failed: {source}", .path.display())]
    Rename { path: PathBuf, source: io::Error },
}

/// What was found at a snapshot's address before this run.
#[derive(Debug, Clone, PartialEq)]
pub enum PriorSnapshot {
    /// Nothing stored yet.
    Missing,
    /// A file exists but could not be read or parsed.
    Corrupt { path: PathBuf, reason: String },
    Loaded(Snapshot),
}

/// Key-value store of snapshots addressed by `(market, symbol)`.
pub trait SnapshotStore {
    /// Where the snapshot for this key lives (for logging and reporting).
    fn location(&self, market: Market, symbol: &str) -> PathBuf;

    /// Read the full stored value.
    fn load(&self, market: Market, symbol: &str) -> PriorSnapshot;

    /// Replace the stored value. The old value stays intact on failure.
    fn replace(&self, snapshot: &Snapshot) -> Result<PathBuf, StoreError>;
}

/// Snapshot store backed by one pretty-printed JSON file per symbol.
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Root directory of the store.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn market_dir(&self, market: Market) -> PathBuf {
        self.data_dir.join(market.dir_name())
    }
}

impl SnapshotStore for JsonFileStore {
    fn location(&self, market: Market, symbol: &str) -> PathBuf {
        self.market_dir(market).join(format!("{symbol}.json"))
    }

    fn load(&self, market: Market, symbol: &str) -> PriorSnapshot {
        let path = self.location(market, symbol);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return PriorSnapshot::Missing,
            Err(e) => {
                return PriorSnapshot::Corrupt {
                    path,
                    reason: format!("read: {e}"),
                }
            }
        };

        match serde_json::from_str::<Snapshot>(&content) {
            Ok(snapshot) => PriorSnapshot::Loaded(snapshot),
            Err(e) => PriorSnapshot::Corrupt {
                path,
                reason: format!("parse: {e}"),
            },
        }
    }

    fn replace(&self, snapshot: &Snapshot) -> Result<PathBuf, StoreError> {
        let dir = self.market_dir(snapshot.market);
        fs::create_dir_all(&dir).map_err(|source| StoreError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let path = self.location(snapshot.market, &snapshot.ticker);
        write_json_atomic(&path, snapshot)?;
        Ok(path)
    }
}

/// Serialize `value` as pretty JSON and atomically replace `path` with it.
///
/// The parent directory must exist and `path` must name a file.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let mut json = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    json.push(b'\n');

    let tmp_path = tmp_path_for(path).ok_or_else(|| StoreError::Write {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
    })?;
    let write = || -> io::Result<()> {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(&json)?;
        file.sync_all()
    };
    if let Err(source) = write() {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Write {
            path: tmp_path,
            source,
        });
    }

    fs::rename(&tmp_path, path).map_err(|source| {
        // Clean up temp file on rename failure
        let _ = fs::remove_file(&tmp_path);
        StoreError::Rename {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// `foo.json` -> `foo.json.tmp`, in the same directory so rename stays atomic.
fn tmp_path_for(path: &Path) -> Option<PathBuf> {
    let mut name = path.file_name()?.to_os_string();
    name.push(".tmp");
    Some(path.with_file_name(name))
}
