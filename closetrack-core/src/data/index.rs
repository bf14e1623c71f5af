//! Published-URL index: a flat `{"SYMBOL": "<url>"}` JSON object.
//!
//! One entry is upserted per refresh so consumers can discover every
//! snapshot the pipeline publishes.

use super::store::{write_json_atomic, StoreError};
use crate::domain::Market;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

pub struct IndexFile {
    path: PathBuf,
    base_url: String,
}

impl IndexFile {
    pub fn new(path: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            base_url: base_url.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Public URL of a symbol's snapshot.
    pub fn url_for(&self, symbol: &str, market: Market) -> String {
        format!(
            "{}/{}/{}.json",
            self.base_url.trim_end_matches('/'),
            market.dir_name(),
            symbol.to_ascii_uppercase()
        )
    }

    /// Read the current mapping. A missing file is empty; an unreadable
    /// one is logged and treated as empty so the next write repairs it.
    pub fn load(&self) -> BTreeMap<String, String> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "index unreadable, rebuilding");
                return BTreeMap::new();
            }
        };
        match serde_json::from_str(&content) {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "index corrupt, rebuilding");
                BTreeMap::new()
            }
        }
    }

    /// Insert or overwrite the entry for `symbol`, then atomically rewrite the file.
    pub fn upsert(&self, symbol: &str, market: Market) -> Result<String, StoreError> {
        let mut index = self.load();
        let url = self.url_for(symbol, market);
        index.insert(symbol.to_ascii_uppercase(), url.clone());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        write_json_atomic(&self.path, &index)?;
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.github.io/stock-data/data";

    #[test]
    fn url_uses_lowercase_market_and_uppercase_symbol() {
        let index = IndexFile::new("T.JSON", format!("{BASE}/"));
        assert_eq!(
            index.url_for("aapl", Market::Us),
            format!("{BASE}/us/AAPL.json")
        );
    }

    #[test]
    fn upsert_creates_then_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let index = IndexFile::new(dir.path().join("T.JSON"), BASE);

        index.upsert("TSLA", Market::Us).unwrap();
        index.upsert("005930", Market::Kr).unwrap();
        index.upsert("TSLA", Market::Kr).unwrap();

        let map = index.load();
        assert_eq!(map.len(), 2);
        assert_eq!(map["TSLA"], format!("{BASE}/kr/TSLA.json"));
        assert_eq!(map["005930"], format!("{BASE}/kr/005930.json"));
    }

    #[test]
    fn corrupt_index_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("T.JSON");
        fs::write(&path, "[1, 2").unwrap();
        let index = IndexFile::new(&path, BASE);

        index.upsert("AAPL", Market::Us).unwrap();
        let map = index.load();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("AAPL"));
    }
}
