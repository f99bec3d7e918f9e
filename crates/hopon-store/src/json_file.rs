//! File-backed [`ClientStore`]: one JSON document, written through on
//! every mutation.
//!
//! The document is a flat string-to-string object, mirroring what the
//! web client keeps in `localStorage`:
//!
//! ```json
//! {
//!   "hopon_guest_name": "visitor",
//!   "hopon_guest_tokens": "{\"42\":\"gt-abc\"}"
//! }
//! ```
//!
//! Writes go to a temp file in the same directory followed by a rename,
//! so a crash mid-write leaves the previous document intact rather than a
//! truncated one.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use rand::Rng;

use crate::{ClientStore, StoreError};

type Entries = BTreeMap<String, String>;

/// A [`ClientStore`] persisted as a single JSON file.
///
/// The document is held in memory and rewritten in full on each mutation.
/// These documents are a handful of short strings — rewriting them is far
/// cheaper than the bookkeeping for partial updates would be.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<Entries>,
}

impl JsonFileStore {
    /// Opens (or creates) the store at `path`.
    ///
    /// A missing file starts empty. An unreadable or corrupt document
    /// also starts empty — logged, but not fatal, because losing guest
    /// bookkeeping must never prevent the app from starting. The corrupt
    /// file is left in place until the next write replaces it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Entries>(&raw) {
                Ok(entries) => entries,
                Err(error) => {
                    tracing::warn!(
                        path = %path.display(),
                        %error,
                        "store document corrupt, starting empty"
                    );
                    Entries::new()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                Entries::new()
            }
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    %error,
                    "store document unreadable, starting empty"
                );
                Entries::new()
            }
        };

        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    /// The path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &Entries) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write-then-rename keeps the previous document valid if the
        // process dies mid-write. The random suffix keeps two stores
        // pointed at the same path from clobbering each other's temp file.
        let tmp = self.path.with_extension(format!("tmp-{}", tmp_suffix()));
        let bytes = serde_json::to_vec_pretty(entries)?;
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ClientStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries =
            self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries =
            self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries =
            self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

/// Generates an 8-character hex suffix for temp files.
fn tmp_suffix() -> String {
    let bytes: [u8; 4] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
