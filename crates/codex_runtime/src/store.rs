//! Alias persistence using `MessagePack`.
//!
//! Every scope's [`AliasBook`] lives in one map behind a mutex, so writers
//! for a scope never interleave. A store opened on a path rewrites the whole
//! file on each change, and the change shows in memory only once written.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use codex_foundation::{Error, ErrorKind, Result};
use codex_pool::{AliasBook, AliasRecord, AliasScope, AliasSource};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// On-disk layout: one entry per scope.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredAliases {
    scopes: Vec<(AliasScope, AliasBook)>,
}

/// Serializes alias books to bytes using `MessagePack` format.
fn to_bytes(books: &BTreeMap<AliasScope, AliasBook>) -> Result<Vec<u8>> {
    let stored = StoredAliases {
        scopes: books
            .iter()
            .filter(|(_, book)| !book.is_empty())
            .map(|(scope, book)| (scope.clone(), book.clone()))
            .collect(),
    };
    rmp_serde::to_vec_named(&stored).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
}

/// Deserializes alias books from `MessagePack` bytes.
fn from_bytes(bytes: &[u8]) -> Result<BTreeMap<AliasScope, AliasBook>> {
    let stored: StoredAliases =
        rmp_serde::from_slice(bytes).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))?;
    Ok(stored.scopes.into_iter().collect())
}

fn io_error(action: &str, path: &Path, e: &std::io::Error) -> Error {
    Error::new(ErrorKind::Io(format!("failed to {action} '{}': {e}", path.display())))
}

/// Alias lists for every user and group.
#[derive(Debug, Default)]
pub struct AliasStore {
    path: Option<PathBuf>,
    books: Mutex<BTreeMap<AliasScope, AliasBook>>,
}

impl AliasStore {
    /// Creates a store that is never written to disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the store at `path`; a missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let books = if path.exists() {
            let file = File::open(&path).map_err(|e| io_error("open file", &path, &e))?;
            let mut bytes = Vec::new();
            BufReader::new(file)
                .read_to_end(&mut bytes)
                .map_err(|e| io_error("read from file", &path, &e))?;
            from_bytes(&bytes)?
        } else {
            debug!(path = %path.display(), "alias store starts empty");
            BTreeMap::new()
        };

        Ok(Self {
            path: Some(path),
            books: Mutex::new(books),
        })
    }

    /// Backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Adds `alias -> original` to `scope` and persists the store.
    ///
    /// # Errors
    ///
    /// Returns the book's error for a full list or a bad alias, or an I/O
    /// error if the store cannot be saved.
    pub fn add(&self, scope: &AliasScope, original: &str, alias: &str) -> Result<AliasRecord> {
        let mut books = self.lock()?;
        let mut staged = books.clone();
        let record = staged.entry(scope.clone()).or_default().add(original, alias)?.clone();
        self.save(&staged)?;
        *books = staged;
        debug!(scope = ?scope, alias = %record.alias.display, original = %record.original.display, "alias added");
        Ok(record)
    }

    /// Removes the record at 1-based `index` of `scope` and persists the store.
    ///
    /// # Errors
    ///
    /// Returns an error if no such record exists or the store cannot be saved.
    pub fn remove(&self, scope: &AliasScope, index: usize) -> Result<AliasRecord> {
        let mut books = self.lock()?;
        let mut staged = books.clone();
        let book = staged.get_mut(scope).ok_or_else(|| Error::new(ErrorKind::InvalidIndex(index)))?;
        let record = book.remove(index)?;
        self.save(&staged)?;
        *books = staged;
        Ok(record)
    }

    /// The records of `scope`, in substitution order.
    ///
    /// # Errors
    ///
    /// Returns an internal error if a writer panicked while holding the lock.
    pub fn list(&self, scope: &AliasScope) -> Result<Vec<AliasRecord>> {
        Ok(self
            .lock()?
            .get(scope)
            .map(|book| book.records().to_vec())
            .unwrap_or_default())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<AliasScope, AliasBook>>> {
        self.books
            .lock()
            .map_err(|_| Error::internal("alias store lock poisoned"))
    }

    fn save(&self, books: &BTreeMap<AliasScope, AliasBook>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let bytes = to_bytes(books)?;
        let file = File::create(path).map_err(|e| io_error("create file", path, &e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(&bytes)
            .map_err(|e| io_error("write to file", path, &e))?;
        writer.flush().map_err(|e| io_error("flush file", path, &e))?;
        Ok(())
    }
}

impl AliasSource for AliasStore {
    fn aliases(&self, scope: &AliasScope) -> Vec<AliasRecord> {
        self.list(scope).unwrap_or_else(|e| {
            warn!(scope = ?scope, error = %e, "aliases unavailable");
            Vec::new()
        })
    }
}
