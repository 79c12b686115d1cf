//! Loading and saving a PKI file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::Result;
use crate::store::PkiStore;

/// A PKI persisted at a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkiFile {
    path: PathBuf,
}

impl PkiFile {
    /// Creates a handle for `path`. Nothing is read until [`PkiFile::load`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the store. A missing file is an empty, uninitialized store.
    ///
    /// # Errors
    ///
    /// [`crate::PkiError::Io`] on read failures, [`crate::PkiError::Parse`]
    /// on malformed content.
    pub fn load(&self) -> Result<PkiStore> {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                let store = PkiStore::parse(&text)?;
                debug!(path = %self.path.display(), clients = store.len(), "loaded PKI");
                Ok(store)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "PKI file not found, starting empty");
                Ok(PkiStore::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the store atomically: a temporary file in the same directory
    /// is synced and then renamed over the target.
    pub fn save(&self, store: &PkiStore) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(store.to_string().as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        info!(path = %self.path.display(), clients = store.len(), "saved PKI");
        Ok(())
    }

    /// Loads the store, applies `f`, and saves if `f` succeeded and changed
    /// something.
    pub fn transact<T>(&self, f: impl FnOnce(&mut PkiStore) -> Result<T>) -> Result<T> {
        let original = self.load()?;
        let mut store = original.clone();
        let value = f(&mut store)?;
        if store != original {
            self.save(&store)?;
        }
        Ok(value)
    }

    /// Like [`PkiFile::transact`] but starts from an empty store instead of
    /// the file content, so a malformed file does not block replacement.
    pub fn replace<T>(&self, f: impl FnOnce(&mut PkiStore) -> Result<T>) -> Result<T> {
        let mut store = PkiStore::new();
        let value = f(&mut store)?;
        self.save(&store)?;
        Ok(value)
    }

    /// Loads the store and applies a read-only `f`.
    pub fn read<T>(&self, f: impl FnOnce(&PkiStore) -> Result<T>) -> Result<T> {
        f(&self.load()?)
    }
}
