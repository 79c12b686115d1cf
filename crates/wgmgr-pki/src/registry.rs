//! A directory of independent PKIs.
//!
//! Each PKI lives in `<root>/<name>.conf`. Mutations of one PKI are
//! serialized by a per-name lock held across load, mutate and save; different
//! PKIs never share a lock.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{PkiError, Result};
use crate::file::PkiFile;
use crate::store::PkiStore;

const EXTENSION: &str = "conf";

/// Registry of PKIs stored under one directory.
#[derive(Debug)]
pub struct PkiRegistry {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PkiRegistry {
    /// Opens the registry rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// [`PkiError::Io`] if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened PKI registry");
        Ok(Self {
            root,
            locks: Mutex::new(HashMap::new()),
        })
    }

    /// Returns the registry directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file backing PKI `name`.
    ///
    /// # Errors
    ///
    /// [`PkiError::InvalidPkiName`] if `name` cannot be used as a file stem.
    pub fn file(&self, name: &str) -> Result<PkiFile> {
        validate_pki_name(name)?;
        Ok(PkiFile::new(self.root.join(format!("{name}.{EXTENSION}"))))
    }

    /// Runs [`PkiFile::transact`] on PKI `name` under its lock.
    pub fn transact<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut PkiStore) -> Result<T>,
    ) -> Result<T> {
        let file = self.file(name)?;
        let lock = self.lock_for(name);
        let _guard = lock.lock();
        file.transact(f)
    }

    /// Runs [`PkiFile::replace`] on PKI `name` under its lock.
    pub fn replace<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut PkiStore) -> Result<T>,
    ) -> Result<T> {
        let file = self.file(name)?;
        let lock = self.lock_for(name);
        let _guard = lock.lock();
        file.replace(f)
    }

    /// Runs [`PkiFile::read`] on PKI `name` under its lock.
    pub fn read<T>(&self, name: &str, f: impl FnOnce(&PkiStore) -> Result<T>) -> Result<T> {
        let file = self.file(name)?;
        let lock = self.lock_for(name);
        let _guard = lock.lock();
        file.read(f)
    }

    /// Lists the PKIs present in the directory, sorted by name.
    pub fn names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_pki_name(stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Returns the lock for `name`. Entries no caller holds are dropped, so
    /// the map only keeps PKIs with an operation in flight.
    fn lock_for(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(name.to_string()).or_default())
    }
}

/// Checks that `name` is usable as a PKI name: non-empty, made of ASCII
/// letters, digits, `_`, `.` and `-`, and not starting with a dot.
pub fn validate_pki_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if valid {
        Ok(())
    } else {
        Err(PkiError::InvalidPkiName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PkiEngine;
    use crate::testing::{client_key, home_net, CountingKeyService};
    use std::collections::HashSet;
    use tempfile::TempDir;
    use test_case::test_case;

    fn init(store: &mut PkiStore) -> Result<()> {
        PkiEngine::apply(store, CountingKeyService::default(), |engine| {
            engine.init(home_net(false)).map(|_| ())
        })
    }

    fn add(store: &mut PkiStore, byte: u8) -> Result<()> {
        let name = format!("client-{byte}");
        PkiEngine::apply(store, CountingKeyService::default(), |engine| {
            engine.add_client(&client_key(byte), None, Some(&name)).map(|_| ())
        })
    }

    #[test_case("" ; "empty")]
    #[test_case(".hidden" ; "leading dot")]
    #[test_case("../escape" ; "path traversal")]
    #[test_case("a/b" ; "separator")]
    #[test_case("with space" ; "whitespace")]
    fn invalid_names_rejected(name: &str) {
        assert!(matches!(
            validate_pki_name(name),
            Err(PkiError::InvalidPkiName(_))
        ));
    }

    #[test_case("office" ; "plain")]
    #[test_case("wg-home_2.old" ; "punctuation")]
    fn valid_names_accepted(name: &str) {
        assert!(validate_pki_name(name).is_ok());
    }

    #[test]
    fn open_creates_directory() {
        let dir = TempDir::new().expect("tempdir");
        let root = dir.path().join("nested").join("pkis");
        let registry = PkiRegistry::open(&root).expect("open");
        assert!(registry.root().is_dir());
        assert!(registry.names().expect("names").is_empty());
    }

    #[test]
    fn pkis_are_independent() {
        let dir = TempDir::new().expect("tempdir");
        let registry = PkiRegistry::open(dir.path()).expect("open");

        registry.transact("office", init).expect("init office");
        registry.transact("office", |s| add(s, 9)).expect("add");

        let result = registry.transact("home", |s| add(s, 9));
        assert!(matches!(result, Err(PkiError::NotInitialized)));

        registry.transact("home", init).expect("init home");
        registry.transact("home", |s| add(s, 9)).expect("add");

        let home = registry.read("home", |s| Ok(s.clone())).expect("read");
        let office = registry.read("office", |s| Ok(s.clone())).expect("read");
        assert_eq!(home.len(), 1);
        assert_eq!(office.len(), 1);
        assert_eq!(registry.names().expect("names"), ["home", "office"]);
    }

    #[test]
    fn names_skip_foreign_files() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("notes.txt"), "hello").expect("write");
        fs::write(dir.path().join(".hidden.conf"), "").expect("write");
        fs::create_dir(dir.path().join("sub.conf")).expect("mkdir");
        let registry = PkiRegistry::open(dir.path()).expect("open");
        registry.transact("vpn", init).expect("init");

        assert_eq!(registry.names().expect("names"), ["vpn"]);
    }

    #[test]
    fn invalid_name_never_touches_disk() {
        let dir = TempDir::new().expect("tempdir");
        let registry = PkiRegistry::open(dir.path()).expect("open");
        let result = registry.transact("../outside", init);
        assert!(matches!(result, Err(PkiError::InvalidPkiName(_))));
        assert!(registry.names().expect("names").is_empty());
    }

    #[test]
    fn idle_locks_are_released() {
        let dir = TempDir::new().expect("tempdir");
        let registry = PkiRegistry::open(dir.path()).expect("open");
        for name in ["a", "b", "c"] {
            registry.transact(name, init).expect("init");
        }

        let held = registry.lock_for("d");
        assert_eq!(registry.locks.lock().len(), 1);
        let again = registry.lock_for("d");
        assert!(Arc::ptr_eq(&held, &again));
        assert_eq!(registry.locks.lock().len(), 1);
    }

    #[test]
    fn concurrent_adds_get_unique_addresses() {
        let dir = TempDir::new().expect("tempdir");
        let registry = PkiRegistry::open(dir.path()).expect("open");
        registry.transact("office", init).expect("init");

        std::thread::scope(|scope| {
            for byte in 10..30u8 {
                let registry = &registry;
                scope.spawn(move || {
                    registry
                        .transact("office", |s| add(s, byte))
                        .expect("add should succeed");
                });
            }
        });

        let store = registry.read("office", |s| Ok(s.clone())).expect("read");
        assert_eq!(store.len(), 20);
        let addresses: HashSet<_> = store.clients().map(|c| c.address).collect();
        assert_eq!(addresses.len(), 20);
    }
}
