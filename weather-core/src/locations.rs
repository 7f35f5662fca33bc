//! Saved locations, persisted as a JSON array of names.

use log::debug;
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read saved locations from {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write saved locations to {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("saved locations file {path} is corrupt: {source}")]
    Corrupt { path: PathBuf, source: serde_json::Error },
}

/// Persistent set of location names, unique by name.
///
/// Implementations publish the full membership to subscribers after every mutation.
pub trait LocationStore: Send + Sync {
    /// Add `name`. Adding a name that is already saved is a no-op.
    fn create(&self, name: &str) -> Result<(), StoreError>;

    fn list(&self) -> Vec<String>;

    /// Remove `name`, returning whether it was saved.
    fn delete_by_name(&self, name: &str) -> Result<bool, StoreError>;

    fn subscribe(&self) -> watch::Receiver<Vec<String>>;

    /// Names are compared after trimming surrounding whitespace.
    fn contains(&self, name: &str) -> bool {
        let name = name.trim();
        self.list().iter().any(|n| n == name)
    }

    /// Remove every saved location.
    fn clear(&self) -> Result<(), StoreError> {
        for name in self.list() {
            self.delete_by_name(&name)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct FileLocationStore {
    path: PathBuf,
    names: Mutex<Vec<String>>,
    published: watch::Sender<Vec<String>>,
}

impl FileLocationStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let names = Self::read(&path)?;
        debug!("loaded {} saved location(s) from {}", names.len(), path.display());

        let (published, _) = watch::channel(names.clone());
        Ok(Self { path, names: Mutex::new(names), published })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> Result<Vec<String>, StoreError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Read { path: path.to_path_buf(), source }),
        };

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&contents)
            .map_err(|source| StoreError::Corrupt { path: path.to_path_buf(), source })
    }

    fn persist(&self, names: &[String]) -> Result<(), StoreError> {
        let write_err = |source: io::Error| StoreError::Write { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(names).map_err(io::Error::other).map_err(write_err)?;
        fs::write(&self.path, json).map_err(write_err)
    }

    /// Apply `change` to a copy of the names; if it reports a change, persist then publish.
    fn mutate(&self, change: impl FnOnce(&mut Vec<String>) -> bool) -> Result<bool, StoreError> {
        let mut names = self.names.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next = names.clone();
        if !change(&mut next) {
            return Ok(false);
        }

        self.persist(&next)?;
        *names = next.clone();
        self.published.send_replace(next);
        Ok(true)
    }
}

impl LocationStore for FileLocationStore {
    fn create(&self, name: &str) -> Result<(), StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }

        let added = self.mutate(|names| {
            if names.iter().any(|n| n == name) {
                return false;
            }
            names.push(name.to_string());
            true
        })?;

        if added {
            debug!("saved location '{name}'");
        }
        Ok(())
    }

    fn list(&self) -> Vec<String> {
        self.names.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn delete_by_name(&self, name: &str) -> Result<bool, StoreError> {
        let name = name.trim();
        let removed = self.mutate(|names| {
            let before = names.len();
            names.retain(|n| n != name);
            names.len() != before
        })?;

        if removed {
            debug!("removed saved location '{name}'");
        }
        Ok(removed)
    }

    fn subscribe(&self) -> watch::Receiver<Vec<String>> {
        self.published.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileLocationStore {
        FileLocationStore::open(dir.path().join("nested").join("locations.json")).unwrap()
    }

    #[test]
    fn missing_file_is_an_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.list().is_empty());
    }

    #[test]
    fn create_list_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.create("Philadelphia").unwrap();
        store.create("Copenhagen").unwrap();
        assert_eq!(store.list(), ["Philadelphia", "Copenhagen"]);
        assert!(store.contains("Copenhagen"));

        assert!(store.delete_by_name("Philadelphia").unwrap());
        assert_eq!(store.list(), ["Copenhagen"]);
    }

    #[test]
    fn duplicates_and_blank_names_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.create("Oslo").unwrap();
        store.create(" Oslo ").unwrap();
        store.create("   ").unwrap();

        assert_eq!(store.list(), ["Oslo"]);
    }

    #[test]
    fn padded_names_are_matched_like_they_were_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.create(" Oslo ").unwrap();
        assert!(store.contains(" Oslo "));

        assert!(store.delete_by_name(" Oslo ").unwrap());
        assert!(store.list().is_empty());
    }

    #[test]
    fn deleting_an_unknown_name_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(!store.delete_by_name("Atlantis").unwrap());
    }

    #[test]
    fn membership_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        store_in(&dir).create("Lisbon").unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.list(), ["Lisbon"]);
    }

    #[test]
    fn mutations_are_published() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut rx = store.subscribe();

        store.create("Lima").unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ["Lima"]);

        store.create("Lima").unwrap();
        assert!(!rx.has_changed().unwrap());

        store.delete_by_name("Lima").unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn clear_removes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.create("A").unwrap();
        store.create("B").unwrap();

        store.clear().unwrap();

        assert!(store.list().is_empty());
        assert!(store_in(&dir).list().is_empty());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locations.json");
        fs::write(&path, "{not json").unwrap();

        let err = FileLocationStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }
}
