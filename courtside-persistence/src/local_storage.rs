use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::LocalStorageError;
use courtside_types::LocalSnapshot;

pub const NAMESPACE: &str = "courtside";
pub const DATA_KEY: &str = "data";
pub const MIGRATED_KEY: &str = "migrated";

/// Namespaced JSON values kept on the device, one file per key.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    namespace: String,
}

impl LocalStorage {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, LocalStorageError> {
        Self::open_namespaced(root, NAMESPACE)
    }

    pub fn open_namespaced(
        root: impl AsRef<Path>,
        namespace: &str,
    ) -> Result<Self, LocalStorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            namespace: namespace.to_string(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{}.json", self.namespace, key))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, LocalStorageError> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), LocalStorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(value)?)?;
        fs::rename(&tmp, &path)?;
        debug!("Wrote local key {}:{}", self.namespace, key);
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), LocalStorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn load_snapshot(&self) -> Result<Option<LocalSnapshot>, LocalStorageError> {
        self.get(DATA_KEY)
    }

    pub fn save_snapshot(&self, snapshot: &LocalSnapshot) -> Result<(), LocalStorageError> {
        self.set(DATA_KEY, snapshot)
    }

    pub fn is_migrated(&self) -> Result<bool, LocalStorageError> {
        Ok(self.get::<bool>(MIGRATED_KEY)?.unwrap_or(false))
    }

    pub fn mark_migrated(&self) -> Result<(), LocalStorageError> {
        self.set(MIGRATED_KEY, &true)
    }
}
