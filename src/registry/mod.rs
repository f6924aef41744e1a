use crate::security::NamespaceSanitizer;
use crate::store::{ChainError, ChainResult, ChainStore};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};


/// Where namespace stores live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// One `<namespace>.db` file per namespace under this directory
    Directory(PathBuf),
    /// Private in-memory stores, lost when evicted
    InMemory,
}

/// A namespace's store, filled in by whichever caller opens it first
type Slot = Arc<Mutex<Option<ChainStore>>>;

/// Lazily opened chain stores, keyed by namespace id
pub struct NamespaceRegistry {
    location: StorageLocation,
    slots: Mutex<HashMap<String, Slot>>,
}

impl NamespaceRegistry {
    /// Create an empty registry; nothing is opened until first use
    pub fn new(location: StorageLocation) -> Self {
        Self {
            location,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn in_directory(dir: impl Into<PathBuf>) -> Self {
        Self::new(StorageLocation::Directory(dir.into()))
    }

    pub fn in_memory() -> Self {
        Self::new(StorageLocation::InMemory)
    }

    pub fn location(&self) -> &StorageLocation {
        &self.location
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores that are currently open, sorted by namespace
    fn open_stores(&self) -> Vec<(String, ChainStore)> {
        let slots: Vec<(String, Slot)> = self
            .lock()
            .iter()
            .map(|(namespace, slot)| (namespace.clone(), Arc::clone(slot)))
            .collect();

        let mut stores: Vec<(String, ChainStore)> = slots
            .into_iter()
            .filter_map(|(namespace, slot)| {
                let store = lock_slot(&slot).clone()?;
                Some((namespace, store))
            })
            .collect();
        stores.sort_by(|a, b| a.0.cmp(&b.0));
        stores
    }

    /// Database file backing a namespace, if stores live on disk
    pub fn path_for(&self, namespace: &str) -> ChainResult<Option<PathBuf>> {
        let namespace = NamespaceSanitizer::sanitize(namespace)?;
        Ok(match &self.location {
            StorageLocation::Directory(dir) => Some(dir.join(format!("{namespace}.db"))),
            StorageLocation::InMemory => None,
        })
    }

    /// Get the store for a namespace, opening it on first use.
    ///
    /// Concurrent callers for the same namespace share one initialization;
    /// other namespaces are not held up while it runs.
    pub fn get_or_open(&self, namespace: &str) -> ChainResult<ChainStore> {
        let path = self.path_for(namespace)?;

        let slot = Arc::clone(self.lock().entry(namespace.to_string()).or_default());
        let mut slot = lock_slot(&slot);
        if let Some(store) = slot.as_ref() {
            return Ok(store.clone());
        }

        let store = match path {
            Some(path) => {
                if let StorageLocation::Directory(dir) = &self.location {
                    ensure_dir(dir)?;
                }
                tracing::info!(namespace, path = %path.display(), "Opening namespace");
                ChainStore::open(path)?
            }
            None => {
                tracing::info!(namespace, "Opening in-memory namespace");
                ChainStore::open_in_memory()?
            }
        };

        *slot = Some(store.clone());
        Ok(store)
    }

    /// Evict a namespace. Returns false if it was not open.
    ///
    /// The connection stays alive while callers still hold handles to it.
    pub fn close(&self, namespace: &str) -> ChainResult<bool> {
        let Some(slot) = self.lock().remove(namespace) else {
            return Ok(false);
        };
        let Some(store) = lock_slot(&slot).take() else {
            return Ok(false);
        };

        let others = store.handle_count() - 1;
        if !store.close()? {
            tracing::warn!(
                namespace,
                handles = others,
                "Evicted namespace still in use, connection stays open"
            );
        }
        Ok(true)
    }

    /// Evict every namespace
    pub fn close_all(&self) -> ChainResult<()> {
        let drained: Vec<(String, Slot)> = self.lock().drain().collect();
        for (namespace, slot) in drained {
            let Some(store) = lock_slot(&slot).take() else {
                continue;
            };
            tracing::debug!(namespace, "Closing namespace");
            store.close()?;
        }
        Ok(())
    }

    pub fn is_open(&self, namespace: &str) -> bool {
        let slot = match self.lock().get(namespace) {
            Some(slot) => Arc::clone(slot),
            None => return false,
        };
        let open = lock_slot(&slot).is_some();
        open
    }

    /// Open namespaces, sorted
    pub fn namespaces(&self) -> Vec<String> {
        self.open_stores()
            .into_iter()
            .map(|(namespace, _)| namespace)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.open_stores().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_slot(slot: &Mutex<Option<ChainStore>>) -> MutexGuard<'_, Option<ChainStore>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn ensure_dir(dir: &Path) -> ChainResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| ChainError::StorageUnavailable {
        path: dir.to_path_buf(),
        source: Box::new(e),
    })
}
