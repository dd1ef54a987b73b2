use std::{
    collections::HashMap,
    path::PathBuf,
    sync::Arc,
};

use parking_lot::Mutex;
use serde::{Serialize, de::DeserializeOwned};
use spinlab_core::directory::Directory;

use crate::panel::{
    data::{PanelMaximized, PanelObserver, PanelSizes, PanelState, PanelVisibility},
    registry::PanelRegistry,
};

pub const PANEL_VISIBILITY: &str = "panelVisibility";
pub const PANEL_SIZES: &str = "panelSizes";
pub const PANEL_MAXIMIZED: &str = "panelMaximized";
/// Key shared by panel lists that do not pick their own.
pub const SIDEBAR_PANEL_SIZES: &str = "sidebar-panel-sizes";

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to access `{key}`")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("stored value of `{key}` is malformed")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode `{key}`")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
}

/// A string key/value store that outlives the process.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// One file per key inside a folder.
#[derive(Clone, Debug)]
pub struct FileStore {
    folder: PathBuf,
}

impl FileStore {
    pub fn new(folder: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let folder = folder.into();
        std::fs::create_dir_all(&folder).map_err(|source| PersistenceError::Io {
            key: folder.display().to_string(),
            source,
        })?;
        Ok(Self { folder })
    }

    fn path(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        if key.is_empty()
            || key.starts_with('.')
            || key.contains(['/', '\\', ':'])
        {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }
        Ok(self.folder.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path(key)?;
        match std::fs::read_to_string(path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.path(key)?;
        std::fs::write(path, value).map_err(|source| PersistenceError::Io {
            key: key.to_string(),
            source,
        })
    }
}

/// In-process store, shared between clones.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Mirrors the panel state into a [`KeyValueStore`] and restores it at startup.
#[derive(Clone)]
pub struct LayoutDb {
    store: Arc<dyn KeyValueStore>,
}

impl LayoutDb {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// File-backed db in the per-user data directory, or in `folder` if given.
    pub fn open(folder: Option<PathBuf>) -> anyhow::Result<Self> {
        let folder = match folder {
            Some(folder) => folder,
            None => Directory::db_directory()
                .ok_or_else(|| anyhow::anyhow!("can't get data directory"))?,
        };
        tracing::debug!("panel layout stored in {}", folder.display());
        Ok(Self::new(FileStore::new(folder)?))
    }

    /// Reads the three mappings, each falling back to its default when it is
    /// missing or unreadable. Never fails.
    pub fn load(&self, registry: &PanelRegistry) -> PanelState {
        let defaults = PanelState::new(registry);
        let visibility = self
            .read_logged::<PanelVisibility>(PANEL_VISIBILITY)
            .unwrap_or(defaults.visibility);
        let sizes = self
            .read_logged::<PanelSizes>(PANEL_SIZES)
            .unwrap_or(defaults.sizes);
        let maximized = self
            .read_logged::<PanelMaximized>(PANEL_MAXIMIZED)
            .unwrap_or(defaults.maximized);

        PanelState {
            visibility,
            maximized,
            sizes,
        }
        .normalize(registry)
    }

    /// Writes the three mappings, logging any failure.
    pub fn save(&self, state: &PanelState) {
        if let Err(err) = self.insert_state(state) {
            tracing::error!("failed to save panel state: {err:?}");
        }
    }

    pub fn insert_state(&self, state: &PanelState) -> Result<(), PersistenceError> {
        self.insert(PANEL_VISIBILITY, &state.visibility)?;
        self.insert(PANEL_SIZES, &state.sizes)?;
        self.insert(PANEL_MAXIMIZED, &state.maximized)?;
        Ok(())
    }

    pub fn get_list_sizes(
        &self,
        storage_key: &str,
    ) -> Result<Option<Vec<f64>>, PersistenceError> {
        self.get(storage_key)
    }

    pub fn save_list_sizes(&self, storage_key: &str, sizes: &[f64]) {
        if let Err(err) = self.insert(storage_key, sizes) {
            tracing::error!("failed to save panel sizes: {err:?}");
        }
    }

    fn read_logged<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.get(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::error!("failed to load {key}, using defaults: {err:?}");
                None
            }
        }
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistenceError> {
        let Some(value) = self.store.get(key)? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&value).map_err(|source| {
            PersistenceError::Malformed {
                key: key.to_string(),
                source,
            }
        })?;
        Ok(Some(value))
    }

    fn insert<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), PersistenceError> {
        let value =
            serde_json::to_string(value).map_err(|source| PersistenceError::Encode {
                key: key.to_string(),
                source,
            })?;
        self.store.set(key, &value)
    }
}

impl PanelObserver for LayoutDb {
    fn state_changed(&mut self, state: &PanelState) {
        self.save(state);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::panel::{
        data::PanelData,
        kind::PanelId,
        position::Region,
        registry::{PanelDescriptor, RegionLayout},
    };

    fn registry() -> Arc<PanelRegistry> {
        let panels = vec![
            PanelDescriptor::new("left", "Left", Region::Left),
            PanelDescriptor::new("right", "Right", Region::Right),
            PanelDescriptor::new("bottom", "Bottom", Region::Bottom),
        ];
        Arc::new(PanelRegistry::new(panels, RegionLayout::default()).unwrap())
    }

    #[test]
    fn test_load_empty_store() {
        let registry = registry();
        let db = LayoutDb::new(MemoryStore::new());
        assert_eq!(db.load(&registry), PanelState::new(&registry));
    }

    #[test]
    fn test_save_then_load() {
        let registry = registry();
        let db = LayoutDb::new(MemoryStore::new());
        let mut data = PanelData::new(registry.clone(), db.load(&registry));
        data.observe(db.clone());

        data.close("left");
        data.toggle_maximize("bottom");
        data.resize(Region::Right, 27.25);

        assert_eq!(&db.load(&registry), data.state());
    }

    #[test]
    fn test_wire_format() {
        let registry = registry();
        let store = MemoryStore::new();
        let db = LayoutDb::new(store.clone());
        let mut state = PanelState::new(&registry);
        state.visibility.insert(PanelId::from("left"), false);
        db.save(&state);

        let visibility: serde_json::Value =
            serde_json::from_str(&store.get(PANEL_VISIBILITY).unwrap().unwrap())
                .unwrap();
        assert_eq!(
            visibility,
            serde_json::json!({"left": false, "right": true, "bottom": true})
        );
        let sizes: serde_json::Value =
            serde_json::from_str(&store.get(PANEL_SIZES).unwrap().unwrap()).unwrap();
        assert_eq!(
            sizes,
            serde_json::json!({"left": 20.0, "right": 20.0, "bottom": 15.0})
        );
    }

    #[test]
    fn test_malformed_key_falls_back() {
        let registry = registry();
        let store = MemoryStore::new();
        store.set(PANEL_VISIBILITY, "{not json").unwrap();
        store.set(PANEL_SIZES, r#"{"left": 33.0}"#).unwrap();
        store.set(PANEL_MAXIMIZED, r#"["bottom"]"#).unwrap();

        let state = LayoutDb::new(store).load(&registry);
        assert!(state.is_visible("left"));
        assert!(state.is_visible("bottom"));
        assert_eq!(state.size(Region::Left), 33.0);
        assert_eq!(state.size(Region::Bottom), 15.0);
        assert!(!state.is_maximized("bottom"));
    }

    #[test]
    fn test_stored_size_clamped() {
        let registry = registry();
        let store = MemoryStore::new();
        store.set(PANEL_SIZES, r#"{"left": 80.0, "bottom": 1.0}"#).unwrap();

        let state = LayoutDb::new(store).load(&registry);
        assert_eq!(state.size(Region::Left), 40.0);
        assert_eq!(state.size(Region::Bottom), 10.0);
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry();
        let db = LayoutDb::open(Some(dir.path().join("db"))).unwrap();

        let mut data = PanelData::new(registry.clone(), db.load(&registry));
        data.observe(db.clone());
        data.toggle_minimize("right");

        assert!(dir.path().join("db").join(PANEL_VISIBILITY).exists());
        let reopened = LayoutDb::open(Some(dir.path().join("db"))).unwrap();
        assert!(!reopened.load(&registry).is_visible("right"));
    }

    #[test]
    fn test_file_store_rejects_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert!(matches!(
            store.set("../escape", "1"),
            Err(PersistenceError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(PersistenceError::InvalidKey(_))));
        assert_eq!(store.get("missing").unwrap(), None);
    }
}
