/// Key-value persistence: one pretty-printed JSON file per key.
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Key for the item catalog with current ratings.
pub const FOOD_ITEMS_KEY: &str = "tasteDuel_foodItems";
/// Key for app state (phase, counters, comparison history).
pub const APP_STATE_KEY: &str = "tasteDuel_appState";

const APP_KEYS: [&str; 2] = [FOOD_ITEMS_KEY, APP_STATE_KEY];

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode \"{key}\": {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait Store {
    fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError>;

    /// `Ok(None)` when nothing was ever saved under `key`.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError>;

    fn clear(&self, key: &str) -> Result<(), StoreError>;

    /// Remove every key this application writes.
    fn clear_all(&self) -> Result<(), StoreError>;
}

pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonFileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl Store for JsonFileStore {
    fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;

        std::fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;

        // Write then rename so a crash never leaves a half-written file behind.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_error(&tmp))?;
        std::fs::rename(&tmp, &path).map_err(io_error(&path))
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let path = self.path_for(key);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path)(e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StoreError::Decode { path, source })
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        for key in APP_KEYS {
            self.clear(key)?;
        }
        Ok(())
    }
}
