use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};

/// Directory holding the console's persisted state and log file.
pub fn data_dir() -> Result<PathBuf> {
    let dir = dirs::data_dir()
        .context("Could not find data directory")?
        .join("users-console");

    fs::create_dir_all(&dir).context("Could not create data directory")?;

    Ok(dir)
}

/// String key/value storage persisted to a single JSON file.
///
/// Every write goes straight to disk.
#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl LocalStorage {
    /// Open the storage file in the default data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(data_dir()?.join("local_storage.json"))
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let items = if path.exists() {
            let contents =
                fs::read_to_string(&path).context("Could not read local storage file")?;
            serde_json::from_str(&contents).context("Could not parse local storage file")?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| anyhow!("Local storage lock poisoned"))?;
        items.insert(key.to_string(), value.to_string());
        self.persist(&items)
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| anyhow!("Local storage lock poisoned"))?;
        if items.remove(key).is_some() {
            self.persist(&items)?;
        }
        Ok(())
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let contents =
            serde_json::to_string_pretty(items).context("Could not serialize local storage")?;

        fs::write(&self.path, contents).context("Could not write local storage file")?;

        Ok(())
    }
}
