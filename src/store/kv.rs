//! File-backed key-value store, one file per key.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::PathBuf;

use super::KeyValueStore;

pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)
                .context("Failed to create key-value store directory")?;
        }
        Ok(())
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            bail!("Invalid storage key: {:?}", key);
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let value = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read value for key {:?}", key))?;
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_dir()?;
        let path = self.key_path(key)?;

        // Write to a sidecar file and rename so readers never observe a
        // half-written value.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value)
            .with_context(|| format!("Failed to write value for key {:?}", key))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to commit value for key {:?}", key))?;
        Ok(())
    }
}
