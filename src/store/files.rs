//! Photo blob store scoped to a single data directory.

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fs;
use std::path::PathBuf;

use super::FileStore;

pub struct DataDirStore {
    dir: PathBuf,
}

impl DataDirStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)
                .context("Failed to create photo data directory")?;
        }
        Ok(())
    }

    /// Resolve `name` inside the data directory, rejecting anything that
    /// is not a bare filename.
    fn file_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            bail!("Invalid photo filename: {:?}", name);
        }
        Ok(self.dir.join(name))
    }
}

impl FileStore for DataDirStore {
    fn write_file(&self, name: &str, data: &str) -> Result<String> {
        self.ensure_dir()?;
        let path = self.file_path(name)?;

        let bytes = BASE64
            .decode(data)
            .with_context(|| format!("Invalid base64 payload for {:?}", name))?;
        fs::write(&path, bytes)
            .with_context(|| format!("Failed to write photo {:?}", name))?;

        Ok(path.to_string_lossy().to_string())
    }

    fn read_file(&self, name: &str) -> Result<String> {
        let path = self.file_path(name)?;
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read photo {:?}", name))?;
        Ok(BASE64.encode(bytes))
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        let path = self.file_path(name)?;
        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete photo {:?}", name))?;
        Ok(())
    }
}
