//! Display adapters: how a record's renderable path is derived.
//!
//! Chosen once at startup from config and injected into the catalog, so
//! the catalog itself never branches on presentation concerns.

use anyhow::Result;

use crate::store::FileStore;

use super::PhotoRecord;

pub trait DisplayAdapter {
    /// Paths for a record whose bytes were just written to the file store.
    ///
    /// Returns `(file_path, display_path)`. `data` is the base64 payload
    /// that was stored, still in memory.
    fn paths_for_new(&self, filename: &str, stored_uri: &str, data: &str) -> (String, String);

    /// Re-resolve the display path of a record loaded from durable
    /// storage. `Ok(None)` means the stored display path is still good.
    fn refresh(&self, record: &PhotoRecord, files: &dyn FileStore) -> Result<Option<String>>;
}

/// Hands the renderer the stored file's own path. Load performs no file
/// reads.
pub struct DirectDisplay;

impl DisplayAdapter for DirectDisplay {
    fn paths_for_new(&self, _filename: &str, stored_uri: &str, _data: &str) -> (String, String) {
        (stored_uri.to_string(), stored_uri.to_string())
    }

    fn refresh(&self, record: &PhotoRecord, _files: &dyn FileStore) -> Result<Option<String>> {
        if record.display_path.is_empty() {
            Ok(Some(record.file_path.clone()))
        } else {
            Ok(None)
        }
    }
}

/// Embeds photo bytes as `data:image/jpeg;base64,…` URIs. Load re-reads
/// every file from the store to rebuild them.
pub struct InlineDisplay;

impl DisplayAdapter for InlineDisplay {
    fn paths_for_new(&self, filename: &str, _stored_uri: &str, data: &str) -> (String, String) {
        // The payload is already in memory; no point re-reading it.
        (filename.to_string(), data_uri(data))
    }

    fn refresh(&self, record: &PhotoRecord, files: &dyn FileStore) -> Result<Option<String>> {
        let data = files.read_file(record.stored_filename())?;
        Ok(Some(data_uri(&data)))
    }
}

pub fn data_uri(data: &str) -> String {
    format!("data:image/jpeg;base64,{}", data)
}
