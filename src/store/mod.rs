//! Capability seams for durable storage.
//!
//! The catalog service is constructed over these traits rather than
//! concrete disk types, so tests can substitute in-memory fakes.

mod files;
mod kv;

pub use files::DataDirStore;
pub use kv::FileKvStore;

use anyhow::Result;

/// Durable string-keyed store holding one value per key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Blob store scoped to a single data directory.
///
/// Payloads cross this boundary base64-encoded; names must be bare
/// filenames (no path separators).
pub trait FileStore {
    /// Write base64 `data` under `name`. Returns the stored file's URI.
    fn write_file(&self, name: &str, data: &str) -> Result<String>;

    /// Read the file stored under `name` back as base64.
    fn read_file(&self, name: &str) -> Result<String>;

    fn delete_file(&self, name: &str) -> Result<()>;
}
