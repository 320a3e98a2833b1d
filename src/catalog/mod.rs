//! The photo catalog: an ordered list of photo records, newest first,
//! mirrored to the key-value store as a single JSON blob.
//!
//! All capability handles (key-value store, file store, camera, display
//! adapter) are injected at construction. Mutations are serialized by the
//! caller; the UI never has more than one in flight.

mod display;

pub use display::{data_uri, DirectDisplay, DisplayAdapter, InlineDisplay};

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::capture::{CaptureDevice, CaptureError};
use crate::store::{FileStore, KeyValueStore};

/// One stored photo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhotoRecord {
    /// Stable identifier, the generated filename stem. Blobs written by
    /// older versions have no id; `load` backfills it.
    #[serde(default)]
    pub id: String,

    /// Locator for the photo bytes in the file store.
    #[serde(rename = "filePath")]
    pub file_path: String,

    /// URI the gallery renders from: a plain path or a `data:` URI.
    #[serde(rename = "webviewPath")]
    pub display_path: String,
}

impl PhotoRecord {
    /// Bare filename of the stored photo: the last segment of `file_path`.
    pub fn stored_filename(&self) -> &str {
        self.file_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.file_path)
    }

    fn filename_stem(&self) -> &str {
        let name = self.stored_filename();
        name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The user backed out of the capture dialog; nothing was mutated.
    #[error("capture cancelled")]
    CaptureCancelled,

    #[error("capture failed: {0}")]
    Capture(String),

    #[error("no photo with id {0:?}")]
    UnknownPhoto(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub struct Catalog {
    records: Vec<PhotoRecord>,
    key: String,
    kv: Box<dyn KeyValueStore>,
    files: Box<dyn FileStore>,
    camera: Box<dyn CaptureDevice>,
    display: Box<dyn DisplayAdapter>,
}

impl Catalog {
    pub fn new(
        key: String,
        kv: Box<dyn KeyValueStore>,
        files: Box<dyn FileStore>,
        camera: Box<dyn CaptureDevice>,
        display: Box<dyn DisplayAdapter>,
    ) -> Self {
        Self {
            records: Vec::new(),
            key,
            kv,
            files,
            camera,
            display,
        }
    }

    /// Records in display order, newest first.
    pub fn records(&self) -> &[PhotoRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replace the in-memory catalog with the persisted one.
    ///
    /// A missing or unparseable blob loads as an empty catalog; the album
    /// stays usable even if the store was damaged. Display paths are
    /// refreshed through the adapter; a record whose refresh fails keeps
    /// its stored path.
    pub fn load(&mut self) -> Result<()> {
        let mut records: Vec<PhotoRecord> = match self.kv.get(&self.key) {
            Ok(Some(blob)) => match serde_json::from_str(&blob) {
                Ok(records) => records,
                Err(e) => {
                    warn!("Discarding unparseable catalog blob: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read catalog from store: {:#}", e);
                Vec::new()
            }
        };

        for record in &mut records {
            if record.id.is_empty() {
                record.id = record.filename_stem().to_string();
            }
            match self.display.refresh(record, self.files.as_ref()) {
                Ok(Some(path)) => record.display_path = path,
                Ok(None) => {}
                Err(e) => warn!("Failed to refresh display path for {}: {:#}", record.id, e),
            }
        }

        info!("Loaded {} photos from catalog", records.len());
        self.records = records;
        Ok(())
    }

    /// Capture a new photo, store it, and prepend it to the catalog.
    ///
    /// The record is only constructed once its bytes are safely in the
    /// file store, so a failed capture or write leaves the catalog and
    /// the persisted blob untouched.
    pub fn add_new(&mut self) -> Result<&PhotoRecord, CatalogError> {
        let frame = self.camera.capture().map_err(|e| match e {
            CaptureError::Cancelled => CatalogError::CaptureCancelled,
            other => CatalogError::Capture(other.to_string()),
        })?;

        let bytes = std::fs::read(&frame.path)
            .with_context(|| format!("Failed to read captured frame {}", frame.path.display()))?;
        let data = BASE64.encode(&bytes);

        let filename = generate_filename(&frame.format);
        let uri = self.files.write_file(&filename, &data)?;

        // The spooled frame has been imported; drop it.
        if let Err(e) = std::fs::remove_file(&frame.path) {
            debug!("Leaving spooled frame behind: {}", e);
        }

        let (file_path, display_path) = self.display.paths_for_new(&filename, &uri, &data);
        let id = filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&filename)
            .to_string();

        self.records.insert(
            0,
            PhotoRecord {
                id,
                file_path,
                display_path,
            },
        );
        self.persist()?;

        info!("Added photo {}", self.records[0].id);
        Ok(&self.records[0])
    }

    /// Remove the photo with the given id from the catalog and the file
    /// store.
    ///
    /// The record is removed and persisted before the file delete. If the
    /// file delete fails the catalog has already forgotten the photo and
    /// its file is orphaned on disk; the error still propagates so the
    /// caller can report it.
    pub fn delete(&mut self, id: &str) -> Result<PhotoRecord, CatalogError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| CatalogError::UnknownPhoto(id.to_string()))?;

        let record = self.records.remove(index);
        self.persist()?;

        let filename = record.stored_filename().to_string();
        self.files.delete_file(&filename)?;

        info!("Deleted photo {}", record.id);
        Ok(record)
    }

    /// Serialize the whole catalog and overwrite the stored blob.
    fn persist(&self) -> Result<()> {
        let blob = serde_json::to_string(&self.records).context("Failed to serialize catalog")?;
        self.kv
            .set(&self.key, &blob)
            .context("Failed to persist catalog")?;
        Ok(())
    }
}

/// Generate a unique photo filename: millisecond timestamp plus a
/// process-wide sequence number, so captures landing in the same
/// millisecond cannot overwrite each other.
fn generate_filename(format: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let stamp = chrono::Utc::now().timestamp_millis();
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}_{}.{}", stamp, seq, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CapturedFrame;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct MemoryKv {
        map: Rc<RefCell<HashMap<String, String>>>,
    }

    impl KeyValueStore for MemoryKv {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.map.borrow().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.map.borrow_mut().insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct MemoryFiles {
        blobs: Rc<RefCell<HashMap<String, String>>>,
        deletes: Rc<RefCell<Vec<String>>>,
    }

    impl FileStore for MemoryFiles {
        fn write_file(&self, name: &str, data: &str) -> Result<String> {
            self.blobs
                .borrow_mut()
                .insert(name.to_string(), data.to_string());
            Ok(format!("/data/{}", name))
        }

        fn read_file(&self, name: &str) -> Result<String> {
            self.blobs
                .borrow()
                .get(name)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no file {}", name))
        }

        fn delete_file(&self, name: &str) -> Result<()> {
            self.deletes.borrow_mut().push(name.to_string());
            self.blobs.borrow_mut().remove(name);
            Ok(())
        }
    }

    struct FakeCamera {
        dir: tempfile::TempDir,
        bytes: Vec<u8>,
        shots: RefCell<u32>,
    }

    impl FakeCamera {
        fn returning(bytes: &[u8]) -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
                bytes: bytes.to_vec(),
                shots: RefCell::new(0),
            }
        }
    }

    impl CaptureDevice for FakeCamera {
        fn capture(&self) -> Result<CapturedFrame, CaptureError> {
            let mut shots = self.shots.borrow_mut();
            *shots += 1;
            let path: PathBuf = self.dir.path().join(format!("shot_{}.jpeg", *shots));
            std::fs::write(&path, &self.bytes)?;
            Ok(CapturedFrame {
                path,
                format: "jpeg".to_string(),
            })
        }
    }

    struct CancelledCamera;

    impl CaptureDevice for CancelledCamera {
        fn capture(&self) -> Result<CapturedFrame, CaptureError> {
            Err(CaptureError::Cancelled)
        }
    }

    fn catalog_with(
        kv: MemoryKv,
        files: MemoryFiles,
        camera: Box<dyn CaptureDevice>,
        display: Box<dyn DisplayAdapter>,
    ) -> Catalog {
        Catalog::new(
            "photos".to_string(),
            Box::new(kv),
            Box::new(files),
            camera,
            display,
        )
    }

    fn stored_blob(kv: &MemoryKv) -> Option<String> {
        kv.map.borrow().get("photos").cloned()
    }

    #[test]
    fn test_load_missing_key_yields_empty() {
        let mut catalog = catalog_with(
            MemoryKv::default(),
            MemoryFiles::default(),
            Box::new(CancelledCamera),
            Box::new(DirectDisplay),
        );

        catalog.load().unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_load_malformed_blob_yields_empty() {
        let kv = MemoryKv::default();
        kv.set("photos", "definitely not json").unwrap();

        let mut catalog = catalog_with(
            kv,
            MemoryFiles::default(),
            Box::new(CancelledCamera),
            Box::new(DirectDisplay),
        );

        catalog.load().unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_add_new_prepends_and_persists() {
        let kv = MemoryKv::default();
        let files = MemoryFiles::default();
        let mut catalog = catalog_with(
            kv.clone(),
            files.clone(),
            Box::new(FakeCamera::returning(b"abc")),
            Box::new(DirectDisplay),
        );

        catalog.add_new().unwrap();
        assert_eq!(catalog.len(), 1);

        // Stored bytes decode back to the captured frame
        let record = catalog.records()[0].clone();
        let stored = files.read_file(record.stored_filename()).unwrap();
        assert_eq!(BASE64.decode(stored).unwrap(), b"abc");

        // Durable store holds the single-element array with the original
        // wire field names
        let blob = stored_blob(&kv).unwrap();
        assert!(blob.contains("filePath"));
        assert!(blob.contains("webviewPath"));
        let persisted: Vec<PhotoRecord> = serde_json::from_str(&blob).unwrap();
        assert_eq!(persisted, catalog.records());

        // Second capture lands in front
        catalog.add_new().unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.records()[1].stored_filename(), record.stored_filename());
    }

    #[test]
    fn test_sequential_adds_get_distinct_filenames() {
        let mut catalog = catalog_with(
            MemoryKv::default(),
            MemoryFiles::default(),
            Box::new(FakeCamera::returning(b"abc")),
            Box::new(DirectDisplay),
        );

        catalog.add_new().unwrap();
        catalog.add_new().unwrap();

        // Same-millisecond captures are disambiguated by the sequence
        // suffix
        assert_ne!(
            catalog.records()[0].stored_filename(),
            catalog.records()[1].stored_filename()
        );
        assert_ne!(catalog.records()[0].id, catalog.records()[1].id);
    }

    #[test]
    fn test_cancelled_capture_leaves_everything_untouched() {
        let kv = MemoryKv::default();
        let mut catalog = catalog_with(
            kv.clone(),
            MemoryFiles::default(),
            Box::new(CancelledCamera),
            Box::new(DirectDisplay),
        );

        let result = catalog.add_new();
        assert!(matches!(result, Err(CatalogError::CaptureCancelled)));
        assert!(catalog.is_empty());
        assert_eq!(stored_blob(&kv), None);
    }

    #[test]
    fn test_delete_removes_record_persists_then_deletes_file() {
        let kv = MemoryKv::default();
        let files = MemoryFiles::default();
        let mut catalog = catalog_with(
            kv.clone(),
            files.clone(),
            Box::new(FakeCamera::returning(b"abc")),
            Box::new(DirectDisplay),
        );

        catalog.add_new().unwrap(); // B (older)
        catalog.add_new().unwrap(); // A (newest, index 0)

        let a = catalog.records()[0].clone();
        let b = catalog.records()[1].clone();

        catalog.delete(&b.id).unwrap();

        assert_eq!(catalog.records(), &[a]);
        assert_eq!(
            files.deletes.borrow().as_slice(),
            &[b.stored_filename().to_string()]
        );

        let persisted: Vec<PhotoRecord> = serde_json::from_str(&stored_blob(&kv).unwrap()).unwrap();
        assert_eq!(persisted, catalog.records());
    }

    #[test]
    fn test_delete_unknown_id_is_an_error() {
        let mut catalog = catalog_with(
            MemoryKv::default(),
            MemoryFiles::default(),
            Box::new(FakeCamera::returning(b"abc")),
            Box::new(DirectDisplay),
        );
        catalog.add_new().unwrap();

        let result = catalog.delete("nope");
        assert!(matches!(result, Err(CatalogError::UnknownPhoto(_))));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_delete_then_load_round_trip() {
        let kv = MemoryKv::default();
        let files = MemoryFiles::default();
        let mut catalog = catalog_with(
            kv.clone(),
            files.clone(),
            Box::new(FakeCamera::returning(b"abc")),
            Box::new(DirectDisplay),
        );

        catalog.add_new().unwrap();
        catalog.add_new().unwrap();
        let survivor = catalog.records()[0].clone();
        let doomed = catalog.records()[1].clone();

        catalog.delete(&doomed.id).unwrap();

        // A fresh catalog over the same stores sees the removal
        let mut reloaded = catalog_with(
            kv,
            files,
            Box::new(CancelledCamera),
            Box::new(DirectDisplay),
        );
        reloaded.load().unwrap();
        assert_eq!(reloaded.records(), &[survivor]);
    }

    #[test]
    fn test_persist_load_round_trip_is_lossless() {
        let kv = MemoryKv::default();
        let files = MemoryFiles::default();
        let mut catalog = catalog_with(
            kv.clone(),
            files.clone(),
            Box::new(FakeCamera::returning(b"abc")),
            Box::new(DirectDisplay),
        );

        catalog.add_new().unwrap();
        catalog.add_new().unwrap();
        catalog.add_new().unwrap();
        let before = catalog.records().to_vec();

        let mut reloaded = catalog_with(
            kv,
            files,
            Box::new(CancelledCamera),
            Box::new(DirectDisplay),
        );
        reloaded.load().unwrap();
        assert_eq!(reloaded.records(), before.as_slice());
    }

    #[test]
    fn test_load_backfills_ids_from_legacy_blobs() {
        let kv = MemoryKv::default();
        kv.set(
            "photos",
            r#"[{"filePath":"/data/1712000000000_0.jpeg","webviewPath":"/data/1712000000000_0.jpeg"}]"#,
        )
        .unwrap();

        let mut catalog = catalog_with(
            kv,
            MemoryFiles::default(),
            Box::new(CancelledCamera),
            Box::new(DirectDisplay),
        );
        catalog.load().unwrap();

        assert_eq!(catalog.records()[0].id, "1712000000000_0");
    }

    #[test]
    fn test_inline_display_builds_data_uris() {
        let kv = MemoryKv::default();
        let files = MemoryFiles::default();
        let mut catalog = catalog_with(
            kv.clone(),
            files.clone(),
            Box::new(FakeCamera::returning(b"abc")),
            Box::new(InlineDisplay),
        );

        catalog.add_new().unwrap();
        let record = catalog.records()[0].clone();

        // Inline records carry the bare filename and an immediate data URI
        assert!(!record.file_path.contains('/'));
        assert_eq!(record.display_path, data_uri(&BASE64.encode(b"abc")));

        // Reload rebuilds the data URI from the file store
        let mut reloaded = catalog_with(
            kv,
            files,
            Box::new(CancelledCamera),
            Box::new(InlineDisplay),
        );
        reloaded.load().unwrap();
        assert_eq!(reloaded.records()[0].display_path, record.display_path);
    }

    #[test]
    fn test_inline_refresh_failure_keeps_stored_path() {
        let kv = MemoryKv::default();
        let files = MemoryFiles::default();
        let mut catalog = catalog_with(
            kv.clone(),
            files.clone(),
            Box::new(FakeCamera::returning(b"abc")),
            Box::new(InlineDisplay),
        );
        catalog.add_new().unwrap();
        let record = catalog.records()[0].clone();

        // Lose the file behind the catalog's back
        files.delete_file(record.stored_filename()).unwrap();

        let mut reloaded = catalog_with(
            kv,
            files,
            Box::new(CancelledCamera),
            Box::new(InlineDisplay),
        );
        reloaded.load().unwrap();

        // Load still succeeds; the record keeps its stored display path
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.records()[0].display_path, record.display_path);
    }
}
