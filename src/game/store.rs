//! Character document persistence.
//!
//! The whole character set is one [`Document`] that is loaded and saved as a unit.
//! Backends only guarantee single-call atomicity; the read-modify-write discipline
//! lives in [`Engine`](crate::game::engine::Engine), which serializes every
//! load→mutate→save cycle behind one lock.
//!
//! - [`JsonFileStore`]: pretty JSON at `<data_dir>/<document_file>`. Reads take a shared
//!   fs2 lock, writes go through a temp file renamed over the target while an
//!   exclusive lock is held on a sidecar `.lock` file.
//! - [`MemoryStore`]: in-process document with fault switches for tests.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use fs2::FileExt;

use crate::game::errors::StoreError;
use crate::game::types::Document;

pub trait CharacterStore: Send + Sync {
    /// Load the full document. A never-initialized store yields an empty document
    /// and creates its backing resource.
    fn load(&self) -> Result<Document, StoreError>;

    /// Replace the stored document.
    fn save(&self, document: &Document) -> Result<(), StoreError>;

    /// Human readable location, for logs and status output.
    fn describe(&self) -> String;
}

/// JSON file backend.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl AsRef<Path>, document_file: &str) -> Self {
        Self {
            path: data_dir.as_ref().join(document_file),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("characters.json");
        self.path.with_file_name(format!(".{}.lock", name))
    }

    fn parent_dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    fn write_atomic(&self, content: &str) -> Result<(), StoreError> {
        let dir = self.parent_dir();
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(self.lock_path())?;
        lock_file.lock_exclusive()?;

        let base = self
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("characters.json");
        let mut counter = 0u32;
        let tmp_path = loop {
            let cand = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
            match OpenOptions::new().write(true).create_new(true).open(&cand) {
                Ok(tmp) => {
                    fill_or_remove(&cand, tmp, |f| {
                        f.write_all(content.as_bytes())?;
                        f.flush()?;
                        f.sync_all()
                    })?;
                    break cand;
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    counter = counter.saturating_add(1);
                }
                Err(e) => return Err(e.into()),
            }
        };
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        if let Ok(dirf) = File::open(dir) {
            let _ = dirf.sync_all();
        }
        let _ = lock_file.unlock();
        Ok(())
    }
}

/// Run `fill` on a freshly created temp file; the file is removed if `fill` fails.
fn fill_or_remove<F>(path: &Path, mut file: File, fill: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    if let Err(e) = fill(&mut file) {
        drop(file);
        let _ = fs::remove_file(path);
        return Err(e.into());
    }
    Ok(())
}

impl CharacterStore for JsonFileStore {
    fn load(&self) -> Result<Document, StoreError> {
        let dir = self.parent_dir();
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        if !self.path.exists() {
            log::info!("initializing empty character document at {:?}", self.path);
            let empty = Document::new();
            self.write_atomic(&serde_json::to_string_pretty(&empty)?)?;
            return Ok(empty);
        }
        let mut f = OpenOptions::new().read(true).open(&self.path)?;
        f.lock_shared()?;
        let mut s = String::new();
        let read = f.read_to_string(&mut s);
        let _ = f.unlock();
        read?;
        let cleaned = s.trim_start_matches('\0').trim();
        if cleaned.is_empty() {
            return Ok(Document::new());
        }
        Ok(serde_json::from_str(cleaned)?)
    }

    fn save(&self, document: &Document) -> Result<(), StoreError> {
        if !self.parent_dir().is_dir() {
            return Err(StoreError::Unreachable(format!(
                "directory {:?} is missing",
                self.parent_dir()
            )));
        }
        if !self.path.exists() {
            return Err(StoreError::Deleted(self.path.display().to_string()));
        }
        let data = serde_json::to_string_pretty(document)?;
        self.write_atomic(&data)
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    document: Option<Document>,
    unreachable: bool,
    failing_loads: u32,
    failing_saves: u32,
    saves: u64,
    loads: u64,
}

/// In-memory backend. The document only exists after the first `load`, mirroring
/// the file backend's lazy creation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds `document`.
    pub fn with_document(document: Document) -> Self {
        let store = Self::default();
        if let Ok(mut state) = store.state.lock() {
            state.document = Some(document);
        }
        store
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unreachable("memory store lock poisoned".into()))
    }

    /// Make every load and save fail until switched back.
    pub fn set_unreachable(&self, unreachable: bool) {
        if let Ok(mut state) = self.state() {
            state.unreachable = unreachable;
        }
    }

    /// Fail the next `count` loads with [`StoreError::Unreachable`].
    pub fn fail_next_loads(&self, count: u32) {
        if let Ok(mut state) = self.state() {
            state.failing_loads = count;
        }
    }

    /// Fail the next `count` saves with [`StoreError::Unreachable`].
    pub fn fail_next_saves(&self, count: u32) {
        if let Ok(mut state) = self.state() {
            state.failing_saves = count;
        }
    }

    /// Drop the backing document as if someone deleted it.
    pub fn delete(&self) {
        if let Ok(mut state) = self.state() {
            state.document = None;
        }
    }

    pub fn snapshot(&self) -> Option<Document> {
        self.state().ok().and_then(|s| s.document.clone())
    }

    pub fn save_count(&self) -> u64 {
        self.state().map(|s| s.saves).unwrap_or(0)
    }

    pub fn load_count(&self) -> u64 {
        self.state().map(|s| s.loads).unwrap_or(0)
    }
}

impl CharacterStore for MemoryStore {
    fn load(&self) -> Result<Document, StoreError> {
        let mut state = self.state()?;
        if state.unreachable {
            return Err(StoreError::Unreachable("memory store offline".into()));
        }
        if state.failing_loads > 0 {
            state.failing_loads -= 1;
            return Err(StoreError::Unreachable("injected load failure".into()));
        }
        state.loads += 1;
        Ok(state.document.get_or_insert_with(Document::new).clone())
    }

    fn save(&self, document: &Document) -> Result<(), StoreError> {
        let mut state = self.state()?;
        if state.unreachable {
            return Err(StoreError::Unreachable("memory store offline".into()));
        }
        if state.failing_saves > 0 {
            state.failing_saves -= 1;
            return Err(StoreError::Unreachable("injected save failure".into()));
        }
        if state.document.is_none() {
            return Err(StoreError::Deleted("memory document".into()));
        }
        state.document = Some(document.clone());
        state.saves += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
