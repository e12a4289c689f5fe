//! JSON-file saga store.
//!
//! Layout under the root directory:
//! - `active/<id>.json`   state of running sagas
//! - `archive/<id>.json`  state of finished sagas
//! - `signals/<id>.json`  first approval delivered to a running saga, removed on archive
//!
//! Every write goes to a temporary file that is renamed into place, so readers never see a torn record.

use crate::domain::{ApprovalSignal, SagaState};
use crate::foundation::{ReferenceId, Result, SagaError};
use crate::infrastructure::storage::SagaStore;
use log::{debug, warn};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const ACTIVE_DIR: &str = "active";
const ARCHIVE_DIR: &str = "archive";
const SIGNALS_DIR: &str = "signals";
const RECORD_EXTENSION: &str = "json";

pub struct FileSagaStore {
    root: PathBuf,
    // Serializes check-then-write sequences (insert_if_absent, record_signal, archive).
    write_lock: Mutex<()>,
}

impl FileSagaStore {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        for dir in [ACTIVE_DIR, ARCHIVE_DIR, SIGNALS_DIR] {
            fs::create_dir_all(root.join(dir)).map_err(|err| SagaError::storage(format!("create {}", root.join(dir).display()), err))?;
        }
        debug!("opened file saga store root={}", root.display());
        Ok(Self { root, write_lock: Mutex::new(()) })
    }

    fn record_path(&self, dir: &str, reference_id: &ReferenceId) -> PathBuf {
        self.root.join(dir).join(format!("{}.{}", encode_file_stem(reference_id), RECORD_EXTENSION))
    }

    fn read_record<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(SagaError::storage(format!("read {}", path.display()), err)),
        }
    }

    fn write_record<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        let tmp = path.with_extension(format!("{}.tmp-{}", RECORD_EXTENSION, uuid::Uuid::new_v4().simple()));
        fs::write(&tmp, &bytes).map_err(|err| SagaError::storage(format!("write {}", tmp.display()), err))?;
        if let Err(err) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(SagaError::storage(format!("rename into {}", path.display()), err));
        }
        Ok(())
    }
}

impl SagaStore for FileSagaStore {
    fn insert_if_absent(&self, state: &SagaState) -> Result<bool> {
        let _guard = self.write_lock.lock();
        let active = self.record_path(ACTIVE_DIR, state.reference_id());
        let archived = self.record_path(ARCHIVE_DIR, state.reference_id());
        if active.exists() || archived.exists() {
            return Ok(false);
        }
        self.write_record(&active, state)?;
        Ok(true)
    }

    fn load(&self, reference_id: &ReferenceId) -> Result<Option<SagaState>> {
        if let Some(state) = self.read_record(&self.record_path(ACTIVE_DIR, reference_id))? {
            return Ok(Some(state));
        }
        self.read_record(&self.record_path(ARCHIVE_DIR, reference_id))
    }

    fn save(&self, state: &SagaState) -> Result<()> {
        self.write_record(&self.record_path(ACTIVE_DIR, state.reference_id()), state)
    }

    fn archive(&self, state: &SagaState) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.write_record(&self.record_path(ARCHIVE_DIR, state.reference_id()), state)?;
        remove_if_present(&self.record_path(ACTIVE_DIR, state.reference_id()))?;
        remove_if_present(&self.record_path(SIGNALS_DIR, state.reference_id()))
    }

    fn list_active(&self) -> Result<Vec<SagaState>> {
        let dir = self.root.join(ACTIVE_DIR);
        let entries = fs::read_dir(&dir).map_err(|err| SagaError::storage(format!("list {}", dir.display()), err))?;
        let mut states = Vec::new();
        for entry in entries {
            let path = entry.map_err(|err| SagaError::storage(format!("list {}", dir.display()), err))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            match self.read_record::<SagaState>(&path) {
                Ok(Some(state)) if !state.is_terminal() => states.push(state),
                Ok(_) => {}
                Err(err) => warn!("skipping unreadable saga record path={} error={}", path.display(), err),
            }
        }
        Ok(states)
    }

    fn record_signal(&self, reference_id: &ReferenceId, signal: &ApprovalSignal) -> Result<bool> {
        let _guard = self.write_lock.lock();
        let path = self.record_path(SIGNALS_DIR, reference_id);
        if path.exists() || self.record_path(ARCHIVE_DIR, reference_id).exists() {
            return Ok(false);
        }
        self.write_record(&path, signal)?;
        Ok(true)
    }

    fn pending_signal(&self, reference_id: &ReferenceId) -> Result<Option<ApprovalSignal>> {
        self.read_record(&self.record_path(SIGNALS_DIR, reference_id))
    }

    fn health_check(&self) -> Result<()> {
        for dir in [ACTIVE_DIR, ARCHIVE_DIR, SIGNALS_DIR] {
            let path = self.root.join(dir);
            let metadata = fs::metadata(&path).map_err(|err| SagaError::storage(format!("stat {}", path.display()), err))?;
            if !metadata.is_dir() || metadata.permissions().readonly() {
                return Err(SagaError::storage("health check", format!("{} is not a writable directory", path.display())));
            }
        }
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(SagaError::storage(format!("remove {}", path.display()), err)),
    }
}

/// Maps a reference id onto a safe file stem: ASCII alphanumerics, `-` and `_` pass through,
/// every other byte becomes `%XX`.
fn encode_file_stem(reference_id: &ReferenceId) -> String {
    let mut out = String::with_capacity(reference_id.len());
    for byte in reference_id.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
