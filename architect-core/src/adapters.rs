//! Default filesystem-backed port implementations.

use crate::ports::{BackupPort, WritePort};
use anyhow::Context;
use architect_domain::{MemorySchemaStore, SchemaStore};
use architect_types::kind::ObjectKind;
use architect_types::layout::FieldLayout;
use architect_types::object::{SaveOutcome, SchemaDraft, SchemaObject};
use architect_types::report::RestorePoint;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use fs_err as fs;
use sha2::{Digest, Sha256};
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

/// Schema store persisted as a single JSON file.
///
/// Every mutation is written through, so a restore point taken from the
/// file reflects everything saved so far.
#[derive(Debug)]
pub struct FileSchemaStore {
    path: Utf8PathBuf,
    inner: MemorySchemaStore,
}

impl FileSchemaStore {
    /// Open the store at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<Utf8PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let inner = if path.exists() {
            let text = fs::read_to_string(&path)?;
            serde_json::from_str(&text).with_context(|| format!("parse store {}", path))?
        } else {
            debug!(path = %path, "store file missing; starting empty");
            MemorySchemaStore::new()
        };
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn inner(&self) -> &MemorySchemaStore {
        &self.inner
    }

    /// Seed an object without validation and persist it.
    pub fn insert(&mut self, draft: SchemaDraft) -> anyhow::Result<SchemaObject> {
        let object = self.inner.insert(draft);
        self.flush()?;
        Ok(object)
    }

    pub fn flush(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.inner).context("serialize store")?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl SchemaStore for FileSchemaStore {
    fn find_by_handle(
        &self,
        kind: ObjectKind,
        handle: &str,
    ) -> anyhow::Result<Option<SchemaObject>> {
        self.inner.find_by_handle(kind, handle)
    }

    fn find_by_uid(&self, kind: ObjectKind, uid: &str) -> anyhow::Result<Option<SchemaObject>> {
        self.inner.find_by_uid(kind, uid)
    }

    fn find_by_id(&self, kind: ObjectKind, id: u64) -> anyhow::Result<Option<SchemaObject>> {
        self.inner.find_by_id(kind, id)
    }

    fn list(&self, kind: ObjectKind) -> anyhow::Result<Vec<SchemaObject>> {
        self.inner.list(kind)
    }

    fn assemble_field_layout(
        &self,
        tabs: &[(String, Vec<String>)],
        required: &[String],
    ) -> anyhow::Result<FieldLayout> {
        self.inner.assemble_field_layout(tabs, required)
    }

    fn save(&mut self, draft: SchemaDraft) -> anyhow::Result<SaveOutcome> {
        let outcome = self.inner.save(draft)?;
        if outcome.object.is_some() {
            self.flush()?;
        }
        Ok(outcome)
    }

    fn entry_types(&self, section_uid: &str) -> anyhow::Result<Vec<SchemaObject>> {
        self.inner.entry_types(section_uid)
    }

    fn delete_entry_type(&mut self, uid: &str) -> anyhow::Result<()> {
        self.inner.delete_entry_type(uid)?;
        self.flush()
    }
}

/// Restore points as copies of the store file in a backups directory.
#[derive(Debug, Clone)]
pub struct FsBackupPort {
    pub source: Utf8PathBuf,
    pub dir: Utf8PathBuf,
}

impl FsBackupPort {
    pub fn new(source: impl Into<Utf8PathBuf>, dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            source: source.into(),
            dir: dir.into(),
        }
    }
}

impl BackupPort for FsBackupPort {
    fn snapshot(&self) -> anyhow::Result<RestorePoint> {
        fs::create_dir_all(&self.dir)?;
        // A store that was never written is backed up as an empty store.
        let bytes = if self.source.exists() {
            fs::read(&self.source)?
        } else {
            b"{}".to_vec()
        };

        let created_at = Utc::now();
        let name = format!(
            "architect-{}-{}.json",
            created_at.format("%Y%m%d%H%M%S"),
            Uuid::new_v4().simple()
        );
        let location = self.dir.join(name);
        fs::write(&location, &bytes)?;
        debug!(location = %location, "restore point written");

        Ok(RestorePoint {
            location: location.to_string(),
            sha256: Some(sha256_hex(&bytes)),
            created_at,
        })
    }

    fn discard(&self, point: &RestorePoint) -> anyhow::Result<()> {
        fs::remove_file(&point.location)
            .with_context(|| format!("remove restore point {}", point.location))
    }
}

/// In-memory restore points for embedding and testing.
#[derive(Debug, Default)]
pub struct InMemoryBackupPort {
    taken: Mutex<Vec<RestorePoint>>,
    discarded: Mutex<Vec<String>>,
}

impl InMemoryBackupPort {
    pub fn taken(&self) -> Vec<RestorePoint> {
        self.taken.lock().map(|t| t.clone()).unwrap_or_default()
    }

    pub fn discarded(&self) -> Vec<String> {
        self.discarded.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

impl BackupPort for InMemoryBackupPort {
    fn snapshot(&self) -> anyhow::Result<RestorePoint> {
        let mut taken = self
            .taken
            .lock()
            .map_err(|_| anyhow::anyhow!("backup registry poisoned"))?;
        let point = RestorePoint {
            location: format!("memory://restore-point/{}", taken.len() + 1),
            sha256: None,
            created_at: Utc::now(),
        };
        taken.push(point.clone());
        Ok(point)
    }

    fn discard(&self, point: &RestorePoint) -> anyhow::Result<()> {
        self.discarded
            .lock()
            .map_err(|_| anyhow::anyhow!("backup registry poisoned"))?
            .push(point.location.clone());
        Ok(())
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}
