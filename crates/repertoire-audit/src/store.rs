//! Append-only audit stores.

use crate::error::{AuditError, Result};
use crate::record::{Actor, AuditRecord, sort_records};
use parking_lot::{Mutex, RwLock};
use repertoire_core::{AuditRecordType, PackageName};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// Persistence target for audit records.
///
/// Stores only ever append; there is no update or delete.
pub trait AuditStore: Send + Sync {
    /// Persist one record.
    ///
    /// # Errors
    /// Returns error if the record cannot be written or its id already exists.
    fn append(&self, record: &AuditRecord) -> Result<()>;

    /// Every record, in creation order.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    fn records(&self) -> Result<Vec<AuditRecord>>;

    /// Highest sequence id stored.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    fn last_sequence(&self) -> Result<Option<u64>> {
        Ok(self.records()?.iter().map(AuditRecord::id).max())
    }

    /// Records performed by `actor`, in creation order.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    fn records_for_actor(&self, actor: &Actor) -> Result<Vec<AuditRecord>> {
        Ok(filtered(self.records()?, |r| r.actor().is_same(actor)))
    }

    /// Records concerning `package`, in creation order.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    fn records_for_package(&self, package: &PackageName) -> Result<Vec<AuditRecord>> {
        Ok(filtered(self.records()?, |r| r.package() == Some(package)))
    }

    /// Records of one type, in creation order.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    fn records_of_kind(&self, kind: AuditRecordType) -> Result<Vec<AuditRecord>> {
        Ok(filtered(self.records()?, |r| r.kind() == kind))
    }
}

fn filtered(records: Vec<AuditRecord>, keep: impl Fn(&AuditRecord) -> bool) -> Vec<AuditRecord> {
    let mut records: Vec<_> = records.into_iter().filter(|r| keep(r)).collect();
    sort_records(&mut records);
    records
}

impl<S: AuditStore + ?Sized> AuditStore for Arc<S> {
    fn append(&self, record: &AuditRecord) -> Result<()> {
        (**self).append(record)
    }

    fn records(&self) -> Result<Vec<AuditRecord>> {
        (**self).records()
    }

    fn last_sequence(&self) -> Result<Option<u64>> {
        (**self).last_sequence()
    }
}

impl<S: AuditStore + ?Sized> AuditStore for Box<S> {
    fn append(&self, record: &AuditRecord) -> Result<()> {
        (**self).append(record)
    }

    fn records(&self) -> Result<Vec<AuditRecord>> {
        (**self).records()
    }

    fn last_sequence(&self) -> Result<Option<u64>> {
        (**self).last_sequence()
    }
}

/// Audit store kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    records: RwLock<Vec<AuditRecord>>,
}

impl MemoryAuditStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl AuditStore for MemoryAuditStore {
    fn append(&self, record: &AuditRecord) -> Result<()> {
        let mut records = self.records.write();
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(AuditError::DuplicateId(record.id()));
        }
        records.push(record.clone());
        Ok(())
    }

    fn records(&self) -> Result<Vec<AuditRecord>> {
        let mut records = self.records.read().clone();
        sort_records(&mut records);
        Ok(records)
    }

    fn last_sequence(&self) -> Result<Option<u64>> {
        Ok(self.records.read().iter().map(AuditRecord::id).max())
    }
}

/// Audit store writing one JSON document per line to an append-only file.
#[derive(Debug)]
pub struct JsonLinesAuditStore {
    path: PathBuf,
    write_lock: Mutex<Option<u64>>,
}

impl JsonLinesAuditStore {
    /// Store backed by `path`; the file and its parent directory are created
    /// on first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(None),
        }
    }

    /// Log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<AuditRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                sonic_rs::from_str(line).map_err(|e| AuditError::Corrupt {
                    line: i + 1,
                    message: e.to_string(),
                })
            })
            .collect()
    }
}

impl AuditStore for JsonLinesAuditStore {
    fn append(&self, record: &AuditRecord) -> Result<()> {
        let mut last = self.write_lock.lock();
        if last.is_none() {
            *last = self.read_all()?.iter().map(AuditRecord::id).max();
        }
        if last.is_some_and(|id| record.id() <= id) {
            return Err(AuditError::DuplicateId(record.id()));
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let line = record.to_json_line()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;

        *last = Some(record.id());
        trace!(id = record.id(), path = %self.path.display(), "audit record written");
        Ok(())
    }

    fn records(&self) -> Result<Vec<AuditRecord>> {
        let mut records = self.read_all()?;
        sort_records(&mut records);
        debug!(count = records.len(), path = %self.path.display(), "audit log read");
        Ok(records)
    }
}
