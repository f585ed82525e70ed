use crate::error::{ComplaintError, Result};
use crate::schema::{Complaint, Snapshot, StaffUpdate};

/// The document store holding complaints under opaque, store-generated keys.
///
/// Implementations make no transactional promise across calls.
pub trait ComplaintStore {
    /// Every stored record. An empty store yields an empty snapshot.
    fn get_all(&self) -> Result<Snapshot>;

    /// Stores a new record and returns the key the store assigned to it.
    fn append(&mut self, record: &Complaint) -> Result<String>;

    /// Overwrites the staff-owned fields of the record at `key`, leaving
    /// every other field as stored.
    fn update_fields(&mut self, key: &str, fields: &StaffUpdate) -> Result<()>;
}

/// In-process store used by tests and dry runs.
///
/// Records every update it applies, and can be told to fail reads or to fail
/// updates after a number of successes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Snapshot,
    next_key: u64,
    pub applied: Vec<(String, StaffUpdate)>,
    pub fail_reads: bool,
    pub fail_updates_after: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a record under a caller-chosen key.
    pub fn insert(&mut self, key: impl Into<String>, record: Complaint) {
        self.records.insert(key.into(), record);
    }

    pub fn get(&self, key: &str) -> Option<&Complaint> {
        self.records.get(key)
    }
}

impl ComplaintStore for MemoryStore {
    fn get_all(&self) -> Result<Snapshot> {
        if self.fail_reads {
            return Err(ComplaintError::Store("read refused".to_string()));
        }
        Ok(self.records.clone())
    }

    fn append(&mut self, record: &Complaint) -> Result<String> {
        // Zero-padded so key order follows insertion order.
        let key = format!("mem-{:08}", self.next_key);
        self.next_key += 1;
        self.records.insert(key.clone(), record.clone());
        Ok(key)
    }

    fn update_fields(&mut self, key: &str, fields: &StaffUpdate) -> Result<()> {
        if self
            .fail_updates_after
            .is_some_and(|limit| self.applied.len() >= limit)
        {
            return Err(ComplaintError::Store("write refused".to_string()));
        }
        let record = self
            .records
            .get_mut(key)
            .ok_or_else(|| ComplaintError::NotFound(key.to_string()))?;
        record.attended_at = fields.attended_at.clone();
        record.status = fields.status.clone();
        record.report = fields.report.clone();
        self.applied.push((key.to_string(), fields.clone()));
        Ok(())
    }
}
