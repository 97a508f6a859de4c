//! Persistence of compiled records.
//!
//! The engine hands each compiled record to a [`StorageWriter`]. Hosts back it
//! with their own tables; [`MemoryFieldStore`] keeps records in a concurrent
//! map keyed by `(field, entry)`.

use dashmap::DashMap;
use reflectfield_core::{CompiledRecord, EntryId, FieldId};

/// Sink for compiled records.
pub trait StorageWriter: Send + Sync {
    /// Store `record` as the data of `field_id` for `entry_id`, replacing any
    /// previous record.
    ///
    /// # Errors
    ///
    /// Any failure aborts the compile call that produced the record.
    fn write(&self, field_id: FieldId, entry_id: EntryId, record: &CompiledRecord) -> anyhow::Result<()>;
}

/// In-memory record store.
#[derive(Debug, Default)]
pub struct MemoryFieldStore {
    records: DashMap<(FieldId, EntryId), CompiledRecord>,
}

impl MemoryFieldStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The record stored for `field_id` and `entry_id`.
    #[must_use]
    pub fn get(&self, field_id: FieldId, entry_id: EntryId) -> Option<CompiledRecord> {
        self.records.get(&(field_id, entry_id)).map(|r| r.value().clone())
    }

    /// Every record of `field_id`, ordered by entry id.
    #[must_use]
    pub fn records_for(&self, field_id: FieldId) -> Vec<(EntryId, CompiledRecord)> {
        let mut records: Vec<(EntryId, CompiledRecord)> = self
            .records
            .iter()
            .filter(|r| r.key().0 == field_id)
            .map(|r| (r.key().1, r.value().clone()))
            .collect();
        records.sort_by_key(|(entry, _)| *entry);
        records
    }

    /// Remove the record for `field_id` and `entry_id`.
    pub fn remove(&self, field_id: FieldId, entry_id: EntryId) -> Option<CompiledRecord> {
        self.records.remove(&(field_id, entry_id)).map(|(_, record)| record)
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl StorageWriter for MemoryFieldStore {
    fn write(&self, field_id: FieldId, entry_id: EntryId, record: &CompiledRecord) -> anyhow::Result<()> {
        tracing::debug!(field = %field_id, entry = %entry_id, handle = ?record.handle, "stored record");
        self.records.insert((field_id, entry_id), record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: &str) -> CompiledRecord {
        CompiledRecord {
            handle: Some(value.to_lowercase()),
            value: value.to_owned(),
            value_formatted: value.to_owned(),
        }
    }

    fn ids(field: u32, entry: u32) -> (FieldId, EntryId) {
        (FieldId::new(field).unwrap(), EntryId::new(entry).unwrap())
    }

    #[test]
    fn test_should_write_and_read_back() {
        let store = MemoryFieldStore::new();
        let (field, entry) = ids(1, 10);
        store.write(field, entry, &record("A")).unwrap();
        assert_eq!(store.get(field, entry), Some(record("A")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_should_replace_existing_record() {
        let store = MemoryFieldStore::new();
        let (field, entry) = ids(1, 10);
        store.write(field, entry, &record("A")).unwrap();
        store.write(field, entry, &record("B")).unwrap();
        assert_eq!(store.get(field, entry).unwrap().value, "B");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_should_list_records_per_field_in_entry_order() {
        let store = MemoryFieldStore::new();
        let (f1, e3) = ids(1, 3);
        let (_, e1) = ids(1, 1);
        let (f2, _) = ids(2, 1);
        store.write(f1, e3, &record("three")).unwrap();
        store.write(f1, e1, &record("one")).unwrap();
        store.write(f2, e1, &record("other")).unwrap();

        let records = store.records_for(f1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, e1);
        assert_eq!(records[1].1.value, "three");
    }

    #[test]
    fn test_should_remove_records() {
        let store = MemoryFieldStore::new();
        let (field, entry) = ids(4, 4);
        store.write(field, entry, &record("x")).unwrap();
        assert!(store.remove(field, entry).is_some());
        assert!(store.is_empty());
        assert!(store.get(field, entry).is_none());
    }
}
