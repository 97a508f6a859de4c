//! Grouping of entries by a field's handle.

use std::collections::HashMap;

use reflectfield_core::{CompiledRecord, EntryId, FieldId};

/// A record that carries compiled data for one or more fields.
pub trait FieldRecord {
    /// The compiled data of `field_id`, if the record has any.
    fn field_data(&self, field_id: FieldId) -> Option<&CompiledRecord>;
}

/// An entry with its compiled field data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryRecord {
    /// The entry id, if the entry has been saved.
    pub id: Option<EntryId>,
    /// Compiled data per field.
    pub data: HashMap<FieldId, CompiledRecord>,
}

impl EntryRecord {
    /// An entry with a single field's data.
    #[must_use]
    pub fn with_field(id: EntryId, field_id: FieldId, record: CompiledRecord) -> Self {
        Self {
            id: Some(id),
            data: HashMap::from([(field_id, record)]),
        }
    }
}

impl FieldRecord for EntryRecord {
    fn field_data(&self, field_id: FieldId) -> Option<&CompiledRecord> {
        self.data.get(&field_id)
    }
}

/// Representative attributes of a group, taken from its first record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupAttributes {
    /// The shared handle.
    pub handle: String,
    /// The first record's formatted value.
    pub value: String,
}

/// One bucket of records sharing a handle.
#[derive(Debug)]
pub struct GroupEntry<'r, R> {
    /// Attributes of the first record seen.
    pub attributes: GroupAttributes,
    /// Members in input order.
    pub records: Vec<&'r R>,
}

/// Records bucketed by handle under the field's element name.
#[derive(Debug)]
pub struct RecordGroups<'r, R> {
    element: String,
    entries: Vec<GroupEntry<'r, R>>,
    index: HashMap<String, usize>,
}

impl<'r, R> RecordGroups<'r, R> {
    /// The element name the groups are keyed under.
    #[must_use]
    pub fn element(&self) -> &str {
        &self.element
    }

    /// The group for `handle`.
    #[must_use]
    pub fn get(&self, handle: &str) -> Option<&GroupEntry<'r, R>> {
        self.index.get(handle).map(|&i| &self.entries[i])
    }

    /// Groups in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = &GroupEntry<'r, R>> {
        self.entries.iter()
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take the groups in order of first appearance.
    #[must_use]
    pub fn into_entries(self) -> Vec<GroupEntry<'r, R>> {
        self.entries
    }
}

/// Bucket `records` by the handle `field_id` compiled to.
///
/// Returns `None` for an empty input. Records without data for the field, or
/// whose value produced no handle, share the group with the empty handle.
#[must_use]
pub fn group_records<'r, R: FieldRecord>(
    field_id: FieldId,
    element: &str,
    records: &'r [R],
) -> Option<RecordGroups<'r, R>> {
    if records.is_empty() {
        return None;
    }

    let mut groups = RecordGroups {
        element: element.to_owned(),
        entries: Vec::new(),
        index: HashMap::new(),
    };

    for record in records {
        let data = record.field_data(field_id);
        let handle = data.and_then(|d| d.handle.clone()).unwrap_or_default();
        let existing = groups.index.get(&handle).copied();
        let slot = match existing {
            Some(slot) => slot,
            None => {
                let slot = groups.entries.len();
                groups.entries.push(GroupEntry {
                    attributes: GroupAttributes {
                        handle: handle.clone(),
                        value: data.map(|d| d.value_formatted.clone()).unwrap_or_default(),
                    },
                    records: Vec::new(),
                });
                groups.index.insert(handle, slot);
                slot
            }
        };
        groups.entries[slot].records.push(record);
    }

    tracing::debug!(field = %field_id, records = records.len(), groups = groups.len(), "grouped records");
    Some(groups)
}
