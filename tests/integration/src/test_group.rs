//! Grouping integration tests.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use reflectfield_core::CompileSession;
    use reflectfield_engine::{EntryRecord, MemoryFieldStore, ReflectionField};
    use reflectfield_xml::{OutputElement, write_elements};

    use crate::{BOOKS, entry_id, field, library_source};

    /// Compile `fields` for every book and collect the stored data per entry.
    fn compiled_entries(fields: &[&ReflectionField]) -> Vec<EntryRecord> {
        let session = CompileSession::new();
        let source = library_source();
        let store = MemoryFieldStore::new();
        for field in fields {
            for (id, ..) in BOOKS {
                field.compile(&session, entry_id(id), &source, &store).unwrap();
            }
        }

        BOOKS
            .iter()
            .map(|&(id, ..)| EntryRecord {
                id: Some(entry_id(id)),
                data: fields
                    .iter()
                    .filter_map(|field| store.get(field.id(), entry_id(id)).map(|r| (field.id(), r)))
                    .collect::<HashMap<_, _>>(),
            })
            .collect()
    }

    #[test]
    fn test_should_group_entries_by_author() {
        let author = field(1, "author", "{entry/author}", "");
        let title = field(2, "title", "{entry/title}", "");
        let entries = compiled_entries(&[&author, &title]);

        let groups = author.group_records(&entries).unwrap();
        assert_eq!(groups.element(), "author");
        assert_eq!(groups.len(), 2);

        let ada = groups.get("ada-lovelace").unwrap();
        assert_eq!(ada.attributes.value, "Ada Lovelace");
        let titles: Vec<&str> = ada
            .records
            .iter()
            .map(|entry| entry.data[&title.id()].value.as_str())
            .collect();
        assert_eq!(
            titles,
            vec!["Notes on the Analytical Engine", "Sketch of the Analytical Engine"]
        );
    }

    #[test]
    fn test_should_render_group_headers_in_first_seen_order() {
        let genre = field(3, "genre", "{entry/genre}", "uppercase");
        let entries = compiled_entries(&[&genre]);

        let groups = genre.group_records(&entries).unwrap();
        let headers: Vec<OutputElement> = groups
            .iter()
            .map(|group| OutputElement {
                name: groups.element().to_owned(),
                handle: Some(group.attributes.handle.clone()),
                value: group.attributes.value.clone(),
            })
            .collect();

        assert_eq!(
            write_elements(&headers).unwrap(),
            r#"<genre handle="computing">COMPUTING</genre><genre handle="fiction">FICTION</genre>"#
        );
        assert!(groups.iter().all(|group| group.records.len() == 2));
    }

    #[test]
    fn test_should_bucket_entries_without_handles_together() {
        let missing = field(4, "missing", "{entry/subtitle}", "");
        let entries = compiled_entries(&[&missing]);

        let groups = missing.group_records(&entries).unwrap();
        assert_eq!(groups.len(), 1);
        let group = groups.get("").unwrap();
        assert_eq!(group.records.len(), BOOKS.len());
        assert_eq!(group.attributes.value, "");
    }

    #[test]
    fn test_should_not_group_empty_input() {
        let author = field(1, "author", "{entry/author}", "");
        let none: Vec<EntryRecord> = Vec::new();
        assert!(author.group_records(&none).is_none());
    }
}
