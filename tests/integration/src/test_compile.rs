//! Compilation, storage and output integration tests.

#[cfg(test)]
mod tests {
    use reflectfield_core::{CompileSession, CompiledRecord, ExportMode};
    use reflectfield_engine::{DocumentRequest, FieldError, MemoryFieldStore, ReflectionField};
    use reflectfield_xml::{Document, OutputElement, TreeEvaluator, write_elements};

    use crate::{BOOKS, entry_id, field, library_source};

    #[test]
    fn test_should_compile_every_entry_into_the_store() {
        let field = field(1, "summary", "{entry/title} ({entry/year})", "");
        let session = CompileSession::new();
        let source = library_source();
        let store = MemoryFieldStore::new();

        for (id, ..) in BOOKS {
            field.compile(&session, entry_id(id), &source, &store).unwrap();
        }

        let records = store.records_for(field.id());
        assert_eq!(records.len(), BOOKS.len());
        assert_eq!(records[1].1.value, "Frankenstein (1818)");
        assert_eq!(records[1].1.handle.as_deref(), Some("frankenstein-1818"));
        assert!(session.is_empty());
    }

    #[test]
    fn test_should_resolve_params_and_sanitize_value() {
        let field = field(2, "label", "{/data/params/site-name}: {entry/title}", "none");
        let record = field
            .compile(&CompileSession::new(), entry_id(2), &library_source(), &MemoryFieldStore::new())
            .unwrap();

        assert_eq!(record.value, "Library & Archive: Frankenstein");
        assert_eq!(record.value_formatted, "Library &amp; Archive: Frankenstein");
        assert_eq!(record.handle.as_deref(), Some("library-archive-frankenstein"));
    }

    #[test]
    fn test_should_apply_named_formatter() {
        let field = field(3, "label", "{/data/params/site-name}", "uppercase");
        let record = field
            .compile(&CompileSession::new(), entry_id(1), &library_source(), &MemoryFieldStore::new())
            .unwrap();

        assert_eq!(record.value, "Library & Archive");
        assert_eq!(record.value_formatted, "LIBRARY &amp; ARCHIVE");
    }

    #[test]
    fn test_should_treat_broken_paths_as_empty() {
        let field = field(4, "label", "{entry/title}{entry/[}{entry/missing}!", "");
        let record = field
            .compile(&CompileSession::new(), entry_id(4), &library_source(), &MemoryFieldStore::new())
            .unwrap();

        assert_eq!(record.value, "The Last Man!");
    }

    #[test]
    fn test_should_compile_unknown_entries_against_empty_document() {
        let field = field(5, "label", "{entry/title}", "");
        let record = field
            .compile(&CompileSession::new(), entry_id(99), &library_source(), &MemoryFieldStore::new())
            .unwrap();

        assert_eq!(record, CompiledRecord::default());
    }

    #[test]
    fn test_should_report_unknown_formatter() {
        let field = field(6, "label", "{entry/title}", "markdown");
        let session = CompileSession::new();
        let err = field
            .compile(&session, entry_id(1), &library_source(), &MemoryFieldStore::new())
            .unwrap_err();

        assert!(matches!(err, FieldError::UnknownFormatter { .. }));
        assert!(!session.is_compiling(field.id()));
    }

    #[test]
    fn test_should_not_embed_own_output_while_compiling() {
        let inner = field(7, "summary", "{entry/title}", "");
        let session = CompileSession::new();
        let previous = CompiledRecord {
            handle: Some("stale".to_owned()),
            value: "Stale".to_owned(),
            value_formatted: "Stale".to_owned(),
        };

        // The source builds the entry document the way a host would, asking
        // the field for its current output element.
        let source = |req: &DocumentRequest<'_>| -> anyhow::Result<Box<dyn TreeEvaluator>> {
            let own = inner
                .append_formatted_element(req.session, &previous)
                .map(|element| element.to_xml())
                .transpose()?
                .unwrap_or_default();
            let xml = format!("<data><entry id=\"{}\"><title>Fresh</title>{own}</entry></data>", req.entry_id);
            Ok(Box::new(Document::parse(&xml)?))
        };

        let record = inner
            .compile(&session, entry_id(1), &source, &MemoryFieldStore::new())
            .unwrap();
        assert_eq!(record.value, "Fresh");

        let element = inner.append_formatted_element(&session, &record).unwrap();
        assert_eq!(element.to_xml().unwrap(), r#"<summary handle="fresh">Fresh</summary>"#);
    }

    #[test]
    fn test_should_emit_output_elements_for_page() {
        let title = field(8, "title", "{entry/title}", "");
        let session = CompileSession::new();
        let source = library_source();
        let store = MemoryFieldStore::new();

        let elements: Vec<OutputElement> = [2, 4]
            .into_iter()
            .map(|id| title.compile(&session, entry_id(id), &source, &store).unwrap())
            .filter_map(|record| title.append_formatted_element(&session, &record))
            .collect();

        assert_eq!(
            write_elements(&elements).unwrap(),
            r#"<title handle="frankenstein">Frankenstein</title><title handle="the-last-man">The Last Man</title>"#
        );
    }

    #[test]
    fn test_should_export_value_and_formatted_value() {
        let field = field(9, "label", "{/data/params/site-name}", "emphasis");
        let record = field
            .compile(&CompileSession::new(), entry_id(1), &library_source(), &MemoryFieldStore::new())
            .unwrap();

        let modes: Vec<ExportMode> = ReflectionField::export_modes()
            .iter()
            .map(|name| name.parse().unwrap())
            .collect();
        assert_eq!(field.prepare_export_value(&record, modes[0]), "Library & Archive");
        assert_eq!(
            field.prepare_export_value(&record, modes[1]),
            "<em>Library &amp; Archive</em>"
        );
    }

    #[test]
    fn test_should_round_trip_records_through_json() {
        let field = field(10, "label", "{entry/author}", "");
        let record = field
            .compile(&CompileSession::new(), entry_id(3), &library_source(), &MemoryFieldStore::new())
            .unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["handle"], "ada-lovelace");
        let back: CompiledRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
