//! Filtering and sorting integration tests.

#[cfg(test)]
mod tests {
    use reflectfield_core::ReflectFieldConfig;
    use reflectfield_engine::{QueryParts, ReflectionField, SqlRenderer};

    use crate::field;

    fn apply(parts: &mut QueryParts, field: &ReflectionField, tokens: &[&str], and_operation: bool) -> bool {
        let outcome = field.build_filter(tokens, and_operation, &mut parts.counter);
        match outcome.into_fragment() {
            Some(fragment) => {
                parts.append(fragment);
                true
            }
            None => false,
        }
    }

    #[test]
    fn test_should_accumulate_filters_across_fields() {
        let author = field(1, "author", "{entry/author}", "");
        let year = field(2, "year", "{entry/year}", "");
        let mut parts = QueryParts::new();

        assert!(apply(&mut parts, &author, &["ada-lovelace", "Mary Shelley"], false));
        assert!(apply(&mut parts, &year, &["equal to or more than 1826", "less than 1843"], true));

        let (joins, conditions) = SqlRenderer::default().render_parts(&parts);
        assert_eq!(
            joins,
            "LEFT JOIN `tbl_entries_data_1` AS t1_1 ON (e.id = t1_1.entry_id)\n\
             LEFT JOIN `tbl_entries_data_2` AS t2_2 ON (e.id = t2_2.entry_id)"
        );
        assert_eq!(
            conditions,
            "AND (t1_1.handle IN ('ada-lovelace', 'Mary Shelley') OR t1_1.value IN ('ada-lovelace', 'Mary Shelley'))\n\
             AND (t2_2.value >= 1826 AND t2_2.value < 1843)"
        );
    }

    #[test]
    fn test_should_render_every_filter_syntax() {
        let title = field(3, "title", "{entry/title}", "");
        let renderer = SqlRenderer::default();
        let mut parts = QueryParts::new();

        assert!(apply(&mut parts, &title, &["boolean: engine and analytical"], false));
        assert!(apply(&mut parts, &title, &["not-starts-with: the"], false));
        assert!(apply(&mut parts, &title, &["regexp: ^[A-Z]"], false));
        assert!(apply(&mut parts, &title, &["not-regexp: [[:space:]]"], false));

        let (_, conditions) = renderer.render_parts(&parts);
        let lines: Vec<&str> = conditions.lines().collect();
        assert_eq!(
            lines,
            vec![
                "AND MATCH (t3_1.value) AGAINST ('+engine+analytical' IN BOOLEAN MODE)",
                "AND NOT (t3_2.handle LIKE 'the%' OR t3_2.value LIKE 'the%')",
                "AND (t3_3.value REGEXP '^[A-Z]' OR t3_3.handle REGEXP '^[A-Z]')",
                "AND (t3_4.value NOT REGEXP '[[:space:]]' AND t3_4.handle NOT REGEXP '[[:space:]]')",
            ]
        );
    }

    #[test]
    fn test_should_not_consume_join_keys_for_skipped_filters() {
        let title = field(3, "title", "{entry/title}", "");
        let mut parts = QueryParts::new();

        assert!(!apply(&mut parts, &title, &["regexp:"], false));
        let empty: [&str; 0] = [];
        assert!(!apply(&mut parts, &title, &empty, true));
        assert!(parts.is_empty());
        assert_eq!(parts.counter.current(), 0);

        assert!(apply(&mut parts, &title, &["x"], true));
        assert_eq!(parts.joins[0].alias.key, 1);
    }

    #[test]
    fn test_should_escape_user_input() {
        let author = field(1, "author", "{entry/author}", "");
        let mut parts = QueryParts::new();
        assert!(apply(&mut parts, &author, &["O'Brien", "50%_off"], true));
        assert!(apply(&mut parts, &author, &["contains: 50%_off"], true));

        let (_, conditions) = SqlRenderer::default().render_parts(&parts);
        let lines: Vec<&str> = conditions.lines().collect();
        assert_eq!(lines[0], r"AND (t1_1.handle = 'O\'Brien' OR t1_1.value = 'O\'Brien')");
        assert_eq!(lines[1], "AND (t1_2.handle = '50%_off' OR t1_2.value = '50%_off')");
        assert_eq!(
            lines[2],
            r"AND (t1_3.handle LIKE '%50\\%\\_off%' OR t1_3.value LIKE '%50\\%\\_off%')"
        );
    }

    #[test]
    fn test_should_render_sort_clauses() {
        let title = field(3, "title", "{entry/title}", "");
        let config = ReflectFieldConfig {
            table_prefix: "sym_entries_data_".to_owned(),
            ..ReflectFieldConfig::default()
        };
        let renderer = SqlRenderer::from_config(&config);

        assert_eq!(renderer.render_sort(&title.build_sort("Random")), "ORDER BY RAND()");
        assert_eq!(
            renderer.render_sort(&title.build_sort("desc")),
            "ORDER BY (SELECT `ed`.value FROM `sym_entries_data_3` AS `ed` WHERE `ed`.entry_id = e.id) DESC"
        );
        assert_eq!(
            renderer.render_sort(&title.build_sort("anything'; DROP TABLE x")),
            "ORDER BY (SELECT `ed`.value FROM `sym_entries_data_3` AS `ed` WHERE `ed`.entry_id = e.id) ASC"
        );
    }
}
