//! SQL rendering of query fragments for a MySQL-dialect backend.
//!
//! Every literal passes through [`escape_literal`]; LIKE pattern text passes
//! through [`escape_like`] first.

use reflectfield_core::{FieldId, ReflectFieldConfig};

use super::ast::{Join, Literal, MatchKind, Predicate, PredicateFragment, QueryParts};
use crate::sort::SortClause;

/// Escape a string for use inside a single-quoted SQL literal.
#[must_use]
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\x1a' => out.push_str("\\Z"),
            c => out.push(c),
        }
    }
    out
}

/// Escape LIKE wildcards so `value` matches literally.
#[must_use]
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn quote(value: &str) -> String {
    format!("'{}'", escape_literal(value))
}

#[allow(clippy::float_cmp)]
fn render_number(n: f64) -> String {
    if n == 0.0 { "0".to_owned() } else { format!("{n}") }
}

/// Renders joins, where clauses and sort clauses.
#[derive(Debug, Clone)]
pub struct SqlRenderer {
    table_prefix: String,
    entry_alias: String,
}

impl Default for SqlRenderer {
    fn default() -> Self {
        Self::from_config(&ReflectFieldConfig::default())
    }
}

impl SqlRenderer {
    /// A renderer using the given data table prefix and entries alias.
    #[must_use]
    pub fn new(table_prefix: impl Into<String>, entry_alias: impl Into<String>) -> Self {
        Self {
            table_prefix: table_prefix.into(),
            entry_alias: entry_alias.into(),
        }
    }

    /// A renderer configured from `config`.
    #[must_use]
    pub fn from_config(config: &ReflectFieldConfig) -> Self {
        Self::new(config.table_prefix.clone(), config.entry_alias.clone())
    }

    /// Name of a field's data table.
    #[must_use]
    pub fn table(&self, field_id: FieldId) -> String {
        format!("{}{}", self.table_prefix, field_id)
    }

    /// `LEFT JOIN ... ON (e.id = alias.entry_id)`
    #[must_use]
    pub fn render_join(&self, join: &Join) -> String {
        let alias = join.alias;
        format!(
            "LEFT JOIN `{}` AS {alias} ON ({}.id = {alias}.entry_id)",
            self.table(alias.field_id),
            self.entry_alias
        )
    }

    /// All joins, one per line.
    #[must_use]
    pub fn render_joins(&self, joins: &[Join]) -> String {
        joins
            .iter()
            .map(|join| self.render_join(join))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One predicate.
    #[must_use]
    pub fn render_predicate(&self, predicate: &Predicate) -> String {
        match predicate {
            Predicate::Compare { column, op, value } => {
                format!("{column} {} {}", op.as_str(), render_literal(value))
            }
            Predicate::InList { column, values } => {
                let list = values.iter().map(render_literal).collect::<Vec<_>>().join(", ");
                format!("{column} IN ({list})")
            }
            Predicate::Like { column, pattern } => {
                let text = escape_like(&pattern.text);
                let pattern = match pattern.kind {
                    MatchKind::StartsWith => format!("{text}%"),
                    MatchKind::EndsWith => format!("%{text}"),
                    MatchKind::Contains => format!("%{text}%"),
                };
                format!("{column} LIKE {}", quote(&pattern))
            }
            Predicate::FullText { column, query } => {
                format!("MATCH ({column}) AGAINST ({} IN BOOLEAN MODE)", quote(query))
            }
            Predicate::Regex {
                column,
                pattern,
                negated,
            } => {
                let op = if *negated { "NOT REGEXP" } else { "REGEXP" };
                format!("{column} {op} {}", quote(pattern))
            }
            Predicate::And(items) => self.render_group(items, "AND", "TRUE"),
            Predicate::Or(items) => self.render_group(items, "OR", "FALSE"),
            Predicate::Not(inner) => match inner.as_ref() {
                Predicate::And(_) | Predicate::Or(_) => format!("NOT {}", self.render_predicate(inner)),
                other => format!("NOT ({})", self.render_predicate(other)),
            },
        }
    }

    fn render_group(&self, items: &[Predicate], op: &str, empty: &str) -> String {
        if items.is_empty() {
            return empty.to_owned();
        }
        let parts: Vec<String> = items.iter().map(|p| self.render_predicate(p)).collect();
        format!("({})", parts.join(&format!(" {op} ")))
    }

    /// Conditions as `AND ...` clauses to append to an existing where clause.
    #[must_use]
    pub fn render_where(&self, conditions: &[Predicate]) -> String {
        conditions
            .iter()
            .map(|c| format!("AND {}", self.render_predicate(c)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Joins and where clause of one fragment.
    #[must_use]
    pub fn render_fragment(&self, fragment: &PredicateFragment) -> (String, String) {
        let rendered = (self.render_joins(&fragment.joins), self.render_where(&fragment.conditions));
        tracing::trace!(joins = %rendered.0, conditions = %rendered.1, "rendered fragment");
        rendered
    }

    /// Joins and where clause of an accumulated query.
    #[must_use]
    pub fn render_parts(&self, parts: &QueryParts) -> (String, String) {
        (self.render_joins(&parts.joins), self.render_where(&parts.conditions))
    }

    /// `ORDER BY ...`
    #[must_use]
    pub fn render_sort(&self, sort: &SortClause) -> String {
        match sort {
            SortClause::Random => "ORDER BY RAND()".to_owned(),
            SortClause::ByValue { field_id, direction } => format!(
                "ORDER BY (SELECT `ed`.value FROM `{}` AS `ed` WHERE `ed`.entry_id = {}.id) {direction}",
                self.table(*field_id),
                self.entry_alias
            ),
        }
    }
}

fn render_literal(literal: &Literal) -> String {
    match literal {
        Literal::Text(text) => quote(text),
        Literal::Number(n) => render_number(*n),
    }
}
