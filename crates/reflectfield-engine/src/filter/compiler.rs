//! Filter predicate compilation.
//!
//! Each syntax has its own handler. Handlers that produce a constraint take
//! exactly one join key per join from the caller's [`JoinCounter`]; handlers
//! that skip take none.

use std::sync::LazyLock;

use regex::Regex;
use reflectfield_core::FieldId;

use super::ast::{Column, Comparison, Join, JoinCounter, LikePattern, Literal, MatchKind, Predicate, PredicateFragment};
use super::classify::{FilterKind, NUMERIC_PHRASE, classify};

static LEADING_NOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^not\W").expect("valid regex"));

static INNER_AND: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\W)and(\W)").expect("valid regex"));

static EDGE_AND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(^)and(\W)|(\W)and($)").expect("valid regex"));

static INNER_NOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\W)not(\W)").expect("valid regex"));

static EDGE_NOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(^)not(\W)|(\W)not($)").expect("valid regex"));

static SIGN_SPACING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*([+-])\s*").expect("valid regex"));

/// Result of compiling one filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// The filter constrains the query.
    Applied(PredicateFragment),
    /// The filter is empty and constrains nothing. This is not an error.
    Skip,
}

impl FilterOutcome {
    /// The fragment, if the filter applied.
    #[must_use]
    pub fn into_fragment(self) -> Option<PredicateFragment> {
        match self {
            Self::Applied(fragment) => Some(fragment),
            Self::Skip => None,
        }
    }
}

/// Compiles filters against one field's data table.
#[derive(Debug, Clone, Copy)]
pub struct FilterCompiler {
    field_id: FieldId,
}

impl FilterCompiler {
    /// A compiler for `field_id`.
    #[must_use]
    pub fn new(field_id: FieldId) -> Self {
        Self { field_id }
    }

    /// Compile `tokens` into a fragment.
    ///
    /// `and_operation` selects how numeric comparisons combine and which
    /// default syntax plain tokens use.
    #[must_use]
    pub fn compile<T: AsRef<str>>(
        &self,
        tokens: &[T],
        and_operation: bool,
        counter: &mut JoinCounter,
    ) -> FilterOutcome {
        if tokens.is_empty() {
            return FilterOutcome::Skip;
        }

        let kind = classify(tokens, and_operation);
        tracing::debug!(field = %self.field_id, kind = kind.name(), tokens = tokens.len(), "classified filter");

        match kind {
            FilterKind::Regex { pattern, negated } => self.regex(pattern, negated, counter),
            FilterKind::Boolean { query, negated } => self.boolean(&query, negated, counter),
            FilterKind::Pattern { kind, text, negated } => self.pattern(kind, text, negated, counter),
            FilterKind::Numeric => self.numeric(tokens, and_operation, counter),
            FilterKind::Conjunctive => self.conjunctive(tokens, counter),
            FilterKind::Disjunctive => self.disjunctive(tokens, counter),
        }
    }

    fn regex(&self, pattern: String, negated: bool, counter: &mut JoinCounter) -> FilterOutcome {
        if pattern.is_empty() {
            return FilterOutcome::Skip;
        }
        let alias = counter.next_alias(self.field_id);
        let clauses = [Column::Value, Column::Handle]
            .into_iter()
            .map(|column| Predicate::Regex {
                column: alias.column(column),
                pattern: pattern.clone(),
                negated,
            })
            .collect();
        // A negated match must fail on both columns.
        let condition = if negated {
            Predicate::And(clauses)
        } else {
            Predicate::Or(clauses)
        };
        applied(Join { alias }, vec![condition])
    }

    fn boolean(&self, query: &str, negated: bool, counter: &mut JoinCounter) -> FilterOutcome {
        let Some(query) = boolean_query(query) else {
            return FilterOutcome::Skip;
        };
        let alias = counter.next_alias(self.field_id);
        let condition = Predicate::FullText {
            column: alias.column(Column::Value),
            query,
        }
        .negate_if(negated);
        applied(Join { alias }, vec![condition])
    }

    fn pattern(&self, kind: MatchKind, text: String, negated: bool, counter: &mut JoinCounter) -> FilterOutcome {
        if text.is_empty() {
            return FilterOutcome::Skip;
        }
        let alias = counter.next_alias(self.field_id);
        let pattern = LikePattern { kind, text };
        let condition = Predicate::Or(vec![
            Predicate::Like {
                column: alias.column(Column::Handle),
                pattern: pattern.clone(),
            },
            Predicate::Like {
                column: alias.column(Column::Value),
                pattern,
            },
        ])
        .negate_if(negated);
        applied(Join { alias }, vec![condition])
    }

    fn numeric<T: AsRef<str>>(&self, tokens: &[T], and_operation: bool, counter: &mut JoinCounter) -> FilterOutcome {
        let comparisons: Vec<(Comparison, f64)> = tokens
            .iter()
            .filter_map(|token| {
                let parsed = numeric_comparison(token.as_ref());
                if parsed.is_none() {
                    tracing::debug!(field = %self.field_id, token = token.as_ref(), "skipping malformed numeric comparison");
                }
                parsed
            })
            .collect();
        if comparisons.is_empty() {
            return FilterOutcome::Skip;
        }

        let alias = counter.next_alias(self.field_id);
        let clauses = comparisons
            .into_iter()
            .map(|(op, number)| Predicate::Compare {
                column: alias.column(Column::Value),
                op,
                value: Literal::Number(number),
            })
            .collect();
        let condition = if and_operation {
            Predicate::And(clauses)
        } else {
            Predicate::Or(clauses)
        };
        applied(Join { alias }, vec![condition])
    }

    fn conjunctive<T: AsRef<str>>(&self, tokens: &[T], counter: &mut JoinCounter) -> FilterOutcome {
        let mut fragment = PredicateFragment::default();
        for token in tokens {
            let alias = counter.next_alias(self.field_id);
            fragment.joins.push(Join { alias });
            fragment.conditions.push(Predicate::Or(
                [Column::Handle, Column::Value]
                    .into_iter()
                    .map(|column| Predicate::Compare {
                        column: alias.column(column),
                        op: Comparison::Eq,
                        value: Literal::text(token.as_ref()),
                    })
                    .collect(),
            ));
        }
        FilterOutcome::Applied(fragment)
    }

    fn disjunctive<T: AsRef<str>>(&self, tokens: &[T], counter: &mut JoinCounter) -> FilterOutcome {
        let alias = counter.next_alias(self.field_id);
        let values: Vec<Literal> = tokens.iter().map(|t| Literal::text(t.as_ref())).collect();
        let condition = Predicate::Or(
            [Column::Handle, Column::Value]
                .into_iter()
                .map(|column| Predicate::InList {
                    column: alias.column(column),
                    values: values.clone(),
                })
                .collect(),
        );
        applied(Join { alias }, vec![condition])
    }
}

fn applied(join: Join, conditions: Vec<Predicate>) -> FilterOutcome {
    FilterOutcome::Applied(PredicateFragment {
        joins: vec![join],
        conditions,
    })
}

/// Rewrite natural-language connectors into a boolean-mode query.
///
/// `and` becomes `+`, `not` becomes `-`, a leading `not` makes the first
/// term excluded, and whitespace around signs is removed. Returns `None` when
/// no term remains.
#[must_use]
pub fn boolean_query(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let mode = if LEADING_NOT.is_match(raw) { '-' } else { '+' };

    let query = INNER_AND.replace_all(raw, "${1}+${2}");
    let query = EDGE_AND.replace_all(&query, "${2}${3}");
    let query = INNER_NOT.replace_all(&query, "${1}-${2}");
    let query = EDGE_NOT.replace_all(&query, "${2}${3}");
    let query = SIGN_SPACING
        .replace_all(&format!("{mode}{query}"), "${1}")
        .trim()
        .to_owned();

    if query.chars().all(|c| matches!(c, '+' | '-')) {
        return None;
    }
    Some(query)
}

/// Parse one numeric comparison phrase into an operator and operand.
#[must_use]
pub fn numeric_comparison(token: &str) -> Option<(Comparison, f64)> {
    let caps = NUMERIC_PHRASE.captures(token)?;
    let number: f64 = caps[3].parse().ok()?;
    let op = match caps[2].to_ascii_lowercase().as_str() {
        "more than" => Comparison::Gt,
        "less than" => Comparison::Lt,
        _ => Comparison::Eq,
    };
    let op = if caps.get(1).is_some() { op.or_equal() } else { op };
    Some((op, number))
}
