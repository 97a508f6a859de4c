//! Structured query fragments produced by the filter compiler.
//!
//! Fragments never carry pre-rendered SQL: literals stay typed until the
//! [`SqlRenderer`](super::sql::SqlRenderer) escapes them in one place.

use std::fmt;

use reflectfield_core::FieldId;

/// Columns of a field's data table that filters address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// The slug column.
    Handle,
    /// The raw value column.
    Value,
}

impl Column {
    /// Column name in the data table.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Handle => "handle",
            Self::Value => "value",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alias of one join of a field's data table, rendered `t{field}_{key}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JoinAlias {
    /// The field whose data table is joined.
    pub field_id: FieldId,
    /// Sequence number from the [`JoinCounter`].
    pub key: u32,
}

impl JoinAlias {
    /// Reference a column through this alias.
    #[must_use]
    pub fn column(self, column: Column) -> ColumnRef {
        ColumnRef { alias: self, column }
    }
}

impl fmt::Display for JoinAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}_{}", self.field_id, self.key)
    }
}

/// A column read through a join alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// The join the column belongs to.
    pub alias: JoinAlias,
    /// The column.
    pub column: Column,
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.alias, self.column)
    }
}

/// A left join of a field's data table onto the entries table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Join {
    /// Alias of the joined table.
    pub alias: JoinAlias,
}

/// A typed literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// A string, quoted and escaped when rendered.
    Text(String),
    /// A number, rendered bare.
    Number(f64),
}

impl Literal {
    /// A text literal.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

/// Comparison operators used in predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `=`
    Eq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl Comparison {
    /// Operator symbol.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// The inclusive form of a strict comparison; `=` is unchanged.
    #[must_use]
    pub fn or_equal(self) -> Self {
        match self {
            Self::Lt => Self::Le,
            Self::Gt => Self::Ge,
            other => other,
        }
    }
}

/// Wildcard placement of a LIKE pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// `text%`
    StartsWith,
    /// `%text`
    EndsWith,
    /// `%text%`
    Contains,
}

impl MatchKind {
    /// Look up a match kind by its filter prefix name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "starts-with" => Some(Self::StartsWith),
            "ends-with" => Some(Self::EndsWith),
            "contains" => Some(Self::Contains),
            _ => None,
        }
    }
}

/// A LIKE pattern whose text is matched literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikePattern {
    /// Where the wildcards go.
    pub kind: MatchKind,
    /// Literal text; wildcard characters in it are escaped when rendered.
    pub text: String,
}

/// A where-clause predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column op literal`
    Compare {
        /// Compared column.
        column: ColumnRef,
        /// Operator.
        op: Comparison,
        /// Right-hand side.
        value: Literal,
    },
    /// `column IN (values...)`
    InList {
        /// Tested column.
        column: ColumnRef,
        /// Candidate values.
        values: Vec<Literal>,
    },
    /// `column LIKE pattern`
    Like {
        /// Tested column.
        column: ColumnRef,
        /// Pattern.
        pattern: LikePattern,
    },
    /// Full-text match in boolean mode.
    FullText {
        /// Indexed column.
        column: ColumnRef,
        /// Boolean-mode query (`+term -term`).
        query: String,
    },
    /// `column [NOT] REGEXP pattern`
    Regex {
        /// Tested column.
        column: ColumnRef,
        /// Regular expression.
        pattern: String,
        /// Whether the match is inverted.
        negated: bool,
    },
    /// All of the predicates hold.
    And(Vec<Predicate>),
    /// Any of the predicates holds.
    Or(Vec<Predicate>),
    /// The predicate does not hold.
    Not(Box<Predicate>),
}

impl Predicate {
    /// Wrap in `Not` when `negate` is set.
    #[must_use]
    pub fn negate_if(self, negate: bool) -> Self {
        if negate { Self::Not(Box::new(self)) } else { self }
    }
}

/// Joins and conditions contributed by one filter.
///
/// Conditions are combined with `AND` into the enclosing where clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateFragment {
    /// Joins the conditions read through.
    pub joins: Vec<Join>,
    /// Conditions to AND into the query.
    pub conditions: Vec<Predicate>,
}

/// Monotonic source of join keys for one query-building session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinCounter(u32);

impl JoinCounter {
    /// A counter that has handed out no keys.
    #[must_use]
    pub fn new() -> Self {
        Self(0)
    }

    /// Advance and return a fresh alias for `field_id`.
    pub fn next_alias(&mut self, field_id: FieldId) -> JoinAlias {
        self.0 += 1;
        JoinAlias {
            field_id,
            key: self.0,
        }
    }

    /// Number of keys handed out so far.
    #[must_use]
    pub fn current(self) -> u32 {
        self.0
    }
}

/// Caller-held accumulator for a query built from several filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParts {
    /// All joins, in the order filters added them.
    pub joins: Vec<Join>,
    /// All conditions, ANDed together.
    pub conditions: Vec<Predicate>,
    /// Join keys shared by every filter of the query.
    pub counter: JoinCounter,
}

impl QueryParts {
    /// An empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment's joins and conditions.
    pub fn append(&mut self, fragment: PredicateFragment) {
        self.joins.extend(fragment.joins);
        self.conditions.extend(fragment.conditions);
    }

    /// Whether no filter contributed anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.joins.is_empty() && self.conditions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(id: u32) -> FieldId {
        FieldId::new(id).unwrap()
    }

    #[test]
    fn test_should_hand_out_increasing_aliases() {
        let mut counter = JoinCounter::new();
        let a = counter.next_alias(field(4));
        let b = counter.next_alias(field(9));
        assert_eq!(a.to_string(), "t4_1");
        assert_eq!(b.to_string(), "t9_2");
        assert_eq!(counter.current(), 2);
    }

    #[test]
    fn test_should_display_column_refs() {
        let alias = JoinAlias {
            field_id: field(12),
            key: 3,
        };
        assert_eq!(alias.column(Column::Handle).to_string(), "t12_3.handle");
        assert_eq!(alias.column(Column::Value).to_string(), "t12_3.value");
    }

    #[test]
    fn test_should_widen_strict_comparisons() {
        assert_eq!(Comparison::Gt.or_equal(), Comparison::Ge);
        assert_eq!(Comparison::Lt.or_equal(), Comparison::Le);
        assert_eq!(Comparison::Eq.or_equal(), Comparison::Eq);
    }

    #[test]
    fn test_should_accumulate_fragments() {
        let mut parts = QueryParts::new();
        assert!(parts.is_empty());
        let alias = parts.counter.next_alias(field(1));
        parts.append(PredicateFragment {
            joins: vec![Join { alias }],
            conditions: vec![Predicate::Compare {
                column: alias.column(Column::Value),
                op: Comparison::Eq,
                value: Literal::text("x"),
            }],
        });
        assert_eq!(parts.joins.len(), 1);
        assert_eq!(parts.conditions.len(), 1);
        assert!(!parts.is_empty());
    }

    #[test]
    fn test_should_negate_conditionally() {
        let p = Predicate::And(vec![]);
        assert_eq!(p.clone().negate_if(false), p);
        assert!(matches!(p.negate_if(true), Predicate::Not(_)));
    }
}
