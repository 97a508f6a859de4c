//! Sort clauses for ordering entries by a field's value.

use std::fmt;

use reflectfield_core::FieldId;

/// Direction of a value sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("ASC"),
            Self::Desc => f.write_str("DESC"),
        }
    }
}

/// How entries are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortClause {
    /// Random order.
    Random,
    /// By the stored `value` of a field.
    ByValue {
        /// The field whose value orders entries.
        field_id: FieldId,
        /// Sort direction.
        direction: SortDirection,
    },
}

impl SortClause {
    /// Build a clause from a host-supplied order string.
    ///
    /// `random` and `rand` (any case) order randomly; `desc` sorts descending;
    /// anything else sorts ascending.
    #[must_use]
    pub fn from_order(field_id: FieldId, order: &str) -> Self {
        let order = order.trim();
        if order.eq_ignore_ascii_case("random") || order.eq_ignore_ascii_case("rand") {
            return Self::Random;
        }
        let direction = if order.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            if !order.eq_ignore_ascii_case("asc") {
                tracing::debug!(field = %field_id, order, "unknown sort order, using ascending");
            }
            SortDirection::Asc
        };
        Self::ByValue { field_id, direction }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> FieldId {
        FieldId::new(3).unwrap()
    }

    #[test]
    fn test_should_detect_random_order() {
        assert_eq!(SortClause::from_order(field(), "random"), SortClause::Random);
        assert_eq!(SortClause::from_order(field(), "RAND"), SortClause::Random);
    }

    #[test]
    fn test_should_parse_direction() {
        assert_eq!(
            SortClause::from_order(field(), "desc"),
            SortClause::ByValue {
                field_id: field(),
                direction: SortDirection::Desc
            }
        );
        assert_eq!(
            SortClause::from_order(field(), "ASC"),
            SortClause::ByValue {
                field_id: field(),
                direction: SortDirection::Asc
            }
        );
    }

    #[test]
    fn test_should_default_unknown_order_to_ascending() {
        assert_eq!(
            SortClause::from_order(field(), "sideways; DROP TABLE x"),
            SortClause::ByValue {
                field_id: field(),
                direction: SortDirection::Asc
            }
        );
    }
}
