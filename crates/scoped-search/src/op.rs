//! Comparison operators for compiled clauses.
//!
//! The [`Op`] enum covers every comparison a compiled search can emit.
//! Which operators apply to a field depends on its declared
//! [`ValueType`](crate::ValueType).

use std::cmp::Ordering;

/// Comparison operator for a compiled clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Equal (exact match).
    Eq,
    /// Not equal.
    Ne,
    /// String contains substring.
    Contains,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
}

/// Prefixes accepted in front of a field-qualified value, longest first.
const PREFIXES: [(&str, Op); 7] = [
    (">=", Op::Gte),
    ("<=", Op::Lte),
    ("<>", Op::Ne),
    ("!=", Op::Ne),
    (">", Op::Gt),
    ("<", Op::Lt),
    ("=", Op::Eq),
];

impl Op {
    /// Returns `true` for the ordering operators (`Gt`, `Gte`, `Lt`, `Lte`).
    pub fn is_ordering(self) -> bool {
        matches!(self, Op::Gt | Op::Gte | Op::Lt | Op::Lte)
    }

    /// Returns `true` if this operator is valid for boolean comparisons.
    pub fn is_equality(self) -> bool {
        matches!(self, Op::Eq | Op::Ne)
    }

    /// Splits a leading comparison operator off a raw value.
    ///
    /// `">=30"` yields `(Some(Op::Gte), "30")`. A value that is only an
    /// operator (`">"`) is returned untouched, since there is nothing left
    /// to compare against.
    pub fn split_prefix(raw: &str) -> (Option<Op>, &str) {
        for (prefix, op) in PREFIXES {
            if let Some(rest) = raw.strip_prefix(prefix) {
                if rest.is_empty() {
                    break;
                }
                return (Some(op), rest);
            }
        }
        (None, raw)
    }

    /// Evaluates a comparison given an ordering result.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering == Ordering::Equal,
            Op::Ne => ordering != Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
            Op::Contains => false,
        }
    }

    /// Returns the SQL operator for this comparison.
    pub fn sql_operator(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Contains => "LIKE",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
        }
    }

    /// Returns the display name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::Contains => "contains",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_kinds() {
        assert!(Op::Gt.is_ordering());
        assert!(Op::Lte.is_ordering());
        assert!(!Op::Eq.is_ordering());
        assert!(!Op::Contains.is_ordering());

        assert!(Op::Eq.is_equality());
        assert!(Op::Ne.is_equality());
        assert!(!Op::Contains.is_equality());
    }

    #[test]
    fn split_prefix_takes_longest_operator() {
        assert_eq!(Op::split_prefix(">=30"), (Some(Op::Gte), "30"));
        assert_eq!(Op::split_prefix(">30"), (Some(Op::Gt), "30"));
        assert_eq!(Op::split_prefix("<=5"), (Some(Op::Lte), "5"));
        assert_eq!(Op::split_prefix("<>x"), (Some(Op::Ne), "x"));
        assert_eq!(Op::split_prefix("!=x"), (Some(Op::Ne), "x"));
        assert_eq!(Op::split_prefix("=Jane"), (Some(Op::Eq), "Jane"));
    }

    #[test]
    fn split_prefix_leaves_plain_values() {
        assert_eq!(Op::split_prefix("30"), (None, "30"));
        assert_eq!(Op::split_prefix(">"), (None, ">"));
        assert_eq!(Op::split_prefix(">="), (None, ">="));
        assert_eq!(Op::split_prefix(""), (None, ""));
    }

    #[test]
    fn ordering_truth_table() {
        use Ordering::{Equal, Greater, Less};
        let table = [
            (Op::Eq, [false, true, false]),
            (Op::Ne, [true, false, true]),
            (Op::Gt, [false, false, true]),
            (Op::Gte, [false, true, true]),
            (Op::Lt, [true, false, false]),
            (Op::Lte, [true, true, false]),
            (Op::Contains, [false, false, false]),
        ];
        for (op, expected) in table {
            let actual = [Less, Equal, Greater].map(|o| op.eval_ordering(o));
            assert_eq!(actual, expected, "{}", op);
        }
    }

    #[test]
    fn op_display() {
        assert_eq!(Op::Eq.to_string(), "eq");
        assert_eq!(Op::Contains.to_string(), "contains");
        assert_eq!(Op::Contains.sql_operator(), "LIKE");
        assert_eq!(Op::Ne.sql_operator(), "<>");
    }
}
