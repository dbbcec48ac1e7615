//! Single-field comparisons.
//!
//! A [`Clause`] is the leaf of a compiled filter: a field reference, an
//! operator and a literal already coerced to the field's type.

use std::fmt;

use crate::op::Op;
use crate::value::{Literal, Number, Timestamp, Value};

/// Reference to a searchable column, either on the base model or on a
/// model reached through one association.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    /// Association name, `None` for the base model's own columns.
    pub association: Option<String>,
    /// Column name local to its model.
    pub column: String,
}

impl FieldRef {
    /// A column on the base model.
    pub fn own(column: impl Into<String>) -> Self {
        FieldRef {
            association: None,
            column: column.into(),
        }
    }

    /// A column on the model behind `association`.
    pub fn associated(association: impl Into<String>, column: impl Into<String>) -> Self {
        FieldRef {
            association: Some(association.into()),
            column: column.into(),
        }
    }

    /// The name used in search strings: `column` or `association_column`.
    pub fn qualified_name(&self) -> String {
        match &self.association {
            Some(association) => format!("{}_{}", association, self.column),
            None => self.column.clone(),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.association {
            Some(association) => write!(f, "{}.{}", association, self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

/// A single filter predicate.
///
/// # Example
///
/// ```
/// use scoped_search::{Clause, FieldRef, Op, Value};
///
/// let clause = Clause::new(FieldRef::own("name"), Op::Contains, "bob");
/// assert!(clause.matches(&Value::String("bobby")));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// The field to compare.
    pub field: FieldRef,
    /// The comparison operator.
    pub op: Op,
    /// The value to compare against.
    pub value: Literal,
}

impl Clause {
    /// Creates a new clause.
    pub fn new(field: FieldRef, op: Op, value: impl Into<Literal>) -> Self {
        Clause {
            field,
            op,
            value: value.into(),
        }
    }

    /// Evaluates this clause against a record's field value.
    ///
    /// Type mismatches and missing values never match.
    pub fn matches(&self, field_value: &Value<'_>) -> bool {
        match (&self.value, field_value) {
            (Literal::String(pattern), Value::String(s)) => self.match_string(s, pattern),
            (Literal::Number(clause_num), Value::Number(field_num)) => {
                self.match_number(*field_num, *clause_num)
            }
            (Literal::Timestamp(clause_ts), Value::Timestamp(field_ts)) => {
                self.match_timestamp(*field_ts, *clause_ts)
            }
            (Literal::Bool(clause_bool), Value::Bool(field_bool)) => match self.op {
                Op::Eq => field_bool == clause_bool,
                Op::Ne => field_bool != clause_bool,
                _ => false,
            },
            _ => false,
        }
    }

    fn match_string(&self, field: &str, pattern: &str) -> bool {
        match self.op {
            // Substring search is case-insensitive, like SQL LIKE on most collations.
            Op::Contains => field.to_lowercase().contains(&pattern.to_lowercase()),
            op => op.eval_ordering(field.cmp(pattern)),
        }
    }

    fn match_number(&self, field: Number, clause: Number) -> bool {
        match field.compare(clause) {
            Some(ordering) => self.op.eval_ordering(ordering),
            None => false,
        }
    }

    fn match_timestamp(&self, field: Timestamp, clause: Timestamp) -> bool {
        self.op.eval_ordering(field.cmp(&clause))
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Literal::String(s) => write!(f, "{} {} {:?}", self.field, self.op, s),
            Literal::Number(Number::I64(n)) => write!(f, "{} {} {}", self.field, self.op, n),
            Literal::Number(Number::U64(n)) => write!(f, "{} {} {}", self.field, self.op, n),
            Literal::Number(Number::F64(n)) => write!(f, "{} {} {}", self.field, self.op, n),
            Literal::Timestamp(ts) => match ts.to_datetime() {
                Some(dt) => write!(f, "{} {} {}", self.field, self.op, dt),
                None => write!(f, "{} {} @{}", self.field, self.op, ts.as_millis()),
            },
            Literal::Bool(b) => write!(f, "{} {} {}", self.field, self.op, b),
        }
    }
}
