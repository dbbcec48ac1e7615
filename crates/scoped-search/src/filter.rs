//! Compiled filters.
//!
//! A [`FilterExpr`] is a backend-neutral boolean tree over [`Clause`]s.
//! A [`CompiledFilter`] pairs it with the associations a data layer has to
//! join for the tree to resolve.
//!
//! Compiled filters can be executed directly against in-memory slices,
//! given an accessor that reads a record's field values:
//!
//! ```
//! use scoped_search::{Clause, CompiledFilter, FieldRef, FilterExpr, Op, Value};
//!
//! struct Task {
//!     name: String,
//! }
//!
//! fn accessor<'a>(task: &'a Task, field: &FieldRef) -> Value<'a> {
//!     match field.column.as_str() {
//!         "name" => Value::String(&task.name),
//!         _ => Value::None,
//!     }
//! }
//!
//! let filter = CompiledFilter::new(
//!     FilterExpr::Clause(Clause::new(FieldRef::own("name"), Op::Contains, "bug")),
//!     Vec::new(),
//! );
//! let tasks = vec![
//!     Task { name: "Fix bug".into() },
//!     Task { name: "Write docs".into() },
//! ];
//! let results = filter.filter(&tasks, accessor);
//! assert_eq!(results.len(), 1);
//! ```

use std::fmt;

use crate::clause::{Clause, FieldRef};
use crate::value::Value;

/// Backend-neutral predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// One field comparison.
    Clause(Clause),
    /// Every child must hold.
    And(Vec<FilterExpr>),
    /// At least one child must hold.
    Or(Vec<FilterExpr>),
    /// The child must not hold.
    Not(Box<FilterExpr>),
    /// Matches every record.
    Always,
    /// Matches no record.
    Never,
}

impl FilterExpr {
    /// Conjunction with constant folding: `Never` absorbs, `Always` drops out,
    /// nested `And`s flatten and a single child stands alone.
    pub fn and(children: Vec<FilterExpr>) -> FilterExpr {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                FilterExpr::Never => return FilterExpr::Never,
                FilterExpr::Always => {}
                FilterExpr::And(nested) => flat.extend(nested),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => FilterExpr::Always,
            1 => flat.pop().unwrap_or(FilterExpr::Always),
            _ => FilterExpr::And(flat),
        }
    }

    /// Disjunction with constant folding, the dual of [`FilterExpr::and`].
    pub fn or(children: Vec<FilterExpr>) -> FilterExpr {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                FilterExpr::Always => return FilterExpr::Always,
                FilterExpr::Never => {}
                FilterExpr::Or(nested) => flat.extend(nested),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => FilterExpr::Never,
            1 => flat.pop().unwrap_or(FilterExpr::Never),
            _ => FilterExpr::Or(flat),
        }
    }

    /// Negation. Constants flip and double negation cancels.
    pub fn negate(self) -> FilterExpr {
        match self {
            FilterExpr::Always => FilterExpr::Never,
            FilterExpr::Never => FilterExpr::Always,
            FilterExpr::Not(inner) => *inner,
            other => FilterExpr::Not(Box::new(other)),
        }
    }

    /// Visits every clause in the tree, depth first, left to right.
    pub fn clauses(&self) -> Vec<&Clause> {
        let mut out = Vec::new();
        self.collect_clauses(&mut out);
        out
    }

    fn collect_clauses<'a>(&'a self, out: &mut Vec<&'a Clause>) {
        match self {
            FilterExpr::Clause(clause) => out.push(clause),
            FilterExpr::And(children) | FilterExpr::Or(children) => {
                for child in children {
                    child.collect_clauses(out);
                }
            }
            FilterExpr::Not(inner) => inner.collect_clauses(out),
            FilterExpr::Always | FilterExpr::Never => {}
        }
    }

    /// Association names referenced by the tree, deduplicated in first-seen order.
    pub fn associations(&self) -> Vec<String> {
        let mut joins: Vec<String> = Vec::new();
        for clause in self.clauses() {
            if let Some(association) = &clause.field.association {
                if !joins.contains(association) {
                    joins.push(association.clone());
                }
            }
        }
        joins
    }

    /// Evaluates the tree against one record.
    pub fn matches<T, F>(&self, item: &T, accessor: &F) -> bool
    where
        for<'a> F: Fn(&'a T, &FieldRef) -> Value<'a>,
    {
        match self {
            FilterExpr::Clause(clause) => clause.matches(&accessor(item, &clause.field)),
            FilterExpr::And(children) => children.iter().all(|c| c.matches(item, accessor)),
            FilterExpr::Or(children) => children.iter().any(|c| c.matches(item, accessor)),
            FilterExpr::Not(inner) => !inner.matches(item, accessor),
            FilterExpr::Always => true,
            FilterExpr::Never => false,
        }
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpr::Clause(clause) => write!(f, "{}", clause),
            FilterExpr::And(children) => write_group(f, children, " AND "),
            FilterExpr::Or(children) => write_group(f, children, " OR "),
            FilterExpr::Not(inner) => write!(f, "NOT {}", inner),
            FilterExpr::Always => write!(f, "TRUE"),
            FilterExpr::Never => write!(f, "FALSE"),
        }
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, children: &[FilterExpr], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", child)?;
    }
    write!(f, ")")
}

/// Result of compiling a search: the predicate and the associations to join.
///
/// A `None` predicate means "no filtering" (empty or blank query).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledFilter {
    /// Predicate to apply, `None` for no filtering.
    pub predicate: Option<FilterExpr>,
    /// Associations to join or eagerly load, in first-seen order.
    pub joins: Vec<String>,
}

impl CompiledFilter {
    /// A filter that filters nothing.
    pub fn none() -> Self {
        CompiledFilter::default()
    }

    /// Creates a filter from a predicate and its join list.
    pub fn new(predicate: FilterExpr, joins: Vec<String>) -> Self {
        CompiledFilter {
            predicate: Some(predicate),
            joins,
        }
    }

    /// Returns `true` if this filter applies no predicate.
    pub fn is_noop(&self) -> bool {
        self.predicate.is_none()
    }

    /// Tests if a single item matches.
    pub fn matches<T, F>(&self, item: &T, accessor: F) -> bool
    where
        for<'a> F: Fn(&'a T, &FieldRef) -> Value<'a>,
    {
        match &self.predicate {
            Some(predicate) => predicate.matches(item, &accessor),
            None => true,
        }
    }

    /// Filters a slice, returning references to matching items in order.
    pub fn filter<'a, T, F>(&self, items: &'a [T], accessor: F) -> Vec<&'a T>
    where
        for<'b> F: Fn(&'b T, &FieldRef) -> Value<'b>,
    {
        items
            .iter()
            .filter(|item| self.matches(*item, &accessor))
            .collect()
    }

    /// Counts the matching items.
    pub fn count<T, F>(&self, items: &[T], accessor: F) -> usize
    where
        for<'a> F: Fn(&'a T, &FieldRef) -> Value<'a>,
    {
        items
            .iter()
            .filter(|item| self.matches(*item, &accessor))
            .count()
    }

    /// Returns `true` if any item matches.
    pub fn any<T, F>(&self, items: &[T], accessor: F) -> bool
    where
        for<'a> F: Fn(&'a T, &FieldRef) -> Value<'a>,
    {
        items.iter().any(|item| self.matches(item, &accessor))
    }
}

impl fmt::Display for CompiledFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.predicate {
            Some(predicate) => write!(f, "{}", predicate)?,
            None => write!(f, "(no filter)")?,
        }
        if !self.joins.is_empty() {
            write!(f, " JOIN {}", self.joins.join(", "))?;
        }
        Ok(())
    }
}
