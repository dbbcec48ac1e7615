//! Condition compiler.
//!
//! [`compile`] walks a [`ConditionNode`] tree together with a
//! [`FieldCatalog`] and produces a [`CompiledFilter`]. Every term value is
//! coerced to the declared type of the field it is tested against:
//!
//! | Type              | Default op | Literal                                   |
//! |-------------------|------------|-------------------------------------------|
//! | string, text      | contains   | anything                                  |
//! | integer           | eq         | integer (or float without fraction)       |
//! | float, decimal    | eq         | finite number                             |
//! | boolean           | eq         | true/false, yes/no, on/off, t/f, y/n, 1/0 |
//! | date              | eq         | `YYYY-MM-DD`, `MM/DD/YYYY`                |
//! | datetime          | eq         | date-time, or a date meaning the whole day|
//!
//! A value that does not coerce makes its comparison always-false. A term
//! naming a field outside the catalog is always-false too. Neither is an
//! error: query text is user input.

use crate::catalog::{CatalogField, FieldCatalog};
use crate::clause::Clause;
use crate::filter::{CompiledFilter, FilterExpr};
use crate::op::Op;
use crate::parser::{parse_query, ConditionNode, Term};
use crate::value::{parse_bool, Literal, Number, Timestamp, ValueType};

/// Compiles a condition tree against a catalog.
///
/// An empty tree compiles to a filter with no predicate and no joins.
pub fn compile(tree: &ConditionNode, catalog: &FieldCatalog) -> CompiledFilter {
    if tree.is_empty() {
        return CompiledFilter::none();
    }
    let predicate = compile_node(tree, catalog);
    let joins = predicate.associations();
    CompiledFilter::new(predicate, joins)
}

/// Tokenizes, parses and compiles a raw search string.
///
/// ```
/// use scoped_search::{compile_query, resolve, FieldSpec, MemorySchema, ModelSchema, ValueType};
///
/// let schema = MemorySchema::new().model(
///     "person",
///     ModelSchema::new()
///         .column("name", ValueType::String)
///         .column("age", ValueType::Integer),
/// );
/// let catalog = resolve("person", &FieldSpec::All, &schema).unwrap();
///
/// assert_eq!(compile_query("age:30", &catalog).to_string(), "age eq 30");
/// assert_eq!(compile_query("bob", &catalog).to_string(), "name contains \"bob\"");
/// assert!(compile_query("   ", &catalog).is_noop());
/// ```
pub fn compile_query(raw: &str, catalog: &FieldCatalog) -> CompiledFilter {
    compile(&parse_query(raw), catalog)
}

fn compile_node(node: &ConditionNode, catalog: &FieldCatalog) -> FilterExpr {
    match node {
        ConditionNode::Leaf(term) => compile_term(term, catalog),
        ConditionNode::And(children) => {
            FilterExpr::and(children.iter().map(|c| compile_node(c, catalog)).collect())
        }
        ConditionNode::Or(children) => {
            FilterExpr::or(children.iter().map(|c| compile_node(c, catalog)).collect())
        }
        ConditionNode::Not(inner) => compile_node(inner, catalog).negate(),
        ConditionNode::Empty => FilterExpr::Always,
    }
}

fn compile_term(term: &Term, catalog: &FieldCatalog) -> FilterExpr {
    let expr = match &term.field {
        Some(name) => match catalog.field(name) {
            // Quoted values are taken verbatim, operator characters included.
            Some(field) if term.quoted => compare(&field, None, &term.value),
            Some(field) => {
                let (op, value) = Op::split_prefix(&term.value);
                compare(&field, op, value)
            }
            None => {
                tracing::debug!(
                    model = catalog.model(),
                    field = name.as_str(),
                    "search term names a field outside the catalog"
                );
                FilterExpr::Never
            }
        },
        // A bare keyword is tried against every field.
        None => FilterExpr::or(
            catalog
                .fields()
                .map(|field| compare(&field, None, &term.value))
                .collect(),
        ),
    };
    if term.negated {
        expr.negate()
    } else {
        expr
    }
}

/// Builds the comparison of one field against a raw value.
fn compare(field: &CatalogField, op: Option<Op>, raw: &str) -> FilterExpr {
    let ty = field.value_type;
    let expr = match ty {
        ty if ty.is_textual() => Some(clause(field, op.unwrap_or(Op::Contains), raw)),
        ValueType::Integer => {
            Number::parse_integer(raw).map(|n| clause(field, op.unwrap_or(Op::Eq), n))
        }
        ValueType::Float | ValueType::Decimal => {
            Number::parse_float(raw).map(|n| clause(field, op.unwrap_or(Op::Eq), n))
        }
        ValueType::Boolean => match op.unwrap_or(Op::Eq) {
            op if op.is_equality() => parse_bool(raw).map(|b| clause(field, op, b)),
            _ => None,
        },
        ValueType::Date => {
            let date = Timestamp::parse_date(raw)
                .or_else(|| Timestamp::parse_datetime(raw).map(|dt| dt.date()));
            date.map(|d| clause(field, op.unwrap_or(Op::Eq), Timestamp::from_date(d)))
        }
        ValueType::DateTime => compare_datetime(field, op.unwrap_or(Op::Eq), raw),
        // Time and binary columns never match.
        _ => None,
    };
    expr.unwrap_or_else(|| {
        tracing::trace!(
            field = %field.field,
            value_type = %ty,
            value = raw,
            "search value does not coerce to the field type"
        );
        FilterExpr::Never
    })
}

/// A full date-time compares exactly. A date alone stands for the whole day.
fn compare_datetime(field: &CatalogField, op: Op, raw: &str) -> Option<FilterExpr> {
    if let Some(dt) = Timestamp::parse_datetime(raw) {
        return Some(clause(field, op, Timestamp::from_datetime(dt)));
    }
    let start = Timestamp::from_date(Timestamp::parse_date(raw)?);
    let end = start.next_day();
    let expr = match op {
        Op::Eq | Op::Contains => FilterExpr::and(vec![
            clause(field, Op::Gte, start),
            clause(field, Op::Lt, end),
        ]),
        Op::Ne => FilterExpr::or(vec![clause(field, Op::Lt, start), clause(field, Op::Gte, end)]),
        Op::Gt => clause(field, Op::Gte, end),
        Op::Gte => clause(field, Op::Gte, start),
        Op::Lt => clause(field, Op::Lt, start),
        Op::Lte => clause(field, Op::Lt, end),
    };
    Some(expr)
}

fn clause(field: &CatalogField, op: Op, value: impl Into<Literal>) -> FilterExpr {
    FilterExpr::Clause(Clause::new(field.field.clone(), op, value))
}
