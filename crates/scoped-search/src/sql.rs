//! SQL rendering for compiled filters.
//!
//! Renders a [`CompiledFilter`] as a parameterized WHERE clause, with `?`
//! placeholders and identifiers quoted through a [`Quoting`] dialect.
//!
//! ```sql
//! "posts"."title" LIKE ? ESCAPE '\'          -- contains
//! "posts"."views" >= ?                       -- ordering
//! ("posts"."title" LIKE ? ESCAPE '\' OR "users"."name" LIKE ? ESCAPE '\')
//! NOT ("posts"."published" = ?)
//! 1=1 / 1=0                                  -- always / never
//! ```
//!
//! The join list is carried through unchanged; the caller decides how to
//! turn it into JOINs or eager loads.

use chrono::NaiveDateTime;

use crate::catalog::FieldCatalog;
use crate::clause::Clause;
use crate::filter::{CompiledFilter, FilterExpr};
use crate::op::Op;
use crate::traits::Quoting;
use crate::value::{Literal, Number};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// SQL translator for compiled filters.
pub struct SqlTranslator;

/// A parameterized WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    /// The WHERE clause, without the `WHERE` keyword.
    pub clause: String,
    /// Parameter values, in placeholder order.
    pub params: Vec<SqlParam>,
    /// Associations to join or eagerly load.
    pub joins: Vec<String>,
}

/// SQL parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// Text, including `LIKE` patterns.
    Text(String),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// Boolean value.
    Boolean(bool),
    /// Naive UTC date-time.
    DateTime(NaiveDateTime),
}

impl SqlParam {
    fn inline(&self) -> String {
        match self {
            SqlParam::Text(s) => format!("'{}'", s.replace('\'', "''")),
            SqlParam::Integer(n) => n.to_string(),
            SqlParam::Float(n) => n.to_string(),
            SqlParam::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            SqlParam::DateTime(dt) => format!("'{}'", dt.format(DATETIME_FORMAT)),
        }
    }
}

impl SqlTranslator {
    /// Translates a filter to a parameterized WHERE clause.
    ///
    /// Returns `None` when the filter applies no predicate.
    pub fn translate(
        filter: &CompiledFilter,
        catalog: &FieldCatalog,
        quoting: &impl Quoting,
    ) -> Option<SqlQuery> {
        let predicate = filter.predicate.as_ref()?;
        let mut params = Vec::new();
        let clause = Self::translate_expr(predicate, catalog, quoting, &mut params);
        Some(SqlQuery {
            clause,
            params,
            joins: filter.joins.clone(),
        })
    }

    /// Translates a filter with values inlined.
    ///
    /// For logging and debugging only; never execute the result.
    pub fn translate_inline(
        filter: &CompiledFilter,
        catalog: &FieldCatalog,
        quoting: &impl Quoting,
    ) -> Option<String> {
        let query = Self::translate(filter, catalog, quoting)?;
        let mut params = query.params.iter();
        let mut result = String::with_capacity(query.clause.len());
        for ch in query.clause.chars() {
            match ch {
                '?' => match params.next() {
                    Some(param) => result.push_str(&param.inline()),
                    None => result.push(ch),
                },
                _ => result.push(ch),
            }
        }
        Some(result)
    }

    fn translate_expr(
        expr: &FilterExpr,
        catalog: &FieldCatalog,
        quoting: &impl Quoting,
        params: &mut Vec<SqlParam>,
    ) -> String {
        match expr {
            FilterExpr::Clause(clause) => Self::translate_clause(clause, catalog, quoting, params),
            FilterExpr::And(children) => {
                Self::join_children(children, " AND ", catalog, quoting, params)
            }
            FilterExpr::Or(children) => {
                Self::join_children(children, " OR ", catalog, quoting, params)
            }
            FilterExpr::Not(inner) => format!(
                "NOT ({})",
                Self::translate_expr(inner, catalog, quoting, params)
            ),
            FilterExpr::Always => "1=1".to_string(),
            FilterExpr::Never => "1=0".to_string(),
        }
    }

    fn join_children(
        children: &[FilterExpr],
        separator: &str,
        catalog: &FieldCatalog,
        quoting: &impl Quoting,
        params: &mut Vec<SqlParam>,
    ) -> String {
        let parts: Vec<String> = children
            .iter()
            .map(|child| Self::translate_expr(child, catalog, quoting, params))
            .collect();
        if parts.len() == 1 {
            parts[0].clone()
        } else {
            format!("({})", parts.join(separator))
        }
    }

    fn translate_clause(
        clause: &Clause,
        catalog: &FieldCatalog,
        quoting: &impl Quoting,
        params: &mut Vec<SqlParam>,
    ) -> String {
        let column = format!(
            "{}.{}",
            quoting.quote_table(catalog.table_for(&clause.field)),
            quoting.quote_column(&clause.field.column)
        );
        match (clause.op, &clause.value) {
            (Op::Contains, Literal::String(text)) => {
                params.push(SqlParam::Text(format!("%{}%", escape_like(text))));
                format!("{} LIKE ? ESCAPE '\\'", column)
            }
            // Contains is only produced for textual fields.
            (Op::Contains, _) => "1=0".to_string(),
            (op, value) => {
                params.push(param(value));
                format!("{} {} ?", column, op.sql_operator())
            }
        }
    }
}

fn param(value: &Literal) -> SqlParam {
    match value {
        Literal::String(s) => SqlParam::Text(s.clone()),
        Literal::Number(Number::I64(n)) => SqlParam::Integer(*n),
        Literal::Number(Number::U64(n)) => match i64::try_from(*n) {
            Ok(n) => SqlParam::Integer(n),
            Err(_) => SqlParam::Float(*n as f64),
        },
        Literal::Number(Number::F64(n)) => SqlParam::Float(*n),
        Literal::Bool(b) => SqlParam::Boolean(*b),
        Literal::Timestamp(ts) => match ts.to_datetime() {
            Some(dt) => SqlParam::DateTime(dt),
            None => SqlParam::Integer(ts.as_millis()),
        },
    }
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{resolve, FieldSpec};
    use crate::compiler::compile_query;
    use crate::schema::{MemorySchema, ModelSchema};
    use crate::traits::{AnsiQuoting, MysqlQuoting};
    use crate::value::ValueType;
    use chrono::NaiveDate;

    fn catalog(fields: &[&str]) -> FieldCatalog {
        let schema = MemorySchema::new()
            .model(
                "post",
                ModelSchema::new()
                    .table("posts")
                    .column("title", ValueType::String)
                    .column("views", ValueType::Integer)
                    .column("published", ValueType::Boolean)
                    .column("created_at", ValueType::DateTime)
                    .association("author", "user"),
            )
            .model(
                "user",
                ModelSchema::new()
                    .table("users")
                    .column("name", ValueType::String),
            );
        resolve("post", &FieldSpec::fields(fields.iter().copied()), &schema).unwrap()
    }

    fn translate(query: &str, fields: &[&str]) -> SqlQuery {
        let catalog = catalog(fields);
        let filter = compile_query(query, &catalog);
        SqlTranslator::translate(&filter, &catalog, &AnsiQuoting).unwrap()
    }

    #[test]
    fn noop_filter_has_no_clause() {
        let catalog = catalog(&["title"]);
        let filter = compile_query("", &catalog);
        assert!(SqlTranslator::translate(&filter, &catalog, &AnsiQuoting).is_none());
        assert!(SqlTranslator::translate_inline(&filter, &catalog, &AnsiQuoting).is_none());
    }

    #[test]
    fn contains_becomes_like() {
        let sql = translate("bob", &["title"]);
        assert_eq!(sql.clause, "\"posts\".\"title\" LIKE ? ESCAPE '\\'");
        assert_eq!(sql.params, vec![SqlParam::Text("%bob%".into())]);
    }

    #[test]
    fn like_wildcards_are_escaped() {
        let sql = translate("100%_a\\b", &["title"]);
        assert_eq!(sql.params, vec![SqlParam::Text("%100\\%\\_a\\\\b%".into())]);
    }

    #[test]
    fn ordering_and_equality() {
        let sql = translate("views:>=10 published:yes", &["views", "published"]);
        assert_eq!(
            sql.clause,
            "(\"posts\".\"views\" >= ? AND \"posts\".\"published\" = ?)"
        );
        assert_eq!(
            sql.params,
            vec![SqlParam::Integer(10), SqlParam::Boolean(true)]
        );
    }

    #[test]
    fn association_fields_use_target_table() {
        let sql = translate("jane", &["title", "author_name"]);
        assert_eq!(
            sql.clause,
            "(\"posts\".\"title\" LIKE ? ESCAPE '\\' OR \"users\".\"name\" LIKE ? ESCAPE '\\')"
        );
        assert_eq!(sql.joins, ["author"]);
    }

    #[test]
    fn negation_and_constants() {
        let sql = translate("-views:3", &["views"]);
        assert_eq!(sql.clause, "NOT (\"posts\".\"views\" = ?)");

        let sql = translate("ghost:1", &["views"]);
        assert_eq!(sql.clause, "1=0");
        assert!(sql.params.is_empty());

        let sql = translate("-ghost:1", &["views"]);
        assert_eq!(sql.clause, "1=1");
    }

    #[test]
    fn datetime_day_range() {
        let sql = translate("created_at:2024-03-01", &["created_at"]);
        let start = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            sql.clause,
            "(\"posts\".\"created_at\" >= ? AND \"posts\".\"created_at\" < ?)"
        );
        assert_eq!(
            sql.params,
            vec![SqlParam::DateTime(start), SqlParam::DateTime(end)]
        );
    }

    #[test]
    fn inline_rendering() {
        let catalog = catalog(&["title", "views"]);
        let filter = compile_query("title:\"o'brien\" views:<5", &catalog);
        let inline = SqlTranslator::translate_inline(&filter, &catalog, &MysqlQuoting).unwrap();
        assert_eq!(
            inline,
            "(`posts`.`title` LIKE '%o''brien%' ESCAPE '\\' AND `posts`.`views` < 5)"
        );
    }
}
