//! Capabilities the host data layer provides.
//!
//! - [`SchemaView`] answers questions about tables, columns and associations.
//! - [`Quoting`] quotes identifiers when a filter is rendered as SQL text.
//! - [`Searchable`] exposes record fields for in-memory evaluation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clause::FieldRef;
use crate::value::{Value, ValueType};

/// A one-hop association declared on a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    /// Association name, the prefix used in search field names.
    pub name: String,
    /// Model the association points to.
    pub target: String,
}

impl Association {
    /// Creates a new association.
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Association {
            name: name.into(),
            target: target.into(),
        }
    }
}

/// Read-only view of the host's schema.
///
/// Methods must be cheap and side-effect free; they are called during
/// catalog resolution only, never per query.
pub trait SchemaView {
    /// Returns `true` if the model's table exists.
    fn table_exists(&self, model: &str) -> bool;

    /// Column names of the model, in declaration order.
    fn column_names(&self, model: &str) -> Vec<String>;

    /// Declared type of a column, `None` if unknown.
    fn column_type(&self, model: &str, column: &str) -> Option<ValueType>;

    /// Associations declared on the model, in declaration order.
    fn associations(&self, model: &str) -> Vec<Association>;

    /// Table name backing the model. Defaults to the model name.
    fn table_name(&self, model: &str) -> String {
        model.to_string()
    }
}

impl<T: SchemaView + ?Sized> SchemaView for &T {
    fn table_exists(&self, model: &str) -> bool {
        (**self).table_exists(model)
    }

    fn column_names(&self, model: &str) -> Vec<String> {
        (**self).column_names(model)
    }

    fn column_type(&self, model: &str, column: &str) -> Option<ValueType> {
        (**self).column_type(model, column)
    }

    fn associations(&self, model: &str) -> Vec<Association> {
        (**self).associations(model)
    }

    fn table_name(&self, model: &str) -> String {
        (**self).table_name(model)
    }
}

impl<T: SchemaView + ?Sized> SchemaView for Arc<T> {
    fn table_exists(&self, model: &str) -> bool {
        (**self).table_exists(model)
    }

    fn column_names(&self, model: &str) -> Vec<String> {
        (**self).column_names(model)
    }

    fn column_type(&self, model: &str, column: &str) -> Option<ValueType> {
        (**self).column_type(model, column)
    }

    fn associations(&self, model: &str) -> Vec<Association> {
        (**self).associations(model)
    }

    fn table_name(&self, model: &str) -> String {
        (**self).table_name(model)
    }
}

/// Identifier quoting for a textual SQL dialect.
pub trait Quoting {
    /// Quotes a table name.
    fn quote_table(&self, name: &str) -> String;

    /// Quotes a column name.
    fn quote_column(&self, name: &str) -> String;
}

/// ANSI SQL quoting: `"name"`, embedded quotes doubled.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiQuoting;

impl Quoting for AnsiQuoting {
    fn quote_table(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn quote_column(&self, name: &str) -> String {
        self.quote_table(name)
    }
}

/// MySQL quoting: `` `name` ``, embedded backticks doubled.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlQuoting;

impl Quoting for MysqlQuoting {
    fn quote_table(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn quote_column(&self, name: &str) -> String {
        self.quote_table(name)
    }
}

/// Records that can be filtered in memory by a compiled search.
///
/// # Example
///
/// ```
/// use scoped_search::{FieldRef, Searchable, Value};
///
/// struct Post {
///     title: String,
///     author_name: String,
/// }
///
/// impl Searchable for Post {
///     fn search_value(&self, field: &FieldRef) -> Value<'_> {
///         match (field.association.as_deref(), field.column.as_str()) {
///             (None, "title") => Value::String(&self.title),
///             (Some("author"), "name") => Value::String(&self.author_name),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
pub trait Searchable {
    /// Returns the value of a field, or [`Value::None`] if it is absent.
    fn search_value(&self, field: &FieldRef) -> Value<'_>;

    /// Accessor function suitable for [`CompiledFilter::filter`](crate::CompiledFilter::filter).
    fn accessor<'a>(item: &'a Self, field: &FieldRef) -> Value<'a>
    where
        Self: Sized,
    {
        item.search_value(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item {
        name: String,
    }

    impl Searchable for Item {
        fn search_value(&self, field: &FieldRef) -> Value<'_> {
            match field.column.as_str() {
                "name" => Value::String(&self.name),
                _ => Value::None,
            }
        }
    }

    #[test]
    fn searchable_accessor() {
        let item = Item {
            name: "test".to_string(),
        };
        assert_eq!(
            Item::accessor(&item, &FieldRef::own("name")),
            Value::String("test")
        );
        assert_eq!(item.search_value(&FieldRef::own("other")), Value::None);
    }

    #[test]
    fn ansi_quoting_doubles_quotes() {
        assert_eq!(AnsiQuoting.quote_table("posts"), "\"posts\"");
        assert_eq!(AnsiQuoting.quote_column("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn mysql_quoting_uses_backticks() {
        assert_eq!(MysqlQuoting.quote_table("posts"), "`posts`");
        assert_eq!(MysqlQuoting.quote_column("a`b"), "`a``b`");
    }
}
