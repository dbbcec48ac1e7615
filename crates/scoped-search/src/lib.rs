//! Scoped search - compile free-text search strings into typed filters.
//!
//! A search string such as `jane age:>30 -archived:true` is tokenized,
//! parsed into a condition tree, and compiled against the fields a search
//! was declared over. The result is a backend-neutral [`CompiledFilter`]:
//! a boolean tree of typed field comparisons plus the associations a data
//! layer has to join for it to resolve.
//!
//! - Bare keywords are tried against every declared field (OR-ed).
//! - `field:value` targets one field; `field:>=value` and friends compare.
//! - Juxtaposition means AND; `or` / `|` and parentheses group.
//! - `not` / `-` negate.
//!
//! Malformed input never fails: unknown fields and uncoercible values just
//! narrow the result. Only declaration mistakes are errors.
//!
//! # Quick Start
//!
//! ```rust
//! use scoped_search::{
//!     FieldRef, MemorySchema, ModelSchema, Number, SearchRegistry, Searchable, Value, ValueType,
//! };
//!
//! struct Post {
//!     title: String,
//!     views: i64,
//!     author_name: String,
//! }
//!
//! impl Searchable for Post {
//!     fn search_value(&self, field: &FieldRef) -> Value<'_> {
//!         match (field.association.as_deref(), field.column.as_str()) {
//!             (None, "title") => Value::String(&self.title),
//!             (None, "views") => Value::Number(Number::I64(self.views)),
//!             (Some("author"), "name") => Value::String(&self.author_name),
//!             _ => Value::None,
//!         }
//!     }
//! }
//!
//! let schema = MemorySchema::new()
//!     .model(
//!         "post",
//!         ModelSchema::new()
//!             .column("title", ValueType::String)
//!             .column("views", ValueType::Integer)
//!             .association("author", "user"),
//!     )
//!     .model("user", ModelSchema::new().column("name", ValueType::String));
//!
//! let registry = SearchRegistry::new(schema);
//! registry.searchable_on("post", ["title", "views", "author_name"]).unwrap();
//!
//! let posts = vec![
//!     Post { title: "Rust tips".into(), views: 120, author_name: "Jane".into() },
//!     Post { title: "Go tips".into(), views: 40, author_name: "Jane".into() },
//!     Post { title: "Rust news".into(), views: 300, author_name: "Bob".into() },
//! ];
//!
//! let results = registry
//!     .search("post", "search_for", "jane views:>100", &[], &posts, Post::accessor)
//!     .unwrap();
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].title, "Rust tips");
//! ```
//!
//! # Pipeline
//!
//! | Stage | Entry point | Output |
//! |-------|-------------|--------|
//! | Lexing | [`tokenize`] | [`Token`]s |
//! | Parsing | [`parse`], [`parse_query`] | [`ConditionNode`] |
//! | Field resolution | [`resolve`] | [`FieldCatalog`] |
//! | Compilation | [`compile`], [`compile_query`] | [`CompiledFilter`] |
//! | Rendering | [`SqlTranslator`] | [`SqlQuery`] |
//!
//! # Coercion
//!
//! | Field type | Default op | Accepted values |
//! |------------|------------|-----------------|
//! | string, text | `Contains` | anything |
//! | integer | `Eq` | integers, floats without fraction |
//! | float, decimal | `Eq` | finite numbers |
//! | boolean | `Eq` | `true/false`, `yes/no`, `1/0`, ... (equality only) |
//! | date | `Eq` | `2024-03-01`, `03/01/2024`, date-times |
//! | datetime | `Eq` | date-times; a date alone means the whole day |
//! | time, binary | - | never searchable |

mod catalog;
mod clause;
mod compiler;
mod config;
mod error;
mod filter;
mod lexer;
mod op;
mod parser;
mod registry;
mod schema;
mod sql;
mod traits;
mod value;

// Re-export public API
pub use catalog::{resolve, AssociationGroup, CatalogField, FieldCatalog, FieldSpec};
pub use clause::{Clause, FieldRef};
pub use compiler::{compile, compile_query};
pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use filter::{CompiledFilter, FilterExpr};
pub use lexer::{is_identifier, tokenize, Token, TokenKind};
pub use op::Op;
pub use parser::{parse, parse_query, ConditionNode, Term, MAX_DEPTH};
pub use registry::{
    SearchBuilder, SearchDeclaration, SearchDefinition, SearchRegistry, DEFAULT_SEARCH_NAME,
};
pub use schema::{Column, MemorySchema, ModelSchema};
pub use sql::{SqlParam, SqlQuery, SqlTranslator};
pub use traits::{AnsiQuoting, Association, MysqlQuoting, Quoting, SchemaView, Searchable};
pub use value::{parse_bool, Literal, Number, Timestamp, Value, ValueType};
