//! Named search definitions per model.
//!
//! A [`SearchRegistry`] owns the host schema and a map
//! `model -> name -> SearchDefinition`. Definitions are resolved once, at
//! registration, and shared read-only afterwards:
//!
//! ```
//! use scoped_search::{FieldSpec, MemorySchema, ModelSchema, SearchRegistry, ValueType};
//!
//! let schema = MemorySchema::new()
//!     .model(
//!         "post",
//!         ModelSchema::new()
//!             .column("title", ValueType::String)
//!             .association("author", "user"),
//!     )
//!     .model("user", ModelSchema::new().column("name", ValueType::String));
//!
//! let registry = SearchRegistry::new(schema);
//! registry.searchable_on("post", ["title", "author_name"]).unwrap();
//!
//! let filter = registry.invoke("post", "search_for", "author_name:Jane", &[]).unwrap();
//! assert_eq!(filter.joins, ["author"]);
//! ```
//!
//! Registration normally happens once at startup. Re-registering a name
//! replaces the stored definition; callers already holding the old
//! `Arc<SearchDefinition>` keep using it unchanged.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::catalog::{resolve, FieldCatalog, FieldSpec};
use crate::clause::FieldRef;
use crate::compiler::compile_query;
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::filter::CompiledFilter;
use crate::traits::SchemaView;
use crate::value::Value;

/// Name used when a search is declared without one.
pub const DEFAULT_SEARCH_NAME: &str = "search_for";

fn default_name() -> String {
    DEFAULT_SEARCH_NAME.to_string()
}

/// Immutable declaration of a search: which model, under what name, over
/// which fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDeclaration {
    /// Model the search belongs to.
    pub model: String,
    /// Search name, unique per model.
    #[serde(default = "default_name")]
    pub name: String,
    /// Fields the search covers.
    #[serde(default)]
    pub fields: FieldSpec,
}

/// Fluent builder for a [`SearchDeclaration`]. Every method returns a new
/// builder.
///
/// ```
/// use scoped_search::{FieldSpec, SearchBuilder};
///
/// let decl = SearchBuilder::new("post")
///     .name("by_title")
///     .only(["title"])
///     .build();
/// assert_eq!(decl.name, "by_title");
/// assert_eq!(decl.fields, FieldSpec::Only(vec!["title".into()]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBuilder {
    decl: SearchDeclaration,
}

impl SearchBuilder {
    /// Starts a declaration over all columns, named [`DEFAULT_SEARCH_NAME`].
    pub fn new(model: impl Into<String>) -> Self {
        SearchBuilder {
            decl: SearchDeclaration {
                model: model.into(),
                name: default_name(),
                fields: FieldSpec::All,
            },
        }
    }

    /// Sets the search name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.decl.name = name.into();
        self
    }

    /// Synonym for [`SearchBuilder::name`].
    pub fn scope(self, name: impl Into<String>) -> Self {
        self.name(name)
    }

    /// Replaces the field spec.
    pub fn field_spec(mut self, fields: FieldSpec) -> Self {
        self.decl.fields = fields;
        self
    }

    /// Searches exactly these fields.
    pub fn fields<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_spec(FieldSpec::fields(names))
    }

    /// Searches only these fields.
    pub fn only<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_spec(FieldSpec::Only(names.into_iter().map(Into::into).collect()))
    }

    /// Searches every column except these.
    pub fn except<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_spec(FieldSpec::Except(names.into_iter().map(Into::into).collect()))
    }

    /// Finishes the declaration.
    pub fn build(self) -> SearchDeclaration {
        self.decl
    }
}

/// A registered search: its declaration and the catalog resolved from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDefinition {
    name: String,
    model: String,
    fields: FieldSpec,
    catalog: FieldCatalog,
}

impl SearchDefinition {
    /// Resolves a declaration against the schema.
    pub fn resolve(decl: &SearchDeclaration, schema: &impl SchemaView) -> Result<Self> {
        let catalog = resolve(&decl.model, &decl.fields, schema)?;
        Ok(SearchDefinition {
            name: decl.name.clone(),
            model: decl.model.clone(),
            fields: decl.fields.clone(),
            catalog,
        })
    }

    /// Search name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Model the search belongs to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The field spec as declared.
    pub fn field_spec(&self) -> &FieldSpec {
        &self.fields
    }

    /// The resolved catalog.
    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    /// Returns `false` if the model's table was missing at registration.
    pub fn is_enabled(&self) -> bool {
        self.catalog.is_enabled()
    }

    /// The catalog's fields as search-string names.
    pub fn as_fields(&self) -> Vec<String> {
        self.catalog.as_fields()
    }

    /// Builds a transient definition that also covers `extra` fields.
    /// `self` is left untouched.
    pub fn with_extra_fields(&self, extra: &[String], schema: &impl SchemaView) -> Result<Self> {
        let decl = SearchDeclaration {
            model: self.model.clone(),
            name: self.name.clone(),
            fields: self
                .fields
                .extend(&schema.column_names(&self.model), extra),
        };
        SearchDefinition::resolve(&decl, schema)
    }

    /// Compiles a query against this definition's catalog.
    pub fn compile(&self, query: &str) -> CompiledFilter {
        compile_query(query, &self.catalog)
    }
}

/// Registry of named searches, keyed by model then name.
pub struct SearchRegistry<S> {
    schema: S,
    searches: RwLock<HashMap<String, HashMap<String, Arc<SearchDefinition>>>>,
}

impl<S: SchemaView> SearchRegistry<S> {
    /// Creates an empty registry over a schema.
    pub fn new(schema: S) -> Self {
        SearchRegistry {
            schema,
            searches: RwLock::new(HashMap::new()),
        }
    }

    /// The schema searches are resolved against.
    pub fn schema(&self) -> &S {
        &self.schema
    }

    /// Resolves and stores a search. Replaces any search with the same
    /// model and name.
    pub fn register(
        &self,
        model: &str,
        name: &str,
        fields: FieldSpec,
    ) -> Result<Arc<SearchDefinition>> {
        self.declare(SearchDeclaration {
            model: model.to_string(),
            name: name.to_string(),
            fields,
        })
    }

    /// Resolves and stores a declaration.
    pub fn declare(&self, decl: SearchDeclaration) -> Result<Arc<SearchDefinition>> {
        let definition = Arc::new(SearchDefinition::resolve(&decl, &self.schema)?);
        let replaced = self
            .searches
            .write()
            .entry(decl.model.clone())
            .or_default()
            .insert(decl.name.clone(), Arc::clone(&definition));
        tracing::debug!(
            model = decl.model.as_str(),
            name = decl.name.as_str(),
            fields = definition.as_fields().len(),
            enabled = definition.is_enabled(),
            replaced = replaced.is_some(),
            "registered search"
        );
        Ok(definition)
    }

    /// Declares a named search over `fields`.
    pub fn declare_search(
        &self,
        model: &str,
        name: &str,
        fields: FieldSpec,
    ) -> Result<Arc<SearchDefinition>> {
        self.declare_search_with(model, name, fields, |builder| builder)
    }

    /// Declares a named search, letting `configure` adjust the builder
    /// before it is registered.
    pub fn declare_search_with<F>(
        &self,
        model: &str,
        name: &str,
        fields: FieldSpec,
        configure: F,
    ) -> Result<Arc<SearchDefinition>>
    where
        F: FnOnce(SearchBuilder) -> SearchBuilder,
    {
        let builder = SearchBuilder::new(model).name(name).field_spec(fields);
        self.declare(configure(builder).build())
    }

    /// Makes `fields` searchable under [`DEFAULT_SEARCH_NAME`].
    pub fn searchable_on<I, N>(&self, model: &str, fields: I) -> Result<Arc<SearchDefinition>>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.searchable_on_with(model, fields, |builder| builder)
    }

    /// [`SearchRegistry::searchable_on`] with a builder hook.
    pub fn searchable_on_with<I, N, F>(
        &self,
        model: &str,
        fields: I,
        configure: F,
    ) -> Result<Arc<SearchDefinition>>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
        F: FnOnce(SearchBuilder) -> SearchBuilder,
    {
        let builder = SearchBuilder::new(model).fields(fields);
        self.declare(configure(builder).build())
    }

    /// Registers every declaration in a configuration document, stopping
    /// at the first error.
    pub fn load_config(&self, config: &SearchConfig) -> Result<Vec<Arc<SearchDefinition>>> {
        config
            .searches
            .iter()
            .map(|decl| self.declare(decl.clone()))
            .collect()
    }

    /// Looks up a registered search.
    pub fn definition(&self, model: &str, name: &str) -> Option<Arc<SearchDefinition>> {
        self.searches.read().get(model)?.get(name).cloned()
    }

    /// Names of the searches registered for a model, sorted.
    pub fn names(&self, model: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .searches
            .read()
            .get(model)
            .map(|searches| searches.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Compiles `query` with a registered search.
    ///
    /// With `extra_fields`, the query runs against the stored fields plus
    /// the extras; the stored definition is not modified.
    pub fn invoke(
        &self,
        model: &str,
        name: &str,
        query: &str,
        extra_fields: &[&str],
    ) -> Result<CompiledFilter> {
        let definition =
            self.definition(model, name)
                .ok_or_else(|| SearchError::UnknownSearch {
                    model: model.to_string(),
                    name: name.to_string(),
                })?;
        if extra_fields.is_empty() {
            return Ok(definition.compile(query));
        }
        let extra: Vec<String> = extra_fields.iter().map(|f| f.to_string()).collect();
        let transient = definition.with_extra_fields(&extra, &self.schema)?;
        Ok(transient.compile(query))
    }

    /// Compiles `query` with a registered search and applies it to `items`.
    pub fn search<'a, T, F>(
        &self,
        model: &str,
        name: &str,
        query: &str,
        extra_fields: &[&str],
        items: &'a [T],
        accessor: F,
    ) -> Result<Vec<&'a T>>
    where
        for<'b> F: Fn(&'b T, &FieldRef) -> Value<'b>,
    {
        let filter = self.invoke(model, name, query, extra_fields)?;
        Ok(filter.filter(items, accessor))
    }

    /// Compiles `query` against an ad-hoc field list without registering
    /// anything.
    pub fn scoped_search<I, N>(&self, model: &str, query: &str, fields: I) -> Result<CompiledFilter>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let decl = SearchBuilder::new(model).fields(fields).build();
        let definition = SearchDefinition::resolve(&decl, &self.schema)?;
        Ok(definition.compile(query))
    }
}

impl<S> std::fmt::Debug for SearchRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let searches = self.searches.read();
        let mut models: Vec<&String> = searches.keys().collect();
        models.sort();
        f.debug_struct("SearchRegistry")
            .field("models", &models)
            .finish()
    }
}
