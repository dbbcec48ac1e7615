//! Field catalog resolution.
//!
//! A [`FieldSpec`] names the fields a search covers. [`resolve`] checks it
//! against a [`SchemaView`] once, at registration time, and produces a
//! [`FieldCatalog`]: the model's own typed columns plus, for each
//! association, the typed columns reached through it.
//!
//! Association fields are written `<association>_<column>`. Given the
//! associations `author` and `author_bio`, the name `author_bio_text`
//! belongs to `author_bio`: the longest matching association name wins.

use serde::{Deserialize, Serialize};

use crate::clause::FieldRef;
use crate::error::{Result, SearchError};
use crate::traits::SchemaView;
use crate::value::ValueType;

/// Which fields a search covers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "FieldSpecRepr", into = "FieldSpecRepr")]
pub enum FieldSpec {
    /// Every column the schema reports for the model.
    #[default]
    All,
    /// Exactly these names (columns or association fields).
    Explicit(Vec<String>),
    /// Only these names. Unlike `Explicit`, an empty list selects nothing.
    Only(Vec<String>),
    /// Every column except these.
    Except(Vec<String>),
}

impl FieldSpec {
    /// An explicit field list.
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldSpec::Explicit(names.into_iter().map(Into::into).collect())
    }

    /// Adds names to the spec. `All` and `Except` are expanded against the
    /// base columns first, so the result is always an explicit list.
    pub fn extend(&self, columns: &[String], extra: &[String]) -> FieldSpec {
        let mut names = self.names(columns);
        for name in extra {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        FieldSpec::Explicit(names)
    }

    /// The flat list of names this spec selects, given the model's columns.
    fn names(&self, columns: &[String]) -> Vec<String> {
        match self {
            FieldSpec::All => columns.to_vec(),
            FieldSpec::Explicit(names) if names.is_empty() => columns.to_vec(),
            FieldSpec::Explicit(names) | FieldSpec::Only(names) => names.clone(),
            FieldSpec::Except(excluded) => columns
                .iter()
                .filter(|c| !excluded.contains(c))
                .cloned()
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FieldSpecRepr {
    List(Vec<String>),
    Only { only: Vec<String> },
    Except { except: Vec<String> },
}

impl From<FieldSpecRepr> for FieldSpec {
    fn from(repr: FieldSpecRepr) -> Self {
        match repr {
            FieldSpecRepr::List(names) if names.is_empty() => FieldSpec::All,
            FieldSpecRepr::List(names) => FieldSpec::Explicit(names),
            FieldSpecRepr::Only { only } => FieldSpec::Only(only),
            FieldSpecRepr::Except { except } => FieldSpec::Except(except),
        }
    }
}

impl From<FieldSpec> for FieldSpecRepr {
    fn from(spec: FieldSpec) -> Self {
        match spec {
            FieldSpec::All => FieldSpecRepr::List(Vec::new()),
            FieldSpec::Explicit(names) => FieldSpecRepr::List(names),
            FieldSpec::Only(only) => FieldSpecRepr::Only { only },
            FieldSpec::Except(except) => FieldSpecRepr::Except { except },
        }
    }
}

/// A resolved, typed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogField {
    /// Where the column lives.
    pub field: FieldRef,
    /// Declared type.
    pub value_type: ValueType,
}

impl CatalogField {
    /// The name used in search strings.
    pub fn qualified_name(&self) -> String {
        self.field.qualified_name()
    }
}

/// Fields reached through one association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationGroup {
    /// Association name.
    pub name: String,
    /// Model the association points to.
    pub target: String,
    /// Table backing the target model.
    pub table: String,
    /// Columns local to the target, association prefix stripped.
    pub fields: Vec<(String, ValueType)>,
}

/// Resolved search fields of one model.
///
/// A catalog for a model whose table does not exist is *disabled*: it has
/// no fields and every non-empty query against it matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCatalog {
    model: String,
    table: String,
    enabled: bool,
    own: Vec<(String, ValueType)>,
    groups: Vec<AssociationGroup>,
}

impl FieldCatalog {
    /// A catalog with no fields, for a model whose table is missing.
    pub fn disabled(model: impl Into<String>) -> Self {
        let model = model.into();
        FieldCatalog {
            table: model.clone(),
            model,
            enabled: false,
            own: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Model this catalog belongs to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Table backing the model.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns `false` if the model's table was missing at resolution time.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns `true` if the catalog has no fields at all.
    pub fn is_empty(&self) -> bool {
        self.own.is_empty() && self.groups.is_empty()
    }

    /// The model's own fields with their types.
    pub fn own_fields(&self) -> &[(String, ValueType)] {
        &self.own
    }

    /// Association groupings, in schema declaration order.
    pub fn groups(&self) -> &[AssociationGroup] {
        &self.groups
    }

    /// Looks up an association grouping by name.
    pub fn group(&self, association: &str) -> Option<&AssociationGroup> {
        self.groups.iter().find(|g| g.name == association)
    }

    /// Every field, own fields first, then each group in order.
    pub fn fields(&self) -> impl Iterator<Item = CatalogField> + '_ {
        let own = self.own.iter().map(|(column, ty)| CatalogField {
            field: FieldRef::own(column.clone()),
            value_type: *ty,
        });
        let grouped = self.groups.iter().flat_map(|group| {
            group.fields.iter().map(move |(column, ty)| CatalogField {
                field: FieldRef::associated(group.name.clone(), column.clone()),
                value_type: *ty,
            })
        });
        own.chain(grouped)
    }

    /// Looks up a field by the name used in search strings.
    pub fn field(&self, qualified: &str) -> Option<CatalogField> {
        self.fields().find(|f| f.qualified_name() == qualified)
    }

    /// Re-expands the catalog to qualified names (`title`, `author_name`).
    pub fn as_fields(&self) -> Vec<String> {
        self.fields().map(|f| f.qualified_name()).collect()
    }

    /// Table holding a field's column.
    pub fn table_for<'a>(&'a self, field: &'a FieldRef) -> &'a str {
        match &field.association {
            Some(association) => self
                .group(association)
                .map(|g| g.table.as_str())
                .unwrap_or(association.as_str()),
            None => &self.table,
        }
    }
}

/// Resolves a field spec against the schema.
///
/// A missing table yields a disabled catalog rather than an error. Names
/// that match neither a column nor an association field, and columns
/// without a declared type, are configuration errors.
pub fn resolve(model: &str, spec: &FieldSpec, schema: &impl SchemaView) -> Result<FieldCatalog> {
    if !schema.table_exists(model) {
        tracing::warn!(model, "table does not exist; search is disabled for this model");
        return Ok(FieldCatalog::disabled(model));
    }

    let columns = schema.column_names(model);
    let mut own_names: Vec<String> = Vec::new();
    let mut candidates: Vec<String> = Vec::new();
    for name in spec.names(&columns) {
        let bucket = if columns.contains(&name) {
            &mut own_names
        } else {
            &mut candidates
        };
        if !bucket.contains(&name) {
            bucket.push(name);
        }
    }

    let mut own = Vec::with_capacity(own_names.len());
    for column in own_names {
        let ty = column_type(schema, model, &column)?;
        own.push((column, ty));
    }

    let associations = schema.associations(model);
    let mut grouped: Vec<Vec<String>> = vec![Vec::new(); associations.len()];
    for candidate in &candidates {
        let owner = associations
            .iter()
            .enumerate()
            .filter(|(_, a)| strip_association(candidate, &a.name).is_some())
            .max_by_key(|(_, a)| a.name.len());
        match owner {
            Some((index, association)) => {
                if let Some(column) = strip_association(candidate, &association.name) {
                    grouped[index].push(column.to_string());
                }
            }
            None => {
                return Err(SearchError::UnknownField {
                    model: model.to_string(),
                    field: candidate.clone(),
                })
            }
        }
    }

    let mut groups = Vec::new();
    for (association, columns) in associations.into_iter().zip(grouped) {
        if columns.is_empty() {
            continue;
        }
        let mut fields = Vec::with_capacity(columns.len());
        for column in columns {
            let ty = column_type(schema, &association.target, &column)?;
            fields.push((column, ty));
        }
        groups.push(AssociationGroup {
            table: schema.table_name(&association.target),
            name: association.name,
            target: association.target,
            fields,
        });
    }

    Ok(FieldCatalog {
        model: model.to_string(),
        table: schema.table_name(model),
        enabled: true,
        own,
        groups,
    })
}

fn strip_association<'a>(candidate: &'a str, association: &str) -> Option<&'a str> {
    candidate
        .strip_prefix(association)?
        .strip_prefix('_')
        .filter(|column| !column.is_empty())
}

fn column_type(schema: &impl SchemaView, model: &str, column: &str) -> Result<ValueType> {
    schema
        .column_type(model, column)
        .ok_or_else(|| SearchError::MissingColumnType {
            model: model.to_string(),
            column: column.to_string(),
        })
}
