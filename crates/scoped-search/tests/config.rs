//! Loading schemas and search declarations from configuration documents.

use scoped_search::{
    FieldSpec, FilterExpr, MemorySchema, SchemaView, SearchConfig, SearchError, SearchRegistry,
    ValueType,
};

const SCHEMA: &str = r#"
models:
  post:
    table: posts
    columns:
      - { name: title, type: string }
      - { name: body, type: text }
      - { name: views, type: integer }
      - { name: published_on, type: date }
    associations:
      - { name: author, target: user }
  user:
    table: users
    columns:
      - { name: name, type: string }
      - { name: password_digest, type: string }
"#;

const SEARCHES: &str = r#"
searches:
  - model: post
    fields: [title, body, author_name]
  - model: post
    name: by_title
    fields: { only: [title] }
  - model: user
    fields: { except: [password_digest] }
  - model: comment
"#;

fn loaded() -> SearchRegistry<MemorySchema> {
    let schema = MemorySchema::from_yaml(SCHEMA).unwrap();
    let registry = SearchRegistry::new(schema);
    let config = SearchConfig::from_yaml(SEARCHES).unwrap();
    registry.load_config(&config).unwrap();
    registry
}

#[test]
fn schema_document_drives_the_schema_view() {
    let schema = MemorySchema::from_yaml(SCHEMA).unwrap();
    assert_eq!(schema.table_name("post"), "posts");
    assert_eq!(
        schema.column_type("post", "published_on"),
        Some(ValueType::Date)
    );
    assert_eq!(schema.associations("post").len(), 1);
}

#[test]
fn every_declaration_is_registered() {
    let registry = loaded();
    assert_eq!(registry.names("post"), ["by_title", "search_for"]);
    assert_eq!(registry.names("user"), ["search_for"]);
    assert_eq!(registry.names("comment"), ["search_for"]);
}

#[test]
fn declared_field_shapes_resolve() {
    let registry = loaded();

    let post = registry.definition("post", "search_for").unwrap();
    assert_eq!(post.as_fields(), ["title", "body", "author_name"]);
    assert_eq!(
        post.field_spec(),
        &FieldSpec::fields(["title", "body", "author_name"])
    );

    let by_title = registry.definition("post", "by_title").unwrap();
    assert_eq!(by_title.as_fields(), ["title"]);

    let user = registry.definition("user", "search_for").unwrap();
    assert_eq!(user.as_fields(), ["name"]);
}

#[test]
fn undeclared_models_load_disabled() {
    let registry = loaded();
    let comment = registry.definition("comment", "search_for").unwrap();
    assert!(!comment.is_enabled());
    let filter = registry
        .invoke("comment", "search_for", "anything", &[])
        .unwrap();
    assert_eq!(filter.predicate, Some(FilterExpr::Never));
}

#[test]
fn loaded_searches_compile() {
    let registry = loaded();
    let filter = registry
        .invoke("post", "search_for", "author_name:ann", &[])
        .unwrap();
    assert_eq!(filter.joins, ["author"]);

    let filter = registry
        .invoke("post", "by_title", "views:3", &["views"])
        .unwrap();
    assert_eq!(filter.to_string(), "views eq 3");
}

#[test]
fn bad_declaration_stops_loading() {
    let schema = MemorySchema::from_yaml(SCHEMA).unwrap();
    let registry = SearchRegistry::new(schema);
    let config = SearchConfig::from_yaml(
        r#"
searches:
  - model: post
    fields: [title]
  - model: post
    name: broken
    fields: [headline]
  - model: user
"#,
    )
    .unwrap();

    let err = registry.load_config(&config).unwrap_err();
    assert!(matches!(
        err,
        SearchError::UnknownField { ref field, .. } if field == "headline"
    ));
    assert_eq!(registry.names("post"), ["search_for"]);
    assert!(registry.names("user").is_empty());
}

#[test]
fn json_documents_work_too() {
    let schema = MemorySchema::from_json(
        r#"{"models": {"tag": {"columns": [{"name": "label", "type": "string"}]}}}"#,
    )
    .unwrap();
    let registry = SearchRegistry::new(schema);
    let config =
        SearchConfig::from_json(r#"{"searches": [{"model": "tag", "fields": []}]}"#).unwrap();
    registry.load_config(&config).unwrap();
    assert_eq!(
        registry.definition("tag", "search_for").unwrap().as_fields(),
        ["label"]
    );
}
