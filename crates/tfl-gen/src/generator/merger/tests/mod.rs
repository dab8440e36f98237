use serde_json::json;

use super::*;

fn document(file_name: &str, title: &str, schemas: Value) -> SchemaDocument {
  SchemaDocument::new(
    file_name,
    json!({
      "openapi": "3.0.1",
      "info": { "title": title, "version": "v1" },
      "paths": {
        "/Holder": { "get": { "responses": { "200": { "description": "OK", "content": {
          "application/json": { "schema": { "$ref": "#/components/schemas/Alpha" } }
        }}}}}
      },
      "components": { "schemas": schemas }
    }),
  )
  .unwrap()
}

fn string_object(field: &str, description: &str) -> Value {
  json!({
    "type": "object",
    "description": description,
    "properties": { field: { "type": "string", "description": description } }
  })
}

fn chained_schemas() -> Value {
  json!({
    "Alpha": string_object("id", "first"),
    "AlphaLong": string_object("id", "second"),
    "Holder": { "type": "object", "properties": { "a": { "$ref": "#/components/schemas/Alpha" } } },
    "HolderTwo": { "type": "object", "properties": { "a": { "$ref": "#/components/schemas/AlphaLong" } } }
  })
}

#[test]
fn test_merge_overwrites_in_file_name_order() {
  let docs = vec![
    document("b_search.json", "Search", json!({ "Shared": string_object("b", "") })),
    document("a_line.json", "Line", json!({ "Shared": string_object("a", ""), "Only": string_object("x", "") })),
  ];

  let (merged, warnings) = SchemaMerger::default().merge(docs);

  assert_eq!(merged.schemas.keys().collect::<Vec<_>>(), ["Only", "Shared"]);
  assert!(merged.schemas["Shared"]["properties"].get("b").is_some());
  assert_eq!(
    warnings,
    vec![GenerationWarning::SchemaOverwritten {
      name: "Shared".into(),
      document: "b_search.json".into(),
    }]
  );
  assert_eq!(merged.apis.iter().map(|a| a.title.as_str()).collect::<Vec<_>>(), ["Line", "Search"]);
  assert!(merged.apis.iter().all(|a| a.schemas().is_some_and(|s| s.is_empty())));
}

#[test]
fn test_deduplicate_reaches_fixed_point() {
  let (mut merged, _) = SchemaMerger::default().merge(vec![document("line.json", "Line", chained_schemas())]);

  let report = SchemaMerger::default().deduplicate(&mut merged).unwrap();

  assert_eq!(report.passes, 3);
  assert_eq!(report.removed, 2);
  assert_eq!(merged.schemas.keys().collect::<Vec<_>>(), ["AlphaLong", "HolderTwo"]);
  assert_eq!(
    merged.apis[0].value["paths"]["/Holder"]["get"]["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
    "#/components/schemas/AlphaLong"
  );

  let hashes = merged
    .schemas
    .values()
    .map(|schema| CanonicalSchema::from_value(schema).unwrap())
    .collect::<std::collections::BTreeSet<_>>();
  assert_eq!(hashes.len(), merged.schemas.len());
  SchemaMerger::verify_references(&merged).unwrap();
}

#[test]
fn test_deduplicate_reports_non_convergence() {
  let (mut merged, _) = SchemaMerger::default().merge(vec![document("line.json", "Line", chained_schemas())]);

  let err = SchemaMerger::builder()
    .max_passes(1)
    .build()
    .deduplicate(&mut merged)
    .unwrap_err();

  match err.downcast_ref::<GenerationError>() {
    Some(GenerationError::DedupDidNotConverge { iterations, names }) => {
      assert_eq!(*iterations, 1);
      assert_eq!(names, &["Holder".to_string()]);
    }
    other => panic!("unexpected error: {other:?}"),
  }
}

#[test]
fn test_canonical_form_ignores_documentation_only() {
  let cases = [
    (string_object("id", "a"), string_object("id", "b"), true),
    (string_object("title", ""), string_object("name", ""), false),
    (
      json!({ "type": "object", "required": ["a", "b"] }),
      json!({ "type": "object", "required": ["b", "a"], "summary": "x" }),
      true,
    ),
    (
      json!({ "type": "string", "enum": ["a", "b"] }),
      json!({ "type": "string", "enum": ["a", "c"] }),
      false,
    ),
  ];

  for (left, right, equal) in cases {
    let same = CanonicalSchema::from_value(&left).unwrap() == CanonicalSchema::from_value(&right).unwrap();
    assert_eq!(same, equal, "{left} vs {right}");
  }
}

#[test]
fn test_survivor_prefers_longest_then_smallest_name() {
  let cases: [(&[&str], &str); 3] = [
    (&["Line", "LineLong"], "LineLong"),
    (&["Bbb", "Aaa"], "Aaa"),
    (&["Mode", "Model_2", "StatusX"], "Model_2"),
  ];
  for (names, expected) in cases {
    assert_eq!(preferred_survivor(names), Some(expected));
  }
}

#[test]
fn test_verify_references_lists_dangling_pointers() {
  let (merged, _) = SchemaMerger::default().merge(vec![document(
    "line.json",
    "Line",
    json!({ "Holder": { "type": "object", "properties": { "m": { "$ref": "#/components/schemas/Missing" } } } }),
  )]);

  let err = SchemaMerger::verify_references(&merged).unwrap_err();

  let GenerationError::UnresolvedReferences { refs } = err else {
    panic!("unexpected error: {err}");
  };
  let targets = refs.iter().map(|site| site.ref_path.as_str()).collect::<Vec<_>>();
  assert_eq!(targets, ["#/components/schemas/Missing", "#/components/schemas/Alpha"]);
  assert_eq!(refs[0].location, "#/components/schemas/Holder/properties/m");
  assert_eq!(
    refs[1].location,
    "line.json#/paths/~1Holder/get/responses/200/content/application~1json/schema"
  );
}
