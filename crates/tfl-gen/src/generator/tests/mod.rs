use std::path::{Path, PathBuf};

use crate::{
  generator::{
    ast::{GeneratedModel, ModelKind, Primitive, TypeDescriptor},
    document::SchemaDocument,
    metrics::GenerationWarning,
    orchestrator::{GeneratedOutput, GeneratorConfig, Orchestrator, ResolvedModels, write_files},
    policy::RenamePolicy,
  },
  utils::spec::load_documents,
};

const LINE: &str = include_str!("../../../fixtures/line.json");
const SEARCH: &str = include_str!("../../../fixtures/search.json");
const CYCLE: &str = include_str!("../../../fixtures/cycle.json");
const DEGRADED: &str = include_str!("../../../fixtures/degraded.json");

fn documents(sources: &[(&str, &str)]) -> Vec<SchemaDocument> {
  sources
    .iter()
    .map(|(file, json)| SchemaDocument::new(*file, serde_json::from_str(json).unwrap()).unwrap())
    .collect()
}

fn orchestrator(sources: &[(&str, &str)]) -> Orchestrator {
  Orchestrator::new(
    documents(sources),
    RenamePolicy::builtin().unwrap(),
    GeneratorConfig::default(),
  )
}

fn resolve(sources: &[(&str, &str)]) -> ResolvedModels {
  orchestrator(sources).resolve().unwrap()
}

fn generate(sources: &[(&str, &str)]) -> GeneratedOutput {
  orchestrator(sources).generate().unwrap()
}

fn file<'a>(output: &'a GeneratedOutput, path: &str) -> &'a str {
  output
    .files
    .get(Path::new(path))
    .unwrap_or_else(|| panic!("{path} not generated; have {:?}", output.files.keys().collect::<Vec<_>>()))
}

fn compact(source: &str) -> String {
  source.chars().filter(|c| !c.is_whitespace()).collect()
}

fn assert_source_contains(source: &str, fragment: &str) {
  assert!(
    compact(source).contains(&compact(fragment)),
    "missing `{fragment}` in:\n{source}"
  );
}

fn field_idents(model: &GeneratedModel) -> Vec<&str> {
  model.fields().iter().map(|f| f.ident.as_str()).collect()
}

fn field_type<'a>(model: &'a GeneratedModel, ident: &str) -> &'a TypeDescriptor {
  &model.fields().iter().find(|f| f.ident == ident).unwrap().ty
}

#[test]
fn test_shared_schema_name_resolves_per_api() {
  let resolved = resolve(&[("line.json", LINE), ("search.json", SEARCH)]);

  let severity = &resolved.models["StatusSeverity"];
  assert_eq!(field_idents(severity), ["modeName", "severityLevel", "description"]);

  let search = &resolved.models["SearchResponse"];
  assert_eq!(
    field_type(search, "matches"),
    &TypeDescriptor::list(TypeDescriptor::named("SearchMatch"))
  );
  assert_eq!(field_type(search, "from_field"), &TypeDescriptor::Primitive(Primitive::Integer));

  assert!(resolved.models.contains_key("Mode"));
  assert!(resolved.models.contains_key("SearchMatch"));
  assert!(!resolved.models.contains_key("Model_2"));
  assert_eq!(resolved.registry.get("Tfl-2"), Some("SearchResponse"));

  let search_api = resolved.apis.iter().find(|api| api.title == "Search").unwrap();
  assert_eq!(search_api.endpoints[0].response_model, "SearchResponse");
}

#[test]
fn test_mutual_references_break_one_field() {
  let resolved = resolve(&[("cycle.json", CYCLE)]);

  assert!(resolved.models["A"].cyclic);
  assert!(resolved.models["B"].cyclic);
  assert_eq!(field_type(&resolved.models["A"], "bs"), &TypeDescriptor::list(TypeDescriptor::named("B")));
  assert_eq!(field_type(&resolved.models["B"], "a"), &TypeDescriptor::Forward("A".into()));
  assert_eq!(resolved.stats.cycles_detected, 1);
  assert_eq!(resolved.stats.forward_refs, 1);
  assert_eq!(resolved.analysis.order, ["B", "A"]);
  assert!(
    resolved
      .stats
      .warnings
      .contains(&GenerationWarning::UnmappedApi { title: "Cycle".into() })
  );

  let output = generate(&[("cycle.json", CYCLE)]);
  let a = file(&output, "models/a.rs");
  assert_source_contains(a, "use super::b::B;");
  assert_source_contains(a, "pub bs: Option<Vec<B>>");
  assert_source_contains(a, "size_of::<A>()");

  let b = file(&output, "models/b.rs");
  assert_source_contains(b, "use super::a::A;");
  assert_source_contains(b, "pub a: Option<Box<A>>");
  assert_source_contains(b, "size_of::<B>()");

  assert_eq!(file(&output, "class_diagram.mmd"), "classDiagram\n    A --> B\n    B ..> A\n");
  assert_source_contains(file(&output, "models/mod.rs"), "pub const MODELS: &[&str] = &[\"B\", \"A\"];");
}

#[test]
fn test_array_responses_use_list_aliases() {
  let resolved = resolve(&[("line.json", LINE)]);
  let api = &resolved.apis[0];
  let responses = api
    .endpoints
    .iter()
    .map(|e| (e.operation_id.as_str(), e.response_model.as_str()))
    .collect::<Vec<_>>();

  assert_eq!(
    responses,
    [
      ("Line_MetaModes", "ModeArray"),
      ("Line_MetaSeverity", "ArrayOfStatusSeverities"),
      ("Line_Get", "ArrayOfLine"),
      ("Line_Arrivals", "LineStatusArray"),
      ("Line_StatusByIds", "ArrayOfLine"),
    ]
  );
  assert_eq!(
    resolved.models["LineStatusArray"].kind,
    ModelKind::ListAlias {
      item: TypeDescriptor::named("LineStatus")
    }
  );

  let output = generate(&[("line.json", LINE)]);
  let config = file(&output, "clients/line_config.rs");
  assert_source_contains(
    config,
    "Endpoint::new(\"Line_StatusByIds\", HttpMethod::Get, \"/Line/{0}/Status\", \"ArrayOfLine\"",
  );
  assert_source_contains(
    config,
    "Endpoint::new(\"Line_Arrivals\", HttpMethod::Get, \"/Line/{0}/Arrivals/{1}\", \"LineStatusArray\"",
  );

  let registry = file(&output, "models/registry.rs");
  assert_source_contains(registry, "ArrayOfLine(ArrayOfLine)");
  assert_source_contains(registry, "LineStatusArray(LineStatusArray)");
}

#[test]
fn test_array_without_items_degrades() {
  let resolved = resolve(&[("degraded.json", DEGRADED)]);

  assert_eq!(
    resolved.models["Bare"].kind,
    ModelKind::ListAlias {
      item: TypeDescriptor::Any
    }
  );
  assert_eq!(resolved.models["Settings"].kind, ModelKind::Open);

  let warnings = &resolved.stats.warnings;
  assert!(warnings.contains(&GenerationWarning::MissingArrayItems {
    location: "Bare".into()
  }));
  assert!(warnings.contains(&GenerationWarning::OpenObject {
    model: "Settings".into()
  }));
  assert!(warnings.contains(&GenerationWarning::GenericResponse {
    operation_id: "Degraded_Text".into()
  }));

  let output = generate(&[("degraded.json", DEGRADED)]);
  let bare = file(&output, "models/bare.rs");
  assert_source_contains(bare, "use serde_json::Value;");
  assert_source_contains(bare, "pub type Bare = Vec<Value>;");
  assert_source_contains(
    file(&output, "clients/degraded.rs"),
    "send_request_and_deserialize::<GenericResponseModel>(&degraded_config::TEXT",
  );
}

#[test]
fn test_reserved_field_keeps_wire_name() {
  let resolved = resolve(&[("line.json", LINE)]);
  let line = &resolved.models["Line"];
  let class = line.fields().iter().find(|f| f.wire_name == "class").unwrap();
  assert_eq!(class.ident, "class_field");
  assert!(!class.required);
  assert!(line.fields().iter().find(|f| f.ident == "id").unwrap().required);
  assert_eq!(field_type(line, "modeName"), &TypeDescriptor::named("ModeNameEnum"));

  let output = generate(&[("line.json", LINE)]);
  let source = file(&output, "models/line.rs");
  assert_source_contains(
    source,
    "#[serde(rename = \"class\", default, skip_serializing_if = \"Option::is_none\")]",
  );
  assert_source_contains(source, "pub class_field: Option<String>");
  assert_source_contains(source, "/// Service class of the line");
  assert_source_contains(source, "#[serde(rename = \"id\")] pub id: String");
}

#[test]
fn test_client_marshals_line_parameters() {
  let output = generate(&[("line.json", LINE)]);
  let client = file(&output, "clients/line.rs");

  assert_source_contains(client, "pub struct LineClient");
  assert_source_contains(
    client,
    "pub async fn arrivals(&self, ids: Vec<String>, stopPointId: String, direction: Option<DirectionEnum>, destinationStationId: Option<String>)",
  );
  assert_source_contains(client, "vec![param_value(&ids), param_value(&stopPointId)]");
  assert_source_contains(client, "if let Some(value) = &direction");
  assert_source_contains(client, "/// No parameters required.");
  assert_source_contains(client, "///   - Example: `940GZZLUASL`");
  assert_source_contains(file(&output, "clients/mod.rs"), "pub use line::LineClient;");
}

#[test]
fn test_dangling_reference_is_fatal() {
  let broken = r##"{
    "openapi": "3.0.1",
    "info": { "title": "Broken", "version": "v1" },
    "paths": {},
    "components": {
      "schemas": {
        "Holder": { "type": "object", "properties": { "gone": { "$ref": "#/components/schemas/Gone" } } }
      }
    }
  }"##;
  let error = orchestrator(&[("broken.json", broken)]).generate().unwrap_err();
  assert!(format!("{error:#}").contains("#/components/schemas/Gone"), "{error:#}");
}

#[test]
fn test_unknown_parameter_model_degrades_to_value() {
  let dangling = r##"{
    "openapi": "3.0.1",
    "info": { "title": "Dangling", "version": "v1" },
    "paths": {
      "/Modes": {
        "get": {
          "operationId": "Dangling_Modes",
          "parameters": [
            { "name": "mode", "in": "query", "schema": { "$ref": "#/components/parameters/Missing" } }
          ],
          "responses": {
            "200": {
              "description": "OK",
              "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Mode" } } }
            }
          }
        }
      }
    },
    "components": {
      "schemas": {
        "Mode": { "type": "object", "properties": { "name": { "type": "string" } } }
      }
    }
  }"##;
  let resolved = resolve(&[("dangling.json", dangling)]);

  let endpoint = &resolved.apis[0].endpoints[0];
  assert_eq!(endpoint.query_params[0].name, "mode");
  assert_eq!(endpoint.query_params[0].ty, TypeDescriptor::Any);
  assert!(
    resolved.stats.warnings.contains(&GenerationWarning::DanglingType {
      location: "[Dangling_Modes] parameter 'mode'".into(),
      name: "Missing".into(),
    }),
    "{:?}",
    resolved.stats.warnings
  );

  let output = generate(&[("dangling.json", dangling)]);
  assert!(
    output
      .files
      .iter()
      .any(|(path, source)| path.starts_with("clients") && compact(source).contains("mode:Option<Value>")),
    "no client takes `mode: Option<Value>`"
  );
}

#[test]
fn test_every_reference_names_a_generated_model() {
  let resolved = resolve(&[
    ("cycle.json", CYCLE),
    ("degraded.json", DEGRADED),
    ("line.json", LINE),
    ("search.json", SEARCH),
  ]);

  let mut dangling = vec![];
  for model in resolved.models.values() {
    for (target, _) in model.references() {
      if !resolved.models.contains_key(target) {
        dangling.push(format!("{} -> {target}", model.name));
      }
    }
  }
  for endpoint in resolved.apis.iter().flat_map(|api| &api.endpoints) {
    if !resolved.models.contains_key(&endpoint.response_model) {
      dangling.push(format!("{} -> {}", endpoint.operation_id, endpoint.response_model));
    }
    for param in endpoint.path_params.iter().chain(&endpoint.query_params) {
      if let Some(target) = param.ty.referenced_model()
        && !resolved.models.contains_key(target)
      {
        dangling.push(format!("{}.{} -> {target}", endpoint.operation_id, param.name));
      }
    }
  }
  assert!(dangling.is_empty(), "{dangling:?}");
  assert!(
    !resolved
      .stats
      .warnings
      .iter()
      .any(|w| matches!(w, GenerationWarning::DanglingType { .. }))
  );
}

#[test]
fn test_stats_cover_every_stage() {
  let output = generate(&[
    ("cycle.json", CYCLE),
    ("degraded.json", DEGRADED),
    ("line.json", LINE),
    ("search.json", SEARCH),
  ]);
  let stats = &output.stats;

  assert_eq!(stats.documents_loaded, 4);
  assert_eq!(stats.clients_generated, 4);
  assert_eq!(stats.endpoints_generated, 9);
  assert_eq!(stats.cycles_detected, 1);
  assert!(stats.schemas_renamed >= 10);
  assert_eq!(stats.files_written, output.files.len());
  assert_eq!(
    stats.models_generated,
    stats.records_generated
      + stats.list_aliases_generated
      + stats.enums_generated
      + stats.open_models_generated
      + stats.scalars_generated
  );
}

async fn generate_into(input: &Path, output: &Path) -> Vec<(PathBuf, String)> {
  let documents = load_documents(input).await.unwrap();
  let generated = Orchestrator::new(documents, RenamePolicy::builtin().unwrap(), GeneratorConfig::default())
    .generate()
    .unwrap();
  write_files(output, &generated.files).await.unwrap();

  let mut files = vec![];
  for relative in generated.files.keys() {
    let contents = tokio::fs::read_to_string(output.join(relative)).await.unwrap();
    files.push((relative.clone(), contents));
  }
  files
}

#[tokio::test]
async fn test_generation_is_deterministic() {
  let input = tempfile::tempdir().unwrap();
  for (name, json) in [
    ("line.json", LINE),
    ("search.json", SEARCH),
    ("cycle.json", CYCLE),
    ("degraded.json", DEGRADED),
  ] {
    tokio::fs::write(input.path().join(name), json).await.unwrap();
  }
  tokio::fs::write(input.path().join("notes.txt"), "ignored").await.unwrap();

  let first = tempfile::tempdir().unwrap();
  let second = tempfile::tempdir().unwrap();
  let a = generate_into(input.path(), first.path()).await;
  let b = generate_into(input.path(), second.path()).await;

  assert!(!a.is_empty());
  assert_eq!(a, b);
  assert!(first.path().join("models/registry.rs").is_file());
  assert!(first.path().join("clients/search_config.rs").is_file());
}
