use std::collections::BTreeMap;

use http::Method;

use super::{ModuleNames, client::ClientGenerator, config, diagram, generate_source, index, models::ModelGenerator, registry};
use crate::generator::{
  analyzer::DependencyGraph,
  ast::{
    ApiDescriptor, Documentation, EndpointDescriptor, EnumVariant, FieldDef, GeneratedModel, ModelKind,
    ParamDescriptor, ParamLocation, Primitive, TypeDescriptor,
  },
};

/// Strips whitespace and trailing commas so assertions ignore line breaking.
fn compact(source: &str) -> String {
  let squeezed = source.chars().filter(|c| !c.is_whitespace()).collect::<String>();
  squeezed.replace(",)", ")").replace(",]", "]").replace(",}", "}")
}

fn assert_contains(source: &str, fragment: &str) {
  let fragment_compact = compact(fragment);
  assert!(
    compact(source).contains(fragment_compact.trim_end_matches(',')),
    "missing `{fragment}` in:\n{source}"
  );
}

fn string() -> TypeDescriptor {
  TypeDescriptor::Primitive(Primitive::String)
}

fn field(ident: &str, wire: &str, ty: TypeDescriptor, required: bool) -> FieldDef {
  FieldDef::builder()
    .ident(ident)
    .wire_name(wire)
    .ty(ty)
    .required(required)
    .build()
}

fn model_map(models: impl IntoIterator<Item = GeneratedModel>) -> BTreeMap<String, GeneratedModel> {
  models.into_iter().map(|m| (m.name.clone(), m)).collect()
}

fn line_model() -> GeneratedModel {
  GeneratedModel::builder()
    .name("Line")
    .docs(Documentation::from_lines(["A tube, bus or rail line."]))
    .kind(ModelKind::Record {
      fields: vec![
        field("id", "id", string(), true),
        field("class_field", "class", string(), false),
        field("modeName", "modeName", TypeDescriptor::named("ModeNameEnum"), false),
        field("tags", "tags", TypeDescriptor::Map, false),
      ],
    })
    .build()
}

fn mode_enum() -> GeneratedModel {
  GeneratedModel::builder()
    .name("ModeNameEnum")
    .kind(ModelKind::Enum {
      variants: vec![
        EnumVariant {
          tag: "TUBE".into(),
          value: "tube".into(),
        },
        EnumVariant {
          tag: "REAL_TIME".into(),
          value: "real-time".into(),
        },
      ],
    })
    .build()
}

fn line_api() -> ApiDescriptor {
  let ids = ParamDescriptor::builder()
    .name("ids")
    .ident("ids")
    .ty(TypeDescriptor::list(string()))
    .location(ParamLocation::Path)
    .required(true)
    .description("Line ids")
    .example("victoria")
    .build();
  let direction = ParamDescriptor::builder()
    .name("direction")
    .ident("direction")
    .ty(TypeDescriptor::named("ModeNameEnum"))
    .location(ParamLocation::Query)
    .build();
  let kind = ParamDescriptor::builder()
    .name("type")
    .ident("type_field")
    .ty(TypeDescriptor::Primitive(Primitive::Integer))
    .location(ParamLocation::Query)
    .required(true)
    .build();

  ApiDescriptor::builder()
    .title("Line")
    .client_name("LineClient")
    .file_stem("line")
    .document("line.json")
    .endpoints(vec![
      EndpointDescriptor::builder()
        .operation_id("Line_Arrivals")
        .method_name("arrivals")
        .method(Method::GET)
        .path("/Line/{ids}/Arrivals")
        .path_params(vec![ids])
        .query_params(vec![kind, direction])
        .response_model("ArrayOfLine")
        .docs(Documentation::from_lines(["Get arrival predictions"]))
        .build(),
      EndpointDescriptor::builder()
        .operation_id("Line_MetaModes")
        .method_name("meta_modes")
        .method(Method::GET)
        .path("/Line/Meta/Modes")
        .response_model("Line")
        .build(),
    ])
    .build()
}

#[test]
fn test_generate_source_adds_header_and_formats() {
  let tokens = quote::quote! { pub struct Empty; };
  let source = generate_source(&tokens, "Model `Empty`").unwrap();
  assert!(source.starts_with("//! AUTO-GENERATED CODE - DO NOT EDIT!\n"));
  assert!(source.contains("//! Model `Empty`\n"));
  assert!(source.contains("pub struct Empty;\n"));
}

#[test]
fn test_module_names_are_unique() {
  let modules = ModuleNames::new(["Line", "line", "LineStatus", "Registry"]);
  assert_eq!(modules.stem("Line"), Some("line"));
  assert_eq!(modules.stem("Registry"), Some("registry_2"));
  assert_eq!(modules.stem("line"), Some("line_2"));
  assert_eq!(modules.stem("LineStatus"), Some("line_status"));
  assert_eq!(modules.stem("Missing"), None);
}

#[test]
fn test_record_model_source() {
  let models = model_map([line_model(), mode_enum()]);
  let modules = ModuleNames::new(models.keys().map(String::as_str));
  let source = ModelGenerator::new(&modules).generate(&models["Line"]).unwrap();

  let fragments = [
    "#![allow(non_snake_case, non_camel_case_types)]",
    "use serde::{Deserialize, Serialize};",
    "use serde_json::Value;",
    "use std::collections::HashMap;",
    "use super::mode_name_enum::ModeNameEnum;",
    "/// A tube, bus or rail line.",
    "#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]",
    "#[serde(rename = \"id\")] pub id: String,",
    "#[serde(rename = \"class\", default, skip_serializing_if = \"Option::is_none\")] pub class_field: Option<String>,",
    "pub modeName: Option<ModeNameEnum>,",
    "pub tags: Option<HashMap<String, Value>>,",
  ];
  for fragment in fragments {
    assert_contains(&source, fragment);
  }
  assert!(!source.contains("size_of"));
}

#[test]
fn test_enum_model_source() {
  let modules = ModuleNames::new(["ModeNameEnum"]);
  let source = ModelGenerator::new(&modules).generate(&mode_enum()).unwrap();

  assert_contains(&source, "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]");
  assert_contains(&source, "#[serde(rename = \"tube\")] TUBE,");
  assert_contains(&source, "#[serde(rename = \"real-time\")] REAL_TIME,");
  assert!(!source.contains("HashMap"));
}

#[test]
fn test_alias_model_sources() {
  let cases = [
    (
      ModelKind::ListAlias {
        item: TypeDescriptor::named("Line"),
      },
      "pub type Alias = Vec<Line>;",
      Some("use super::line::Line;"),
    ),
    (ModelKind::Open, "pub type Alias = HashMap<String, Value>;", Some("use std::collections::HashMap;")),
    (
      ModelKind::Scalar {
        ty: TypeDescriptor::Primitive(Primitive::Integer),
      },
      "pub type Alias = i64;",
      None,
    ),
    (
      ModelKind::ListAlias {
        item: TypeDescriptor::Any,
      },
      "pub type Alias = Vec<Value>;",
      Some("use serde_json::Value;"),
    ),
  ];

  let modules = ModuleNames::new(["Alias", "Line"]);
  for (kind, expected, import) in cases {
    let model = GeneratedModel::builder().name("Alias").kind(kind).build();
    let source = ModelGenerator::new(&modules).generate(&model).unwrap();
    assert_contains(&source, expected);
    if let Some(import) = import {
      assert_contains(&source, import);
    }
    assert!(!source.contains("serde::"), "aliases need no derives:\n{source}");
  }
}

#[test]
fn test_cyclic_model_boxes_forward_fields_and_finalizes() {
  let place = GeneratedModel::builder()
    .name("Place")
    .cyclic(true)
    .kind(ModelKind::Record {
      fields: vec![
        field("parent", "parent", TypeDescriptor::Forward("Place".into()), false),
        field("head", "head", TypeDescriptor::Forward("Place".into()), true),
        field(
          "children",
          "children",
          TypeDescriptor::list(TypeDescriptor::Forward("Place".into())),
          false,
        ),
      ],
    })
    .build();
  let modules = ModuleNames::new(["Place"]);
  let source = ModelGenerator::new(&modules).generate(&place).unwrap();

  assert_contains(&source, "pub parent: Option<Box<Place>>,");
  assert_contains(&source, "pub head: Box<Place>,");
  assert_contains(&source, "pub children: Option<Vec<Place>>,");
  assert_contains(&source, "size_of::<Place>()");
  assert!(!source.contains("use super::place"), "self references need no import:\n{source}");
}

#[test]
fn test_alias_cycle_emits_transparent_newtype() {
  let tree = GeneratedModel::builder()
    .name("Tree")
    .cyclic(true)
    .newtype(true)
    .kind(ModelKind::Scalar {
      ty: TypeDescriptor::Forward("Forest".into()),
    })
    .build();
  let forest = GeneratedModel::builder()
    .name("Forest")
    .cyclic(true)
    .kind(ModelKind::ListAlias {
      item: TypeDescriptor::named("Tree"),
    })
    .build();
  let modules = ModuleNames::new(["Tree", "Forest"]);
  let generator = ModelGenerator::new(&modules);

  let tree_source = generator.generate(&tree).unwrap();
  let cases = [
    "use serde::{Deserialize, Serialize};",
    "use super::forest::Forest;",
    "#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)] #[serde(transparent)]",
    "pub struct Tree(pub Box<Forest>);",
    "size_of::<Tree>()",
  ];
  for fragment in cases {
    assert_contains(&tree_source, fragment);
  }
  assert!(!tree_source.contains("pub type"), "{tree_source}");

  let forest_source = generator.generate(&forest).unwrap();
  assert_contains(&forest_source, "pub type Forest = Vec<Tree>;");
  assert!(!forest_source.contains("use serde"), "{forest_source}");

  let list = GeneratedModel { newtype: true, ..forest };
  assert_contains(&generator.generate(&list).unwrap(), "pub struct Forest(pub Vec<Tree>);");
}

#[test]
fn test_models_index_lists_emission_order() {
  let order = vec!["ModeNameEnum".to_string(), "Line".to_string()];
  let modules = ModuleNames::new(order.iter().map(String::as_str));
  let source = index::models_module(&order, &modules).unwrap();

  assert_contains(&source, "mod mode_name_enum; pub use mode_name_enum::ModeNameEnum; mod line; pub use line::Line;");
  assert_contains(&source, "pub mod registry;");
  assert_contains(&source, "pub const MODELS: &[&str] = &[\"ModeNameEnum\", \"Line\"];");
}

#[test]
fn test_clients_index_and_root_module() {
  let source = index::clients_module(&[line_api()]).unwrap();
  assert_contains(&source, "pub mod line_config; mod line; pub use line::LineClient;");
  assert_contains(&source, "pub const APIS: &[&str] = &[\"Line\"];");

  let root = index::root_module().unwrap();
  assert_contains(&root, "pub mod models; pub mod clients;");
}

#[test]
fn test_registry_dispatches_on_model_name() {
  let source = registry::generate(&[line_api()]).unwrap();

  assert_eq!(
    registry::response_models(&[line_api()]).into_iter().collect::<Vec<_>>(),
    ["ArrayOfLine", "Line"]
  );
  assert_contains(&source, "use super::{ArrayOfLine, Line};");
  assert_contains(&source, "pub enum ResponseModel { ArrayOfLine(ArrayOfLine), Line(Line), }");
  assert_contains(&source, "\"ArrayOfLine\" => decode_model(model, value).map(Self::ArrayOfLine),");
  assert_contains(&source, "_ => Err(ModelError::Unknown");
  assert_contains(&source, "Self::Line(_) => \"Line\",");
}

#[test]
fn test_config_uses_positional_uris() {
  let source = config::generate(&line_api()).unwrap();

  assert_contains(
    &source,
    "pub const ARRIVALS: Endpoint = Endpoint::new(\"Line_Arrivals\", HttpMethod::Get, \"/Line/{0}/Arrivals\", \"ArrayOfLine\");",
  );
  assert_contains(&source, "/// `GET /Line/{ids}/Arrivals`");
  assert_contains(&source, "pub const ENDPOINTS: &[Endpoint] = &[ARRIVALS, META_MODES];");
}

#[test]
fn test_client_methods_marshal_parameters() {
  let api = line_api();
  let models = model_map([line_model(), mode_enum()]);
  let source = ClientGenerator::new(&api, &models, "https://api.tfl.gov.uk")
    .generate()
    .unwrap();

  let fragments = [
    "use tfl_gen_support::{ApiError, ResponseModel, RestClient, param_value, reqwest};",
    "use super::super::models::{ArrayOfLine, Line, ModeNameEnum};",
    "use super::line_config;",
    "pub const BASE_URL: &str = \"https://api.tfl.gov.uk\";",
    "pub struct LineClient { client: RestClient, }",
    "pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self",
    "pub async fn arrivals(&self, ids: Vec<String>, type_field: i64, direction: Option<ModeNameEnum>) -> Result<ResponseModel<ArrayOfLine>, ApiError>",
    "let path_params: Vec<String> = vec![param_value(&ids)];",
    "let mut query: Vec<(&str, String)> = vec![(\"type\", param_value(&type_field))];",
    "if let Some(value) = &direction { query.push((\"direction\", param_value(value))); }",
    ".send_request_and_deserialize::<ArrayOfLine>(&line_config::ARRIVALS, &path_params, &query)",
    "/// * `ids` (`Vec<String>`, path)",
    "///   - Description: Line ids",
    "///   - Example: `victoria`",
    "/// * `direction` (`ModeNameEnum`, optional, query)",
    "///   - Description: None given",
    "pub async fn meta_modes(&self) -> Result<ResponseModel<Line>, ApiError>",
    "let query: Vec<(&str, String)> = vec![];",
    "/// No parameters required.",
  ];
  for fragment in fragments {
    assert_contains(&source, fragment);
  }
}

#[test]
fn test_parameter_descriptions_are_kept_verbatim() {
  let mut api = line_api();
  api.endpoints[0].query_params[0].description = Some("Filters  by type,\nfor example `bus`.".into());
  let models = model_map([line_model(), mode_enum()]);
  let source = ClientGenerator::new(&api, &models, "https://api.tfl.gov.uk")
    .generate()
    .unwrap();

  let cases = [
    "///   - Description: Filters  by type,\n",
    "///     for example `bus`.\n",
  ];
  for fragment in cases {
    assert!(source.contains(fragment), "missing `{fragment}` in:\n{source}");
  }
}

#[test]
fn test_diagram_marks_forward_edges() {
  let models = model_map([
    GeneratedModel::builder()
      .name("A")
      .kind(ModelKind::Record {
        fields: vec![field("b", "b", TypeDescriptor::named("B"), true)],
      })
      .build(),
    GeneratedModel::builder()
      .name("B")
      .kind(ModelKind::Record {
        fields: vec![field("a", "a", TypeDescriptor::Forward("A".into()), false)],
      })
      .build(),
  ]);
  let graph = DependencyGraph::build(&models);

  assert_eq!(diagram::generate(&graph), "classDiagram\n    A --> B\n    B ..> A\n");
}
