use std::{
  collections::{BTreeMap, BTreeSet},
  sync::LazyLock,
};

use anyhow::Context;
use itertools::Itertools;
use mediatype::MediaType;
use oas3::spec::{ObjectOrReference, ObjectSchema, Operation, Parameter, ParameterIn};
use regex::Regex;
use serde_json::{Value, json};

use super::{ModelSet, TypeMapper};
use crate::{
  generator::{
    ast::{
      ApiDescriptor, Documentation, EndpointDescriptor, GeneratedModel, ModelKind, ParamDescriptor, ParamLocation,
      Primitive, TypeDescriptor,
    },
    codegen::CONFIG_SUFFIX,
    errors::GenerationError,
    merger::MergedSpec,
    metrics::GenerationWarning,
  },
  naming::identifiers::{
    api_type_name, client_method_name, fallback_operation_id, module_file_stem, sanitize, sanitize_field_name,
  },
};

pub const GENERIC_RESPONSE_MODEL: &str = "GenericResponseModel";
const ARRAY_SUFFIX: &str = "Array";
/// Local bindings in generated client methods; parameters are renamed around them.
pub const CLIENT_LOCALS: &[&str] = &["path_params", "query", "value"];

static PATH_PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").unwrap());

/// Turns the operations of every merged document into [`ApiDescriptor`]s.
///
/// Response types that need a model of their own (arrays without a matching list alias, untyped
/// bodies) are added to the model set here, before the dependency graph is built.
pub struct EndpointBuilder<'a> {
  merged: &'a MergedSpec,
  set: &'a mut ModelSet,
  mapper: &'a mut TypeMapper,
}

impl<'a> EndpointBuilder<'a> {
  pub fn new(merged: &'a MergedSpec, set: &'a mut ModelSet, mapper: &'a mut TypeMapper) -> Self {
    Self { merged, set, mapper }
  }

  pub fn build(&mut self) -> anyhow::Result<Vec<ApiDescriptor>> {
    let mut stems = BTreeSet::new();
    let mut apis = vec![];

    for api in &self.merged.apis {
      let spec: oas3::Spec = serde_json::from_value(self.merged.document_with_schemas(api))
        .with_context(|| format!("parsing {} as OpenAPI", api.file_name))?;

      let type_name = api_type_name(&api.title);
      let base_stem = module_file_stem(&type_name);
      let file_stem = (1..)
        .map(|n| if n == 1 { base_stem.clone() } else { format!("{base_stem}_{n}") })
        .find(|candidate| !stems.contains(candidate) && !stems.contains(&format!("{candidate}{CONFIG_SUFFIX}")))
        .unwrap_or(base_stem);
      stems.insert(format!("{file_stem}{CONFIG_SUFFIX}"));
      stems.insert(file_stem.clone());

      apis.push(
        ApiDescriptor::builder()
          .title(api.title.as_str())
          .client_name(format!("{type_name}Client"))
          .file_stem(file_stem)
          .document(api.file_name.as_str())
          .endpoints(self.build_api(&spec)?)
          .build(),
      );
    }
    Ok(apis)
  }

  fn build_api(&mut self, spec: &oas3::Spec) -> Result<Vec<EndpointDescriptor>, GenerationError> {
    let mut operations = spec.operations().collect::<Vec<_>>();
    operations.sort_by(|a, b| (a.0.as_str(), a.1.as_str()).cmp(&(b.0.as_str(), b.1.as_str())));

    let mut method_names = BTreeSet::new();
    let mut endpoints = vec![];
    for (path, method, operation) in operations {
      let operation_id = operation
        .operation_id
        .clone()
        .unwrap_or_else(|| fallback_operation_id(method.as_str(), &path));

      let base_name = client_method_name(&operation_id);
      let method_name = (1..)
        .map(|n| if n == 1 { base_name.clone() } else { format!("{base_name}_{n}") })
        .find(|candidate| !method_names.contains(candidate))
        .unwrap_or(base_name);
      method_names.insert(method_name.clone());

      let owner = api_type_name(&method_name);
      let (path_params, query_params) = self.build_params(spec, &path, &operation, &operation_id, &owner);
      let response_model = self.response_model(spec, &operation, &operation_id, &owner)?;

      let mut docs = Documentation::from_optional(operation.summary.as_deref());
      if let Some(description) = operation.description.as_deref()
        && operation.summary.as_deref() != Some(description)
      {
        if !docs.is_empty() {
          docs.push("");
        }
        docs.extend(Documentation::from_raw(description).lines().iter().cloned());
      }

      endpoints.push(
        EndpointDescriptor::builder()
          .operation_id(operation_id)
          .method_name(method_name)
          .method(method.clone())
          .path(path.as_str())
          .path_params(path_params)
          .query_params(query_params)
          .response_model(response_model)
          .docs(docs)
          .build(),
      );
    }
    Ok(endpoints)
  }

  /// Path parameters in template order (placeholders without a declaration become required
  /// strings) and query parameters with the required ones first.
  fn build_params(
    &mut self,
    spec: &oas3::Spec,
    path: &str,
    operation: &Operation,
    operation_id: &str,
    owner: &str,
  ) -> (Vec<ParamDescriptor>, Vec<ParamDescriptor>) {
    let mut declared_path = BTreeMap::new();
    let mut query = vec![];
    let mut idents = CLIENT_LOCALS.iter().map(ToString::to_string).collect::<BTreeSet<_>>();

    for param in collect_parameters(spec, path, operation, operation_id, &mut self.set.warnings) {
      let location = match param.location {
        ParameterIn::Path => ParamLocation::Path,
        ParameterIn::Query => ParamLocation::Query,
        ParameterIn::Header | ParameterIn::Cookie => {
          self.set.warnings.push(GenerationWarning::UnsupportedParameter {
            operation_id: operation_id.to_string(),
            name: param.name.clone(),
            location: format!("{:?}", param.location).to_lowercase(),
          });
          continue;
        }
      };

      let ty = match param.schema.as_ref() {
        Some(schema) => {
          let mapped = self.mapper.map_type(&schema_value(schema), &param.name, owner);
          self.set.absorb(mapped)
        }
        None => TypeDescriptor::Primitive(Primitive::String),
      };
      let descriptor = ParamDescriptor::builder()
        .name(param.name.as_str())
        .ident(unique_ident(&param.name, &mut idents))
        .ty(ty)
        .location(location)
        .required(location == ParamLocation::Path || param.required.unwrap_or(false))
        .maybe_description(param.description.clone())
        .maybe_example(param.example.as_ref().map(example_text))
        .build();

      match location {
        ParamLocation::Path => {
          declared_path.insert(param.name.clone(), descriptor);
        }
        ParamLocation::Query => query.push(descriptor),
      }
    }

    let mut path_params = vec![];
    for name in template_params(path).unique() {
      let descriptor = declared_path.remove(name).unwrap_or_else(|| {
        ParamDescriptor::builder()
          .name(name)
          .ident(unique_ident(name, &mut idents))
          .ty(TypeDescriptor::Primitive(Primitive::String))
          .location(ParamLocation::Path)
          .required(true)
          .build()
      });
      path_params.push(descriptor);
    }
    for name in declared_path.into_keys() {
      self.set.warnings.push(GenerationWarning::UnsupportedParameter {
        operation_id: operation_id.to_string(),
        name,
        location: "path (not in template)".to_string(),
      });
    }

    let (required, optional): (Vec<_>, Vec<_>) = query.into_iter().partition(|p| p.required);
    (path_params, required.into_iter().chain(optional).collect())
  }

  fn response_model(
    &mut self,
    spec: &oas3::Spec,
    operation: &Operation,
    operation_id: &str,
    owner: &str,
  ) -> Result<String, GenerationError> {
    let mapped = success_schema(spec, operation).map(|schema| {
      let mapped = self.mapper.map_type(&schema, "response", owner);
      self.set.absorb(mapped)
    });

    match mapped {
      Some(TypeDescriptor::Named(name)) => {
        if self.set.contains(&name) {
          Ok(name)
        } else {
          Err(GenerationError::UnknownResponseModel {
            operation: operation_id.to_string(),
            model: name,
          })
        }
      }
      Some(TypeDescriptor::List(item)) if matches!(item.as_ref(), TypeDescriptor::Named(_)) => {
        Ok(self.list_alias_for(*item))
      }
      _ => {
        self.set.warnings.push(GenerationWarning::GenericResponse {
          operation_id: operation_id.to_string(),
        });
        Ok(self.generic_response_model())
      }
    }
  }

  /// An existing list alias over `item`, or a new `{Item}Array` alias.
  fn list_alias_for(&mut self, item: TypeDescriptor) -> String {
    if let Some(existing) = self
      .set
      .models
      .values()
      .find(|model| model.list_item() == Some(&item))
    {
      return existing.name.clone();
    }

    let base = sanitize(&format!("{}{ARRAY_SUFFIX}", item.referenced_model().unwrap_or_default()));
    let name = (1..)
      .map(|n| if n == 1 { base.clone() } else { format!("{base}{n}") })
      .find(|candidate| !self.set.contains(candidate))
      .unwrap_or(base);

    self.set.insert(
      GeneratedModel::builder()
        .name(name.as_str())
        .kind(ModelKind::ListAlias { item })
        .source(name.as_str())
        .build(),
    );
    name
  }

  fn generic_response_model(&mut self) -> String {
    if !self.set.contains(GENERIC_RESPONSE_MODEL) {
      self.set.insert(
        GeneratedModel::builder()
          .name(GENERIC_RESPONSE_MODEL)
          .kind(ModelKind::Scalar { ty: TypeDescriptor::Any })
          .source(GENERIC_RESPONSE_MODEL)
          .docs(Documentation::from_lines(["Response body without a typed JSON schema."]))
          .build(),
      );
    }
    GENERIC_RESPONSE_MODEL.to_string()
  }
}

/// Path-item parameters overridden by operation parameters of the same name and location.
///
/// References that do not resolve are skipped with a warning.
fn collect_parameters(
  spec: &oas3::Spec,
  path: &str,
  operation: &Operation,
  operation_id: &str,
  warnings: &mut Vec<GenerationWarning>,
) -> Vec<Parameter> {
  let mut resolve = |param: &ObjectOrReference<Parameter>| {
    param
      .resolve(spec)
      .inspect_err(|_| {
        let name = match param {
          ObjectOrReference::Ref { ref_path, .. } => ref_path.clone(),
          ObjectOrReference::Object(param) => param.name.clone(),
        };
        warnings.push(GenerationWarning::UnsupportedParameter {
          operation_id: operation_id.to_string(),
          name,
          location: "unresolved".to_string(),
        });
      })
      .ok()
  };
  let mut params = vec![];

  if let Some(path_item) = spec.paths.as_ref().and_then(|p| p.get(path)) {
    params.extend(path_item.parameters.iter().filter_map(&mut resolve));
  }

  for param in operation.parameters.iter().filter_map(&mut resolve) {
    params.retain(|p| p.location != param.location || p.name != param.name);
    params.push(param);
  }

  params
}

/// The JSON schema of the `200` response, or of the first other `2xx` response.
fn success_schema(spec: &oas3::Spec, operation: &Operation) -> Option<Value> {
  let responses = operation.responses.as_ref()?;
  let status = if responses.contains_key("200") {
    "200"
  } else {
    responses.keys().find(|code| code.starts_with('2'))?.as_str()
  };
  let response = responses.get(status)?.resolve(spec).ok()?;

  response
    .content
    .iter()
    .filter(|(content_type, _)| is_json_content_type(content_type))
    .find_map(|(_, media_type)| media_type.schema.as_ref())
    .map(schema_value)
}

pub fn is_json_content_type(content_type: &str) -> bool {
  let Ok(media) = MediaType::parse(content_type) else {
    return false;
  };
  let suffix = media.suffix.as_ref().map(mediatype::Name::as_str);

  matches!(
    (media.ty.as_str(), media.subty.as_str(), suffix),
    ("application" | "text", "json", _) | (_, _, Some("json"))
  )
}

fn schema_value(schema: &ObjectOrReference<ObjectSchema>) -> Value {
  match schema {
    ObjectOrReference::Ref { ref_path, .. } => json!({ "$ref": ref_path }),
    ObjectOrReference::Object(schema) => serde_json::to_value(schema).unwrap_or_default(),
  }
}

pub fn template_params(path: &str) -> impl Iterator<Item = &str> {
  PATH_PLACEHOLDER_RE
    .captures_iter(path)
    .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

fn unique_ident(name: &str, taken: &mut BTreeSet<String>) -> String {
  let base = sanitize_field_name(name);
  let ident = (1..)
    .map(|n| if n == 1 { base.clone() } else { format!("{base}_{n}") })
    .find(|candidate| !taken.contains(candidate))
    .unwrap_or(base);
  taken.insert(ident.clone());
  ident
}

fn example_text(example: &Value) -> String {
  match example {
    Value::String(text) => text.clone(),
    other => other.to_string(),
  }
}
