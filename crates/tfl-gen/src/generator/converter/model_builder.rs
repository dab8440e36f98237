use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use super::{
  ModelSet,
  type_mapper::{TypeMapper, enum_variants, string_values, type_tag},
};
use crate::{
  generator::{
    ast::{Documentation, FieldDef, GeneratedModel, ModelKind, TypeDescriptor},
    errors::GenerationError,
    metrics::GenerationWarning,
  },
  naming::identifiers::{sanitize, sanitize_field_name},
  utils::ref_target,
};

/// Builds one [`GeneratedModel`] per merged schema.
///
/// Objects, enums and scalars are built first; array schemas follow so their item types can be
/// checked against the finished set.
pub struct ModelBuilder<'a> {
  schemas: &'a BTreeMap<String, Value>,
  mapper: TypeMapper,
  set: ModelSet,
}

impl<'a> ModelBuilder<'a> {
  pub fn new(schemas: &'a BTreeMap<String, Value>) -> Self {
    Self {
      schemas,
      mapper: TypeMapper::new(schemas.keys().map(|name| sanitize(name))),
      set: ModelSet::default(),
    }
  }

  /// Returns the model set together with the mapper, so later stages keep the same enum names.
  pub fn build(mut self) -> Result<(ModelSet, TypeMapper), GenerationError> {
    let schemas = self.schemas;
    let (arrays, others): (Vec<_>, Vec<_>) = schemas.iter().partition(|(_, schema)| is_array_schema(schema));

    for (raw_name, schema) in others {
      let model = self.build_model(raw_name, schema);
      self.set.insert(model);
    }

    let pending = arrays
      .into_iter()
      .map(|(raw_name, schema)| (sanitize(raw_name), (raw_name.as_str(), schema)))
      .collect::<BTreeMap<_, _>>();
    let mut resolved = BTreeSet::new();
    for name in pending.keys() {
      self.resolve_array(name, &pending, &mut resolved, &mut vec![])?;
    }

    Ok((self.set, self.mapper))
  }

  fn build_model(&mut self, raw_name: &str, schema: &Value) -> GeneratedModel {
    let name = sanitize(raw_name);
    let docs = Documentation::from_optional(schema.get("description").and_then(Value::as_str));

    let kind = if let Some(values) = schema.get("enum").and_then(Value::as_array).filter(|v| !v.is_empty())
      && let Some(values) = string_values(values)
    {
      ModelKind::Enum {
        variants: enum_variants(&values),
      }
    } else if let Some(properties) = schema.get("properties").and_then(Value::as_object)
      && !properties.is_empty()
    {
      ModelKind::Record {
        fields: self.build_fields(&name, properties, schema),
      }
    } else if type_tag(schema) == Some("object") || schema.get("properties").is_some() {
      self.set.warnings.push(GenerationWarning::OpenObject { model: name.clone() });
      ModelKind::Open
    } else {
      let ty = self.mapper.map_type(schema, raw_name, &name);
      ModelKind::Scalar {
        ty: self.set.absorb(ty),
      }
    };

    GeneratedModel::builder()
      .name(name)
      .kind(kind)
      .source(raw_name)
      .docs(docs)
      .build()
  }

  fn build_fields(&mut self, owner: &str, properties: &serde_json::Map<String, Value>, schema: &Value) -> Vec<FieldDef> {
    let required = schema
      .get("required")
      .and_then(Value::as_array)
      .map(|names| names.iter().filter_map(Value::as_str).collect::<BTreeSet<_>>())
      .unwrap_or_default();

    let mut idents = BTreeSet::new();
    let mut fields = vec![];
    for (wire_name, property) in properties {
      let base = sanitize_field_name(wire_name);
      let ident = (1..)
        .map(|n| if n == 1 { base.clone() } else { format!("{base}_{n}") })
        .find(|candidate| !idents.contains(candidate))
        .unwrap_or(base);
      idents.insert(ident.clone());

      let mapped = self.mapper.map_type(property, wire_name, owner);
      fields.push(
        FieldDef::builder()
          .ident(ident)
          .wire_name(wire_name)
          .ty(self.set.absorb(mapped))
          .required(required.contains(wire_name.as_str()))
          .docs(Documentation::from_optional(
            property.get("description").and_then(Value::as_str),
          ))
          .build(),
      );
    }
    fields
  }

  fn resolve_array(
    &mut self,
    name: &str,
    pending: &BTreeMap<String, (&str, &Value)>,
    resolved: &mut BTreeSet<String>,
    visiting: &mut Vec<String>,
  ) -> Result<(), GenerationError> {
    if resolved.contains(name) {
      return Ok(());
    }
    if let Some(start) = visiting.iter().position(|n| n == name) {
      let mut names = visiting[start..].to_vec();
      names.push(name.to_string());
      return Err(GenerationError::ArrayAliasCycle { names });
    }
    let Some(&(raw_name, schema)) = pending.get(name) else {
      return Ok(());
    };

    visiting.push(name.to_string());
    let item = match schema.get("items") {
      None => {
        self.set.warnings.push(GenerationWarning::MissingArrayItems {
          location: raw_name.to_string(),
        });
        TypeDescriptor::Any
      }
      Some(items) => match items.get("$ref").and_then(Value::as_str) {
        Some(ref_path) => {
          let target = sanitize(ref_target(ref_path));
          if !self.set.contains(&target) && pending.contains_key(&target) {
            self.resolve_array(&target, pending, resolved, visiting)?;
          }
          if !self.set.contains(&target) {
            return Err(GenerationError::UnresolvedArrayItem {
              model: name.to_string(),
              target,
            });
          }
          TypeDescriptor::Named(target)
        }
        None => {
          let mapped = self.mapper.map_type(items, &format!("{name}Item"), name);
          self.set.absorb(mapped)
        }
      },
    };
    visiting.pop();

    let model = GeneratedModel::builder()
      .name(name)
      .kind(ModelKind::ListAlias { item })
      .source(raw_name)
      .docs(Documentation::from_optional(schema.get("description").and_then(Value::as_str)))
      .build();
    self.set.insert(model);
    resolved.insert(name.to_string());
    Ok(())
  }
}

fn is_array_schema(schema: &Value) -> bool {
  match type_tag(schema) {
    Some(tag) => tag == "array",
    None => schema.get("items").is_some(),
  }
}
