use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::{
  generator::{
    ast::{Documentation, EnumVariant, GeneratedModel, ModelKind, Primitive, TypeDescriptor},
    metrics::GenerationWarning,
  },
  naming::identifiers::{enum_type_name, enum_variant_tag, sanitize},
  utils::ref_target,
};

/// Result of mapping one property schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
  pub ty: TypeDescriptor,
  /// Enum models introduced by inline `enum` lists.
  pub inline_enums: Vec<GeneratedModel>,
  pub warnings: Vec<GenerationWarning>,
}

impl MappedType {
  fn plain(ty: TypeDescriptor) -> Self {
    Self {
      ty,
      inline_enums: vec![],
      warnings: vec![],
    }
  }
}

/// Maps property schemas to [`TypeDescriptor`]s and names the enums they declare inline.
///
/// Enum names are claimed for the lifetime of the mapper: a second value set asking for a taken
/// name gets the owner's name as a prefix.
#[derive(Debug, Clone, Default)]
pub struct TypeMapper {
  claimed: BTreeMap<String, Vec<String>>,
  taken: BTreeSet<String>,
}

impl TypeMapper {
  /// `taken` are model names that inline enums must not reuse.
  pub fn new(taken: impl IntoIterator<Item = String>) -> Self {
    Self {
      claimed: BTreeMap::new(),
      taken: taken.into_iter().collect(),
    }
  }

  pub fn map_type(&mut self, property: &Value, field: &str, owner: &str) -> MappedType {
    if let Some(ref_path) = property.get("$ref").and_then(Value::as_str) {
      return MappedType::plain(TypeDescriptor::named(sanitize(ref_target(ref_path))));
    }

    let type_tag = type_tag(property);

    if let Some(values) = property.get("enum").and_then(Value::as_array).filter(|v| !v.is_empty()) {
      match string_values(values) {
        Some(values) => return self.inline_enum(field, owner, values),
        None => {
          let mut mapped = MappedType::plain(primitive_or_any(type_tag));
          mapped.warnings.push(GenerationWarning::NonStringEnum {
            location: location(owner, field),
          });
          return mapped;
        }
      }
    }

    match type_tag {
      Some("array") => match property.get("items") {
        Some(items) => {
          let mut mapped = self.map_type(items, field, owner);
          mapped.ty = TypeDescriptor::list(mapped.ty);
          mapped
        }
        None => MappedType {
          ty: TypeDescriptor::list(TypeDescriptor::Any),
          inline_enums: vec![],
          warnings: vec![GenerationWarning::MissingArrayItems {
            location: location(owner, field),
          }],
        },
      },
      Some("object") => MappedType::plain(TypeDescriptor::Map),
      Some(tag) => match Primitive::from_type_tag(tag) {
        Some(primitive) => MappedType::plain(TypeDescriptor::Primitive(primitive)),
        None => MappedType {
          ty: TypeDescriptor::Any,
          inline_enums: vec![],
          warnings: vec![GenerationWarning::UnmappedType {
            location: location(owner, field),
            type_name: tag.to_string(),
          }],
        },
      },
      None => MappedType::plain(TypeDescriptor::Any),
    }
  }

  fn inline_enum(&mut self, field: &str, owner: &str, values: Vec<String>) -> MappedType {
    let base = enum_type_name(field);
    let mut warnings = vec![];

    let name = if self.can_claim(&base, &values) {
      base
    } else {
      let prefixed = sanitize(&format!("{owner}{base}"));
      let name = (1..)
        .map(|n| if n == 1 { prefixed.clone() } else { format!("{prefixed}{n}") })
        .find(|candidate| self.can_claim(candidate, &values))
        .unwrap_or(prefixed);
      warnings.push(GenerationWarning::EnumRenamed {
        original: base,
        renamed: name.clone(),
      });
      name
    };

    self.claimed.insert(name.clone(), values.clone());
    let model = GeneratedModel::builder()
      .name(name.clone())
      .kind(ModelKind::Enum {
        variants: enum_variants(&values),
      })
      .source(location(owner, field))
      .docs(Documentation::from_lines([format!("Values of `{owner}.{field}`.")]))
      .build();

    MappedType {
      ty: TypeDescriptor::Named(name),
      inline_enums: vec![model],
      warnings,
    }
  }

  fn can_claim(&self, name: &str, values: &[String]) -> bool {
    !self.taken.contains(name) && self.claimed.get(name).is_none_or(|claimed| claimed == values)
  }
}

/// Builds enum variants in declared order, dropping repeated values and disambiguating tags that
/// normalize to the same identifier.
pub fn enum_variants(values: &[String]) -> Vec<EnumVariant> {
  let mut seen_values = BTreeSet::new();
  let mut seen_tags = BTreeSet::new();
  let mut variants = vec![];

  for value in values {
    if !seen_values.insert(value.as_str()) {
      continue;
    }
    let base = enum_variant_tag(value);
    let tag = (1..)
      .map(|n| if n == 1 { base.clone() } else { format!("{base}_{n}") })
      .find(|candidate| !seen_tags.contains(candidate))
      .unwrap_or(base);
    seen_tags.insert(tag.clone());
    variants.push(EnumVariant {
      tag,
      value: value.clone(),
    });
  }
  variants
}

/// The `type` keyword, taking the first non-null entry of a type list.
pub fn type_tag(schema: &Value) -> Option<&str> {
  match schema.get("type")? {
    Value::String(tag) => Some(tag),
    Value::Array(tags) => tags.iter().filter_map(Value::as_str).find(|tag| *tag != "null"),
    _ => None,
  }
}

/// The values of an `enum` list when all of them are strings.
pub fn string_values(values: &[Value]) -> Option<Vec<String>> {
  values.iter().map(|v| v.as_str().map(String::from)).collect()
}

fn primitive_or_any(type_tag: Option<&str>) -> TypeDescriptor {
  type_tag
    .and_then(Primitive::from_type_tag)
    .map_or(TypeDescriptor::Any, TypeDescriptor::Primitive)
}

fn location(owner: &str, field: &str) -> String {
  format!("{owner}.{field}")
}
