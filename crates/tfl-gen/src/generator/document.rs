use serde_json::{Map, Value};

use super::errors::GenerationError;

/// One parsed OpenAPI document, kept as a raw JSON tree so that renaming and
/// `$ref` rewriting can work on every node.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
  pub file_name: String,
  pub title: String,
  pub value: Value,
}

impl SchemaDocument {
  pub fn new(file_name: impl Into<String>, value: Value) -> Result<Self, GenerationError> {
    let file_name = file_name.into();
    if !value.is_object() {
      return Err(GenerationError::InvalidDocument {
        file: file_name,
        reason: "top-level value is not an object".to_string(),
      });
    }

    let Some(title) = value.pointer("/info/title").and_then(Value::as_str) else {
      return Err(GenerationError::InvalidDocument {
        file: file_name,
        reason: "missing info.title".to_string(),
      });
    };

    Ok(Self {
      title: title.to_string(),
      file_name,
      value,
    })
  }

  #[cfg(test)]
  pub fn schemas(&self) -> Option<&Map<String, Value>> {
    self.value.pointer("/components/schemas").and_then(Value::as_object)
  }

  /// The `components.schemas` map, created when absent.
  pub fn schemas_mut(&mut self) -> &mut Map<String, Value> {
    let components = ensure_object(&mut self.value)
      .entry("components")
      .or_insert_with(|| Value::Object(Map::new()));
    let schemas = ensure_object(components)
      .entry("schemas")
      .or_insert_with(|| Value::Object(Map::new()));
    ensure_object(schemas)
  }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
  if !value.is_object() {
    *value = Value::Object(Map::new());
  }
  match value {
    Value::Object(map) => map,
    _ => unreachable!(),
  }
}
