use std::{cmp::Ordering, hash::Hash};

use anyhow::Context;
use json_canon::to_string as to_canonical_json;
use serde_json::Value;

/// Keys that document a schema without changing its shape.
const DOCUMENTATION_KEYS: &[&str] = &["description", "example", "examples", "title", "summary"];

/// Structural fingerprint of a schema: documentation stripped, order-independent arrays sorted,
/// keys in RFC 8785 order.
#[derive(Debug, Clone, Eq)]
pub struct CanonicalSchema(String);

impl CanonicalSchema {
  pub fn from_value(schema: &Value) -> anyhow::Result<Self> {
    let mut value = schema.clone();
    normalize(&mut value, false);
    let canonical_json = to_canonical_json(&value).context("Failed to create canonical JSON string")?;
    Ok(Self(canonical_json))
  }
}

impl PartialEq for CanonicalSchema {
  fn eq(&self, other: &Self) -> bool {
    self.0 == other.0
  }
}

impl PartialOrd for CanonicalSchema {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for CanonicalSchema {
  fn cmp(&self, other: &Self) -> Ordering {
    self.0.cmp(&other.0)
  }
}

impl Hash for CanonicalSchema {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    let hash = blake3::hash(self.0.as_bytes());
    hash.as_bytes().hash(state);
  }
}

/// `in_name_map` is set while visiting the children of a `properties` map, whose keys are field
/// names rather than schema keywords.
fn normalize(value: &mut Value, in_name_map: bool) {
  match value {
    Value::Object(map) => {
      if !in_name_map {
        map.retain(|key, _| !DOCUMENTATION_KEYS.contains(&key.as_str()));
        for key in ["required", "type", "enum"] {
          if let Some(Value::Array(arr)) = map.get_mut(key) {
            sort_string_array_in_place(arr);
          }
        }
      }
      for (key, child) in map.iter_mut() {
        normalize(child, !in_name_map && key == "properties");
      }
    }
    Value::Array(items) => {
      for item in items {
        normalize(item, false);
      }
    }
    _ => {}
  }
}

fn sort_string_array_in_place(arr: &mut Vec<Value>) {
  let mut strings: Vec<String> = arr.iter().filter_map(|v| v.as_str().map(String::from)).collect();

  if strings.len() == arr.len() {
    strings.sort_unstable();
    *arr = strings.into_iter().map(Value::String).collect();
  }
}
