use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::ModelError;

/// Renders a path or query parameter the way the API expects it on the wire.
///
/// Strings are used verbatim, enums use their serialized value and lists are comma-joined.
/// `null` renders as an empty string.
pub fn param_value<T: Serialize + ?Sized>(value: &T) -> String {
  serde_json::to_value(value).map_or_else(|_| String::new(), |value| render(&value))
}

fn render(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(","),
    other => other.to_string(),
  }
}

/// Decodes `value` into the model named `model`, reporting the JSON path of the first mismatch.
pub fn decode_model<T: DeserializeOwned>(model: &str, value: Value) -> Result<T, ModelError> {
  serde_path_to_error::deserialize(value).map_err(|err| ModelError::Decode {
    model: model.to_string(),
    path: err.path().to_string(),
    source: err.into_inner(),
  })
}
