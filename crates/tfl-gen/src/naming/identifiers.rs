use std::sync::LazyLock;

use any_ascii::any_ascii;
use inflections::Inflect;
use regex::Regex;

use super::reserved::{is_reserved_field_name, is_reserved_module_stem, is_reserved_type_name};

pub const MODEL_PREFIX: &str = "Model_";
pub const FIELD_SUFFIX: &str = "_field";
pub const ENUM_SUFFIX: &str = "Enum";
const MODULE_SUFFIX: &str = "_model";
const EMPTY_VARIANT: &str = "VALUE";

static INVALID_CHAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").unwrap());
static NON_ALPHANUMERIC_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

fn starts_with_digit(s: &str) -> bool {
  s.starts_with(|c: char| c.is_ascii_digit())
}

/// Maps a schema or entity name to a model identifier.
///
/// Namespaced names collapse to their final segment (`Tfl.Api.Presentation.Entities.Line` becomes
/// `Line`, `Tfl-2` becomes `Model_2`). Results that are empty, start with a digit, or are reserved
/// get the [`MODEL_PREFIX`]. The function is total and idempotent.
pub fn sanitize(name: &str) -> String {
  let replaced = INVALID_CHAR_RE.replace_all(name, "_");
  let last = replaced.rsplit('_').next().unwrap_or_default();

  if last.is_empty() || starts_with_digit(last) || is_reserved_type_name(last) {
    format!("{MODEL_PREFIX}{last}")
  } else {
    last.to_string()
  }
}

/// Maps a wire property name to a field identifier. Valid names pass through unchanged and
/// reserved words get [`FIELD_SUFFIX`]; the wire name itself is kept separately for serde.
pub fn sanitize_field_name(name: &str) -> String {
  let mut ident = INVALID_CHAR_RE.replace_all(name, "_").into_owned();

  if ident.is_empty() {
    ident.push('_');
  }
  if starts_with_digit(&ident) {
    ident.insert(0, '_');
  }
  if is_reserved_field_name(&ident) {
    ident.push_str(FIELD_SUFFIX);
  }
  ident
}

/// Derives an enum variant tag from a literal value: `"real-time"` becomes `REAL_TIME` and `"1"`
/// becomes `_1`.
pub fn enum_variant_tag(value: &str) -> String {
  let ascii = any_ascii(value);
  let replaced = NON_ALPHANUMERIC_RUN_RE.replace_all(&ascii, "_");
  let mut tag = replaced.trim_matches('_').to_uppercase();

  if tag.is_empty() {
    return EMPTY_VARIANT.to_string();
  }
  if starts_with_digit(&tag) {
    tag.insert(0, '_');
  }
  tag
}

/// Names the inline enum generated for a property: `{Field}Enum`.
pub fn enum_type_name(field_name: &str) -> String {
  let pascal = NON_ALPHANUMERIC_RUN_RE
    .replace_all(&any_ascii(field_name), " ")
    .to_pascal_case();
  sanitize(&format!("{pascal}{ENUM_SUFFIX}"))
}

/// File and module stem for a generated model or client.
pub fn module_file_stem(name: &str) -> String {
  let mut stem = NON_ALPHANUMERIC_RUN_RE
    .replace_all(&any_ascii(name), "_")
    .to_snake_case()
    .trim_matches('_')
    .to_string();

  if stem.is_empty() || starts_with_digit(&stem) {
    stem.insert_str(0, "m_");
  }
  if is_reserved_module_stem(&stem) {
    stem.push_str(MODULE_SUFFIX);
  }
  stem
}

/// Client method name for an operation id: the segment after the last `_`, in snake case.
pub fn client_method_name(operation_id: &str) -> String {
  let last = operation_id.rsplit('_').find(|s| !s.is_empty()).unwrap_or(operation_id);
  let snake = NON_ALPHANUMERIC_RUN_RE
    .replace_all(&any_ascii(last), "_")
    .to_snake_case();
  sanitize_field_name(snake.trim_matches('_'))
}

/// Type name for the client of one API, from its document title (`Lift Disruptions` becomes
/// `LiftDisruptions`).
pub fn api_type_name(title: &str) -> String {
  let pascal = NON_ALPHANUMERIC_RUN_RE
    .replace_all(&any_ascii(title), " ")
    .to_pascal_case();

  if pascal.is_empty() || starts_with_digit(&pascal) {
    format!("Api{pascal}")
  } else {
    pascal
  }
}

/// Derives an operation id for operations that omit one, e.g. `get_Line_by_id_Status`.
pub fn fallback_operation_id(method: &str, path: &str) -> String {
  let segments = path
    .split('/')
    .filter(|s| !s.is_empty())
    .map(|s| if s.starts_with('{') && s.ends_with('}') { "by_id" } else { s })
    .collect::<Vec<_>>();

  let method = method.to_lowercase();
  if segments.is_empty() {
    method
  } else {
    format!("{method}_{}", segments.join("_"))
  }
}
