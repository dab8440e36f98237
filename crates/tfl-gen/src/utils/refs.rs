use serde_json::Value;

pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

const REF_KEY: &str = "$ref";

/// Returns the final path segment of a `$ref` pointer, which is the referenced component name.
pub fn ref_target(ref_path: &str) -> &str {
  ref_path.rsplit('/').next().unwrap_or(ref_path)
}

/// Builds a schema `$ref` pointer for `name`.
pub fn schema_ref(name: &str) -> String {
  format!("{SCHEMA_REF_PREFIX}{name}")
}

/// Replaces only the final path segment of `ref_path`.
pub fn replace_ref_target(ref_path: &str, new_target: &str) -> String {
  match ref_path.rsplit_once('/') {
    Some((prefix, _)) => format!("{prefix}/{new_target}"),
    None => new_target.to_string(),
  }
}

/// Extracts the schema name of a `#/components/schemas/...` pointer. Other pointers yield `None`.
pub fn parse_schema_ref_path(ref_path: &str) -> Option<&str> {
  ref_path.strip_prefix(SCHEMA_REF_PREFIX).filter(|name| !name.is_empty())
}

/// Walks `value` and rewrites every `$ref` whose target `lookup` maps to a new name.
///
/// Returns the number of pointers rewritten.
pub fn rewrite_refs(value: &mut Value, lookup: &impl Fn(&str) -> Option<String>) -> usize {
  rewrite_matching(value, &|_: &str| true, lookup)
}

/// Like [`rewrite_refs`], restricted to `#/components/schemas/...` pointers.
pub fn rewrite_schema_refs(value: &mut Value, lookup: &impl Fn(&str) -> Option<String>) -> usize {
  rewrite_matching(value, &|ref_path: &str| parse_schema_ref_path(ref_path).is_some(), lookup)
}

fn rewrite_matching(
  value: &mut Value,
  accept: &impl Fn(&str) -> bool,
  lookup: &impl Fn(&str) -> Option<String>,
) -> usize {
  match value {
    Value::Object(map) => {
      let mut rewritten = 0;
      if let Some(Value::String(ref_path)) = map.get_mut(REF_KEY)
        && accept(ref_path)
        && let Some(new_target) = lookup(ref_target(ref_path))
        && new_target != ref_target(ref_path)
      {
        *ref_path = replace_ref_target(ref_path, &new_target);
        rewritten += 1;
      }
      for (key, child) in map.iter_mut() {
        if key != REF_KEY {
          rewritten += rewrite_matching(child, accept, lookup);
        }
      }
      rewritten
    }
    Value::Array(items) => items.iter_mut().map(|item| rewrite_matching(item, accept, lookup)).sum(),
    _ => 0,
  }
}

/// A `$ref` found while walking a document, with the JSON pointer of the node that holds it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefSite {
  pub location: String,
  pub ref_path: String,
}

pub fn collect_refs(value: &Value, location: &str, sites: &mut Vec<RefSite>) {
  match value {
    Value::Object(map) => {
      if let Some(Value::String(ref_path)) = map.get(REF_KEY) {
        sites.push(RefSite {
          location: location.to_string(),
          ref_path: ref_path.clone(),
        });
      }
      for (key, child) in map {
        if key != REF_KEY {
          collect_refs(child, &format!("{location}/{}", escape_pointer(key)), sites);
        }
      }
    }
    Value::Array(items) => {
      for (index, item) in items.iter().enumerate() {
        collect_refs(item, &format!("{location}/{index}"), sites);
      }
    }
    _ => {}
  }
}

fn escape_pointer(segment: &str) -> String {
  segment.replace('~', "~0").replace('/', "~1")
}
