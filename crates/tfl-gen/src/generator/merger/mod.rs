//! Cross-document schema merging and structural deduplication.

mod canonical;

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

pub use self::canonical::CanonicalSchema;
use super::{document::SchemaDocument, errors::GenerationError, metrics::GenerationWarning};
use crate::utils::{RefSite, collect_refs, parse_schema_ref_path, rewrite_schema_refs, schema_ref};

pub const DEFAULT_MAX_DEDUP_PASSES: usize = 16;

/// Every schema of the run in one namespace, plus the documents they came from.
///
/// The documents keep their paths and non-schema components; their `components.schemas` are moved
/// into [`MergedSpec::schemas`].
#[derive(Debug, Clone, Default)]
pub struct MergedSpec {
  pub schemas: BTreeMap<String, Value>,
  pub apis: Vec<SchemaDocument>,
}

impl MergedSpec {
  /// A copy of `api` with the merged schema set restored under `components.schemas`, suitable for
  /// typed parsing.
  pub fn document_with_schemas(&self, api: &SchemaDocument) -> Value {
    let mut document = api.clone();
    let schemas = document.schemas_mut();
    for (name, schema) in &self.schemas {
      schemas.insert(name.clone(), schema.clone());
    }
    document.value
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupReport {
  pub passes: usize,
  pub removed: usize,
  pub refs_rewritten: usize,
}

#[derive(Debug, Clone, bon::Builder)]
pub struct SchemaMerger {
  #[builder(default = DEFAULT_MAX_DEDUP_PASSES)]
  max_passes: usize,
}

impl Default for SchemaMerger {
  fn default() -> Self {
    Self::builder().build()
  }
}

impl SchemaMerger {
  /// Collects the schemas of every document into one namespace.
  ///
  /// Documents are taken in file-name order; a later definition of a name replaces the earlier one.
  pub fn merge(&self, mut documents: Vec<SchemaDocument>) -> (MergedSpec, Vec<GenerationWarning>) {
    documents.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    let mut merged = MergedSpec::default();
    let mut warnings = vec![];
    for mut document in documents {
      let schemas = std::mem::take(document.schemas_mut());
      for (name, schema) in schemas {
        if merged.schemas.insert(name.clone(), schema).is_some() {
          warnings.push(GenerationWarning::SchemaOverwritten {
            name,
            document: document.file_name.clone(),
          });
        }
      }
      merged.apis.push(document);
    }
    (merged, warnings)
  }

  /// Collapses structurally identical schemas onto one survivor and redirects every `$ref`,
  /// repeating until a pass finds nothing left to merge.
  pub fn deduplicate(&self, merged: &mut MergedSpec) -> anyhow::Result<DedupReport> {
    let mut report = DedupReport::default();

    for pass in 1..=self.max_passes {
      report.passes = pass;
      let ref_map = find_duplicates(&merged.schemas)?;
      if ref_map.is_empty() {
        return Ok(report);
      }
      report.removed += ref_map.len();
      report.refs_rewritten += apply_ref_map(merged, &ref_map);
    }

    let pending = find_duplicates(&merged.schemas)?;
    if pending.is_empty() {
      return Ok(report);
    }
    Err(
      GenerationError::DedupDidNotConverge {
        iterations: self.max_passes,
        names: pending.into_keys().collect(),
      }
      .into(),
    )
  }

  /// Fails when any schema `$ref` in the merged set or the documents points at a missing schema.
  pub fn verify_references(merged: &MergedSpec) -> Result<(), GenerationError> {
    let mut sites = vec![];
    for (name, schema) in &merged.schemas {
      collect_refs(schema, &schema_ref(name), &mut sites);
    }
    for api in &merged.apis {
      let mut document_sites = vec![];
      collect_refs(&api.value, "#", &mut document_sites);
      sites.extend(document_sites.into_iter().map(|site| RefSite {
        location: format!("{}{}", api.file_name, site.location),
        ..site
      }));
    }

    let mut unresolved = sites
      .into_iter()
      .filter(|site| parse_schema_ref_path(&site.ref_path).is_some_and(|name| !merged.schemas.contains_key(name)))
      .collect::<Vec<_>>();

    if unresolved.is_empty() {
      return Ok(());
    }
    unresolved.sort();
    Err(GenerationError::UnresolvedReferences { refs: unresolved })
  }
}

/// Groups schemas by canonical form and maps every non-survivor to its group's survivor.
fn find_duplicates(schemas: &BTreeMap<String, Value>) -> anyhow::Result<BTreeMap<String, String>> {
  let mut groups: HashMap<CanonicalSchema, Vec<&str>> = HashMap::new();
  for (name, schema) in schemas {
    groups
      .entry(CanonicalSchema::from_value(schema)?)
      .or_default()
      .push(name);
  }

  let mut ref_map = BTreeMap::new();
  for names in groups.into_values().filter(|names| names.len() > 1) {
    let Some(survivor) = preferred_survivor(&names) else {
      continue;
    };
    for name in names.into_iter().filter(|name| *name != survivor) {
      ref_map.insert(name.to_string(), survivor.to_string());
    }
  }
  Ok(ref_map)
}

/// The longest name wins, ties go to the lexicographically smallest.
fn preferred_survivor<'a>(names: &[&'a str]) -> Option<&'a str> {
  names
    .iter()
    .copied()
    .max_by(|a, b| a.len().cmp(&b.len()).then_with(|| b.cmp(a)))
}

fn apply_ref_map(merged: &mut MergedSpec, ref_map: &BTreeMap<String, String>) -> usize {
  let lookup = |name: &str| ref_map.get(name).cloned();

  merged.schemas.retain(|name, _| !ref_map.contains_key(name));

  let mut rewritten = 0;
  for schema in merged.schemas.values_mut() {
    rewritten += rewrite_schema_refs(schema, &lookup);
  }
  for api in &mut merged.apis {
    rewritten += rewrite_schema_refs(&mut api.value, &lookup);
  }
  rewritten
}

#[cfg(test)]
mod tests;
