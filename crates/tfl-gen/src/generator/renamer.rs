use std::collections::BTreeMap;

use super::{document::SchemaDocument, metrics::GenerationWarning, policy::RenamePolicy};
use crate::{naming::identifiers::sanitize, utils::rewrite_refs};

/// Run-wide record of every schema the renamer moved, `old name -> sanitized new name`.
///
/// Old names are only unique per document, so a later document's entry replaces an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameRegistry {
  entries: BTreeMap<String, String>,
}

impl NameRegistry {
  pub fn record(&mut self, old: impl Into<String>, new: impl Into<String>) {
    self.entries.insert(old.into(), new.into());
  }

  #[cfg(test)]
  pub fn get(&self, old: &str) -> Option<&str> {
    self.entries.get(old).map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameReport {
  /// Schemas moved to a new name.
  pub moved: usize,
  /// Table entries with no matching schema in the document.
  pub skipped: usize,
  pub refs_rewritten: usize,
  pub warning: Option<GenerationWarning>,
}

/// Applies a [`RenamePolicy`] to documents one at a time.
pub struct EntityRenamer<'a> {
  policy: &'a RenamePolicy,
}

impl<'a> EntityRenamer<'a> {
  pub fn new(policy: &'a RenamePolicy) -> Self {
    Self { policy }
  }

  /// Moves every mapped schema of `document` to its sanitized new name and rewrites all `$ref`
  /// pointers in the document to match.
  pub fn rename(&self, document: &mut SchemaDocument, registry: &mut NameRegistry) -> RenameReport {
    let Some(table) = self.policy.table(&document.title) else {
      return RenameReport {
        warning: Some(GenerationWarning::UnmappedApi {
          title: document.title.clone(),
        }),
        ..RenameReport::default()
      };
    };

    let sanitized = table
      .iter()
      .map(|(old, new)| (old.as_str(), sanitize(new)))
      .collect::<BTreeMap<_, _>>();

    let mut report = RenameReport::default();
    let schemas = document.schemas_mut();
    // Take every body out before inserting so a new name never clobbers a schema still to be moved.
    let mut moved = vec![];
    for (old, new) in &sanitized {
      match schemas.shift_remove(*old) {
        Some(body) => moved.push((*old, new, body)),
        None => report.skipped += 1,
      }
    }
    for (old, new, body) in moved {
      schemas.insert(new.clone(), body);
      registry.record(old, new.clone());
      report.moved += 1;
    }

    report.refs_rewritten = rewrite_refs(&mut document.value, &|target: &str| sanitized.get(target).cloned());
    report
  }
}
