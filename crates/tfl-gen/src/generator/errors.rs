use itertools::Itertools;

use crate::utils::RefSite;

/// Fatal pipeline failures. Anything recoverable is a [`super::metrics::GenerationWarning`].
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
  #[error("invalid OpenAPI document {file}: {reason}")]
  InvalidDocument { file: String, reason: String },

  #[error("invalid rename policy: {reason}")]
  InvalidPolicy { reason: String },

  #[error(
    "schema deduplication did not converge after {iterations} passes; still unstable: {}",
    .names.join(", ")
  )]
  DedupDidNotConverge { iterations: usize, names: Vec<String> },

  #[error("unresolved $ref pointers after merging: {}", format_ref_sites(.refs))]
  UnresolvedReferences { refs: Vec<RefSite> },

  #[error("array model '{model}' references unknown item type '{target}'")]
  UnresolvedArrayItem { model: String, target: String },

  #[error("array models alias each other in a cycle: {}", .names.join(" -> "))]
  ArrayAliasCycle { names: Vec<String> },

  #[error("operation '{operation}' responds with unknown model '{model}'")]
  UnknownResponseModel { operation: String, model: String },
}

fn format_ref_sites(refs: &[RefSite]) -> String {
  refs
    .iter()
    .map(|site| format!("{} at {}", site.ref_path, site.location))
    .join(", ")
}
