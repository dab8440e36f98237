use std::{collections::BTreeMap, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::errors::GenerationError;

const BUILTIN_POLICY: &str = include_str!("../../policy/rename_policy.json");

/// Per-API schema rename tables, keyed by document title and then by the schema name to replace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePolicy {
  pub version: String,
  #[serde(default)]
  pub apis: BTreeMap<String, BTreeMap<String, String>>,
}

impl RenamePolicy {
  /// The policy bundled with the generator.
  pub fn builtin() -> Result<Self, GenerationError> {
    Self::from_json(BUILTIN_POLICY)
  }

  pub fn from_json(json: &str) -> Result<Self, GenerationError> {
    let deserializer = &mut serde_json::Deserializer::from_str(json);
    let policy: Self = serde_path_to_error::deserialize(deserializer).map_err(|e| GenerationError::InvalidPolicy {
      reason: format!("{} at {}", e.inner(), e.path()),
    })?;

    if policy.version.trim().is_empty() {
      return Err(GenerationError::InvalidPolicy {
        reason: "version must not be empty".to_string(),
      });
    }
    Ok(policy)
  }

  pub async fn load(path: &Path) -> anyhow::Result<Self> {
    let json = tokio::fs::read_to_string(path)
      .await
      .with_context(|| format!("reading rename policy {}", path.display()))?;
    Self::from_json(&json).with_context(|| format!("loading rename policy {}", path.display()))
  }

  /// Loads `path` when given, otherwise the built-in policy.
  pub async fn resolve(path: Option<&Path>) -> anyhow::Result<Self> {
    match path {
      Some(path) => Self::load(path).await,
      None => Ok(Self::builtin()?),
    }
  }

  pub fn table(&self, title: &str) -> Option<&BTreeMap<String, String>> {
    self.apis.get(title)
  }

  pub fn entry_count(&self) -> usize {
    self.apis.values().map(BTreeMap::len).sum()
  }
}
