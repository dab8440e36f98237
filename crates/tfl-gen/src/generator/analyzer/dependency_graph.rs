use std::collections::{BTreeMap, BTreeSet};

use crate::generator::ast::GeneratedModel;

/// Model references, `model -> referenced models`, restricted to models in the set.
///
/// An edge is forward when every reference along it was late-bound by the cycle breaker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
  dependencies: BTreeMap<String, BTreeSet<String>>,
  forward: BTreeSet<(String, String)>,
}

impl DependencyGraph {
  pub fn build(models: &BTreeMap<String, GeneratedModel>) -> Self {
    let mut dependencies = BTreeMap::new();
    let mut strong = BTreeSet::new();
    let mut late_bound = BTreeSet::new();

    for (name, model) in models {
      let deps: &mut BTreeSet<String> = dependencies.entry(name.clone()).or_default();
      for (target, is_forward) in model.references() {
        if !models.contains_key(target) {
          continue;
        }
        deps.insert(target.to_string());
        let edge = (name.clone(), target.to_string());
        if is_forward {
          late_bound.insert(edge);
        } else {
          strong.insert(edge);
        }
      }
    }

    Self {
      dependencies,
      forward: late_bound.difference(&strong).cloned().collect(),
    }
  }

  pub fn nodes(&self) -> impl Iterator<Item = &str> {
    self.dependencies.keys().map(String::as_str)
  }

  pub fn dependencies(&self, name: &str) -> impl Iterator<Item = &str> {
    self.dependencies.get(name).into_iter().flatten().map(String::as_str)
  }

  /// Dependencies reached through at least one reference that is not forward.
  pub fn strong_dependencies<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
    self.dependencies(name).filter(move |dep| !self.is_forward(name, dep))
  }

  pub fn is_forward(&self, from: &str, to: &str) -> bool {
    self.forward.contains(&(from.to_string(), to.to_string()))
  }

  /// All edges in `(from, to)` order, with their forward flag.
  pub fn edges(&self) -> impl Iterator<Item = (&str, &str, bool)> {
    self
      .dependencies
      .iter()
      .flat_map(move |(from, deps)| deps.iter().map(move |to| (from.as_str(), to.as_str(), self.is_forward(from, to))))
  }

  #[cfg(test)]
  pub fn forward_edge_count(&self) -> usize {
    self.forward.len()
  }
}
