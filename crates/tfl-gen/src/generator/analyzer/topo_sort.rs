use std::collections::{BTreeMap, BTreeSet};

use super::DependencyGraph;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopoOrder {
  /// Dependencies before dependents, ties broken by name.
  pub order: Vec<String>,
  /// Models that could not be ordered; already appended to `order` in name order.
  pub residual: Vec<String>,
}

/// Kahn's algorithm over non-forward edges.
pub fn topo_sort(graph: &DependencyGraph) -> TopoOrder {
  let mut remaining: BTreeMap<&str, usize> = BTreeMap::new();
  let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

  for node in graph.nodes() {
    let deps = graph.strong_dependencies(node).filter(|dep| *dep != node).collect::<Vec<_>>();
    remaining.insert(node, deps.len());
    for dep in deps {
      dependents.entry(dep).or_default().push(node);
    }
  }

  let mut ready = remaining
    .iter()
    .filter(|(_, count)| **count == 0)
    .map(|(node, _)| *node)
    .collect::<BTreeSet<_>>();
  let mut order = vec![];

  while let Some(node) = ready.pop_first() {
    remaining.remove(node);
    order.push(node.to_string());
    for dependent in dependents.get(node).into_iter().flatten() {
      if let Some(count) = remaining.get_mut(dependent) {
        *count -= 1;
        if *count == 0 {
          ready.insert(*dependent);
        }
      }
    }
  }

  let residual = remaining.keys().map(ToString::to_string).collect::<Vec<_>>();
  order.extend(residual.iter().cloned());
  TopoOrder { order, residual }
}
