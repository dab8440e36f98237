use std::collections::{BTreeMap, BTreeSet};

use petgraph::{algo::kosaraju_scc, graphmap::DiGraphMap};

use super::DependencyGraph;
use crate::generator::ast::{GeneratedModel, ModelKind, TypeDescriptor};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
  /// Every model on a cycle of non-forward edges.
  pub cyclic: BTreeSet<String>,
  /// One path per back edge found by the search, starting at the revisited model.
  pub cycles: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakReport {
  /// Edges turned into forward references, in discovery order.
  pub broken_edges: Vec<(String, String)>,
  pub fields_rewritten: usize,
  /// Alias models promoted to newtypes.
  pub newtypes: Vec<String>,
}

pub fn detect_cycles(graph: &DependencyGraph) -> CycleReport {
  let mut visited = BTreeSet::new();
  let mut on_stack = BTreeSet::new();
  let mut path = vec![];
  let mut cycles = vec![];

  for node in graph.nodes() {
    if !visited.contains(node) {
      dfs_detect_cycle(graph, node, &mut visited, &mut on_stack, &mut path, &mut cycles);
    }
  }

  let mut cyclic = cycles.iter().flatten().cloned().collect::<BTreeSet<_>>();
  widen_to_components(graph, &mut cyclic);

  CycleReport { cyclic, cycles }
}

fn dfs_detect_cycle<'a>(
  graph: &'a DependencyGraph,
  node: &'a str,
  visited: &mut BTreeSet<&'a str>,
  on_stack: &mut BTreeSet<&'a str>,
  path: &mut Vec<&'a str>,
  cycles: &mut Vec<Vec<String>>,
) {
  visited.insert(node);
  on_stack.insert(node);
  path.push(node);

  for dep in graph.strong_dependencies(node) {
    if !visited.contains(dep) {
      dfs_detect_cycle(graph, dep, visited, on_stack, path, cycles);
    } else if on_stack.contains(dep)
      && let Some(cycle_start) = path.iter().position(|n| *n == dep)
    {
      cycles.push(path[cycle_start..].iter().map(ToString::to_string).collect());
    }
  }

  path.pop();
  on_stack.remove(node);
}

/// Adds every member of a strongly connected component that already has a flagged member.
fn widen_to_components(graph: &DependencyGraph, cyclic: &mut BTreeSet<String>) {
  let mut petgraph = DiGraphMap::<&str, ()>::new();
  for node in graph.nodes() {
    petgraph.add_node(node);
    for dep in graph.strong_dependencies(node) {
      petgraph.add_edge(node, dep, ());
    }
  }

  for component in kosaraju_scc(&petgraph) {
    let is_cycle = component.len() > 1 || petgraph.contains_edge(component[0], component[0]);
    if is_cycle && component.iter().any(|n| cyclic.contains(*n)) {
      cyclic.extend(component.iter().map(ToString::to_string));
    }
  }
}

/// Late-binds the back edges of a depth-first search over the cyclic models, so that the
/// remaining non-forward edges form a DAG.
///
/// Every field of the source model whose innermost type names the target becomes
/// [`TypeDescriptor::Forward`]; list wrappers are kept. Cyclic models are
/// flagged on the way. A back edge that closes a loop of aliases also turns its source into a
/// newtype, since aliases expand eagerly.
pub fn break_cycles(
  models: &mut BTreeMap<String, GeneratedModel>,
  graph: &DependencyGraph,
  cyclic: &BTreeSet<String>,
) -> BreakReport {
  let mut visited = BTreeSet::new();
  let mut on_stack = BTreeSet::new();
  let mut back_edges = vec![];

  for node in cyclic {
    if !visited.contains(node.as_str()) {
      find_back_edges(graph, node, &mut visited, &mut on_stack, &mut back_edges);
    }
  }

  let mut report = BreakReport::default();
  for (from, to) in back_edges {
    let nominal = closes_alias_cycle(models, graph, from, to);
    if let Some(model) = models.get_mut(from) {
      report.fields_rewritten += late_bind(model, to);
      if nominal && !model.newtype {
        model.newtype = true;
        report.newtypes.push(from.to_string());
      }
    }
    report.broken_edges.push((from.to_string(), to.to_string()));
  }

  for name in cyclic {
    if let Some(model) = models.get_mut(name) {
      model.cyclic = true;
    }
  }
  report
}

fn find_back_edges<'a>(
  graph: &'a DependencyGraph,
  node: &'a str,
  visited: &mut BTreeSet<&'a str>,
  on_stack: &mut BTreeSet<&'a str>,
  back_edges: &mut Vec<(&'a str, &'a str)>,
) {
  visited.insert(node);
  on_stack.insert(node);

  for dep in graph.strong_dependencies(node) {
    if on_stack.contains(dep) {
      back_edges.push((node, dep));
    } else if !visited.contains(dep) {
      find_back_edges(graph, dep, visited, on_stack, back_edges);
    }
  }

  on_stack.remove(node);
}

/// Whether `to` leads back to `from` through aliases only, `from` being an alias itself.
fn closes_alias_cycle<'a>(
  models: &BTreeMap<String, GeneratedModel>,
  graph: &'a DependencyGraph,
  from: &str,
  to: &'a str,
) -> bool {
  let is_alias = |name: &str| models.get(name).is_some_and(|model| model.kind.is_alias());
  if !is_alias(from) {
    return false;
  }

  let mut seen = BTreeSet::new();
  let mut stack = vec![to];
  while let Some(node) = stack.pop() {
    if node == from {
      return true;
    }
    if is_alias(node) && seen.insert(node) {
      stack.extend(graph.strong_dependencies(node));
    }
  }
  false
}

fn late_bind(model: &mut GeneratedModel, target: &str) -> usize {
  let rewrite = |ty: &mut TypeDescriptor| {
    if !ty.is_forward() && ty.referenced_model() == Some(target) {
      *ty = ty.to_forward();
      1
    } else {
      0
    }
  };

  match &mut model.kind {
    ModelKind::Record { fields } => fields.iter_mut().map(|field| rewrite(&mut field.ty)).sum(),
    ModelKind::ListAlias { item } => rewrite(item),
    ModelKind::Scalar { ty } => rewrite(ty),
    ModelKind::Open | ModelKind::Enum { .. } => 0,
  }
}
