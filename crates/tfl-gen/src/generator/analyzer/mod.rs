//! Model dependency analysis: graph construction, cycle breaking and emission order.

mod cycles;
mod dependency_graph;
mod topo_sort;

use std::collections::BTreeMap;

pub use cycles::{BreakReport, CycleReport, break_cycles, detect_cycles};
pub use dependency_graph::DependencyGraph;
pub use topo_sort::{TopoOrder, topo_sort};

use super::{ast::GeneratedModel, metrics::GenerationWarning};

#[derive(Debug, Clone, Default)]
pub struct Analysis {
  /// Graph after cycle breaking; forward edges are flagged.
  pub graph: DependencyGraph,
  pub order: Vec<String>,
  pub cycles: CycleReport,
  pub broken: BreakReport,
  pub warnings: Vec<GenerationWarning>,
}

/// Breaks reference cycles in `models` and computes the emission order.
pub fn analyze(models: &mut BTreeMap<String, GeneratedModel>) -> Analysis {
  let graph = DependencyGraph::build(models);
  let cycles = detect_cycles(&graph);
  let broken = break_cycles(models, &graph, &cycles.cyclic);

  let graph = DependencyGraph::build(models);
  let TopoOrder { order, residual } = topo_sort(&graph);

  let mut warnings = vec![];
  if !residual.is_empty() {
    warnings.push(GenerationWarning::ResidualCycle {
      names: residual.join(", "),
    });
  }

  Analysis {
    graph,
    order,
    cycles,
    broken,
    warnings,
  }
}

#[cfg(test)]
mod tests;
