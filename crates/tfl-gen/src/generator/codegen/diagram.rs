use crate::generator::analyzer::DependencyGraph;

/// Mermaid class diagram of the model reference graph. Forward edges are dotted.
pub fn generate(graph: &DependencyGraph) -> String {
  let mut lines = graph
    .edges()
    .map(|(from, to, forward)| {
      let arrow = if forward { "..>" } else { "-->" };
      format!("    {from} {arrow} {to}")
    })
    .collect::<Vec<_>>();
  lines.sort();
  lines.insert(0, "classDiagram".to_string());

  let mut out = lines.join("\n");
  out.push('\n');
  out
}
