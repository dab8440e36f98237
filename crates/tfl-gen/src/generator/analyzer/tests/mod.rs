use std::collections::BTreeMap;

use crate::generator::{
  analyzer::{DependencyGraph, analyze, detect_cycles, topo_sort},
  ast::{FieldDef, GeneratedModel, ModelKind, Primitive, TypeDescriptor},
};

fn record(name: &str, fields: &[(&str, TypeDescriptor)]) -> GeneratedModel {
  GeneratedModel::builder()
    .name(name)
    .kind(ModelKind::Record {
      fields: fields
        .iter()
        .map(|(ident, ty)| FieldDef::builder().ident(*ident).wire_name(*ident).ty(ty.clone()).build())
        .collect(),
    })
    .build()
}

fn model_set(models: impl IntoIterator<Item = GeneratedModel>) -> BTreeMap<String, GeneratedModel> {
  models.into_iter().map(|m| (m.name.clone(), m)).collect()
}

fn named(name: &str) -> TypeDescriptor {
  TypeDescriptor::named(name)
}

fn forward_fields(models: &BTreeMap<String, GeneratedModel>) -> Vec<(String, String)> {
  models
    .values()
    .flat_map(|m| {
      m.fields()
        .iter()
        .filter(|f| f.ty.is_forward())
        .map(|f| (m.name.clone(), f.ident.clone()))
    })
    .collect()
}

fn assert_topologically_valid(graph: &DependencyGraph, order: &[String]) {
  let position = |name: &str| order.iter().position(|n| n == name).unwrap();
  for (from, to, forward) in graph.edges() {
    if !forward && from != to {
      assert!(position(to) < position(from), "{to} must precede {from}");
    }
  }
}

#[test]
fn test_mutual_reference_breaks_exactly_one_field() {
  let mut models = model_set([
    record("A", &[("bs", TypeDescriptor::list(named("B")))]),
    record("B", &[("a", named("A"))]),
  ]);

  let analysis = analyze(&mut models);

  assert_eq!(analysis.cycles.cyclic.iter().collect::<Vec<_>>(), ["A", "B"]);
  assert_eq!(analysis.cycles.cycles, vec![vec!["A".to_string(), "B".to_string()]]);
  assert_eq!(forward_fields(&models), [("B".to_string(), "a".to_string())]);
  assert!(models["A"].cyclic && models["B"].cyclic);
  assert_eq!(models["B"].fields()[0].ty, TypeDescriptor::Forward("A".into()));
  assert_eq!(analysis.order, ["B", "A"]);
  assert!(analysis.graph.is_forward("B", "A"));
  assert_eq!(analysis.graph.forward_edge_count(), 1);
  assert!(analysis.warnings.is_empty());
  assert!(detect_cycles(&analysis.graph).cyclic.is_empty());
}

#[test]
fn test_component_members_off_the_search_path_are_flagged() {
  // A -> B -> C -> A and C -> D -> B; D only appears on the second loop.
  let mut models = model_set([
    record("A", &[("b", named("B"))]),
    record("B", &[("c", named("C"))]),
    record("C", &[("a", named("A")), ("d", named("D"))]),
    record("D", &[("b", TypeDescriptor::list(named("B")))]),
    record("Leaf", &[("n", TypeDescriptor::Primitive(Primitive::Integer))]),
    record("Root", &[("a", named("A")), ("leaf", named("Leaf"))]),
  ]);

  let analysis = analyze(&mut models);

  assert_eq!(
    analysis.cycles.cyclic.iter().collect::<Vec<_>>(),
    ["A", "B", "C", "D"]
  );
  assert!(!models["Root"].cyclic && !models["Leaf"].cyclic);
  assert_eq!(
    forward_fields(&models),
    [
      ("C".to_string(), "a".to_string()),
      ("D".to_string(), "b".to_string())
    ]
  );
  assert_eq!(models["D"].fields()[0].ty, TypeDescriptor::list(TypeDescriptor::Forward("B".into())));
  assert!(detect_cycles(&analysis.graph).cyclic.is_empty());
  assert_topologically_valid(&analysis.graph, &analysis.order);
  assert_eq!(analysis.order.len(), models.len());
}

#[test]
fn test_alias_only_cycle_promotes_one_newtype() {
  let mut models = model_set([
    GeneratedModel::builder()
      .name("Tree")
      .kind(ModelKind::Scalar { ty: named("Forest") })
      .build(),
    GeneratedModel::builder()
      .name("Forest")
      .kind(ModelKind::ListAlias { item: named("Tree") })
      .build(),
    record("Node", &[("children", named("NodeList"))]),
    GeneratedModel::builder()
      .name("NodeList")
      .kind(ModelKind::ListAlias { item: named("Node") })
      .build(),
  ]);

  let analysis = analyze(&mut models);

  assert!(models.values().all(|m| m.cyclic));
  assert_eq!(analysis.broken.newtypes, ["Tree"]);
  assert!(models["Tree"].newtype);
  assert_eq!(models["Tree"].kind, ModelKind::Scalar { ty: TypeDescriptor::Forward("Forest".into()) });
  assert!(!models["Forest"].newtype);
  assert!(!models["NodeList"].newtype, "a loop through a record needs no newtype");
  assert!(detect_cycles(&analysis.graph).cyclic.is_empty());
  assert_topologically_valid(&analysis.graph, &analysis.order);
}

#[test]
fn test_self_reference() {
  let mut models = model_set([record(
    "Place",
    &[("children", TypeDescriptor::list(named("Place"))), ("parent", named("Place"))],
  )]);

  let analysis = analyze(&mut models);

  assert!(models["Place"].cyclic);
  assert_eq!(analysis.broken.fields_rewritten, 2);
  assert_eq!(models["Place"].fields()[1].ty.to_string(), "Box<Place>");
  assert_eq!(analysis.order, ["Place"]);
}

#[test]
fn test_graph_ignores_unknown_targets_and_unwraps_lists() {
  let models = model_set([
    record("Line", &[("statuses", TypeDescriptor::list(TypeDescriptor::list(named("Status"))))]),
    record("Status", &[("ghost", named("Missing"))]),
    GeneratedModel::builder()
      .name("Lines")
      .kind(ModelKind::ListAlias { item: named("Line") })
      .build(),
  ]);

  let graph = DependencyGraph::build(&models);

  let edges = graph.edges().collect::<Vec<_>>();
  assert_eq!(edges, [("Line", "Status", false), ("Lines", "Line", false)]);
  assert_eq!(topo_sort(&graph).order, ["Status", "Line", "Lines"]);
}

#[test]
fn test_topo_sort_appends_unbroken_cycles() {
  let models = model_set([
    record("X", &[("y", named("Y"))]),
    record("Y", &[("x", named("X"))]),
    record("Z", &[]),
  ]);

  let sorted = topo_sort(&DependencyGraph::build(&models));

  assert_eq!(sorted.order, ["Z", "X", "Y"]);
  assert_eq!(sorted.residual, ["X", "Y"]);
}
