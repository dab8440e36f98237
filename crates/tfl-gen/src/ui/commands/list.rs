use std::path::Path;

use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Row, Table};

use crate::{
  generator::{
    orchestrator::{GeneratorConfig, Orchestrator},
    policy::RenamePolicy,
  },
  naming::identifiers::fallback_operation_id,
  ui::{Colors, colors::table_color, term_width},
  utils::spec::{load_documents, load_specs},
};

fn new_table(colors: &Colors, headers: &[&str]) -> Table {
  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(term_width());

  let mut row = Row::new();
  for header in headers {
    row.add_cell(Cell::new(header).fg(table_color(colors.label())));
  }
  table.set_header(row);
  table
}

pub async fn list_operations(input: &Path, colors: &Colors) -> anyhow::Result<()> {
  let mut operations = vec![];
  for (_, spec) in load_specs(input).await? {
    for (path, method, operation) in spec.operations() {
      let id = operation
        .operation_id
        .clone()
        .unwrap_or_else(|| fallback_operation_id(method.as_str(), &path));
      operations.push((spec.info.title.clone(), id, method.as_str().to_string(), path));
    }
  }
  operations.sort();

  let mut table = new_table(colors, &["API", "OPERATION ID", "METHOD", "PATH"]);
  for (api, operation_id, method, path) in operations {
    let mut row = Row::new();
    row.add_cell(Cell::new(api).fg(table_color(colors.info())));
    row.add_cell(
      Cell::new(operation_id)
        .fg(table_color(colors.value()))
        .add_attribute(Attribute::Bold),
    );
    row.add_cell(
      Cell::new(method)
        .fg(table_color(colors.accent()))
        .set_alignment(CellAlignment::Right),
    );
    row.add_cell(Cell::new(path).fg(table_color(colors.primary())));
    table.add_row(row);
  }

  println!("{table}");
  Ok(())
}

pub async fn list_models(input: &Path, policy: Option<&Path>, colors: &Colors) -> anyhow::Result<()> {
  let policy = RenamePolicy::resolve(policy).await?;
  let documents = load_documents(input).await?;
  let resolved = Orchestrator::new(documents, policy, GeneratorConfig::default()).resolve()?;

  let mut table = new_table(colors, &["#", "MODEL", "KIND", "SOURCE", "CYCLIC"]);
  for (position, name) in resolved.analysis.order.iter().enumerate() {
    let Some(model) = resolved.models.get(name) else {
      continue;
    };
    let mut row = Row::new();
    row.add_cell(
      Cell::new(position + 1)
        .fg(table_color(colors.timestamp()))
        .set_alignment(CellAlignment::Right),
    );
    row.add_cell(
      Cell::new(&model.name)
        .fg(table_color(colors.value()))
        .add_attribute(Attribute::Bold),
    );
    row.add_cell(Cell::new(model.kind.label()).fg(table_color(colors.accent())));
    row.add_cell(Cell::new(&model.source).fg(table_color(colors.primary())));
    row.add_cell(Cell::new(if model.cyclic { "yes" } else { "" }).fg(table_color(colors.info())));
    table.add_row(row);
  }

  println!("{table}");
  Ok(())
}
