use strum::Display;

use super::ast::{GeneratedModel, ModelKind};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationStats {
  pub documents_loaded: usize,
  pub schemas_renamed: usize,
  pub refs_rewritten: usize,
  pub duplicates_removed: usize,
  pub dedup_passes: usize,
  pub models_generated: usize,
  pub records_generated: usize,
  pub list_aliases_generated: usize,
  pub enums_generated: usize,
  pub open_models_generated: usize,
  pub scalars_generated: usize,
  pub endpoints_generated: usize,
  pub clients_generated: usize,
  pub cycles_detected: usize,
  pub cycle_details: Vec<Vec<String>>,
  pub forward_refs: usize,
  /// Alias models emitted as newtypes to close alias-only cycles.
  pub newtypes: Vec<String>,
  pub files_written: usize,
  pub warnings: Vec<GenerationWarning>,
}

impl GenerationStats {
  pub fn record_model(&mut self, model: &GeneratedModel) {
    self.models_generated += 1;
    match model.kind {
      ModelKind::Record { .. } => self.records_generated += 1,
      ModelKind::ListAlias { .. } => self.list_aliases_generated += 1,
      ModelKind::Enum { .. } => self.enums_generated += 1,
      ModelKind::Open => self.open_models_generated += 1,
      ModelKind::Scalar { .. } => self.scalars_generated += 1,
    }
  }

  pub fn record_models<'a>(&mut self, models: impl IntoIterator<Item = &'a GeneratedModel>) {
    for model in models {
      self.record_model(model);
    }
  }

  pub fn record_cycle(&mut self, cycle: Vec<String>) {
    self.cycles_detected += 1;
    self.cycle_details.push(cycle);
  }

  pub fn record_cycles(&mut self, cycles: Vec<Vec<String>>) {
    for cycle in cycles {
      self.record_cycle(cycle);
    }
  }

  pub fn record_warning(&mut self, warning: GenerationWarning) {
    self.warnings.push(warning);
  }

  pub fn record_warnings(&mut self, warnings: impl IntoIterator<Item = GenerationWarning>) {
    self.warnings.extend(warnings);
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GenerationWarning {
  #[strum(to_string = "No rename table for API '{title}'; schema names kept as-is")]
  UnmappedApi { title: String },
  #[strum(to_string = "Schema '{name}' from {document} replaced an earlier definition")]
  SchemaOverwritten { name: String, document: String },
  #[strum(to_string = "Schemas '{previous}' and '{replacement}' both sanitize to '{name}'; keeping '{replacement}'")]
  NameCollision {
    name: String,
    previous: String,
    replacement: String,
  },
  #[strum(to_string = "{location}: array without items, using a list of dynamic values")]
  MissingArrayItems { location: String },
  #[strum(to_string = "Model '{model}' has no properties, using an open map")]
  OpenObject { model: String },
  #[strum(to_string = "{location}: unmapped type '{type_name}', using a dynamic value")]
  UnmappedType { location: String, type_name: String },
  #[strum(to_string = "{location}: enum with non-string values, using the underlying primitive")]
  NonStringEnum { location: String },
  #[strum(to_string = "Enum '{original}' already defined with other values, generated as '{renamed}'")]
  EnumRenamed { original: String, renamed: String },
  #[strum(to_string = "[{operation_id}] {location} parameter '{name}' is not supported")]
  UnsupportedParameter {
    operation_id: String,
    name: String,
    location: String,
  },
  #[strum(to_string = "{location}: unknown model '{name}', using a dynamic value")]
  DanglingType { location: String, name: String },
  #[strum(to_string = "[{operation_id}] no typed JSON response, using the generic response model")]
  GenericResponse { operation_id: String },
  #[strum(to_string = "Could not order models {names}; appended in name order")]
  ResidualCycle { names: String },
}

impl GenerationWarning {
  pub fn is_skipped_item(&self) -> bool {
    matches!(self, Self::UnsupportedParameter { .. } | Self::ResidualCycle { .. })
  }
}
