//! Conversion of merged schemas and operations into generated models and API descriptors.

pub mod endpoints;
pub mod model_builder;
pub mod type_mapper;

use std::collections::{BTreeMap, BTreeSet};

pub use endpoints::EndpointBuilder;
pub use model_builder::ModelBuilder;
pub use type_mapper::{MappedType, TypeMapper};

use super::{
  ast::{ApiDescriptor, GeneratedModel, TypeDescriptor},
  metrics::GenerationWarning,
};

/// The run's models keyed by name, with the warnings raised while collecting them.
#[derive(Debug, Clone, Default)]
pub struct ModelSet {
  pub models: BTreeMap<String, GeneratedModel>,
  pub warnings: Vec<GenerationWarning>,
}

impl ModelSet {
  /// Adds a model built from a schema; an existing model of the same name is replaced.
  pub fn insert(&mut self, model: GeneratedModel) {
    if let Some(previous) = self.models.get(&model.name)
      && previous != &model
    {
      self.warnings.push(GenerationWarning::NameCollision {
        name: model.name.clone(),
        previous: previous.source.clone(),
        replacement: model.source.clone(),
      });
    }
    self.models.insert(model.name.clone(), model);
  }

  /// Takes in the inline enums and warnings of a mapped type and returns its descriptor.
  pub fn absorb(&mut self, mapped: MappedType) -> TypeDescriptor {
    for model in mapped.inline_enums {
      if self.models.get(&model.name).is_none_or(|existing| existing.kind != model.kind) {
        self.insert(model);
      }
    }
    self.warnings.extend(mapped.warnings);
    mapped.ty
  }

  pub fn contains(&self, name: &str) -> bool {
    self.models.contains_key(name)
  }

  #[cfg(test)]
  pub fn get(&self, name: &str) -> Option<&GeneratedModel> {
    self.models.get(name)
  }

  /// Degrades every model and parameter type naming a model outside the set to a dynamic
  /// value, with a warning per occurrence.
  pub fn degrade_dangling_types(&mut self, apis: &mut [ApiDescriptor]) {
    let known = self.models.keys().cloned().collect::<BTreeSet<_>>();
    let is_known = |name: &str| known.contains(name);

    for model in self.models.values_mut() {
      let owner = model.name.clone();
      for (field, ty) in model.type_descriptors_mut() {
        if let Some(name) = ty.degrade_unknown(&is_known) {
          self.warnings.push(GenerationWarning::DanglingType {
            location: format!("{owner}.{field}"),
            name,
          });
        }
      }
    }

    for endpoint in apis.iter_mut().flat_map(|api| api.endpoints.iter_mut()) {
      for param in endpoint.path_params.iter_mut().chain(endpoint.query_params.iter_mut()) {
        if let Some(name) = param.ty.degrade_unknown(&is_known) {
          self.warnings.push(GenerationWarning::DanglingType {
            location: format!("[{}] parameter '{}'", endpoint.operation_id, param.name),
            name,
          });
        }
      }
    }
  }
}
