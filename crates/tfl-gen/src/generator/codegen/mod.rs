//! Rust source emission for the generated models, clients and configs.

pub mod client;
pub mod config;
pub mod diagram;
pub mod index;
pub mod models;
pub mod registry;

use std::{
  collections::{BTreeMap, BTreeSet},
  path::PathBuf,
};

use anyhow::Context;
use proc_macro2::TokenStream;

use super::{
  analyzer::DependencyGraph,
  ast::{ApiDescriptor, GeneratedModel},
};
use crate::naming::identifiers::module_file_stem;

pub const MODELS_DIR: &str = "models";
pub const CLIENTS_DIR: &str = "clients";
pub const REGISTRY_MODULE: &str = "registry";
pub const DIAGRAM_FILE: &str = "class_diagram.mmd";
pub const CONFIG_SUFFIX: &str = "_config";

/// Formats `tokens` as a Rust source file under the generated-code banner.
pub fn generate_source(tokens: &TokenStream, title: &str) -> anyhow::Result<String> {
  let syntax_tree = syn::parse2(tokens.clone()).with_context(|| format!("generated code for {title} does not parse"))?;
  let formatted = prettyplease::unparse(&syntax_tree);

  Ok(format!(
    "//! AUTO-GENERATED CODE - DO NOT EDIT!\n//!\n//! {title}\n//! Generated by `tfl-gen`\n\n{formatted}"
  ))
}

/// Module stem of every model, unique across the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleNames {
  stems: BTreeMap<String, String>,
}

impl ModuleNames {
  pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
    let mut taken = BTreeSet::from([REGISTRY_MODULE.to_string()]);
    let mut stems = BTreeMap::new();
    for name in names.into_iter().collect::<BTreeSet<_>>() {
      let base = module_file_stem(name);
      let stem = (1..)
        .map(|n| if n == 1 { base.clone() } else { format!("{base}_{n}") })
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or(base);
      taken.insert(stem.clone());
      stems.insert(name.to_string(), stem);
    }
    Self { stems }
  }

  pub fn stem(&self, name: &str) -> Option<&str> {
    self.stems.get(name).map(String::as_str)
  }
}

/// Everything the emitter needs, after analysis.
pub struct Emitter<'a> {
  models: &'a BTreeMap<String, GeneratedModel>,
  order: &'a [String],
  apis: &'a [ApiDescriptor],
  graph: &'a DependencyGraph,
  base_url: &'a str,
  modules: ModuleNames,
}

impl<'a> Emitter<'a> {
  pub fn new(
    models: &'a BTreeMap<String, GeneratedModel>,
    order: &'a [String],
    apis: &'a [ApiDescriptor],
    graph: &'a DependencyGraph,
    base_url: &'a str,
  ) -> Self {
    Self {
      models,
      order,
      apis,
      graph,
      base_url,
      modules: ModuleNames::new(models.keys().map(String::as_str)),
    }
  }

  /// Renders every output file, keyed by its path relative to the output directory.
  pub fn emit(&self) -> anyhow::Result<BTreeMap<PathBuf, String>> {
    let mut files = BTreeMap::new();
    let models_dir = PathBuf::from(MODELS_DIR);
    let clients_dir = PathBuf::from(CLIENTS_DIR);

    files.insert(PathBuf::from("mod.rs"), index::root_module()?);

    for name in self.order {
      let (Some(model), Some(stem)) = (self.models.get(name), self.modules.stem(name)) else {
        continue;
      };
      let source = models::ModelGenerator::new(&self.modules).generate(model)?;
      files.insert(models_dir.join(format!("{stem}.rs")), source);
    }
    files.insert(
      models_dir.join("mod.rs"),
      index::models_module(self.order, &self.modules)?,
    );
    files.insert(models_dir.join(format!("{REGISTRY_MODULE}.rs")), registry::generate(self.apis)?);

    for api in self.apis {
      files.insert(
        clients_dir.join(format!("{}.rs", api.file_stem)),
        client::ClientGenerator::new(api, self.models, self.base_url).generate()?,
      );
      files.insert(
        clients_dir.join(format!("{}{CONFIG_SUFFIX}.rs", api.file_stem)),
        config::generate(api)?,
      );
    }
    files.insert(clients_dir.join("mod.rs"), index::clients_module(self.apis)?);

    files.insert(PathBuf::from(DIAGRAM_FILE), diagram::generate(self.graph));
    Ok(files)
  }
}

#[cfg(test)]
mod tests;
