use quote::{format_ident, quote};

use super::{CLIENTS_DIR, CONFIG_SUFFIX, MODELS_DIR, ModuleNames, REGISTRY_MODULE, generate_source};
use crate::generator::ast::ApiDescriptor;

pub fn root_module() -> anyhow::Result<String> {
  let models = format_ident!("{MODELS_DIR}");
  let clients = format_ident!("{CLIENTS_DIR}");
  let tokens = quote! {
    pub mod #models;
    pub mod #clients;
  };
  generate_source(&tokens, "Generated TfL API surface")
}

/// Model index in topological order, followed by the response registry.
pub fn models_module(order: &[String], modules: &ModuleNames) -> anyhow::Result<String> {
  let entries = order
    .iter()
    .filter_map(|name| modules.stem(name).map(|stem| (format_ident!("{stem}"), format_ident!("{name}"))))
    .collect::<Vec<_>>();

  let mods = entries.iter().map(|(stem, name)| {
    quote! {
      mod #stem;
      pub use #stem::#name;
    }
  });
  let names = order.iter().filter(|name| modules.stem(name).is_some());
  let registry = format_ident!("{REGISTRY_MODULE}");

  let tokens = quote! {
    #![allow(non_camel_case_types)]

    #(#mods)*

    pub mod #registry;

    /// Every generated model, in emission order.
    pub const MODELS: &[&str] = &[#(#names),*];
  };
  generate_source(&tokens, "Model index")
}

pub fn clients_module(apis: &[ApiDescriptor]) -> anyhow::Result<String> {
  let mods = apis.iter().map(|api| {
    let stem = format_ident!("{}", api.file_stem);
    let config = format_ident!("{}{CONFIG_SUFFIX}", api.file_stem);
    let client = format_ident!("{}", api.client_name);
    quote! {
      pub mod #config;
      mod #stem;
      pub use #stem::#client;
    }
  });
  let titles = apis.iter().map(|api| &api.title);

  let tokens = quote! {
    #(#mods)*

    /// Title of every API with a generated client.
    pub const APIS: &[&str] = &[#(#titles),*];
  };
  generate_source(&tokens, "Client index")
}
