use std::collections::{BTreeMap, BTreeSet};

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::{CONFIG_SUFFIX, generate_source};
use crate::generator::ast::{ApiDescriptor, Documentation, EndpointDescriptor, GeneratedModel, ParamDescriptor};

const NONE_GIVEN: &str = "None given";

/// Emits the client module of one API.
pub struct ClientGenerator<'a> {
  api: &'a ApiDescriptor,
  models: &'a BTreeMap<String, GeneratedModel>,
  base_url: &'a str,
}

impl<'a> ClientGenerator<'a> {
  pub fn new(api: &'a ApiDescriptor, models: &'a BTreeMap<String, GeneratedModel>, base_url: &'a str) -> Self {
    Self { api, models, base_url }
  }

  pub fn generate(&self) -> anyhow::Result<String> {
    generate_source(&self.tokens(), &format!("Client for {}", self.api.title))
  }

  pub fn tokens(&self) -> TokenStream {
    let client = format_ident!("{}", self.api.client_name);
    let config = format_ident!("{}{CONFIG_SUFFIX}", self.api.file_stem);
    let base_url = self.base_url;
    let imports = self.imports();
    let struct_doc = format!(" Client for the {} API.", self.api.title);
    let methods = self.api.endpoints.iter().map(|endpoint| method_tokens(endpoint, &config));

    quote! {
      #![allow(non_snake_case, clippy::too_many_arguments)]

      #imports

      pub const BASE_URL: &str = #base_url;

      #[doc = #struct_doc]
      #[derive(Debug, Clone)]
      pub struct #client {
        client: RestClient,
      }

      impl Default for #client {
        fn default() -> Self {
          Self::new()
        }
      }

      impl #client {
        pub fn new() -> Self {
          Self::with_base_url(BASE_URL)
        }

        pub fn with_base_url(base_url: impl Into<String>) -> Self {
          Self { client: RestClient::with_base_url(base_url) }
        }

        pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
          Self { client: RestClient::with_client(base_url, client) }
        }

        #(#methods)*
      }
    }
  }

  fn imports(&self) -> TokenStream {
    let config = format_ident!("{}{CONFIG_SUFFIX}", self.api.file_stem);
    let params = self
      .api
      .endpoints
      .iter()
      .flat_map(|endpoint| endpoint.path_params.iter().chain(&endpoint.query_params))
      .collect::<Vec<_>>();

    let mut models = BTreeSet::new();
    for endpoint in &self.api.endpoints {
      models.insert(endpoint.response_model.as_str());
    }
    for param in &params {
      if let Some(name) = param.ty.referenced_model()
        && self.models.contains_key(name)
      {
        models.insert(name);
      }
    }
    let models = models.into_iter().map(|name| format_ident!("{name}")).collect::<Vec<_>>();
    let model_import = (!models.is_empty()).then(|| quote! { use super::super::models::{#(#models),*}; });

    let mut support = vec![quote! { ApiError }, quote! { ResponseModel }, quote! { RestClient }];
    if !params.is_empty() {
      support.push(quote! { param_value });
    }
    support.push(quote! { reqwest });

    let map_import = params
      .iter()
      .any(|p| p.ty.uses_map())
      .then(|| quote! { use std::collections::HashMap; });
    let value_import = params
      .iter()
      .any(|p| p.ty.uses_map() || p.ty.uses_any())
      .then(|| quote! { use serde_json::Value; });

    quote! {
      #map_import
      #value_import
      use tfl_gen_support::{#(#support),*};

      #model_import
      use super::#config;
    }
  }
}

fn method_tokens(endpoint: &EndpointDescriptor, config: &proc_macro2::Ident) -> TokenStream {
  let name = format_ident!("{}", endpoint.method_name);
  let constant = format_ident!("{}", endpoint.const_name());
  let model = format_ident!("{}", endpoint.response_model);
  let docs = method_docs(endpoint);

  let args = endpoint.signature_params().into_iter().map(|param| {
    let ident = format_ident!("{}", param.ident);
    let ty = &param.ty;
    if param.required {
      quote! { #ident: #ty }
    } else {
      quote! { #ident: Option<#ty> }
    }
  });

  let path_values = endpoint.path_params.iter().map(|param| {
    let ident = format_ident!("{}", param.ident);
    quote! { param_value(&#ident) }
  });

  let (required, optional): (Vec<_>, Vec<_>) = endpoint.query_params.iter().partition(|param| param.required);
  let required = required.iter().map(|param| {
    let wire = &param.name;
    let ident = format_ident!("{}", param.ident);
    quote! { (#wire, param_value(&#ident)) }
  });
  let pushes = optional
    .iter()
    .map(|param| {
      let wire = &param.name;
      let ident = format_ident!("{}", param.ident);
      quote! {
        if let Some(value) = &#ident {
          query.push((#wire, param_value(value)));
        }
      }
    })
    .collect::<Vec<_>>();
  let query_binding = if pushes.is_empty() {
    quote! { let query: Vec<(&str, String)> }
  } else {
    quote! { let mut query: Vec<(&str, String)> }
  };

  quote! {
    #docs
    pub async fn #name(&self, #(#args),*) -> Result<ResponseModel<#model>, ApiError> {
      let path_params: Vec<String> = vec![#(#path_values),*];
      #query_binding = vec![#(#required),*];
      #(#pushes)*
      self
        .client
        .send_request_and_deserialize::<#model>(&#config::#constant, &path_params, &query)
        .await
    }
  }
}

/// Operation docs followed by one entry per parameter in signature order.
fn method_docs(endpoint: &EndpointDescriptor) -> Documentation {
  let mut docs = endpoint.docs.clone();
  if !docs.is_empty() {
    docs.push("");
  }
  docs.push(format!("`{} {}`", endpoint.method, endpoint.path));
  docs.push("");

  let params = endpoint.signature_params();
  if params.is_empty() {
    docs.push("No parameters required.");
    return docs;
  }

  docs.push("# Parameters");
  docs.push("");
  for param in params {
    docs.extend(param_docs(param));
  }
  docs
}

/// Signature line, then description and example. Multi-line descriptions keep their text and
/// continue under the first line.
fn param_docs(param: &ParamDescriptor) -> Vec<String> {
  let optional = if param.required { "" } else { ", optional" };
  let mut lines = vec![format!(
    "* `{}` (`{}`{optional}, {})",
    param.ident, param.ty, param.location
  )];

  let description = param
    .description
    .as_deref()
    .filter(|text| !text.trim().is_empty())
    .map_or_else(|| vec![NONE_GIVEN], |text| text.lines().collect());
  for (index, line) in description.into_iter().enumerate() {
    if index == 0 {
      lines.push(format!("  - Description: {line}"));
    } else {
      lines.push(format!("    {line}"));
    }
  }

  let example = param
    .example
    .as_deref()
    .map_or_else(|| NONE_GIVEN.to_string(), |example| format!("`{example}`"));
  lines.push(format!("  - Example: {example}"));
  lines
}
