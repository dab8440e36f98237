use std::collections::BTreeSet;

use quote::{format_ident, quote};

use super::generate_source;
use crate::generator::ast::ApiDescriptor;

/// Response models used by any endpoint, sorted by name.
pub fn response_models(apis: &[ApiDescriptor]) -> BTreeSet<&str> {
  apis
    .iter()
    .flat_map(|api| &api.endpoints)
    .map(|endpoint| endpoint.response_model.as_str())
    .collect()
}

/// The `ResponseModel` sum type with a decoder per response model.
pub fn generate(apis: &[ApiDescriptor]) -> anyhow::Result<String> {
  let models = response_models(apis);
  let idents = models.iter().map(|name| format_ident!("{name}")).collect::<Vec<_>>();
  let names = models.iter().collect::<Vec<_>>();

  let imports = (!idents.is_empty()).then(|| quote! { use super::{#(#idents),*}; });

  let tokens = quote! {
    #![allow(non_camel_case_types)]

    use serde_json::Value;
    use tfl_gen_support::{ModelError, decode_model};

    #imports

    /// A decoded response body, tagged with the model it was decoded into.
    #[derive(Debug, Clone, PartialEq)]
    pub enum ResponseModel {
      #(#idents(#idents),)*
    }

    impl ResponseModel {
      /// Decodes `value` as the model called `model`.
      pub fn from_json(model: &str, value: Value) -> Result<Self, ModelError> {
        match model {
          #(#names => decode_model(model, value).map(Self::#idents),)*
          _ => Err(ModelError::Unknown { model: model.to_string() }),
        }
      }

      pub fn model_name(&self) -> &'static str {
        match *self {
          #(Self::#idents(_) => #names,)*
        }
      }
    }
  };
  generate_source(&tokens, "Response model registry")
}
