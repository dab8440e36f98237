use http::Method;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::generate_source;
use crate::generator::ast::ApiDescriptor;

/// Endpoint constants for one API.
pub fn generate(api: &ApiDescriptor) -> anyhow::Result<String> {
  let consts = api.endpoints.iter().map(|endpoint| {
    let name = format_ident!("{}", endpoint.const_name());
    let operation_id = &endpoint.operation_id;
    let method = http_method(&endpoint.method);
    let uri = endpoint.positional_uri();
    let model = &endpoint.response_model;
    let doc = format!(" `{} {}`", endpoint.method, endpoint.path);
    quote! {
      #[doc = #doc]
      pub const #name: Endpoint = Endpoint::new(#operation_id, #method, #uri, #model);
    }
  });
  let names = api
    .endpoints
    .iter()
    .map(|endpoint| format_ident!("{}", endpoint.const_name()));

  let tokens = quote! {
    use tfl_gen_support::{Endpoint, HttpMethod};

    #(#consts)*

    pub const ENDPOINTS: &[Endpoint] = &[#(#names),*];
  };
  generate_source(&tokens, &format!("Endpoint configuration for {}", api.title))
}

fn http_method(method: &Method) -> TokenStream {
  match method.as_str() {
    "POST" => quote! { HttpMethod::Post },
    "PUT" => quote! { HttpMethod::Put },
    "DELETE" => quote! { HttpMethod::Delete },
    "PATCH" => quote! { HttpMethod::Patch },
    "HEAD" => quote! { HttpMethod::Head },
    "OPTIONS" => quote! { HttpMethod::Options },
    _ => quote! { HttpMethod::Get },
  }
}
