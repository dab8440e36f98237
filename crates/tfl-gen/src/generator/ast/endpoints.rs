use http::Method;
use inflections::Inflect;

use super::{Documentation, TypeDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::Display)]
pub enum ParamLocation {
  #[strum(to_string = "path")]
  Path,
  #[strum(to_string = "query")]
  Query,
}

#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct ParamDescriptor {
  /// Name on the wire (path placeholder or query key).
  #[builder(into)]
  pub name: String,
  #[builder(into)]
  pub ident: String,
  pub ty: TypeDescriptor,
  pub location: ParamLocation,
  #[builder(default)]
  pub required: bool,
  #[builder(into)]
  pub description: Option<String>,
  #[builder(into)]
  pub example: Option<String>,
}

/// One REST operation reduced to what the client and config emitters need.
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct EndpointDescriptor {
  #[builder(into)]
  pub operation_id: String,
  #[builder(into)]
  pub method_name: String,
  pub method: Method,
  /// Path template with named placeholders, as declared (`/Line/{ids}/Status`).
  #[builder(into)]
  pub path: String,
  /// Path parameters in template order.
  #[builder(default)]
  pub path_params: Vec<ParamDescriptor>,
  /// Query parameters, required ones first.
  #[builder(default)]
  pub query_params: Vec<ParamDescriptor>,
  #[builder(into)]
  pub response_model: String,
  #[builder(default)]
  pub docs: Documentation,
}

impl EndpointDescriptor {
  /// Path template with positional placeholders (`/Line/{0}/Status`).
  pub fn positional_uri(&self) -> String {
    let mut uri = self.path.clone();
    for (index, param) in self.path_params.iter().enumerate() {
      uri = uri.replace(&format!("{{{}}}", param.name), &format!("{{{index}}}"));
    }
    uri
  }

  pub fn const_name(&self) -> String {
    let name = self.method_name.to_constant_case();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
      format!("OP_{name}")
    } else {
      name
    }
  }

  /// Parameters in signature order: required first, then optional, each group in declared order.
  pub fn signature_params(&self) -> Vec<&ParamDescriptor> {
    let all = || self.path_params.iter().chain(&self.query_params);
    all().filter(|p| p.required).chain(all().filter(|p| !p.required)).collect()
  }
}

/// The client surface generated for one source document.
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct ApiDescriptor {
  #[builder(into)]
  pub title: String,
  /// Client struct name, e.g. `LineClient`.
  #[builder(into)]
  pub client_name: String,
  #[builder(into)]
  pub file_stem: String,
  #[builder(into)]
  pub document: String,
  #[builder(default)]
  pub endpoints: Vec<EndpointDescriptor>,
}
