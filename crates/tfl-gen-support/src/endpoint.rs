use crate::{error::ApiError, percent_encode_path_segment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
  #[default]
  Get,
  Post,
  Put,
  Delete,
  Patch,
  Head,
  Options,
}

impl HttpMethod {
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Get => "GET",
      Self::Post => "POST",
      Self::Put => "PUT",
      Self::Delete => "DELETE",
      Self::Patch => "PATCH",
      Self::Head => "HEAD",
      Self::Options => "OPTIONS",
    }
  }
}

impl From<HttpMethod> for http::Method {
  fn from(method: HttpMethod) -> Self {
    match method {
      HttpMethod::Get => http::Method::GET,
      HttpMethod::Post => http::Method::POST,
      HttpMethod::Put => http::Method::PUT,
      HttpMethod::Delete => http::Method::DELETE,
      HttpMethod::Patch => http::Method::PATCH,
      HttpMethod::Head => http::Method::HEAD,
      HttpMethod::Options => http::Method::OPTIONS,
    }
  }
}

impl std::fmt::Display for HttpMethod {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Static description of one API operation.
///
/// `uri` uses positional placeholders (`/Line/{0}/Status`) that are filled, in order, from the
/// path parameters handed to [`Endpoint::render_uri`]. `model` names the response model the
/// body decodes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
  pub operation_id: &'static str,
  pub method: HttpMethod,
  pub uri: &'static str,
  pub model: &'static str,
}

impl Endpoint {
  #[must_use]
  pub const fn new(operation_id: &'static str, method: HttpMethod, uri: &'static str, model: &'static str) -> Self {
    Self {
      operation_id,
      method,
      uri,
      model,
    }
  }

  /// Number of `{n}` placeholders in the uri template.
  #[must_use]
  pub fn placeholder_count(&self) -> usize {
    let mut count = 0;
    let mut rest = self.uri;
    while let Some(start) = rest.find('{') {
      let Some(len) = rest[start..].find('}') else {
        break;
      };
      count += 1;
      rest = &rest[start + len + 1..];
    }
    count
  }

  pub fn render_uri<S: AsRef<str>>(&self, path_params: &[S]) -> Result<String, ApiError> {
    let expected = self.placeholder_count();
    if expected != path_params.len() {
      return Err(ApiError::PathParameters {
        operation_id: self.operation_id.to_string(),
        expected,
        actual: path_params.len(),
      });
    }

    let mut uri = self.uri.to_string();
    for (index, value) in path_params.iter().enumerate() {
      uri = uri.replace(&format!("{{{index}}}"), &percent_encode_path_segment(value.as_ref()));
    }
    Ok(uri)
  }
}
