use http::{
  StatusCode,
  header::{CACHE_CONTROL, DATE},
};
use serde::de::DeserializeOwned;

use crate::{ApiError, CacheExpiry, Endpoint, ResponseModel};

pub const DEFAULT_BASE_URL: &str = "https://api.tfl.gov.uk";

/// Shared transport used by every generated API client.
#[derive(Debug, Clone)]
pub struct RestClient {
  client: reqwest::Client,
  base_url: String,
}

impl Default for RestClient {
  fn default() -> Self {
    Self::new()
  }
}

impl RestClient {
  #[must_use]
  pub fn new() -> Self {
    Self::with_base_url(DEFAULT_BASE_URL)
  }

  #[must_use]
  pub fn with_base_url(base_url: impl Into<String>) -> Self {
    Self::with_client(base_url, reqwest::Client::new())
  }

  #[must_use]
  pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
    let base_url: String = base_url.into();
    Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
    }
  }

  #[must_use]
  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Builds the absolute URL for `endpoint` with its path parameters substituted.
  pub fn url_for<S: AsRef<str>>(&self, endpoint: &Endpoint, path_params: &[S]) -> Result<String, ApiError> {
    Ok(format!("{}{}", self.base_url, endpoint.render_uri(path_params)?))
  }

  /// Sends the request described by `endpoint` and decodes a `200` body into `T`.
  ///
  /// Any other status becomes [`ApiError::Status`], carrying the structured error document when
  /// the body parses and the raw text otherwise.
  pub async fn send_request_and_deserialize<T: DeserializeOwned>(
    &self,
    endpoint: &Endpoint,
    path_params: &[String],
    query: &[(&str, String)],
  ) -> Result<ResponseModel<T>, ApiError> {
    let url = self.url_for(endpoint, path_params)?;

    let response = self
      .client
      .request(endpoint.method.into(), &url)
      .query(query)
      .send()
      .await
      .map_err(|source| ApiError::Transport {
        url: url.clone(),
        source,
      })?;

    let status = response.status();
    let expiry = CacheExpiry::from_headers(
      response.headers().get(DATE).and_then(|v| v.to_str().ok()),
      response.headers().get(CACHE_CONTROL).and_then(|v| v.to_str().ok()),
    );
    let body = response.text().await.map_err(|source| ApiError::Transport {
      url: url.clone(),
      source,
    })?;

    if status != StatusCode::OK {
      return Err(ApiError::from_status(
        status.as_u16(),
        status.canonical_reason().unwrap_or_default(),
        url,
        &body,
      ));
    }

    let mut de = serde_json::Deserializer::from_str(&body);
    let content = serde_path_to_error::deserialize(&mut de).map_err(|err| ApiError::Decode {
      model: endpoint.model.to_string(),
      url,
      path: err.path().to_string(),
      source: err.into_inner(),
    })?;

    Ok(ResponseModel::new(content, expiry))
  }
}
