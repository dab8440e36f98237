use serde::{Deserialize, Serialize};

/// The error document the API returns alongside non-success statuses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorDetails {
  #[serde(default)]
  pub timestamp_utc: Option<String>,
  #[serde(default)]
  pub exception_type: Option<String>,
  #[serde(default)]
  pub http_status_code: Option<u16>,
  #[serde(default)]
  pub http_status: Option<String>,
  #[serde(default)]
  pub relative_uri: Option<String>,
  #[serde(default)]
  pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorBody {
  Structured(ApiErrorDetails),
  Raw(String),
}

impl ApiErrorBody {
  /// Keeps the raw text when the body is not a JSON error document.
  #[must_use]
  pub fn parse(body: &str) -> Self {
    match serde_json::from_str::<ApiErrorDetails>(body) {
      Ok(details) if details != ApiErrorDetails::default() => Self::Structured(details),
      _ => Self::Raw(body.to_string()),
    }
  }

  #[must_use]
  pub fn message(&self) -> &str {
    match self {
      Self::Structured(details) => details.message.as_deref().unwrap_or_default(),
      Self::Raw(text) => text,
    }
  }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error("{url} returned {status_code} {status}: {}", .body.message())]
  Status {
    status_code: u16,
    status: String,
    url: String,
    body: ApiErrorBody,
  },

  #[cfg(feature = "reqwest")]
  #[error("request to {url} failed: {source}")]
  Transport {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("failed to decode {model} from {url} at path {path}: {source}")]
  Decode {
    model: String,
    url: String,
    path: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("endpoint {operation_id} expects {expected} path parameters, got {actual}")]
  PathParameters {
    operation_id: String,
    expected: usize,
    actual: usize,
  },
}

/// Failure to turn a JSON document into a named response model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
  #[error("unknown response model '{model}'")]
  Unknown { model: String },

  #[error("failed to decode {model} at path {path}: {source}")]
  Decode {
    model: String,
    path: String,
    #[source]
    source: serde_json::Error,
  },
}

impl ApiError {
  #[must_use]
  pub fn from_status(status_code: u16, status: impl Into<String>, url: impl Into<String>, body: &str) -> Self {
    Self::Status {
      status_code,
      status: status.into(),
      url: url.into(),
      body: ApiErrorBody::parse(body),
    }
  }

  #[must_use]
  pub fn status_code(&self) -> Option<u16> {
    match self {
      Self::Status { status_code, .. } => Some(*status_code),
      _ => None,
    }
  }
}
