//! Runtime support for clients generated by `tfl-gen`.
//!
//! Generated client methods delegate to [`RestClient::send_request_and_deserialize`] with an
//! [`Endpoint`] descriptor from their companion config module.

pub use http::Method;
pub use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
#[cfg(feature = "reqwest")]
pub use reqwest;

mod cache;
#[cfg(feature = "reqwest")]
mod client;
mod endpoint;
mod error;
mod params;

pub use cache::{CacheDirectives, CacheExpiry};
#[cfg(feature = "reqwest")]
pub use client::{DEFAULT_BASE_URL, RestClient};
pub use endpoint::{Endpoint, HttpMethod};
pub use error::{ApiError, ApiErrorBody, ApiErrorDetails, ModelError};
pub use params::{decode_model, param_value};

/// Characters left untouched when a value is substituted into a path segment.
pub const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

#[inline]
#[must_use]
pub fn percent_encode_path_segment(segment: &str) -> String {
  utf8_percent_encode(segment, PATH_ENCODE_SET).to_string()
}

/// A successfully decoded response together with the cache lifetimes the server advertised.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseModel<T> {
  pub content: T,
  pub content_expires: Option<chrono::DateTime<chrono::Utc>>,
  pub shared_expires: Option<chrono::DateTime<chrono::Utc>>,
}

impl<T> ResponseModel<T> {
  pub fn new(content: T, expiry: CacheExpiry) -> Self {
    Self {
      content,
      content_expires: expiry.content_expires,
      shared_expires: expiry.shared_expires,
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResponseModel<U> {
    ResponseModel {
      content: f(self.content),
      content_expires: self.content_expires,
      shared_expires: self.shared_expires,
    }
  }
}
