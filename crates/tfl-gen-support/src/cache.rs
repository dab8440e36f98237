use chrono::{DateTime, TimeDelta, Utc};

/// The `Cache-Control` directives that drive response expiry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheDirectives {
  pub max_age: Option<i64>,
  pub s_maxage: Option<i64>,
}

impl CacheDirectives {
  /// Parses a `Cache-Control` header value. Unknown or malformed directives are ignored.
  #[must_use]
  pub fn parse(header: &str) -> Self {
    let mut directives = Self::default();
    for directive in header.split(',').map(str::trim).filter(|d| !d.is_empty()) {
      let Some((name, value)) = directive.split_once('=') else {
        continue;
      };
      let seconds = value.trim().trim_matches('"').parse::<i64>().ok();
      match name.trim().to_ascii_lowercase().as_str() {
        "max-age" => directives.max_age = seconds,
        "s-maxage" => directives.s_maxage = seconds,
        _ => {}
      }
    }
    directives
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheExpiry {
  pub content_expires: Option<DateTime<Utc>>,
  pub shared_expires: Option<DateTime<Utc>>,
}

impl CacheExpiry {
  /// Derives expiry timestamps from the response `Date` and `Cache-Control` headers.
  ///
  /// Both timestamps are `None` when the date is missing or not RFC 2822; each one is also
  /// `None` when its directive is absent.
  #[must_use]
  pub fn from_headers(date: Option<&str>, cache_control: Option<&str>) -> Self {
    let Some(date) = date.and_then(parse_http_date) else {
      return Self::default();
    };
    let directives = cache_control.map(CacheDirectives::parse).unwrap_or_default();

    Self {
      content_expires: directives.max_age.and_then(|secs| add_seconds(date, secs)),
      shared_expires: directives.s_maxage.and_then(|secs| add_seconds(date, secs)),
    }
  }
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc2822(value.trim())
    .ok()
    .map(|date| date.with_timezone(&Utc))
}

fn add_seconds(date: DateTime<Utc>, seconds: i64) -> Option<DateTime<Utc>> {
  date.checked_add_signed(TimeDelta::try_seconds(seconds)?)
}
