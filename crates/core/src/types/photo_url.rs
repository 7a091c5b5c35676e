//! Photo URL type.

use core::fmt;

use serde::{Deserialize, Serialize};
use url::{Host, Url};

/// Errors that can occur when parsing a [`PhotoUrl`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhotoUrlError {
    /// The input string is empty.
    #[error("url cannot be empty")]
    Empty,
    /// The input is not an absolute URL.
    #[error("not a well-formed url")]
    Malformed,
    /// The scheme is not `http` or `https`.
    #[error("url scheme must be http or https")]
    UnsupportedScheme,
    /// The host is missing or has no top-level domain.
    #[error("url must have a host with a top-level domain")]
    InvalidHost,
}

/// A well-formed absolute `http`/`https` URL pointing at an item photo.
///
/// ## Constraints
///
/// - Must parse as an absolute URL
/// - Scheme must be `http` or `https`
/// - Host must be an IP address or a domain with a top-level domain
///   (`localhost` is rejected)
///
/// ## Examples
///
/// ```
/// use grocery_core::PhotoUrl;
///
/// assert!(PhotoUrl::parse("https://cdn.example.com/apple.jpg").is_ok());
/// assert!(PhotoUrl::parse("not-a-url").is_err());
/// assert!(PhotoUrl::parse("ftp://example.com/apple.jpg").is_err());
/// assert!(PhotoUrl::parse("http://localhost/apple.jpg").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhotoUrl(String);

impl PhotoUrl {
    /// Parse a `PhotoUrl` from a string (surrounding whitespace is ignored).
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, is not an absolute URL, uses a
    /// scheme other than http(s), or lacks a host with a top-level domain.
    pub fn parse(s: &str) -> Result<Self, PhotoUrlError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PhotoUrlError::Empty);
        }

        let url = Url::parse(s).map_err(|_| PhotoUrlError::Malformed)?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(PhotoUrlError::UnsupportedScheme);
        }

        match url.host() {
            Some(Host::Ipv4(_) | Host::Ipv6(_)) => {}
            Some(Host::Domain(domain)) if has_top_level_domain(domain) => {}
            _ => return Err(PhotoUrlError::InvalidHost),
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A domain qualifies when it has at least two labels and the last one is
/// alphabetic (or an IDNA `xn--` label).
fn has_top_level_domain(domain: &str) -> bool {
    let mut labels = domain.trim_end_matches('.').rsplit('.');
    let Some(tld) = labels.next() else {
        return false;
    };
    let has_more_labels = labels.next().is_some_and(|label| !label.is_empty());

    has_more_labels
        && !tld.is_empty()
        && (tld.chars().all(|c| c.is_ascii_alphabetic()) || tld.starts_with("xn--"))
}

impl fmt::Display for PhotoUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PhotoUrl {
    type Err = PhotoUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PhotoUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for PhotoUrl {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for PhotoUrl {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for PhotoUrl {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
