//! Validated network addresses of storage providers.

use std::{fmt, str::FromStr};

use url::Url;

use crate::{DiscoveryError, DiscoveryResult};

/// Schemes a storage provider may be reached on.
const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// A single validated storage provider URL.
///
/// Only absolute `http`/`https` URLs with a host are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpUrl(Url);

impl SpUrl {
    /// Validate a raw URL string.
    pub fn parse(raw: &str) -> DiscoveryResult<Self> {
        let raw = raw.trim();
        let invalid = |reason: String| DiscoveryError::InvalidUrl {
            url: raw.to_owned(),
            reason,
        };

        if raw.is_empty() {
            return Err(invalid("empty".to_owned()));
        }

        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        if !ALLOWED_SCHEMES.contains(&url.scheme()) {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host".to_owned()));
        }

        Ok(Self(url))
    }

    /// The underlying parsed URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// The URL as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for SpUrl {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SpUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One or more validated URLs of a storage provider.
///
/// A raw value may list several URLs separated by commas or whitespace. Any
/// invalid member rejects the whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Urls {
    primary: SpUrl,
    others: Vec<SpUrl>,
}

impl Urls {
    /// Validate a raw URL list.
    pub fn parse(raw: &str) -> DiscoveryResult<Self> {
        let mut urls = raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(SpUrl::parse)
            .collect::<DiscoveryResult<Vec<_>>>()?
            .into_iter();

        let primary = urls.next().ok_or_else(|| DiscoveryError::InvalidUrl {
            url: raw.to_owned(),
            reason: "no url given".to_owned(),
        })?;

        Ok(Self {
            primary,
            others: urls.collect(),
        })
    }

    /// The first (preferred) URL.
    pub fn primary(&self) -> &SpUrl {
        &self.primary
    }

    /// Iterate all URLs, primary first.
    pub fn iter(&self) -> impl Iterator<Item = &SpUrl> {
        std::iter::once(&self.primary).chain(self.others.iter())
    }

    /// Number of URLs.
    pub fn len(&self) -> usize {
        1 + self.others.len()
    }

    /// Never empty by construction.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for Urls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, url) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{url}")?;
        }
        Ok(())
    }
}
