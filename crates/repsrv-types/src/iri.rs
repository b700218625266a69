use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::TypeError;

/// Absolute identifier naming a resource.
///
/// An `Iri` always has a scheme and a host. Equality, ordering, and hashing
/// follow the normalized string form produced by the `url` parser, so
/// `https://Example.org/a` and `https://example.org/a` name the same
/// resource.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Iri(Url);

impl Iri {
    /// Parse an absolute identifier.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let url = Url::parse(input).map_err(|e| TypeError::InvalidIri {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_url(url)
    }

    /// Build an identifier from its scheme, authority (`host[:port]`), and path.
    pub fn from_parts(scheme: &str, authority: &str, path: &str) -> Result<Self, TypeError> {
        Self::parse(&format!("{scheme}://{authority}{path}"))
    }

    /// Wrap an already-parsed URL. Fails if the URL has no host.
    pub fn from_url(url: Url) -> Result<Self, TypeError> {
        if url.cannot_be_a_base() || url.host_str().map_or(true, str::is_empty) {
            return Err(TypeError::InvalidIri {
                input: url.to_string(),
                reason: "identifier must have a host".into(),
            });
        }
        Ok(Self(url))
    }

    /// Same scheme and authority, different path. Query and fragment are dropped.
    pub fn with_path(&self, path: &str) -> Self {
        let mut url = self.0.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.set_path(path);
        Self(url)
    }

    /// The scheme (`http`, `https`, ...).
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// The host without port.
    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }

    /// The host, followed by `:port` when a non-default port is present.
    pub fn authority(&self) -> String {
        match self.0.port() {
            Some(port) => format!("{}:{port}", self.host()),
            None => self.host().to_string(),
        }
    }

    /// The path component.
    pub fn path(&self) -> &str {
        self.0.path()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Debug for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Iri({})", self.0)
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for Iri {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Iri {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Iri> for String {
    fn from(iri: Iri) -> Self {
        iri.0.into()
    }
}
