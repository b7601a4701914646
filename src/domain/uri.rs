//! Entity URIs.
//!
//! Every revision, type and method is addressed by a structured URI of the form
//! `scheme://forge!product$version/namespace/Type.method(args)return`. Any
//! prefix may be dropped, so `/namespace/Type` and `//product$version/ns/T.m()`
//! are valid too. Two URIs are equal iff their canonical strings are equal.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::error::{CallGraphError, CallGraphResult};

/// Scheme used for derived revision URIs.
pub const REVISION_SCHEME: &str = "fasten";

/// A parsed entity URI.
#[derive(Debug, Clone)]
pub struct EntityUri {
    raw: String,
    path_start: usize,
    scheme: Option<String>,
    forge: Option<String>,
    product: Option<String>,
    version: Option<String>,
    namespace: Option<String>,
    entity: Option<String>,
}

impl EntityUri {
    /// Parse a URI string. Fails immediately on malformed input.
    pub fn parse(input: &str) -> CallGraphResult<Self> {
        if input.is_empty() {
            return Err(CallGraphError::malformed_uri(input, "empty URI"));
        }
        if input.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(CallGraphError::malformed_uri(
                input,
                "contains whitespace or control characters",
            ));
        }

        let mut uri = EntityUri {
            raw: input.to_string(),
            path_start: 0,
            scheme: None,
            forge: None,
            product: None,
            version: None,
            namespace: None,
            entity: None,
        };

        let (authority, path) = if let Some(rest) = input.strip_prefix("//") {
            split_authority(rest)
        } else if input.starts_with('/') {
            (None, input)
        } else {
            let colon = input
                .find(':')
                .ok_or_else(|| CallGraphError::malformed_uri(input, "path must start with '/'"))?;
            let scheme = &input[..colon];
            if !is_valid_scheme(scheme) {
                return Err(CallGraphError::malformed_uri(input, "invalid scheme"));
            }
            let rest = input[colon + 1..].strip_prefix("//").ok_or_else(|| {
                CallGraphError::malformed_uri(input, "scheme must be followed by '//'")
            })?;
            uri.scheme = Some(scheme.to_string());
            split_authority(rest)
        };

        uri.path_start = input.len() - path.len();
        if let Some(authority) = authority {
            uri.parse_authority(input, authority)?;
        }
        uri.parse_path(input, path)?;
        Ok(uri)
    }

    /// `fasten://{forge}!{product}${version}`
    pub fn revision(forge: &str, product: &str, version: &str) -> CallGraphResult<Self> {
        let uri = Self::parse(&format!(
            "{}://{}!{}${}",
            REVISION_SCHEME, forge, product, version
        ))?;
        uri.expect_coordinates(Some(forge), product, version)?;
        Ok(uri)
    }

    /// `fasten://{product}${version}`
    pub fn forgeless(product: &str, version: &str) -> CallGraphResult<Self> {
        let uri = Self::parse(&format!("{}://{}${}", REVISION_SCHEME, product, version))?;
        uri.expect_coordinates(None, product, version)?;
        Ok(uri)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn forge(&self) -> Option<&str> {
        self.forge.as_deref()
    }

    pub fn product(&self) -> Option<&str> {
        self.product.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Everything after `/namespace/`, e.g. `Lib.foo()%2Fjava.lang%2FVoid`.
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    /// The part of the URI before the path (`scheme://authority`), possibly empty.
    pub fn prefix(&self) -> &str {
        &self.raw[..self.path_start]
    }

    fn parse_authority(&mut self, input: &str, authority: &str) -> CallGraphResult<()> {
        if authority.is_empty() {
            return Err(CallGraphError::malformed_uri(input, "empty authority"));
        }
        let rest = match authority.split_once('!') {
            Some((forge, rest)) => {
                if forge.is_empty() {
                    return Err(CallGraphError::malformed_uri(input, "empty forge before '!'"));
                }
                self.forge = Some(forge.to_string());
                rest
            }
            None => authority,
        };
        let product = match rest.split_once('$') {
            Some((product, version)) => {
                if version.is_empty() {
                    return Err(CallGraphError::malformed_uri(input, "empty version after '$'"));
                }
                self.version = Some(version.to_string());
                product
            }
            None => rest,
        };
        if product.is_empty() {
            return Err(CallGraphError::malformed_uri(input, "empty product"));
        }
        self.product = Some(product.to_string());
        Ok(())
    }

    fn parse_path(&mut self, input: &str, path: &str) -> CallGraphResult<()> {
        if path.is_empty() {
            return Ok(());
        }
        let path = path
            .strip_prefix('/')
            .ok_or_else(|| CallGraphError::malformed_uri(input, "path must start with '/'"))?;
        let (namespace, entity) = match path.split_once('/') {
            Some((ns, entity)) => (ns, Some(entity)),
            None => (path, None),
        };
        if namespace.is_empty() {
            return Err(CallGraphError::malformed_uri(input, "empty namespace"));
        }
        self.namespace = Some(namespace.to_string());
        if let Some(entity) = entity {
            if entity.is_empty() {
                return Err(CallGraphError::malformed_uri(input, "empty entity"));
            }
            self.entity = Some(entity.to_string());
        }
        Ok(())
    }

    fn expect_coordinates(
        &self,
        forge: Option<&str>,
        product: &str,
        version: &str,
    ) -> CallGraphResult<()> {
        let matches = self.forge() == forge
            && self.product() == Some(product)
            && self.version() == Some(version)
            && self.namespace.is_none();
        if matches {
            Ok(())
        } else {
            Err(CallGraphError::malformed_uri(
                &self.raw,
                "coordinates contain reserved characters ('!', '$' or '/')",
            ))
        }
    }
}

fn split_authority(rest: &str) -> (Option<&str>, &str) {
    match rest.find('/') {
        Some(slash) => (Some(&rest[..slash]), &rest[slash..]),
        None => (Some(rest), ""),
    }
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        }
        _ => false,
    }
}

impl PartialEq for EntityUri {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for EntityUri {}

impl Hash for EntityUri {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl PartialOrd for EntityUri {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EntityUri {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl fmt::Display for EntityUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for EntityUri {
    type Err = CallGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityUri::parse(s)
    }
}

impl TryFrom<&str> for EntityUri {
    type Error = CallGraphError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        EntityUri::parse(value)
    }
}

impl AsRef<str> for EntityUri {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl Serialize for EntityUri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for EntityUri {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        EntityUri::parse(&raw).map_err(serde::de::Error::custom)
    }
}
