use std::fmt;

use crate::error::{Error, Result};

/// Composite key joining "what the user asked about" with "what the catalog
/// reports": a host identifier plus the filesystem path it backs up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostPath {
    pub host: String,
    pub path: String,
}

impl HostPath {
    pub fn new<H: Into<String>, P: Into<String>>(host: H, path: P) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
        }
    }

    /// Parse `host:/backed/up/path` syntax. The first `:` splits host from
    /// path; the path may itself contain colons.
    pub fn parse(raw: &str) -> Result<Self> {
        let Some((host, path)) = raw.split_once(':') else {
            return Err(Error::msg(format!(
                "host path was not properly formatted (expected host:/path): {raw}"
            )));
        };
        if host.is_empty() {
            return Err(Error::msg(format!("host path has an empty host: {raw}")));
        }
        if path.is_empty() {
            return Err(Error::msg(format!("host path has an empty path: {raw}")));
        }
        Ok(Self::new(host, path))
    }
}

impl fmt::Display for HostPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.path)
    }
}

/// Validate and parse the full target list before anything talks to the
/// catalog. An empty list is rejected here, not treated as a vacuous success.
pub fn parse_targets<S: AsRef<str>>(raw: &[S]) -> Result<Vec<HostPath>> {
    if raw.is_empty() {
        return Err(Error::msg("at least one host:/path target is required"));
    }
    raw.iter().map(|s| HostPath::parse(s.as_ref())).collect()
}
