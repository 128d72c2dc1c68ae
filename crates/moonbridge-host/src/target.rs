use std::fmt;

/// The resolved HTTP endpoint of the printer host service.
///
/// Immutable for the life of one bridge session; the supervisor resolves a
/// fresh target whenever discovery re-runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTarget {
    /// URL scheme, `http` unless overridden.
    pub scheme: String,
    /// Host name or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl HostTarget {
    /// Build a target from its parts.
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port,
        }
    }

    /// Base URL without a trailing separator.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Full URL for a request path. The path is appended as-is; the codec
    /// already guaranteed the leading separator.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }
}

impl fmt::Display for HostTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url())
    }
}
