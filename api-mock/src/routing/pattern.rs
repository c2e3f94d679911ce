use std::fmt;

/// Path pattern a route is registered under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathPattern {
    /// Matches one path exactly
    Exact(String),
    /// Matches every path starting with the prefix
    Prefix(String),
}

impl PathPattern {
    /// Pattern matching exactly `path`
    pub fn exact<S: Into<String>>(path: S) -> Self {
        Self::Exact(path.into())
    }

    /// Pattern matching every path sharing `pattern`'s prefix; a trailing `*` is optional
    pub fn wildcard<S: Into<String>>(pattern: S) -> Self {
        let pattern = pattern.into();
        let prefix = pattern.strip_suffix('*').unwrap_or(&pattern);
        Self::Prefix(prefix.to_string())
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Prefix(_))
    }

    /// Whether a request path is accepted by this pattern
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(expected) => path == expected,
            Self::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }

    /// Ordering key for picking the most specific match
    ///
    /// Exact patterns always outrank wildcards; longer prefixes outrank shorter ones.
    pub fn specificity(&self) -> (u8, usize) {
        match self {
            Self::Exact(path) => (1, path.len()),
            Self::Prefix(prefix) => (0, prefix.len()),
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(path) => write!(f, "{}", path),
            Self::Prefix(prefix) => write!(f, "{}*", prefix),
        }
    }
}
