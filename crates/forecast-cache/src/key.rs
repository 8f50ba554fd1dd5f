//! Cache key convention
//!
//! Keys read `<category>-<scope>-<detail>...`. Client-scoped results use the
//! `client` category with the client id as scope, which is what
//! [`crate::ResultCache::clear_client`] matches on.

use std::fmt;

/// Category of client-scoped keys
pub const CLIENT_CATEGORY: &str = "client";

/// Builder for cache keys
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    category: String,
    scope: String,
    detail: Vec<String>,
}

impl CacheKey {
    /// Key in `category` for `scope`
    #[must_use]
    pub fn new(category: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            scope: scope.into(),
            detail: Vec::new(),
        }
    }

    /// Key scoped to one client
    #[inline]
    #[must_use]
    pub fn client(client_id: &str) -> Self {
        Self::new(CLIENT_CATEGORY, client_id.trim())
    }

    /// Append a detail segment
    #[must_use]
    pub fn with(mut self, detail: impl fmt::Display) -> Self {
        self.detail.push(detail.to_string());
        self
    }

    /// Prefix shared by every key of one client
    #[must_use]
    pub fn client_prefix(client_id: &str) -> String {
        format!("{CLIENT_CATEGORY}-{}-", client_id.trim())
    }

    /// Final key string
    #[must_use]
    pub fn build(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.category, self.scope)?;
        for detail in &self.detail {
            write!(f, "-{detail}")?;
        }
        Ok(())
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.to_string()
    }
}
