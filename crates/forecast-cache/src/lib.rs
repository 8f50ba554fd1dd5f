//! Forecast Cache
//!
//! TTL-bounded cache for computed matrices, shared by the engine's callers.
//! Keys follow the `<category>-<scope>-<detail>` convention of [`CacheKey`]
//! so client-scoped results can be purged by prefix.

#![warn(unreachable_pub)]

pub mod cache;
pub mod error;
pub mod key;

pub use cache::{CacheEntry, CacheStats, ResultCache, DEFAULT_MAX_CAPACITY, DEFAULT_TTL};
pub use error::{CacheError, CacheResult};
pub use key::{CacheKey, CLIENT_CATEGORY};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
