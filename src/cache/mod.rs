//! Query cache for published content reads.
//!
//! Cached entries are keyed by the full query shape and tagged with the
//! collections they depend on. Invalidation is tag-based: the external
//! write path reports a changed collection and every dependent entry is
//! marked stale. Draft-mode reads never touch this cache.
//!
//! Behavior is controlled via `vetrina.toml`:
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 3600
//! entry_limit = 256
//! ```

mod config;
mod keys;
mod lock;
mod store;

pub use config::CacheConfig;
pub use keys::{QueryKey, hash_list_filters, hash_value};
pub use store::QueryCache;
