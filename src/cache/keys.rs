//! Cache key definitions.
//!
//! A `QueryKey` is a deterministic encoding of every parameter that shapes a
//! query result; two reads compute the same key exactly when they would
//! return the same data from an unchanged store.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::application::content::ListQuery;
use crate::domain::types::{Collection, Locale};

/// Key for one cached query result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    List {
        collection: Collection,
        locale: Locale,
        filter_hash: u64,
        page: u32,
        limit: u32,
        depth: u8,
    },
    One {
        collection: Collection,
        locale: Locale,
        slug: String,
        depth: u8,
    },
}

impl QueryKey {
    pub fn list(collection: Collection, locale: Locale, query: &ListQuery) -> Self {
        Self::List {
            collection,
            locale,
            filter_hash: hash_list_filters(query),
            page: query.page,
            limit: query.limit,
            depth: query.depth,
        }
    }

    pub fn one(collection: Collection, locale: Locale, slug: &str, depth: u8) -> Self {
        Self::One {
            collection,
            locale,
            slug: slug.to_string(),
            depth,
        }
    }
}

/// Compute a hash for any hashable value.
pub fn hash_value<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Hash the filter-shaping parts of a list query (pagination and depth are
/// key fields of their own).
pub fn hash_list_filters(query: &ListQuery) -> u64 {
    let mut hasher = DefaultHasher::new();
    query.category_slug.hash(&mut hasher);
    query.search.hash(&mut hasher);
    query.exclude_id.hash(&mut hasher);
    query.sort.hash(&mut hasher);
    hasher.finish()
}
