//! Read-through caching over the content repository.
//!
//! Published reads are memoized per query shape. An active draft mode
//! bypasses the cache entirely in both directions: a previewing editor
//! never sees a cached result, and draft content never lands in the cache
//! that anonymous readers share. Population takes no lock; concurrent
//! misses for one key may both recompute and overwrite, which is accepted
//! because the reads are idempotent.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::application::content::{ContentRepository, ListQuery, ResolvedPage};
use crate::application::context::RequestContext;
use crate::application::repos::RepoError;
use crate::cache::{CacheConfig, QueryCache, QueryKey};
use crate::domain::documents::ResolvedDocument;
use crate::domain::types::Collection;

const SOURCE: &str = "application::cached";

pub struct CachedContent {
    repo: ContentRepository,
    cache: Arc<QueryCache>,
    config: CacheConfig,
}

impl CachedContent {
    pub fn new(repo: ContentRepository, cache: Arc<QueryCache>, config: CacheConfig) -> Self {
        Self {
            repo,
            cache,
            config,
        }
    }

    pub fn repository(&self) -> &ContentRepository {
        &self.repo
    }

    /// List documents, serving from cache when possible.
    pub async fn find_many(
        &self,
        ctx: &RequestContext,
        collection: Collection,
        query: &ListQuery,
    ) -> Result<ResolvedPage, RepoError> {
        if ctx.draft_mode || !self.config.enabled {
            return self
                .repo
                .find_many(collection, ctx.locale, ctx.draft_mode, query)
                .await;
        }

        let key = QueryKey::list(collection, ctx.locale, query);
        if let Some(value) = self.cache.get(&key) {
            match serde_json::from_value::<ResolvedPage>(value) {
                Ok(page) => return Ok(page),
                Err(err) => {
                    warn!(source = SOURCE, error = %err, "Discarding undecodable cache entry");
                }
            }
        }

        let page = self
            .repo
            .find_many(collection, ctx.locale, false, query)
            .await?;

        let embeds_category = query.depth > 0 || query.category_slug.is_some();
        match serde_json::to_value(&page) {
            Ok(value) => self
                .cache
                .set(key, value, tags_for(collection, embeds_category)),
            Err(err) => {
                warn!(source = SOURCE, error = %err, "Skipping cache write: unserializable page");
            }
        }

        Ok(page)
    }

    /// Find one document by slug, serving from cache when possible.
    /// No-match results are cached too.
    pub async fn find_one(
        &self,
        ctx: &RequestContext,
        collection: Collection,
        slug: &str,
        depth: u8,
    ) -> Result<Option<ResolvedDocument>, RepoError> {
        if ctx.draft_mode || !self.config.enabled {
            return self
                .repo
                .find_one(collection, ctx.locale, ctx.draft_mode, slug, depth)
                .await;
        }

        let key = QueryKey::one(collection, ctx.locale, slug, depth);
        if let Some(value) = self.cache.get(&key) {
            match serde_json::from_value::<Option<ResolvedDocument>>(value) {
                Ok(doc) => return Ok(doc),
                Err(err) => {
                    warn!(source = SOURCE, error = %err, "Discarding undecodable cache entry");
                }
            }
        }

        let doc = self
            .repo
            .find_one(collection, ctx.locale, false, slug, depth)
            .await?;

        match serde_json::to_value(&doc) {
            Ok(value) => self.cache.set(key, value, tags_for(collection, depth > 0)),
            Err(err) => {
                warn!(source = SOURCE, error = %err, "Skipping cache write: unserializable document");
            }
        }

        Ok(doc)
    }

    /// Related documents are always read live; the result set shifts with
    /// every publication and is cheap relative to the detail query.
    pub async fn find_related(
        &self,
        ctx: &RequestContext,
        collection: Collection,
        exclude_id: Uuid,
        category_id: Option<Uuid>,
        limit: u32,
    ) -> Result<Vec<ResolvedDocument>, RepoError> {
        self.repo
            .find_related(
                collection,
                ctx.locale,
                ctx.draft_mode,
                exclude_id,
                category_id,
                limit,
            )
            .await
    }
}

fn tags_for(collection: Collection, embeds_category: bool) -> HashSet<Collection> {
    let mut tags = HashSet::from([collection]);
    if embeds_category && let Some(category_collection) = collection.category_collection() {
        tags.insert(category_collection);
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_tags_include_category_collection_when_embedding() {
        let tags = tags_for(Collection::News, true);
        assert!(tags.contains(&Collection::News));
        assert!(tags.contains(&Collection::NewsCategories));

        let shallow = tags_for(Collection::News, false);
        assert!(!shallow.contains(&Collection::NewsCategories));
    }

    #[test]
    fn category_collections_tag_only_themselves() {
        let tags = tags_for(Collection::NewsCategories, true);
        assert_eq!(tags, HashSet::from([Collection::NewsCategories]));
    }
}
