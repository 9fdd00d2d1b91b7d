//! Typed query façade over the document store.
//!
//! Translates semantic queries (collection, locale with fallback, category
//! slug, search, pagination, depth, draft flag) into generic store finds and
//! resolves the results for one locale.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::repos::{
    ContentStore, DocumentPage, Filter, FindRequest, RepoError, SortOrder,
};
use crate::domain::documents::ResolvedDocument;
use crate::domain::types::{Collection, Locale};

/// Category slug value meaning "no category filter".
const CATEGORY_ALL: &str = "all";

/// Parameters for a list query, before translation into store filters.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub category_slug: Option<String>,
    pub search: Option<String>,
    pub exclude_id: Option<Uuid>,
    pub sort: SortOrder,
    pub page: u32,
    pub limit: u32,
    pub depth: u8,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            category_slug: None,
            search: None,
            exclude_id: None,
            sort: SortOrder::default(),
            page: 1,
            limit: 10,
            depth: 1,
        }
    }
}

/// One page of locale-resolved documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPage {
    pub docs: Vec<ResolvedDocument>,
    pub total_pages: u32,
    pub page: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl ResolvedPage {
    pub fn empty(page: u32) -> Self {
        Self {
            docs: Vec::new(),
            total_pages: 0,
            page,
            has_next_page: false,
            has_prev_page: false,
        }
    }
}

pub struct ContentRepository {
    store: Arc<dyn ContentStore>,
    fallback_locale: Locale,
}

impl ContentRepository {
    pub fn new(store: Arc<dyn ContentStore>, fallback_locale: Locale) -> Self {
        Self {
            store,
            fallback_locale,
        }
    }

    /// List documents in a collection. An unknown category slug yields an
    /// empty page, not an error; so does any query with no matches.
    pub async fn find_many(
        &self,
        collection: Collection,
        locale: Locale,
        draft: bool,
        query: &ListQuery,
    ) -> Result<ResolvedPage, RepoError> {
        let mut filters = Vec::new();

        if let Some(slug) = query.category_slug.as_deref()
            && slug != CATEGORY_ALL
        {
            match self.resolve_category_id(collection, slug).await? {
                Some(category_id) => filters.push(Filter::CategoryEquals(category_id)),
                None => return Ok(ResolvedPage::empty(query.page)),
            }
        }

        if let Some(search) = query.search.as_deref() {
            let trimmed = search.trim();
            if !trimmed.is_empty() {
                filters.push(Filter::SearchContains(trimmed.to_string()));
            }
        }

        if let Some(exclude_id) = query.exclude_id {
            filters.push(Filter::IdNotEquals(exclude_id));
        }

        let request = FindRequest {
            collection,
            filters,
            sort: query.sort,
            page: query.page,
            limit: query.limit,
            depth: query.depth,
            draft,
        };

        let page = self.store.find(&request).await?;
        Ok(self.resolve_page(page, locale))
    }

    /// Find a single document by slug. `None` on no match, never an error.
    pub async fn find_one(
        &self,
        collection: Collection,
        locale: Locale,
        draft: bool,
        slug: &str,
        depth: u8,
    ) -> Result<Option<ResolvedDocument>, RepoError> {
        let request = FindRequest {
            collection,
            filters: vec![Filter::SlugEquals(slug.to_string())],
            sort: SortOrder::default(),
            page: 1,
            limit: 1,
            depth,
            draft,
        };

        let page = self.store.find(&request).await?;
        Ok(page
            .docs
            .into_iter()
            .next()
            .map(|doc| doc.resolve(locale, self.fallback_locale)))
    }

    /// Same-category documents excluding one id, most recent first.
    pub async fn find_related(
        &self,
        collection: Collection,
        locale: Locale,
        draft: bool,
        exclude_id: Uuid,
        category_id: Option<Uuid>,
        limit: u32,
    ) -> Result<Vec<ResolvedDocument>, RepoError> {
        let mut filters = vec![Filter::IdNotEquals(exclude_id)];
        if let Some(category_id) = category_id {
            filters.push(Filter::CategoryEquals(category_id));
        }

        let request = FindRequest {
            collection,
            filters,
            sort: SortOrder::PublishedAtDesc,
            page: 1,
            limit,
            depth: 1,
            draft,
        };

        let page = self.store.find(&request).await?;
        Ok(page
            .docs
            .into_iter()
            .map(|doc| doc.resolve(locale, self.fallback_locale))
            .collect())
    }

    /// Resolve a category slug to its id via the collection's category
    /// collection. Category lookups are always published-only; categories
    /// are not draftable content.
    async fn resolve_category_id(
        &self,
        collection: Collection,
        slug: &str,
    ) -> Result<Option<Uuid>, RepoError> {
        let Some(category_collection) = collection.category_collection() else {
            return Ok(None);
        };

        let request = FindRequest {
            collection: category_collection,
            filters: vec![Filter::SlugEquals(slug.to_string())],
            sort: SortOrder::default(),
            page: 1,
            limit: 1,
            depth: 0,
            draft: false,
        };

        let page = self.store.find(&request).await?;
        Ok(page.docs.first().map(|doc| doc.id))
    }

    fn resolve_page(&self, page: DocumentPage, locale: Locale) -> ResolvedPage {
        ResolvedPage {
            docs: page
                .docs
                .into_iter()
                .map(|doc| doc.resolve(locale, self.fallback_locale))
                .collect(),
            total_pages: page.total_pages,
            page: page.page,
            has_next_page: page.has_next_page,
            has_prev_page: page.has_prev_page,
        }
    }
}
