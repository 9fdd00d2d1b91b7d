//! In-memory content store.
//!
//! A faithful twin of the Postgres adapter for tests and databaseless
//! local runs: same filter, sort, pagination, and depth semantics, backed
//! by a plain vector. Also counts `find` calls so tests can assert whether
//! the cache or the store served a read.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{
    ContentStore, DocumentPage, Filter, FindRequest, NewSubmission, RepoError, SortOrder,
    SubmissionSink,
};
use crate::domain::documents::Document;
use crate::domain::types::DocumentStatus;

#[derive(Default)]
pub struct MemoryContentStore {
    documents: RwLock<Vec<Document>>,
    submissions: RwLock<Vec<(Uuid, NewSubmission)>>,
    find_calls: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document by id.
    pub fn insert(&self, doc: Document) {
        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = documents.iter_mut().find(|d| d.id == doc.id) {
            *existing = doc;
        } else {
            documents.push(doc);
        }
    }

    pub fn remove(&self, id: Uuid) {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|d| d.id != id);
    }

    /// Number of `find` calls served so far.
    pub fn find_call_count(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent `find` fail, to exercise error propagation.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn submissions(&self) -> Vec<NewSubmission> {
        self.submissions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, s)| s.clone())
            .collect()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn find(&self, request: &FindRequest) -> Result<DocumentPage, RepoError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::Persistence("simulated store failure".into()));
        }
        if request.limit == 0 {
            return Err(RepoError::invalid_query("limit must be greater than zero"));
        }

        let documents = self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let mut matches: Vec<Document> = documents
            .iter()
            .filter(|doc| doc.collection == request.collection)
            .filter(|doc| request.draft || doc.status == DocumentStatus::Published)
            .filter(|doc| request.filters.iter().all(|filter| matches_filter(doc, filter)))
            .cloned()
            .collect();

        sort_documents(&mut matches, request.sort);

        let total = matches.len() as u32;
        let total_pages = total.div_ceil(request.limit);
        let page = request.page.max(1);
        let offset = ((page - 1) * request.limit) as usize;

        let mut docs: Vec<Document> = matches
            .into_iter()
            .skip(offset)
            .take(request.limit as usize)
            .collect();

        if request.depth >= 1 {
            for doc in &mut docs {
                if let Some(category_id) = doc.category_id {
                    doc.category = documents
                        .iter()
                        .find(|d| d.id == category_id)
                        .cloned()
                        .map(Box::new);
                }
            }
        }

        Ok(DocumentPage {
            docs,
            total_pages,
            page,
            has_next_page: page < total_pages,
            has_prev_page: page > 1 && total_pages > 0,
        })
    }
}

#[async_trait]
impl SubmissionSink for MemoryContentStore {
    async fn create_submission(&self, submission: NewSubmission) -> Result<Uuid, RepoError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::Persistence("simulated store failure".into()));
        }
        let id = Uuid::new_v4();
        self.submissions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, submission));
        Ok(id)
    }
}

fn matches_filter(doc: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::SlugEquals(slug) => doc.slug == *slug,
        Filter::CategoryEquals(id) => doc.category_id == Some(*id),
        Filter::IdNotEquals(id) => doc.id != *id,
        Filter::SearchContains(needle) => {
            let needle = needle.to_lowercase();
            searchable_values(doc).any(|value| value.to_lowercase().contains(&needle))
        }
    }
}

fn searchable_values(doc: &Document) -> impl Iterator<Item = &str> {
    const SEARCH_FIELDS: [&str; 2] = ["title", "subtitle"];

    let shared = SEARCH_FIELDS
        .iter()
        .filter_map(|field| doc.shared.get(*field).and_then(|v| v.as_str()));
    let localized = doc.localized.values().flat_map(|fields| {
        SEARCH_FIELDS
            .iter()
            .filter_map(|field| fields.get(*field).and_then(|v| v.as_str()))
    });
    shared.chain(localized)
}

fn sort_documents(docs: &mut [Document], sort: SortOrder) {
    match sort {
        SortOrder::PublishedAtDesc => {
            // Unpublished documents sort last; ties break on slug for a
            // stable page order.
            docs.sort_by(|a, b| match (b.published_at, a.published_at) {
                (Some(b_at), Some(a_at)) => b_at.cmp(&a_at).then_with(|| a.slug.cmp(&b.slug)),
                (Some(_), None) => std::cmp::Ordering::Greater,
                (None, Some(_)) => std::cmp::Ordering::Less,
                (None, None) => a.slug.cmp(&b.slug),
            });
        }
        SortOrder::OrderAsc => {
            docs.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.slug.cmp(&b.slug)));
        }
    }
}

/// Document builders for tests and for seeding databaseless runs.
pub mod test_support {
    use std::collections::BTreeMap;

    use serde_json::{Map, Value, json};
    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::domain::documents::Document;
    use crate::domain::types::{Collection, DocumentStatus, Locale};

    pub fn published_doc(collection: Collection, slug: &str) -> Document {
        doc(collection, slug, DocumentStatus::Published)
    }

    pub fn draft_doc(collection: Collection, slug: &str) -> Document {
        doc(collection, slug, DocumentStatus::Draft)
    }

    pub fn doc(collection: Collection, slug: &str, status: DocumentStatus) -> Document {
        let now = OffsetDateTime::now_utc();
        let mut localized = BTreeMap::new();
        localized.insert(Locale::Pl, title_fields(&format!("{slug} (pl)")));

        Document {
            id: Uuid::new_v4(),
            collection,
            slug: slug.to_string(),
            status,
            sort_order: 0,
            category_id: None,
            published_at: (status == DocumentStatus::Published).then_some(now),
            updated_at: now,
            shared: Map::new(),
            localized,
            category: None,
        }
    }

    pub fn with_locale_title(mut doc: Document, locale: Locale, title: &str) -> Document {
        doc.localized.insert(locale, title_fields(title));
        doc
    }

    pub fn with_category(mut doc: Document, category_id: Uuid) -> Document {
        doc.category_id = Some(category_id);
        doc
    }

    fn title_fields(title: &str) -> Map<String, Value> {
        json!({ "title": title }).as_object().cloned().unwrap_or_default()
    }
}
