//! Store traits describing the document-store boundary.
//!
//! The document store owns every document; this crate only reads them (plus
//! one narrow sink for lead-capture submissions). Everything behind these
//! traits (Postgres in production, the in-memory store in tests) is an
//! external collaborator as far as the read path is concerned.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::documents::Document;
use crate::domain::types::Collection;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("invalid query: {message}")]
    InvalidQuery { message: String },
    #[error("store timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }
}

/// A single conjunctive predicate. Unknown fields cannot be expressed;
/// the closed set mirrors what the query surface actually needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    SlugEquals(String),
    CategoryEquals(Uuid),
    IdNotEquals(Uuid),
    /// Case-insensitive substring match over title/subtitle fields.
    SearchContains(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Most recently published first. Documents without a publication
    /// timestamp sort last.
    PublishedAtDesc,
    /// Manual editorial ordering, ascending.
    #[default]
    OrderAsc,
}

/// A generic find against the store. Filters are ANDed together.
#[derive(Debug, Clone)]
pub struct FindRequest {
    pub collection: Collection,
    pub filters: Vec<Filter>,
    pub sort: SortOrder,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    /// Relation resolution depth: at depth >= 1 the store embeds the
    /// referenced category document.
    pub depth: u8,
    /// When false, only published documents are visible. When true, drafts
    /// and published documents are both returned.
    pub draft: bool,
}

impl FindRequest {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            sort: SortOrder::default(),
            page: 1,
            limit: 10,
            depth: 0,
            draft: false,
        }
    }
}

/// One page of raw documents with the store's pagination envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPage {
    pub docs: Vec<Document>,
    pub total_pages: u32,
    pub page: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Run a find against the store. An empty match is an empty page, not
    /// an error; errors mean the store itself failed.
    async fn find(&self, request: &FindRequest) -> Result<DocumentPage, RepoError>;
}

/// A lead-capture submission, validated and normalized by the form service.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub kind: &'static str,
    pub full_name: String,
    pub email: String,
    pub company_name: String,
    pub phone_country_code: String,
    pub phone_number: String,
    pub preferred_date: time::Date,
    pub privacy_consent: bool,
}

#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn create_submission(&self, submission: NewSubmission) -> Result<Uuid, RepoError>;
}
