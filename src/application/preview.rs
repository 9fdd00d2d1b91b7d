//! Draft preview authorization.
//!
//! A preview request carries a shared secret; on a constant-time match and
//! a successful existence check (drafts included) the caller is handed the
//! target to redirect to and the session cookie token that enables draft
//! mode. The token is derived from the secret, never the secret itself, so
//! a fabricated cookie value cannot enable draft reads.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::application::repos::{ContentStore, Filter, FindRequest, RepoError, SortOrder};
use crate::domain::types::{Collection, Locale};

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("invalid preview secret")]
    InvalidSecret,
    #[error("preview target not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] RepoError),
}

/// A verified preview target.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewTarget {
    pub collection: Collection,
    pub slug: String,
}

impl PreviewTarget {
    /// Path of the page that renders this target.
    pub fn path(&self, locale: Locale) -> String {
        match self.collection {
            Collection::News => format!("/{}/news/{}", locale, self.slug),
            Collection::NewsCategories => format!("/{locale}/news"),
            Collection::Faq | Collection::FaqCategories => format!("/{locale}/faq"),
            Collection::Integrations | Collection::IntegrationCategories => {
                format!("/{locale}/integrations")
            }
        }
    }
}

pub struct PreviewService {
    store: Arc<dyn ContentStore>,
    secret: String,
    cookie_token: String,
}

impl PreviewService {
    pub fn new(store: Arc<dyn ContentStore>, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        let cookie_token = hex::encode(Sha256::digest(secret.as_bytes()));
        Self {
            store,
            secret,
            cookie_token,
        }
    }

    /// Validate the secret and verify the target document exists, drafts
    /// included. Fails closed: any mismatch or ambiguity denies.
    pub async fn authorize(
        &self,
        secret: &str,
        collection: Collection,
        slug: &str,
    ) -> Result<PreviewTarget, PreviewError> {
        if !bytes_match(self.secret.as_bytes(), secret.as_bytes()) {
            return Err(PreviewError::InvalidSecret);
        }

        let request = FindRequest {
            collection,
            filters: vec![Filter::SlugEquals(slug.to_string())],
            sort: SortOrder::default(),
            page: 1,
            limit: 1,
            depth: 0,
            draft: true,
        };

        let page = self.store.find(&request).await?;
        if page.docs.is_empty() {
            return Err(PreviewError::NotFound);
        }

        Ok(PreviewTarget {
            collection,
            slug: slug.to_string(),
        })
    }

    /// The session cookie value that enables draft mode.
    pub fn cookie_token(&self) -> &str {
        &self.cookie_token
    }

    /// Whether a presented cookie value enables draft mode.
    pub fn token_matches(&self, candidate: &str) -> bool {
        bytes_match(self.cookie_token.as_bytes(), candidate.as_bytes())
    }

    /// Whether a presented hook secret is valid. The invalidation hook
    /// shares the preview secret; both are editorial-surface credentials.
    pub fn secret_matches(&self, candidate: &str) -> bool {
        bytes_match(self.secret.as_bytes(), candidate.as_bytes())
    }
}

fn bytes_match(expected: &[u8], candidate: &[u8]) -> bool {
    expected.ct_eq(candidate).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::MemoryContentStore;
    use crate::infra::memory::test_support::published_doc;

    fn service_with_doc(slug: &str) -> PreviewService {
        let store = MemoryContentStore::new();
        store.insert(published_doc(Collection::News, slug));
        PreviewService::new(Arc::new(store), "sekret")
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected_before_any_lookup() {
        let service = service_with_doc("hello");
        let result = service
            .authorize("not-the-secret", Collection::News, "hello")
            .await;
        assert!(matches!(result, Err(PreviewError::InvalidSecret)));
    }

    #[tokio::test]
    async fn missing_document_is_rejected() {
        let service = service_with_doc("hello");
        let result = service
            .authorize("sekret", Collection::News, "missing")
            .await;
        assert!(matches!(result, Err(PreviewError::NotFound)));
    }

    #[tokio::test]
    async fn valid_secret_and_existing_document_authorize() {
        let service = service_with_doc("hello");
        let target = service
            .authorize("sekret", Collection::News, "hello")
            .await
            .expect("authorized");
        assert_eq!(target.path(Locale::Pl), "/pl/news/hello");
    }

    #[test]
    fn cookie_token_is_derived_not_the_secret() {
        let store = Arc::new(MemoryContentStore::new());
        let service = PreviewService::new(store, "sekret");

        assert_ne!(service.cookie_token(), "sekret");
        assert!(service.token_matches(service.cookie_token()));
        assert!(!service.token_matches("sekret"));
        assert!(!service.token_matches(""));
    }

    #[test]
    fn target_paths_per_collection() {
        let faq = PreviewTarget {
            collection: Collection::Faq,
            slug: "how-to".to_string(),
        };
        assert_eq!(faq.path(Locale::En), "/en/faq");

        let integrations = PreviewTarget {
            collection: Collection::Integrations,
            slug: "crm".to_string(),
        };
        assert_eq!(integrations.path(Locale::Pl), "/pl/integrations");
    }
}
