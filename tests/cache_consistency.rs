//! Caching-layer consistency properties, driven against the in-memory
//! store: draft-mode bypass, hit determinism, tag invalidation, TTL
//! expiry, and error propagation without stale fallback.

use std::sync::Arc;

use vetrina::application::cached::CachedContent;
use vetrina::application::content::{ContentRepository, ListQuery};
use vetrina::application::context::RequestContext;
use vetrina::application::repos::{ContentStore, RepoError, SortOrder};
use vetrina::cache::{CacheConfig, QueryCache};
use vetrina::domain::types::{Collection, Locale};
use vetrina::infra::memory::MemoryContentStore;
use vetrina::infra::memory::test_support::{draft_doc, published_doc, with_locale_title};

fn service(
    store: &Arc<MemoryContentStore>,
    config: CacheConfig,
) -> (CachedContent, Arc<QueryCache>) {
    let cache = Arc::new(QueryCache::new(&config));
    let content_store: Arc<dyn ContentStore> = Arc::clone(store) as Arc<dyn ContentStore>;
    let repo = ContentRepository::new(content_store, Locale::Pl);
    (
        CachedContent::new(repo, Arc::clone(&cache), config),
        cache,
    )
}

fn news_query() -> ListQuery {
    ListQuery {
        sort: SortOrder::PublishedAtDesc,
        depth: 0,
        ..Default::default()
    }
}

#[tokio::test]
async fn second_identical_read_is_served_from_cache() {
    let store = Arc::new(MemoryContentStore::new());
    store.insert(published_doc(Collection::News, "first"));
    let (content, _cache) = service(&store, CacheConfig::default());
    let ctx = RequestContext::anonymous(Locale::Pl);

    let first = content
        .find_many(&ctx, Collection::News, &news_query())
        .await
        .unwrap();
    assert_eq!(store.find_call_count(), 1);

    let second = content
        .find_many(&ctx, Collection::News, &news_query())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(store.find_call_count(), 1, "second read must not hit the store");
}

#[tokio::test]
async fn draft_mode_bypasses_cache_in_both_directions() {
    let store = Arc::new(MemoryContentStore::new());
    store.insert(published_doc(Collection::News, "public"));
    store.insert(draft_doc(Collection::News, "pending"));
    let (content, cache) = service(&store, CacheConfig::default());

    let editor = RequestContext::previewing(Locale::Pl);

    let first = content
        .find_many(&editor, Collection::News, &news_query())
        .await
        .unwrap();
    assert_eq!(first.docs.len(), 2);

    // The store changes between two identical draft reads; both must
    // reflect the live state.
    store.insert(draft_doc(Collection::News, "newer"));
    let second = content
        .find_many(&editor, Collection::News, &news_query())
        .await
        .unwrap();
    assert_eq!(second.docs.len(), 3);
    assert_eq!(store.find_call_count(), 2);

    // Nothing was written to the shared cache while previewing.
    assert!(cache.is_empty());

    // An anonymous reader still gets a fresh, published-only read.
    let anonymous = RequestContext::anonymous(Locale::Pl);
    let public = content
        .find_many(&anonymous, Collection::News, &news_query())
        .await
        .unwrap();
    assert_eq!(store.find_call_count(), 3);
    assert_eq!(public.docs.len(), 1);
    assert_eq!(public.docs[0].slug, "public");
}

#[tokio::test]
async fn tag_invalidation_forces_a_fresh_read_within_ttl() {
    let store = Arc::new(MemoryContentStore::new());
    store.insert(published_doc(Collection::News, "first"));
    let (content, cache) = service(&store, CacheConfig::default());
    let ctx = RequestContext::anonymous(Locale::Pl);

    content
        .find_many(&ctx, Collection::News, &news_query())
        .await
        .unwrap();
    content
        .find_many(&ctx, Collection::News, &news_query())
        .await
        .unwrap();
    assert_eq!(store.find_call_count(), 1);

    // External write path publishes a document and reports the change.
    store.insert(published_doc(Collection::News, "second"));
    assert_eq!(cache.invalidate(Collection::News), 1);

    let refreshed = content
        .find_many(&ctx, Collection::News, &news_query())
        .await
        .unwrap();
    assert_eq!(store.find_call_count(), 2);
    assert_eq!(refreshed.docs.len(), 2);

    // The recompute overwrote the stale entry; reads hit the cache again.
    content
        .find_many(&ctx, Collection::News, &news_query())
        .await
        .unwrap();
    assert_eq!(store.find_call_count(), 2);
}

#[tokio::test]
async fn invalidating_one_collection_leaves_others_cached() {
    let store = Arc::new(MemoryContentStore::new());
    store.insert(published_doc(Collection::News, "post"));
    store.insert(published_doc(Collection::Faq, "question"));
    let (content, cache) = service(&store, CacheConfig::default());
    let ctx = RequestContext::anonymous(Locale::Pl);

    content
        .find_many(&ctx, Collection::News, &news_query())
        .await
        .unwrap();
    content
        .find_many(&ctx, Collection::Faq, &news_query())
        .await
        .unwrap();
    assert_eq!(store.find_call_count(), 2);

    cache.invalidate(Collection::News);

    content
        .find_many(&ctx, Collection::Faq, &news_query())
        .await
        .unwrap();
    assert_eq!(store.find_call_count(), 2, "FAQ entry must stay cached");
}

#[tokio::test]
async fn expired_entries_force_a_store_read() {
    let store = Arc::new(MemoryContentStore::new());
    store.insert(published_doc(Collection::News, "first"));
    let config = CacheConfig {
        ttl_seconds: 0,
        ..Default::default()
    };
    let (content, _cache) = service(&store, config);
    let ctx = RequestContext::anonymous(Locale::Pl);

    content
        .find_many(&ctx, Collection::News, &news_query())
        .await
        .unwrap();
    content
        .find_many(&ctx, Collection::News, &news_query())
        .await
        .unwrap();
    assert_eq!(store.find_call_count(), 2);
}

#[tokio::test]
async fn failed_recompute_propagates_instead_of_serving_stale() {
    let store = Arc::new(MemoryContentStore::new());
    store.insert(published_doc(Collection::News, "first"));
    let (content, cache) = service(&store, CacheConfig::default());
    let ctx = RequestContext::anonymous(Locale::Pl);

    content
        .find_many(&ctx, Collection::News, &news_query())
        .await
        .unwrap();
    cache.invalidate(Collection::News);
    store.set_failing(true);

    let result = content.find_many(&ctx, Collection::News, &news_query()).await;
    assert!(matches!(result, Err(RepoError::Persistence(_))));
}

#[tokio::test]
async fn single_document_reads_cache_misses_too() {
    let store = Arc::new(MemoryContentStore::new());
    let (content, _cache) = service(&store, CacheConfig::default());
    let ctx = RequestContext::anonymous(Locale::Pl);

    let miss = content
        .find_one(&ctx, Collection::News, "absent", 0)
        .await
        .unwrap();
    assert!(miss.is_none());
    assert_eq!(store.find_call_count(), 1);

    // The no-match result is cached like any other.
    let miss = content
        .find_one(&ctx, Collection::News, "absent", 0)
        .await
        .unwrap();
    assert!(miss.is_none());
    assert_eq!(store.find_call_count(), 1);
}

#[tokio::test]
async fn locale_fallback_substitutes_empty_fields() {
    let store = Arc::new(MemoryContentStore::new());
    store.insert(with_locale_title(
        published_doc(Collection::News, "hello"),
        Locale::En,
        "",
    ));
    let (content, _cache) = service(&store, CacheConfig::default());

    let ctx = RequestContext::anonymous(Locale::En);
    let doc = content
        .find_one(&ctx, Collection::News, "hello", 0)
        .await
        .unwrap()
        .expect("document");

    // The English title is empty, so the Polish value substitutes.
    assert_eq!(doc.field_str("title"), Some("hello (pl)"));
}

#[tokio::test]
async fn locale_shapes_the_cache_key() {
    let store = Arc::new(MemoryContentStore::new());
    store.insert(with_locale_title(
        published_doc(Collection::News, "hello"),
        Locale::En,
        "Hello",
    ));
    let (content, _cache) = service(&store, CacheConfig::default());

    let pl = content
        .find_one(&RequestContext::anonymous(Locale::Pl), Collection::News, "hello", 0)
        .await
        .unwrap()
        .expect("document");
    let en = content
        .find_one(&RequestContext::anonymous(Locale::En), Collection::News, "hello", 0)
        .await
        .unwrap()
        .expect("document");

    assert_eq!(store.find_call_count(), 2);
    assert_eq!(pl.field_str("title"), Some("hello (pl)"));
    assert_eq!(en.field_str("title"), Some("Hello"));
}

#[tokio::test]
async fn unknown_category_slug_yields_an_empty_page() {
    let store = Arc::new(MemoryContentStore::new());
    store.insert(published_doc(Collection::News, "post"));
    let (content, _cache) = service(&store, CacheConfig::default());
    let ctx = RequestContext::anonymous(Locale::Pl);

    let query = ListQuery {
        category_slug: Some("no-such-category".to_string()),
        ..news_query()
    };
    let page = content
        .find_many(&ctx, Collection::News, &query)
        .await
        .unwrap();
    assert!(page.docs.is_empty());
    assert_eq!(page.total_pages, 0);
}
