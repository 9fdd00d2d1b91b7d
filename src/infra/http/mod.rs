mod content;
mod context;
mod forms;
mod hooks;
mod middleware;
mod preview;
pub mod rate_limit;

pub use context::{PREVIEW_COOKIE, draft_mode_enabled, request_context};
pub use rate_limit::FormRateLimiter;

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware as axum_middleware;
use axum::routing::{get, post};

use crate::application::cached::CachedContent;
use crate::application::error::HttpError;
use crate::application::forms::BookCallService;
use crate::application::preview::PreviewService;
use crate::application::repos::RepoError;
use crate::cache::QueryCache;
use crate::domain::types::Locale;

#[derive(Clone)]
pub struct HttpState {
    pub content: Arc<CachedContent>,
    pub preview: Arc<PreviewService>,
    pub forms: Arc<BookCallService>,
    pub cache: Arc<QueryCache>,
    pub rate_limiter: FormRateLimiter,
    pub default_locale: Locale,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/preview", get(preview::enter_preview))
        .route(
            "/exit-preview",
            get(preview::exit_preview_redirect).post(preview::exit_preview_json),
        )
        .route("/book-call", post(forms::submit_book_call))
        .route("/hooks/document-changed", post(hooks::document_changed))
        .route("/{locale}/news", get(content::list_news))
        .route("/{locale}/news/{slug}", get(content::news_detail))
        .route("/{locale}/faq", get(content::faq))
        .route("/{locale}/integrations", get(content::integrations))
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
}

/// Map a store error to a consistent HTTP error response.
pub fn repo_error_to_http(source: &'static str, err: RepoError) -> HttpError {
    match err {
        RepoError::InvalidQuery { message } => {
            HttpError::new(source, StatusCode::BAD_REQUEST, "Invalid query", message)
        }
        RepoError::Timeout => HttpError::new(
            source,
            StatusCode::SERVICE_UNAVAILABLE,
            "Store timeout",
            "document store timeout",
        ),
        RepoError::Persistence(message) => HttpError::new(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Store error",
            message,
        ),
    }
}
