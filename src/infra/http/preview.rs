//! Draft preview handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::application::error::HttpError;
use crate::application::preview::PreviewError;
use crate::domain::types::{Collection, Locale};

use super::HttpState;
use super::context::{clear_preview_cookie, enable_preview_cookie};

const SOURCE: &str = "infra::http::preview";

#[derive(Debug, Deserialize)]
pub struct PreviewParams {
    pub secret: Option<String>,
    pub slug: Option<String>,
    pub locale: Option<String>,
    pub collection: Option<String>,
}

/// `GET /preview`: validate the shared secret and the target document,
/// then enable draft mode and redirect to the content page.
pub async fn enter_preview(
    State(state): State<HttpState>,
    Query(params): Query<PreviewParams>,
) -> Response {
    let secret = params.secret.unwrap_or_default();
    if !state.preview.secret_matches(&secret) {
        return HttpError::new(
            SOURCE,
            StatusCode::UNAUTHORIZED,
            "Invalid preview token",
            "preview secret mismatch",
        )
        .into_response();
    }

    let Some(slug) = params.slug.filter(|slug| !slug.is_empty()) else {
        return HttpError::new(
            SOURCE,
            StatusCode::BAD_REQUEST,
            "Missing slug parameter",
            "preview request without a slug",
        )
        .into_response();
    };

    let locale = params
        .locale
        .as_deref()
        .and_then(|value| Locale::try_from(value).ok())
        .unwrap_or(state.default_locale);

    let collection = match params.collection.as_deref() {
        None => Collection::News,
        Some(value) => match Collection::try_from(value) {
            Ok(collection) => collection,
            Err(()) => {
                return HttpError::new(
                    SOURCE,
                    StatusCode::BAD_REQUEST,
                    "Unknown collection",
                    format!("collection `{value}` is not previewable"),
                )
                .into_response();
            }
        },
    };

    match state.preview.authorize(&secret, collection, &slug).await {
        Ok(target) => {
            let path = target.path(locale);
            info!(collection = %collection, slug = %slug, "Draft preview enabled");
            (
                StatusCode::FOUND,
                [
                    (header::LOCATION, path),
                    (
                        header::SET_COOKIE,
                        enable_preview_cookie(state.preview.cookie_token()),
                    ),
                ],
            )
                .into_response()
        }
        Err(PreviewError::InvalidSecret) => HttpError::new(
            SOURCE,
            StatusCode::UNAUTHORIZED,
            "Invalid preview token",
            "preview secret mismatch",
        )
        .into_response(),
        Err(PreviewError::NotFound) => HttpError::new(
            SOURCE,
            StatusCode::NOT_FOUND,
            "Document not found",
            format!("no `{collection}` document with slug `{slug}`"),
        )
        .into_response(),
        Err(PreviewError::Store(err)) => HttpError::from_error(
            SOURCE,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error fetching document",
            &err,
        )
        .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ExitParams {
    pub redirect: Option<String>,
}

/// `GET /exit-preview`: clear draft mode (idempotent) and redirect.
pub async fn exit_preview_redirect(Query(params): Query<ExitParams>) -> Response {
    let target = params
        .redirect
        .filter(|path| is_same_site_path(path))
        .unwrap_or_else(|| "/".to_string());

    (
        StatusCode::FOUND,
        [
            (header::LOCATION, target),
            (header::SET_COOKIE, clear_preview_cookie()),
        ],
    )
        .into_response()
}

/// `POST /exit-preview`: clear draft mode (idempotent), JSON response for
/// the in-page banner button.
pub async fn exit_preview_json() -> Response {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, clear_preview_cookie())],
        Json(json!({ "success": true })),
    )
        .into_response()
}

/// Accept only same-site absolute paths as redirect targets.
fn is_same_site_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}
