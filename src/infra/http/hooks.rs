//! Cache invalidation hook.
//!
//! Document writes happen outside this service. The boundary contract is
//! that the write path calls this endpoint synchronously after a successful
//! mutation, naming the changed collection; every cache entry depending on
//! that collection is then marked stale.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::application::error::HttpError;
use crate::domain::types::Collection;

use super::HttpState;

const SOURCE: &str = "infra::http::hooks";
const HOOK_SECRET_HEADER: &str = "x-vetrina-secret";

#[derive(Debug, Deserialize)]
pub struct DocumentChanged {
    pub collection: String,
}

/// `POST /hooks/document-changed`
pub async fn document_changed(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Json(payload): Json<DocumentChanged>,
) -> Result<Json<Value>, HttpError> {
    let secret = headers
        .get(HOOK_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !state.preview.secret_matches(secret) {
        return Err(HttpError::new(
            SOURCE,
            StatusCode::UNAUTHORIZED,
            "Invalid hook secret",
            "hook secret mismatch",
        ));
    }

    let collection = Collection::try_from(payload.collection.as_str()).map_err(|()| {
        HttpError::new(
            SOURCE,
            StatusCode::BAD_REQUEST,
            "Unknown collection",
            format!("collection `{}` has no cache tag", payload.collection),
        )
    })?;

    let invalidated = state.cache.invalidate(collection);
    info!(collection = %collection, invalidated, "Cache invalidated by document change");

    Ok(Json(json!({ "invalidated": invalidated })))
}
