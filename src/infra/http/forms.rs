//! Lead-capture form handler.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::info;

use crate::application::forms::{BookCallForm, SubmissionOutcome};

use super::{HttpState, repo_error_to_http};

const SOURCE: &str = "infra::http::forms";

/// `POST /book-call`: throttle, validate, persist. The throttled response
/// carries a translation key, never internal counters.
pub async fn submit_book_call(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Json(form): Json<BookCallForm>,
) -> Response {
    let client_id = client_identifier(&headers);

    if !state.rate_limiter.allow(&client_id) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(
                header::RETRY_AFTER,
                state.rate_limiter.retry_after_secs().to_string(),
            )],
            Json(json!({
                "success": false,
                "formError": "errors.rateLimitExceeded",
            })),
        )
            .into_response();
    }

    match state.forms.submit(&form).await {
        Ok(SubmissionOutcome::Accepted { id }) => {
            info!(submission_id = %id, "Book-call submission accepted");
            (
                StatusCode::CREATED,
                Json(json!({ "success": true, "id": id })),
            )
                .into_response()
        }
        Ok(SubmissionOutcome::Invalid { field_errors }) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "fieldErrors": field_errors })),
        )
            .into_response(),
        Err(err) => repo_error_to_http(SOURCE, err).into_response(),
    }
}

/// Client identity for throttling: first forwarded hop, then the proxy's
/// real-ip header, then a shared bucket.
fn client_identifier(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        && let Some(first) = forwarded.split(',').next()
    {
        let first = first.trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }

    if let Some(real_ip) = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
    {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn forwarded_for_takes_the_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_identifier(&headers), "203.0.113.7");
    }

    #[test]
    fn real_ip_is_the_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_identifier(&headers), "198.51.100.2");
    }

    #[test]
    fn unknown_without_proxy_headers() {
        assert_eq!(client_identifier(&HeaderMap::new()), "unknown");
    }
}
