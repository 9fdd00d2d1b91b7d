//! HTTP middleware.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::application::error::FailureReport;

/// Log every response; failed requests carry a `FailureReport` in their
/// extensions with the diagnostic detail the public message omits.
pub async fn log_responses(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    let status = response.status().as_u16();

    if let Some(report) = response.extensions().get::<FailureReport>() {
        warn!(
            %method,
            path,
            status,
            module = report.module,
            chain = ?report.chain,
            "Request failed"
        );
    } else {
        debug!(%method, path, status, "Request served");
    }

    response
}
