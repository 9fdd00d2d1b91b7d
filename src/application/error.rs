//! Error types for the HTTP boundary and application wiring.
//!
//! A failed request carries two messages: a terse public body and a
//! diagnostic report that rides the response extensions until the logging
//! middleware consumes it. The report never reaches the client.

use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::infra::error::InfraError;

/// Diagnostic detail for the logging middleware: the failing module, the
/// response status, and the error chain outermost-first.
#[derive(Debug, Clone)]
pub struct FailureReport {
    pub module: &'static str,
    pub status: StatusCode,
    pub chain: Vec<String>,
}

impl FailureReport {
    pub fn from_error(module: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut chain = vec![error.to_string()];
        let mut cause = error.source();
        while let Some(err) = cause {
            chain.push(err.to_string());
            cause = err.source();
        }
        Self {
            module,
            status,
            chain,
        }
    }
}

/// A request failure: what the client sees, plus the report for the logs.
#[derive(Debug)]
pub struct HttpError {
    public_message: &'static str,
    report: FailureReport,
}

impl HttpError {
    pub fn new(
        module: &'static str,
        status: StatusCode,
        public_message: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            public_message,
            report: FailureReport {
                module,
                status,
                chain: vec![detail.into()],
            },
        }
    }

    pub fn from_error(
        module: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        Self {
            public_message,
            report: FailureReport::from_error(module, status, error),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.report.status, self.public_message).into_response();
        response.extensions_mut().insert(self.report);
        response
    }
}

/// Startup and wiring failures; request-path errors use [`HttpError`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
