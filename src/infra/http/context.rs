//! Per-request read context derived from the HTTP request.

use axum::http::{HeaderMap, StatusCode, header};

use crate::application::context::RequestContext;
use crate::application::error::HttpError;
use crate::application::preview::PreviewService;
use crate::domain::types::Locale;

pub const PREVIEW_COOKIE: &str = "vetrina_preview";

const SOURCE: &str = "infra::http::context";

/// Build the request context: locale from the path, draft mode from the
/// preview cookie (valid token required; anything else reads as anonymous).
pub fn request_context(
    preview: &PreviewService,
    headers: &HeaderMap,
    locale: Locale,
) -> RequestContext {
    if draft_mode_enabled(preview, headers) {
        RequestContext::previewing(locale)
    } else {
        RequestContext::anonymous(locale)
    }
}

pub fn draft_mode_enabled(preview: &PreviewService, headers: &HeaderMap) -> bool {
    cookie_value(headers, PREVIEW_COOKIE)
        .map(|value| preview.token_matches(value))
        .unwrap_or(false)
}

pub fn parse_locale(value: &str) -> Result<Locale, HttpError> {
    Locale::try_from(value).map_err(|()| {
        HttpError::new(
            SOURCE,
            StatusCode::NOT_FOUND,
            "Unknown locale",
            format!("locale `{value}` is not served"),
        )
    })
}

/// `Set-Cookie` value enabling draft mode for the session.
pub fn enable_preview_cookie(token: &str) -> String {
    format!("{PREVIEW_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value clearing draft mode.
pub fn clear_preview_cookie() -> String {
    format!("{PREVIEW_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    for header in headers.get_all(header::COOKIE) {
        let Ok(value) = header.to_str() else { continue };
        for pair in value.split(';') {
            if let Some(rest) = pair.trim().strip_prefix(name)
                && let Some(candidate) = rest.strip_prefix('=')
            {
                return Some(candidate);
            }
        }
    }
    None
}
