//! Request-scoped read context.

use crate::domain::types::Locale;

/// Carries the per-request read semantics through every layer explicitly,
/// instead of an ambient flag: which locale to resolve, and whether the
/// viewer is previewing drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub locale: Locale,
    pub draft_mode: bool,
}

impl RequestContext {
    /// Context for an anonymous reader: published documents only, cache on.
    pub fn anonymous(locale: Locale) -> Self {
        Self {
            locale,
            draft_mode: false,
        }
    }

    /// Context for an editor previewing drafts: cache bypassed, drafts
    /// visible.
    pub fn previewing(locale: Locale) -> Self {
        Self {
            locale,
            draft_mode: true,
        }
    }
}
