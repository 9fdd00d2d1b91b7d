//! Vetrina is a localized content service for marketing sites: it serves
//! news, FAQ, and integrations documents as JSON from a headless document
//! store, caches published reads with tag-based invalidation, grants
//! editors draft previews behind a shared secret, and throttles a public
//! lead-capture form.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
