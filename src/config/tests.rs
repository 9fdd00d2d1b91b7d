use std::time::Duration;

use super::*;

#[test]
fn defaults_resolve() {
    let settings = Settings::try_from(RawSettings::default()).expect("defaults are valid");

    assert_eq!(settings.server.public_addr.port(), 3000);
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(30));
    assert!(settings.database.url.is_none());
    assert_eq!(settings.database.max_connections.get(), 8);
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.ttl_seconds, 3600);
    assert_eq!(settings.cache.entry_limit, 256);
    assert_eq!(settings.rate_limit.window, Duration::from_secs(600));
    assert_eq!(settings.rate_limit.max_requests.get(), 3);
    assert_eq!(settings.preview.secret, "change-me-preview-secret");
    assert_eq!(settings.i18n.default_locale, Locale::Pl);
}

#[test]
fn serve_overrides_take_precedence() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        public_port: Some(8080),
        cache_ttl_seconds: Some(60),
        rate_limit_window_ms: Some(1000),
        rate_limit_max_requests: Some(10),
        preview_secret: Some("override".to_string()),
        default_locale: Some("en".to_string()),
        ..Default::default()
    };
    raw.merge_overrides(&overrides);

    let settings = Settings::try_from(raw).expect("overridden settings are valid");
    assert_eq!(settings.server.public_addr.port(), 8080);
    assert_eq!(settings.cache.ttl_seconds, 60);
    assert_eq!(settings.rate_limit.window, Duration::from_millis(1000));
    assert_eq!(settings.rate_limit.max_requests.get(), 10);
    assert_eq!(settings.preview.secret, "override");
    assert_eq!(settings.i18n.default_locale, Locale::En);
}

#[test]
fn zero_port_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.public_port = Some(0);
    assert!(matches!(
        Settings::try_from(raw),
        Err(LoadError::Invalid {
            key: "server.public_port",
            ..
        })
    ));
}

#[test]
fn zero_rate_limit_window_is_rejected() {
    let mut raw = RawSettings::default();
    raw.rate_limit.window_ms = Some(0);
    assert!(matches!(
        Settings::try_from(raw),
        Err(LoadError::Invalid {
            key: "rate_limit.window_ms",
            ..
        })
    ));
}

#[test]
fn zero_rate_limit_ceiling_is_rejected() {
    let mut raw = RawSettings::default();
    raw.rate_limit.max_requests = Some(0);
    assert!(matches!(
        Settings::try_from(raw),
        Err(LoadError::Invalid {
            key: "rate_limit.max_requests",
            ..
        })
    ));
}

#[test]
fn empty_preview_secret_is_rejected() {
    let mut raw = RawSettings::default();
    raw.preview.secret = Some("   ".to_string());
    assert!(matches!(
        Settings::try_from(raw),
        Err(LoadError::Invalid {
            key: "preview.secret",
            ..
        })
    ));
}

#[test]
fn unknown_locale_is_rejected() {
    let mut raw = RawSettings::default();
    raw.i18n.default_locale = Some("de".to_string());
    assert!(matches!(
        Settings::try_from(raw),
        Err(LoadError::Invalid {
            key: "i18n.default_locale",
            ..
        })
    ));
}

#[test]
fn blank_database_url_reads_as_absent() {
    let mut raw = RawSettings::default();
    raw.database.url = Some("   ".to_string());
    let settings = Settings::try_from(raw).expect("valid");
    assert!(settings.database.url.is_none());
}
