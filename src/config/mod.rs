//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr,
    num::NonZeroU32,
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::domain::types::Locale;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "vetrina";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PUBLIC_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 10 * 60 * 1000;
const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 3;
const DEFAULT_CACHE_TTL_SECONDS: u64 = 3600;
const DEFAULT_CACHE_ENTRY_LIMIT: usize = 256;
const DEFAULT_PREVIEW_SECRET: &str = "change-me-preview-secret";

/// Command-line arguments for the Vetrina binary.
#[derive(Debug, Parser)]
#[command(name = "vetrina", version, about = "Vetrina content server")]
pub struct CliArgs {
    /// Extra configuration file, applied on top of the defaults.
    #[arg(long = "config-file", env = "VETRINA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the Vetrina HTTP service.
    Serve(Box<ServeArgs>),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Bind host for the HTTP listener.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Bind port for the HTTP listener.
    #[arg(long = "server-public-port", value_name = "PORT")]
    pub public_port: Option<u16>,

    /// Seconds to wait for in-flight requests on shutdown.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Document store connection URL; omit to run on the in-memory store.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Document store connection pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Turn the query cache on or off.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Seconds before a cached query result expires.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u64>,

    /// Most query results held in the cache at once.
    #[arg(long = "cache-entry-limit", value_name = "COUNT")]
    pub cache_entry_limit: Option<usize>,

    /// Length of the form rate-limit window in milliseconds.
    #[arg(long = "rate-limit-window-ms", value_name = "MILLISECONDS")]
    pub rate_limit_window_ms: Option<u64>,

    /// Form submissions allowed per client per window.
    #[arg(long = "rate-limit-max-requests", value_name = "COUNT")]
    pub rate_limit_max_requests: Option<u32>,

    /// Shared secret for draft previews and invalidation hooks.
    #[arg(long = "preview-secret", value_name = "SECRET")]
    pub preview_secret: Option<String>,

    /// Default (and fallback) content locale.
    #[arg(long = "default-locale", value_name = "LOCALE")]
    pub default_locale: Option<String>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub rate_limit: RateLimitSettings,
    pub preview: PreviewSettings,
    pub i18n: I18nSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub public_addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// When absent, the service runs on the in-memory store.
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_seconds: u64,
    pub entry_limit: usize,
}

#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub window: Duration,
    pub max_requests: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct PreviewSettings {
    pub secret: String,
}

#[derive(Debug, Clone)]
pub struct I18nSettings {
    pub default_locale: Locale,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("VETRINA").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    if let Some(Command::Serve(args)) = cli.command.as_ref() {
        raw.merge_overrides(&args.overrides);
    }

    Settings::try_from(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    cache: RawCacheSettings,
    rate_limit: RawRateLimitSettings,
    preview: RawPreviewSettings,
    i18n: RawI18nSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    public_port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    ttl_seconds: Option<u64>,
    entry_limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRateLimitSettings {
    window_ms: Option<u64>,
    max_requests: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPreviewSettings {
    secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawI18nSettings {
    default_locale: Option<String>,
}

fn merge<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        *slot = value.clone();
    }
}

impl RawSettings {
    fn merge_overrides(&mut self, o: &ServeOverrides) {
        merge(&mut self.server.host, &o.server_host);
        merge(&mut self.server.public_port, &o.public_port);
        merge(
            &mut self.server.graceful_shutdown_seconds,
            &o.server_graceful_shutdown_seconds,
        );
        merge(&mut self.logging.level, &o.log_level);
        merge(&mut self.logging.json, &o.log_json);
        merge(&mut self.database.url, &o.database_url);
        merge(
            &mut self.database.max_connections,
            &o.database_max_connections,
        );
        merge(&mut self.cache.enabled, &o.cache_enabled);
        merge(&mut self.cache.ttl_seconds, &o.cache_ttl_seconds);
        merge(&mut self.cache.entry_limit, &o.cache_entry_limit);
        merge(&mut self.rate_limit.window_ms, &o.rate_limit_window_ms);
        merge(&mut self.rate_limit.max_requests, &o.rate_limit_max_requests);
        merge(&mut self.preview.secret, &o.preview_secret);
        merge(&mut self.i18n.default_locale, &o.default_locale);
    }
}

impl TryFrom<RawSettings> for Settings {
    type Error = LoadError;

    fn try_from(raw: RawSettings) -> Result<Self, LoadError> {
        Ok(Self {
            server: raw.server.resolve()?,
            logging: raw.logging.resolve()?,
            database: raw.database.resolve()?,
            cache: raw.cache.resolve(),
            rate_limit: raw.rate_limit.resolve()?,
            preview: raw.preview.resolve()?,
            i18n: raw.i18n.resolve()?,
        })
    }
}

impl RawServerSettings {
    fn resolve(self) -> Result<ServerSettings, LoadError> {
        let port = self.public_port.unwrap_or(DEFAULT_PUBLIC_PORT);
        if port == 0 {
            return Err(LoadError::invalid(
                "server.public_port",
                "port 0 cannot be advertised",
            ));
        }

        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST);
        let public_addr: SocketAddr = format!("{host}:{port}").parse().map_err(|err| {
            LoadError::invalid(
                "server.public_addr",
                format!("unparseable socket address: {err}"),
            )
        })?;

        let grace = self
            .graceful_shutdown_seconds
            .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
        if grace == 0 {
            return Err(LoadError::invalid(
                "server.graceful_shutdown_seconds",
                "a zero grace period would drop in-flight requests",
            ));
        }

        Ok(ServerSettings {
            public_addr,
            graceful_shutdown: Duration::from_secs(grace),
        })
    }
}

impl RawLoggingSettings {
    fn resolve(self) -> Result<LoggingSettings, LoadError> {
        let level = match self.level.as_deref() {
            Some(value) => LevelFilter::from_str(value).map_err(|err| {
                LoadError::invalid("logging.level", format!("unparseable level: {err}"))
            })?,
            None => LevelFilter::INFO,
        };

        let format = match self.json {
            Some(true) => LogFormat::Json,
            _ => LogFormat::Compact,
        };

        Ok(LoggingSettings { level, format })
    }
}

impl RawDatabaseSettings {
    fn resolve(self) -> Result<DatabaseSettings, LoadError> {
        let url = self
            .url
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let max_connections = positive_u32(
            "database.max_connections",
            self.max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
        )?;

        Ok(DatabaseSettings {
            url,
            max_connections,
        })
    }
}

impl RawCacheSettings {
    fn resolve(self) -> CacheSettings {
        CacheSettings {
            enabled: self.enabled.unwrap_or(true),
            ttl_seconds: self.ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECONDS),
            entry_limit: self.entry_limit.unwrap_or(DEFAULT_CACHE_ENTRY_LIMIT),
        }
    }
}

impl RawRateLimitSettings {
    fn resolve(self) -> Result<RateLimitSettings, LoadError> {
        let window_ms = self.window_ms.unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_MS);
        if window_ms == 0 {
            return Err(LoadError::invalid(
                "rate_limit.window_ms",
                "a zero-length window never throttles",
            ));
        }

        let max_requests = positive_u32(
            "rate_limit.max_requests",
            self.max_requests.unwrap_or(DEFAULT_RATE_LIMIT_MAX_REQUESTS),
        )?;

        Ok(RateLimitSettings {
            window: Duration::from_millis(window_ms),
            max_requests,
        })
    }
}

impl RawPreviewSettings {
    fn resolve(self) -> Result<PreviewSettings, LoadError> {
        let secret = self
            .secret
            .unwrap_or_else(|| DEFAULT_PREVIEW_SECRET.to_string());
        if secret.trim().is_empty() {
            return Err(LoadError::invalid(
                "preview.secret",
                "an empty secret would open previews to everyone",
            ));
        }

        Ok(PreviewSettings { secret })
    }
}

impl RawI18nSettings {
    fn resolve(self) -> Result<I18nSettings, LoadError> {
        let default_locale = match self.default_locale.as_deref() {
            Some(value) => Locale::try_from(value).map_err(|()| {
                LoadError::invalid(
                    "i18n.default_locale",
                    format!("locale `{value}` is not served"),
                )
            })?,
            None => Locale::default(),
        };

        Ok(I18nSettings { default_locale })
    }
}

fn positive_u32(key: &'static str, value: u32) -> Result<NonZeroU32, LoadError> {
    NonZeroU32::new(value).ok_or_else(|| LoadError::invalid(key, "zero is not a usable value"))
}

#[cfg(test)]
mod tests;
