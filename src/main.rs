use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use vetrina::{
    application::{
        cached::CachedContent,
        content::ContentRepository,
        error::AppError,
        forms::BookCallService,
        preview::PreviewService,
        repos::{ContentStore, SubmissionSink},
    },
    cache::{CacheConfig, QueryCache},
    config,
    infra::{
        db::PostgresContentStore,
        http::{FormRateLimiter, HttpState, build_router},
        memory::MemoryContentStore,
        telemetry,
    },
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_fatal(&error);
        process::exit(1);
    }
}

/// A failure before telemetry::init lands here with no subscriber
/// installed; log it through a one-shot stderr dispatch instead.
fn report_fatal(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "fatal error");
    } else {
        let fallback = tracing_subscriber::fmt()
            .with_max_level(Level::ERROR)
            .finish();
        dispatcher::with_default(&Dispatch::new(fallback), || {
            error!(error = %error, "fatal error");
        });
    }
}

async fn run() -> Result<(), AppError> {
    let cli = config::CliArgs::parse();
    let settings = config::load(&cli)
        .map_err(|err| AppError::unexpected(format!("configuration load failed: {err}")))?;

    telemetry::init(&settings.logging)?;

    let (content_store, submission_sink): (Arc<dyn ContentStore>, Arc<dyn SubmissionSink>) =
        match settings.database.url.as_deref() {
            Some(url) => {
                let store = Arc::new(
                    PostgresContentStore::connect(url, settings.database.max_connections.get())
                        .await?,
                );
                (store.clone(), store)
            }
            None => {
                warn!("no database url configured; serving from the in-memory store");
                let store = Arc::new(MemoryContentStore::new());
                (store.clone(), store)
            }
        };

    let cache_config = CacheConfig::from(&settings.cache);
    let cache = Arc::new(QueryCache::new(&cache_config));

    let repository = ContentRepository::new(Arc::clone(&content_store), settings.i18n.default_locale);
    let content = Arc::new(CachedContent::new(
        repository,
        Arc::clone(&cache),
        cache_config,
    ));
    let preview = Arc::new(PreviewService::new(
        Arc::clone(&content_store),
        settings.preview.secret.clone(),
    ));
    let forms = Arc::new(BookCallService::new(submission_sink));
    let rate_limiter = FormRateLimiter::new(
        settings.rate_limit.window,
        settings.rate_limit.max_requests.get(),
    );

    let state = HttpState {
        content,
        preview,
        forms,
        cache,
        rate_limiter,
        default_locale: settings.i18n.default_locale,
    };

    let listener = TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::Infra(err.into()))?;
    info!(addr = %settings.server.public_addr, "Vetrina listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal(settings.server.graceful_shutdown))
        .await
        .map_err(|err| AppError::unexpected(format!("http server exited: {err}")))?;

    Ok(())
}

async fn shutdown_signal(grace: Duration) {
    if tokio::signal::ctrl_c().await.is_err() {
        error!("failed to listen for shutdown signal");
        return;
    }
    info!(
        grace_seconds = grace.as_secs(),
        "Shutdown signal received; draining in-flight requests"
    );

    // Hard stop if draining outlives the grace period.
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!("Graceful shutdown grace period elapsed; exiting");
        process::exit(0);
    });
}
