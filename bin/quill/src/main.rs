//! The Quill server binary: loads configuration, wires concrete adapters
//! into the domain ports and serves the router.

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use quill_auth_simple::{JwtTokenService, SimpleAuthenticator};
use quill_configs::AppConfig;
use quill_core::cache::MemoryPageCache;
use quill_db_sqlite::SqliteStore;
use quill_http::mailer::LogMailer;
use quill_http::{router, AppState};
use quill_storage_local::LocalMediaStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "quill=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::load()?;

    let store = Arc::new(SqliteStore::connect(&config.database.url).await?);
    let media = Arc::new(LocalMediaStore::new(
        config.media.root.clone(),
        config.media.url_prefix.clone(),
    ));
    let auth = Arc::new(SimpleAuthenticator::new(store.clone()));
    let tokens = Arc::new(JwtTokenService::new(
        config.auth.secret.expose_secret(),
        config.auth.access_ttl_days,
        config.auth.refresh_ttl_days,
    ));

    let state = AppState {
        users: store.clone(),
        groups: store.clone(),
        posts: store.clone(),
        comments: store.clone(),
        follows: store.clone(),
        auth,
        tokens,
        media,
        mailer: Arc::new(LogMailer),
        cache: Arc::new(MemoryPageCache::new()),
        index_cache_ttl: Duration::from_secs(config.cache.index_ttl_secs),
    };

    let app = router(state, &config.media.root);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("🚀 Quill listening on http://{}", config.server.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
