//! HTTP serving: an axum app whose single fallback handler dispatches
//! every request to static mounts, controllers or pages.

mod cookie;
mod dispatch;
mod error;
pub mod response;

pub use error::KrakenError;

use anyhow::{Context, Result};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::KrakenConfig;
use crate::controllers::ControllerRegistry;
use crate::session::{SessionStore, TokenSigner};
use crate::site::SiteLayout;

/// Everything a request handler needs; shared read-only across requests.
#[derive(Clone)]
pub struct AppState {
    pub layout: SiteLayout,
    pub controllers: ControllerRegistry,
    pub sessions: SessionStore,
    pub signer: TokenSigner,
    pub cookie_name: String,
}

impl AppState {
    /// Build state from configuration, opening the session store.
    pub async fn from_config(cfg: &KrakenConfig, controllers: ControllerRegistry) -> Result<Self> {
        let signer = match cfg.secret_key_bytes()? {
            Some(key) => TokenSigner::new(key),
            None => {
                tracing::warn!("no secret_key configured; session cookies will not survive a restart");
                TokenSigner::random()
            }
        };
        let sessions = SessionStore::open(&cfg.session)
            .await
            .context("open session store")?;
        if controllers.is_empty() {
            tracing::info!("no controllers registered; serving pages and static files only");
        } else {
            tracing::debug!(count = controllers.len(), "controllers registered");
        }
        Ok(Self {
            layout: SiteLayout::from_config(cfg),
            controllers,
            sessions,
            signer,
            cookie_name: cfg.session_cookie.clone(),
        })
    }
}

/// The axum application for `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .fallback(dispatch::dispatch)
        .with_state(Arc::new(state))
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_on<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(%addr, root = %state.layout.root().display(), "kraken listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error")?;
    tracing::info!("kraken stopped");
    Ok(())
}

/// Bind `cfg.bind` and serve until Ctrl-C.
pub async fn serve(cfg: &KrakenConfig, controllers: ControllerRegistry) -> Result<()> {
    let state = AppState::from_config(cfg, controllers).await?;
    let listener = TcpListener::bind(&cfg.bind)
        .await
        .with_context(|| format!("bind {}", cfg.bind))?;
    serve_on(listener, state, shutdown_signal()).await
}

async fn shutdown_signal() {
    resolve_on_signal(tokio::signal::ctrl_c()).await
}

/// Resolves when `signal` fires. If listening fails it never resolves, so the
/// server keeps running instead of stopping at once.
async fn resolve_on_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(err) = signal.await {
        tracing::error!("cannot listen for Ctrl-C: {}", err);
        std::future::pending::<()>().await;
    }
}
