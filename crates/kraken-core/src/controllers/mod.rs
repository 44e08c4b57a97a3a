//! Compiled-in request handlers registered at slash-terminated paths.
//!
//! A controller registered at `hello/` answers `/hello/`; a request for
//! `/hello` is redirected to the slash form by the dispatcher.

pub mod demo;

use anyhow::Result;
use axum::response::Response;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::server::KrakenError;
use crate::session::Session;

/// What a controller sees of the request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Raw query string without the `?`, empty when absent.
    pub query_string: String,
    pub session: Session,
}

impl RequestContext {
    /// First value of query parameter `name`, form-decoded.
    pub fn query_param(&self, name: &str) -> Option<String> {
        url::form_urlencoded::parse(self.query_string.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

pub type ControllerFuture = Pin<Box<dyn Future<Output = Result<Response, KrakenError>> + Send>>;

/// Type-erased controller.
pub type Controller = Arc<dyn Fn(RequestContext) -> ControllerFuture + Send + Sync>;

#[derive(Clone, Default)]
pub struct ControllerRegistry {
    routes: HashMap<String, Controller>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` at `path` (`"hello"`, `"/hello/"` and `"hello/"`
    /// are the same route). Registering a path twice is an error.
    pub fn register<F, Fut>(&mut self, path: &str, handler: F) -> Result<()>
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, KrakenError>> + Send + 'static,
    {
        let key = route_key(path);
        anyhow::ensure!(
            !self.routes.contains_key(&key),
            "duplicate controller for path /{key}"
        );
        let controller: Controller =
            Arc::new(move |ctx: RequestContext| -> ControllerFuture { Box::pin(handler(ctx)) });
        self.routes.insert(key, controller);
        Ok(())
    }

    /// Controller registered under a canonical key such as `hello/`.
    pub fn get(&self, key: &str) -> Option<&Controller> {
        self.routes.get(key)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn route_key(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}
