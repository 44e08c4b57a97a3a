//! Sample controllers for the demo site: a greeting and a session echo.

use anyhow::Result;
use axum::response::Response;

use super::{ControllerRegistry, RequestContext};
use crate::server::response::{escape_html, html, text};
use crate::server::KrakenError;
use crate::session::NO_VALUE;

/// Session key written by [`session`].
pub const SESSION_KEY: &str = "value";

pub fn register(registry: &mut ControllerRegistry) -> Result<()> {
    registry.register("hello/", hello)?;
    registry.register("session/", session)?;
    Ok(())
}

/// `/hello/?name=World` greets `name` (default "World").
pub async fn hello(ctx: RequestContext) -> Result<Response, KrakenError> {
    let name = ctx
        .query_param("name")
        .unwrap_or_else(|| "World".to_string());
    Ok(html(format!(
        "<html><body>Hello, {}!</body></html>\n",
        escape_html(&name)
    )))
}

/// `/session/?<value>` stores the raw query string; `/session/` reads it back.
pub async fn session(ctx: RequestContext) -> Result<Response, KrakenError> {
    if !ctx.query_string.is_empty() {
        ctx.session
            .set(SESSION_KEY, &ctx.query_string)
            .await
            .map_err(KrakenError::Internal)?;
        return Ok(text(ctx.query_string));
    }
    let value = ctx
        .session
        .get(SESSION_KEY)
        .await
        .map_err(KrakenError::Internal)?;
    Ok(text(value.unwrap_or_else(|| NO_VALUE.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemorySessionStore, Session, SessionStore, SessionToken};
    use axum::body::to_bytes;
    use std::time::Duration;

    fn context(query: &str, session: &Session) -> RequestContext {
        RequestContext {
            query_string: query.to_string(),
            session: session.clone(),
        }
    }

    async fn body(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn fresh_session() -> Session {
        Session::new(SessionStore::Memory(MemorySessionStore::new()), None)
    }

    #[tokio::test]
    async fn hello_interpolates_and_escapes() {
        let s = fresh_session();
        let r = hello(context("name=World", &s)).await.unwrap();
        assert_eq!(body(r).await, "<html><body>Hello, World!</body></html>\n");

        let r = hello(context("name=%3Cb%3E", &s)).await.unwrap();
        assert_eq!(body(r).await, "<html><body>Hello, &lt;b&gt;!</body></html>\n");

        let r = hello(context("", &s)).await.unwrap();
        assert!(body(r).await.contains("Hello, World!"));
    }

    #[tokio::test]
    async fn session_roundtrip_within_one_session() {
        let s = fresh_session();
        let r = session(context("", &s)).await.unwrap();
        assert_eq!(body(r).await, NO_VALUE);

        session(context("blah", &s)).await.unwrap();
        assert!(s.issued_token().is_some());

        let r = session(context("", &s)).await.unwrap();
        assert_eq!(body(r).await, "blah");
    }

    #[tokio::test]
    async fn expired_session_reads_no_value() {
        let store = MemorySessionStore::with_max_age(Duration::from_secs(60));
        let token = SessionToken::generate();
        let an_hour_ago = crate::session::unix_timestamp() - 3600;
        store.set_at(&token, SESSION_KEY, "stale", an_hour_ago);

        let s = Session::new(SessionStore::Memory(store), Some(token));
        let r = session(context("", &s)).await.unwrap();
        assert_eq!(body(r).await, NO_VALUE);
    }

    #[test]
    fn register_adds_both_routes() {
        let mut registry = ControllerRegistry::new();
        register(&mut registry).unwrap();
        assert!(registry.get("hello/").is_some());
        assert!(registry.get("session/").is_some());
        assert!(register(&mut registry).is_err());
    }
}
