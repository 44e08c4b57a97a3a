//! Request dispatch: static mounts, then controllers, then pages.

use axum::extract::State;
use axum::http::header::{
    CONTENT_TYPE, ETAG, HOST, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED, SET_COOKIE,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use std::path::Path;
use std::sync::Arc;

use super::cookie::{cookie_value, session_cookie};
use super::error::KrakenError;
use super::response::redirect_page;
use super::AppState;
use crate::conditional::{self, Preconditions, Validators};
use crate::controllers::{Controller, RequestContext};
use crate::session::Session;
use crate::site::{content_type_for, Lookup, RequestPath, SiteLayout};

pub(crate) async fn dispatch(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let response = match handle(&state, &method, &uri, &headers).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    };
    tracing::info!(
        method = %method,
        path = %uri.path(),
        status = response.status().as_u16(),
        "request"
    );
    response
}

async fn handle(
    state: &AppState,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
) -> Result<Response, KrakenError> {
    if method != Method::GET && method != Method::HEAD {
        return Err(KrakenError::MethodNotAllowed);
    }
    let path = RequestPath::parse(uri.path()).ok_or(KrakenError::NotFound)?;

    if let Some((dir, rest)) = state.layout.mount_for(&path) {
        return match SiteLayout::lookup_static(dir, &rest).await {
            Lookup::File(file) => serve_static(&file, headers).await,
            Lookup::Hidden => Err(KrakenError::Forbidden),
            Lookup::NeedsSlash | Lookup::Missing => Err(KrakenError::NotFound),
        };
    }

    let key = path.key();
    if path.is_directory() {
        if let Some(controller) = state.controllers.get(&key) {
            return run_controller(state, controller.clone(), uri, headers).await;
        }
    } else if state.controllers.get(&format!("{key}/")).is_some() {
        return Ok(redirect_to_slash(uri, headers));
    }

    let layout = state.layout.clone();
    let lookup = tokio::task::spawn_blocking(move || layout.lookup_page(&path))
        .await
        .map_err(KrakenError::internal)??;
    match lookup {
        Lookup::File(file) => serve_page(&file).await,
        Lookup::Hidden => Err(KrakenError::Forbidden),
        Lookup::NeedsSlash => Ok(redirect_to_slash(uri, headers)),
        Lookup::Missing => Err(KrakenError::NotFound),
    }
}

async fn run_controller(
    state: &AppState,
    controller: Controller,
    uri: &Uri,
    headers: &HeaderMap,
) -> Result<Response, KrakenError> {
    let token = cookie_value(headers, &state.cookie_name).and_then(|value| {
        state
            .signer
            .verify(value)
            .map_err(|err| tracing::debug!("ignoring session cookie: {}", err))
            .ok()
    });
    let session = Session::new(state.sessions.clone(), token);
    let ctx = RequestContext {
        query_string: uri.query().unwrap_or_default().to_string(),
        session: session.clone(),
    };

    let mut response = controller(ctx).await?;

    if let Some(token) = session.issued_token() {
        let cookie = session_cookie(&state.cookie_name, &state.signer.sign(&token));
        let value = HeaderValue::from_str(&cookie).map_err(KrakenError::internal)?;
        response.headers_mut().append(SET_COOKIE, value);
    }
    Ok(response)
}

/// 301 to the same URL with a trailing slash, query string preserved.
fn redirect_to_slash(uri: &Uri, headers: &HeaderMap) -> Response {
    let host = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let mut target = format!("http://{host}{}/", uri.path());
    if let Some(query) = uri.query() {
        target.push('?');
        target.push_str(query);
    }
    redirect_page(&target)
}

async fn serve_static(file: &Path, headers: &HeaderMap) -> Result<Response, KrakenError> {
    let meta = tokio::fs::metadata(file)
        .await
        .map_err(KrakenError::internal)?;
    let validators = Validators::for_file(file, &meta);
    let pre = Preconditions {
        if_none_match: header_str(headers, IF_NONE_MATCH.as_str()),
        if_modified_since: header_str(headers, IF_MODIFIED_SINCE.as_str()),
    };
    let validator_headers = [
        (ETAG, validators.etag.clone()),
        (LAST_MODIFIED, validators.last_modified_header()),
    ];

    if conditional::is_not_modified(&validators, &pre) {
        return Ok((StatusCode::NOT_MODIFIED, validator_headers).into_response());
    }

    let body = tokio::fs::read(file).await.map_err(KrakenError::internal)?;
    Ok((
        [(CONTENT_TYPE, content_type_for(file).to_string())],
        validator_headers,
        body,
    )
        .into_response())
}

async fn serve_page(file: &Path) -> Result<Response, KrakenError> {
    let body = tokio::fs::read(file).await.map_err(KrakenError::internal)?;
    Ok(([(CONTENT_TYPE, content_type_for(file))], body).into_response())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
