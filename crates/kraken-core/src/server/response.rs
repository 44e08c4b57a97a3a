//! Response builders shared by the dispatcher and controllers.

use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

const HTML: &str = "text/html; charset=utf-8";
const TEXT: &str = "text/plain; charset=utf-8";

/// 200 `text/html; charset=utf-8`.
pub fn html(body: impl Into<String>) -> Response {
    ([(CONTENT_TYPE, HTML)], body.into()).into_response()
}

/// 200 `text/plain; charset=utf-8`.
pub fn text(body: impl Into<String>) -> Response {
    ([(CONTENT_TYPE, TEXT)], body.into()).into_response()
}

/// 301 to `location` with a small HTML page linking the target.
pub fn redirect_page(location: &str) -> Response {
    let escaped = escape_html(location);
    let body = format!(
        "<!doctype html>\n\
         <html lang=en>\n\
         <title>Redirecting...</title>\n\
         <h1>Redirecting...</h1>\n\
         <p>You should be redirected automatically to the target URL: \
         <a href=\"{escaped}\">{escaped}</a>. If not, click the link.\n"
    );
    (
        StatusCode::MOVED_PERMANENTLY,
        [(CONTENT_TYPE, HTML.to_string()), (LOCATION, location.to_string())],
        body,
    )
        .into_response()
}

/// Fixed HTML body for an error status.
pub fn error_page(status: StatusCode) -> Response {
    let reason = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        "<!doctype html>\n<html lang=en>\n<title>{code} {reason}</title>\n<h1>{reason}</h1>\n",
        code = status.as_u16()
    );
    (status, [(CONTENT_TYPE, HTML)], body).into_response()
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}
