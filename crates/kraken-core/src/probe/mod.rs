//! Blocking HTTP GET used to exercise a running site from the outside.
//!
//! Uses the curl crate (libcurl). Redirects are not followed so callers can
//! assert on 301 responses and their `Location`.

mod parse;

use anyhow::{Context, Result};
use std::borrow::Cow;
use std::str;
use std::time::Duration;

/// Status, headers and body of one response.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: u32,
    /// Header `(name, value)` pairs in arrival order.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ProbeResponse {
    /// First value of header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// The `name=value` part of the first `Set-Cookie` for cookie `name`.
    pub fn cookie_pair(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("set-cookie"))
            .filter_map(|(_, v)| v.split(';').next())
            .map(str::trim)
            .find(|pair| {
                pair.split_once('=')
                    .map_or(false, |(k, _)| k.trim() == name)
            })
    }
}

/// Performs a GET with optional extra headers and returns the raw response.
///
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub fn get(url: &str, extra_headers: &[(&str, &str)]) -> Result<ProbeResponse> {
    request("GET", url, extra_headers)
}

/// Performs a HEAD; the response body is always empty.
pub fn head(url: &str, extra_headers: &[(&str, &str)]) -> Result<ProbeResponse> {
    request("HEAD", url, extra_headers)
}

/// Sends `method` (e.g. `POST`, `DELETE`) without a request body.
pub fn request(method: &str, url: &str, extra_headers: &[(&str, &str)]) -> Result<ProbeResponse> {
    let mut header_lines: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    match method {
        "GET" => easy.get(true)?,
        "HEAD" => easy.nobody(true)?,
        other => easy.custom_request(other)?,
    }
    easy.follow_location(false)?;
    easy.connect_timeout(Duration::from_secs(15))?;
    easy.timeout(Duration::from_secs(30))?;

    if !extra_headers.is_empty() {
        let mut list = curl::easy::List::new();
        for (k, v) in extra_headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        easy.http_headers(list)?;
    }

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                header_lines.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer
            .perform()
            .with_context(|| format!("{} {} failed", method, url))?;
    }

    let status = easy.response_code().context("no response code")?;
    tracing::debug!(method, url, status, bytes = body.len(), "probe response");

    Ok(ProbeResponse {
        status,
        headers: parse::parse_header_lines(&header_lines),
        body,
    })
}
