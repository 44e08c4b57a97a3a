//! Minimal `Cookie` / `Set-Cookie` handling for the session cookie.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;

/// Value of cookie `name` from the request's `Cookie` headers.
pub(crate) fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim())
}

/// `Set-Cookie` value for the session cookie.
pub(crate) fn session_cookie(name: &str, value: &str) -> String {
    format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; kraken_session=abc.def"));
        headers.append(COOKIE, HeaderValue::from_static("other=1"));
        assert_eq!(cookie_value(&headers, "kraken_session"), Some("abc.def"));
        assert_eq!(cookie_value(&headers, "other"), Some("1"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn no_cookie_header() {
        assert_eq!(cookie_value(&HeaderMap::new(), "kraken_session"), None);
    }

    #[test]
    fn set_cookie_attributes() {
        let c = session_cookie("kraken_session", "tok.sig");
        assert!(c.starts_with("kraken_session=tok.sig;"));
        assert!(c.contains("Path=/"));
        assert!(c.contains("HttpOnly"));
    }
}
