//! Request-level errors and their HTTP responses.

use axum::http::header::ALLOW;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::response::error_page;
use crate::kalamar::SiteError;

#[derive(Debug, Error)]
pub enum KrakenError {
    #[error("not found")]
    NotFound,
    #[error("forbidden")]
    Forbidden,
    #[error("method not allowed")]
    MethodNotAllowed,
    /// Anything else; details are logged, never sent to the client.
    #[error("internal error: {0:#}")]
    Internal(anyhow::Error),
}

impl KrakenError {
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        KrakenError::Internal(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            KrakenError::NotFound => StatusCode::NOT_FOUND,
            KrakenError::Forbidden => StatusCode::FORBIDDEN,
            KrakenError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            KrakenError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Storage "not found" becomes 404; every other storage failure is a 500.
impl From<SiteError> for KrakenError {
    fn from(err: SiteError) -> Self {
        if err.is_not_found() {
            KrakenError::NotFound
        } else {
            KrakenError::Internal(err.into())
        }
    }
}

impl IntoResponse for KrakenError {
    fn into_response(self) -> Response {
        if let KrakenError::Internal(err) = &self {
            tracing::error!("request failed: {:#}", err);
        }
        let mut response = error_page(self.status());
        if matches!(self, KrakenError::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kalamar::NotExactlyOne;
    use axum::body::to_bytes;

    #[test]
    fn site_errors_map_to_statuses() {
        let not_found = KrakenError::from(SiteError::from(NotExactlyOne::NotFound));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let many = KrakenError::from(SiteError::from(NotExactlyOne::MultipleResultsFound));
        assert_eq!(many.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let unimplemented = KrakenError::from(SiteError::Unimplemented {
            operation: "search",
        });
        assert_eq!(unimplemented.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn internal_details_are_not_leaked() {
        let err = KrakenError::internal(anyhow::anyhow!("database password is hunter2"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(!body.contains("hunter2"));
        assert!(body.contains("500"));
    }

    #[test]
    fn method_not_allowed_sets_allow() {
        let response = KrakenError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET, HEAD");
    }
}
