//! Error kinds for kalamar lookups.

use std::error::Error as StdError;

use thiserror::Error;

/// An exactly-one lookup matched zero objects or more than one.
///
/// Callers branch on the variant; the messages are for logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NotExactlyOne {
    /// No object matched the request.
    #[error("no object matched the request")]
    NotFound,
    /// At least two objects matched the request.
    #[error("more than one object matched the request")]
    MultipleResultsFound,
}

/// Errors surfaced by [`Site`](super::Site) operations.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error(transparent)]
    NotExactlyOne(#[from] NotExactlyOne),

    /// The configured store does not provide this operation.
    #[error("{operation} is not implemented by this store")]
    Unimplemented { operation: &'static str },

    /// The backing store failed; the source carries the details.
    #[error("store backend failed")]
    Backend(#[source] Box<dyn StdError + Send + Sync>),
}

impl SiteError {
    /// Wrap a backend failure.
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        SiteError::Backend(err.into())
    }

    /// The cardinality failure, if this is one.
    pub fn not_exactly_one(&self) -> Option<NotExactlyOne> {
        match self {
            SiteError::NotExactlyOne(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.not_exactly_one() == Some(NotExactlyOne::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinality_kinds_are_distinguishable() {
        let none: SiteError = NotExactlyOne::NotFound.into();
        let many: SiteError = NotExactlyOne::MultipleResultsFound.into();
        assert!(none.is_not_found());
        assert!(!many.is_not_found());
        assert_eq!(
            many.not_exactly_one(),
            Some(NotExactlyOne::MultipleResultsFound)
        );
    }

    #[test]
    fn unimplemented_is_not_a_cardinality_error() {
        let err = SiteError::Unimplemented { operation: "save" };
        assert!(err.not_exactly_one().is_none());
        assert_eq!(err.to_string(), "save is not implemented by this store");
    }

    #[test]
    fn backend_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = SiteError::backend(io);
        let source = StdError::source(&err).expect("source");
        assert_eq!(source.to_string(), "disk gone");
        assert_eq!(err.to_string(), "store backend failed");
        let chain = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chain.matches("disk gone").count(), 1, "{chain}");
    }
}
