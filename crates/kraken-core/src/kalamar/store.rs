//! Storage capability consumed by the facade.

use std::fmt;
use std::marker::PhantomData;

use super::error::SiteError;

/// Name of a collection of records inside a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessPoint(String);

impl AccessPoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lazy sequence of search results, borrowing from the store.
pub type Items<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// Backend operations a [`Site`](super::Site) delegates to.
///
/// There are no default bodies: a backend states what it supports, and
/// [`UnimplementedStore`] is the explicit "nothing" backend.
///
/// `search` must be restartable: calling it again with the same arguments
/// yields a fresh sequence.
pub trait Store {
    /// Record type produced by `search`.
    type Item;
    /// Filter passed to `search`; opaque to the facade.
    type Query: ?Sized;

    /// List every item in `access_point` matching `query`.
    fn search<'a>(
        &'a self,
        access_point: &AccessPoint,
        query: &Self::Query,
    ) -> Result<Items<'a, Self::Item>, SiteError>;

    /// Update or add `item`.
    fn save(&self, item: &Self::Item) -> Result<(), SiteError>;

    /// Remove `item` from the backend storage.
    fn remove(&self, item: &Self::Item) -> Result<(), SiteError>;
}

/// Placeholder backend: every operation fails with
/// [`SiteError::Unimplemented`].
pub struct UnimplementedStore<T, Q: ?Sized = str> {
    _marker: PhantomData<fn(&Q) -> T>,
}

impl<T, Q: ?Sized> UnimplementedStore<T, Q> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T, Q: ?Sized> Default for UnimplementedStore<T, Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Q: ?Sized> fmt::Debug for UnimplementedStore<T, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UnimplementedStore")
    }
}

impl<T, Q: ?Sized> Store for UnimplementedStore<T, Q> {
    type Item = T;
    type Query = Q;

    fn search<'a>(
        &'a self,
        access_point: &AccessPoint,
        _query: &Q,
    ) -> Result<Items<'a, T>, SiteError> {
        tracing::debug!(%access_point, "search on unimplemented store");
        Err(SiteError::Unimplemented {
            operation: "search",
        })
    }

    fn save(&self, _item: &T) -> Result<(), SiteError> {
        Err(SiteError::Unimplemented { operation: "save" })
    }

    fn remove(&self, _item: &T) -> Result<(), SiteError> {
        Err(SiteError::Unimplemented {
            operation: "remove",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_point_display() {
        let ap = AccessPoint::new("people");
        assert_eq!(ap.as_str(), "people");
        assert_eq!(ap.to_string(), "people");
        assert_eq!(ap, AccessPoint::new(String::from("people")));
    }

    #[test]
    fn unimplemented_store_reports_each_operation() {
        let store = UnimplementedStore::<u32>::new();
        let ap = AccessPoint::new("things");

        match store.search(&ap, "id=1") {
            Err(SiteError::Unimplemented { operation }) => assert_eq!(operation, "search"),
            other => panic!("expected Unimplemented, got {:?}", other.map(|_| ())),
        }
        assert!(matches!(
            store.save(&1),
            Err(SiteError::Unimplemented { operation: "save" })
        ));
        assert!(matches!(
            store.remove(&1),
            Err(SiteError::Unimplemented { operation: "remove" })
        ));
    }
}
