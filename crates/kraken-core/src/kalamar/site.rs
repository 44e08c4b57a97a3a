//! The facade itself: a [`Store`] plus the exactly-one lookup.

use super::error::SiteError;
use super::resolve::exactly_one;
use super::store::{AccessPoint, Items, Store};

/// Entry point for reading and writing records through one store.
#[derive(Debug, Clone, Default)]
pub struct Site<S> {
    store: S,
}

impl<S: Store> Site<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// List every item in `access_point` that matches `query`.
    pub fn search<'a>(
        &'a self,
        access_point: &AccessPoint,
        query: &S::Query,
    ) -> Result<Items<'a, S::Item>, SiteError> {
        self.store.search(access_point, query)
    }

    /// Return the single item in `access_point` that matches `query`.
    ///
    /// Fails with [`NotExactlyOne::NotFound`](super::NotExactlyOne::NotFound)
    /// when nothing matches and with
    /// [`NotExactlyOne::MultipleResultsFound`](super::NotExactlyOne::MultipleResultsFound)
    /// when more than one item does. Search errors propagate unchanged.
    pub fn open(&self, access_point: &AccessPoint, query: &S::Query) -> Result<S::Item, SiteError> {
        let items = self.store.search(access_point, query)?;
        exactly_one(items).map_err(|kind| {
            tracing::debug!(%access_point, %kind, "open did not match exactly one object");
            SiteError::from(kind)
        })
    }

    /// Update or add the item.
    pub fn save(&self, item: &S::Item) -> Result<(), SiteError> {
        self.store.save(item)
    }

    /// Remove the item from the backend storage.
    pub fn remove(&self, item: &S::Item) -> Result<(), SiteError> {
        self.store.remove(item)
    }
}
