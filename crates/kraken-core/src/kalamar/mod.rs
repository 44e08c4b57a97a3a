//! Kalamar: a data-access facade over an abstract storage capability.
//!
//! The facade depends only on the [`Store`] trait. Concrete backends own the
//! matching rules, persistence and conflict handling; the facade adds
//! [`Site::open`], which turns a multi-result search into a single-object
//! lookup without counting or buffering the result set.

mod error;
mod resolve;
mod site;
mod store;

pub use error::{NotExactlyOne, SiteError};
pub use resolve::exactly_one;
pub use site::Site;
pub use store::{AccessPoint, Items, Store, UnimplementedStore};
