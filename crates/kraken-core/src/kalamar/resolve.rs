//! Exactly-one resolution over a lazy sequence.

use super::error::NotExactlyOne;

/// Returns the only item produced by `items`.
///
/// Pulls at most two items and never drains the sequence, so it is safe on
/// unbounded or expensive producers. The second item, if any, is dropped.
pub fn exactly_one<I>(items: I) -> Result<I::Item, NotExactlyOne>
where
    I: IntoIterator,
{
    let mut items = items.into_iter();
    let first = items.next().ok_or(NotExactlyOne::NotFound)?;
    match items.next() {
        None => Ok(first),
        Some(_) => Err(NotExactlyOne::MultipleResultsFound),
    }
}
