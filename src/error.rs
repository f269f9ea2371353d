//! Error types returned by reconciliation.

use thiserror::Error;

/// Errors that abort an in-progress reconciliation.
///
/// Both variants are fatal: the reconciler returns early without
/// producing a complete sibling chain. A third condition, a duplicate
/// key among new children, is not fatal and is reported through
/// [`log::warn!`] instead; see [`crate::child::warn_duplicate_keys`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A string ref was attached to an element with no declared owner.
    #[error("element has a string ref but no owner to bind it to")]
    MissingOwner,

    /// A child value was declared as a lazy sequence but did not
    /// produce an iterator when asked.
    #[error("child value is not iterable")]
    NotIterable,
}

/// Crate-local result alias.
pub type Result<T> = std::result::Result<T, Error>;
