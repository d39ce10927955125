//! Error type for repository operations that mix domain rules with SQL.

use medq_core::error::CoreError;

/// Error returned by the transactional repository operations.
///
/// Plain CRUD helpers return `sqlx::Error` directly; operations that
/// enforce domain invariants (slot reservation, status transitions,
/// intent fulfillment) return this type so callers can distinguish a
/// broken invariant from a broken connection.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl LedgerError {
    /// The domain error, if this is one.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            LedgerError::Core(core) => Some(core),
            LedgerError::Db(_) => None,
        }
    }
}

/// Convenience alias for transactional repository results.
pub type LedgerResult<T> = Result<T, LedgerError>;
