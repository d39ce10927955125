//! Domain error taxonomy shared across the workspace.

/// A domain-level error.
///
/// Persistence and HTTP layers wrap this type rather than inventing their
/// own variants; the HTTP layer owns the mapping to status codes.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CoreError {
    /// Malformed or missing input. Never retried automatically.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// An entity lookup came up empty.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// The operation would violate a cross-record invariant.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// All slots for the requested provider and date are taken.
    #[error("No slots remaining for the requested date")]
    CapacityExhausted,

    /// The provider is not currently accepting bookings for the date.
    #[error("Provider is not accepting bookings{}", .reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    NotAccepting { reason: Option<String> },

    /// The provider is on leave for the requested date.
    #[error("Provider is on leave for the requested date")]
    OnLeave,

    /// Missing or unverifiable actor claim.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The actor claim is valid but not permitted to act here.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The external payment gateway failed or was unreachable.
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    /// An unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`] with a displayable key.
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}
