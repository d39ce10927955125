//! Token status state machine.
//!
//! A token starts `Upcoming` and ends in exactly one of the terminal
//! states. "In progress" is never stored: a token is in progress when its
//! queue position equals the provider's completed count plus one.
//!
//! `Completed` and `Missed` are *counted* states: entering one of them
//! increments the availability record's completed count, leaving one of
//! them (via an explicit correction) decrements it.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

/// Stored lifecycle status of a token.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    Upcoming = 1,
    Completed = 2,
    Missed = 3,
    Cancelled = 4,
}

impl TokenStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Inverse of [`TokenStatus::id`].
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(TokenStatus::Upcoming),
            2 => Some(TokenStatus::Completed),
            3 => Some(TokenStatus::Missed),
            4 => Some(TokenStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal states admit no further ordinary transitions.
    pub fn is_terminal(self) -> bool {
        !matches!(self, TokenStatus::Upcoming)
    }

    /// Whether this status contributes to the completed count.
    ///
    /// Both `Completed` and `Missed` advance the queue: the provider is done
    /// with that position either way. `Cancelled` does not.
    pub fn is_counted(self) -> bool {
        matches!(self, TokenStatus::Completed | TokenStatus::Missed)
    }
}

impl From<TokenStatus> for StatusId {
    fn from(value: TokenStatus) -> Self {
        value as StatusId
    }
}

/// A validated status transition together with its completed-count effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: TokenStatus,
    pub to: TokenStatus,
    /// Change to apply to the availability record's completed count:
    /// -1, 0 or +1.
    pub completed_delta: i32,
    /// True when the transition changes nothing and must persist nothing.
    pub noop: bool,
}

/// Validate a requested status change.
///
/// Rules:
/// - `Upcoming` may move to any terminal state.
/// - Re-requesting the current terminal state is a no-op (idempotent).
/// - Moving between two different terminal states (e.g. correcting
///   `Completed` to `Missed`) requires `correction = true`.
/// - Nothing may transition back to `Upcoming`.
pub fn validate_transition(
    from: TokenStatus,
    to: TokenStatus,
    correction: bool,
) -> Result<Transition, CoreError> {
    if to == TokenStatus::Upcoming {
        return Err(CoreError::Conflict(format!(
            "cannot return a token to upcoming from {from:?}"
        )));
    }

    if from == to {
        return Ok(Transition {
            from,
            to,
            completed_delta: 0,
            noop: true,
        });
    }

    if from.is_terminal() && !correction {
        return Err(CoreError::Conflict(format!(
            "token already {from:?}; pass correction to change it to {to:?}"
        )));
    }

    let completed_delta = i32::from(to.is_counted()) - i32::from(from.is_counted());

    Ok(Transition {
        from,
        to,
        completed_delta,
        noop: false,
    })
}
