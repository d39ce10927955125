//! Status helper enum for the `payment_intents.status_id` column.
//!
//! Token statuses live in `medq_core::status` because they carry the
//! transition rules; intent statuses are a plain three-state flag.

use medq_core::status::StatusId;

/// Payment intent lifecycle status.
///
/// `Success` and `Failure` are terminal; a row never leaves them.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentStatus {
    Initiated = 1,
    Success = 2,
    Failure = 3,
}

impl IntentStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Inverse of [`IntentStatus::id`].
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(IntentStatus::Initiated),
            2 => Some(IntentStatus::Success),
            3 => Some(IntentStatus::Failure),
            _ => None,
        }
    }
}

impl From<IntentStatus> for StatusId {
    fn from(value: IntentStatus) -> Self {
        value as StatusId
    }
}
