//! Booking source constants.
//!
//! These must match the CHECK constraint on `tokens.source` in
//! `20260301000004_create_tokens_table.sql`.

/// Paid booking confirmed through the payment gateway.
pub const SOURCE_ONLINE: &str = "online";
/// Admin-created booking, no payment step.
pub const SOURCE_OFFLINE: &str = "offline";
/// Walk-in intake at the front desk.
pub const SOURCE_WALKIN: &str = "walkin";

/// Validate a source string against the known set.
pub fn is_valid_source(source: &str) -> bool {
    matches!(source, SOURCE_ONLINE | SOURCE_OFFLINE | SOURCE_WALKIN)
}
