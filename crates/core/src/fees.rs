//! Fee computation for online paid bookings.
//!
//! All amounts are integer cents. The payable amount is the provider's
//! consultation fee plus a flat platform convenience fee.

/// Flat convenience fee charged on every online booking, in cents.
pub const CONVENIENCE_FEE_CENTS: i64 = 5_000;

/// Compute the total payable amount for an online booking.
///
/// Saturates rather than wrapping; a provider fee near `i64::MAX` is a data
/// error, not a reason to panic.
pub fn booking_amount_cents(consultation_fee_cents: i64) -> i64 {
    consultation_fee_cents.saturating_add(CONVENIENCE_FEE_CENTS)
}
