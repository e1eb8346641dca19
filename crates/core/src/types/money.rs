//! Money arithmetic on `rust_decimal::Decimal`.
//!
//! All prices and totals are USD amounts in dollars (not cents). Decimal
//! arithmetic keeps `price × quantity` sums exact; the only rounding in the
//! system happens on the client, which is what [`TOTAL_TOLERANCE`] absorbs.

use rust_decimal::Decimal;

/// Largest accepted gap between a client-claimed total and the trusted total.
///
/// One cent. Covers floating-point drift from client-side arithmetic and
/// nothing else.
pub const TOTAL_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Total for a single order line.
#[must_use]
pub fn line_total(price: Decimal, quantity: u8) -> Decimal {
    price * Decimal::from(quantity)
}

/// Whether `claimed` is within [`TOTAL_TOLERANCE`] of `trusted` (inclusive).
#[must_use]
pub fn within_tolerance(trusted: Decimal, claimed: Decimal) -> bool {
    (trusted - claimed).abs() <= TOTAL_TOLERANCE
}

/// Format an amount for display, e.g. `$12.50`.
#[must_use]
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${:.2}", rounded.abs())
    } else {
        format!("${:.2}", rounded.abs())
    }
}
