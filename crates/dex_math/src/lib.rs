//! Half-dex quote math for the kettle client.
//!
//! Pure fixed-point formulas translating a user-chosen liquidity amount plus
//! a pool reserve snapshot into the bounds a submitted operation will accept:
//! slippage-floored minimum withdrawals on the redemption side, minimum
//! shares minted on the deposit side. No I/O here; chain state is fetched
//! elsewhere and passed in by value.

pub mod deposit;
pub mod redeem;
pub mod slippage;

pub use deposit::{deposit_owed, deposit_quote, deposit_shares, DepositQuote};
pub use redeem::{
    redeemed_amount, redemption_quote, OwedDebt, PoolReserves, RedemptionQuote, RedemptionRequest,
};
pub use slippage::{slippage_cap, slippage_floor};

/// Fixed-point scale: 6 decimal places (1.0 == 1_000_000).
pub const SCALE: u64 = 1_000_000;

/// Basis points scale (10_000 bps == 100%).
pub const BPS_SCALE: u64 = 10_000;

/// Error types for quote math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    /// Slippage tolerance above 100%.
    #[error("slippage tolerance exceeds {BPS_SCALE} bps")]
    SlippageOutOfRange,
    /// Intermediate result does not fit the 64-bit amount domain.
    #[error("arithmetic overflow")]
    Overflow,
}

/// Divide widened amounts, rounding up.
#[inline]
pub(crate) fn div_ceil_u128(numerator: u128, denominator: u128) -> u128 {
    (numerator + denominator - 1) / denominator
}
