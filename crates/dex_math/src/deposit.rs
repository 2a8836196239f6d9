//! Liquidity deposit quotes.
//!
//! Depositing into a half-dex mints shares in proportion to the self-reserve
//! balance, and records the depositor's pro-rata slice of the proceeds and
//! subsidy reserves as owed debt so a fresh deposit cannot claim earnings
//! that accrued before it.

use crate::redeem::PoolReserves;
use crate::slippage::slippage_floor;
use crate::{div_ceil_u128, MathError};

/// Shares minted for `deposit` against the current pool state:
/// `ceil(deposit * total_shares / max(self_reserves, 1))`.
pub fn deposit_shares(deposit: u64, self_reserves: u64, total_shares: u64) -> Result<u64, MathError> {
    let numerator = (deposit as u128) * (total_shares as u128);
    let shares = div_ceil_u128(numerator, self_reserves.max(1) as u128);
    u64::try_from(shares).map_err(|_| MathError::Overflow)
}

/// Debt recorded against freshly minted shares for one reserve category:
/// `ceil(shares_minted * reserve / max(new_total_shares, 1))` where
/// `new_total_shares` already includes the minted shares.
pub fn deposit_owed(shares_minted: u64, reserve: u64, new_total_shares: u64) -> Result<u64, MathError> {
    let numerator = (shares_minted as u128) * (reserve as u128);
    let owed = div_ceil_u128(numerator, new_total_shares.max(1) as u128);
    u64::try_from(owed).map_err(|_| MathError::Overflow)
}

/// What a deposit mints and the bound the submitting operation will accept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DepositQuote {
    /// Shares the pool would mint at the snapshot state.
    pub shares_minted: u64,
    /// Slippage-floored minimum the operation aborts below.
    pub min_shares: u64,
    /// Proceeds debt that will be recorded against the new shares.
    pub proceeds_owed: u64,
    /// Subsidy debt that will be recorded against the new shares.
    pub subsidy_owed: u64,
}

/// Quote a deposit of `deposit` self-asset units at the snapshot state.
///
/// A zero deposit short-circuits to the all-zero quote.
pub fn deposit_quote(
    deposit: u64,
    reserves: PoolReserves,
    slippage_bps: u64,
) -> Result<DepositQuote, MathError> {
    if deposit == 0 {
        return Ok(DepositQuote::default());
    }

    let shares = deposit_shares(deposit, reserves.self_reserves, reserves.total_liquidity_shares)?;
    let new_total = reserves
        .total_liquidity_shares
        .checked_add(shares)
        .ok_or(MathError::Overflow)?;

    Ok(DepositQuote {
        shares_minted: shares,
        min_shares: slippage_floor(shares, slippage_bps),
        proceeds_owed: deposit_owed(shares, reserves.proceeds_reserves, new_total)?,
        subsidy_owed: deposit_owed(shares, reserves.subsidy_reserves, new_total)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_shares_proportional() {
        // ceil(10_000 * 100_000 / 89_906) = 11_123
        assert_eq!(deposit_shares(10_000, 89_906, 100_000).unwrap(), 11_123);
    }

    #[test]
    fn test_deposit_shares_empty_pool() {
        // zero reserves divide by the guard and mint deposit * total
        assert_eq!(deposit_shares(500, 0, 1).unwrap(), 500);
    }

    #[test]
    fn test_deposit_owed_rounds_up() {
        // ceil(11_123 * 10_600 / 111_123) = 1_062
        assert_eq!(deposit_owed(11_123, 10_600, 111_123).unwrap(), 1_062);
        // ceil(11_123 * 62 / 111_123) = 7
        assert_eq!(deposit_owed(11_123, 62, 111_123).unwrap(), 7);
    }

    #[test]
    fn test_deposit_quote_records_debts() {
        let reserves = PoolReserves {
            self_reserves: 89_906,
            proceeds_reserves: 10_600,
            subsidy_reserves: 62,
            total_liquidity_shares: 100_000,
        };
        let quote = deposit_quote(10_000, reserves, 0).unwrap();
        assert_eq!(quote.shares_minted, 11_123);
        assert_eq!(quote.min_shares, 11_123);
        assert_eq!(quote.proceeds_owed, 1_062);
        assert_eq!(quote.subsidy_owed, 7);
    }

    #[test]
    fn test_deposit_quote_slippage_floor() {
        let reserves = PoolReserves {
            self_reserves: 1_000_000,
            proceeds_reserves: 0,
            subsidy_reserves: 0,
            total_liquidity_shares: 1_000_000,
        };
        // 1:1 pool, 0.5% tolerance: min = 1_000_000 * 0.995
        let quote = deposit_quote(1_000_000, reserves, 50).unwrap();
        assert_eq!(quote.shares_minted, 1_000_000);
        assert_eq!(quote.min_shares, 995_000);
    }

    #[test]
    fn test_deposit_quote_zero_deposit() {
        let reserves = PoolReserves {
            self_reserves: 55,
            proceeds_reserves: 66,
            subsidy_reserves: 77,
            total_liquidity_shares: 88,
        };
        assert_eq!(deposit_quote(0, reserves, 100).unwrap(), DepositQuote::default());
    }
}
