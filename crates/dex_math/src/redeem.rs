//! Liquidity redemption quotes.
//!
//! Burning shares entitles the owner to a pro-rata slice of each of the three
//! reserve categories, minus whatever the pool has already credited to the
//! owner's account as collectable debt. The pro-rata slice rounds up before
//! the debt is subtracted; the subtraction floors at zero. That exact order
//! matters at small scales and matches the on-chain accounting.

use crate::slippage::slippage_floor;
use crate::{div_ceil_u128, MathError, BPS_SCALE};

/// Half-dex reserve snapshot, all amounts in 6-decimal fixed point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReserves {
    /// Reserves of the asset this half-dex sells.
    pub self_reserves: u64,
    /// Accumulated swap proceeds (the opposite asset).
    pub proceeds_reserves: u64,
    /// Accumulated subsidy (minted into the pool over time).
    pub subsidy_reserves: u64,
    /// Total liquidity shares issued against these reserves.
    pub total_liquidity_shares: u64,
}

/// Amounts already credited to an owner and excluded from a new redemption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwedDebt {
    pub proceeds_owed: u64,
    pub subsidy_owed: u64,
}

/// A validated redemption request: how many shares to burn, and how much
/// adverse movement the submitter tolerates between quote and execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedemptionRequest {
    liquidity_burned: u64,
    slippage_bps: u64,
}

impl RedemptionRequest {
    pub fn new(liquidity_burned: u64, slippage_bps: u64) -> Result<Self, MathError> {
        if slippage_bps > BPS_SCALE {
            return Err(MathError::SlippageOutOfRange);
        }
        Ok(Self {
            liquidity_burned,
            slippage_bps,
        })
    }

    pub fn liquidity_burned(&self) -> u64 {
        self.liquidity_burned
    }

    pub fn slippage_bps(&self) -> u64 {
        self.slippage_bps
    }
}

/// Minimum amounts a redemption will accept, one per reserve category.
/// These are the floors the on-chain operation aborts below.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedemptionQuote {
    pub min_self_received: u64,
    pub min_proceeds_received: u64,
    pub min_subsidy_received: u64,
}

impl RedemptionQuote {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Pro-rata share of `reserve` attributable to `liquidity_burned` shares,
/// net of debt already owed to the caller.
///
/// The share is `ceil(liquidity_burned * reserve / max(total_shares, 1))`.
/// Rounding up biases against over-crediting the withdrawer relative to the
/// pool's actual obligation. A pool with zero issued shares divides by 1 and
/// yields whatever the (necessarily zero-share) burn amounts to rather than a
/// division fault.
pub fn redeemed_amount(
    liquidity_burned: u64,
    reserve: u64,
    total_shares: u64,
    debt_owed: u64,
) -> Result<u64, MathError> {
    let numerator = (liquidity_burned as u128) * (reserve as u128);
    let share = div_ceil_u128(numerator, total_shares.max(1) as u128);
    let share = u64::try_from(share).map_err(|_| MathError::Overflow)?;
    Ok(share.saturating_sub(debt_owed))
}

/// Quote a redemption across all three reserve categories.
///
/// Self-reserve redemption carries no offsetting debt; proceeds and subsidy
/// redemptions subtract the owner's respective owed balances. Each raw amount
/// is then floored by the slippage tolerance. A zero burn short-circuits to
/// the all-zero quote without consulting the reserves.
pub fn redemption_quote(
    request: RedemptionRequest,
    reserves: PoolReserves,
    debt: OwedDebt,
) -> Result<RedemptionQuote, MathError> {
    if request.liquidity_burned == 0 {
        return Ok(RedemptionQuote::default());
    }

    let burned = request.liquidity_burned;
    let total = reserves.total_liquidity_shares;

    let self_raw = redeemed_amount(burned, reserves.self_reserves, total, 0)?;
    let proceeds_raw =
        redeemed_amount(burned, reserves.proceeds_reserves, total, debt.proceeds_owed)?;
    let subsidy_raw = redeemed_amount(burned, reserves.subsidy_reserves, total, debt.subsidy_owed)?;

    Ok(RedemptionQuote {
        min_self_received: slippage_floor(self_raw, request.slippage_bps),
        min_proceeds_received: slippage_floor(proceeds_raw, request.slippage_bps),
        min_subsidy_received: slippage_floor(subsidy_raw, request.slippage_bps),
    })
}
