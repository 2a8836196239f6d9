use dex_math::{
    deposit_shares, redeemed_amount, redemption_quote, slippage_floor, OwedDebt, PoolReserves,
    RedemptionQuote, RedemptionRequest, BPS_SCALE,
};
use proptest::prelude::*;

// Amounts stay inside the 6-decimal fixed-point domain real pools use. The
// bound keeps `burned * reserve` under 2^62 so the ceiling division fits u64
// even against the zero-shares guard divisor of 1.
const MAX_AMOUNT: u64 = 1u64 << 31;

proptest! {
    /// Redeemed amounts are never negative (the type says so) and never
    /// error inside the realistic amount domain.
    #[test]
    fn prop_redeemed_amount_total(
        burned in 0u64..MAX_AMOUNT,
        reserve in 0u64..MAX_AMOUNT,
        total_shares in 0u64..MAX_AMOUNT,
        debt in 0u64..MAX_AMOUNT,
    ) {
        let amount = redeemed_amount(burned, reserve, total_shares, debt);
        prop_assert!(amount.is_ok());
    }

    /// Zero burn always redeems zero, regardless of debt.
    #[test]
    fn prop_zero_burn_redeems_zero(
        reserve in 0u64..MAX_AMOUNT,
        total_shares in 0u64..MAX_AMOUNT,
        debt in 0u64..MAX_AMOUNT,
    ) {
        prop_assert_eq!(redeemed_amount(0, reserve, total_shares, debt).unwrap(), 0);
    }

    /// Increasing the burn never decreases the pre-debt redeemed amount.
    #[test]
    fn prop_redeemed_monotonic_in_burn(
        burned in 0u64..MAX_AMOUNT / 2,
        extra in 1u64..MAX_AMOUNT / 2,
        reserve in 0u64..MAX_AMOUNT,
        total_shares in 0u64..MAX_AMOUNT,
    ) {
        let smaller = redeemed_amount(burned, reserve, total_shares, 0).unwrap();
        let larger = redeemed_amount(burned + extra, reserve, total_shares, 0).unwrap();
        prop_assert!(larger >= smaller);
    }

    /// The zero-shares division guard behaves exactly like a one-share pool.
    #[test]
    fn prop_zero_shares_equals_one_share(
        burned in 0u64..MAX_AMOUNT,
        reserve in 0u64..MAX_AMOUNT,
        debt in 0u64..MAX_AMOUNT,
    ) {
        prop_assert_eq!(
            redeemed_amount(burned, reserve, 0, debt).unwrap(),
            redeemed_amount(burned, reserve, 1, debt).unwrap()
        );
    }

    /// More debt never increases the redeemed amount.
    #[test]
    fn prop_debt_only_reduces(
        burned in 0u64..MAX_AMOUNT,
        reserve in 0u64..MAX_AMOUNT,
        total_shares in 1u64..MAX_AMOUNT,
        debt in 0u64..MAX_AMOUNT / 2,
        extra_debt in 0u64..MAX_AMOUNT / 2,
    ) {
        let less = redeemed_amount(burned, reserve, total_shares, debt).unwrap();
        let more = redeemed_amount(burned, reserve, total_shares, debt + extra_debt).unwrap();
        prop_assert!(more <= less);
    }

    /// The slippage floor never exceeds the raw amount and is the identity
    /// at zero tolerance.
    #[test]
    fn prop_slippage_floor_bounds(amount in 0u64..u64::MAX, bps in 0u64..=BPS_SCALE) {
        let floored = slippage_floor(amount, bps);
        prop_assert!(floored <= amount);
        if bps == 0 {
            prop_assert_eq!(floored, amount);
        }
    }

    /// A zero-burn request yields the all-zero quote for any pool state.
    #[test]
    fn prop_quote_zero_burn_is_zero(
        self_reserves in 0u64..MAX_AMOUNT,
        proceeds_reserves in 0u64..MAX_AMOUNT,
        subsidy_reserves in 0u64..MAX_AMOUNT,
        total_shares in 0u64..MAX_AMOUNT,
        bps in 0u64..=BPS_SCALE,
    ) {
        let reserves = PoolReserves {
            self_reserves,
            proceeds_reserves,
            subsidy_reserves,
            total_liquidity_shares: total_shares,
        };
        let request = RedemptionRequest::new(0, bps).unwrap();
        let quote = redemption_quote(request, reserves, OwedDebt::default()).unwrap();
        prop_assert_eq!(quote, RedemptionQuote::default());
    }

    /// Burning the entire share supply with no tolerance claims at least the
    /// self reserves (the ceiling bias can only round up).
    #[test]
    fn prop_full_burn_claims_self_reserves(
        self_reserves in 1u64..MAX_AMOUNT,
        total_shares in 1u64..MAX_AMOUNT,
    ) {
        let reserves = PoolReserves {
            self_reserves,
            proceeds_reserves: 0,
            subsidy_reserves: 0,
            total_liquidity_shares: total_shares,
        };
        let request = RedemptionRequest::new(total_shares, 0).unwrap();
        let quote = redemption_quote(request, reserves, OwedDebt::default()).unwrap();
        prop_assert!(quote.min_self_received >= self_reserves);
    }

    /// Deposit shares scale monotonically with the deposit.
    #[test]
    fn prop_deposit_shares_monotonic(
        deposit in 0u64..MAX_AMOUNT / 2,
        extra in 1u64..MAX_AMOUNT / 2,
        self_reserves in 1u64..MAX_AMOUNT,
        total_shares in 1u64..MAX_AMOUNT,
    ) {
        let smaller = deposit_shares(deposit, self_reserves, total_shares).unwrap();
        let larger = deposit_shares(deposit + extra, self_reserves, total_shares).unwrap();
        prop_assert!(larger >= smaller);
    }
}
