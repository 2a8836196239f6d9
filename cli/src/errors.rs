//! Protocol-level rejection messages
//!
//! The wallet client reports contract rejections as opaque payloads. When the
//! failwith tag is one the protocol is known to raise, attach readable text;
//! everything else passes through verbatim.

const PROTOCOL_ERRORS: &[(&str, &str)] = &[
    ("DEADLINE_HAS_PASSED", "The operation deadline has passed"),
    (
        "TEZ_IN_TRANSACTION_DISALLOWED",
        "This entrypoint does not accept attached tez",
    ),
    (
        "INSUFFICIENT_LIQUIDITY_CREATED",
        "Liquidity shares minted fell below the accepted minimum",
    ),
    (
        "INSUFFICIENT_SELF_RECEIVED",
        "Withdrawn reserves fell below the accepted minimum",
    ),
    (
        "INSUFFICIENT_PROCEEDS_RECEIVED",
        "Withdrawn proceeds fell below the accepted minimum",
    ),
    (
        "INSUFFICIENT_SUBSIDY_RECEIVED",
        "Withdrawn subsidy fell below the accepted minimum",
    ),
    (
        "INSUFFICIENT_TOKENS_BOUGHT",
        "Swap output fell below the accepted minimum",
    ),
    (
        "INSUFFICIENT_LIQUIDITY",
        "Not enough liquidity in the pool for this operation",
    ),
    (
        "DONT_BURN_MORE_THAN_OWNED",
        "Cannot burn more liquidity shares than the account owns",
    ),
    (
        "OVEN_ALREADY_EXISTS",
        "An oven with this id already exists for this owner",
    ),
    ("OVEN_NOT_EXISTS", "No oven with this id for this owner"),
    (
        "UNAUTHORIZED_DEPOSITOR",
        "Sender is not on the oven's depositor whitelist",
    ),
    (
        "EXCESSIVE_TEZ_WITHDRAWAL",
        "Withdrawal would leave the oven undercollateralized",
    ),
    (
        "EXCESSIVE_CTEZ_MINTING",
        "Mint would exceed the oven's collateral capacity",
    ),
    ("NOT_UNDERCOLLATERALIZED", "Oven is not liquidatable"),
];

/// Scan a rejection payload for a known protocol error tag.
pub fn describe(payload: &str) -> Option<&'static str> {
    PROTOCOL_ERRORS
        .iter()
        .find(|(tag, _)| payload.contains(tag))
        .map(|(_, text)| *text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_known_tag() {
        let stderr = "script reached FAILWITH instruction with \"DEADLINE_HAS_PASSED\"";
        assert_eq!(describe(stderr), Some("The operation deadline has passed"));
    }

    #[test]
    fn test_describe_unknown_payload() {
        assert_eq!(describe("some other failure"), None);
    }
}
