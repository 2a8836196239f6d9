//! Chain-state reads through a TzKT-style indexer API
//!
//! All read-only state comes from here as point-in-time snapshots of the
//! latest indexed block; the submission path never goes through this module.
//! Numeric storage fields arrive as JSON strings and parse through a serde
//! helper.

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use dex_math::{OwedDebt, PoolReserves};
use quote_engine::{DexSide, QuoteError, ReserveSource};

use crate::config::NetworkConfig;

/// Parse nat/int storage values rendered as JSON strings.
mod string_num {
    use serde::{Deserialize, Deserializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One half-dex as stored on chain.
#[derive(Debug, Clone, Deserialize)]
pub struct HalfDexStorage {
    #[serde(with = "string_num")]
    pub self_reserves: u64,
    #[serde(with = "string_num")]
    pub proceeds_reserves: u64,
    #[serde(with = "string_num")]
    pub subsidy_reserves: u64,
    #[serde(with = "string_num")]
    pub total_liquidity_shares: u64,
    /// Big-map pointer for the per-owner accounts.
    pub liquidity_owners: i64,
    /// 2^64-scaled accumulator; kept raw, nothing client-side consumes it.
    #[serde(default)]
    pub fee_index: String,
}

impl HalfDexStorage {
    pub fn reserves(&self) -> PoolReserves {
        PoolReserves {
            self_reserves: self.self_reserves,
            proceeds_reserves: self.proceeds_reserves,
            subsidy_reserves: self.subsidy_reserves,
            total_liquidity_shares: self.total_liquidity_shares,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContextStorage {
    /// Target price, 2^48 fixed point.
    #[serde(with = "string_num")]
    pub target: u64,
    #[serde(with = "string_num")]
    pub drift: i64,
    pub ctez_fa12_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CtezStorage {
    /// Big-map pointer for the oven registry.
    pub ovens: i64,
    pub sell_ctez: HalfDexStorage,
    pub sell_tez: HalfDexStorage,
    pub context: ContextStorage,
}

/// Per-owner liquidity account; absent accounts read as all-zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiquidityOwnerStorage {
    #[serde(with = "string_num")]
    pub liquidity_shares: u64,
    #[serde(with = "string_num")]
    pub proceeds_owed: u64,
    #[serde(with = "string_num")]
    pub subsidy_owed: u64,
}

impl LiquidityOwnerStorage {
    pub fn owed(&self) -> OwedDebt {
        OwedDebt {
            proceeds_owed: self.proceeds_owed,
            subsidy_owed: self.subsidy_owed,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OvenStorage {
    /// Address of the originated oven contract.
    pub address: String,
    #[serde(with = "string_num")]
    pub tez_balance: u64,
    #[serde(with = "string_num")]
    pub ctez_outstanding: u64,
}

#[derive(Debug, Deserialize)]
struct BigMapKey<T> {
    active: bool,
    value: T,
}

pub struct IndexerClient {
    http: reqwest::Client,
    base_url: String,
    contract: String,
}

impl IndexerClient {
    pub fn new(config: &NetworkConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.indexer_url.trim_end_matches('/').to_string(),
            contract: config.ctez_address.clone(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Indexer request failed: {}", url))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .with_context(|| format!("Indexer returned an error: {}", url))?;
        let value = response
            .json()
            .await
            .with_context(|| format!("Failed to decode indexer response: {}", url))?;
        Ok(Some(value))
    }

    /// Full protocol contract storage as of the latest indexed block.
    pub async fn storage(&self) -> Result<CtezStorage> {
        let url = format!("{}/v1/contracts/{}/storage", self.base_url, self.contract);
        self.get_json(&url)
            .await?
            .with_context(|| format!("Contract not found on indexer: {}", self.contract))
    }

    pub async fn half_dex(&self, side: DexSide) -> Result<HalfDexStorage> {
        let storage = self.storage().await?;
        Ok(match side {
            DexSide::SellCtez => storage.sell_ctez,
            DexSide::SellTez => storage.sell_tez,
        })
    }

    /// Owner account in the given half-dex; a missing record is an account
    /// that never deposited and reads as all-zero.
    pub async fn liquidity_owner(
        &self,
        side: DexSide,
        owner: &str,
    ) -> Result<LiquidityOwnerStorage> {
        let half_dex = self.half_dex(side).await?;
        let url = format!(
            "{}/v1/bigmaps/{}/keys/{}",
            self.base_url, half_dex.liquidity_owners, owner
        );
        let key: Option<BigMapKey<LiquidityOwnerStorage>> = self.get_json(&url).await?;
        Ok(key
            .filter(|key| key.active)
            .map(|key| key.value)
            .unwrap_or_default())
    }

    /// Oven record for an (owner, id) handle, if one exists.
    pub async fn oven(&self, owner: &str, id: u64) -> Result<Option<OvenStorage>> {
        let storage = self.storage().await?;
        let url = format!(
            "{}/v1/bigmaps/{}/keys?key.owner={}&key.id={}&active=true",
            self.base_url, storage.ovens, owner, id
        );
        let keys: Option<Vec<BigMapKey<OvenStorage>>> = self.get_json(&url).await?;
        Ok(keys
            .unwrap_or_default()
            .into_iter()
            .find(|key| key.active)
            .map(|key| key.value))
    }
}

impl ReserveSource for &IndexerClient {
    async fn pool_reserves(&self, side: DexSide) -> Result<PoolReserves, QuoteError> {
        let half_dex = self
            .half_dex(side)
            .await
            .map_err(|err| QuoteError::Source(format!("{:#}", err)))?;
        Ok(half_dex.reserves())
    }

    async fn owed_debt(&self, side: DexSide, owner: &str) -> Result<OwedDebt, QuoteError> {
        let account = self
            .liquidity_owner(side, owner)
            .await
            .map_err(|err| QuoteError::Source(format!("{:#}", err)))?;
        Ok(account.owed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORAGE_FIXTURE: &str = r#"{
        "ovens": 411,
        "last_update": "2024-05-01T00:00:00Z",
        "sell_tez": {
            "self_reserves": "52000000",
            "proceeds_reserves": "48500000",
            "subsidy_reserves": "1200",
            "total_liquidity_shares": "51000001",
            "liquidity_owners": 412,
            "fee_index": "18446744073709551616"
        },
        "sell_ctez": {
            "self_reserves": "99906",
            "proceeds_reserves": "10600",
            "subsidy_reserves": "62",
            "total_liquidity_shares": "111123",
            "liquidity_owners": 413,
            "fee_index": "18446744073709551616"
        },
        "context": {
            "target": "281474976710656",
            "drift": "-235",
            "_Q": "52000000",
            "ctez_fa12_address": "KT1SjXiUX63QvdNMcM2m492f7kuf8JxXRLp4"
        }
    }"#;

    #[test]
    fn test_storage_fixture_decodes() {
        let storage: CtezStorage = serde_json::from_str(STORAGE_FIXTURE).unwrap();
        assert_eq!(storage.ovens, 411);
        assert_eq!(storage.sell_ctez.self_reserves, 99_906);
        assert_eq!(storage.sell_ctez.total_liquidity_shares, 111_123);
        assert_eq!(storage.sell_tez.liquidity_owners, 412);
        assert_eq!(storage.context.drift, -235);
        // 1.0 in 2^48 fixed point
        assert_eq!(storage.context.target, 1u64 << 48);
    }

    #[test]
    fn test_half_dex_to_reserves() {
        let storage: CtezStorage = serde_json::from_str(STORAGE_FIXTURE).unwrap();
        let reserves = storage.sell_ctez.reserves();
        assert_eq!(
            reserves,
            PoolReserves {
                self_reserves: 99_906,
                proceeds_reserves: 10_600,
                subsidy_reserves: 62,
                total_liquidity_shares: 111_123,
            }
        );
    }

    #[test]
    fn test_owner_account_decodes_and_defaults() {
        let raw = r#"{
            "active": true,
            "value": {
                "liquidity_shares": "11123",
                "proceeds_owed": "1062",
                "subsidy_owed": "7"
            }
        }"#;
        let key: BigMapKey<LiquidityOwnerStorage> = serde_json::from_str(raw).unwrap();
        assert!(key.active);
        assert_eq!(key.value.liquidity_shares, 11_123);
        assert_eq!(
            key.value.owed(),
            OwedDebt {
                proceeds_owed: 1_062,
                subsidy_owed: 7
            }
        );

        let absent = LiquidityOwnerStorage::default();
        assert_eq!(absent.owed(), OwedDebt::default());
    }

    #[test]
    fn test_oven_record_decodes() {
        let raw = r#"{
            "address": "KT1BRudFZEXLYANgmZTka1xCDN5nWTMWY7SZ",
            "tez_balance": "25000000",
            "ctez_outstanding": "11000000",
            "fee_index": "18446744073709551616"
        }"#;
        let oven: OvenStorage = serde_json::from_str(raw).unwrap();
        assert_eq!(oven.tez_balance, 25_000_000);
        assert_eq!(oven.ctez_outstanding, 11_000_000);
    }
}
