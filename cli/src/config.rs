//! Network configuration and trade settings

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use dex_math::BPS_SCALE;

/// Deployed ctez contract addresses.
const MAINNET_CTEZ: &str = "KT1GWnsoFZVHGh7roXEER3qeCcgJgrXT3de2";
const GHOSTNET_CTEZ: &str = "KT1Q6aNZ9aGro8DLYjMgZbiKmfnrGrXCmM4k";

pub struct NetworkConfig {
    pub network: String,
    pub node_url: String,
    pub indexer_url: String,
    /// Main protocol contract (ovens + both half-dexes).
    pub ctez_address: String,
    /// Key alias or address known to the octez-client wallet.
    pub key_alias: String,
    /// Path to the octez-client binary.
    pub octez_client: String,
}

impl NetworkConfig {
    pub fn new(
        network: &str,
        node_url: Option<String>,
        indexer_url: Option<String>,
        contract: Option<String>,
        key_alias: Option<String>,
    ) -> Result<Self> {
        let (default_node, default_indexer, default_contract) = match network {
            "mainnet" => (
                "https://mainnet.api.tez.ie".to_string(),
                "https://api.tzkt.io".to_string(),
                Some(MAINNET_CTEZ.to_string()),
            ),
            "ghostnet" => (
                "https://ghostnet.ecadinfra.com".to_string(),
                "https://api.ghostnet.tzkt.io".to_string(),
                Some(GHOSTNET_CTEZ.to_string()),
            ),
            "sandbox" | "local" => (
                "http://127.0.0.1:8732".to_string(),
                "http://127.0.0.1:5000".to_string(),
                None,
            ),
            _ => anyhow::bail!(
                "Unknown network: {}. Use mainnet, ghostnet, or sandbox",
                network
            ),
        };

        let ctez_address = contract
            .or(default_contract)
            .context("No contract address for this network; pass --contract")?;

        let octez_client =
            std::env::var("OCTEZ_CLIENT").unwrap_or_else(|_| "octez-client".to_string());

        Ok(Self {
            network: network.to_string(),
            node_url: node_url.unwrap_or(default_node),
            indexer_url: indexer_url.unwrap_or(default_indexer),
            ctez_address,
            key_alias: key_alias.unwrap_or_else(|| "kettle".to_string()),
            octez_client,
        })
    }
}

/// User-level trade defaults. Recognized options are exactly
/// `{slippage: percent, deadline: minutes}`, passed explicitly into every
/// quote computation rather than read ambiently.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TradeSettings {
    /// Slippage tolerance in percent (0.5 == 0.5%).
    pub slippage: f64,
    /// Operation deadline in minutes from submission time.
    pub deadline: i64,
}

impl Default for TradeSettings {
    fn default() -> Self {
        Self {
            slippage: 0.5,
            deadline: 20,
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    trade: TradeSettings,
}

impl TradeSettings {
    /// Load from the config file, falling back to defaults when absent.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => default_config_path(),
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let file: ConfigFile = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        file.trade.validated()
    }

    pub fn with_overrides(self, slippage: Option<f64>, deadline: Option<i64>) -> Result<Self> {
        Self {
            slippage: slippage.unwrap_or(self.slippage),
            deadline: deadline.unwrap_or(self.deadline),
        }
        .validated()
    }

    fn validated(self) -> Result<Self> {
        if !(0.0..=100.0).contains(&self.slippage) {
            anyhow::bail!("Slippage must be between 0 and 100 percent");
        }
        if self.deadline <= 0 {
            anyhow::bail!("Deadline must be a positive number of minutes");
        }
        Ok(self)
    }

    /// Slippage tolerance in basis points, as the quote math consumes it.
    pub fn slippage_bps(&self) -> u64 {
        let bps = (self.slippage * 100.0).round() as u64;
        bps.min(BPS_SCALE)
    }
}

fn default_config_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde("~/.config/kettle/config.toml").into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_network_presets() {
        let config = NetworkConfig::new("mainnet", None, None, None, None).unwrap();
        assert_eq!(config.ctez_address, MAINNET_CTEZ);
        assert!(config.indexer_url.contains("tzkt.io"));

        let config = NetworkConfig::new("ghostnet", None, None, None, Some("alice".into())).unwrap();
        assert_eq!(config.key_alias, "alice");

        assert!(NetworkConfig::new("testnet", None, None, None, None).is_err());
    }

    #[test]
    fn test_sandbox_requires_contract() {
        assert!(NetworkConfig::new("sandbox", None, None, None, None).is_err());
        let config = NetworkConfig::new("sandbox", None, None, Some("KT1xyz".into()), None).unwrap();
        assert_eq!(config.node_url, "http://127.0.0.1:8732");
    }

    #[test]
    fn test_trade_settings_defaults() {
        let settings = TradeSettings::default();
        assert_eq!(settings.slippage_bps(), 50);
        assert_eq!(settings.deadline, 20);
    }

    #[test]
    fn test_trade_settings_missing_file() {
        let settings = TradeSettings::load(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(settings, TradeSettings::default());
    }

    #[test]
    fn test_trade_settings_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[trade]\nslippage = 1.0\ndeadline = 5").unwrap();
        let settings = TradeSettings::load(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(settings.slippage_bps(), 100);
        assert_eq!(settings.deadline, 5);
    }

    #[test]
    fn test_trade_settings_rejects_bad_values() {
        assert!(TradeSettings::default()
            .with_overrides(Some(150.0), None)
            .is_err());
        assert!(TradeSettings::default().with_overrides(None, Some(0)).is_err());
        let overridden = TradeSettings::default()
            .with_overrides(Some(0.25), Some(10))
            .unwrap();
        assert_eq!(overridden.slippage_bps(), 25);
    }
}
