//! Wallet-client invocation and amount plumbing
//!
//! Operation construction, signing, and injection are delegated to
//! octez-client; this module only prepares entrypoint calls and relays the
//! wallet's verdict. Rejections come back as opaque payloads, decorated with
//! the protocol error text when the failwith tag is recognized.

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::ProgressBar;
use std::process::Command;
use std::time::Duration;

use dex_math::SCALE;

use crate::config::NetworkConfig;
use crate::errors;
use crate::micheline::Expr;

/// A single contract call handed to the wallet for signing and injection.
#[derive(Debug, Clone)]
pub struct ContractCall {
    pub destination: String,
    pub entrypoint: String,
    pub arg: String,
    /// Attached tez in mutez.
    pub amount: u64,
}

impl ContractCall {
    pub fn new(destination: &str, entrypoint: &str, arg: String) -> Self {
        Self {
            destination: destination.to_string(),
            entrypoint: entrypoint.to_string(),
            arg,
            amount: 0,
        }
    }

    pub fn with_amount(mut self, amount: u64) -> Self {
        self.amount = amount;
        self
    }
}

pub struct OctezClient<'a> {
    config: &'a NetworkConfig,
}

impl<'a> OctezClient<'a> {
    pub fn new(config: &'a NetworkConfig) -> Self {
        Self { config }
    }

    /// The wallet address behind the configured key alias.
    pub fn source_address(&self) -> Result<String> {
        let output = Command::new(&self.config.octez_client)
            .args(["--endpoint", &self.config.node_url])
            .args(["show", "address", &self.config.key_alias])
            .output()
            .context("Failed to execute octez-client. Is it installed?")?;

        if !output.status.success() {
            anyhow::bail!(
                "octez-client could not resolve key '{}':\n{}",
                self.config.key_alias,
                String::from_utf8_lossy(&output.stderr)
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .find_map(|line| line.strip_prefix("Hash:"))
            .map(|hash| hash.trim().to_string())
            .context("No Hash: line in octez-client output")
    }

    /// Sign, inject, and wait for inclusion of a single contract call.
    /// Returns the operation hash.
    pub async fn submit(&self, call: ContractCall) -> Result<String> {
        let mut args: Vec<String> = vec![
            "--endpoint".into(),
            self.config.node_url.clone(),
            "transfer".into(),
            format_mutez(call.amount),
            "from".into(),
            self.config.key_alias.clone(),
            "to".into(),
            call.destination.clone(),
            "--burn-cap".into(),
            "0.5".into(),
        ];
        if !call.entrypoint.is_empty() {
            args.push("--entrypoint".into());
            args.push(call.entrypoint.clone());
        }
        if !call.arg.is_empty() {
            args.push("--arg".into());
            args.push(call.arg.clone());
        }

        log::debug!("octez-client {}", args.join(" "));

        let spinner = ProgressBar::new_spinner();
        spinner.set_message(format!(
            "Injecting {}%{} ...",
            call.destination, call.entrypoint
        ));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let binary = self.config.octez_client.clone();
        let output = tokio::task::spawn_blocking(move || {
            Command::new(binary).args(&args).output()
        })
        .await
        .context("octez-client task failed")?
        .context("Failed to execute octez-client. Is it installed?")?;

        spinner.finish_and_clear();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if let Some(reason) = errors::describe(&stderr) {
                anyhow::bail!("Operation rejected: {}\n{}", reason, stderr.trim());
            }
            anyhow::bail!("Operation rejected:\n{}", stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let hash = parse_operation_hash(&stdout)
            .context("Operation injected but no hash found in octez-client output")?;

        println!("{} {}", "Operation included:".bright_green(), hash);
        Ok(hash)
    }

    /// Reset-then-set the FA1.2 allowance for a spender. Resetting to zero
    /// first sidesteps the approve race on a pre-existing allowance.
    pub async fn approve_fa12(&self, token: &str, spender: &str, amount: u64) -> Result<()> {
        for value in [0, amount] {
            let arg = Expr::pair([Expr::string(spender), Expr::Nat(value)]);
            self.submit(ContractCall::new(token, "approve", arg.to_string()))
                .await?;
        }
        Ok(())
    }
}

/// RFC3339 deadline `minutes` from now, as the operation timestamp literal.
pub fn deadline_from_now(minutes: i64) -> String {
    let deadline = chrono::Utc::now() + chrono::Duration::minutes(minutes);
    deadline.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Extract the operation hash from octez-client's inclusion report.
fn parse_operation_hash(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        let line = line.trim();
        let rest = line.strip_prefix("Operation hash is '")?;
        rest.strip_suffix('\'').map(|hash| hash.to_string())
    })
}

/// Format mutez as the decimal tez literal octez-client expects.
pub fn format_mutez(mutez: u64) -> String {
    format!("{}.{:06}", mutez / SCALE, mutez % SCALE)
}

/// Parse a decimal token amount ("1.5") into 6-decimal fixed point.
pub fn parse_amount(input: &str) -> Result<u64> {
    let input = input.trim();
    let (whole, frac) = match input.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (input, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        anyhow::bail!("Empty amount");
    }
    if frac.len() > 6 {
        anyhow::bail!("At most 6 decimal places are supported: {}", input);
    }
    let parse_digits = |digits: &str, what: &str| -> Result<u64> {
        if digits.is_empty() {
            return Ok(0);
        }
        digits
            .parse::<u64>()
            .with_context(|| format!("Invalid {} part in amount: {}", what, input))
    };
    let whole = parse_digits(whole, "integer")?;
    let mut frac_scaled = parse_digits(frac, "fractional")?;
    for _ in frac.len()..6 {
        frac_scaled *= 10;
    }
    whole
        .checked_mul(SCALE)
        .and_then(|scaled| scaled.checked_add(frac_scaled))
        .with_context(|| format!("Amount out of range: {}", input))
}

/// Parse a signed decimal amount ("-0.5") into 6-decimal fixed point.
pub fn parse_signed_amount(input: &str) -> Result<i64> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };
    let magnitude = parse_amount(digits)?;
    let magnitude =
        i64::try_from(magnitude).with_context(|| format!("Amount out of range: {}", input))?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Validate a base58check tz/KT1 address.
pub fn validate_address(address: &str) -> Result<()> {
    let prefixed = ["tz1", "tz2", "tz3", "KT1"]
        .iter()
        .any(|prefix| address.starts_with(prefix));
    if !prefixed {
        anyhow::bail!("Invalid address prefix: {}", address);
    }
    let decoded = bs58::decode(address)
        .with_check(None)
        .into_vec()
        .with_context(|| format!("Invalid base58check address: {}", address))?;
    // 3-byte curve/contract prefix + 20-byte hash
    if decoded.len() != 23 {
        anyhow::bail!("Invalid address length: {}", address);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mutez() {
        assert_eq!(format_mutez(0), "0.000000");
        assert_eq!(format_mutez(1_500_000), "1.500000");
        assert_eq!(format_mutez(42), "0.000042");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1.5").unwrap(), 1_500_000);
        assert_eq!(parse_amount("0.000001").unwrap(), 1);
        assert_eq!(parse_amount("10").unwrap(), 10_000_000);
        assert_eq!(parse_amount(".25").unwrap(), 250_000);
        assert_eq!(parse_amount("3.").unwrap(), 3_000_000);
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount(".").is_err());
        assert!(parse_amount("1.2.3").is_err());
        assert!(parse_amount("1.1234567").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("-1").is_err());
    }

    #[test]
    fn test_parse_amount_roundtrips_format() {
        for mutez in [0u64, 1, 999_999, 1_000_000, 123_456_789] {
            assert_eq!(parse_amount(&format_mutez(mutez)).unwrap(), mutez);
        }
    }

    #[test]
    fn test_parse_signed_amount() {
        assert_eq!(parse_signed_amount("1.5").unwrap(), 1_500_000);
        assert_eq!(parse_signed_amount("-0.25").unwrap(), -250_000);
        assert!(parse_signed_amount("--1").is_err());
    }

    #[test]
    fn test_parse_operation_hash() {
        let stdout = "Node is bootstrapped.\nOperation hash is 'ooCmZKKDDwQnM4hdZMxqg9Pkno3ZvPDLh6VnJimAY7SyLT4K8zF'\nWaiting for the operation to be included...";
        assert_eq!(
            parse_operation_hash(stdout).unwrap(),
            "ooCmZKKDDwQnM4hdZMxqg9Pkno3ZvPDLh6VnJimAY7SyLT4K8zF"
        );
        assert_eq!(parse_operation_hash("no hash here"), None);
    }
}
