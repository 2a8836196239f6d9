//! Protocol status overview

use anyhow::Result;
use colored::Colorize;

use crate::client::format_mutez;
use crate::config::NetworkConfig;
use crate::indexer::{HalfDexStorage, IndexerClient};

/// Target price scale: 2^48 fixed point.
const TARGET_SCALE: f64 = (1u64 << 48) as f64;

fn print_half_dex(name: &str, half_dex: &HalfDexStorage, self_asset: &str, proceeds_asset: &str) {
    println!("\n{}", name.bright_yellow());
    println!(
        "  {} {} {}",
        "Self reserves:".bright_cyan(),
        format_mutez(half_dex.self_reserves),
        self_asset
    );
    println!(
        "  {} {} {}",
        "Proceeds reserves:".bright_cyan(),
        format_mutez(half_dex.proceeds_reserves),
        proceeds_asset
    );
    println!(
        "  {} {} ctez",
        "Subsidy reserves:".bright_cyan(),
        format_mutez(half_dex.subsidy_reserves)
    );
    println!(
        "  {} {}",
        "Liquidity shares:".bright_cyan(),
        half_dex.total_liquidity_shares
    );
}

pub async fn show(config: &NetworkConfig) -> Result<()> {
    println!("{}", "=== Protocol Status ===".bright_green().bold());
    println!("{} {}", "Network:".bright_cyan(), config.network);
    println!("{} {}", "Contract:".bright_cyan(), config.ctez_address);

    let indexer = IndexerClient::new(config);
    let storage = indexer.storage().await?;

    println!(
        "{} {:.6} tez/ctez",
        "Target:".bright_cyan(),
        storage.context.target as f64 / TARGET_SCALE
    );
    println!("{} {}", "Drift:".bright_cyan(), storage.context.drift);
    println!(
        "{} {}",
        "ctez token:".bright_cyan(),
        storage.context.ctez_fa12_address
    );

    print_half_dex("sell_ctez", &storage.sell_ctez, "ctez", "tez");
    print_half_dex("sell_tez", &storage.sell_tez, "tez", "ctez");
    Ok(())
}
