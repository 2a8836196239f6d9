//! Half-dex swaps
//!
//! The minimum-bought bound defaults to zero (accept any execution price)
//! unless the caller passes one explicitly; the deadline still bounds how
//! long the operation may sit unexecuted.

use anyhow::Result;
use colored::Colorize;

use crate::client::{deadline_from_now, format_mutez, validate_address, ContractCall, OctezClient};
use crate::config::{NetworkConfig, TradeSettings};
use crate::indexer::IndexerClient;
use crate::micheline::Expr;

pub async fn tez_to_ctez(
    config: &NetworkConfig,
    settings: &TradeSettings,
    amount: u64,
    min_bought: Option<u64>,
    to: Option<String>,
) -> Result<()> {
    println!("{}", "=== Swap tez -> ctez ===".bright_green().bold());
    if amount == 0 {
        anyhow::bail!("Swap amount must be positive");
    }

    let octez = OctezClient::new(config);
    let to = match to {
        Some(to) => {
            validate_address(&to)?;
            to
        }
        None => octez.source_address()?,
    };
    let min_bought = min_bought.unwrap_or(0);

    println!("{} {} tez", "Sell:".bright_cyan(), format_mutez(amount));
    println!(
        "{} {} ctez",
        "Min bought:".bright_cyan(),
        format_mutez(min_bought)
    );
    println!("{} {}", "To:".bright_cyan(), to);

    let arg = Expr::pair([
        Expr::string(to),
        Expr::Nat(min_bought),
        Expr::string(deadline_from_now(settings.deadline)),
    ]);
    octez
        .submit(
            ContractCall::new(&config.ctez_address, "tez_to_ctez", arg.to_string())
                .with_amount(amount),
        )
        .await?;
    Ok(())
}

pub async fn ctez_to_tez(
    config: &NetworkConfig,
    settings: &TradeSettings,
    amount: u64,
    min_bought: Option<u64>,
    to: Option<String>,
) -> Result<()> {
    println!("{}", "=== Swap ctez -> tez ===".bright_green().bold());
    if amount == 0 {
        anyhow::bail!("Swap amount must be positive");
    }

    let octez = OctezClient::new(config);
    let to = match to {
        Some(to) => {
            validate_address(&to)?;
            to
        }
        None => octez.source_address()?,
    };
    let min_bought = min_bought.unwrap_or(0);

    println!("{} {} ctez", "Sell:".bright_cyan(), format_mutez(amount));
    println!(
        "{} {} tez",
        "Min bought:".bright_cyan(),
        format_mutez(min_bought)
    );
    println!("{} {}", "To:".bright_cyan(), to);

    // Selling ctez moves FA1.2 tokens; the pool must be approved first.
    let indexer = IndexerClient::new(config);
    let storage = indexer.storage().await?;
    octez
        .approve_fa12(&storage.context.ctez_fa12_address, &config.ctez_address, amount)
        .await?;

    let arg = Expr::pair([
        Expr::string(to),
        Expr::Nat(amount),
        Expr::Nat(min_bought),
        Expr::string(deadline_from_now(settings.deadline)),
    ]);
    octez
        .submit(ContractCall::new(
            &config.ctez_address,
            "ctez_to_tez",
            arg.to_string(),
        ))
        .await?;
    Ok(())
}
