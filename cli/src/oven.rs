//! Oven (collateral vault) operations

use anyhow::{Context, Result};
use colored::Colorize;

use crate::cache::OvenCache;
use crate::client::{format_mutez, validate_address, ContractCall, OctezClient};
use crate::config::NetworkConfig;
use crate::indexer::IndexerClient;
use crate::micheline::Expr;

pub async fn create_oven(
    config: &NetworkConfig,
    id: Option<u64>,
    deposit: u64,
    delegate: Option<String>,
    depositors: Vec<String>,
) -> Result<()> {
    println!("{}", "=== Create Oven ===".bright_green().bold());

    let octez = OctezClient::new(config);
    let user = octez.source_address()?;
    let mut cache = OvenCache::open_default()?;

    let id = id.unwrap_or_else(|| cache.last_oven_id(&user, &config.ctez_address) + 1);

    if let Some(delegate) = &delegate {
        validate_address(delegate)?;
    }
    for depositor in &depositors {
        validate_address(depositor)?;
    }

    println!("{} {}", "Owner:".bright_cyan(), user);
    println!("{} {}", "Oven id:".bright_cyan(), id);
    println!(
        "{} {} tez",
        "Initial deposit:".bright_cyan(),
        format_mutez(deposit)
    );
    if let Some(delegate) = &delegate {
        println!("{} {}", "Delegate:".bright_cyan(), delegate);
    }

    // Anyone may deposit unless a whitelist is given.
    let depositors_arg = if depositors.is_empty() {
        Expr::left(Expr::Unit)
    } else {
        Expr::right(Expr::Seq(
            depositors.iter().map(|d| Expr::string(d.as_str())).collect(),
        ))
    };
    let arg = Expr::pair([
        Expr::Nat(id),
        Expr::option(delegate.map(Expr::string)),
        depositors_arg,
    ]);

    octez
        .submit(
            ContractCall::new(&config.ctez_address, "create_oven", arg.to_string())
                .with_amount(deposit),
        )
        .await?;

    cache.save_last_oven(&user, &config.ctez_address, id)?;
    println!("{}", "Oven created".bright_green());
    Ok(())
}

/// Deposit collateral. The tez goes to the originated oven contract itself,
/// not the protocol contract.
pub async fn deposit(config: &NetworkConfig, id: u64, amount: u64) -> Result<()> {
    println!("{}", "=== Deposit to Oven ===".bright_green().bold());
    if amount == 0 {
        anyhow::bail!("Deposit amount must be positive");
    }

    let octez = OctezClient::new(config);
    let user = octez.source_address()?;
    let indexer = IndexerClient::new(config);
    let oven = indexer
        .oven(&user, id)
        .await?
        .with_context(|| format!("No oven {} for {}", id, user))?;

    println!("{} {}", "Oven:".bright_cyan(), oven.address);
    println!("{} {} tez", "Deposit:".bright_cyan(), format_mutez(amount));

    octez
        .submit(ContractCall::new(&oven.address, "deposit", Expr::Unit.to_string()).with_amount(amount))
        .await?;
    Ok(())
}

pub async fn withdraw(
    config: &NetworkConfig,
    id: u64,
    amount: u64,
    to: Option<String>,
) -> Result<()> {
    println!("{}", "=== Withdraw from Oven ===".bright_green().bold());
    if amount == 0 {
        anyhow::bail!("Withdrawal amount must be positive");
    }

    let octez = OctezClient::new(config);
    let to = match to {
        Some(to) => {
            validate_address(&to)?;
            to
        }
        None => octez.source_address()?,
    };

    println!("{} {}", "Oven id:".bright_cyan(), id);
    println!("{} {} tez", "Amount:".bright_cyan(), format_mutez(amount));
    println!("{} {}", "To:".bright_cyan(), to);

    let arg = Expr::pair([Expr::Nat(id), Expr::Nat(amount), Expr::string(to)]);
    octez
        .submit(ContractCall::new(
            &config.ctez_address,
            "withdraw_from_oven",
            arg.to_string(),
        ))
        .await?;
    Ok(())
}

/// Positive quantity mints ctez against the oven, negative burns it back.
pub async fn mint_or_burn(config: &NetworkConfig, id: u64, quantity: i64) -> Result<()> {
    println!("{}", "=== Mint or Burn ===".bright_green().bold());
    if quantity == 0 {
        anyhow::bail!("Quantity must be non-zero");
    }

    let octez = OctezClient::new(config);
    println!("{} {}", "Oven id:".bright_cyan(), id);
    let verb = if quantity > 0 { "Mint" } else { "Burn" };
    println!(
        "{} {} ctez",
        format!("{}:", verb).bright_cyan(),
        format_mutez(quantity.unsigned_abs())
    );

    let arg = Expr::pair([Expr::Nat(id), Expr::Int(quantity)]);
    octez
        .submit(ContractCall::new(
            &config.ctez_address,
            "mint_or_burn",
            arg.to_string(),
        ))
        .await?;
    Ok(())
}

pub async fn liquidate(
    config: &NetworkConfig,
    owner: String,
    id: u64,
    quantity: u64,
    to: Option<String>,
) -> Result<()> {
    println!("{}", "=== Liquidate Oven ===".bright_green().bold());
    validate_address(&owner)?;
    if quantity == 0 {
        anyhow::bail!("Quantity must be positive");
    }

    let octez = OctezClient::new(config);
    let to = match to {
        Some(to) => {
            validate_address(&to)?;
            to
        }
        None => octez.source_address()?,
    };

    println!("{} {}", "Oven owner:".bright_cyan(), owner);
    println!("{} {}", "Oven id:".bright_cyan(), id);
    println!("{} {} ctez", "Repay:".bright_cyan(), format_mutez(quantity));
    println!("{} {}", "To:".bright_cyan(), to);

    let arg = Expr::pair([
        Expr::string(owner),
        Expr::Nat(id),
        Expr::Nat(quantity),
        Expr::string(to),
    ]);
    octez
        .submit(ContractCall::new(
            &config.ctez_address,
            "liquidate_oven",
            arg.to_string(),
        ))
        .await?;
    Ok(())
}

pub async fn show(config: &NetworkConfig, id: u64, owner: Option<String>) -> Result<()> {
    println!("{}", "=== Oven ===".bright_green().bold());

    let owner = match owner {
        Some(owner) => {
            validate_address(&owner)?;
            owner
        }
        None => OctezClient::new(config).source_address()?,
    };

    let indexer = IndexerClient::new(config);
    let oven = indexer
        .oven(&owner, id)
        .await?
        .with_context(|| format!("No oven {} for {}", id, owner))?;

    println!("{} {}", "Owner:".bright_cyan(), owner);
    println!("{} {}", "Oven id:".bright_cyan(), id);
    println!("{} {}", "Address:".bright_cyan(), oven.address);
    println!(
        "{} {} tez",
        "Collateral:".bright_cyan(),
        format_mutez(oven.tez_balance)
    );
    println!(
        "{} {} ctez",
        "Outstanding:".bright_cyan(),
        format_mutez(oven.ctez_outstanding)
    );
    Ok(())
}
