//! Liquidity provider operations
//!
//! The remove path drives the quote engine against the indexer snapshot and
//! submits the slippage-floored minimums; the add path bounds the shares
//! minted the same way. The contract is the authority on every bound; this
//! side only prepares them.

use anyhow::{Context, Result};
use colored::Colorize;

use dex_math::{deposit_quote, redeemed_amount, RedemptionQuote, RedemptionRequest};
use quote_engine::{DexSide, QuoteEngine};

use crate::client::{deadline_from_now, format_mutez, validate_address, ContractCall, OctezClient};
use crate::config::{NetworkConfig, TradeSettings};
use crate::indexer::IndexerClient;
use crate::micheline::Expr;

fn add_entrypoint(side: DexSide) -> &'static str {
    match side {
        DexSide::SellCtez => "add_ctez_liquidity",
        DexSide::SellTez => "add_tez_liquidity",
    }
}

fn remove_entrypoint(side: DexSide) -> &'static str {
    match side {
        DexSide::SellCtez => "remove_ctez_liquidity",
        DexSide::SellTez => "remove_tez_liquidity",
    }
}

fn collect_entrypoint(side: DexSide) -> &'static str {
    match side {
        DexSide::SellCtez => "collect_from_ctez_liquidity",
        DexSide::SellTez => "collect_from_tez_liquidity",
    }
}

pub async fn add(
    config: &NetworkConfig,
    settings: &TradeSettings,
    side: DexSide,
    amount: u64,
    owner: Option<String>,
) -> Result<()> {
    println!("{}", "=== Add Liquidity ===".bright_green().bold());
    if amount == 0 {
        anyhow::bail!("Deposit amount must be positive");
    }

    let octez = OctezClient::new(config);
    let owner = match owner {
        Some(owner) => {
            validate_address(&owner)?;
            owner
        }
        None => octez.source_address()?,
    };

    let indexer = IndexerClient::new(config);
    let storage = indexer.storage().await?;
    let half_dex = match side {
        DexSide::SellCtez => &storage.sell_ctez,
        DexSide::SellTez => &storage.sell_tez,
    };
    let quote = deposit_quote(amount, half_dex.reserves(), settings.slippage_bps())?;

    println!("{} {}", "Pool:".bright_cyan(), side.storage_field());
    println!("{} {}", "Owner:".bright_cyan(), owner);
    println!(
        "{} {} {}",
        "Deposit:".bright_cyan(),
        format_mutez(amount),
        side.self_asset()
    );
    println!(
        "{} {}",
        "Expected shares:".bright_cyan(),
        quote.shares_minted
    );
    println!(
        "{} {} ({}% tolerance)",
        "Min shares:".bright_cyan(),
        quote.min_shares,
        settings.slippage
    );

    let deadline = deadline_from_now(settings.deadline);
    match side {
        DexSide::SellCtez => {
            // Depositing ctez moves FA1.2 tokens; the pool must be approved.
            octez
                .approve_fa12(&storage.context.ctez_fa12_address, &config.ctez_address, amount)
                .await?;
            let arg = Expr::pair([
                Expr::string(owner),
                Expr::Nat(amount),
                Expr::Nat(quote.min_shares),
                Expr::string(deadline),
            ]);
            octez
                .submit(ContractCall::new(
                    &config.ctez_address,
                    add_entrypoint(side),
                    arg.to_string(),
                ))
                .await?;
        }
        DexSide::SellTez => {
            let arg = Expr::pair([
                Expr::string(owner),
                Expr::Nat(quote.min_shares),
                Expr::string(deadline),
            ]);
            octez
                .submit(
                    ContractCall::new(&config.ctez_address, add_entrypoint(side), arg.to_string())
                        .with_amount(amount),
                )
                .await?;
        }
    }
    Ok(())
}

/// Compute the redemption quote for a burn, without submitting anything.
pub async fn quote_remove(
    config: &NetworkConfig,
    settings: &TradeSettings,
    side: DexSide,
    shares: u64,
    owner: Option<String>,
) -> Result<RedemptionQuote> {
    let owner = match owner {
        Some(owner) => {
            validate_address(&owner)?;
            owner
        }
        None => OctezClient::new(config).source_address()?,
    };

    let indexer = IndexerClient::new(config);
    let engine = QuoteEngine::new(&indexer, side, owner);
    let request = RedemptionRequest::new(shares, settings.slippage_bps())?;
    let state = engine.request(request).await?;
    state
        .ready()
        .context("Reserve snapshot not yet available; quote pending")
}

fn print_quote(side: DexSide, quote: &RedemptionQuote, settings: &TradeSettings) {
    println!(
        "{} ({}% tolerance)",
        "Minimum amounts accepted:".bright_cyan(),
        settings.slippage
    );
    println!(
        "  {} {} {}",
        "self:".bright_cyan(),
        format_mutez(quote.min_self_received),
        side.self_asset()
    );
    println!(
        "  {} {} {}",
        "proceeds:".bright_cyan(),
        format_mutez(quote.min_proceeds_received),
        side.proceeds_asset()
    );
    println!(
        "  {} {} ctez",
        "subsidy:".bright_cyan(),
        format_mutez(quote.min_subsidy_received)
    );
}

pub async fn show_quote(
    config: &NetworkConfig,
    settings: &TradeSettings,
    side: DexSide,
    shares: u64,
    owner: Option<String>,
) -> Result<()> {
    println!("{}", "=== Redemption Quote ===".bright_green().bold());
    println!("{} {}", "Pool:".bright_cyan(), side.storage_field());
    println!("{} {}", "Shares to burn:".bright_cyan(), shares);
    let quote = quote_remove(config, settings, side, shares, owner).await?;
    print_quote(side, &quote, settings);
    Ok(())
}

pub async fn remove(
    config: &NetworkConfig,
    settings: &TradeSettings,
    side: DexSide,
    shares: u64,
    to: Option<String>,
) -> Result<()> {
    println!("{}", "=== Remove Liquidity ===".bright_green().bold());
    if shares == 0 {
        anyhow::bail!("Shares to burn must be positive");
    }

    let octez = OctezClient::new(config);
    let user = octez.source_address()?;
    let to = match to {
        Some(to) => {
            validate_address(&to)?;
            to
        }
        None => user.clone(),
    };

    let indexer = IndexerClient::new(config);
    let account = indexer.liquidity_owner(side, &user).await?;
    if shares > account.liquidity_shares {
        anyhow::bail!(
            "Cannot burn {} shares; account owns {}",
            shares,
            account.liquidity_shares
        );
    }

    println!("{} {}", "Pool:".bright_cyan(), side.storage_field());
    println!("{} {}", "Shares to burn:".bright_cyan(), shares);
    println!("{} {}", "To:".bright_cyan(), to);

    let engine = QuoteEngine::new(&indexer, side, user.clone());
    let request = RedemptionRequest::new(shares, settings.slippage_bps())?;
    let quote = engine
        .request(request)
        .await?
        .ready()
        .context("Reserve snapshot not yet available; quote pending")?;
    print_quote(side, &quote, settings);

    let arg = Expr::pair([
        Expr::string(to),
        Expr::Nat(shares),
        Expr::Nat(quote.min_self_received),
        Expr::Nat(quote.min_proceeds_received),
        Expr::Nat(quote.min_subsidy_received),
        Expr::string(deadline_from_now(settings.deadline)),
    ]);
    octez
        .submit(ContractCall::new(
            &config.ctez_address,
            remove_entrypoint(side),
            arg.to_string(),
        ))
        .await?;
    Ok(())
}

/// Withdraw already-credited proceeds and subsidy without burning shares.
pub async fn collect(config: &NetworkConfig, side: DexSide, to: Option<String>) -> Result<()> {
    println!("{}", "=== Collect Earnings ===".bright_green().bold());

    let octez = OctezClient::new(config);
    let to = match to {
        Some(to) => {
            validate_address(&to)?;
            to
        }
        None => octez.source_address()?,
    };

    println!("{} {}", "Pool:".bright_cyan(), side.storage_field());
    println!("{} {}", "To:".bright_cyan(), to);

    octez
        .submit(ContractCall::new(
            &config.ctez_address,
            collect_entrypoint(side),
            Expr::string(to).to_string(),
        ))
        .await?;
    Ok(())
}

pub async fn show(config: &NetworkConfig, side: DexSide, owner: Option<String>) -> Result<()> {
    println!("{}", "=== Liquidity Position ===".bright_green().bold());

    let owner = match owner {
        Some(owner) => {
            validate_address(&owner)?;
            owner
        }
        None => OctezClient::new(config).source_address()?,
    };

    let indexer = IndexerClient::new(config);
    let half_dex = indexer.half_dex(side).await?;
    let account = indexer.liquidity_owner(side, &owner).await?;
    let reserves = half_dex.reserves();

    println!("{} {}", "Pool:".bright_cyan(), side.storage_field());
    println!("{} {}", "Owner:".bright_cyan(), owner);
    println!("{} {}", "Shares:".bright_cyan(), account.liquidity_shares);
    println!(
        "{} {} / {}",
        "Pool share:".bright_cyan(),
        account.liquidity_shares,
        reserves.total_liquidity_shares
    );

    // What a full removal would yield right now, before any tolerance.
    let shares = account.liquidity_shares;
    let total = reserves.total_liquidity_shares;
    let self_value = redeemed_amount(shares, reserves.self_reserves, total, 0)?;
    let proceeds_value = redeemed_amount(
        shares,
        reserves.proceeds_reserves,
        total,
        account.proceeds_owed,
    )?;
    let subsidy_value =
        redeemed_amount(shares, reserves.subsidy_reserves, total, account.subsidy_owed)?;

    println!(
        "{} {} {}",
        "Redeemable self:".bright_cyan(),
        format_mutez(self_value),
        side.self_asset()
    );
    println!(
        "{} {} {} (+ {} collectable)",
        "Redeemable proceeds:".bright_cyan(),
        format_mutez(proceeds_value),
        side.proceeds_asset(),
        format_mutez(account.proceeds_owed)
    );
    println!(
        "{} {} ctez (+ {} collectable)",
        "Redeemable subsidy:".bright_cyan(),
        format_mutez(subsidy_value),
        format_mutez(account.subsidy_owed)
    );
    Ok(())
}
