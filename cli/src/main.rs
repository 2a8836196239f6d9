//! Kettle - command-line client for a ctez-style oven + half-dex protocol
//!
//! Reads chain state through an indexer, computes slippage-bounded quotes
//! locally, and hands signed operations to the octez-client wallet for
//! injection on Tezos networks (mainnet, ghostnet, sandbox).

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

mod cache;
mod client;
mod config;
mod errors;
mod indexer;
mod liquidity;
mod micheline;
mod oven;
mod status;
mod swap;

use client::{parse_amount, parse_signed_amount};
use config::{NetworkConfig, TradeSettings};
use quote_engine::DexSide;

#[derive(Parser)]
#[command(name = "kettle")]
#[command(about = "Ctez protocol CLI - ovens, half-dex liquidity, swaps", long_about = None)]
#[command(version)]
struct Cli {
    /// Network to connect to (mainnet, ghostnet, sandbox)
    #[arg(short, long, default_value = "mainnet")]
    network: String,

    /// Node RPC URL (overrides network default)
    #[arg(long)]
    node_url: Option<String>,

    /// Indexer base URL (overrides network default)
    #[arg(long)]
    indexer_url: Option<String>,

    /// Protocol contract address (overrides network default)
    #[arg(long)]
    contract: Option<String>,

    /// Wallet key alias known to octez-client
    #[arg(short, long)]
    key: Option<String>,

    /// Path to the config file (default ~/.config/kettle/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Slippage tolerance in percent (overrides config)
    #[arg(long)]
    slippage: Option<f64>,

    /// Operation deadline in minutes (overrides config)
    #[arg(long)]
    deadline: Option<i64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Which half-dex an operation targets, named by the asset it sells.
#[derive(Clone, Copy, ValueEnum)]
enum Side {
    Ctez,
    Tez,
}

impl From<Side> for DexSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Ctez => DexSide::SellCtez,
            Side::Tez => DexSide::SellTez,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Oven (collateral vault) operations
    Oven {
        #[command(subcommand)]
        command: OvenCommands,
    },

    /// Liquidity provider operations
    Liquidity {
        #[command(subcommand)]
        command: LiquidityCommands,
    },

    /// Half-dex swaps
    Swap {
        #[command(subcommand)]
        command: SwapCommands,
    },

    /// Quote computations without submitting anything
    Quote {
        #[command(subcommand)]
        command: QuoteCommands,
    },

    /// Show protocol status and pool state
    Status,
}

#[derive(Subcommand)]
enum OvenCommands {
    /// Create a new oven
    Create {
        /// Oven id (defaults to the last created id + 1)
        #[arg(long)]
        id: Option<u64>,

        /// Initial tez deposit
        #[arg(long, default_value = "0")]
        deposit: String,

        /// Baker to delegate the oven's tez to
        #[arg(long)]
        delegate: Option<String>,

        /// Whitelisted depositor (repeatable; anyone may deposit if omitted)
        #[arg(long = "depositor")]
        depositors: Vec<String>,
    },

    /// Deposit tez collateral into an oven
    Deposit {
        /// Oven id
        #[arg(long)]
        id: u64,

        /// Amount of tez
        amount: String,
    },

    /// Withdraw tez collateral from an oven
    Withdraw {
        /// Oven id
        #[arg(long)]
        id: u64,

        /// Amount of tez
        amount: String,

        /// Destination address (defaults to the wallet key)
        #[arg(long)]
        to: Option<String>,
    },

    /// Mint (positive) or burn (negative) ctez against an oven
    MintOrBurn {
        /// Oven id
        #[arg(long)]
        id: u64,

        /// Signed ctez quantity, e.g. 10 or -2.5
        quantity: String,
    },

    /// Repay ctez for an undercollateralized oven and seize collateral
    Liquidate {
        /// Oven owner address
        #[arg(long)]
        owner: String,

        /// Oven id
        #[arg(long)]
        id: u64,

        /// ctez quantity to repay
        quantity: String,

        /// Destination for the seized tez (defaults to the wallet key)
        #[arg(long)]
        to: Option<String>,
    },

    /// Show an oven's collateral and outstanding ctez
    Show {
        /// Oven id
        #[arg(long)]
        id: u64,

        /// Oven owner (defaults to the wallet key)
        #[arg(long)]
        owner: Option<String>,
    },
}

#[derive(Subcommand)]
enum LiquidityCommands {
    /// Deposit into a half-dex
    Add {
        /// Which half-dex (by the asset it sells)
        #[arg(long, value_enum)]
        side: Side,

        /// Amount of the self asset to deposit
        amount: String,

        /// Liquidity owner (defaults to the wallet key)
        #[arg(long)]
        owner: Option<String>,
    },

    /// Burn shares and withdraw reserves, proceeds, and subsidy
    Remove {
        /// Which half-dex (by the asset it sells)
        #[arg(long, value_enum)]
        side: Side,

        /// Liquidity shares to burn (6-decimal fixed point units)
        shares: u64,

        /// Destination address (defaults to the wallet key)
        #[arg(long)]
        to: Option<String>,
    },

    /// Withdraw already-credited proceeds and subsidy
    Collect {
        /// Which half-dex (by the asset it sells)
        #[arg(long, value_enum)]
        side: Side,

        /// Destination address (defaults to the wallet key)
        #[arg(long)]
        to: Option<String>,
    },

    /// Show a liquidity position
    Show {
        /// Which half-dex (by the asset it sells)
        #[arg(long, value_enum)]
        side: Side,

        /// Owner address (defaults to the wallet key)
        owner: Option<String>,
    },
}

#[derive(Subcommand)]
enum SwapCommands {
    /// Sell tez for ctez
    TezToCtez {
        /// Amount of tez to sell
        amount: String,

        /// Minimum ctez accepted (defaults to 0)
        #[arg(long)]
        min_bought: Option<String>,

        /// Destination address (defaults to the wallet key)
        #[arg(long)]
        to: Option<String>,
    },

    /// Sell ctez for tez
    CtezToTez {
        /// Amount of ctez to sell
        amount: String,

        /// Minimum tez accepted (defaults to 0)
        #[arg(long)]
        min_bought: Option<String>,

        /// Destination address (defaults to the wallet key)
        #[arg(long)]
        to: Option<String>,
    },
}

#[derive(Subcommand)]
enum QuoteCommands {
    /// Quote a liquidity removal at the current pool state
    Remove {
        /// Which half-dex (by the asset it sells)
        #[arg(long, value_enum)]
        side: Side,

        /// Liquidity shares to burn (6-decimal fixed point units)
        shares: u64,

        /// Liquidity owner (defaults to the wallet key)
        #[arg(long)]
        owner: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = NetworkConfig::new(
        &cli.network,
        cli.node_url.clone(),
        cli.indexer_url.clone(),
        cli.contract.clone(),
        cli.key.clone(),
    )?;
    let settings =
        TradeSettings::load(cli.config.clone())?.with_overrides(cli.slippage, cli.deadline)?;

    if cli.verbose {
        println!("{} {}", "Network:".bright_cyan(), config.network);
        println!("{} {}", "Node:".bright_cyan(), config.node_url);
        println!("{} {}", "Indexer:".bright_cyan(), config.indexer_url);
        println!("{} {}", "Contract:".bright_cyan(), config.ctez_address);
        println!(
            "{} {}% / {} min",
            "Tolerance:".bright_cyan(),
            settings.slippage,
            settings.deadline
        );
    }

    match cli.command {
        Commands::Oven { command } => match command {
            OvenCommands::Create {
                id,
                deposit,
                delegate,
                depositors,
            } => {
                oven::create_oven(&config, id, parse_amount(&deposit)?, delegate, depositors)
                    .await?;
            }
            OvenCommands::Deposit { id, amount } => {
                oven::deposit(&config, id, parse_amount(&amount)?).await?;
            }
            OvenCommands::Withdraw { id, amount, to } => {
                oven::withdraw(&config, id, parse_amount(&amount)?, to).await?;
            }
            OvenCommands::MintOrBurn { id, quantity } => {
                oven::mint_or_burn(&config, id, parse_signed_amount(&quantity)?).await?;
            }
            OvenCommands::Liquidate {
                owner,
                id,
                quantity,
                to,
            } => {
                oven::liquidate(&config, owner, id, parse_amount(&quantity)?, to).await?;
            }
            OvenCommands::Show { id, owner } => {
                oven::show(&config, id, owner).await?;
            }
        },
        Commands::Liquidity { command } => match command {
            LiquidityCommands::Add {
                side,
                amount,
                owner,
            } => {
                liquidity::add(&config, &settings, side.into(), parse_amount(&amount)?, owner)
                    .await?;
            }
            LiquidityCommands::Remove { side, shares, to } => {
                liquidity::remove(&config, &settings, side.into(), shares, to).await?;
            }
            LiquidityCommands::Collect { side, to } => {
                liquidity::collect(&config, side.into(), to).await?;
            }
            LiquidityCommands::Show { side, owner } => {
                liquidity::show(&config, side.into(), owner).await?;
            }
        },
        Commands::Swap { command } => match command {
            SwapCommands::TezToCtez {
                amount,
                min_bought,
                to,
            } => {
                let min_bought = min_bought.map(|raw| parse_amount(&raw)).transpose()?;
                swap::tez_to_ctez(&config, &settings, parse_amount(&amount)?, min_bought, to)
                    .await?;
            }
            SwapCommands::CtezToTez {
                amount,
                min_bought,
                to,
            } => {
                let min_bought = min_bought.map(|raw| parse_amount(&raw)).transpose()?;
                swap::ctez_to_tez(&config, &settings, parse_amount(&amount)?, min_bought, to)
                    .await?;
            }
        },
        Commands::Quote { command } => match command {
            QuoteCommands::Remove {
                side,
                shares,
                owner,
            } => {
                liquidity::show_quote(&config, &settings, side.into(), shares, owner).await?;
            }
        },
        Commands::Status => {
            status::show(&config).await?;
        }
    }

    Ok(())
}
