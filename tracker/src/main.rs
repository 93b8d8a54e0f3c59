//! CLI entry point for the driftbook tracker.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use log::info;

use driftbook::{AssetKind, ItemId, NewAsset, PortfolioId, Symbol, UserId};
use driftbook_tracker::commands::{self, LiveTracker};
use driftbook_tracker::config::Config;
use driftbook_tracker::error::{Error, Result};
use driftbook_tracker::request::PortfolioSpec;
use driftbook_tracker::service::DEFAULT_SEARCH_LIMIT;

#[derive(Parser)]
#[command(name = "driftbook")]
#[command(about = "Track target-weight portfolios and how far they have drifted")]
#[command(version)]
struct Cli {
    /// Path to driftbook.toml (defaults apply if it does not exist)
    #[arg(long, default_value = "driftbook.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommand,
    },

    /// Manage assets
    Asset {
        #[command(subcommand)]
        command: AssetCommand,
    },

    /// Manage and analyze portfolios
    Portfolio {
        #[command(subcommand)]
        command: PortfolioCommand,
    },
}

#[derive(Subcommand)]
enum UserCommand {
    /// Register a user
    Add { email: String },

    /// Delete a user and all of their portfolios
    Remove {
        id: u64,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum AssetCommand {
    /// Register an asset (returns the existing one if the symbol is known)
    Add {
        symbol: String,

        /// Display name (defaults to the symbol)
        #[arg(long, default_value = "")]
        name: String,

        /// stock, etf, crypto, fund, bond or other
        #[arg(long, default_value = "stock")]
        kind: AssetKind,

        #[arg(long, default_value = "USD")]
        currency: String,

        #[arg(long)]
        exchange: Option<String>,
    },

    /// Show a registered asset
    Show { symbol: String },

    /// Find registered assets by symbol or name (case-insensitive)
    Search {
        query: String,

        /// Maximum results (1-50)
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },

    /// Fetch the latest price for a symbol
    Price { symbol: String },
}

#[derive(Subcommand)]
enum PortfolioCommand {
    /// Create a portfolio from a spec.json file, buying at current prices
    Create {
        spec: PathBuf,

        /// Owning user id
        #[arg(long)]
        user: u64,
    },

    /// List a user's portfolios
    List {
        #[arg(long)]
        user: u64,
    },

    /// Show a portfolio's items and quantities
    Show {
        id: u64,
        #[arg(long)]
        user: u64,
    },

    /// Compare current weights against targets
    Analyze {
        id: u64,
        #[arg(long)]
        user: u64,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record the quantity actually held for one item
    SetQuantity {
        id: u64,
        item: u64,
        quantity: f64,
        #[arg(long)]
        user: u64,
    },

    /// Delete a portfolio and its items
    Delete {
        id: u64,
        #[arg(long)]
        user: u64,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    let result = commands::open(&config).and_then(|mut tracker| run(&mut tracker, cli.command));

    if let Err(e) = result {
        match &e {
            Error::Aborted(msg) => eprintln!("{msg}"),
            _ => eprintln!("Error: {e}"),
        }
        process::exit(e.exit_code());
    }
}

fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load(path)
    } else {
        info!("No config at {}, using defaults", path.display());
        Ok(Config::default())
    }
}

fn run(tracker: &mut LiveTracker, command: Command) -> Result<()> {
    match command {
        Command::User { command } => match command {
            UserCommand::Add { email } => {
                let user = tracker.register_user(&email)?;
                commands::print_user(&user);
            }
            UserCommand::Remove { id, force } => {
                let user = tracker.user(UserId(id))?;
                confirm(
                    &format!("Delete {} <{}> and all their portfolios?", user.id, user.email),
                    force,
                )?;
                tracker.delete_user(user.id)?;
                println!("Deleted {}.", user.id);
            }
        },

        Command::Asset { command } => match command {
            AssetCommand::Add {
                symbol,
                name,
                kind,
                currency,
                exchange,
            } => {
                let mut asset = NewAsset::new(Symbol::parse(&symbol)?, &name)
                    .kind(kind)
                    .currency(&currency);
                if let Some(exchange) = exchange {
                    asset = asset.exchange(&exchange);
                }
                let registration = tracker.register_asset(asset)?;
                if !registration.is_created() {
                    println!("Already registered:");
                }
                commands::print_asset(registration.asset());
            }
            AssetCommand::Show { symbol } => {
                let asset = tracker.asset_by_symbol(&Symbol::parse(&symbol)?)?;
                commands::print_asset(&asset);
            }
            AssetCommand::Search { query, limit } => {
                let assets = tracker.search_assets(&query, limit)?;
                commands::print_asset_list(&assets);
            }
            AssetCommand::Price { symbol } => {
                let symbol = Symbol::parse(&symbol)?;
                let price = tracker.asset_price(&symbol)?;
                println!("{symbol} {price:.2}");
            }
        },

        Command::Portfolio { command } => match command {
            PortfolioCommand::Create { spec, user } => {
                let spec = PortfolioSpec::load(&spec)?;
                let portfolio = tracker.create_from_spec(UserId(user), &spec)?;
                commands::print_portfolio(&portfolio);
            }
            PortfolioCommand::List { user } => {
                let portfolios = tracker.list_portfolios(UserId(user))?;
                commands::print_portfolio_list(&portfolios);
            }
            PortfolioCommand::Show { id, user } => {
                let portfolio = tracker.portfolio(PortfolioId(id), UserId(user))?;
                commands::print_portfolio(&portfolio);
            }
            PortfolioCommand::Analyze { id, user, json } => {
                let report = tracker.analyze(PortfolioId(id), UserId(user))?;
                if json {
                    commands::print_report_json(&report)?;
                } else {
                    commands::print_report(&report);
                }
            }
            PortfolioCommand::SetQuantity {
                id,
                item,
                quantity,
                user,
            } => {
                let portfolio =
                    tracker.update_quantity(PortfolioId(id), ItemId(item), UserId(user), quantity)?;
                commands::print_portfolio(&portfolio);
            }
            PortfolioCommand::Delete { id, user, force } => {
                let portfolio = tracker.portfolio(PortfolioId(id), UserId(user))?;
                confirm(
                    &format!(
                        "Delete portfolio {} \"{}\" ({} items)?",
                        portfolio.id,
                        portfolio.name,
                        portfolio.items.len()
                    ),
                    force,
                )?;
                tracker.delete_portfolio(portfolio.id, portfolio.owner)?;
                println!("Deleted {}.", portfolio.id);
            }
        },
    }
    Ok(())
}

/// Ask before a destructive command unless `--force` was given.
fn confirm(prompt: &str, force: bool) -> Result<()> {
    if force {
        return Ok(());
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;

    if !confirmed {
        return Err(Error::Aborted("Aborted.".into()));
    }
    Ok(())
}
