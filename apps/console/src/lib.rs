//! # Showroom Console Library
//!
//! Command-line front end over `showroom-client`.
//!
//! ## Module Organization
//! ```text
//! showroom_console/
//! ├── lib.rs            ◄─── You are here (CLI definition, startup, dispatch)
//! ├── commands/
//! │   ├── mod.rs        ◄─── Session guard, shared helpers
//! │   ├── auth.rs       ◄─── login, logout, whoami
//! │   ├── dashboard.rs  ◄─── dashboard metrics
//! │   ├── stock.rs      ◄─── stock list/adjust/delete/export/import
//! │   ├── sales.rs      ◄─── sales list/create/mark-paid/delete
//! │   ├── customers.rs  ◄─── customers list/create/delete
//! │   ├── imports.rs    ◄─── import jobs, workbook upload
//! │   └── records.rs    ◄─── branches, transfers, payments, anomalies
//! └── error.rs          ◄─── CommandError (code + message)
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Console Startup                                   │
//! │                                                                         │
//! │  1. Initialize Logging                                                  │
//! │     • tracing-subscriber with env filter (RUST_LOG), stderr             │
//! │                                                                         │
//! │  2. Load ClientConfig                                                   │
//! │     • --config path or platform config dir, then SHOWROOM_* env         │
//! │     • --base-url overrides the file                                     │
//! │                                                                         │
//! │  3. AppContext::init                                                    │
//! │     • session rehydrated from the session file                          │
//! │                                                                         │
//! │  4. Dispatch one command, print its lines                               │
//! │                                                                         │
//! │  5. AppContext::shutdown (flush session)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;

use clap::{Parser, Subcommand};
use showroom_client::{AppContext, ClientConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use commands::{customers, imports, records, sales, stock};
use error::CommandResult;

// =============================================================================
// Command Line
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "showroom", version, about = "Dealership admin console")]
pub struct Cli {
    /// Config file (defaults to showroom.toml in the platform config dir)
    #[arg(long, global = true, env = "SHOWROOM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend base URL, e.g. http://localhost:8000/api/v1/
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "SHOWROOM_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user and their navigation
    Whoami,

    /// Dashboard metrics computed from stock, sales and branches
    Dashboard {
        /// Branch to focus the view on
        #[arg(long)]
        branch: Option<i64>,
    },

    /// Vehicle stock
    Stock {
        #[command(subcommand)]
        cmd: stock::StockCommand,
    },

    /// Sales records
    Sales {
        #[command(subcommand)]
        cmd: sales::SalesCommand,
    },

    /// Customers
    Customers {
        #[command(subcommand)]
        cmd: customers::CustomerCommand,
    },

    /// Open stock transfers
    Transfers {
        #[command(subcommand)]
        cmd: Option<records::TransferCommand>,
    },

    /// Pending payments, or one sale's payments
    Payments {
        #[arg(long)]
        sale: Option<i64>,
    },

    /// Open anomalies
    Anomalies,

    /// Workbook import jobs
    Imports {
        #[command(subcommand)]
        cmd: imports::ImportCommand,
    },

    /// Branches
    Branches,
}

// =============================================================================
// Entry Point
// =============================================================================

/// Runs one console invocation and returns the process exit status.
pub async fn run() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match execute(cli).await {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> CommandResult<Vec<String>> {
    let mut config = ClientConfig::load(cli.config)?;
    if let Some(base_url) = cli.base_url {
        debug!(base_url = %base_url, "Base URL overridden on the command line");
        config.api.base_url = base_url;
    }

    let ctx = AppContext::init(config)?;
    info!(command = command_name(&cli.command), "Running command");

    let result = dispatch(&ctx, cli.command).await;
    ctx.shutdown().await;
    result
}

async fn dispatch(ctx: &AppContext, command: Command) -> CommandResult<Vec<String>> {
    match command {
        Command::Login { username, password } => commands::auth::login(ctx, &username, &password).await,
        Command::Logout => commands::auth::logout(ctx).await,
        Command::Whoami => commands::auth::whoami(ctx).await,
        Command::Dashboard { branch } => commands::dashboard::show(ctx, branch).await,
        Command::Stock { cmd } => stock::run(ctx, cmd).await,
        Command::Sales { cmd } => sales::run(ctx, cmd).await,
        Command::Customers { cmd } => customers::run(ctx, cmd).await,
        Command::Transfers { cmd } => records::transfers(ctx, cmd).await,
        Command::Payments { sale } => records::payments(ctx, sale).await,
        Command::Anomalies => records::anomalies(ctx).await,
        Command::Imports { cmd } => imports::run(ctx, cmd).await,
        Command::Branches => records::branches(ctx).await,
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Login { .. } => "login",
        Command::Logout => "logout",
        Command::Whoami => "whoami",
        Command::Dashboard { .. } => "dashboard",
        Command::Stock { .. } => "stock",
        Command::Sales { .. } => "sales",
        Command::Customers { .. } => "customers",
        Command::Transfers { .. } => "transfers",
        Command::Payments { .. } => "payments",
        Command::Anomalies => "anomalies",
        Command::Imports { .. } => "imports",
        Command::Branches => "branches",
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=showroom_client=trace` - Trace the data layer only
/// - Default: INFO, DEBUG for the showroom crates
///
/// Logs go to stderr so command output stays clean on stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,showroom=debug,showroom_client=debug,showroom_console=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_nested_subcommands() {
        let cli = Cli::try_parse_from(["showroom", "stock", "adjust", "5", "--by", "-2"]).unwrap();
        match cli.command {
            Command::Stock {
                cmd: stock::StockCommand::Adjust { id, by },
            } => {
                assert_eq!(id, 5);
                assert_eq!(by, -2);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_transfers_defaults_to_list() {
        let cli = Cli::try_parse_from(["showroom", "transfers"]).unwrap();
        assert!(matches!(cli.command, Command::Transfers { cmd: None }));
        assert_eq!(command_name(&cli.command), "transfers");
    }

    #[test]
    fn test_global_base_url_after_subcommand() {
        let cli = Cli::try_parse_from(["showroom", "branches", "--base-url", "http://x/api/v1/"]).unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://x/api/v1/"));
    }
}
