//! # svcdesk CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use svcdesk_cli::account::{run_account, AccountArgs};
use svcdesk_cli::auth::{
    run_forgot_password, run_login, run_logout, run_register, ForgotPasswordArgs, LoginArgs,
    RegisterArgs,
};
use svcdesk_cli::records::{run_history, run_list, run_show, HistoryArgs, ListArgs, ShowArgs};
use svcdesk_cli::statuses::{run_statuses, StatusesArgs};
use svcdesk_cli::CliContext;

/// Service-desk client.
///
/// Account panel, orders, repairs, scheduled services and their history for
/// clients of the service-desk backend.
#[derive(Parser, Debug)]
#[command(name = "svcdesk", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Backend base URL (overrides SVCDESK_BASE_URL).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Session file (overrides SVCDESK_SESSION_FILE).
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and store the session.
    Login(LoginArgs),

    /// Sign out and forget the stored session.
    Logout,

    /// Create a client account.
    Register(RegisterArgs),

    /// Send a password reset email.
    ForgotPassword(ForgotPasswordArgs),

    /// Profile and contract (account panel), or account deletion.
    Account(AccountArgs),

    /// Current orders, repairs or services.
    List(ListArgs),

    /// Completed orders, repairs or services for a year.
    History(HistoryArgs),

    /// One order or repair.
    Show(ShowArgs),

    /// Status code dictionary.
    Statuses(StatusesArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match cli.log_format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }

    tracing::debug!("svcdesk CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let result = match CliContext::new(cli.base_url.as_deref(), cli.session_file, cli.json) {
        Ok(ctx) => {
            tracing::debug!(
                base_url = ctx.client.base_url(),
                session = %ctx.store.path().display(),
                "configured"
            );
            dispatch(&cli.command, &ctx).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn dispatch(command: &Commands, ctx: &CliContext) -> anyhow::Result<u8> {
    match command {
        Commands::Login(args) => run_login(args, ctx).await,
        Commands::Logout => run_logout(ctx).await,
        Commands::Register(args) => run_register(args, ctx).await,
        Commands::ForgotPassword(args) => run_forgot_password(args, ctx).await,
        Commands::Account(args) => run_account(args, ctx).await,
        Commands::List(args) => run_list(args, ctx).await,
        Commands::History(args) => run_history(args, ctx).await,
        Commands::Show(args) => run_show(args, ctx).await,
        Commands::Statuses(args) => run_statuses(args, ctx).await,
    }
}
