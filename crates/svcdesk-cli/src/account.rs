//! # Account panel subcommands
//!
//! ```bash
//! svcdesk account              # profile + contract overview
//! svcdesk account profile --raw
//! svcdesk account contract --raw
//! svcdesk account delete --yes
//! ```

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use svcdesk_client::account::{AccountOverview, ContractView, ProfileView};

use crate::{session, CliContext};

/// `svcdesk account` arguments.
#[derive(Args, Debug)]
pub struct AccountArgs {
    #[command(subcommand)]
    pub command: Option<AccountCommand>,
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// Profile and contract overview (default).
    Show,
    /// The profile record.
    Profile {
        /// Print the record as returned by the backend.
        #[arg(long)]
        raw: bool,
    },
    /// The contract record.
    Contract {
        /// Print the record as returned by the backend.
        #[arg(long)]
        raw: bool,
    },
    /// Permanently delete the account and sign out.
    Delete {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}

/// Execute the account subcommand.
pub async fn run_account(args: &AccountArgs, ctx: &CliContext) -> Result<u8> {
    match args.command.as_ref().unwrap_or(&AccountCommand::Show) {
        AccountCommand::Show => run_show(ctx).await,
        AccountCommand::Profile { raw } => run_profile(ctx, *raw).await,
        AccountCommand::Contract { raw } => run_contract(ctx, *raw).await,
        AccountCommand::Delete { yes } => run_delete(ctx, *yes).await,
    }
}

async fn run_show(ctx: &CliContext) -> Result<u8> {
    let overview = ctx
        .signed_in()?
        .account()
        .overview()
        .await
        .context("failed to load account")?;
    if ctx.json {
        ctx.print_json(&overview)?;
    } else {
        print!("{}", render_overview(&overview));
    }
    Ok(0)
}

async fn run_profile(ctx: &CliContext, raw: bool) -> Result<u8> {
    let profile = ctx
        .signed_in()?
        .account()
        .profile()
        .await
        .context("failed to load profile")?;
    if raw {
        ctx.print_json(&profile)?;
    } else if ctx.json {
        ctx.print_json(&ProfileView::from_record(&profile))?;
    } else {
        print!("{}", render_profile(&ProfileView::from_record(&profile)));
    }
    Ok(0)
}

async fn run_contract(ctx: &CliContext, raw: bool) -> Result<u8> {
    let client = ctx.signed_in()?;
    let contract = client
        .account()
        .contract()
        .await
        .context("failed to load contract")?;
    if raw {
        ctx.print_json(&contract)?;
        return Ok(0);
    }
    let statuses = client
        .status_map(Some(svcdesk_client::ResourceType::Services))
        .await;
    let view = ContractView::from_record(&contract, &statuses);
    if ctx.json {
        ctx.print_json(&view)?;
    } else {
        print!("{}", render_contract(&view));
    }
    Ok(0)
}

async fn run_delete(ctx: &CliContext, yes: bool) -> Result<u8> {
    if !yes {
        eprintln!("Account deletion is permanent. Re-run with --yes to confirm.");
        return Ok(2);
    }
    ctx.signed_in()?
        .account()
        .delete_account()
        .await
        .context("account deletion failed")?;
    session::clear(&ctx.store)?;
    println!("Account deleted");
    Ok(0)
}

fn row(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("  {label:<22} {value}\n"));
}

pub fn render_profile(profile: &ProfileView) -> String {
    let mut out = String::from("Profile\n");
    row(&mut out, "ID", &profile.id);
    row(&mut out, "Name", &profile.name);
    row(&mut out, "Email", &profile.email);
    if let Some(phone) = &profile.phone {
        row(&mut out, "Phone", phone);
    }
    if let Some(code) = &profile.identification_code {
        row(&mut out, "Identification code", code);
    }
    row(&mut out, "Registered", &profile.created);
    out
}

pub fn render_contract(contract: &ContractView) -> String {
    let mut out = String::from("Contract\n");
    for (label, value) in [
        ("Client", &contract.client_name),
        ("Identification code", &contract.identification_code),
        ("Client code", &contract.client_code),
        ("Juridical status", &contract.juridical_status),
        ("Service", &contract.service_name),
        ("Service type", &contract.service_type),
        ("Contract type", &contract.contract_type),
        ("Number", &contract.number),
        ("Start", &contract.start),
        ("End", &contract.end),
        ("Status", &contract.status),
        ("Contact", &contract.contact_name),
        ("Contact number", &contract.contact_number),
        ("Guarantee start", &contract.guarantee_start),
        ("Guarantee end", &contract.guarantee_end),
    ] {
        row(&mut out, label, value);
    }
    out
}

pub fn render_overview(overview: &AccountOverview) -> String {
    let mut out = render_profile(&overview.profile);
    out.push('\n');
    match &overview.contract {
        Some(contract) => out.push_str(&render_contract(contract)),
        None => out.push_str("Contract\n  (none)\n"),
    }
    out
}
