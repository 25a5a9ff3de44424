//! # Record subcommands: list, history, show
//!
//! ```bash
//! svcdesk list orders
//! svcdesk history repairs --year 2024
//! svcdesk show repairs 41
//! ```

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Args, ValueEnum};
use svcdesk_client::records::{LabelledRecord, RecordKind};

use crate::CliContext;

/// Record family as given on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    Orders,
    Repairs,
    Services,
}

impl From<KindArg> for RecordKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Orders => RecordKind::Orders,
            KindArg::Repairs => RecordKind::Repairs,
            KindArg::Services => RecordKind::Services,
        }
    }
}

/// `svcdesk list` arguments.
#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(value_enum)]
    pub kind: KindArg,
}

/// `svcdesk history` arguments.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[arg(value_enum)]
    pub kind: KindArg,
    /// Calendar year (default: current year).
    #[arg(long)]
    pub year: Option<i32>,
}

/// `svcdesk show` arguments.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Orders or repairs; services have no detail view.
    #[arg(value_enum)]
    pub kind: KindArg,
    pub id: String,
}

/// Current records of one kind, with status labels.
pub async fn run_list(args: &ListArgs, ctx: &CliContext) -> Result<u8> {
    let kind = RecordKind::from(args.kind);
    let records = ctx.signed_in()?.records();
    let items = records
        .list(kind)
        .await
        .with_context(|| format!("failed to load {kind}"))?;
    let labelled = records.labelled(kind, items).await;
    print_records(ctx, kind, &labelled)
}

/// Records of one kind completed during a year.
pub async fn run_history(args: &HistoryArgs, ctx: &CliContext) -> Result<u8> {
    let kind = RecordKind::from(args.kind);
    let year = args.year.unwrap_or_else(|| chrono::Local::now().year());
    let records = ctx.signed_in()?.records();
    let items = records
        .history(kind, year)
        .await
        .with_context(|| format!("failed to load {kind} history for {year}"))?;
    let labelled = records.labelled(kind, items).await;
    print_records(ctx, kind, &labelled)
}

/// One order or repair, printed as JSON.
pub async fn run_show(args: &ShowArgs, ctx: &CliContext) -> Result<u8> {
    let kind = RecordKind::from(args.kind);
    let detail = ctx
        .signed_in()?
        .records()
        .detail(kind, &args.id)
        .await
        .with_context(|| format!("failed to load {kind} {}", args.id))?;
    ctx.print_json(&detail)?;
    Ok(0)
}

fn print_records(ctx: &CliContext, kind: RecordKind, records: &[LabelledRecord]) -> Result<u8> {
    if ctx.json {
        ctx.print_json(&records)?;
    } else {
        print!("{}", render_records(kind, records));
    }
    Ok(0)
}

pub fn render_records(kind: RecordKind, records: &[LabelledRecord]) -> String {
    if records.is_empty() {
        return format!("No {kind}\n");
    }
    let mut out = String::new();
    for record in records {
        let id = record.id.as_deref().unwrap_or("—");
        out.push_str(&format!("  #{id:<10} {}\n", record.status));
    }
    out.push_str(&format!("Total: {} {kind}\n", records.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_id_and_status() {
        let records = vec![LabelledRecord {
            id: Some("7".into()),
            status: "Open".into(),
            record: json!({"id": 7}),
        }];
        let text = render_records(RecordKind::Repairs, &records);
        assert!(text.contains("#7"));
        assert!(text.contains("Open"));
        assert!(text.ends_with("Total: 1 repairs\n"));
    }

    #[test]
    fn empty_list_message() {
        assert_eq!(render_records(RecordKind::Orders, &[]), "No orders\n");
    }
}
