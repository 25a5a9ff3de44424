//! # `svcdesk statuses` -- show a status dictionary
//!
//! Never fails on backend errors: when the backend has no dictionary the
//! built-in defaults are printed. A session is optional, but an unreadable
//! session file is still an error.

use anyhow::Result;
use clap::Args;
use svcdesk_client::{ResourceType, StatusMap};

use crate::{session, CliContext};

/// `svcdesk statuses` arguments.
#[derive(Args, Debug)]
pub struct StatusesArgs {
    /// responses, repairs, services or history. Omit for the combined
    /// dictionary.
    pub kind: Option<ResourceType>,
}

pub async fn run_statuses(args: &StatusesArgs, ctx: &CliContext) -> Result<u8> {
    let client = match session::load_token(&ctx.store)? {
        Some(token) => ctx.client.with_token(token)?,
        None => ctx.client.clone(),
    };
    let map = client.status_map(args.kind).await;
    if ctx.json {
        ctx.print_json(&*map)?;
    } else {
        print!("{}", render(&map));
    }
    Ok(0)
}

pub fn render(map: &StatusMap) -> String {
    map.iter()
        .map(|(code, label)| format!("  {code:>4}  {label}\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_defaults_in_code_order() {
        let text = render(&StatusMap::defaults());
        let codes: Vec<&str> = text.lines().map(|l| l.split_whitespace().next().unwrap()).collect();
        assert_eq!(codes, vec!["1", "2", "3"]);
    }

    #[derive(clap::Parser)]
    struct Cmd {
        #[command(flatten)]
        args: StatusesArgs,
    }

    #[test]
    fn parses_kind_argument() {
        let cmd = <Cmd as clap::Parser>::try_parse_from(["statuses", "Repairs"]).unwrap();
        assert_eq!(cmd.args.kind, Some(ResourceType::Repairs));
        assert!(<Cmd as clap::Parser>::try_parse_from(["statuses", "orders"]).is_err());
    }
}
