//! # Session subcommands: login, logout, register, forgot-password
//!
//! ```bash
//! svcdesk login --email me@example.ge --password secret
//! svcdesk register --name "Acme" --email me@example.ge --password secret --company-code 205001234
//! svcdesk forgot-password --email me@example.ge
//! svcdesk logout
//! ```

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;
use svcdesk_client::auth::{Registration, RegistrationRequest};

use crate::{session, CliContext};

/// `svcdesk login` arguments.
#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

/// `svcdesk register` arguments.
#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Company or person name.
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    /// Company identification code.
    #[arg(long)]
    pub company_code: String,
}

/// `svcdesk forgot-password` arguments.
#[derive(Args, Debug)]
pub struct ForgotPasswordArgs {
    #[arg(long)]
    pub email: String,
}

/// Sign in and store the session.
pub async fn run_login(args: &LoginArgs, ctx: &CliContext) -> Result<u8> {
    let session = ctx
        .client
        .auth()
        .login(&args.email, &args.password)
        .await
        .context("sign-in failed")?;
    session::save(&ctx.store, &session)?;

    if ctx.json {
        ctx.print_json(&json!({ "email": session.email, "name": session.name }))?;
    } else {
        let who = session.name.as_deref().unwrap_or(&session.email);
        println!("Signed in as {who}");
    }
    Ok(0)
}

/// Create an account. Stores the session when the backend signs the new
/// client in immediately.
pub async fn run_register(args: &RegisterArgs, ctx: &CliContext) -> Result<u8> {
    let request = RegistrationRequest {
        name: args.name.clone(),
        email: args.email.clone(),
        password: args.password.clone(),
        company_code: args.company_code.clone(),
    };
    let outcome = ctx
        .client
        .auth()
        .register(&request)
        .await
        .context("registration failed")?;

    match outcome {
        Registration::SignedIn(session) => {
            session::save(&ctx.store, &session)?;
            println!("Registered and signed in as {}", session.email);
        }
        Registration::Created { email } => {
            println!("Registered {email}; run `svcdesk login` to sign in");
        }
    }
    Ok(0)
}

/// Request a password reset email.
pub async fn run_forgot_password(args: &ForgotPasswordArgs, ctx: &CliContext) -> Result<u8> {
    let message = ctx
        .client
        .auth()
        .forgot_password(&args.email)
        .await
        .context("password reset failed")?;
    println!("{message}");
    Ok(0)
}

/// Sign out. The server call is best-effort; the local session is always
/// cleared.
pub async fn run_logout(ctx: &CliContext) -> Result<u8> {
    if let Some(token) = session::load_token(&ctx.store)? {
        ctx.client.with_token(token)?.account().logout().await;
    }
    session::clear(&ctx.store)?;
    println!("Signed out");
    Ok(0)
}
