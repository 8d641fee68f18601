//! Vega - a Gmail command-line client
//!
//! This is the main entry point: it parses the command line, loads the
//! configuration, and dispatches to the mail crate.

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::debug;
use mail::{
    Authenticator, AuthKind, Config, FieldSet, GmailClient, ListOptions, format_message_detail,
    format_message_list, get_message, list_messages,
};
use std::io::{self, Write};

mod cli;

use cli::{Cli, Command, GetArgs, ListArgs};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Auth => run_auth(),
        Command::List(args) => run_list(args),
        Command::Get(args) => run_get(args),
        Command::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Load configuration and build an authenticated API client
fn build_client() -> Result<GmailClient> {
    let config = Config::load()?;
    config.validate()?;
    let auth = Authenticator::from_config(&config)?;
    Ok(GmailClient::new(auth))
}

fn run_auth() -> Result<()> {
    let config = Config::load()?;
    config.validate()?;

    if config.auth_type != AuthKind::OAuth {
        bail!(
            "auth command is only available for OAuth authentication (current: {})",
            config.auth_type
        );
    }

    if let Some(token_path) = &config.user_credentials
        && token_path.exists()
    {
        println!("Token file already exists: {}", token_path.display());
        print!("Do you want to re-authenticate? [y/N]: ");
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin()
            .read_line(&mut response)
            .context("Failed to read response")?;
        if !matches!(response.trim(), "y" | "Y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    Authenticator::from_config(&config)?.authenticate()?;

    println!("Authentication successful!");
    Ok(())
}

fn run_list(args: ListArgs) -> Result<()> {
    let client = build_client()?;

    let opts = ListOptions {
        query: args.query,
        labels: args.labels,
        max_results: args.max_results,
        fields: FieldSet::parse(&args.fields),
    };
    debug!("listing messages with {:?}", opts);

    let messages = list_messages(&client, &opts)?;

    if messages.is_empty() {
        println!("No messages found.");
        return Ok(());
    }

    let stdout = io::stdout();
    format_message_list(&mut stdout.lock(), &messages, &opts.fields, args.format)
}

fn run_get(args: GetArgs) -> Result<()> {
    let client = build_client()?;

    let detail = get_message(&client, &args.message_id)?;

    let stdout = io::stdout();
    format_message_detail(&mut stdout.lock(), &detail, args.format)
}
