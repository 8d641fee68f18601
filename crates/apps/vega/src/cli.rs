//! Command-line interface definitions

use clap::{Args, Parser, Subcommand};
use mail::{DEFAULT_FIELDS, OutputFormat};

/// Gmail command-line client
#[derive(Debug, Parser)]
#[command(name = "vega", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authenticate with the Gmail API using OAuth.
    ///
    /// Initiates the OAuth flow to obtain and save access tokens. Only
    /// applicable when auth_type is set to "oauth" in the config.
    Auth,

    /// List messages with optional filters.
    ///
    /// Available fields: id, threadid, url, from, to, subject, date,
    /// labels, snippet, body.
    ///
    /// Common labels: INBOX, SENT, DRAFT, SPAM, TRASH, STARRED, UNREAD,
    /// IMPORTANT, CATEGORY_PERSONAL, CATEGORY_SOCIAL, CATEGORY_PROMOTIONS,
    /// CATEGORY_UPDATES, CATEGORY_FORUMS.
    List(ListArgs),

    /// Get a message by ID with full body content
    Get(GetArgs),

    /// Print version information
    Version,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Search query (Gmail search syntax)
    #[arg(short, long)]
    pub query: Option<String>,

    /// Number of messages to request per page (all pages are fetched)
    #[arg(short = 'n', long = "max-results", default_value_t = 10)]
    pub max_results: u32,

    /// Filter by label name or ID (can be specified multiple times)
    #[arg(short = 'l', long = "label")]
    pub labels: Vec<String>,

    /// Comma-separated list of fields to include
    #[arg(short, long, default_value = DEFAULT_FIELDS)]
    pub fields: String,

    /// Output format (text or json)
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// The message ID
    pub message_id: String,

    /// Output format (text or json)
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}
