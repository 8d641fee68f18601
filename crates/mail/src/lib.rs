//! Mail crate - Gmail access for the Vega CLI
//!
//! This crate provides platform-independent mail functionality including:
//! - Configuration and credential loading
//! - OAuth2 / service-account authentication and a Gmail API client
//! - Label index for name/ID resolution
//! - Field selection, message listing/retrieval, and output rendering
//!
//! This crate has zero UI dependencies; the binary wires it to the CLI.

pub mod config;
pub mod fields;
pub mod format;
pub mod gmail;
pub mod labels;
pub mod messages;

pub use config::{AuthKind, Config, GoogleCredentials};
pub use fields::{DEFAULT_FIELDS, FieldSet};
pub use format::{OutputFormat, format_message_detail, format_message_list};
pub use gmail::{Authenticator, GmailClient, MessageFormat, NotAuthenticatedError};
pub use labels::{LabelIndex, UnknownLabelError};
pub use messages::{
    ListOptions, METADATA_HEADERS, MessageDetail, MessageSummary, build_mail_url, extract_body,
    get_message, list_messages,
};
