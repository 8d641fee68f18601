//! Configuration for the mail client
//!
//! The config file (~/.config/vega/config.toml) declares the auth mode and
//! credential paths. It is loaded once at startup and passed explicitly to
//! everything that needs it.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Config filename in the Vega config directory
const CONFIG_FILE: &str = "config.toml";

/// Authentication mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum AuthKind {
    #[default]
    #[serde(rename = "oauth")]
    OAuth,
    #[serde(rename = "service_account")]
    ServiceAccount,
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OAuth => write!(f, "oauth"),
            Self::ServiceAccount => write!(f, "service_account"),
        }
    }
}

/// Loaded configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Authentication mode; defaults to OAuth
    #[serde(default)]
    pub auth_type: AuthKind,
    /// Path to the OAuth client credentials or service-account key JSON
    #[serde(default)]
    pub application_credentials: PathBuf,
    /// Path to the stored user token (OAuth only)
    pub user_credentials: Option<PathBuf>,
}

impl Config {
    /// Load the configuration from the Vega config directory.
    ///
    /// A missing file is a configuration error naming the expected path,
    /// surfaced before any network call.
    pub fn load() -> Result<Self> {
        let path = config::config_path(CONFIG_FILE).context("Could not determine config directory")?;
        if !path.exists() {
            bail!(
                "config file not found. Please create a config file at {}",
                path.display()
            );
        }
        config::load_toml_file(&path)
    }

    /// Validate credential paths for the selected auth mode
    pub fn validate(&self) -> Result<()> {
        if self.application_credentials.as_os_str().is_empty() {
            bail!("application_credentials is required");
        }

        if self.auth_type == AuthKind::OAuth
            && self.user_credentials.as_ref().is_none_or(|p| p.as_os_str().is_empty())
        {
            bail!("user_credentials is required for OAuth authentication");
        }

        Ok(())
    }
}

/// OAuth client credentials (Google Cloud Console format)
#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Credential file layout: one of "installed" (desktop) or "web"
#[derive(Deserialize)]
struct CredentialFile {
    installed: Option<ClientSection>,
    web: Option<ClientSection>,
}

#[derive(Deserialize)]
struct ClientSection {
    client_id: String,
    client_secret: String,
}

impl GoogleCredentials {
    /// Load credentials from a Google Cloud Console JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file: CredentialFile = config::load_json_file(path)?;
        Self::from_credential_file(file)
    }

    /// Parse credentials from a JSON string (Google Cloud Console format)
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CredentialFile =
            serde_json::from_str(json).context("Failed to parse credentials JSON")?;
        Self::from_credential_file(file)
    }

    fn from_credential_file(file: CredentialFile) -> Result<Self> {
        let section = file
            .installed
            .or(file.web)
            .context("Credentials file missing 'installed' or 'web' section")?;

        Ok(Self {
            client_id: section.client_id,
            client_secret: section.client_secret,
        })
    }
}
