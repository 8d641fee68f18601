//! Gmail API HTTP client
//!
//! Thin synchronous wrapper over the Gmail REST endpoints used by the
//! listing and retrieval operations. Every call blocks the invoking thread;
//! the agent's global timeout bounds each request.

use anyhow::{Context, Result};
use std::time::Duration;

use super::Authenticator;
use super::api::{GmailMessage, ListLabelsResponse, ListMessagesResponse, ProfileResponse};

/// Fidelity level of a message fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    /// Headers and the full body-part tree
    Full,
    /// Headers only, limited to an allow-list
    Metadata,
}

impl MessageFormat {
    fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Metadata => "metadata",
        }
    }
}

/// Gmail API client
pub struct GmailClient {
    agent: ureq::Agent,
    auth: Authenticator,
}

impl GmailClient {
    /// Gmail API base URL
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    /// Upper bound the API enforces on page size
    const MAX_PAGE_SIZE: u32 = 500;

    /// Default per-request deadline
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a new client with the default request timeout
    pub fn new(auth: Authenticator) -> Self {
        Self::with_timeout(auth, Self::REQUEST_TIMEOUT)
    }

    /// Create a new client with an explicit per-request deadline
    pub fn with_timeout(auth: Authenticator, timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent, auth }
    }

    fn bearer(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.auth.token()?))
    }

    /// List one page of message IDs from the user's mailbox.
    ///
    /// `max_results` is clamped to the API maximum of 500; pass the previous
    /// page's continuation token to fetch the next page.
    pub fn list_messages(
        &self,
        query: Option<&str>,
        label_ids: &[String],
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<ListMessagesResponse> {
        let mut url = format!(
            "{}/users/me/messages?maxResults={}",
            Self::BASE_URL,
            max_results.min(Self::MAX_PAGE_SIZE)
        );

        if let Some(query) = query {
            url.push_str(&format!("&q={}", urlencoding::encode(query)));
        }
        for id in label_ids {
            url.push_str(&format!("&labelIds={}", urlencoding::encode(id)));
        }
        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }

        let mut response = self
            .agent
            .get(&url)
            .header("Authorization", &self.bearer()?)
            .call()
            .context("Failed to send list messages request")?;

        response
            .body_mut()
            .read_json()
            .context("Failed to parse list messages response")
    }

    /// Get a message by ID at the requested fidelity.
    ///
    /// `metadata_headers` narrows a metadata fetch to the named headers; it
    /// is ignored for full fetches.
    pub fn get_message(
        &self,
        id: &str,
        format: MessageFormat,
        metadata_headers: &[&str],
    ) -> Result<GmailMessage> {
        let mut url = format!(
            "{}/users/me/messages/{}?format={}",
            Self::BASE_URL,
            id,
            format.as_str()
        );

        if format == MessageFormat::Metadata {
            for header in metadata_headers {
                url.push_str(&format!("&metadataHeaders={}", header));
            }
        }

        let mut response = self
            .agent
            .get(&url)
            .header("Authorization", &self.bearer()?)
            .call()
            .context("Failed to send get message request")?;

        response
            .body_mut()
            .read_json()
            .context("Failed to parse message response")
    }

    /// List all labels in the user's mailbox
    pub fn list_labels(&self) -> Result<ListLabelsResponse> {
        let url = format!("{}/users/me/labels", Self::BASE_URL);

        let mut response = self
            .agent
            .get(&url)
            .header("Authorization", &self.bearer()?)
            .call()
            .context("Failed to send list labels request")?;

        response
            .body_mut()
            .read_json()
            .context("Failed to parse labels response")
    }

    /// Get the authenticated user's profile
    pub fn get_profile(&self) -> Result<ProfileResponse> {
        let url = format!("{}/users/me/profile", Self::BASE_URL);

        let mut response = self
            .agent
            .get(&url)
            .header("Authorization", &self.bearer()?)
            .call()
            .context("Failed to send profile request")?;

        response
            .body_mut()
            .read_json()
            .context("Failed to parse profile response")
    }
}
