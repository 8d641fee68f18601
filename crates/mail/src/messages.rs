//! Message listing and retrieval
//!
//! The listing pipeline: resolve label filters once, paginate the mailbox's
//! message-ID listing until the server stops returning a continuation
//! token, then fetch each message (full fidelity only when body content was
//! requested) and project it through the field set. Per-message fetch
//! failures are skipped; everything before the per-message loop is fatal.

use anyhow::{Context, Result};
use base64::prelude::*;
use log::warn;
use serde::Serialize;

use crate::fields::FieldSet;
use crate::gmail::api::{GmailMessage, ListMessagesResponse, MessagePart, MessageRef};
use crate::gmail::{GmailClient, MessageFormat};
use crate::labels::LabelIndex;

/// Headers requested on a metadata-only fetch
pub const METADATA_HEADERS: [&str; 4] = ["From", "To", "Subject", "Date"];

/// Projection of a message limited to the requested fields.
///
/// Unpopulated fields are omitted from JSON output entirely.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Always-full projection used by the single-message path
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDetail {
    pub id: String,
    pub thread_id: String,
    pub url: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub date: String,
    pub labels: Vec<String>,
    pub body: String,
}

/// Options for listing messages
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// Search query (Gmail search syntax)
    pub query: Option<String>,
    /// Label names or IDs to filter by
    pub labels: Vec<String>,
    /// Requested page size for each listing request
    pub max_results: u32,
    /// Fields to populate and render
    pub fields: FieldSet,
}

/// List messages matching the options, projected through the field set.
///
/// Returns an explicit empty vector when no message matches; errors are
/// reserved for failed calls.
pub fn list_messages(client: &GmailClient, opts: &ListOptions) -> Result<Vec<MessageSummary>> {
    // The web URL needs the account email; fetch it only when asked for.
    let user_email = if opts.fields.contains("url") {
        let profile = client
            .get_profile()
            .context("unable to get user profile")?;
        Some(profile.email_address)
    } else {
        None
    };

    let index = if !opts.labels.is_empty() || opts.fields.contains("labels") {
        Some(LabelIndex::fetch(client)?)
    } else {
        None
    };

    // Resolve filters once, before any listing call; one bad label aborts.
    let resolved_labels = match &index {
        Some(index) if !opts.labels.is_empty() => index.resolve(&opts.labels)?,
        _ => Vec::new(),
    };

    let refs = collect_message_refs(|page_token| {
        client.list_messages(
            opts.query.as_deref(),
            &resolved_labels,
            opts.max_results,
            page_token,
        )
    })
    .context("unable to retrieve messages")?;

    if refs.is_empty() {
        return Ok(Vec::new());
    }

    let needs_body = opts.fields.requires_body();

    let mut summaries = Vec::with_capacity(refs.len());
    for r in &refs {
        let fetched = if needs_body {
            client.get_message(&r.id, MessageFormat::Full, &[])
        } else {
            client.get_message(&r.id, MessageFormat::Metadata, &METADATA_HEADERS)
        };

        // Skip messages we can't retrieve instead of failing the listing
        let msg = match fetched {
            Ok(msg) => msg,
            Err(err) => {
                warn!("unable to retrieve message {}: {:#}", r.id, err);
                continue;
            }
        };

        summaries.push(build_summary(
            &msg,
            &opts.fields,
            user_email.as_deref(),
            index.as_ref(),
        ));
    }

    Ok(summaries)
}

/// Get a single message by ID with full details.
///
/// Unlike listing, every fetch on this path is fatal.
pub fn get_message(client: &GmailClient, message_id: &str) -> Result<MessageDetail> {
    let profile = client
        .get_profile()
        .context("unable to get user profile")?;
    let index = LabelIndex::fetch(client)?;

    let msg = client
        .get_message(message_id, MessageFormat::Full, &[])
        .context("unable to retrieve message")?;

    let mut detail = MessageDetail {
        id: msg.id.clone(),
        thread_id: msg.thread_id.clone(),
        url: build_mail_url(&profile.email_address, &msg.thread_id),
        labels: index.map_ids_to_names(msg.label_ids.as_deref().unwrap_or_default()),
        ..MessageDetail::default()
    };

    if let Some(payload) = &msg.payload {
        for header in payload.headers.as_deref().unwrap_or_default() {
            match header.name.as_str() {
                "From" => detail.from = header.value.clone(),
                "To" => detail.to = header.value.clone(),
                "Subject" => detail.subject = header.value.clone(),
                "Date" => detail.date = header.value.clone(),
                _ => {}
            }
        }
        detail.body = extract_body(payload);
    }

    Ok(detail)
}

/// Accumulate message refs across pages until the server stops returning a
/// continuation token
fn collect_message_refs<F>(mut fetch_page: F) -> Result<Vec<MessageRef>>
where
    F: FnMut(Option<&str>) -> Result<ListMessagesResponse>,
{
    let mut all = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = fetch_page(page_token.as_deref())?;
        if let Some(refs) = page.messages {
            all.extend(refs);
        }
        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(all)
}

/// Project a fetched message through the field set
fn build_summary(
    msg: &GmailMessage,
    fields: &FieldSet,
    user_email: Option<&str>,
    index: Option<&LabelIndex>,
) -> MessageSummary {
    let mut summary = MessageSummary::default();

    if fields.contains("id") {
        summary.id = Some(msg.id.clone());
    }
    if fields.contains("threadid") {
        summary.thread_id = Some(msg.thread_id.clone());
    }
    if fields.contains("url")
        && let Some(email) = user_email
    {
        summary.url = Some(build_mail_url(email, &msg.thread_id));
    }
    if fields.contains("labels")
        && let Some(index) = index
    {
        let names = index.map_ids_to_names(msg.label_ids.as_deref().unwrap_or_default());
        if !names.is_empty() {
            summary.labels = Some(names);
        }
    }
    if fields.contains("snippet") && !msg.snippet.is_empty() {
        summary.snippet = Some(msg.snippet.clone());
    }

    if let Some(payload) = &msg.payload {
        for header in payload.headers.as_deref().unwrap_or_default() {
            match header.name.as_str() {
                "From" if fields.contains("from") => summary.from = Some(header.value.clone()),
                "To" if fields.contains("to") => summary.to = Some(header.value.clone()),
                "Subject" if fields.contains("subject") => {
                    summary.subject = Some(header.value.clone())
                }
                "Date" if fields.contains("date") => summary.date = Some(header.value.clone()),
                _ => {}
            }
        }

        if fields.requires_body() {
            let body = extract_body(payload);
            if !body.is_empty() {
                summary.body = Some(body);
            }
        }
    }

    summary
}

/// Extract the message body from a part tree.
///
/// Depth-first search for a `text/plain` part, then `text/html`, then the
/// root's own inline content. A candidate that fails to decode is skipped
/// and the search continues; the result is empty only when nothing in the
/// tree decodes.
pub fn extract_body(payload: &MessagePart) -> String {
    if let Some(body) = find_body_part(payload, "text/plain") {
        return body;
    }
    if let Some(body) = find_body_part(payload, "text/html") {
        return body;
    }

    if let Some(data) = payload.body.as_ref().and_then(|b| b.data.as_deref())
        && !data.is_empty()
        && let Some(body) = decode_body_data(data)
    {
        return body;
    }

    String::new()
}

/// Pre-order search for the first part of the given MIME type that decodes
fn find_body_part(part: &MessagePart, mime_type: &str) -> Option<String> {
    if part.mime_type.as_deref() == Some(mime_type)
        && let Some(data) = part.body.as_ref().and_then(|b| b.data.as_deref())
        && !data.is_empty()
        && let Some(body) = decode_body_data(data)
    {
        return Some(body);
    }

    for child in part.parts.as_deref().unwrap_or_default() {
        if let Some(body) = find_body_part(child, mime_type) {
            return Some(body);
        }
    }

    None
}

/// Decode base64-encoded body data.
///
/// Gmail uses URL-safe base64 but padding can vary, so several engines are
/// tried before giving up on the part.
fn decode_body_data(data: &str) -> Option<String> {
    use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE};

    let decoders: &[&base64::engine::GeneralPurpose] =
        &[&BASE64_URL_SAFE_NO_PAD, &URL_SAFE, &STANDARD, &STANDARD_NO_PAD];

    for decoder in decoders {
        if let Ok(decoded) = decoder.decode(data)
            && let Ok(body) = String::from_utf8(decoded)
        {
            return Some(body);
        }
    }

    None
}

/// Build a Gmail web UI deep link for a thread
pub fn build_mail_url(email: &str, thread_id: &str) -> String {
    format!(
        "https://mail.google.com/mail/?authuser={}#all/{}",
        email, thread_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmail::api::{Header, Label, MessageBody};

    fn encoded(text: &str) -> Option<MessageBody> {
        Some(MessageBody {
            size: Some(text.len() as u32),
            data: Some(BASE64_URL_SAFE_NO_PAD.encode(text)),
        })
    }

    fn leaf(mime_type: &str, body: Option<MessageBody>) -> MessagePart {
        MessagePart {
            mime_type: Some(mime_type.to_string()),
            body,
            ..MessagePart::default()
        }
    }

    fn multipart(children: Vec<MessagePart>) -> MessagePart {
        MessagePart {
            mime_type: Some("multipart/alternative".to_string()),
            parts: Some(children),
            ..MessagePart::default()
        }
    }

    #[test]
    fn test_extract_body_plain_wins_regardless_of_order() {
        let html_first = multipart(vec![
            leaf("text/html", encoded("<p>hi</p>")),
            leaf("text/plain", encoded("hi")),
        ]);
        assert_eq!(extract_body(&html_first), "hi");

        let plain_first = multipart(vec![
            leaf("text/plain", encoded("hi")),
            leaf("text/html", encoded("<p>hi</p>")),
        ]);
        assert_eq!(extract_body(&plain_first), "hi");
    }

    #[test]
    fn test_extract_body_html_fallback() {
        let payload = multipart(vec![leaf("text/html", encoded("<p>only html</p>"))]);
        assert_eq!(extract_body(&payload), "<p>only html</p>");
    }

    #[test]
    fn test_extract_body_undecodable_plain_falls_through_to_html() {
        let payload = multipart(vec![
            leaf(
                "text/plain",
                Some(MessageBody {
                    size: Some(3),
                    data: Some("!!!not-base64!!!".to_string()),
                }),
            ),
            leaf("text/html", encoded("<p>fallback</p>")),
        ]);
        assert_eq!(extract_body(&payload), "<p>fallback</p>");
    }

    #[test]
    fn test_extract_body_undecodable_plain_skipped_for_later_plain() {
        let payload = multipart(vec![
            leaf(
                "text/plain",
                Some(MessageBody {
                    size: Some(3),
                    data: Some("!!!not-base64!!!".to_string()),
                }),
            ),
            leaf("text/plain", encoded("second one decodes")),
        ]);
        assert_eq!(extract_body(&payload), "second one decodes");
    }

    #[test]
    fn test_extract_body_nested_parts() {
        let payload = multipart(vec![
            leaf("application/pdf", None),
            multipart(vec![
                leaf("text/html", encoded("<p>deep html</p>")),
                leaf("text/plain", encoded("deep plain")),
            ]),
        ]);
        assert_eq!(extract_body(&payload), "deep plain");
    }

    #[test]
    fn test_extract_body_inline_root_fallback() {
        let payload = MessagePart {
            mime_type: Some("application/octet-stream".to_string()),
            body: encoded("inline content"),
            ..MessagePart::default()
        };
        assert_eq!(extract_body(&payload), "inline content");
    }

    #[test]
    fn test_extract_body_empty_tree() {
        let payload = multipart(vec![leaf("text/plain", None)]);
        assert_eq!(extract_body(&payload), "");
    }

    #[test]
    fn test_decode_body_data_padded_and_unpadded() {
        // "Hello, World!" with and without padding
        assert_eq!(
            decode_body_data("SGVsbG8sIFdvcmxkIQ"),
            Some("Hello, World!".to_string())
        );
        assert_eq!(
            decode_body_data("SGVsbG8sIFdvcmxkIQ=="),
            Some("Hello, World!".to_string())
        );
    }

    fn page(ids: &[&str], next: Option<&str>) -> ListMessagesResponse {
        ListMessagesResponse {
            messages: Some(
                ids.iter()
                    .map(|id| MessageRef {
                        id: id.to_string(),
                        thread_id: format!("t-{}", id),
                    })
                    .collect(),
            ),
            next_page_token: next.map(str::to_string),
            result_size_estimate: None,
        }
    }

    #[test]
    fn test_collect_refs_multi_page_equals_single_page() {
        let mut pages = vec![
            page(&["m1", "m2"], Some("p2")),
            page(&["m3", "m4"], Some("p3")),
            page(&["m5"], None),
        ]
        .into_iter();
        let chunked = collect_message_refs(|_| Ok(pages.next().unwrap())).unwrap();

        let single = collect_message_refs(|_| Ok(page(&["m1", "m2", "m3", "m4", "m5"], None)))
            .unwrap();

        let chunked_ids: Vec<_> = chunked.iter().map(|r| r.id.as_str()).collect();
        let single_ids: Vec<_> = single.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(chunked_ids, single_ids);
        assert_eq!(chunked_ids, vec!["m1", "m2", "m3", "m4", "m5"]);
    }

    #[test]
    fn test_collect_refs_passes_continuation_tokens() {
        let mut seen_tokens = Vec::new();
        let mut pages = vec![page(&["m1"], Some("next")), page(&["m2"], None)].into_iter();
        collect_message_refs(|token| {
            seen_tokens.push(token.map(str::to_string));
            Ok(pages.next().unwrap())
        })
        .unwrap();
        assert_eq!(seen_tokens, vec![None, Some("next".to_string())]);
    }

    #[test]
    fn test_collect_refs_empty_mailbox() {
        let refs = collect_message_refs(|_| {
            Ok(ListMessagesResponse {
                messages: None,
                next_page_token: None,
                result_size_estimate: Some(0),
            })
        })
        .unwrap();
        assert!(refs.is_empty());
    }

    #[test]
    fn test_collect_refs_propagates_page_error() {
        let result = collect_message_refs(|_| anyhow::bail!("listing failed"));
        assert!(result.is_err());
    }

    fn full_message(id: &str, subject: &str) -> GmailMessage {
        GmailMessage {
            id: id.to_string(),
            thread_id: format!("t-{}", id),
            label_ids: Some(vec!["INBOX".to_string(), "Label_7".to_string()]),
            snippet: format!("snippet of {}", id),
            payload: Some(MessagePart {
                headers: Some(vec![
                    Header {
                        name: "From".to_string(),
                        value: "alice@example.com".to_string(),
                    },
                    Header {
                        name: "To".to_string(),
                        value: "bob@example.com".to_string(),
                    },
                    Header {
                        name: "Subject".to_string(),
                        value: subject.to_string(),
                    },
                    Header {
                        name: "Date".to_string(),
                        value: "Mon, 2 Jun 2025 10:00:00 +0000".to_string(),
                    },
                ]),
                ..MessagePart::default()
            }),
        }
    }

    #[test]
    fn test_build_summary_projects_only_requested_fields() {
        let msg = full_message("m1", "Hello");
        let fields = FieldSet::parse("id,subject");
        let summary = build_summary(&msg, &fields, None, None);

        assert_eq!(summary.id.as_deref(), Some("m1"));
        assert_eq!(summary.subject.as_deref(), Some("Hello"));
        assert!(summary.thread_id.is_none());
        assert!(summary.from.is_none());
        assert!(summary.to.is_none());
        assert!(summary.date.is_none());
        assert!(summary.snippet.is_none());
        assert!(summary.labels.is_none());
        assert!(summary.body.is_none());
    }

    #[test]
    fn test_build_summary_maps_labels() {
        let msg = full_message("m1", "Hello");
        let index = LabelIndex::build([Label {
            id: "Label_7".to_string(),
            name: "Receipts".to_string(),
        }]);
        let fields = FieldSet::parse("labels");
        let summary = build_summary(&msg, &fields, None, Some(&index));
        assert_eq!(
            summary.labels,
            Some(vec!["INBOX".to_string(), "Receipts".to_string()])
        );
    }

    #[test]
    fn test_build_summary_url_needs_email() {
        let msg = full_message("m1", "Hello");
        let fields = FieldSet::parse("url");
        let with_email = build_summary(&msg, &fields, Some("me@example.com"), None);
        assert_eq!(
            with_email.url.as_deref(),
            Some("https://mail.google.com/mail/?authuser=me@example.com#all/t-m1")
        );

        let without_email = build_summary(&msg, &fields, None, None);
        assert!(without_email.url.is_none());
    }

    #[test]
    fn test_build_mail_url() {
        assert_eq!(
            build_mail_url("me@example.com", "18abc"),
            "https://mail.google.com/mail/?authuser=me@example.com#all/18abc"
        );
    }
}
