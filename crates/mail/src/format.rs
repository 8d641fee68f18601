//! Output rendering
//!
//! Renders projected messages either as pretty-printed JSON or as a text
//! table of the selected columns. Bodies never fit tabular rendering, so
//! they are appended after the table as per-message blocks.

use anyhow::{Context, Result, bail};
use std::io::Write;
use std::str::FromStr;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::fields::FieldSet;
use crate::messages::{MessageDetail, MessageSummary};

/// Canonical column order for the text table
const FIELD_ORDER: [&str; 9] = [
    "id", "threadid", "url", "from", "to", "subject", "date", "labels", "snippet",
];

/// Maximum display widths for truncated columns
const FROM_WIDTH: usize = 30;
const TO_WIDTH: usize = 30;
const SUBJECT_WIDTH: usize = 40;
const SNIPPET_WIDTH: usize = 50;

/// Output format for rendered messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => bail!("unknown output format: {} (expected text or json)", other),
        }
    }
}

/// Render a message listing in the requested format
pub fn format_message_list<W: Write>(
    w: &mut W,
    messages: &[MessageSummary],
    fields: &FieldSet,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => format_json(w, &messages),
        OutputFormat::Text => format_messages_table(w, messages, fields),
    }
}

/// Render a message detail in the requested format
pub fn format_message_detail<W: Write>(
    w: &mut W,
    detail: &MessageDetail,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => format_json(w, detail),
        OutputFormat::Text => format_detail_text(w, detail),
    }
}

fn format_json<W: Write, T: serde::Serialize>(w: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, value).context("unable to serialize to JSON")?;
    writeln!(w)?;
    Ok(())
}

fn format_messages_table<W: Write>(
    w: &mut W,
    messages: &[MessageSummary],
    fields: &FieldSet,
) -> Result<()> {
    let columns: Vec<&str> = FIELD_ORDER
        .iter()
        .copied()
        .filter(|f| fields.contains(f))
        .collect();

    if !columns.is_empty() {
        let rows: Vec<Vec<String>> = messages
            .iter()
            .map(|msg| columns.iter().map(|f| column_value(msg, f)).collect())
            .collect();

        let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.width());
            }
        }

        let header: Vec<String> = columns.iter().map(|c| c.to_uppercase()).collect();
        write_row(w, &header, &widths)?;
        let separator: Vec<String> = widths.iter().map(|n| "-".repeat(*n)).collect();
        write_row(w, &separator, &widths)?;
        for row in &rows {
            write_row(w, row, &widths)?;
        }
    }

    // Bodies are multi-line; print them after the table, one block each
    if fields.requires_body() {
        for msg in messages {
            if let Some(body) = &msg.body {
                write!(
                    w,
                    "\n=== {} ===\n{}\n",
                    msg.id.as_deref().unwrap_or_default(),
                    body
                )?;
            }
        }
    }

    Ok(())
}

fn write_row<W: Write>(w: &mut W, cells: &[String], widths: &[usize]) -> Result<()> {
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        if i + 1 < cells.len() {
            let pad = widths[i].saturating_sub(cell.width());
            line.extend(std::iter::repeat_n(' ', pad));
        }
    }
    writeln!(w, "{}", line.trim_end())?;
    Ok(())
}

fn column_value(msg: &MessageSummary, field: &str) -> String {
    match field {
        "id" => msg.id.clone().unwrap_or_default(),
        "threadid" => msg.thread_id.clone().unwrap_or_default(),
        "url" => msg.url.clone().unwrap_or_default(),
        "from" => truncate(msg.from.as_deref().unwrap_or_default(), FROM_WIDTH),
        "to" => truncate(msg.to.as_deref().unwrap_or_default(), TO_WIDTH),
        "subject" => truncate(msg.subject.as_deref().unwrap_or_default(), SUBJECT_WIDTH),
        "date" => msg.date.clone().unwrap_or_default(),
        "labels" => msg.labels.as_deref().unwrap_or_default().join(", "),
        "snippet" => truncate(msg.snippet.as_deref().unwrap_or_default(), SNIPPET_WIDTH),
        _ => String::new(),
    }
}

fn format_detail_text<W: Write>(w: &mut W, detail: &MessageDetail) -> Result<()> {
    writeln!(w, "ID: {}", detail.id)?;
    writeln!(w, "ThreadID: {}", detail.thread_id)?;
    writeln!(w, "URL: {}", detail.url)?;
    writeln!(w, "From: {}", detail.from)?;
    writeln!(w, "To: {}", detail.to)?;
    writeln!(w, "Subject: {}", detail.subject)?;
    writeln!(w, "Date: {}", detail.date)?;
    if !detail.labels.is_empty() {
        writeln!(w, "Labels: {}", detail.labels.join(", "))?;
    }
    writeln!(w, "---")?;
    writeln!(w, "{}", detail.body)?;
    Ok(())
}

/// Truncate a string to a maximum display width with an ellipsis marker
fn truncate(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let keep = max_width.saturating_sub(3);
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > keep {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str("...");
    out
}
