//! Label name/ID index
//!
//! Built once per invocation from the mailbox's complete label set, then
//! used read-only to resolve user-supplied label filters and to map label
//! IDs back to display names.

use anyhow::{Context, Result};
use std::collections::HashMap;

use crate::gmail::{GmailClient, api};

/// A requested label matched neither a label name nor a label ID
#[derive(Debug, thiserror::Error)]
#[error("label not found: {0}")]
pub struct UnknownLabelError(pub String);

/// Case-insensitive lookup over a mailbox's label set.
///
/// Immutable after construction. Name collisions are not deduplicated;
/// the last label wins.
pub struct LabelIndex {
    name_to_id: HashMap<String, String>,
    id_to_name: HashMap<String, String>,
    id_to_id: HashMap<String, String>,
}

impl LabelIndex {
    /// Build an index from a label snapshot
    pub fn build(labels: impl IntoIterator<Item = api::Label>) -> Self {
        let mut name_to_id = HashMap::new();
        let mut id_to_name = HashMap::new();
        let mut id_to_id = HashMap::new();

        for label in labels {
            name_to_id.insert(label.name.to_lowercase(), label.id.clone());
            id_to_name.insert(label.id.to_lowercase(), label.name);
            id_to_id.insert(label.id.to_lowercase(), label.id);
        }

        Self {
            name_to_id,
            id_to_name,
            id_to_id,
        }
    }

    /// Fetch the mailbox's labels and build an index from them
    pub fn fetch(client: &GmailClient) -> Result<Self> {
        let response = client.list_labels().context("unable to list labels")?;
        Ok(Self::build(response.labels.unwrap_or_default()))
    }

    /// Resolve label names or IDs to canonical label IDs.
    ///
    /// Each token is trimmed and matched case-insensitively, first as a
    /// name, then as an ID. The first token that matches neither aborts the
    /// whole resolution. Input order and duplicates are preserved.
    pub fn resolve(&self, requested: &[String]) -> Result<Vec<String>, UnknownLabelError> {
        let mut resolved = Vec::with_capacity(requested.len());
        for raw in requested {
            let label = raw.trim().to_lowercase();
            if let Some(id) = self.name_to_id.get(&label) {
                resolved.push(id.clone());
                continue;
            }
            if let Some(id) = self.id_to_id.get(&label) {
                resolved.push(id.clone());
                continue;
            }
            return Err(UnknownLabelError(raw.clone()));
        }
        Ok(resolved)
    }

    /// Map label IDs to display names; IDs absent from the index pass
    /// through unchanged.
    pub fn map_ids_to_names(&self, ids: &[String]) -> Vec<String> {
        ids.iter()
            .map(|id| {
                self.id_to_name
                    .get(&id.to_lowercase())
                    .cloned()
                    .unwrap_or_else(|| id.clone())
            })
            .collect()
    }
}
