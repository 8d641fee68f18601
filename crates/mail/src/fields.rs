//! Output field selection
//!
//! A field set controls both what is fetched (requesting `body` forces a
//! full-fidelity fetch) and which attributes are populated and rendered.

use std::collections::HashSet;

/// Fields populated when no `--fields` flag is given
pub const DEFAULT_FIELDS: &str = "id,from,subject,date,labels,snippet";

/// Set of lowercase field-name tokens parsed from a comma-separated spec.
///
/// Tokens are not validated against a known vocabulary: unknown names are
/// accepted and simply never matched by any consumer, and a trailing comma
/// yields an empty-string entry.
#[derive(Debug, Clone)]
pub struct FieldSet(HashSet<String>);

impl FieldSet {
    /// Parse a comma-separated field spec: split, trim, lowercase
    pub fn parse(spec: &str) -> Self {
        Self(
            spec.split(',')
                .map(|field| field.trim().to_lowercase())
                .collect(),
        )
    }

    /// Whether the given field was requested
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains(field)
    }

    /// Whether rendering needs body content (and so a full-fidelity fetch)
    pub fn requires_body(&self) -> bool {
        self.contains("body")
    }
}
