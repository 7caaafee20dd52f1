use async_trait::async_trait;

use crate::error::Result;

const EXCLUDE_PREFIX: char = '-';
const ITEM_SEPARATOR: char = ',';

/// Lookup of a category alias (name, title, or alternate title) to its
/// numeric id. Read-only reference data owned by the document store.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// First matching node id for the alias, or `None` when no category
    /// carries it.
    async fn find_node_id(&self, alias: &str) -> Result<Option<i64>>;
}

/// Resolved node constraint for a search plan. `None` means no node filter
/// at all, which is different from filtering on an empty set (that would
/// match nothing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeFilter {
    None,
    Include(Vec<i64>),
    Exclude(Vec<i64>),
}

/// Splits a node spec into trimmed tokens and an exclusion flag.
///
/// A `-` marker on *any* token flips the whole spec to an exclude set; there
/// is no per-token exclusion.
pub fn parse_node_spec(spec: &str) -> (Vec<String>, bool) {
    let mut excluded = false;
    let mut items = Vec::new();
    for split in spec.split(ITEM_SEPARATOR) {
        let mut trimmed = split.trim();
        if let Some(stripped) = trimmed.strip_prefix(EXCLUDE_PREFIX) {
            excluded = true;
            trimmed = stripped;
        }
        items.push(trimmed.to_string());
    }
    (items, excluded)
}

/// Resolves a raw node spec into a `NodeFilter`.
///
/// Tokens that do not resolve (unknown alias, or a store error) are dropped
/// silently; resolution only ever shrinks the effective filter set and never
/// fails the request. Ids keep first-seen order and are deduplicated. The
/// result is single-owner request state, not shared across tasks.
pub async fn resolve_nodes(store: &dyn NodeStore, spec: &str) -> NodeFilter {
    if spec.is_empty() {
        return NodeFilter::None;
    }
    let (tokens, excluded) = parse_node_spec(spec);
    let mut ids: Vec<i64> = Vec::new();
    for token in &tokens {
        if token.is_empty() {
            continue;
        }
        match store.find_node_id(token).await {
            Ok(Some(id)) => {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::debug!(alias = %token, error = %err, "node lookup failed, dropping token");
            }
        }
    }
    if ids.is_empty() {
        NodeFilter::None
    } else if excluded {
        NodeFilter::Exclude(ids)
    } else {
        NodeFilter::Include(ids)
    }
}
