use crate::error::{Result, SifterError};
use crate::node::{resolve_nodes, NodeFilter, NodeStore};
use crate::params::SearchParams;
use crate::visibility::VisibilityResolver;

/// Upper bound on `created` that no archived topic can satisfy. Steering a
/// hidden author's query here yields zero hits without leaking a user-scoped
/// query to the engine.
pub const HIDDEN_AUTHOR_LTE: i64 = 1;

/// Validated parameters plus the resolved per-request filter state. Owned by
/// one request, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    pub params: SearchParams,
    pub nodes: NodeFilter,
}

/// Resolves node aliases and the author visibility policy into a plan.
///
/// Node resolution never fails the request; author resolution fails with
/// `UserNotFound` for unknown names, and silently
/// neutralizes the query for authors who hid their topics. When `visibility`
/// is `None` the author check is disabled and the raw name passes through.
pub async fn build_plan(
    mut params: SearchParams,
    store: &dyn NodeStore,
    visibility: Option<&VisibilityResolver>,
) -> Result<SearchPlan> {
    let nodes = resolve_nodes(store, &params.node).await;

    let username = params
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string);
    params.username = username.clone();

    if let (Some(name), Some(resolver)) = (username, visibility) {
        let record = resolver.resolve(&name).await?;
        tracing::info!(
            username = %name,
            found = record.found,
            searchable = record.searchable,
            "resolved author visibility"
        );
        if !record.found {
            return Err(SifterError::UserNotFound(name));
        }
        if record.searchable {
            params.username = Some(record.display_name);
        } else {
            params.username = None;
            params.lte = Some(HIDDEN_AUTHOR_LTE);
        }
    }

    Ok(SearchPlan { params, nodes })
}
