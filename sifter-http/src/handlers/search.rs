use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use std::sync::Arc;
use std::time::Instant;

use sifter::engine::SearchOutcome;
use sifter::error::SifterError;
use sifter::params::{self, RawSearchParams};
use sifter::{plan, query};

use super::AppState;

/// `GET /api/search` — the whole request pipeline: validate, resolve the
/// plan (nodes + author visibility), compile the query document, execute.
pub async fn search(
    State(state): State<Arc<AppState>>,
    raw: Result<Query<RawSearchParams>, QueryRejection>,
) -> Result<Json<SearchOutcome>, SifterError> {
    let Query(raw) = raw.map_err(|e| SifterError::InvalidParams(e.body_text()))?;
    let start = Instant::now();

    let validated = params::validate(raw, state.engine.as_ref()).await?;
    let keyword = validated.keyword.clone();

    let plan = plan::build_plan(
        validated,
        state.nodes.as_ref(),
        state.visibility.as_deref(),
    )
    .await?;

    let body = query::compile(&plan);
    let outcome = state.engine.search(&body).await?;

    tracing::debug!(
        keyword = %keyword,
        total = outcome.total,
        took_ms = outcome.took,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "search completed"
    );
    Ok(Json(outcome))
}
