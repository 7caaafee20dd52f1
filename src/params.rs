use serde::Deserialize;

use crate::engine::SearchEngine;
use crate::error::{Result, SifterError};
use crate::types::{MatchOperator, SortMode, SortOrder};

pub const SIZE_DEFAULT: i64 = 10;
pub const SIZE_MAX: i64 = 50;
pub const PAGING_DEPTH_MAX: i64 = 1000;
pub const KEYWORD_LENGTH_MAX: usize = 100;
pub const CLAUSE_COUNT_MAX: usize = 30;

fn default_size() -> i64 {
    SIZE_DEFAULT
}

fn default_sort() -> String {
    "sumup".to_string()
}

fn default_operator() -> String {
    "or".to_string()
}

/// Raw query-string shape. Unknown fields are ignored, absent fields take
/// the documented defaults. Nothing here is trusted until `validate` runs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub from: i64,
    #[serde(default = "default_size")]
    pub size: i64,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub gte: Option<i64>,
    #[serde(default)]
    pub lte: Option<i64>,
    #[serde(default)]
    pub node: String,
    #[serde(default = "default_operator")]
    pub operator: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Validated, typed search parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub keyword: String,
    pub from: i64,
    pub size: i64,
    pub sort: SortMode,
    pub order: SortOrder,
    pub gte: Option<i64>,
    pub lte: Option<i64>,
    pub node: String,
    pub operator: MatchOperator,
    pub username: Option<String>,
}

/// Runs every bounds check on the raw params, in a fixed order, each failure
/// mapping to its own error kind. The final check round-trips the keyword
/// through the engine's analyzer to bound query cost; all earlier checks are
/// local and short-circuit before that call.
pub async fn validate(raw: RawSearchParams, engine: &dyn SearchEngine) -> Result<SearchParams> {
    let shaped = validate_shape(raw)?;

    let count = match engine.analyze(&shaped.keyword).await {
        Ok(count) => count,
        Err(err) => {
            tracing::error!(error = %err, "keyword analysis failed");
            return Err(SifterError::AnalyzeFailed);
        }
    };
    if count > CLAUSE_COUNT_MAX {
        return Err(SifterError::TooManyClauses {
            count,
            max: CLAUSE_COUNT_MAX,
        });
    }

    Ok(shaped)
}

/// The local (engine-free) part of validation.
fn validate_shape(raw: RawSearchParams) -> Result<SearchParams> {
    if raw.q.is_empty() {
        return Err(SifterError::MissingKeyword);
    }
    if raw.q.chars().count() > KEYWORD_LENGTH_MAX {
        return Err(SifterError::KeywordTooLong {
            max: KEYWORD_LENGTH_MAX,
        });
    }
    let sort =
        SortMode::parse(&raw.sort).ok_or_else(|| SifterError::InvalidSort(raw.sort.clone()))?;
    let order = SortOrder::parse(raw.order).ok_or(SifterError::InvalidOrder(raw.order))?;
    let operator = MatchOperator::parse(&raw.operator)
        .ok_or_else(|| SifterError::InvalidOperator(raw.operator.clone()))?;
    if raw.from < 0 {
        return Err(SifterError::InvalidFrom(raw.from));
    }
    if raw.size < 0 {
        return Err(SifterError::InvalidSize(raw.size));
    }
    // checked_add: a huge `from` must fail this check, not wrap around it.
    if raw
        .from
        .checked_add(raw.size)
        .map_or(true, |total| total > PAGING_DEPTH_MAX)
    {
        return Err(SifterError::PagingTooDeep {
            max: PAGING_DEPTH_MAX,
        });
    }
    if raw.size > SIZE_MAX {
        return Err(SifterError::SizeTooLarge { max: SIZE_MAX });
    }

    Ok(SearchParams {
        keyword: raw.q,
        from: raw.from,
        size: raw.size,
        sort,
        order,
        gte: raw.gte,
        lte: raw.lte,
        node: raw.node,
        operator,
        username: raw.username,
    })
}
