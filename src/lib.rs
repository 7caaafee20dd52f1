pub mod config;
pub mod engine;
pub mod error;
pub mod node;
pub mod params;
pub mod plan;
pub mod query;
pub mod types;
pub mod visibility;

pub use config::Config;
pub use engine::{EsClient, SearchEngine, SearchHit, SearchOutcome};
pub use error::{Result, SifterError};
pub use node::{NodeFilter, NodeStore};
pub use params::{RawSearchParams, SearchParams};
pub use plan::SearchPlan;
pub use types::{MatchOperator, SortMode, SortOrder};
pub use visibility::{VisibilityRecord, VisibilityResolver};
