use std::sync::Arc;

use sifter::engine::SearchEngine;
use sifter::node::NodeStore;
use sifter::visibility::VisibilityResolver;

pub mod health;
pub mod search;

/// Shared per-process services, constructed once at startup and injected into
/// every handler. Nothing here is ambient global state.
pub struct AppState {
    pub engine: Arc<dyn SearchEngine>,
    pub nodes: Arc<dyn NodeStore>,
    /// `None` disables author visibility resolution.
    pub visibility: Option<Arc<VisibilityResolver>>,
}

pub use health::ping;
pub use search::search;
