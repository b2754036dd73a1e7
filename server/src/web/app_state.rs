use std::sync::Arc;
use std::time::Instant;

use crate::banner::RenderContext;

/// Shared state for all HTTP handlers.
pub struct AppState<S> {
    pub render: Arc<RenderContext<S>>,
    /// Process start, for `/health`.
    pub started: Instant,
}

impl<S> AppState<S> {
    pub fn new(render: Arc<RenderContext<S>>) -> Self {
        Self {
            render,
            started: Instant::now(),
        }
    }
}
