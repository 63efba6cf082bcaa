//! Application state for the HTTP server.

use std::sync::Arc;

use crate::artifacts::ArtifactContext;
use crate::models::SupportedWindow;
use crate::registry::LifecycleManager;
use crate::services::DEFAULT_NEIGHBORHOOD_REGIONS;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Artifacts loaded at startup
    pub artifacts: Arc<ArtifactContext>,
    /// Registry access for model lookups and health
    pub lifecycle: LifecycleManager,
    /// Dates the feature table covers
    pub window: SupportedWindow,
    /// K used in neighborhood mode when the client sends none
    pub neighborhood_regions: usize,
}

impl AppState {
    pub fn new(artifacts: Arc<ArtifactContext>, lifecycle: LifecycleManager) -> Self {
        Self {
            artifacts,
            lifecycle,
            window: SupportedWindow::default(),
            neighborhood_regions: DEFAULT_NEIGHBORHOOD_REGIONS,
        }
    }

    pub fn with_window(mut self, window: SupportedWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_neighborhood_regions(mut self, k: usize) -> Self {
        self.neighborhood_regions = k;
        self
    }
}
