// src/state.rs
use std::sync::Arc;

use crate::services::backend::AnalysisBackend;
use crate::services::persistence::LocalStore;
use crate::services::uploader::ProgressSettings;

pub type SharedState = Arc<AppState>;

/// Long-lived collaborators shared by the controller and its spawned requests.
pub struct AppState {
    pub backend: Arc<dyn AnalysisBackend>,
    pub store: LocalStore,
    pub progress: ProgressSettings,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn AnalysisBackend>,
        store: LocalStore,
        progress: ProgressSettings,
    ) -> Self {
        Self {
            backend,
            store,
            progress,
        }
    }
}
