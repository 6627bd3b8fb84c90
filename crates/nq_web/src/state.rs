use nq_core::PostStore;
use nq_sources::BlogPipeline;
use std::sync::Arc;

pub struct AppState {
    pub store: Arc<dyn PostStore>,
    pub pipeline: Arc<BlogPipeline>,
}

impl AppState {
    pub fn new(store: Arc<dyn PostStore>, pipeline: Arc<BlogPipeline>) -> Self {
        Self { store, pipeline }
    }
}
