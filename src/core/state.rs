// Application state (AppState)

use crate::core::config::Config;
use crate::metrics::collector::Metrics;
use crate::moderation::controller::ModerationController;
use std::sync::Arc;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    /// Live collections and moderation actions
    pub controller: Arc<ModerationController>,

    pub metrics: Arc<Metrics>,

    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, controller: ModerationController, metrics: Arc<Metrics>) -> Self {
        Self {
            controller: Arc::new(controller),
            metrics,
            config: Arc::new(config),
        }
    }

    pub fn admin_key(&self) -> &str {
        &self.config.admin.api_key
    }
}
