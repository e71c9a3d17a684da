use std::sync::Arc;

use switchboard::models::ToolEndpoint;
use switchboard::providers::base::ModelClient;

use crate::configuration::DeliveryMode;

/// Shared application state. Everything here is read-only after
/// startup; requests never mutate it.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn ModelClient>,
    pub tools: Arc<Vec<ToolEndpoint>>,
    pub delivery: DeliveryMode,
}

impl AppState {
    pub fn new(
        client: Arc<dyn ModelClient>,
        tools: Vec<ToolEndpoint>,
        delivery: DeliveryMode,
    ) -> Self {
        Self {
            client,
            tools: Arc::new(tools),
            delivery,
        }
    }
}
