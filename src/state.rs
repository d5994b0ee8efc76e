use std::sync::Arc;

use sqlx::SqlitePool;

use crate::assistant::AssistantClient;
use crate::services::MessageHub;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub assistant: Arc<dyn AssistantClient>,
    pub hub: MessageHub,
}

impl AppState {
    pub fn new(db: SqlitePool, assistant: Arc<dyn AssistantClient>) -> Self {
        Self {
            db,
            assistant,
            hub: MessageHub::new(),
        }
    }
}
