use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::config::AppConfig;
use crate::controller::{SharedSession, SubmissionController};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub session: SharedSession,
    pub controller: Arc<SubmissionController>,
    pub shutdown_sender: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl AppState {
    /// Token efectivo: el de la URL de la página o, si no hay, el configurado.
    pub fn token(&self, from_page: Option<String>) -> Option<String> {
        from_page
            .filter(|t| !t.is_empty())
            .or_else(|| self.config.api_token.clone())
    }
}
