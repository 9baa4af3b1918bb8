use std::sync::Arc;

use crate::{
    config::Config, repositories::ServiceRequestRepository, services::TransitionService,
};

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn ServiceRequestRepository>,
    pub config: Config,
}

impl AppState {
    pub fn new(repository: Arc<dyn ServiceRequestRepository>, config: Config) -> Self {
        Self { repository, config }
    }

    pub fn transitions(&self) -> TransitionService {
        TransitionService::new(self.repository.clone(), self.config.time_zone)
    }
}
