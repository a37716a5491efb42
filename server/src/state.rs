use std::sync::Arc;

use todo_core::TodoRepository;

use crate::settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn TodoRepository>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(repository: Arc<dyn TodoRepository>, settings: Settings) -> Self {
        Self {
            repository,
            settings: Arc::new(settings),
        }
    }

    pub fn backend(&self) -> &'static str {
        self.repository.backend()
    }
}
