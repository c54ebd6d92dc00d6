use std::sync::Arc;

use crate::cart::CartStore;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub cart: Arc<dyn CartStore>,
}

impl AppState {
    pub fn new(config: AppConfig, cart: Arc<dyn CartStore>) -> Self {
        Self {
            config: Arc::new(config),
            cart,
        }
    }
}
