//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::clients::RoutingProvider;
use crate::config::environment::EnvironmentConfig;
use crate::repositories::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub routing: Arc<dyn RoutingProvider>,
    pub config: Arc<EnvironmentConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        routing: Arc<dyn RoutingProvider>,
        config: EnvironmentConfig,
    ) -> Self {
        Self {
            store,
            routing,
            config: Arc::new(config),
        }
    }
}
