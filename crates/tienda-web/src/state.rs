use std::sync::Arc;

use tienda_core::ViewEngine;

use crate::{catalog::Catalog, config::Config, session::SessionStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<Catalog>,
    pub sessions: Arc<SessionStore>,
    pub views: Arc<ViewEngine>,
}

impl AppState {
    pub fn new(config: Config, catalog: Catalog) -> Self {
        let views = ViewEngine::new(config.views_root.clone());
        Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            sessions: Arc::new(SessionStore::new()),
            views: Arc::new(views),
        }
    }
}
