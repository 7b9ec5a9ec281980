use std::sync::Arc;

use common::storage::UploadStore;
use sea_orm::DatabaseConnection;

use crate::catalog::{CatalogRepository, OrphanReconciler};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub uploads: Arc<dyn UploadStore>,
}

impl AppState {
    pub fn catalog(&self) -> CatalogRepository<'_> {
        CatalogRepository::new(
            &self.db,
            self.uploads.as_ref(),
            &self.config.catalog,
            self.config.storage.url_segment(),
        )
    }

    pub fn reconciler(&self) -> OrphanReconciler {
        OrphanReconciler::new(
            self.db.clone(),
            self.uploads.clone(),
            self.config.catalog.clone(),
            self.config.storage.url_segment(),
        )
    }
}
