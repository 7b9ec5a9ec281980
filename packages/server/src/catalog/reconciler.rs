use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use common::storage::{StorageError, UploadStore};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::error::CatalogError;
use super::repository::CatalogRepository;
use crate::config::CatalogConfig;

/// Outcome of one orphan sweep.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Filenames deleted from the upload store.
    #[schema(example = json!(["chair-1700000000000-42.png"]))]
    pub removed: Vec<String>,
    #[schema(example = 1)]
    pub total_removed: usize,
}

/// Deletes upload store files that no product media references.
///
/// A file written by a request whose transaction has not committed yet looks
/// exactly like an orphan. `reconcile_grace_secs` skips files younger than the
/// grace period; with the default of zero that race is accepted.
#[derive(Clone)]
pub struct OrphanReconciler {
    db: DatabaseConnection,
    uploads: Arc<dyn UploadStore>,
    config: CatalogConfig,
    url_segment: String,
}

impl OrphanReconciler {
    pub fn new(
        db: DatabaseConnection,
        uploads: Arc<dyn UploadStore>,
        config: CatalogConfig,
        url_segment: impl Into<String>,
    ) -> Self {
        Self {
            db,
            uploads,
            config,
            url_segment: url_segment.into(),
        }
    }

    pub async fn reconcile(&self) -> Result<ReconcileReport, CatalogError> {
        let repo = CatalogRepository::new(
            &self.db,
            self.uploads.as_ref(),
            &self.config,
            self.url_segment.as_str(),
        );

        let on_disk = self.uploads.list().await?;
        let sources = repo.media_sources().await?;
        let referenced: HashSet<&str> = sources
            .iter()
            .filter_map(|src| repo.stored_filename(src))
            .collect();

        let grace = Duration::from_secs(self.config.reconcile_grace_secs);
        let mut removed = Vec::new();

        for filename in on_disk {
            if referenced.contains(filename.as_str()) {
                continue;
            }
            if !grace.is_zero() && self.is_recent(&filename, grace).await {
                debug!(filename, "Skipping unreferenced upload inside grace period");
                continue;
            }

            match self.uploads.delete(&filename).await {
                Ok(true) => removed.push(filename),
                Ok(false) => {}
                Err(e) => warn!(filename, error = %e, "Failed to remove orphaned upload"),
            }
        }

        Ok(ReconcileReport {
            total_removed: removed.len(),
            removed,
        })
    }

    async fn is_recent(&self, filename: &str, grace: Duration) -> bool {
        match self.uploads.modified(filename).await {
            Ok(modified) => SystemTime::now()
                .duration_since(modified)
                .map(|age| age < grace)
                .unwrap_or(true),
            Err(StorageError::NotFound(_)) => true,
            Err(e) => {
                warn!(filename, error = %e, "Failed to read upload metadata");
                true
            }
        }
    }
}

/// Run the orphan sweep as a background task.
pub async fn run_reconcile_loop(reconciler: OrphanReconciler, every: Duration) {
    info!(interval_secs = every.as_secs(), "Starting orphan upload reconciler");

    let mut interval = tokio::time::interval(every);

    loop {
        interval.tick().await;

        match reconciler.reconcile().await {
            Ok(report) if report.total_removed > 0 => {
                info!(total_removed = report.total_removed, "Removed orphaned uploads");
            }
            Ok(_) => debug!("No orphaned uploads found"),
            Err(e) => error!(error = %e, "Orphan upload sweep failed"),
        }
    }
}
