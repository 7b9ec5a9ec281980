//! Catalog synchronization core.
//!
//! A product write flows through the [`payload`] resolver, is persisted by the
//! [`repository`] in a single transaction, and is wrapped by [`sync`], which
//! owns the cleanup of the request's uploads. The [`reconciler`] sweeps the
//! upload store for files no media row references.

pub mod error;
pub mod payload;
pub mod reconciler;
pub mod repository;
pub mod sync;

pub use error::CatalogError;
pub use payload::{ProductPayload, RawPayload, ResolvedMedia, UploadedFile};
pub use reconciler::{OrphanReconciler, ReconcileReport};
pub use repository::{CatalogRepository, CategoryRecord, ProductRecord};
