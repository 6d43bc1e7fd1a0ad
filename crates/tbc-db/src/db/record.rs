use async_trait::async_trait;
use tbc_core::models::{MediaRecord, NewRecord};
use tbc_core::AppError;

/// Persistence for one media-backed record type.
///
/// The lifecycle coordinator only talks to this trait, so tests can swap in
/// an in-memory implementation.
#[async_trait]
pub trait RecordRepository<R: MediaRecord>: Send + Sync {
    async fn insert(&self, record: NewRecord<R>) -> Result<R, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<R>, AppError>;

    /// Write every field of `record` (including asset references) in one
    /// transaction. Returns `NotFound` if the row disappeared meanwhile.
    async fn update(&self, record: &R) -> Result<R, AppError>;

    /// Returns false when no row matched.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<R>, AppError>;
}
