//! Database repositories for data access layer
//!
//! Repositories are organized into control/ (user accounts) and media/
//! (podcasts, sermons and their asset references).
//
// Account repositories
pub mod control;
//
// Media-backed record repositories
pub mod media;
//
// Repository seam used by the lifecycle coordinator
pub mod record;
//
// Transaction utilities
pub mod transaction;

pub use control::UserRepository;
pub use media::{PostgresPodcastRepository, PostgresSermonRepository};
pub use record::RecordRepository;
pub use transaction::with_transaction;
