//! Repositories for media-backed records

pub mod podcast;
pub mod sermon;

pub use podcast::PostgresPodcastRepository;
pub use sermon::PostgresSermonRepository;
