//! TBC Core Library
//!
//! Domain models, error types, configuration and the media naming rules
//! shared by the storage, database and API crates.

pub mod config;
pub mod error;
pub mod media;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{AssetStoreConfig, BaseConfig, Config, MediaConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use media::{
    derive_identifier, logical_folder, AllowedExtensions, AssetSlot, MediaAsset, MediaKind,
    UnsupportedMediaType,
};
pub use storage_types::AssetStoreBackend;
