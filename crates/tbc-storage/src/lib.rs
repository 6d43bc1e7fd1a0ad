//! TBC Storage Library
//!
//! The asset store seam between record handling and the media host, with a
//! Cloudinary-compatible HTTP backend and a local filesystem backend.
//!
//! # Asset addressing
//!
//! Every asset is addressed by a logical folder plus an identifier. Both
//! backends store it under `{folder}/{identifier}`, so the folder must be
//! known again at delete time. Keys must not contain `..` or a leading `/`.

#[cfg(feature = "store-cloudinary")]
pub mod cloudinary;
pub mod factory;
#[cfg(feature = "store-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "store-cloudinary")]
pub use cloudinary::CloudinaryAssetStore;
pub use factory::create_asset_store;
#[cfg(feature = "store-local")]
pub use local::LocalAssetStore;
pub use tbc_core::AssetStoreBackend;
pub use traits::{AssetStore, AssetStoreError, AssetStoreResult, DeleteFailure, StoredAsset};
