pub mod media_lifecycle;

pub use media_lifecycle::{AssetFile, AssetFiles, LifecycleError, RecordCoordinator};
