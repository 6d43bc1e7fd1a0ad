//! Data models for the application
//!
//! Users own media-backed records (podcasts and sermons). A media-backed
//! record is any entity with a fixed set of asset slots; `MediaRecord`
//! describes that shape so the lifecycle coordinator and repositories can be
//! written once for every record type.

mod pagination;
mod podcast;
mod sermon;
mod user;

use std::collections::BTreeMap;
use std::fmt::Debug;

use validator::Validate;

use crate::error::AppError;
use crate::media::{AssetSlot, MediaAsset};

pub use pagination::*;
pub use podcast::*;
pub use sermon::*;
pub use user::*;

/// A partial update. Every field is optional; an update must set at least one.
pub trait RecordPatch: Validate {
    fn is_empty(&self) -> bool;
}

/// Domain entity that owns one remote asset per slot.
pub trait MediaRecord: Clone + Send + Sync + 'static {
    /// First segment of the logical folder assets are grouped under.
    const RECORD_TYPE: &'static str;
    const SLOTS: &'static [AssetSlot];

    /// Plain (non-asset) fields supplied on create.
    type Fields: Validate + Clone + Debug + Send + Sync;
    type Patch: RecordPatch + Debug + Send + Sync;

    fn id(&self) -> i64;
    fn owner_id(&self) -> i64;
    fn asset(&self, slot: &str) -> Option<&MediaAsset>;
    fn asset_mut(&mut self, slot: &str) -> Option<&mut MediaAsset>;
    fn apply_patch(&mut self, patch: Self::Patch);

    fn slot(name: &str) -> Option<AssetSlot> {
        Self::SLOTS.iter().find(|slot| slot.name == name).copied()
    }

    /// Assets in slot order.
    fn assets(&self) -> Vec<(AssetSlot, &MediaAsset)> {
        Self::SLOTS
            .iter()
            .filter_map(|slot| self.asset(slot.name).map(|asset| (*slot, asset)))
            .collect()
    }
}

/// A record that has its assets uploaded but is not yet persisted.
#[derive(Debug, Clone)]
pub struct NewRecord<R: MediaRecord> {
    pub owner_id: i64,
    pub fields: R::Fields,
    pub assets: BTreeMap<&'static str, MediaAsset>,
}

impl<R: MediaRecord> NewRecord<R> {
    pub fn asset(&self, slot: &AssetSlot) -> Result<&MediaAsset, AppError> {
        self.assets.get(slot.name).ok_or_else(|| {
            AppError::Internal(format!(
                "{} is missing its {} asset",
                R::RECORD_TYPE,
                slot.name
            ))
        })
    }
}
