use alloc::vec::Vec;

use rkyv::{Archive, Deserialize, Serialize};

use crate::ids::TokenId;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

#[derive(Debug, Clone, Copy, PartialEq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct PinnedColumn {
    pub id: TokenId,
    pub x: f64,
    pub width: f64,
}

/// Column positions kept from an earlier render so re-renders do not shift columns.
#[derive(Debug, Clone, PartialEq, Default, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct ColumnSnapshot {
    pub version: u32,
    pub columns: Vec<PinnedColumn>,
}

impl ColumnSnapshot {
    pub const VERSION: u32 = 1;

    pub fn new(columns: Vec<PinnedColumn>) -> Self {
        Self {
            version: Self::VERSION,
            columns,
        }
    }

    pub fn pinned_x(&self, id: &TokenId) -> Option<f64> {
        self.columns.iter().find(|c| c.id == *id).map(|c| c.x)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
