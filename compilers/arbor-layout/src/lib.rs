//! Geometry of a rendered dependency tree: arc levels, token columns, and edge paths.

pub mod geometry;
pub mod graph;
pub mod levels;
pub mod metrics;

#[cfg(test)]
pub(crate) mod testing;

use arbor_protocol::TokenId;
use thiserror::Error;

pub use geometry::{draw_enhanced_relations, draw_relations, Edge};
pub use graph::{validate_tree, GovernorGraph};
pub use levels::{assign_levels, governor_positions};
pub use metrics::{baseline_y, canvas_bounds, column_snapshot, place_tokens, CanvasBounds};

/// Baseline of the first label row when no arc needs room above it.
pub const START_TEXT_Y: f64 = 10.0;
/// Height reserved for one label, used to find the top edge of a column.
pub const FONT_HEIGHT: f64 = 18.0;
pub const ARROWHEAD_SIZE: f64 = 5.0;
/// Horizontal gap between arcs meeting at a governor; half is applied per side.
pub const GAP_X: f64 = 18.0;
/// Arc room reserved above the row even for flat trees.
pub const MIN_LEVELS: u32 = 2;
pub const FALLBACK_HEIGHT: f64 = 1000.0;
pub const CANVAS_MARGIN: f64 = 15.0;
pub const ROOT_LABEL_OFFSET_X: f64 = 20.0;
pub const ROOT_LABEL_Y: f64 = 30.0;
/// Distance between the lowest rendered primitive and secondary arcs.
pub const ENHANCED_OFFSET_Y: f64 = 14.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("token {token} is governed by {head}, which is not in the tree")]
    DanglingHead { token: TokenId, head: TokenId },
    #[error("token {token} lies on a governor cycle")]
    Cycle { token: TokenId },
}

/// Spacing knobs of a render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Added to the widest label of a column.
    pub token_spacing: f64,
    /// Distance between stacked labels.
    pub features_vertical_spacing: f64,
    /// Height of one arc level.
    pub arc_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            token_spacing: 40.0,
            features_vertical_spacing: 20.0,
            arc_height: 60.0,
        }
    }
}
