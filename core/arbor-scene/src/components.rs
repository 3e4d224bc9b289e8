use std::collections::BTreeMap;

use arbor_protocol::{DiffFields, PrimitiveId, Token};

/// Label key of a token's primary arc.
pub const ARC: &str = "arc";
/// Label key of a token's primary arrowhead.
pub const ARROWHEAD: &str = "arrowhead";
/// Label key of the relation text drawn with the primary arc.
pub const DEPREL: &str = "DEPREL";

/// The annotated token this entity renders (source of truth for the pass)
#[derive(Debug, Clone)]
pub struct RenderedToken {
    pub token: Token,
}

/// Horizontal placement of a token column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    /// Index in render order.
    pub position: usize,
    pub start_x: f64,
    /// Baseline of the first stacked label.
    pub start_y: f64,
    pub width: f64,
    pub center_x: f64,
}

/// Nesting depth of the token's primary arc
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcLevel(pub u32);

/// Every primitive drawn for the token, keyed by label (`FORM`, `arc`, `E:2.arc`, ...)
#[derive(Debug, Clone, Default)]
pub struct Labels {
    pub primitives: BTreeMap<String, PrimitiveId>,
}

impl Labels {
    pub fn get(&self, key: &str) -> Option<PrimitiveId> {
        self.primitives.get(key).copied()
    }
}

/// Fields that disagree with the reference tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffMarks {
    pub fields: DiffFields,
}
