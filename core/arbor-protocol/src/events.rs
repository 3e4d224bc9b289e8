use alloc::string::String;

use crate::ids::TokenId;
use crate::model::Tree;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// A token (or one of its labels) was clicked.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct ClickEvent {
    pub token: TokenId,
    /// Label key of the clicked primitive (`FORM`, `DEPREL`, `arc`, ...).
    pub label: String,
}

/// A dragged token was released; the receiver decides how to reparent it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct DropEvent {
    pub dragged: TokenId,
    pub hovered: Option<TokenId>,
    pub is_root: bool,
}

/// The closed set of notifications exchanged with outside code.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum SentenceEvent {
    Click(ClickEvent),
    Drop(DropEvent),
    TreeUpdated(Tree),
}
