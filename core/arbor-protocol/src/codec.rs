use core::fmt;

use alloc::string::String;

use crate::model::Tree;

/// Text interchange format for trees. The renderer never parses text itself.
pub trait SentenceCodec {
    type Error: fmt::Display;

    fn decode(&self, text: &str) -> Result<Tree, Self::Error>;
    fn encode(&self, tree: &Tree) -> String;
}
