use core::fmt;
use core::str::FromStr;

use alloc::string::{String, ToString};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use bitflags::bitflags;

use crate::ids::IdParseError;

/// A label that can be stacked in a token column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Form,
    Lemma,
    Upos,
    Xpos,
    Head,
    Deprel,
    Feats(String),
    Misc(String),
}

impl Feature {
    /// Style class applied to the label (`FEATS.Number` -> `FEATS`).
    pub fn class(&self) -> &'static str {
        match self {
            Feature::Form => "FORM",
            Feature::Lemma => "LEMMA",
            Feature::Upos => "UPOS",
            Feature::Xpos => "XPOS",
            Feature::Head => "HEAD",
            Feature::Deprel => "DEPREL",
            Feature::Feats(_) => "FEATS",
            Feature::Misc(_) => "MISC",
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, Feature::Feats(_) | Feature::Misc(_))
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Feats(key) => write!(f, "FEATS.{}", key),
            Feature::Misc(key) => write!(f, "MISC.{}", key),
            other => f.write_str(other.class()),
        }
    }
}

impl FromStr for Feature {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((group, key)) = s.split_once('.') {
            if key.is_empty() {
                return Err(IdParseError::Malformed);
            }
            return match group {
                "FEATS" => Ok(Feature::Feats(key.to_string())),
                "MISC" => Ok(Feature::Misc(key.to_string())),
                _ => Err(IdParseError::Malformed),
            };
        }
        match s {
            "FORM" => Ok(Feature::Form),
            "LEMMA" => Ok(Feature::Lemma),
            "UPOS" => Ok(Feature::Upos),
            "XPOS" => Ok(Feature::Xpos),
            "HEAD" => Ok(Feature::Head),
            "DEPREL" => Ok(Feature::Deprel),
            "" => Err(IdParseError::Empty),
            _ => Err(IdParseError::Malformed),
        }
    }
}

bitflags! {
    /// Fields compared between the current tree and a reference tree.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
    pub struct DiffFields: u8 {
        const HEAD = 1;
        const DEPREL = 2;
        const UPOS = 4;
    }
}
