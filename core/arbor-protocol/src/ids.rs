use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize)]
        #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
        #[archive(check_bytes)]
        #[repr(transparent)] // Ensure it has the same layout as u64
        pub struct $name(pub u64);

        impl $name {
            pub const fn new(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }
    };
}

define_id!(PrimitiveId, "Handle to a primitive created on a drawing surface.");

/// Identifier of a token inside one sentence.
///
/// `Word(3)` is `"3"`, `Empty(3, 1)` is the virtual node `"3.1"` and
/// `Group(3, 4)` is the multiword range `"3-4"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[archive(check_bytes)]
pub enum TokenId {
    Word(u32),
    Empty(u32, u32),
    Group(u32, u32),
}

impl TokenId {
    // Groups open before their first word; empty nodes follow the word they hang off.
    fn sort_key(&self) -> (u32, u8, u32) {
        match *self {
            Self::Group(start, end) => (start, 0, end),
            Self::Word(index) => (index, 1, 0),
            Self::Empty(index, sub) => (index, 2, sub),
        }
    }
}

impl Ord for TokenId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for TokenId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word(index) => write!(f, "{}", index),
            Self::Empty(index, sub) => write!(f, "{}.{}", index, sub),
            Self::Group(start, end) => write!(f, "{}-{}", start, end),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdParseError {
    Empty,
    Malformed,
}

impl fmt::Display for IdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdParseError::Empty => write!(f, "empty token identifier"),
            IdParseError::Malformed => write!(f, "malformed token identifier"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for IdParseError {}

fn parse_index(text: &str) -> Result<u32, IdParseError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IdParseError::Malformed);
    }
    text.parse().map_err(|_| IdParseError::Malformed)
}

impl FromStr for TokenId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdParseError::Empty);
        }
        if let Some((start, end)) = s.split_once('-') {
            return Ok(Self::Group(parse_index(start)?, parse_index(end)?));
        }
        if let Some((index, sub)) = s.split_once('.') {
            return Ok(Self::Empty(parse_index(index)?, parse_index(sub)?));
        }
        Ok(Self::Word(parse_index(s)?))
    }
}

/// The governor of a token.
///
/// Root and "not attached yet" are distinct states; only `Token` points at another token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize)]
#[archive(check_bytes)]
pub enum Head {
    Root,
    Unassigned,
    Token(TokenId),
}

impl Head {
    pub fn token(&self) -> Option<TokenId> {
        match self {
            Head::Token(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        !matches!(self, Head::Unassigned)
    }
}

impl Default for Head {
    fn default() -> Self {
        Head::Unassigned
    }
}

impl From<TokenId> for Head {
    fn from(id: TokenId) -> Self {
        Head::Token(id)
    }
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Head::Root => write!(f, "0"),
            Head::Unassigned => write!(f, "_"),
            Head::Token(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for Head {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "_" => Ok(Head::Unassigned),
            "0" => Ok(Head::Root),
            other => other.parse().map(Head::Token),
        }
    }
}

// Identifiers travel as their interchange spelling so they can key JSON maps.
#[cfg(feature = "serde")]
mod serde_impls {
    use super::{Head, TokenId};
    use alloc::string::String;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for TokenId {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for TokenId {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let text = String::deserialize(deserializer)?;
            text.parse().map_err(D::Error::custom)
        }
    }

    impl Serialize for Head {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for Head {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let text = String::deserialize(deserializer)?;
            text.parse().map_err(D::Error::custom)
        }
    }
}
