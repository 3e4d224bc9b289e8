use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use rkyv::{Archive, Deserialize, Serialize};

use crate::features::Feature;
use crate::ids::{Head, TokenId};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Interchange spelling of an unset value.
pub const PLACEHOLDER: &str = "_";

/// True for values that carry no annotation (`""` or `"_"`).
pub fn is_placeholder(value: &str) -> bool {
    value.is_empty() || value == PLACEHOLDER
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum Direction {
    LeftToRight = 0,
    RightToLeft = 1,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct Token {
    pub id: TokenId,
    pub form: String,
    pub lemma: String,
    pub upos: String,
    pub xpos: String,
    pub feats: BTreeMap<String, String>,
    pub head: Head,
    pub deprel: String,
    /// Secondary governors and their relation labels.
    pub deps: BTreeMap<Head, String>,
    pub misc: BTreeMap<String, String>,
}

impl Token {
    pub fn new(id: TokenId, form: impl Into<String>) -> Self {
        Self {
            id,
            form: form.into(),
            lemma: PLACEHOLDER.to_string(),
            upos: PLACEHOLDER.to_string(),
            xpos: PLACEHOLDER.to_string(),
            feats: BTreeMap::new(),
            head: Head::Unassigned,
            deprel: PLACEHOLDER.to_string(),
            deps: BTreeMap::new(),
            misc: BTreeMap::new(),
        }
    }

    pub fn with_head(mut self, head: impl Into<Head>, deprel: impl Into<String>) -> Self {
        self.head = head.into();
        self.deprel = deprel.into();
        self
    }

    pub fn with_upos(mut self, upos: impl Into<String>) -> Self {
        self.upos = upos.into();
        self
    }

    pub fn with_misc(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.misc.insert(key.into(), value.into());
        self
    }

    /// Per-token direction override carried in `MISC.rtl` (`yes` / `no` / unset).
    pub fn rtl_override(&self) -> Option<bool> {
        match self.misc.get("rtl").map(String::as_str) {
            Some("yes") => Some(true),
            Some("no") => Some(false),
            _ => None,
        }
    }

    pub fn highlight(&self) -> Option<&str> {
        self.misc
            .get("highlight")
            .map(String::as_str)
            .filter(|colour| !is_placeholder(colour))
    }

    /// Text shown for `feature` in this token's column. Absent nested features render empty.
    pub fn feature_label(&self, feature: &Feature) -> String {
        match feature {
            Feature::Form => self.form.clone(),
            Feature::Lemma => self.lemma.clone(),
            Feature::Upos => self.upos.clone(),
            Feature::Xpos => self.xpos.clone(),
            Feature::Head => self.head.to_string(),
            Feature::Deprel => self.deprel.clone(),
            Feature::Feats(key) => self
                .feats
                .get(key)
                .map(|value| format!("{}={}", key, value))
                .unwrap_or_default(),
            Feature::Misc(key) => self
                .misc
                .get(key)
                .map(|value| format!("{}={}", key, value))
                .unwrap_or_default(),
        }
    }
}

/// One annotated sentence.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct Tree {
    pub tokens: BTreeMap<TokenId, Token>,
    pub meta: BTreeMap<String, String>,
    /// Raw comment lines (`# ...`) in source order, `meta` entries included.
    pub comments: Vec<String>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: impl IntoIterator<Item = Token>) -> Self {
        let mut tree = Self::new();
        for token in tokens {
            tree.insert(token);
        }
        tree
    }

    pub fn insert(&mut self, token: Token) {
        self.tokens.insert(token.id, token);
    }

    pub fn get(&self, id: &TokenId) -> Option<&Token> {
        self.tokens.get(id)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn direction(&self) -> Direction {
        match self.meta.get("rtl").map(String::as_str) {
            Some("yes") => Direction::RightToLeft,
            _ => Direction::LeftToRight,
        }
    }

    pub fn set_direction(&mut self, direction: Direction) {
        match direction {
            Direction::RightToLeft => self.meta.insert("rtl".to_string(), "yes".to_string()),
            Direction::LeftToRight => self.meta.remove("rtl"),
        };
    }

    /// Tokens in logical order, optionally with empty nodes and multiword groups.
    pub fn tokens_in_order(&self, with_empty: bool, with_groups: bool) -> impl Iterator<Item = &Token> {
        self.tokens.values().filter(move |token| match token.id {
            TokenId::Word(_) => true,
            TokenId::Empty(..) => with_empty,
            TokenId::Group(..) => with_groups,
        })
    }

    /// Every feature some token carries: `FORM`, `UPOS`, `LEMMA`, then FEATS and MISC keys.
    pub fn all_features(&self) -> Vec<Feature> {
        let mut features = alloc::vec![Feature::Form, Feature::Upos, Feature::Lemma];
        let mut feats: Vec<&String> = self.tokens.values().flat_map(|t| t.feats.keys()).collect();
        feats.sort();
        feats.dedup();
        let mut misc: Vec<&String> = self.tokens.values().flat_map(|t| t.misc.keys()).collect();
        misc.sort();
        misc.dedup();
        features.extend(feats.into_iter().map(|key| Feature::Feats(key.clone())));
        features.extend(misc.into_iter().map(|key| Feature::Misc(key.clone())));
        features
    }
}
