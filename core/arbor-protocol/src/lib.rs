#![cfg_attr(not(test), no_std)] // Keeps the model usable from WASM hosts

extern crate alloc;

// Enable std if the feature is active (for tests/tools)
#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod codec;
pub mod events;
pub mod features;
pub mod ids;
pub mod model;
pub mod snapshot;
pub mod surface;

// Re-export core types for convenience
pub use codec::SentenceCodec;
pub use events::{ClickEvent, DropEvent, SentenceEvent};
pub use features::{DiffFields, Feature};
pub use ids::{Head, IdParseError, PrimitiveId, TokenId};
pub use model::*;
pub use snapshot::{ColumnSnapshot, PinnedColumn};
pub use surface::{BBox, PathData, Point, Segment, Surface, Transform};

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;
    use rkyv::{from_bytes, to_bytes};

    #[test]
    fn test_token_id_round_trip_text() {
        for text in ["1", "12", "3.1", "0.2", "3-4"] {
            let id: TokenId = text.parse().expect("valid id");
            assert_eq!(id.to_string(), text);
        }
        assert_eq!("".parse::<TokenId>(), Err(IdParseError::Empty));
        assert_eq!("a".parse::<TokenId>(), Err(IdParseError::Malformed));
        assert_eq!("3-".parse::<TokenId>(), Err(IdParseError::Malformed));
        assert_eq!("-3".parse::<TokenId>(), Err(IdParseError::Malformed));
    }

    #[test]
    fn test_token_id_logical_order() {
        let mut ids: vec::Vec<TokenId> = ["2", "1.1", "1-2", "1", "10", "0.1"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        ids.sort();
        let spelled: vec::Vec<_> = ids.iter().map(|id| id.to_string()).collect();
        assert_eq!(spelled, ["0.1", "1-2", "1", "1.1", "2", "10"]);
    }

    #[test]
    fn test_head_three_way() {
        assert_eq!("0".parse::<Head>(), Ok(Head::Root));
        assert_eq!("_".parse::<Head>(), Ok(Head::Unassigned));
        assert_eq!("4".parse::<Head>(), Ok(Head::Token(TokenId::Word(4))));
        assert!(!Head::Unassigned.is_assigned());
        assert!(Head::Root.is_assigned());
        assert_eq!(Head::Root.token(), None);
    }

    #[test]
    fn test_feature_labels() {
        let mut token = Token::new(TokenId::Word(1), "dogs").with_misc("SpaceAfter", "No");
        token.feats.insert("Number".to_string(), "Plur".to_string());

        assert_eq!(token.feature_label(&Feature::Form), "dogs");
        assert_eq!(token.feature_label(&"FEATS.Number".parse().unwrap()), "Number=Plur");
        assert_eq!(token.feature_label(&Feature::Feats("Case".to_string())), "");
        assert_eq!(token.feature_label(&Feature::Misc("SpaceAfter".to_string())), "SpaceAfter=No");
        assert_eq!(Feature::Misc("x".to_string()).to_string(), "MISC.x");
    }

    #[test]
    fn test_direction_flags() {
        let mut tree = Tree::from_tokens([Token::new(TokenId::Word(1), "a").with_misc("rtl", "yes")]);
        assert_eq!(tree.direction(), Direction::LeftToRight);
        tree.set_direction(Direction::RightToLeft);
        assert_eq!(tree.direction(), Direction::RightToLeft);
        assert_eq!(tree.get(&TokenId::Word(1)).unwrap().rtl_override(), Some(true));
    }

    #[test]
    fn test_root_path_data() {
        let path = PathData::new().move_to(10.0, 100.0).line_to(10.0, 0.0);
        assert_eq!(path.to_string(), "M10,100 L10,0");
        assert!(!path.has_curves());
    }

    #[test]
    fn test_snapshot_serialization() {
        let original = ColumnSnapshot::new(vec![
            PinnedColumn { id: TokenId::Word(1), x: 0.0, width: 64.5 },
            PinnedColumn { id: TokenId::Empty(1, 1), x: 64.5, width: 50.0 },
        ]);

        let bytes = to_bytes::<_, 256>(&original).expect("Failed to serialize ColumnSnapshot");
        let restored: ColumnSnapshot = from_bytes(&bytes).expect("Failed to deserialize ColumnSnapshot");

        assert_eq!(original, restored);
        assert_eq!(restored.pinned_x(&TokenId::Empty(1, 1)), Some(64.5));
    }

    #[test]
    fn test_id_layout() {
        // PrimitiveId(u64) is a zero-cost handle
        assert_eq!(core::mem::size_of::<PrimitiveId>(), 8);
    }
}
