//! Opaque byte form of [`ColumnSnapshot`] for hosts that persist column positions.

use rkyv::AlignedVec;

use arbor_protocol::ColumnSnapshot;

use crate::ViewError;

pub fn encode_snapshot(snapshot: &ColumnSnapshot) -> Result<Vec<u8>, ViewError> {
    rkyv::to_bytes::<_, 256>(snapshot)
        .map(|bytes| bytes.to_vec())
        .map_err(|err| ViewError::Snapshot(format!("{:?}", err)))
}

/// Validates the archive before trusting it.
pub fn decode_snapshot(bytes: &[u8]) -> Result<ColumnSnapshot, ViewError> {
    let mut aligned = AlignedVec::with_capacity(bytes.len());
    aligned.extend_from_slice(bytes);
    let snapshot = rkyv::from_bytes::<ColumnSnapshot>(&aligned).map_err(|err| ViewError::Snapshot(format!("{:?}", err)))?;
    if snapshot.version != ColumnSnapshot::VERSION {
        return Err(ViewError::Snapshot(format!("unsupported version {}", snapshot.version)));
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_protocol::{PinnedColumn, TokenId};

    #[test]
    fn test_round_trip() {
        let snapshot = ColumnSnapshot::new(vec![
            PinnedColumn { id: TokenId::Word(1), x: 0.0, width: 60.5 },
            PinnedColumn { id: TokenId::Empty(1, 1), x: 60.5, width: 48.0 },
        ]);
        let bytes = encode_snapshot(&snapshot).unwrap();
        assert_eq!(decode_snapshot(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(decode_snapshot(&[1, 2, 3]), Err(ViewError::Snapshot(_))));
    }

    #[test]
    fn test_wrong_version_is_rejected() {
        let mut snapshot = ColumnSnapshot::new(Vec::new());
        snapshot.version = 99;
        let bytes = encode_snapshot(&snapshot).unwrap();
        assert!(decode_snapshot(&bytes).is_err());
    }
}
