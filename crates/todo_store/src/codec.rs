//! Snapshot encoding.
//!
//! A snapshot is a small fixed header followed by a CBOR body:
//!
//! ```text
//! | magic "TDSN" (4) | version u16 LE (2) | CBOR body ... |
//! ```
//!
//! The body lists pages and items in insertion order, so reloading a
//! snapshot reproduces the listing order of the store that wrote it.

use crate::collection::SequenceNumber;
use crate::error::{StoreError, StoreResult};
use crate::model::{Item, Page};
use serde::{Deserialize, Serialize};

/// Magic bytes for snapshot files.
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"TDSN";

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u16 = 1;

const HEADER_LEN: usize = SNAPSHOT_MAGIC.len() + 2;

/// Serializable image of the whole store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Next sequence number to assign.
    pub next_sequence: SequenceNumber,
    /// Pages in insertion order.
    pub pages: Vec<Page>,
    /// Items in insertion order.
    pub items: Vec<Item>,
}

impl Snapshot {
    /// Encodes the snapshot to bytes.
    pub fn encode(&self) -> StoreResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(HEADER_LEN + 64 * (self.pages.len() + self.items.len()));
        buf.extend_from_slice(&SNAPSHOT_MAGIC);
        buf.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        ciborium::into_writer(self, &mut buf).map_err(|e| StoreError::codec(e.to_string()))?;
        Ok(buf)
    }

    /// Decodes a snapshot from bytes.
    pub fn decode(data: &[u8]) -> StoreResult<Self> {
        if data.len() < HEADER_LEN {
            return Err(StoreError::corrupted("snapshot too short"));
        }

        if data[0..4] != SNAPSHOT_MAGIC {
            return Err(StoreError::corrupted("invalid snapshot magic"));
        }

        let version = u16::from_le_bytes([data[4], data[5]]);
        if version != SNAPSHOT_VERSION {
            return Err(StoreError::corrupted(format!(
                "unsupported snapshot version {version}"
            )));
        }

        ciborium::from_reader(&data[HEADER_LEN..])
            .map_err(|e| StoreError::corrupted(format!("invalid snapshot body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::EntityId;
    use crate::model::ItemData;

    fn sample() -> Snapshot {
        let mut page = Page::new();
        let first = Item::new(page.id, ItemData::new("Buy milk", false));
        let second = Item::new(page.id, ItemData::new("Walk dog", true));
        page.items = vec![first.id, second.id];
        Snapshot {
            next_sequence: 3,
            pages: vec![page],
            items: vec![first, second],
        }
    }

    #[test]
    fn encode_starts_with_header() {
        let bytes = sample().encode().unwrap();
        assert_eq!(&bytes[0..4], b"TDSN");
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), SNAPSHOT_VERSION);
    }

    #[test]
    fn decode_restores_order_and_fields() {
        let snapshot = sample();
        let decoded = Snapshot::decode(&snapshot.encode().unwrap()).unwrap();
        assert_eq!(decoded, snapshot);
        assert_eq!(decoded.items[0].text, "Buy milk");
        assert!(decoded.items[1].done);
    }

    #[test]
    fn empty_snapshot() {
        let decoded = Snapshot::decode(&Snapshot::default().encode().unwrap()).unwrap();
        assert!(decoded.pages.is_empty());
        assert!(decoded.items.is_empty());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = sample().encode().unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            Snapshot::decode(&bytes),
            Err(StoreError::Corrupted { .. })
        ));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut bytes = sample().encode().unwrap();
        bytes[4..6].copy_from_slice(&99u16.to_le_bytes());
        assert!(matches!(
            Snapshot::decode(&bytes),
            Err(StoreError::Corrupted { .. })
        ));
    }

    #[test]
    fn rejects_truncated() {
        assert!(Snapshot::decode(b"TDS").is_err());
        let bytes = sample().encode().unwrap();
        assert!(Snapshot::decode(&bytes[..bytes.len() - 4]).is_err());
    }

    #[test]
    fn rejects_malformed_identifier() {
        #[derive(Serialize)]
        struct RawPage {
            _id: &'static str,
            items: Vec<EntityId>,
        }
        #[derive(Serialize)]
        struct RawSnapshot {
            next_sequence: u64,
            pages: Vec<RawPage>,
            items: Vec<Item>,
        }

        let raw = RawSnapshot {
            next_sequence: 1,
            pages: vec![RawPage {
                _id: "short",
                items: vec![],
            }],
            items: vec![],
        };
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&SNAPSHOT_MAGIC);
        bytes.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        ciborium::into_writer(&raw, &mut bytes).unwrap();

        assert!(matches!(
            Snapshot::decode(&bytes),
            Err(StoreError::Corrupted { .. })
        ));
    }
}
