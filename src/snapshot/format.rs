//! Snapshot document format
//!
//! A JSON object mapping each durable key to its payload as padded standard
//! base64. Keys are sorted so repeated saves of the same state are identical.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// On-disk snapshot body.
pub type SnapshotDocument = BTreeMap<String, Payload>;

/// Byte payload that serializes as a base64 string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(pub Vec<u8>);

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // A nil byte slice is written as `null`
        let Some(encoded) = Option::<String>::deserialize(deserializer)? else {
            return Ok(Payload(Vec::new()));
        };
        STANDARD
            .decode(encoded.as_bytes())
            .map(Payload)
            .map_err(serde::de::Error::custom)
    }
}
