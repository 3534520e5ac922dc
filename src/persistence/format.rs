//! Wire-level constants and the chunk JSON schema shared by both binary
//! format variants.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Chunk, ChunkKind};

/// Magic bytes identifying the brute-force variant.
pub const MAGIC_MVEC: [u8; 4] = *b"MVEC";

/// Magic bytes identifying the proximity-graph variant.
pub const MAGIC_MHNS: [u8; 4] = *b"MHNS";

/// Current on-disk format version. Bump whenever the graph blob layout (or
/// any other wire detail) changes.
pub const FORMAT_VERSION: u16 = 1;

/// The highest format_version this build can decode.
pub const MAX_SUPPORTED_FORMAT_VERSION: u16 = FORMAT_VERSION;

/// 64-bit sign-extension of a 32-bit Java-`String.hashCode`-compatible hash
/// of `model_id`. Chosen over an independent 64-bit hash so files this crate
/// writes stay byte-compatible with readers that only know the Java
/// algorithm; see DESIGN.md for the tradeoff.
pub fn model_hash(model_id: &str) -> i64 {
    let mut h: i32 = 0;
    for c in model_id.encode_utf16() {
        h = h.wrapping_mul(31).wrapping_add(c as i32);
    }
    h as i64
}

/// The verbatim JSON shape chunks are serialized to on disk. Field names are
/// part of the wire contract and intentionally differ from `Chunk`'s Rust
/// field names (`type` not `kind`, `code` not `body`, camelCase line
/// fields).
#[derive(Serialize, Deserialize)]
pub struct ChunkJson {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ChunkKind,
    pub code: String,
    pub file: String,
    #[serde(rename = "lineStart")]
    pub line_start: u32,
    #[serde(rename = "lineEnd")]
    pub line_end: u32,
    #[serde(rename = "parentClass")]
    pub parent_class: Option<String>,
    pub metadata: HashMap<String, String>,
    pub artifact: Option<String>,
}

impl From<&Chunk> for ChunkJson {
    fn from(c: &Chunk) -> Self {
        ChunkJson {
            id: c.id.clone(),
            name: c.name.clone(),
            kind: c.kind,
            code: c.body.clone(),
            file: c.file.clone(),
            line_start: c.line_start,
            line_end: c.line_end,
            parent_class: c.parent_container.clone(),
            metadata: c.metadata.clone(),
            artifact: c.artifact.clone(),
        }
    }
}

impl From<ChunkJson> for Chunk {
    fn from(j: ChunkJson) -> Self {
        Chunk {
            id: j.id,
            name: j.name,
            kind: j.kind,
            body: j.code,
            file: j.file,
            line_start: j.line_start,
            line_end: j.line_end,
            parent_container: j.parent_class,
            metadata: j.metadata,
            artifact: j.artifact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_hash_is_deterministic() {
        assert_eq!(model_hash("test-model"), model_hash("test-model"));
        assert_ne!(model_hash("test-model"), model_hash("other-model"));
    }

    #[test]
    fn chunk_json_roundtrip_preserves_fields() {
        let c = Chunk::new(
            "id1",
            "name1",
            ChunkKind::Method,
            "fn x() {}",
            "f.rs",
            1,
            2,
            Some("Parent".to_string()),
            HashMap::new(),
        );
        let json = ChunkJson::from(&c);
        let back: Chunk = json.into();
        assert_eq!(back, c);
    }

    #[test]
    fn chunk_json_uses_wire_field_names() {
        let c = Chunk::new(
            "id1",
            "name1",
            ChunkKind::Method,
            "fn x() {}",
            "f.rs",
            1,
            2,
            None,
            HashMap::new(),
        );
        let json = ChunkJson::from(&c);
        let value = serde_json::to_value(&json).unwrap();
        assert!(value.get("type").is_some());
        assert!(value.get("code").is_some());
        assert!(value.get("lineStart").is_some());
        assert!(value.get("kind").is_none());
        assert!(value.get("body").is_none());
    }
}
