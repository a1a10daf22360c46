//! Embedding normalization (§4.1).
//!
//! An embedding column can hold a raw `Float32` blob, a JSON array string,
//! or (rarely) a numeric array already decoded by a driver. The reader
//! tries each representation in order and never fails the row on a
//! malformed embedding — it just reports `None`.

use crate::config::CANONICAL_EMBEDDING_DIM;

/// A decoded embedding plus its declared dimensionality.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEmbedding {
    pub vector: Vec<f32>,
    pub dim: usize,
}

impl DecodedEmbedding {
    /// True only when the embedding has exactly the canonical 384 dims.
    pub fn is_valid(&self) -> bool {
        self.dim == CANONICAL_EMBEDDING_DIM
    }
}

/// Decode an embedding column that was read as a raw blob.
///
/// Tries, in order: a little-endian `Float32` byte view (canonical form is
/// exactly `4 * 384 = 1536` bytes, but any multiple of 4 is accepted so a
/// 256-byte/64-dim variant still decodes, just flagged invalid by
/// [`DecodedEmbedding::is_valid`]), then a JSON array parse of the same
/// bytes interpreted as UTF-8 text. Returns `None` if neither succeeds.
pub fn decode_blob(bytes: &[u8]) -> Option<DecodedEmbedding> {
    if !bytes.is_empty() && bytes.len() % 4 == 0 {
        let dim = bytes.len() / 4;
        let vector: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        return Some(DecodedEmbedding { vector, dim });
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return decode_json_str(text);
    }

    None
}

/// Decode an embedding column that was read as a JSON text string.
pub fn decode_json_str(text: &str) -> Option<DecodedEmbedding> {
    let parsed: Vec<f32> = serde_json::from_str(text).ok()?;
    if parsed.is_empty() {
        return None;
    }
    let dim = parsed.len();
    Some(DecodedEmbedding {
        vector: parsed,
        dim,
    })
}

/// Zero-pad (or leave untouched) an embedding vector up to `target_dim`.
/// Used when appending to the parallel embedding array that UMAP consumes —
/// every slot in that array must have the same width.
pub fn pad_to(vector: &[f32], target_dim: usize) -> Vec<f32> {
    if vector.len() >= target_dim {
        vector[..target_dim].to_vec()
    } else {
        let mut padded = vector.to_vec();
        padded.resize(target_dim, 0.0);
        padded
    }
}
