//! Typed row shapes read from the intelligence store (§6.1).
//!
//! These are intentionally close to the raw table columns; normalization
//! (timestamps, embeddings, metadata parsing) happens in [`super::reader`]
//! on the way from SQL row to these structs, so nothing downstream has to
//! deal with unit ambiguity or malformed JSON again.

use crate::store::embedding::DecodedEmbedding;
use serde_json::Value as Json;

/// A row from `memories`.
#[derive(Debug, Clone)]
pub struct MemoryRow {
    pub id: String,
    pub content: String,
    pub memory_type: String,
    pub embedding: Option<DecodedEmbedding>,
    pub timestamp_ms: Option<i64>,
    pub metadata: Json,
}

/// A row from `neural_patterns` (optional table).
#[derive(Debug, Clone)]
pub struct NeuralPatternRow {
    pub id: String,
    pub content: String,
    pub category: String,
    pub embedding: Option<DecodedEmbedding>,
    pub confidence: f64,
    pub usage: i64,
    pub created_at_ms: Option<i64>,
    pub updated_at_ms: Option<i64>,
    pub metadata: Json,
}

/// A row from `patterns` — the learner's Q-table.
#[derive(Debug, Clone)]
pub struct QPatternRow {
    pub state: String,
    pub action: String,
    pub q_value: f64,
    pub visits: i64,
    pub last_update_ms: Option<i64>,
    pub model: Option<String>,
}

/// A row from `trajectories`.
#[derive(Debug, Clone)]
pub struct TrajectoryRow {
    pub id: String,
    pub state: String,
    pub action: String,
    pub outcome: String,
    pub reward: f64,
    pub timestamp_ms: Option<i64>,
    pub agent: Option<String>,
    pub context: Option<String>,
}

/// A row from `file_sequences`.
#[derive(Debug, Clone)]
pub struct FileSequenceRow {
    pub from_file: String,
    pub to_file: String,
    pub count: i64,
}

/// A row from `edges` — database-authored relations (§4.4 step 1).
#[derive(Debug, Clone)]
pub struct StoredEdgeRow {
    pub source: String,
    pub target: String,
    pub weight: f64,
    /// Either `type` or `relation` from the `data` JSON blob; precedence is
    /// `type`, then `relation`, then the literal string `"explicit"` (an
    /// open question in §9, resolved here and recorded in DESIGN.md).
    pub edge_type: String,
}

/// A row from `agents` (optional table; also synthesized from Q-table weights
/// when absent — see [`crate::node::builder`]).
#[derive(Debug, Clone)]
pub struct AgentRow {
    pub name: String,
    pub data: Json,
}

/// A row from `learning_data` — the combined RL state blob.
#[derive(Debug, Clone)]
pub struct LearningDataRow {
    pub algorithm: String,
    pub q_table: Json,
}

/// Everything the Store Reader produces in one pass.
#[derive(Debug, Clone, Default)]
pub struct StoreRows {
    pub memories: Vec<MemoryRow>,
    pub neural_patterns: Vec<NeuralPatternRow>,
    pub q_patterns: Vec<QPatternRow>,
    pub trajectories: Vec<TrajectoryRow>,
    pub file_sequences: Vec<FileSequenceRow>,
    pub stored_edges: Vec<StoredEdgeRow>,
    pub agents: Vec<AgentRow>,
    pub learning_data: Vec<LearningDataRow>,
}
