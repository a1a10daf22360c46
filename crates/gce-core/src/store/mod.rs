//! Store Reader (§4.1) — type-safe, defaulting access to the intelligence
//! store's tables, plus the embedding/timestamp/metadata normalizations
//! every downstream builder relies on.

mod embedding;
mod reader;
mod rows;

pub use embedding::{decode_blob, pad_to, DecodedEmbedding};
pub use reader::{infer_foundation, StoreReader};
pub use rows::{
    AgentRow, FileSequenceRow, LearningDataRow, MemoryRow, NeuralPatternRow, QPatternRow,
    StoreRows, StoredEdgeRow, TrajectoryRow,
};
