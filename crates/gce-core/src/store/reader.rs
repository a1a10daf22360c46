//! Store Reader (§4.1): type-safe row extraction from the intelligence store.
//!
//! Every read here follows one rule: a missing optional table, a corrupt
//! metadata blob, or an undecodable embedding degrades to an empty
//! collection / safe default. Nothing in this module propagates an error for
//! those cases — only "the store file itself couldn't be opened" is fatal,
//! and that's surfaced as `meta.error` by the caller, not a thrown error.

use rusqlite::{Connection, OptionalExtension};
use serde_json::Value as Json;
use std::path::Path;

use crate::error::StoreError;
use crate::store::embedding::{decode_blob, decode_json_str, DecodedEmbedding};
use crate::store::rows::{
    AgentRow, FileSequenceRow, LearningDataRow, MemoryRow, NeuralPatternRow, QPatternRow,
    StoreRows, StoredEdgeRow, TrajectoryRow,
};
use crate::util::normalize_timestamp_ms;

/// The `init-warmup` sentinel memory some stores seed on first boot; filtered
/// out so it never becomes a Node (§3.3 lifecycle: "memories filter out an
/// `init-warmup` sentinel").
const INIT_WARMUP_SENTINEL: &str = "init-warmup";

/// A read-only handle onto the intelligence store.
pub struct StoreReader {
    conn: Connection,
}

impl StoreReader {
    /// Open the store read-only. This is the one call in the whole reader
    /// that can fail outright — a missing file is a genuine "no store"
    /// condition the caller needs to know about.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        )?;
        Ok(Self { conn })
    }

    /// Construct directly from an already-open connection (used by tests,
    /// which build fixtures in-memory).
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Probe the schema catalog for a table's existence. Tables the spec
    /// marks optional (`neural_patterns`, `agents`, `stats`, `kv_store`) are
    /// checked before querying; absence returns `false`, never an error.
    pub fn probe_table(&self, name: &str) -> bool {
        self.conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type='table' AND name = ?1",
                [name],
                |_| Ok(()),
            )
            .optional()
            .unwrap_or(None)
            .is_some()
    }

    /// Read every table this pipeline cares about into one [`StoreRows`].
    pub fn read_all(&self) -> StoreRows {
        StoreRows {
            memories: self.read_memories(),
            neural_patterns: if self.probe_table("neural_patterns") {
                self.read_neural_patterns()
            } else {
                Vec::new()
            },
            q_patterns: if self.probe_table("patterns") {
                self.read_q_patterns()
            } else {
                Vec::new()
            },
            trajectories: if self.probe_table("trajectories") {
                self.read_trajectories()
            } else {
                Vec::new()
            },
            file_sequences: if self.probe_table("file_sequences") {
                self.read_file_sequences()
            } else {
                Vec::new()
            },
            stored_edges: if self.probe_table("edges") {
                self.read_stored_edges()
            } else {
                Vec::new()
            },
            agents: if self.probe_table("agents") {
                self.read_agents()
            } else {
                Vec::new()
            },
            learning_data: if self.probe_table("learning_data") {
                self.read_learning_data()
            } else {
                Vec::new()
            },
        }
    }

    fn read_memories(&self) -> Vec<MemoryRow> {
        if !self.probe_table("memories") {
            return Vec::new();
        }
        let mut stmt = match self.conn.prepare(
            "SELECT id, content, memory_type, embedding, timestamp, metadata FROM memories",
        ) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("failed to prepare memories query: {e}");
                return Vec::new();
            }
        };

        let rows = stmt.query_map([], |row| {
            let id: String = row.get("id")?;
            let content: String = row.get("content")?;
            let memory_type: String = row.get::<_, Option<String>>("memory_type")?
                .unwrap_or_default();
            let embedding_bytes: Option<Vec<u8>> = row.get("embedding").ok();
            let raw_ts: Option<i64> = row.get("timestamp").ok().flatten();
            let metadata_text: Option<String> = row.get("metadata").ok().flatten();
            Ok((id, content, memory_type, embedding_bytes, raw_ts, metadata_text))
        });

        let rows = match rows {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("failed to query memories: {e}");
                return Vec::new();
            }
        };

        rows.filter_map(|r| r.ok())
            .filter(|(id, ..)| id != INIT_WARMUP_SENTINEL)
            .map(|(id, content, memory_type, embedding_bytes, raw_ts, metadata_text)| {
                MemoryRow {
                    id,
                    content,
                    memory_type,
                    embedding: embedding_bytes.as_deref().and_then(decode_blob),
                    timestamp_ms: raw_ts.and_then(normalize_timestamp_ms),
                    metadata: parse_metadata(metadata_text.as_deref()),
                }
            })
            .collect()
    }

    fn read_neural_patterns(&self) -> Vec<NeuralPatternRow> {
        let mut stmt = match self.conn.prepare(
            "SELECT id, content, category, embedding, confidence, usage, created_at, updated_at, metadata FROM neural_patterns",
        ) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("failed to prepare neural_patterns query: {e}");
                return Vec::new();
            }
        };

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>("id")?,
                row.get::<_, String>("content")?,
                row.get::<_, Option<String>>("category")?.unwrap_or_default(),
                row.get::<_, Option<Vec<u8>>>("embedding")?,
                row.get::<_, Option<f64>>("confidence")?.unwrap_or(0.0),
                row.get::<_, Option<i64>>("usage")?.unwrap_or(0),
                row.get::<_, Option<i64>>("created_at")?,
                row.get::<_, Option<i64>>("updated_at")?,
                row.get::<_, Option<String>>("metadata")?,
            ))
        });

        let rows = match rows {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("failed to query neural_patterns: {e}");
                return Vec::new();
            }
        };

        rows.filter_map(|r| r.ok())
            .map(
                |(id, content, category, embedding_bytes, confidence, usage, created_at, updated_at, metadata_text)| {
                    NeuralPatternRow {
                        id,
                        content,
                        category,
                        embedding: embedding_bytes.as_deref().and_then(decode_blob),
                        confidence,
                        usage,
                        created_at_ms: created_at.and_then(normalize_timestamp_ms),
                        updated_at_ms: updated_at.and_then(normalize_timestamp_ms),
                        metadata: parse_metadata(metadata_text.as_deref()),
                    }
                },
            )
            .collect()
    }

    fn read_q_patterns(&self) -> Vec<QPatternRow> {
        let mut stmt = match self
            .conn
            .prepare("SELECT state, action, q_value, visits, last_update FROM patterns")
        {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("failed to prepare patterns query: {e}");
                return Vec::new();
            }
        };

        let rows = stmt.query_map([], |row| {
            Ok(QPatternRow {
                state: row.get::<_, String>("state")?,
                action: row.get::<_, String>("action")?,
                q_value: row.get::<_, Option<f64>>("q_value")?.unwrap_or(0.0),
                visits: row.get::<_, Option<i64>>("visits")?.unwrap_or(0),
                last_update_ms: row
                    .get::<_, Option<i64>>("last_update")
                    .ok()
                    .flatten()
                    .and_then(normalize_timestamp_ms),
                model: None,
            })
        });

        match rows {
            Ok(r) => r.filter_map(|r| r.ok()).collect(),
            Err(e) => {
                tracing::warn!("failed to query patterns: {e}");
                Vec::new()
            }
        }
    }

    fn read_trajectories(&self) -> Vec<TrajectoryRow> {
        let mut stmt = match self.conn.prepare(
            "SELECT id, state, action, outcome, reward, timestamp FROM trajectories",
        ) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("failed to prepare trajectories query: {e}");
                return Vec::new();
            }
        };

        let rows = stmt.query_map([], |row| {
            Ok(TrajectoryRow {
                id: row.get::<_, String>("id")?,
                state: row.get::<_, String>("state")?,
                action: row.get::<_, String>("action")?,
                outcome: row.get::<_, Option<String>>("outcome")?.unwrap_or_default(),
                reward: row.get::<_, Option<f64>>("reward")?.unwrap_or(0.0),
                timestamp_ms: row
                    .get::<_, Option<i64>>("timestamp")
                    .ok()
                    .flatten()
                    .and_then(normalize_timestamp_ms),
                agent: None,
                context: None,
            })
        });

        match rows {
            Ok(r) => r.filter_map(|r| r.ok()).collect(),
            Err(e) => {
                tracing::warn!("failed to query trajectories: {e}");
                Vec::new()
            }
        }
    }

    fn read_file_sequences(&self) -> Vec<FileSequenceRow> {
        let mut stmt = match self
            .conn
            .prepare("SELECT from_file, to_file, count FROM file_sequences")
        {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("failed to prepare file_sequences query: {e}");
                return Vec::new();
            }
        };

        let rows = stmt.query_map([], |row| {
            Ok(FileSequenceRow {
                from_file: row.get::<_, String>("from_file")?,
                to_file: row.get::<_, String>("to_file")?,
                count: row.get::<_, Option<i64>>("count")?.unwrap_or(1),
            })
        });

        match rows {
            Ok(r) => r.filter_map(|r| r.ok()).collect(),
            Err(e) => {
                tracing::warn!("failed to query file_sequences: {e}");
                Vec::new()
            }
        }
    }

    fn read_stored_edges(&self) -> Vec<StoredEdgeRow> {
        let mut stmt = match self
            .conn
            .prepare("SELECT source, target, weight, data FROM edges")
        {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("failed to prepare edges query: {e}");
                return Vec::new();
            }
        };

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>("source")?,
                row.get::<_, String>("target")?,
                row.get::<_, Option<f64>>("weight")?.unwrap_or(0.5),
                row.get::<_, Option<String>>("data")?,
            ))
        });

        let rows = match rows {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("failed to query edges: {e}");
                return Vec::new();
            }
        };

        rows.filter_map(|r| r.ok())
            .map(|(source, target, weight, data_text)| {
                let data = parse_metadata(data_text.as_deref());
                // Open question (§9): `type` takes precedence over `relation`,
                // and the literal string "explicit" is the final fallback.
                let edge_type = data
                    .get("type")
                    .and_then(Json::as_str)
                    .or_else(|| data.get("relation").and_then(Json::as_str))
                    .unwrap_or("explicit")
                    .to_string();
                StoredEdgeRow {
                    source,
                    target,
                    weight,
                    edge_type,
                }
            })
            .collect()
    }

    fn read_agents(&self) -> Vec<AgentRow> {
        let mut stmt = match self.conn.prepare("SELECT name, data FROM agents") {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("failed to prepare agents query: {e}");
                return Vec::new();
            }
        };

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>("name")?,
                row.get::<_, Option<String>>("data")?,
            ))
        });

        match rows {
            Ok(r) => r
                .filter_map(|r| r.ok())
                .map(|(name, data_text)| AgentRow {
                    name,
                    data: parse_metadata(data_text.as_deref()),
                })
                .collect(),
            Err(e) => {
                tracing::warn!("failed to query agents: {e}");
                Vec::new()
            }
        }
    }

    fn read_learning_data(&self) -> Vec<LearningDataRow> {
        let mut stmt = match self
            .conn
            .prepare("SELECT algorithm, q_table FROM learning_data")
        {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("failed to prepare learning_data query: {e}");
                return Vec::new();
            }
        };

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>("algorithm")?,
                row.get::<_, Option<String>>("q_table")?,
            ))
        });

        match rows {
            Ok(r) => r
                .filter_map(|r| r.ok())
                .map(|(algorithm, q_table_text)| LearningDataRow {
                    algorithm,
                    q_table: parse_metadata(q_table_text.as_deref()),
                })
                .collect(),
            Err(e) => {
                tracing::warn!("failed to query learning_data: {e}");
                Vec::new()
            }
        }
    }

    /// The store file's modification time in milliseconds, used as half of
    /// the graph cache key. Returns `0` if stat fails (treated as "always
    /// stale", which is safe).
    pub fn mtime_ms(path: &Path) -> i64 {
        std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Parse a metadata JSON text column, with a per-row catch: a parse failure
/// (or absent column) yields the empty object rather than aborting the read.
fn parse_metadata(text: Option<&str>) -> Json {
    text.and_then(|t| serde_json::from_str(t).ok())
        .unwrap_or_else(|| Json::Object(Default::default()))
}

/// Foundation-flag inference for a memory row (§4.1, §9 open question).
///
/// `isFoundation = explicit-key ∨ source === "__ADRS__" ∨ domain ∈
/// {architecture, security}`. This rule is load-bearing for the
/// effectiveness aggregates (§9) and may over/under-count on stores with
/// different conventions — documented, not silently patched.
pub fn infer_foundation(metadata: &Json) -> bool {
    if let Some(explicit) = metadata.get("foundation").and_then(Json::as_bool) {
        if explicit {
            return true;
        }
    }
    if metadata.get("source").and_then(Json::as_str) == Some("__ADRS__") {
        return true;
    }
    matches!(
        metadata.get("domain").and_then(Json::as_str),
        Some("architecture") | Some("security")
    )
}

/// Decode an embedding that may have arrived as a JSON string instead of a
/// blob (some stores encode embeddings as text columns).
pub fn decode_embedding_text(text: &str) -> Option<DecodedEmbedding> {
    decode_json_str(text)
}
