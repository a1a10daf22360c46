//! Builds an on-disk SQLite store matching the schema the Store Reader
//! consumes, so scenario tests exercise the real reader rather than
//! fixture `StoreRows` structs directly.

use rusqlite::Connection;
use tempfile::TempDir;

/// Holds the fixture's `TempDir` alive for the test's duration (dropping it
/// deletes the backing file) and the path `gce_core` should open.
pub struct TestStore {
    _dir: TempDir,
    pub path: std::path::PathBuf,
}

/// A builder that accumulates SQL inserts and materializes them into a
/// fresh SQLite file on [`build`](StoreBuilder::build).
#[derive(Default)]
pub struct StoreBuilder {
    memories: Vec<(String, String, String, Option<Vec<u8>>, Option<i64>, String)>,
    q_patterns: Vec<(String, String, f64, i64, Option<i64>)>,
    trajectories: Vec<(String, String, String, String, f64, Option<i64>)>,
    file_sequences: Vec<(String, String, i64)>,
    edges: Vec<(String, String, f64, String)>,
}

/// Little-endian `Float32` blob encoding, matching what the reader expects
/// for a real `embedding` column (§6.3).
pub fn encode_embedding(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn memory(mut self, id: &str, content: &str, memory_type: &str, embedding: Option<Vec<f32>>, timestamp_ms: i64) -> Self {
        self.memories.push((
            id.to_string(),
            content.to_string(),
            memory_type.to_string(),
            embedding.map(|e| encode_embedding(&e)),
            Some(timestamp_ms),
            "{}".to_string(),
        ));
        self
    }

    pub fn q_pattern(mut self, state: &str, action: &str, q_value: f64, visits: i64) -> Self {
        self.q_patterns.push((state.to_string(), action.to_string(), q_value, visits, None));
        self
    }

    pub fn trajectory(mut self, id: &str, state: &str, action: &str, outcome: &str, reward: f64, timestamp_ms: i64) -> Self {
        self.trajectories.push((id.to_string(), state.to_string(), action.to_string(), outcome.to_string(), reward, Some(timestamp_ms)));
        self
    }

    pub fn file_sequence(mut self, from: &str, to: &str, count: i64) -> Self {
        self.file_sequences.push((from.to_string(), to.to_string(), count));
        self
    }

    #[allow(dead_code)]
    pub fn edge(mut self, source: &str, target: &str, weight: f64, relation: &str) -> Self {
        self.edges.push((source.to_string(), target.to_string(), weight, format!("{{\"type\":\"{relation}\"}}")));
        self
    }

    pub fn build(self) -> TestStore {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("store.db");
        let conn = Connection::open(&path).expect("open sqlite file");

        conn.execute_batch(
            "CREATE TABLE memories (id TEXT, content TEXT, memory_type TEXT, embedding BLOB, timestamp INTEGER, metadata TEXT);
             CREATE TABLE patterns (state TEXT, action TEXT, q_value REAL, visits INTEGER, last_update INTEGER);
             CREATE TABLE trajectories (id TEXT, state TEXT, action TEXT, outcome TEXT, reward REAL, timestamp INTEGER);
             CREATE TABLE file_sequences (from_file TEXT, to_file TEXT, count INTEGER);
             CREATE TABLE edges (source TEXT, target TEXT, weight REAL, data TEXT);",
        )
        .expect("create schema");

        for (id, content, memory_type, embedding, ts, metadata) in &self.memories {
            conn.execute(
                "INSERT INTO memories (id, content, memory_type, embedding, timestamp, metadata) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, content, memory_type, embedding, ts, metadata],
            )
            .expect("insert memory");
        }
        for (state, action, q_value, visits, last_update) in &self.q_patterns {
            conn.execute(
                "INSERT INTO patterns (state, action, q_value, visits, last_update) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![state, action, q_value, visits, last_update],
            )
            .expect("insert pattern");
        }
        for (id, state, action, outcome, reward, ts) in &self.trajectories {
            conn.execute(
                "INSERT INTO trajectories (id, state, action, outcome, reward, timestamp) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, state, action, outcome, reward, ts],
            )
            .expect("insert trajectory");
        }
        for (from, to, count) in &self.file_sequences {
            conn.execute(
                "INSERT INTO file_sequences (from_file, to_file, count) VALUES (?1, ?2, ?3)",
                rusqlite::params![from, to, count],
            )
            .expect("insert file_sequence");
        }
        for (source, target, weight, data) in &self.edges {
            conn.execute(
                "INSERT INTO edges (source, target, weight, data) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![source, target, weight, data],
            )
            .expect("insert edge");
        }

        drop(conn);
        TestStore { _dir: dir, path }
    }
}

/// A unit vector with a 1 in position `i` and 0 elsewhere, padded to 384
/// dims — used for Scenario B/C's orthogonal-embedding fixtures.
pub fn basis_vector(i: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; 384];
    v[i] = 1.0;
    v
}
