//! The unified Node record (§3.1) and the content-type sniffing it needs.

use serde::{Deserialize, Serialize};

/// The nine node kinds the builder materializes (§2.2, §3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSource {
    Memory,
    NeuralPattern,
    QPattern,
    TrajectorySuccess,
    TrajectoryFailed,
    File,
    FileType,
    Agent,
    State,
    Action,
}

impl NodeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeSource::Memory => "memory",
            NodeSource::NeuralPattern => "neural_pattern",
            NodeSource::QPattern => "q_pattern",
            NodeSource::TrajectorySuccess => "trajectory_success",
            NodeSource::TrajectoryFailed => "trajectory_failed",
            NodeSource::File => "file",
            NodeSource::FileType => "file_type",
            NodeSource::Agent => "agent",
            NodeSource::State => "state",
            NodeSource::Action => "action",
        }
    }

    /// Every node source the SSOT config (§4.9) knows about up front, in a
    /// fixed display order.
    pub fn all() -> &'static [NodeSource] {
        &[
            NodeSource::Memory,
            NodeSource::NeuralPattern,
            NodeSource::QPattern,
            NodeSource::TrajectorySuccess,
            NodeSource::TrajectoryFailed,
            NodeSource::File,
            NodeSource::FileType,
            NodeSource::Agent,
            NodeSource::State,
            NodeSource::Action,
        ]
    }

    /// Whether this kind of node participates in embedding-driven layout /
    /// edges at all (only memory and neural-pattern nodes carry embeddings
    /// in the store schema).
    pub fn can_carry_embedding(&self) -> bool {
        matches!(self, NodeSource::Memory | NodeSource::NeuralPattern)
    }
}

/// `preview`'s content-type sniff (§3.1: `contentType ∈ {json, yaml, plain}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Json,
    Yaml,
    Plain,
}

impl ContentType {
    pub fn sniff(content: &str) -> Self {
        let trimmed = content.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
                return ContentType::Json;
            }
        }
        if trimmed.lines().take(5).any(|line| {
            let line = line.trim_start();
            !line.is_empty() && !line.starts_with('#') && line.contains(':') && !line.contains("://")
        }) {
            return ContentType::Yaml;
        }
        ContentType::Plain
    }
}

/// The unified node record. Polymorphic over [`NodeSource`]; kind-specific
/// fields are `Option`s populated only for the kinds that define them
/// (§3.1). This mirrors the wire shape directly — every field here is a
/// field on the JSON node the API emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    // ---- identity ----
    pub id: String,
    pub node_index: usize,
    pub source: NodeSource,

    // ---- positional ----
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,

    // ---- temporal ----
    pub timestamp: Option<i64>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,

    // ---- textual ----
    pub preview: String,
    pub namespace: Option<String>,
    pub key_prefix: Option<String>,
    pub content_type: ContentType,

    // ---- metric ----
    pub value_length: usize,
    pub word_count: usize,
    pub ns_depth: usize,
    pub connection_count: usize,

    // ---- semantic ----
    pub has_embedding: bool,
    pub has_valid_embedding: bool,
    pub embedding_dim: usize,

    // ---- kind-specific: Q-pattern ----
    pub state: Option<String>,
    pub action: Option<String>,
    pub q_value: Option<f64>,
    pub visits: Option<i64>,
    pub model: Option<String>,

    // ---- kind-specific: trajectory ----
    pub agent: Option<String>,
    pub context: Option<String>,
    pub success: Option<bool>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub step_count: Option<usize>,
    pub steps: Option<Vec<String>>,
    pub reward: Option<f64>,

    // ---- kind-specific: memory RL fields ----
    pub is_foundation: Option<bool>,
    pub layer: Option<String>,
    pub document: Option<String>,
    pub recall_count: Option<i64>,
    pub reward_sum: Option<f64>,
    pub effectiveness: Option<f64>,
    pub last_recalled: Option<i64>,
    pub source_doc: Option<String>,
    pub domain: Option<String>,

    // ---- kind-specific: neural pattern ----
    pub category: Option<String>,
    pub confidence: Option<f64>,
    pub usage_count: Option<i64>,
    pub trajectory_id: Option<String>,

    // ---- kind-specific: state/action aggregates ----
    pub pattern_count: Option<usize>,
    pub avg_q: Option<f64>,
    pub total_visits: Option<i64>,

    // ---- kind-specific: agent ----
    pub agent_id: Option<String>,
    pub agent_type: Option<String>,
    pub agent_status: Option<String>,
    pub agent_health: Option<f64>,
    pub topology_role: Option<String>,

    // ---- kind-specific: file ----
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub file_ext: Option<String>,
}

/// First 300 chars of source content (§3.1 `preview`).
pub fn preview_of(content: &str) -> String {
    content.chars().take(300).collect()
}

/// Word count via whitespace splitting.
pub fn word_count_of(content: &str) -> usize {
    content.split_whitespace().count()
}
