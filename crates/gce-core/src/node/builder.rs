//! Node Builder (§4.2): materializes the nine node kinds from reader output.

use std::collections::{HashMap, HashSet};

use serde_json::Value as Json;

use crate::config::CANONICAL_EMBEDDING_DIM;
use crate::node::types::{preview_of, word_count_of, ContentType, Node, NodeSource};
use crate::store::{pad_to, infer_foundation, DecodedEmbedding, StoreRows};

/// Index maps into the materialized node array (§4.2 exit invariants):
/// queryable by node id (which, for synthesized kinds, already *is* the
/// synthetic key `file:<path>` / `file_type:<ext>` / `agent:<name>` /
/// `state:<val>` / `action:<val>`), and additionally by the raw agent name
/// for agent nodes specifically (callers resolving a trajectory's executing
/// agent have the bare name, not the `agent:` prefix).
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    by_id: HashMap<String, usize>,
    by_agent_name: HashMap<String, usize>,
}

impl NodeIndex {
    pub fn get(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn by_agent_name(&self, name: &str) -> Option<usize> {
        self.by_agent_name.get(name).copied()
    }

    pub fn file(&self, path: &str) -> Option<usize> {
        self.get(&format!("file:{path}"))
    }

    pub fn file_type(&self, ext: &str) -> Option<usize> {
        self.get(&format!("file_type:{ext}"))
    }

    pub fn agent(&self, name: &str) -> Option<usize> {
        self.get(&format!("agent:{name}")).or_else(|| self.by_agent_name(name))
    }

    pub fn state(&self, value: &str) -> Option<usize> {
        self.get(&format!("state:{value}"))
    }

    pub fn action(&self, value: &str) -> Option<usize> {
        self.get(&format!("action:{value}"))
    }
}

/// Output of node materialization: the node array itself, the parallel
/// embedding array (one row per *embedded* node, zero-padded to
/// [`CANONICAL_EMBEDDING_DIM`]), the map from node index to embedding row,
/// and the lookup index.
pub struct BuiltNodes {
    pub nodes: Vec<Node>,
    pub embeddings: Vec<Vec<f32>>,
    pub node_index_to_embedding_index: HashMap<usize, usize>,
    pub index: NodeIndex,
}

/// Extract a file extension (with leading dot) from a path.
fn extension_of(path: &str) -> Option<String> {
    let dot = path.rfind('.')?;
    let slash = path.rfind('/').unwrap_or(0);
    if dot <= slash {
        return None;
    }
    Some(path[dot..].to_string())
}

/// Extract the file-extension suffix of a Q-pattern state key when the
/// state is of the form `"<prefix>:<ext>"` and `<ext>` looks like a file
/// extension (§4.2 file-type synthesis, grounded on Scenario A:
/// `state="edit:.js"` yields file-type node `.js`).
fn extension_from_state(state: &str) -> Option<String> {
    let (_, suffix) = state.rsplit_once(':')?;
    if suffix.starts_with('.') && suffix.len() > 1 {
        Some(suffix.to_string())
    } else {
        None
    }
}

fn namespace_and_prefix(id: &str) -> (Option<String>, Option<String>, usize) {
    if !id.contains(':') {
        return (None, None, 0);
    }
    let parts: Vec<&str> = id.split(':').collect();
    let depth = parts.len() - 1;
    let namespace = parts.first().map(|s| s.to_string());
    let key_prefix = Some(parts[..parts.len() - 1].join(":"));
    (namespace, key_prefix, depth)
}

fn blank_node(id: String, node_index: usize, source: NodeSource) -> Node {
    Node {
        id,
        node_index,
        source,
        x: 0.0,
        y: 0.0,
        z: None,
        timestamp: None,
        created_at: None,
        updated_at: None,
        preview: String::new(),
        namespace: None,
        key_prefix: None,
        content_type: ContentType::Plain,
        value_length: 0,
        word_count: 0,
        ns_depth: 0,
        connection_count: 0,
        has_embedding: false,
        has_valid_embedding: false,
        embedding_dim: 0,
        state: None,
        action: None,
        q_value: None,
        visits: None,
        model: None,
        agent: None,
        context: None,
        success: None,
        start_time: None,
        end_time: None,
        step_count: None,
        steps: None,
        reward: None,
        is_foundation: None,
        layer: None,
        document: None,
        recall_count: None,
        reward_sum: None,
        effectiveness: None,
        last_recalled: None,
        source_doc: None,
        domain: None,
        category: None,
        confidence: None,
        usage_count: None,
        trajectory_id: None,
        pattern_count: None,
        avg_q: None,
        total_visits: None,
        agent_id: None,
        agent_type: None,
        agent_status: None,
        agent_health: None,
        topology_role: None,
        file_path: None,
        file_name: None,
        file_ext: None,
    }
}

fn attach_embedding(
    node: &mut Node,
    embedding: Option<&DecodedEmbedding>,
    embeddings: &mut Vec<Vec<f32>>,
    node_index_to_embedding_index: &mut HashMap<usize, usize>,
) {
    if let Some(emb) = embedding {
        node.has_embedding = true;
        node.has_valid_embedding = emb.dim == CANONICAL_EMBEDDING_DIM;
        node.embedding_dim = emb.dim;
        let embedding_index = embeddings.len();
        embeddings.push(pad_to(&emb.vector, CANONICAL_EMBEDDING_DIM));
        node_index_to_embedding_index.insert(node.node_index, embedding_index);
    }
}

/// Materialize all nine node kinds from reader output.
pub fn build_nodes(rows: &StoreRows) -> BuiltNodes {
    let mut nodes = Vec::new();
    let mut embeddings = Vec::new();
    let mut node_index_to_embedding_index = HashMap::new();
    let mut by_id = HashMap::new();
    let mut by_agent_name = HashMap::new();

    // ---- memories ----
    for row in &rows.memories {
        let idx = nodes.len();
        let mut node = blank_node(row.id.clone(), idx, NodeSource::Memory);
        node.preview = preview_of(&row.content);
        node.content_type = ContentType::sniff(&row.content);
        node.value_length = row.content.chars().count();
        node.word_count = word_count_of(&row.content);
        node.timestamp = row.timestamp_ms;
        let (namespace, key_prefix, depth) = namespace_and_prefix(&row.id);
        node.namespace = namespace;
        node.key_prefix = key_prefix;
        node.ns_depth = depth;
        node.is_foundation = Some(infer_foundation(&row.metadata));
        node.layer = json_str(&row.metadata, "layer");
        node.document = json_str(&row.metadata, "document");
        node.recall_count = json_i64(&row.metadata, "recallCount");
        node.reward_sum = json_f64(&row.metadata, "rewardSum");
        node.effectiveness = json_f64(&row.metadata, "effectiveness");
        node.last_recalled = json_i64(&row.metadata, "lastRecalled");
        node.source_doc = json_str(&row.metadata, "sourceDoc");
        node.domain = json_str(&row.metadata, "domain").or_else(|| Some(row.memory_type.clone()));
        attach_embedding(
            &mut node,
            row.embedding.as_ref(),
            &mut embeddings,
            &mut node_index_to_embedding_index,
        );
        by_id.insert(node.id.clone(), idx);
        nodes.push(node);
    }

    // ---- neural patterns ----
    for row in &rows.neural_patterns {
        let idx = nodes.len();
        let mut node = blank_node(row.id.clone(), idx, NodeSource::NeuralPattern);
        node.preview = preview_of(&row.content);
        node.content_type = ContentType::sniff(&row.content);
        node.value_length = row.content.chars().count();
        node.word_count = word_count_of(&row.content);
        node.created_at = row.created_at_ms;
        node.updated_at = row.updated_at_ms;
        node.timestamp = row.created_at_ms;
        node.category = Some(row.category.clone());
        node.confidence = Some(row.confidence);
        node.usage_count = Some(row.usage);
        node.trajectory_id = json_str(&row.metadata, "trajectoryId");
        attach_embedding(
            &mut node,
            row.embedding.as_ref(),
            &mut embeddings,
            &mut node_index_to_embedding_index,
        );
        by_id.insert(node.id.clone(), idx);
        nodes.push(node);
    }

    // ---- Q-patterns ----
    for row in &rows.q_patterns {
        let idx = nodes.len();
        let mut node = blank_node(row.state.clone() + "::" + &row.action, idx, NodeSource::QPattern);
        node.preview = format!("{} -> {}", row.state, row.action);
        node.value_length = node.preview.chars().count();
        node.word_count = word_count_of(&node.preview);
        node.timestamp = row.last_update_ms;
        node.state = Some(row.state.clone());
        node.action = Some(row.action.clone());
        node.q_value = Some(row.q_value);
        node.visits = Some(row.visits);
        node.model = row.model.clone();
        by_id.insert(node.id.clone(), idx);
        nodes.push(node);
    }

    // ---- trajectories (split success/failed) ----
    for row in &rows.trajectories {
        let success = row.outcome.eq_ignore_ascii_case("success");
        let source = if success {
            NodeSource::TrajectorySuccess
        } else {
            NodeSource::TrajectoryFailed
        };
        let idx = nodes.len();
        let mut node = blank_node(row.id.clone(), idx, source);
        node.preview = format!("{}: {} ({})", row.state, row.action, row.outcome);
        node.value_length = node.preview.chars().count();
        node.word_count = word_count_of(&node.preview);
        node.timestamp = row.timestamp_ms;
        node.state = Some(row.state.clone());
        node.action = Some(row.action.clone());
        node.agent = row.agent.clone().or_else(|| Some(row.action.clone()));
        node.context = row.context.clone();
        node.success = Some(success);
        // The observed schema has start === end (single-event rows); widened
        // at edge-synthesis time (§4.4 step 6), not here.
        node.start_time = row.timestamp_ms;
        node.end_time = row.timestamp_ms;
        node.step_count = Some(1);
        node.reward = Some(row.reward);
        by_id.insert(node.id.clone(), idx);
        nodes.push(node);
    }

    // ---- files: distinct paths from file_sequences ----
    let mut file_paths: Vec<String> = Vec::new();
    let mut seen_files: HashSet<String> = HashSet::new();
    for row in &rows.file_sequences {
        for path in [&row.from_file, &row.to_file] {
            if seen_files.insert(path.clone()) {
                file_paths.push(path.clone());
            }
        }
    }
    for path in &file_paths {
        let idx = nodes.len();
        let id = format!("file:{path}");
        let mut node = blank_node(id.clone(), idx, NodeSource::File);
        node.preview = path.clone();
        node.file_path = Some(path.clone());
        node.file_name = path.rsplit('/').next().map(|s| s.to_string());
        node.file_ext = extension_of(path);
        by_id.insert(id, idx);
        nodes.push(node);
    }

    // ---- file-types: distinct extensions from Q-table state suffixes ----
    let mut ext_stats: HashMap<String, (usize, f64, i64)> = HashMap::new();
    for row in &rows.q_patterns {
        if let Some(ext) = extension_from_state(&row.state) {
            let entry = ext_stats.entry(ext).or_insert((0, 0.0, 0));
            entry.0 += 1;
            entry.1 += row.q_value;
            entry.2 += row.visits;
        }
    }
    for (ext, (count, q_sum, visits)) in &ext_stats {
        let idx = nodes.len();
        let id = format!("file_type:{ext}");
        let mut node = blank_node(id.clone(), idx, NodeSource::FileType);
        node.preview = ext.clone();
        node.file_ext = Some(ext.clone());
        node.pattern_count = Some(*count);
        node.avg_q = Some(if *count > 0 { q_sum / *count as f64 } else { 0.0 });
        node.total_visits = Some(*visits);
        by_id.insert(id, idx);
        nodes.push(node);
    }

    // ---- agents: distinct action values with positive weight ----
    let mut agent_weights: HashMap<String, Vec<f64>> = HashMap::new();
    for row in &rows.q_patterns {
        if row.q_value > 0.0 {
            agent_weights
                .entry(row.action.clone())
                .or_default()
                .push(row.q_value);
        }
    }
    for (name, weights) in &agent_weights {
        let idx = nodes.len();
        let id = format!("agent:{name}");
        let mut node = blank_node(id.clone(), idx, NodeSource::Agent);
        node.preview = name.clone();
        node.agent_id = Some(name.clone());
        node.agent_type = Some(name.clone());
        node.agent_status = Some("active".to_string());
        let mean = weights.iter().sum::<f64>() / weights.len() as f64;
        let max = weights.iter().cloned().fold(f64::MIN, f64::max).max(f64::EPSILON);
        node.agent_health = Some((mean / max).clamp(0.0, 1.0));
        by_id.insert(id, idx);
        by_agent_name.insert(name.clone(), idx);
        nodes.push(node);
    }

    // ---- state, action aggregates ----
    let mut state_stats: HashMap<String, (usize, f64, i64)> = HashMap::new();
    let mut action_stats: HashMap<String, (usize, f64, i64)> = HashMap::new();
    for row in &rows.q_patterns {
        let s = state_stats.entry(row.state.clone()).or_insert((0, 0.0, 0));
        s.0 += 1;
        s.1 += row.q_value;
        s.2 += row.visits;
        let a = action_stats.entry(row.action.clone()).or_insert((0, 0.0, 0));
        a.0 += 1;
        a.1 += row.q_value;
        a.2 += row.visits;
    }
    for (value, (count, q_sum, visits)) in &state_stats {
        let idx = nodes.len();
        let id = format!("state:{value}");
        let mut node = blank_node(id.clone(), idx, NodeSource::State);
        node.preview = value.clone();
        node.state = Some(value.clone());
        node.pattern_count = Some(*count);
        node.avg_q = Some(if *count > 0 { q_sum / *count as f64 } else { 0.0 });
        node.total_visits = Some(*visits);
        by_id.insert(id, idx);
        nodes.push(node);
    }
    for (value, (count, q_sum, visits)) in &action_stats {
        let idx = nodes.len();
        let id = format!("action:{value}");
        let mut node = blank_node(id.clone(), idx, NodeSource::Action);
        node.preview = value.clone();
        node.action = Some(value.clone());
        node.pattern_count = Some(*count);
        node.avg_q = Some(if *count > 0 { q_sum / *count as f64 } else { 0.0 });
        node.total_visits = Some(*visits);
        by_id.insert(id, idx);
        nodes.push(node);
    }

    debug_assert!(nodes.iter().enumerate().all(|(i, n)| n.node_index == i));

    BuiltNodes {
        nodes,
        embeddings,
        node_index_to_embedding_index,
        index: NodeIndex { by_id, by_agent_name },
    }
}

fn json_str(value: &Json, key: &str) -> Option<String> {
    value.get(key).and_then(Json::as_str).map(|s| s.to_string())
}

fn json_f64(value: &Json, key: &str) -> Option<f64> {
    value.get(key).and_then(Json::as_f64)
}

fn json_i64(value: &Json, key: &str) -> Option<i64> {
    value.get(key).and_then(Json::as_i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryRow, QPatternRow, FileSequenceRow, TrajectoryRow};

    fn scenario_a_rows() -> StoreRows {
        StoreRows {
            memories: vec![MemoryRow {
                id: "mem-1".into(),
                content: "hello".into(),
                memory_type: "fact".into(),
                embedding: Some(DecodedEmbedding {
                    vector: vec![0.1; 384],
                    dim: 384,
                }),
                timestamp_ms: Some(1_700_000_000_000),
                metadata: serde_json::json!({}),
            }],
            q_patterns: vec![QPatternRow {
                state: "edit:.js".into(),
                action: "coder".into(),
                q_value: 0.8,
                visits: 3,
                last_update_ms: None,
                model: None,
            }],
            trajectories: vec![TrajectoryRow {
                id: "traj-1".into(),
                state: "edit_js".into(),
                action: "coder".into(),
                outcome: "success".into(),
                reward: 1.0,
                timestamp_ms: Some(1_700_000_000_000),
                agent: None,
                context: None,
            }],
            file_sequences: vec![FileSequenceRow {
                from_file: "a.ts".into(),
                to_file: "b.ts".into(),
                count: 2,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn scenario_a_produces_expected_node_counts() {
        let rows = scenario_a_rows();
        let built = build_nodes(&rows);
        let count_of = |src: NodeSource| built.nodes.iter().filter(|n| n.source == src).count();
        assert_eq!(count_of(NodeSource::Memory), 1);
        assert_eq!(count_of(NodeSource::QPattern), 1);
        assert_eq!(count_of(NodeSource::TrajectorySuccess), 1);
        assert_eq!(count_of(NodeSource::State), 1);
        assert_eq!(count_of(NodeSource::Action), 1);
        assert_eq!(count_of(NodeSource::Agent), 1);
        assert_eq!(count_of(NodeSource::FileType), 1);
        assert_eq!(count_of(NodeSource::File), 2);
    }

    #[test]
    fn node_index_equals_array_position() {
        let rows = scenario_a_rows();
        let built = build_nodes(&rows);
        for (i, node) in built.nodes.iter().enumerate() {
            assert_eq!(node.node_index, i);
        }
    }

    #[test]
    fn index_resolves_synthetic_keys() {
        let rows = scenario_a_rows();
        let built = build_nodes(&rows);
        assert!(built.index.file("a.ts").is_some());
        assert!(built.index.file_type(".js").is_some());
        assert!(built.index.agent("coder").is_some());
        assert!(built.index.state("edit:.js").is_some());
        assert!(built.index.action("coder").is_some());
    }

    #[test]
    fn only_valid_embeddings_are_marked_valid() {
        let mut rows = scenario_a_rows();
        rows.memories.push(MemoryRow {
            id: "mem-2".into(),
            content: "partial".into(),
            memory_type: "fact".into(),
            embedding: Some(DecodedEmbedding {
                vector: vec![0.1; 64],
                dim: 64,
            }),
            timestamp_ms: None,
            metadata: serde_json::json!({}),
        });
        let built = build_nodes(&rows);
        let mem1 = built.nodes.iter().find(|n| n.id == "mem-1").unwrap();
        let mem2 = built.nodes.iter().find(|n| n.id == "mem-2").unwrap();
        assert!(mem1.has_valid_embedding);
        assert!(!mem2.has_valid_embedding);
        assert!(mem2.has_embedding);
    }

    #[test]
    fn init_warmup_never_reaches_builder() {
        // Reader filters this before builder sees rows; builder has no
        // special-casing for it, so an empty memories vec is already the
        // contract surface here.
        let rows = StoreRows::default();
        let built = build_nodes(&rows);
        assert!(built.nodes.is_empty());
    }
}
