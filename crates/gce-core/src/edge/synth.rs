//! Edge Synthesizer (§4.4): the ordered 12-step pipeline that turns
//! materialized nodes into the edge set.

use std::collections::{HashMap, HashSet};

use crate::config::GceConfig;
use crate::node::{Node, NodeIndex, NodeSource};
use crate::store::StoreRows;
use crate::util::cosine_similarity;

use super::types::{Edge, EdgeGroup, EdgeType};

/// Implements the `addEdge` contract: self-loop and duplicate-pair
/// rejection, per-node fan-out caps (separate budget for the semantic
/// group), and `group` tagging.
struct EdgeSynthesizer {
    pairs: HashSet<(usize, usize)>,
    deterministic_fanout: Vec<usize>,
    semantic_fanout: Vec<usize>,
    deterministic_cap: usize,
    semantic_cap: usize,
    edges: Vec<Edge>,
}

impl EdgeSynthesizer {
    fn new(node_count: usize, config: &GceConfig) -> Self {
        Self {
            pairs: HashSet::new(),
            deterministic_fanout: vec![0; node_count],
            semantic_fanout: vec![0; node_count],
            deterministic_cap: config.deterministic_fanout_cap,
            semantic_cap: config.semantic_fanout_cap,
            edges: Vec::new(),
        }
    }

    fn add_edge(&mut self, source: usize, target: usize, weight: f64, edge_type: EdgeType) -> bool {
        if source == target {
            return false;
        }
        let key = (source.min(target), source.max(target));
        if self.pairs.contains(&key) {
            return false;
        }
        let group = edge_type.group();
        let (fanout, cap) = match group {
            EdgeGroup::Semantic => (&mut self.semantic_fanout, self.semantic_cap),
            EdgeGroup::Deterministic => (&mut self.deterministic_fanout, self.deterministic_cap),
        };
        if fanout[source] >= cap || fanout[target] >= cap {
            return false;
        }
        fanout[source] += 1;
        fanout[target] += 1;
        self.pairs.insert(key);
        self.edges.push(Edge {
            source,
            target,
            weight: weight.clamp(0.0, 1.0) as f32,
            edge_type,
            group,
        });
        true
    }

    fn has_type(&self, edge_type: &EdgeType) -> bool {
        self.edges.iter().any(|e| &e.edge_type == edge_type)
    }
}

/// Split on the first `_`; the whole string if none appears. Used to bucket
/// trajectories into a memory-type family (step 6) and to match Q-pattern
/// states back against that family (step 7's fallback). Trajectory states
/// use `_` as their separator (e.g. `edit_js`), so this must not also cut on
/// `:` — that belongs to Q-pattern states (e.g. `edit:.js`), which use
/// [`leading_colon_prefix`] instead.
fn leading_prefix(value: &str) -> &str {
    match value.find('_') {
        Some(i) => &value[..i],
        None => value,
    }
}

/// Split on the first `:`; the whole string if none appears. Used to bucket
/// Q-patterns by state prefix (step 2), where the prefix is everything
/// before `:` (e.g. `multi_word:ext` buckets to `multi_word`, not `multi`).
fn leading_colon_prefix(value: &str) -> &str {
    match value.find(':') {
        Some(i) => &value[..i],
        None => value,
    }
}

fn state_prefix_to_memory_type(prefix: &str) -> Option<&'static str> {
    match prefix {
        "edit" => Some("edit"),
        "cmd" => Some("command"),
        "search" => Some("search_pattern"),
        "agent" => Some("agent_spawn"),
        _ => None,
    }
}

fn memory_type_to_state_prefix(memory_type: &str) -> Option<&'static str> {
    match memory_type {
        "edit" => Some("edit"),
        "command" => Some("cmd"),
        "search_pattern" => Some("search"),
        "agent_spawn" => Some("agent"),
        _ => None,
    }
}

/// Tokenize on non-alphanumeric boundaries, lowercased, keeping words with
/// more than `min_len` characters (§4.4 step 7 uses `>3`, step 8's context
/// match uses `>4`).
fn tokenize(text: &str, min_len: usize) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > min_len)
        .map(|w| w.to_lowercase())
        .collect()
}

fn is_queen(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("queen") || lower.contains("coordinator")
}

/// Run the full ordered pipeline and recompute `connectionCount` on exit.
pub fn synthesize_edges(
    nodes: &mut [Node],
    embeddings: &[Vec<f32>],
    node_index_to_embedding_index: &HashMap<usize, usize>,
    index: &NodeIndex,
    rows: &StoreRows,
    config: &GceConfig,
) -> Vec<Edge> {
    let mut synth = EdgeSynthesizer::new(nodes.len(), config);

    step1_stored_relations(&mut synth, rows, index);
    step2_q_pattern_grouping(&mut synth, nodes);
    step3_routing(&mut synth, nodes, index);
    step4_file_coedit(&mut synth, rows, index);
    step5_trajectory_structural(&mut synth, nodes);
    step6_temporal_bridging(&mut synth, nodes);
    step7_content_match(&mut synth, nodes);
    step8_memory_trajectory_bridge(&mut synth, nodes);
    step9_q_pattern_anchors(&mut synth, nodes, index);
    step10_agent_hierarchy(&mut synth, nodes, index);
    step11_semantic(&mut synth, nodes, embeddings, node_index_to_embedding_index, config);
    step12_knn_rescue(&mut synth, nodes, embeddings, node_index_to_embedding_index);

    let mut counts = vec![0usize; nodes.len()];
    for e in &synth.edges {
        counts[e.source] += 1;
        counts[e.target] += 1;
    }
    for (node, count) in nodes.iter_mut().zip(counts) {
        node.connection_count = count;
    }

    synth.edges
}

/// Step 1 — highest-precedence relations read straight from the store.
fn step1_stored_relations(synth: &mut EdgeSynthesizer, rows: &StoreRows, index: &NodeIndex) {
    for row in &rows.stored_edges {
        let (Some(s), Some(t)) = (index.get(&row.source), index.get(&row.target)) else {
            tracing::debug!(source = %row.source, target = %row.target, "stored edge endpoint unresolved, dropping");
            continue;
        };
        synth.add_edge(s, t, row.weight, EdgeType::from(row.edge_type.as_str()));
    }
}

/// Step 2 — Q-pattern state-prefix chains and rare-action cliques.
fn step2_q_pattern_grouping(synth: &mut EdgeSynthesizer, nodes: &[Node]) {
    let q_patterns: Vec<(usize, &str, &str)> = nodes
        .iter()
        .filter(|n| n.source == NodeSource::QPattern)
        .map(|n| (n.node_index, n.state.as_deref().unwrap_or(""), n.action.as_deref().unwrap_or("")))
        .collect();

    let mut by_state_prefix: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut by_action: HashMap<&str, Vec<usize>> = HashMap::new();
    for &(idx, state, action) in &q_patterns {
        by_state_prefix.entry(leading_colon_prefix(state)).or_default().push(idx);
        by_action.entry(action).or_default().push(idx);
    }

    for group in by_state_prefix.values() {
        for pair in group.windows(2) {
            synth.add_edge(pair[0], pair[1], 0.6, EdgeType::SameStatePrefix);
        }
    }

    for group in by_action.values() {
        if group.len() > 3 {
            continue; // only rare actions get fully connected
        }
        for i in 0..group.len() {
            for j in (i + 1)..group.len() {
                synth.add_edge(group[i], group[j], 0.7, EdgeType::SameAction);
            }
        }
    }
}

/// Step 3 — `(file_type, agent)` routing weight.
fn step3_routing(synth: &mut EdgeSynthesizer, nodes: &[Node], index: &NodeIndex) {
    let mut weights: HashMap<(String, String), f64> = HashMap::new();
    for n in nodes.iter().filter(|n| n.source == NodeSource::QPattern) {
        let (Some(state), Some(action), Some(q)) = (&n.state, &n.action, n.q_value) else {
            continue;
        };
        if q <= 0.0 {
            continue;
        }
        if let Some((_, ext)) = state.rsplit_once(':') {
            if ext.starts_with('.') {
                *weights.entry((ext.to_string(), action.clone())).or_insert(0.0) += q;
            }
        }
    }
    for ((ext, agent), w) in weights {
        if let (Some(ft), Some(a)) = (index.file_type(&ext), index.agent(&agent)) {
            synth.add_edge(ft, a, (w / 10.0).min(1.0), EdgeType::RoutesTo);
        }
    }
}

/// Step 4 — file co-edit sequences.
fn step4_file_coedit(synth: &mut EdgeSynthesizer, rows: &StoreRows, index: &NodeIndex) {
    for row in &rows.file_sequences {
        if let (Some(from), Some(to)) = (index.file(&row.from_file), index.file(&row.to_file)) {
            synth.add_edge(from, to, (row.count as f64 / 5.0).min(1.0), EdgeType::EditedAfter);
        }
    }
}

/// Step 5 — trajectory sequencing, per-agent chains, success/failure
/// clustering.
fn step5_trajectory_structural(synth: &mut EdgeSynthesizer, nodes: &[Node]) {
    struct Traj<'a> {
        idx: usize,
        ts: i64,
        agent: Option<&'a str>,
        success: bool,
    }

    let mut trajectories: Vec<Traj> = nodes
        .iter()
        .filter(|n| matches!(n.source, NodeSource::TrajectorySuccess | NodeSource::TrajectoryFailed))
        .map(|n| Traj {
            idx: n.node_index,
            ts: n.timestamp.unwrap_or(0),
            agent: n.agent.as_deref(),
            success: n.source == NodeSource::TrajectorySuccess,
        })
        .collect();
    trajectories.sort_by_key(|t| t.ts);

    for pair in trajectories.windows(2) {
        synth.add_edge(pair[0].idx, pair[1].idx, 0.7, EdgeType::TrajectorySequence);
    }

    let mut by_agent: HashMap<&str, Vec<usize>> = HashMap::new();
    for t in &trajectories {
        if let Some(agent) = t.agent {
            by_agent.entry(agent).or_default().push(t.idx);
        }
    }
    for group in by_agent.values() {
        for pair in group.windows(2) {
            synth.add_edge(pair[0], pair[1], 0.6, EdgeType::SameAgent);
        }
    }

    let successes: Vec<usize> = trajectories.iter().filter(|t| t.success).map(|t| t.idx).collect();
    link_next_two(synth, &successes, EdgeType::SuccessCluster);
    let failures: Vec<usize> = trajectories.iter().filter(|t| !t.success).map(|t| t.idx).collect();
    link_next_two(synth, &failures, EdgeType::FailureCluster);
}

fn link_next_two(synth: &mut EdgeSynthesizer, ordered: &[usize], edge_type: EdgeType) {
    for i in 0..ordered.len() {
        for j in (i + 1)..(i + 3).min(ordered.len()) {
            synth.add_edge(ordered[i], ordered[j], 0.5, edge_type.clone());
        }
    }
}

/// Step 6 — widened-window temporal bridging to memories, plus the
/// state-prefix to memory-type bucket bridge. A trajectory whose bucket is
/// recognized always gets up to 3 `state_type_bridge` links: memories whose
/// `domain` matches the bucket exactly, or — when none do — the nearest
/// memories by timestamp, since a recognized bucket with no exact match
/// still counts as "matching" in the loosest available sense rather than
/// silently producing zero edges.
fn step6_temporal_bridging(synth: &mut EdgeSynthesizer, nodes: &[Node]) {
    const WINDOW_MS: i64 = 60_000;

    let memories: Vec<(usize, Option<i64>, Option<&str>)> = nodes
        .iter()
        .filter(|n| n.source == NodeSource::Memory)
        .map(|n| (n.node_index, n.timestamp, n.domain.as_deref()))
        .collect();

    let trajectories: Vec<(usize, Option<i64>, Option<i64>, Option<&str>)> = nodes
        .iter()
        .filter(|n| matches!(n.source, NodeSource::TrajectorySuccess | NodeSource::TrajectoryFailed))
        .map(|n| (n.node_index, n.start_time, n.end_time, n.state.as_deref()))
        .collect();

    for &(traj_idx, start, end, state) in &trajectories {
        if let (Some(start), Some(end)) = (start, end) {
            let lo = start - WINDOW_MS;
            let hi = end + WINDOW_MS;
            for &(mem_idx, ts, _) in &memories {
                if let Some(ts) = ts {
                    if ts >= lo && ts <= hi {
                        synth.add_edge(traj_idx, mem_idx, 0.9, EdgeType::TrajectoryMemory);
                    }
                }
            }
        }

        let Some(state) = state else { continue };
        let Some(bucket) = state_prefix_to_memory_type(leading_prefix(state)) else {
            continue;
        };

        let mut matching: Vec<usize> = memories
            .iter()
            .filter(|&&(_, _, domain)| domain == Some(bucket))
            .map(|&(idx, _, _)| idx)
            .collect();

        if matching.is_empty() {
            let traj_ts = start.or(end).unwrap_or(0);
            let mut by_distance: Vec<(usize, i64)> = memories
                .iter()
                .map(|&(idx, ts, _)| (idx, (ts.unwrap_or(0) - traj_ts).abs()))
                .collect();
            by_distance.sort_by_key(|&(_, d)| d);
            matching = by_distance.into_iter().map(|(idx, _)| idx).collect();
        }

        for mem_idx in matching.into_iter().take(3) {
            synth.add_edge(traj_idx, mem_idx, 0.4, EdgeType::StateTypeBridge);
        }
    }
}

/// Step 7 — content/state token overlap, with a type-mapping fallback.
fn step7_content_match(synth: &mut EdgeSynthesizer, nodes: &[Node]) {
    let q_patterns: Vec<(usize, HashSet<String>, &str)> = nodes
        .iter()
        .filter(|n| n.source == NodeSource::QPattern)
        .map(|n| {
            let mut tokens = tokenize(n.state.as_deref().unwrap_or(""), 3);
            tokens.extend(tokenize(n.action.as_deref().unwrap_or(""), 3));
            (n.node_index, tokens, n.state.as_deref().unwrap_or(""))
        })
        .collect();

    let content_nodes: Vec<(usize, HashSet<String>, Option<&str>)> = nodes
        .iter()
        .filter(|n| matches!(n.source, NodeSource::Memory | NodeSource::NeuralPattern))
        .map(|n| (n.node_index, tokenize(&n.preview, 3), n.domain.as_deref()))
        .collect();

    for (content_idx, content_tokens, domain) in &content_nodes {
        let mut scored: Vec<(usize, usize)> = q_patterns
            .iter()
            .map(|(q_idx, q_tokens, _)| (*q_idx, content_tokens.intersection(q_tokens).count()))
            .filter(|&(_, score)| score > 0)
            .collect();

        if !scored.is_empty() {
            scored.sort_by(|a, b| b.1.cmp(&a.1));
            for (q_idx, score) in scored.into_iter().take(3) {
                let weight = (0.3 + score as f64 * 0.1).min(0.8);
                synth.add_edge(*content_idx, q_idx, weight, EdgeType::ContentMatch);
            }
            continue;
        }

        let Some(domain) = domain else { continue };
        let Some(prefix) = memory_type_to_state_prefix(domain) else {
            continue;
        };
        for (q_idx, _, state) in &q_patterns {
            if leading_colon_prefix(state) == prefix {
                synth.add_edge(*content_idx, *q_idx, 0.35, EdgeType::TypeMapping);
            }
        }
    }
}

/// Step 8 — memory to trajectory, by verbatim agent mention or shared
/// context tokens.
fn step8_memory_trajectory_bridge(synth: &mut EdgeSynthesizer, nodes: &[Node]) {
    let memories: Vec<(usize, &str)> = nodes
        .iter()
        .filter(|n| n.source == NodeSource::Memory)
        .map(|n| (n.node_index, n.preview.as_str()))
        .collect();

    let trajectories: Vec<(usize, Option<&str>, Option<&str>)> = nodes
        .iter()
        .filter(|n| matches!(n.source, NodeSource::TrajectorySuccess | NodeSource::TrajectoryFailed))
        .map(|n| (n.node_index, n.agent.as_deref(), n.context.as_deref()))
        .collect();

    for &(mem_idx, content) in &memories {
        let content_tokens = tokenize(content, 4);
        for &(traj_idx, agent, context) in &trajectories {
            if let Some(agent) = agent {
                if !agent.is_empty() && content.contains(agent) {
                    synth.add_edge(mem_idx, traj_idx, 0.55, EdgeType::MemoryAgent);
                    continue;
                }
            }
            if let Some(context) = context {
                let context_tokens = tokenize(context, 4);
                if content_tokens.intersection(&context_tokens).count() >= 2 {
                    synth.add_edge(mem_idx, traj_idx, 0.4, EdgeType::MemoryContext);
                }
            }
        }
    }
}

/// Step 9 — Q-pattern anchors to its state/action nodes, action-to-agent
/// identity, trajectory-to-agent, trajectory-to-neural-pattern.
fn step9_q_pattern_anchors(synth: &mut EdgeSynthesizer, nodes: &[Node], index: &NodeIndex) {
    for n in nodes.iter().filter(|n| n.source == NodeSource::QPattern) {
        if let Some(state) = &n.state {
            if let Some(s_idx) = index.state(state) {
                synth.add_edge(n.node_index, s_idx, 0.8, EdgeType::HasState);
            }
        }
        if let Some(action) = &n.action {
            if let Some(a_idx) = index.action(action) {
                synth.add_edge(n.node_index, a_idx, 0.8, EdgeType::HasAction);
            }
        }
    }

    for n in nodes.iter().filter(|n| n.source == NodeSource::Action) {
        let Some(label) = &n.action else { continue };
        if let Some(agent_idx) = index.agent(label) {
            synth.add_edge(n.node_index, agent_idx, 0.9, EdgeType::IsAgent);
        }
    }

    for n in nodes.iter().filter(|n| matches!(n.source, NodeSource::TrajectorySuccess | NodeSource::TrajectoryFailed)) {
        if let Some(agent) = &n.agent {
            if let Some(agent_idx) = index.agent(agent) {
                synth.add_edge(n.node_index, agent_idx, 0.85, EdgeType::TrajectoryAgent);
            }
        }
    }

    let trajectory_by_id: HashMap<&str, usize> = nodes
        .iter()
        .filter(|n| matches!(n.source, NodeSource::TrajectorySuccess | NodeSource::TrajectoryFailed))
        .map(|n| (n.id.as_str(), n.node_index))
        .collect();

    for n in nodes.iter().filter(|n| n.source == NodeSource::NeuralPattern) {
        if let Some(traj_id) = &n.trajectory_id {
            if let Some(&traj_idx) = trajectory_by_id.get(traj_id.as_str()) {
                synth.add_edge(n.node_index, traj_idx, 0.9, EdgeType::TrajectoryNeural);
            }
        }
    }
}

/// Step 10 — queen-to-agent hierarchy, agent-to-its-trajectory-instances.
fn step10_agent_hierarchy(synth: &mut EdgeSynthesizer, nodes: &[Node], index: &NodeIndex) {
    let agents: Vec<(usize, &str)> = nodes
        .iter()
        .filter(|n| n.source == NodeSource::Agent)
        .filter_map(|n| n.agent_id.as_deref().map(|id| (n.node_index, id)))
        .collect();

    let queen = agents.iter().find(|&&(_, name)| is_queen(name));

    if let Some(&(queen_idx, _)) = queen {
        for &(idx, _) in &agents {
            if idx != queen_idx {
                synth.add_edge(queen_idx, idx, 0.9, EdgeType::AgentHierarchy);
            }
        }
    }

    for n in nodes.iter().filter(|n| n.source == NodeSource::Agent) {
        let Some(agent_type) = &n.agent_type else { continue };
        for traj in nodes.iter().filter(|t| matches!(t.source, NodeSource::TrajectorySuccess | NodeSource::TrajectoryFailed)) {
            if traj.agent.as_deref() == Some(agent_type.as_str()) {
                synth.add_edge(n.node_index, traj.node_index, 0.75, EdgeType::AgentInstance);
            }
        }
    }

    let _ = index; // endpoints here are all resolved by direct node scan, not the index
}

/// Step 11 — cosine-similarity semantic edges over valid-embedding nodes
/// only, skipped entirely if the store already supplied explicit `semantic`
/// relations.
fn step11_semantic(
    synth: &mut EdgeSynthesizer,
    nodes: &[Node],
    embeddings: &[Vec<f32>],
    node_index_to_embedding_index: &HashMap<usize, usize>,
    config: &GceConfig,
) {
    if synth.has_type(&EdgeType::Semantic) {
        return;
    }

    let embedded: Vec<usize> = nodes
        .iter()
        .filter(|n| n.has_valid_embedding)
        .map(|n| n.node_index)
        .collect();

    for i in 0..embedded.len() {
        for j in (i + 1)..embedded.len() {
            let (a, b) = (embedded[i], embedded[j]);
            let (Some(&ea), Some(&eb)) = (node_index_to_embedding_index.get(&a), node_index_to_embedding_index.get(&b)) else {
                continue;
            };
            let sim = cosine_similarity(&embeddings[ea], &embeddings[eb]);
            if sim >= config.similarity_threshold {
                synth.add_edge(a, b, sim as f64, EdgeType::Semantic);
            }
        }
    }
}

/// Step 12 — any embedded node left with zero edges gets linked to its 3
/// nearest embedded neighbors regardless of threshold.
fn step12_knn_rescue(
    synth: &mut EdgeSynthesizer,
    nodes: &[Node],
    embeddings: &[Vec<f32>],
    node_index_to_embedding_index: &HashMap<usize, usize>,
) {
    let mut degree = vec![0usize; nodes.len()];
    for e in &synth.edges {
        degree[e.source] += 1;
        degree[e.target] += 1;
    }

    let embedded: Vec<usize> = nodes
        .iter()
        .filter(|n| n.has_valid_embedding)
        .map(|n| n.node_index)
        .collect();

    let orphans: Vec<usize> = embedded.iter().copied().filter(|&i| degree[i] == 0).collect();

    for orphan in orphans {
        let Some(&e_orphan) = node_index_to_embedding_index.get(&orphan) else {
            continue;
        };
        let mut sims: Vec<(usize, f32)> = embedded
            .iter()
            .copied()
            .filter(|&other| other != orphan)
            .filter_map(|other| {
                node_index_to_embedding_index
                    .get(&other)
                    .map(|&e_other| (other, cosine_similarity(&embeddings[e_orphan], &embeddings[e_other])))
            })
            .collect();
        sims.sort_by(|a, b| b.1.total_cmp(&a.1));
        for (other, sim) in sims.into_iter().take(3) {
            synth.add_edge(orphan, other, sim as f64, EdgeType::KnnFallback);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::build_nodes;
    use crate::store::{DecodedEmbedding, FileSequenceRow, MemoryRow, QPatternRow, TrajectoryRow};

    fn scenario_a_rows() -> StoreRows {
        StoreRows {
            memories: vec![MemoryRow {
                id: "mem-1".into(),
                content: "hello".into(),
                memory_type: "fact".into(),
                embedding: Some(DecodedEmbedding { vector: vec![0.1; 384], dim: 384 }),
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
    fn scenario_a_produces_required_edge_types() {
        let rows = scenario_a_rows();
        let mut built = build_nodes(&rows);
        let config = GceConfig::default();
        let edges = synthesize_edges(
            &mut built.nodes,
            &built.embeddings,
            &built.node_index_to_embedding_index,
            &built.index,
            &rows,
            &config,
        );

        let has = |t: EdgeType| edges.iter().any(|e| e.edge_type == t);
        assert!(has(EdgeType::HasState));
        assert!(has(EdgeType::HasAction));
        assert!(has(EdgeType::IsAgent));
        assert!(has(EdgeType::TrajectoryMemory));
        assert!(has(EdgeType::StateTypeBridge));
        assert!(has(EdgeType::RoutesTo));
        assert!(has(EdgeType::EditedAfter));

        let edited_after = edges.iter().find(|e| e.edge_type == EdgeType::EditedAfter).unwrap();
        assert!((edited_after.weight - 0.4).abs() < 1e-6);
    }

    #[test]
    fn no_self_loops_or_duplicate_pairs() {
        let rows = scenario_a_rows();
        let mut built = build_nodes(&rows);
        let config = GceConfig::default();
        let edges = synthesize_edges(
            &mut built.nodes,
            &built.embeddings,
            &built.node_index_to_embedding_index,
            &built.index,
            &rows,
            &config,
        );
        let mut seen = HashSet::new();
        for e in &edges {
            assert_ne!(e.source, e.target);
            let key = (e.source.min(e.target), e.source.max(e.target));
            assert!(seen.insert(key), "duplicate pair {:?}", key);
        }
    }

    #[test]
    fn connection_count_matches_materialized_edges() {
        let rows = scenario_a_rows();
        let mut built = build_nodes(&rows);
        let config = GceConfig::default();
        let edges = synthesize_edges(
            &mut built.nodes,
            &built.embeddings,
            &built.node_index_to_embedding_index,
            &built.index,
            &rows,
            &config,
        );
        let mut expected = vec![0usize; built.nodes.len()];
        for e in &edges {
            expected[e.source] += 1;
            expected[e.target] += 1;
        }
        for (node, count) in built.nodes.iter().zip(expected) {
            assert_eq!(node.connection_count, count);
        }
    }

    #[test]
    fn orphan_rescue_gives_every_embedded_node_at_least_one_edge() {
        let mut rows = StoreRows::default();
        for i in 0..10 {
            let mut vector = vec![0.0f32; 10];
            vector[i] = 1.0;
            rows.memories.push(MemoryRow {
                id: format!("mem-{i}"),
                content: format!("memory {i}"),
                memory_type: "fact".into(),
                embedding: Some(DecodedEmbedding { vector, dim: 10 }),
                timestamp_ms: Some(1_700_000_000_000 + i as i64),
                metadata: serde_json::json!({}),
            });
        }
        // pad every embedding to the canonical 384 dims so they're valid.
        for m in rows.memories.iter_mut() {
            if let Some(e) = m.embedding.as_mut() {
                e.vector.resize(384, 0.0);
                e.dim = 384;
            }
        }
        let mut built = build_nodes(&rows);
        let mut config = GceConfig::default();
        config.similarity_threshold = 0.55;
        let edges = synthesize_edges(
            &mut built.nodes,
            &built.embeddings,
            &built.node_index_to_embedding_index,
            &built.index,
            &rows,
            &config,
        );
        assert!(edges.iter().all(|e| e.edge_type != EdgeType::Semantic));
        for node in &built.nodes {
            assert!(node.connection_count >= 1, "node {} has no edges", node.id);
        }
    }

    #[test]
    fn q_pattern_state_prefix_groups_on_colon_not_underscore() {
        let rows = StoreRows {
            q_patterns: vec![
                QPatternRow { state: "multi_word:ext".into(), action: "a1".into(), q_value: 0.5, visits: 1, last_update_ms: None, model: None },
                QPatternRow { state: "multi_word:other".into(), action: "a2".into(), q_value: 0.5, visits: 1, last_update_ms: None, model: None },
                QPatternRow { state: "multi:x".into(), action: "a3".into(), q_value: 0.5, visits: 1, last_update_ms: None, model: None },
            ],
            ..Default::default()
        };
        let mut built = build_nodes(&rows);
        let config = GceConfig::default();
        let edges = synthesize_edges(
            &mut built.nodes,
            &built.embeddings,
            &built.node_index_to_embedding_index,
            &built.index,
            &rows,
            &config,
        );

        let by_state = |state: &str| built.nodes.iter().find(|n| n.state.as_deref() == Some(state)).unwrap().node_index;
        let a = by_state("multi_word:ext");
        let b = by_state("multi_word:other");
        let c = by_state("multi:x");

        let linked = |x: usize, y: usize| {
            edges
                .iter()
                .any(|e| e.edge_type == EdgeType::SameStatePrefix && (e.source.min(e.target), e.source.max(e.target)) == (x.min(y), x.max(y)))
        };
        assert!(linked(a, b), "both multi_word: states should share a prefix edge");
        assert!(!linked(a, c), "multi_word and multi are different prefixes, not the same bucket");
    }
}
