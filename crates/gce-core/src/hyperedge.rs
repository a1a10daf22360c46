//! Hyperedge Builder (§4.5): groups of ≥4 nodes sharing a kind or a memory
//! domain, surfaced as a single renderable set rather than O(n²) pairwise
//! edges.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::color::palette_color;
use crate::node::{Node, NodeSource};

/// `{id, type, label, members[], color, memberCount}` (§3.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hyperedge {
    pub id: String,
    #[serde(rename = "type")]
    pub hyperedge_type: String,
    pub label: String,
    pub members: Vec<usize>,
    pub color: String,
    pub member_count: usize,
}

fn make(id: String, hyperedge_type: &str, label: String, members: Vec<usize>) -> Hyperedge {
    let color = palette_color(&id);
    Hyperedge {
        id,
        hyperedge_type: hyperedge_type.to_string(),
        label,
        member_count: members.len(),
        members,
        color,
    }
}

/// One hyperedge per memory-domain group with ≥ `min_members`, one per
/// non-memory node-source cluster (file, file type, agent, state, action,
/// Q-pattern, trajectory success/failed) with ≥ `min_members`. Memories are
/// grouped by domain, not re-emitted as their own source-kind cluster.
pub fn build_hyperedges(nodes: &[Node], min_members: usize) -> Vec<Hyperedge> {
    let mut hyperedges = Vec::new();

    let mut by_domain: HashMap<&str, Vec<usize>> = HashMap::new();
    for n in nodes.iter().filter(|n| n.source == NodeSource::Memory) {
        if let Some(domain) = &n.domain {
            by_domain.entry(domain.as_str()).or_default().push(n.node_index);
        }
    }
    for (domain, members) in by_domain {
        if members.len() >= min_members {
            hyperedges.push(make(
                format!("hyperedge:domain:{domain}"),
                "memory_domain",
                format!("{domain} memories"),
                members,
            ));
        }
    }

    for source in NodeSource::all().iter().filter(|s| !matches!(s, NodeSource::Memory | NodeSource::NeuralPattern)) {
        let members: Vec<usize> = nodes.iter().filter(|n| n.source == *source).map(|n| n.node_index).collect();
        if members.len() >= min_members {
            hyperedges.push(make(
                format!("hyperedge:source:{}", source.as_str()),
                "node_source",
                format!("all {}", source.as_str()),
                members,
            ));
        }
    }

    hyperedges
}
