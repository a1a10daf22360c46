//! Topology Engine (§4.6): persistent homology over layout positions,
//! reduced to a human-facing list of "knowledge gaps".
//!
//! H1 tracks true triangle-filling rather than counting every cycle-closing
//! edge: when an edge closes a cycle without completing any triangle, a new
//! bar is born; when it completes one or more triangles over already-alive
//! cycles, it kills that many of them (oldest first) at the edge's epsilon
//! instead of minting new bars. This is still an approximation of full
//! boundary-matrix reduction (see the Open Questions this pipeline resolved
//! in DESIGN.md) but it matches the simplicial picture closely enough that
//! a cycle genuinely dies when the 2-simplices that fill it appear.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::config::GceConfig;
use crate::node::Node;
use crate::util::sanitize_f64;

/// Essential features (H0 roots, unfilled H1 cycles) never die within the
/// filtration; on the wire `death` is sanitized to this sentinel instead of
/// `Infinity`, which is not a valid JSON number.
const ESSENTIAL_DEATH_SENTINEL: f64 = f64::MAX;

fn serialize_death<S>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(sanitize_f64(*value, ESSENTIAL_DEATH_SENTINEL))
}

/// `{birth, death, dimension, representative?}` (§3.1). In-memory, `death`
/// is `f64::INFINITY` for essential features that never die within the
/// filtration; on the wire it sanitizes to [`ESSENTIAL_DEATH_SENTINEL`] so
/// every numeric field reaching the API stays finite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceBar {
    pub birth: f64,
    #[serde(serialize_with = "serialize_death")]
    pub death: f64,
    pub dimension: u8,
    pub representative: Option<Vec<usize>>,
}

/// `{id, nodeIndices[], center, radius, persistence, surroundingTopics[], label}`
/// (§3.1), derived from H1 bars with ≥ 3 representative nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeGap {
    pub id: String,
    pub node_indices: Vec<usize>,
    pub center: (f64, f64),
    pub radius: f64,
    pub persistence: f64,
    pub surrounding_topics: Vec<String>,
    pub label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyResult {
    pub bars: Vec<PersistenceBar>,
    pub gaps: Vec<KnowledgeGap>,
}

struct UnionFind {
    parent: Vec<usize>,
    /// Proxy for "birth order": the smallest original vertex index seen in
    /// each component. All vertices are born at ε = 0 simultaneously, so
    /// this is what actually breaks elder-rule ties (§4.6). Always hangs
    /// the younger tree under the elder's root — path compression keeps
    /// this cheap even without union-by-rank, and correctness under the
    /// elder rule matters more than balance at this node count (≤ 2000).
    elder: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            elder: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    /// Unites the components of `a` and `b`. Returns `None` if already
    /// united (this edge is a cycle-closer, not a merge). Otherwise returns
    /// the younger root (the one whose bar just died).
    fn union(&mut self, a: usize, b: usize) -> Option<usize> {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return None;
        }
        // elder rule: the root with the smaller elder index survives.
        let (survivor, dying) = if self.elder[ra] <= self.elder[rb] { (ra, rb) } else { (rb, ra) };
        self.parent[dying] = survivor;
        self.elder[survivor] = self.elder[survivor].min(self.elder[dying]);
        Some(dying)
    }
}

fn euclid(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// BFS shortest path between `start` and `end` over `adjacency`, used to
/// recover an H1 bar's representative cycle. `adjacency` must not yet
/// contain the direct `(start, end)` edge.
fn bfs_path(adjacency: &[Vec<usize>], start: usize, end: usize) -> Option<Vec<usize>> {
    let mut visited = vec![false; adjacency.len()];
    let mut parent = vec![usize::MAX; adjacency.len()];
    let mut queue = VecDeque::new();
    queue.push_back(start);
    visited[start] = true;
    while let Some(u) = queue.pop_front() {
        if u == end {
            let mut path = vec![end];
            let mut cur = end;
            while cur != start {
                cur = parent[cur];
                path.push(cur);
            }
            path.reverse();
            return Some(path);
        }
        for &v in &adjacency[u] {
            if !visited[v] {
                visited[v] = true;
                parent[v] = u;
                queue.push_back(v);
            }
        }
    }
    None
}

/// Common neighbors of `i` and `j` in `adjacency`, i.e. vertices `w` such
/// that `w-i` and `w-j` are both already present — each is a triangle the
/// about-to-be-added edge `i-j` would complete.
fn common_neighbors(adjacency: &[Vec<usize>], i: usize, j: usize) -> usize {
    adjacency[i].iter().filter(|w| adjacency[j].contains(w)).count()
}

fn surrounding_topics(nodes: &[Node], global_indices: &[usize]) -> Vec<String> {
    let mut topics: Vec<String> = global_indices
        .iter()
        .filter_map(|&gi| nodes.get(gi))
        .filter_map(|n| n.domain.clone().or_else(|| n.namespace.clone()))
        .collect();
    topics.sort();
    topics.dedup();
    topics
}

fn gap_label(topics: &[String]) -> String {
    match topics.len() {
        0 => "Gap between unlabeled regions".to_string(),
        1 => format!("Gap within {}", topics[0]),
        2 => format!("Gap between {} and {}", topics[0], topics[1]),
        _ => format!("Gap among {}, {}, and {} more", topics[0], topics[1], topics.len() - 2),
    }
}

/// Run persistent homology over `positions` (parallel to `global_indices`,
/// which maps each position back into the full node array) and derive
/// knowledge gaps. Declines to run — returning an empty result — above
/// `config.topology_node_ceiling` points (§4.6 complexity bound).
pub fn analyze_topology(nodes: &[Node], global_indices: &[usize], positions: &[(f64, f64)], config: &GceConfig) -> TopologyResult {
    let n = positions.len();
    if n == 0 || n > config.topology_node_ceiling {
        return TopologyResult::default();
    }

    let mut all_edges: Vec<(usize, usize, f64)> = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            all_edges.push((i, j, euclid(positions[i], positions[j])));
        }
    }
    all_edges.sort_by(|a, b| a.2.total_cmp(&b.2));

    let max_distance = all_edges.last().map(|e| e.2).unwrap_or(0.0);
    let max_epsilon = 1.1 * max_distance;
    let filtered: Vec<&(usize, usize, f64)> = all_edges.iter().filter(|e| e.2 <= max_epsilon).collect();

    let mut uf = UnionFind::new(n);
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut bars = Vec::new();
    // Indices into `bars` of currently-alive (undied) H1 bars, oldest first.
    let mut alive_h1: Vec<usize> = Vec::new();

    for &&(i, j, eps) in &filtered {
        match uf.union(i, j) {
            Some(dying_root) => {
                bars.push(PersistenceBar {
                    birth: 0.0,
                    death: eps,
                    dimension: 0,
                    representative: Some(vec![global_indices[dying_root]]),
                });
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
            None => {
                let triangles_completed = common_neighbors(&adjacency, i, j);
                if triangles_completed == 0 {
                    if let Some(path) = bfs_path(&adjacency, i, j) {
                        let idx = bars.len();
                        bars.push(PersistenceBar {
                            birth: eps,
                            death: f64::INFINITY,
                            dimension: 1,
                            representative: Some(path.iter().map(|&p| global_indices[p]).collect()),
                        });
                        alive_h1.push(idx);
                    }
                } else {
                    let to_kill = triangles_completed.min(alive_h1.len());
                    for _ in 0..to_kill {
                        let idx = alive_h1.remove(0);
                        bars[idx].death = eps;
                    }
                }
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }
    }

    let mut roots: HashSet<usize> = HashSet::new();
    for i in 0..n {
        roots.insert(uf.find(i));
    }
    for root in roots {
        bars.push(PersistenceBar {
            birth: 0.0,
            death: f64::INFINITY,
            dimension: 0,
            representative: Some(vec![global_indices[root]]),
        });
    }

    let mut gaps: Vec<KnowledgeGap> = bars
        .iter()
        .filter(|b| b.dimension == 1)
        .filter_map(|b| {
            let rep = b.representative.as_ref()?;
            if rep.len() < 3 {
                return None;
            }
            let coords: Vec<(f64, f64)> = rep
                .iter()
                .filter_map(|&gi| global_indices.iter().position(|&g| g == gi).map(|p| positions[p]))
                .collect();
            if coords.is_empty() {
                return None;
            }
            let cx = coords.iter().map(|p| p.0).sum::<f64>() / coords.len() as f64;
            let cy = coords.iter().map(|p| p.1).sum::<f64>() / coords.len() as f64;
            let radius = coords.iter().map(|&p| euclid(p, (cx, cy))).fold(0.0, f64::max);
            let topics = surrounding_topics(nodes, rep);
            let persistence = if b.death.is_finite() { b.death - b.birth } else { b.birth };
            Some(KnowledgeGap {
                id: format!("gap:{}:{}", rep[0], rep.len()),
                node_indices: rep.clone(),
                center: (cx, cy),
                radius,
                persistence,
                label: gap_label(&topics),
                surrounding_topics: topics,
            })
        })
        .collect();
    gaps.sort_by(|a, b| b.persistence.total_cmp(&a.persistence));

    TopologyResult { bars, gaps }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceiling_returns_empty_result() {
        let nodes = Vec::new();
        let indices: Vec<usize> = (0..5).collect();
        let positions: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 0.0)).collect();
        let mut config = GceConfig::default();
        config.topology_node_ceiling = 3;
        let result = analyze_topology(&nodes, &indices, &positions, &config);
        assert!(result.bars.is_empty());
        assert!(result.gaps.is_empty());
    }

    #[test]
    fn linear_chain_produces_one_essential_component() {
        let nodes = Vec::new();
        let indices: Vec<usize> = (0..4).collect();
        let positions = vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)];
        let config = GceConfig::default();
        let result = analyze_topology(&nodes, &indices, &positions, &config);
        let essential = result.bars.iter().filter(|b| b.dimension == 0 && b.death.is_infinite()).count();
        assert_eq!(essential, 1);
    }

    #[test]
    fn square_produces_an_h1_cycle() {
        let nodes = Vec::new();
        let indices: Vec<usize> = (0..4).collect();
        // A square: the diagonals are longer than the sides, so the 4 sides
        // enter the filtration before the diagonals close the loop.
        let positions = vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        let config = GceConfig::default();
        let result = analyze_topology(&nodes, &indices, &positions, &config);
        assert!(result.bars.iter().any(|b| b.dimension == 1));
    }

    #[test]
    fn gaps_sorted_by_persistence_descending() {
        let topics = vec!["a".to_string(), "b".to_string()];
        assert_eq!(gap_label(&topics), "Gap between a and b");
    }

    #[test]
    fn square_diagonal_fills_its_triangles_into_a_single_h1_bar() {
        let nodes = Vec::new();
        let indices: Vec<usize> = (0..4).collect();
        let positions = vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        let config = GceConfig::default();
        let result = analyze_topology(&nodes, &indices, &positions, &config);
        let h1: Vec<_> = result.bars.iter().filter(|b| b.dimension == 1).collect();
        assert_eq!(h1.len(), 1);
        assert!((h1[0].birth - 1.0).abs() < 1e-9);
        assert!((h1[0].death - 2.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn bare_triangle_cycle_has_zero_persistence() {
        let nodes = Vec::new();
        let indices: Vec<usize> = (0..3).collect();
        let positions = vec![(0.0, 0.0), (1.0, 0.0), (0.5, 0.8)];
        let config = GceConfig::default();
        let result = analyze_topology(&nodes, &indices, &positions, &config);
        assert!(!result.bars.iter().any(|b| b.dimension == 1), "a bare triangle's cycle fills at the same epsilon it's born, so no bar survives to report");
    }

    #[test]
    fn essential_death_sanitizes_to_a_finite_sentinel_on_the_wire() {
        let bar = PersistenceBar { birth: 0.0, death: f64::INFINITY, dimension: 0, representative: None };
        let value = serde_json::to_value(&bar).unwrap();
        assert!(value["death"].is_number());
        assert!(value["death"].as_f64().unwrap().is_finite());
    }
}
