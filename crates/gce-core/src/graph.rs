//! Top-level orchestrator: Store Reader → Node Builder → Projection → Edge
//! Synthesizer → Hyperedge Builder → Topology Engine, wired into the one
//! response the Graph Cache & API Facade (§4.9) hands back to callers.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{GceConfig, CANVAS_SIZE};
use crate::edge::{synthesize_edges, Edge};
use crate::error::{GceError, Result};
use crate::hyperedge::{build_hyperedges, Hyperedge};
use crate::node::{build_nodes, Node};
use crate::projection::{layout_cluster, reproject, umap_project};
use crate::store::StoreReader;
use crate::timeline::TimelineFilter;
use crate::topology::{analyze_topology, TopologyResult};

/// `meta` block of the response: build provenance, not graph content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMeta {
    pub node_count: usize,
    pub edge_count: usize,
    pub hyperedge_count: usize,
    pub embedded_node_count: usize,
    pub similarity_threshold: f32,
    pub store_mtime_ms: i64,
}

/// Coarse counters a dashboard can render without re-deriving them from the
/// node/edge arrays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub by_source: Vec<(String, usize)>,
    pub by_edge_group: Vec<(String, usize)>,
}

/// Everything the Timeline Filter needs to run client-side, snapshotted at
/// build time (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineBounds {
    pub min_ts: i64,
    pub max_ts: i64,
    pub bucket_count: usize,
    pub histogram: Vec<usize>,
}

/// The full shape handed back by the Graph Cache & API Facade (§4.9):
/// `{nodes, edges, hyperedges, nodeTypeConfig, meta, timeline, metrics, stats}`.
/// `metrics` carries the Topology Engine's persistence barcode and
/// derived knowledge gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphResponse {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub hyperedges: Vec<Hyperedge>,
    pub node_type_config: Vec<crate::cache::NodeTypeConfig>,
    pub meta: GraphMeta,
    pub timeline: TimelineBounds,
    pub metrics: TopologyResult,
    pub stats: GraphStats,
}

/// Run the full pipeline once against an already-open store connection's
/// extracted rows. Separated from [`build_graph`] so tests can feed
/// fixture rows directly without touching disk.
pub fn build_graph_from_rows(rows: crate::store::StoreRows, config: &GceConfig) -> GraphResponse {
    let built = build_nodes(&rows);
    let mut nodes = built.nodes;
    let embeddings = built.embeddings;
    let node_index_to_embedding_index = built.node_index_to_embedding_index;
    let index = built.index;

    let embedded_global_indices: Vec<usize> = (0..nodes.len())
        .filter(|i| node_index_to_embedding_index.contains_key(i))
        .collect();

    let positions: Vec<(f64, f64)> = if embedded_global_indices.len() >= config.umap_min_nodes {
        let ordered_embeddings: Vec<Vec<f32>> = embedded_global_indices
            .iter()
            .map(|gi| embeddings[node_index_to_embedding_index[gi]].clone())
            .collect();
        let n_neighbors = crate::projection::default_n_neighbors(ordered_embeddings.len());
        umap_project(&ordered_embeddings, n_neighbors, config.umap_min_dist, config.umap_box_size, config.umap_box_origin)
    } else {
        embedded_global_indices.iter().map(|_| (CANVAS_SIZE / 2.0, CANVAS_SIZE / 2.0)).collect()
    };

    for (local, &gi) in embedded_global_indices.iter().enumerate() {
        nodes[gi].x = positions[local].0;
        nodes[gi].y = positions[local].1;
    }

    for source in crate::node::NodeSource::all() {
        let cluster: Vec<usize> = (0..nodes.len()).filter(|&i| nodes[i].source == *source && !node_index_to_embedding_index.contains_key(&i)).collect();
        if cluster.is_empty() {
            continue;
        }
        for (node_index, x, y) in layout_cluster(*source, &cluster) {
            nodes[node_index].x = x;
            nodes[node_index].y = y;
        }
    }

    if config.poincare_enabled {
        let sources: Vec<_> = nodes.iter().map(|n| n.source).collect();
        let coords: Vec<(f64, f64)> = nodes.iter().map(|n| (n.x, n.y)).collect();
        let disk = reproject(&coords, &sources, CANVAS_SIZE);
        for (n, p) in nodes.iter_mut().zip(disk) {
            n.x = p.x;
            n.y = p.y;
        }
    }

    let edges = synthesize_edges(&mut nodes, &embeddings, &node_index_to_embedding_index, &index, &rows, config);
    let hyperedges = build_hyperedges(&nodes, config.hyperedge_min_members);

    let embedded_positions: Vec<(f64, f64)> = embedded_global_indices.iter().map(|&gi| (nodes[gi].x, nodes[gi].y)).collect();
    let metrics = analyze_topology(&nodes, &embedded_global_indices, &embedded_positions, config);

    let node_timestamps: Vec<Option<i64>> = nodes.iter().map(|n| n.timestamp.or(n.created_at)).collect();
    let edge_endpoints: Vec<(usize, usize)> = edges.iter().map(|e| (e.source, e.target)).collect();
    let timeline_filter = TimelineFilter::new(node_timestamps, edge_endpoints, config.timeline_bucket_count);
    let (min_ts, max_ts) = timeline_filter.bounds();
    let timeline = TimelineBounds { min_ts, max_ts, bucket_count: config.timeline_bucket_count, histogram: timeline_filter.histogram() };

    let node_type_config = crate::cache::build_node_type_config(&nodes);
    let stats = build_stats(&nodes, &edges);

    let meta = GraphMeta {
        node_count: nodes.len(),
        edge_count: edges.len(),
        hyperedge_count: hyperedges.len(),
        embedded_node_count: embedded_global_indices.len(),
        similarity_threshold: config.similarity_threshold,
        store_mtime_ms: 0,
    };

    GraphResponse { nodes, edges, hyperedges, node_type_config, meta, timeline, metrics, stats }
}

fn build_stats(nodes: &[Node], edges: &[Edge]) -> GraphStats {
    use std::collections::BTreeMap;
    let mut by_source: BTreeMap<String, usize> = BTreeMap::new();
    for n in nodes {
        *by_source.entry(n.source.as_str().to_string()).or_default() += 1;
    }
    let mut by_edge_group: BTreeMap<String, usize> = BTreeMap::new();
    for e in edges {
        *by_edge_group.entry(e.group.as_str().to_string()).or_default() += 1;
    }
    GraphStats { by_source: by_source.into_iter().collect(), by_edge_group: by_edge_group.into_iter().collect() }
}

/// Open the store at `path`, read every table, and run the full pipeline.
/// `store_mtime_ms` is stamped onto `meta` separately by the cache layer,
/// which is the only thing that needs it for its key.
pub fn build_graph(path: &Path, config: &GceConfig) -> Result<GraphResponse> {
    if !(0.0..=1.0).contains(&config.similarity_threshold) {
        return Err(GceError::InvalidArgument(format!("similarity_threshold out of range: {}", config.similarity_threshold)));
    }
    let reader = StoreReader::open(path)?;
    let rows = reader.read_all();
    let mut response = build_graph_from_rows(rows, config);
    response.meta.store_mtime_ms = StoreReader::mtime_ms(path);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryRow, StoreRows};

    fn fixture_rows() -> StoreRows {
        StoreRows {
            memories: vec![
                MemoryRow {
                    id: "m1".into(),
                    content: "{}".into(),
                    memory_type: "fact".into(),
                    embedding: None,
                    timestamp_ms: Some(1000),
                    metadata: serde_json::json!({}),
                },
                MemoryRow {
                    id: "m2".into(),
                    content: "plain text".into(),
                    memory_type: "fact".into(),
                    embedding: None,
                    timestamp_ms: Some(2000),
                    metadata: serde_json::json!({}),
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn builds_a_non_empty_response_from_fixture_rows() {
        let config = GceConfig::default();
        let response = build_graph_from_rows(fixture_rows(), &config);
        assert_eq!(response.meta.node_count, 2);
        assert_eq!(response.nodes.len(), response.meta.node_count);
    }

    #[test]
    fn rejects_out_of_range_similarity_threshold() {
        let mut config = GceConfig::default();
        config.similarity_threshold = 1.5;
        let result = build_graph(Path::new("/nonexistent/does/not/matter.db"), &config);
        assert!(matches!(result, Err(GceError::InvalidArgument(_))));
    }

    #[test]
    fn timeline_bounds_span_all_observed_timestamps() {
        let config = GceConfig::default();
        let response = build_graph_from_rows(fixture_rows(), &config);
        assert_eq!(response.timeline.min_ts, 1000);
        assert_eq!(response.timeline.max_ts, 2000);
    }
}
