//! Scenario C — orphan rescue (spec §8): ten mutually orthogonal unit
//! embeddings, no stored edges, threshold high enough that no pairwise
//! cosine similarity clears it. Every node must still end up with at least
//! one edge via the kNN rescue step.

use gce_core::{build_graph, EdgeType, GceConfig};
use gce_e2e_tests::harness::{basis_vector, StoreBuilder};

#[test]
fn every_orthogonal_node_gets_rescued() {
    let mut builder = StoreBuilder::new();
    for i in 0..10 {
        builder = builder.memory(&format!("m{i}"), &format!("memory {i}"), "fact", Some(basis_vector(i)), 1_700_000_000_000 + i as i64);
    }
    let store = builder.build();

    let config = GceConfig::default();
    let response = build_graph(&store.path, &config).expect("graph builds");

    let semantic_count = response.edges.iter().filter(|e| e.edge_type == EdgeType::Semantic).count();
    assert_eq!(semantic_count, 0, "orthogonal embeddings should clear no semantic threshold");

    let memory_indices: Vec<usize> = response
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.source == gce_core::NodeSource::Memory)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(memory_indices.len(), 10);

    for &idx in &memory_indices {
        let has_edge = response.edges.iter().any(|e| e.source == idx || e.target == idx);
        assert!(has_edge, "node {idx} has no edge after rescue");
    }

    let rescue_count = response.edges.iter().filter(|e| e.edge_type == EdgeType::KnnFallback).count();
    assert!(rescue_count > 0, "expected at least one knn_fallback edge");
}
