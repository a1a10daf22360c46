//! Scenario B — semantic (spec §8): two unit-norm embeddings at a known
//! cosine similarity, straddling the threshold.

use gce_core::{build_graph, EdgeType, GceConfig};
use gce_e2e_tests::harness::StoreBuilder;

/// Two vectors in the (x, y) plane (zero-padded to 384 dims) with
/// `cos(e1, e2) = cos(theta)`.
fn pair_at_cosine(cos_theta: f32) -> (Vec<f32>, Vec<f32>) {
    let theta = cos_theta.acos();
    let mut e1 = vec![0.0f32; 384];
    let mut e2 = vec![0.0f32; 384];
    e1[0] = 1.0;
    e2[0] = theta.cos();
    e2[1] = theta.sin();
    (e1, e2)
}

fn build_with_threshold(threshold: f32) -> gce_core::GraphResponse {
    let (e1, e2) = pair_at_cosine(0.7);
    let store = StoreBuilder::new()
        .memory("m1", "first", "fact", Some(e1), 1_700_000_000_000)
        .memory("m2", "second", "fact", Some(e2), 1_700_000_000_000)
        .build();
    let mut config = GceConfig::default();
    config.similarity_threshold = threshold;
    build_graph(&store.path, &config).expect("graph builds")
}

#[test]
fn similarity_0_7_at_threshold_0_55_yields_one_semantic_edge() {
    let response = build_with_threshold(0.55);
    let semantic: Vec<_> = response.edges.iter().filter(|e| e.edge_type == EdgeType::Semantic).collect();
    assert_eq!(semantic.len(), 1);
    assert!((semantic[0].weight - 0.7).abs() < 1e-3);
}

#[test]
fn raising_threshold_above_similarity_drops_the_edge() {
    let response = build_with_threshold(0.8);
    let semantic_count = response.edges.iter().filter(|e| e.edge_type == EdgeType::Semantic).count();
    assert_eq!(semantic_count, 0);
}
