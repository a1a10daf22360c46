//! Scenario A — smoke (spec §8): one of every entity kind, wired through
//! the edge types that kind of fixture is specifically meant to exercise.

use gce_core::{build_graph, EdgeType, GceConfig, NodeSource};
use gce_e2e_tests::harness::StoreBuilder;

fn embedding_384() -> Vec<f32> {
    let mut v = vec![0.01f32; 384];
    v[0] = 1.0;
    v
}

#[test]
fn smoke_fixture_produces_every_expected_node_and_edge_kind() {
    let store = StoreBuilder::new()
        .memory("hello", "hello", "fact", Some(embedding_384()), 1_700_000_000_000)
        .q_pattern("edit:.js", "coder", 0.8, 3)
        .trajectory("traj-1", "edit_js", "coder", "success", 1.0, 1_700_000_000_000)
        .file_sequence("a.ts", "b.ts", 2)
        .build();

    let response = build_graph(&store.path, &GceConfig::default()).expect("graph builds");

    let count_of = |source: NodeSource| response.nodes.iter().filter(|n| n.source == source).count();
    assert_eq!(count_of(NodeSource::Memory), 1);
    assert_eq!(count_of(NodeSource::QPattern), 1);
    assert_eq!(count_of(NodeSource::TrajectorySuccess), 1);
    assert_eq!(count_of(NodeSource::State), 1);
    assert_eq!(count_of(NodeSource::Action), 1);
    assert_eq!(count_of(NodeSource::Agent), 1);
    assert_eq!(count_of(NodeSource::FileType), 1);
    assert_eq!(count_of(NodeSource::File), 2);

    let has_type = |t: EdgeType| response.edges.iter().any(|e| e.edge_type == t);
    assert!(has_type(EdgeType::HasState), "missing has_state edge");
    assert!(has_type(EdgeType::HasAction), "missing has_action edge");
    assert!(has_type(EdgeType::IsAgent), "missing is_agent edge");
    assert!(has_type(EdgeType::TrajectoryMemory), "missing trajectory_memory edge");
    assert!(has_type(EdgeType::StateTypeBridge), "missing state_type_bridge edge");
    assert!(has_type(EdgeType::RoutesTo), "missing routes_to edge");

    let edited_after = response
        .edges
        .iter()
        .find(|e| e.edge_type == EdgeType::EditedAfter)
        .expect("missing edited_after edge");
    assert!((edited_after.weight - 0.4).abs() < 1e-6);
}
